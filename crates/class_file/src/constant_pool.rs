macro_rules! cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index) {
            Some($crate::constant_pool::CpInfo::$i(n)) => Some(n),
            _ => None,
        }
    };
}
pub(crate) use cp_info;

/// The indexed table of literals and references of a class file.
///
/// Indices are 1-based. Every lookup is total: index 0, out-of-range indices,
/// the shadow slot after a `Long`/`Double` and entries of the wrong kind all
/// resolve to `None`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    /// Builds a pool from entries starting at index 1. `Long` and `Double`
    /// entries must be followed by [`CpInfo::Unusable`].
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Reads a pool on its own, starting at its entry count.
    pub fn read(r: impl std::io::Read) -> crate::Result<ConstantPool> {
        crate::Parser::new(r).parse_constant_pool()
    }

    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        match self.cp_infos.get((index as usize).checked_sub(1)?)? {
            CpInfo::Unusable => None,
            cp_info => Some(cp_info),
        }
    }

    /// The text of a `Utf8` entry.
    pub fn find_name(&self, index: u16) -> Option<&str> {
        cp_info!(self, index, Utf8).map(String::as_str)
    }

    /// The internal (slash separated) name of a `Class` entry.
    pub fn find_class_name(&self, index: u16) -> Option<&str> {
        let ClassInfo { name_index } = cp_info!(self, index, Class)?;
        self.find_name(*name_index)
    }

    /// A loadable literal: numeric entries, `String` entries resolved to
    /// their text, and `Utf8` entries.
    pub fn find_value(&self, index: u16) -> Option<ConstantValue> {
        match self.get(index)? {
            CpInfo::Integer(i) => Some(ConstantValue::Integer(*i)),
            CpInfo::Float(f) => Some(ConstantValue::Float(*f)),
            CpInfo::Long(l) => Some(ConstantValue::Long(*l)),
            CpInfo::Double(d) => Some(ConstantValue::Double(*d)),
            CpInfo::String { string_index } => self
                .find_name(*string_index)
                .map(|s| ConstantValue::String(s.to_owned())),
            CpInfo::Utf8(s) => Some(ConstantValue::String(s.clone())),
            _ => None,
        }
    }

    /// Iterates over `(index, entry)` pairs, skipping shadow slots.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos
            .iter()
            .enumerate()
            .filter(|(_, cp_info)| !matches!(cp_info, CpInfo::Unusable))
            .map(|(i, cp_info)| (i as u16 + 1, cp_info))
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

/// One pool entry. `Float` and `Double` entries compare by their bits.
#[derive(Debug, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(String),
    String { string_index: u16 },
    Dynamic(InvokeDynamicInfo),
    InvokeDynamic(InvokeDynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Long(i64),
    Double(f64),
    Module { name_index: u16 },
    Package { name_index: u16 },
    Unusable,
}

impl PartialEq for CpInfo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CpInfo::MethodRef(a), CpInfo::MethodRef(b))
            | (CpInfo::FieldRef(a), CpInfo::FieldRef(b))
            | (CpInfo::InterfaceMethodRef(a), CpInfo::InterfaceMethodRef(b)) => a == b,
            (CpInfo::Float(a), CpInfo::Float(b)) => a.to_bits() == b.to_bits(),
            (CpInfo::Double(a), CpInfo::Double(b)) => a.to_bits() == b.to_bits(),
            (CpInfo::Class(a), CpInfo::Class(b)) => a == b,
            (CpInfo::NameAndType(a), CpInfo::NameAndType(b)) => a == b,
            (CpInfo::Utf8(a), CpInfo::Utf8(b)) => a == b,
            (CpInfo::String { string_index: a }, CpInfo::String { string_index: b }) => a == b,
            (CpInfo::Dynamic(a), CpInfo::Dynamic(b))
            | (CpInfo::InvokeDynamic(a), CpInfo::InvokeDynamic(b)) => a == b,
            (CpInfo::Integer(a), CpInfo::Integer(b)) => a == b,
            (CpInfo::MethodHandle(a), CpInfo::MethodHandle(b)) => a == b,
            (CpInfo::MethodType(a), CpInfo::MethodType(b)) => a == b,
            (CpInfo::Long(a), CpInfo::Long(b)) => a == b,
            (CpInfo::Module { name_index: a }, CpInfo::Module { name_index: b })
            | (CpInfo::Package { name_index: a }, CpInfo::Package { name_index: b }) => a == b,
            (CpInfo::Unusable, CpInfo::Unusable) => true,
            _ => false,
        }
    }
}

impl CpInfo {
    /// Number of pool slots the entry occupies.
    pub fn slot_size(&self) -> usize {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }
}

/// A literal resolved through the pool. Floats compare by their bits.
#[derive(Debug, Clone)]
pub enum ConstantValue {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
}

impl PartialEq for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstantValue::Integer(a), ConstantValue::Integer(b)) => a == b,
            (ConstantValue::Float(a), ConstantValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::Long(a), ConstantValue::Long(b)) => a == b,
            (ConstantValue::Double(a), ConstantValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::String(a), ConstantValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Integer(i) => write!(f, "{}", i),
            ConstantValue::Float(v) => write!(f, "{}f", v),
            ConstantValue::Long(l) => write!(f, "{}l", l),
            ConstantValue::Double(d) => write!(f, "{}d", d),
            ConstantValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

/// Shared by `Dynamic` and `InvokeDynamic` entries.
#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
