use std::fmt;

use crate::NameRef;

/// A runtime annotation: its type and its element-value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Binary name of the annotation type.
    pub type_name: String,
    pub values: Vec<ElementValuePair>,
}
impl Annotation {
    pub fn value(&self, name: &str) -> Option<&ElementValue> {
        self.values
            .iter()
            .find(|pair| pair.name.name() == Some(name))
            .map(|pair| &pair.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    /// `Unresolved` when the name index is invalid. An error was recorded.
    pub name: NameRef,
    pub value: ElementValue,
}

/// One annotation element value.
///
/// Array elements are decoded tag by tag, so an array may mix kinds if the
/// class file does.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ElementConst),
    Enum { type_name: String, const_name: String },
    /// A class literal, named without array or reference decoration.
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
    /// A constant whose pool entry is missing or of the wrong kind for `tag`.
    /// An error was recorded.
    Unresolved { tag: u8, index: u16 },
}
impl ElementValue {
    /// The descriptor-style tag this value was read from.
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Const(c) => c.tag(),
            ElementValue::Enum { .. } => b'e',
            ElementValue::Class(_) => b'c',
            ElementValue::Annotation(_) => b'@',
            ElementValue::Array(_) => b'[',
            ElementValue::Unresolved { tag, .. } => *tag,
        }
    }

    pub fn as_const(&self) -> Option<&ElementConst> {
        match self {
            ElementValue::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ElementValue]> {
        match self {
            ElementValue::Array(values) => Some(values),
            _ => None,
        }
    }
}

/// A constant element value, narrowed to the width its tag declares.
/// Floats compare by their bits.
#[derive(Debug, Clone)]
pub enum ElementConst {
    Byte(i8),
    /// A UTF-16 code unit.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}
impl PartialEq for ElementConst {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ElementConst::Byte(a), ElementConst::Byte(b)) => a == b,
            (ElementConst::Char(a), ElementConst::Char(b)) => a == b,
            (ElementConst::Short(a), ElementConst::Short(b)) => a == b,
            (ElementConst::Int(a), ElementConst::Int(b)) => a == b,
            (ElementConst::Long(a), ElementConst::Long(b)) => a == b,
            (ElementConst::Float(a), ElementConst::Float(b)) => a.to_bits() == b.to_bits(),
            (ElementConst::Double(a), ElementConst::Double(b)) => a.to_bits() == b.to_bits(),
            (ElementConst::Boolean(a), ElementConst::Boolean(b)) => a == b,
            (ElementConst::String(a), ElementConst::String(b)) => a == b,
            _ => false,
        }
    }
}

impl ElementConst {
    pub fn tag(&self) -> u8 {
        match self {
            ElementConst::Byte(_) => b'B',
            ElementConst::Char(_) => b'C',
            ElementConst::Short(_) => b'S',
            ElementConst::Int(_) => b'I',
            ElementConst::Long(_) => b'J',
            ElementConst::Float(_) => b'F',
            ElementConst::Double(_) => b'D',
            ElementConst::Boolean(_) => b'Z',
            ElementConst::String(_) => b's',
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.type_name)?;
        if self.values.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, pair) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &pair.name {
                NameRef::Named(name) => write!(f, "{}={}", name, pair.value)?,
                NameRef::Absent | NameRef::Unresolved(_) => write!(f, "?={}", pair.value)?,
            }
        }
        f.write_str(")")
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Const(c) => write!(f, "{}", c),
            ElementValue::Enum {
                type_name,
                const_name,
            } => write!(f, "{}.{}", type_name, const_name),
            ElementValue::Class(name) => write!(f, "{}.class", name),
            ElementValue::Annotation(annotation) => write!(f, "{}", annotation),
            ElementValue::Array(values) => {
                f.write_str("{")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("}")
            }
            ElementValue::Unresolved { index, .. } => write!(f, "<#{}>", index),
        }
    }
}

impl fmt::Display for ElementConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementConst::Byte(b) => write!(f, "{}", b),
            ElementConst::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(c) => write!(f, "{:?}", c),
                None => write!(f, "'\\u{:04x}'", c),
            },
            ElementConst::Short(s) => write!(f, "{}", s),
            ElementConst::Int(i) => write!(f, "{}", i),
            ElementConst::Long(l) => write!(f, "{}L", l),
            ElementConst::Float(v) => write!(f, "{}f", v),
            ElementConst::Double(d) => write!(f, "{}", d),
            ElementConst::Boolean(b) => write!(f, "{}", b),
            ElementConst::String(s) => write!(f, "{:?}", s),
        }
    }
}
