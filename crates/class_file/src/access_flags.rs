use bitflags::bitflags;

bitflags! {
    /// Access and property flags of classes, inner classes, fields and methods.
    ///
    /// Some bits mean different things depending on what they are attached
    /// to, so they have one constant per meaning.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const SUPER = 0x0020;
        const BRIDGE = 0x0040;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

/// What a set of [`AccessFlags`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagTarget {
    Class,
    Field,
    Method,
    Any,
}

const FLAG_NAMES: [(AccessFlags, &str); 19] = [
    (AccessFlags::PUBLIC, "PUBLIC"),
    (AccessFlags::PRIVATE, "PRIVATE"),
    (AccessFlags::PROTECTED, "PROTECTED"),
    (AccessFlags::STATIC, "STATIC"),
    (AccessFlags::FINAL, "FINAL"),
    (AccessFlags::SYNCHRONIZED, "SYNCHRONIZED"),
    (AccessFlags::SUPER, "SUPER"),
    (AccessFlags::BRIDGE, "BRIDGE"),
    (AccessFlags::VOLATILE, "VOLATILE"),
    (AccessFlags::TRANSIENT, "TRANSIENT"),
    (AccessFlags::VARARGS, "VARARGS"),
    (AccessFlags::NATIVE, "NATIVE"),
    (AccessFlags::INTERFACE, "INTERFACE"),
    (AccessFlags::ABSTRACT, "ABSTRACT"),
    (AccessFlags::STRICT, "STRICT"),
    (AccessFlags::SYNTHETIC, "SYNTHETIC"),
    (AccessFlags::ANNOTATION, "ANNOTATION"),
    (AccessFlags::ENUM, "ENUM"),
    (AccessFlags::MODULE, "MODULE"),
];

impl FlagTarget {
    fn excludes(self, name: &str) -> bool {
        match self {
            FlagTarget::Class => matches!(
                name,
                "SYNCHRONIZED" | "BRIDGE" | "VOLATILE" | "TRANSIENT" | "VARARGS"
            ),
            FlagTarget::Field => matches!(name, "SYNCHRONIZED" | "SUPER" | "BRIDGE" | "VARARGS"),
            FlagTarget::Method => matches!(name, "SUPER" | "VOLATILE" | "TRANSIENT"),
            FlagTarget::Any => false,
        }
    }
}

macro_rules! flag_predicates {
    ($($fn_name:ident => $flag:ident),* $(,)?) => {
        $(
            pub fn $fn_name(&self) -> bool {
                self.contains(AccessFlags::$flag)
            }
        )*
    };
}

impl AccessFlags {
    flag_predicates! {
        is_public => PUBLIC,
        is_private => PRIVATE,
        is_protected => PROTECTED,
        is_static => STATIC,
        is_final => FINAL,
        is_synchronized => SYNCHRONIZED,
        is_super => SUPER,
        is_bridge => BRIDGE,
        is_volatile => VOLATILE,
        is_transient => TRANSIENT,
        is_varargs => VARARGS,
        is_native => NATIVE,
        is_interface => INTERFACE,
        is_abstract => ABSTRACT,
        is_strict => STRICT,
        is_synthetic => SYNTHETIC,
        is_annotation => ANNOTATION,
        is_enum => ENUM,
        is_module => MODULE,
    }

    /// Names of the set flags that are meaningful for `target`, in flag order.
    pub fn names(&self, target: FlagTarget) -> Vec<&'static str> {
        FLAG_NAMES
            .iter()
            .filter(|(flag, name)| self.contains(*flag) && !target.excludes(name))
            .map(|(_, name)| *name)
            .collect()
    }
}
