use std::{fmt, io::Read};

use crate::{
    access_flags::FlagTarget,
    annotation::Annotation,
    attributes::{Attributes, CodeAttribute, InnerClass},
    constant_pool::ConstantValue,
    descriptor::{MethodDescriptor, TypeDescriptor},
    parser::Parser,
    version::{JdkVersion, UNKNOWN_VERSION},
    AccessFlags, ConstantPool, ParseError, Result,
};

/// Name of instance initializer methods.
pub const CONSTRUCTOR_NAME: &str = "<init>";
/// Name of the class initializer method.
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// Outcome of resolving a name through the constant pool: the name of this
/// class, of its super class, or of an annotation element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRef {
    /// The resolved name, in binary form for classes.
    Named(String),
    /// Index 0, which for a super class means there is none.
    Absent,
    /// An index that does not resolve to a class name. An error was recorded.
    Unresolved(u16),
}
impl NameRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            NameRef::Named(name) => Some(name),
            NameRef::Absent | NameRef::Unresolved(_) => None,
        }
    }
}

/// A decoded class file.
///
/// Recoverable problems do not abort decoding: they are collected in
/// [`ClassFile::errors`] and the offending element is left out.
///
/// Floating-point constants compare by their bits, so a decoded class always
/// equals itself, NaN constants included.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: NameRef,
    pub super_class: NameRef,
    /// Binary names of the direct super interfaces.
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo>,
    /// Methods named `<init>`, in file order.
    pub constructors: Vec<MethodInfo>,
    /// All other methods, in file order.
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
    pub errors: Vec<ParseError>,
}
impl ClassFile {
    /// Decodes a class from `bytes`. The reader is consumed up to the end of
    /// the class and never beyond it.
    ///
    /// Pass `&mut reader` to keep using a reader afterwards.
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    /// Decodes the class stored in `length` bytes at `offset` of `bytes`.
    /// A range reaching past the buffer decodes as truncated input.
    pub fn from_bytes_range(bytes: &[u8], offset: usize, length: usize) -> Result<ClassFile> {
        let start = offset.min(bytes.len());
        let end = offset.saturating_add(length).min(bytes.len());
        Self::from_bytes(&bytes[start..end])
    }

    pub fn version(&self) -> (u16, u16) {
        (self.major_version, self.minor_version)
    }

    pub fn jdk_version(&self) -> Option<JdkVersion> {
        JdkVersion::from_major(self.major_version)
    }

    /// The JDK release, like `1.4` or `17.0`, or `unknown`.
    pub fn jdk_version_string(&self) -> String {
        match self.jdk_version() {
            Some(version) => version.make_jdk_string(self.minor_version),
            None => UNKNOWN_VERSION.to_owned(),
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        self.this_class.name()
    }

    /// `None` for `java.lang.Object` or when the name could not be resolved.
    pub fn super_class_name(&self) -> Option<&str> {
        self.super_class.name()
    }

    pub fn access_flag_names(&self) -> Vec<&'static str> {
        self.access_flags.names(FlagTarget::Class)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The first method or constructor called `name`.
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.constructors
            .iter()
            .chain(&self.methods)
            .find(|m| m.name == name)
    }

    pub fn source_file(&self) -> Option<&str> {
        self.attributes.source_file()
    }

    pub fn signature(&self) -> Option<&str> {
        self.attributes.signature()
    }

    pub fn inner_classes(&self) -> Option<&[InnerClass]> {
        self.attributes.inner_classes()
    }

    pub fn runtime_visible_annotations(&self) -> Option<&[Annotation]> {
        self.attributes.runtime_visible_annotations()
    }

    pub fn is_deprecated(&self) -> bool {
        self.attributes.is_deprecated()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub attributes: Attributes,
}
impl FieldInfo {
    pub fn constant_value(&self) -> Option<&ConstantValue> {
        self.attributes.constant_value()
    }

    pub fn is_deprecated(&self) -> bool {
        self.attributes.is_deprecated()
    }

    pub fn runtime_visible_annotations(&self) -> Option<&[Annotation]> {
        self.attributes.runtime_visible_annotations()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub attributes: Attributes,
}
impl MethodInfo {
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_NAME
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.descriptor.parameters
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.descriptor.return_type
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.code_attribute()
    }

    /// Binary names of the declared checked exceptions.
    pub fn exceptions(&self) -> Option<&[String]> {
        self.attributes.exceptions()
    }

    pub fn is_deprecated(&self) -> bool {
        self.attributes.is_deprecated()
    }

    pub fn runtime_visible_annotations(&self) -> Option<&[Annotation]> {
        self.attributes.runtime_visible_annotations()
    }
}

impl fmt::Display for ClassFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            " Version:      {}.{} (JDK {})",
            self.major_version,
            self.minor_version,
            self.jdk_version_string()
        )?;
        writeln!(f, " Flags:        {}", self.access_flag_names().join(" "))?;
        writeln!(f, " Class:        {}", self.class_name().unwrap_or("?"))?;
        writeln!(f, " Super Class:  {}", self.super_class_name().unwrap_or("-"))?;
        writeln!(f, " Interfaces:   {}", self.interfaces.join(", "))?;
        if let Some(source_file) = self.source_file() {
            writeln!(f, " Source File:  {}", source_file)?;
        }
        writeln!(f, " Pool Size:    {}", self.constant_pool.len())?;

        if let Some(annotations) = self.runtime_visible_annotations() {
            for annotation in annotations {
                writeln!(f, " {}", annotation)?;
            }
        }

        for field in &self.fields {
            write!(f, "  field  {} {}", field.descriptor, field.name)?;
            if let Some(value) = field.constant_value() {
                write!(f, " = {}", value)?;
            }
            writeln!(f, " [{}]", field.access_flags.names(FlagTarget::Field).join(" "))?;
        }

        for method in self.constructors.iter().chain(&self.methods) {
            write!(f, "  method {}{}", method.name, method.descriptor)?;
            if let Some(exceptions) = method.exceptions() {
                write!(f, " throws {}", exceptions.join(", "))?;
            }
            writeln!(f, " [{}]", method.access_flags.names(FlagTarget::Method).join(" "))?;
        }

        for error in &self.errors {
            writeln!(f, " Error:        {}", error)?;
        }

        Ok(())
    }
}
