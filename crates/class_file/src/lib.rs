// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

mod access_flags;
pub mod annotation;
pub mod attributes;
mod class_file;
pub mod constant_pool;
pub mod descriptor;
mod error;
mod parser;
mod version;

pub use self::class_file::{
    ClassFile, FieldInfo, MethodInfo, NameRef, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME,
};
pub use access_flags::{AccessFlags, FlagTarget};
pub use constant_pool::ConstantPool;
pub use error::{ClassFileError, DescriptorError, ErrorDetail, ParseError, ParseErrorKind};
pub use parser::Parser;
pub use version::{JdkVersion, UNKNOWN_VERSION};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
