use std::fmt;

use crate::{
    annotation::{Annotation, ElementValue},
    constant_pool::ConstantValue,
    descriptor::TypeDescriptor,
    AccessFlags,
};

/// Attribute kinds with a structural decoder.
///
/// Every other name decodes to [`AttributeValue::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    ConstantValue,
    Code,
    Deprecated,
    Exceptions,
    InnerClasses,
    LineNumberTable,
    LocalVariableTable,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    AnnotationDefault,
    Signature,
    SourceFile,
    Synthetic,
}
impl AttributeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "ConstantValue" => AttributeKind::ConstantValue,
            "Code" => AttributeKind::Code,
            "Deprecated" => AttributeKind::Deprecated,
            "Exceptions" => AttributeKind::Exceptions,
            "InnerClasses" => AttributeKind::InnerClasses,
            "LineNumberTable" => AttributeKind::LineNumberTable,
            "LocalVariableTable" => AttributeKind::LocalVariableTable,
            "RuntimeVisibleAnnotations" => AttributeKind::RuntimeVisibleAnnotations,
            "RuntimeInvisibleAnnotations" => AttributeKind::RuntimeInvisibleAnnotations,
            "AnnotationDefault" => AttributeKind::AnnotationDefault,
            "Signature" => AttributeKind::Signature,
            "SourceFile" => AttributeKind::SourceFile,
            "Synthetic" => AttributeKind::Synthetic,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::ConstantValue => "ConstantValue",
            AttributeKind::Code => "Code",
            AttributeKind::Deprecated => "Deprecated",
            AttributeKind::Exceptions => "Exceptions",
            AttributeKind::InnerClasses => "InnerClasses",
            AttributeKind::LineNumberTable => "LineNumberTable",
            AttributeKind::LocalVariableTable => "LocalVariableTable",
            AttributeKind::RuntimeVisibleAnnotations => "RuntimeVisibleAnnotations",
            AttributeKind::RuntimeInvisibleAnnotations => "RuntimeInvisibleAnnotations",
            AttributeKind::AnnotationDefault => "AnnotationDefault",
            AttributeKind::Signature => "Signature",
            AttributeKind::SourceFile => "SourceFile",
            AttributeKind::Synthetic => "Synthetic",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}
impl Attribute {
    pub fn kind(&self) -> Option<AttributeKind> {
        self.value.kind()
    }
}

#[derive(Clone, PartialEq)]
pub enum AttributeValue {
    ConstantValue(ConstantValue),
    Code(CodeAttribute),
    Deprecated,
    Exceptions(Vec<String>),
    InnerClasses(Vec<InnerClass>),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    AnnotationDefault(ElementValue),
    Signature(String),
    SourceFile(String),
    Synthetic,
    /// An attribute without a structural decoder, kept as its raw bytes.
    Unknown(Vec<u8>),
}
impl AttributeValue {
    pub fn kind(&self) -> Option<AttributeKind> {
        Some(match self {
            AttributeValue::ConstantValue(_) => AttributeKind::ConstantValue,
            AttributeValue::Code(_) => AttributeKind::Code,
            AttributeValue::Deprecated => AttributeKind::Deprecated,
            AttributeValue::Exceptions(_) => AttributeKind::Exceptions,
            AttributeValue::InnerClasses(_) => AttributeKind::InnerClasses,
            AttributeValue::LineNumberTable(_) => AttributeKind::LineNumberTable,
            AttributeValue::LocalVariableTable(_) => AttributeKind::LocalVariableTable,
            AttributeValue::RuntimeVisibleAnnotations(_) => AttributeKind::RuntimeVisibleAnnotations,
            AttributeValue::RuntimeInvisibleAnnotations(_) => {
                AttributeKind::RuntimeInvisibleAnnotations
            }
            AttributeValue::AnnotationDefault(_) => AttributeKind::AnnotationDefault,
            AttributeValue::Signature(_) => AttributeKind::Signature,
            AttributeValue::SourceFile(_) => AttributeKind::SourceFile,
            AttributeValue::Synthetic => AttributeKind::Synthetic,
            AttributeValue::Unknown(_) => return None,
        })
    }
}
impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::ConstantValue(v) => f.debug_tuple("ConstantValue").field(v).finish(),
            AttributeValue::Code(code) => f.debug_tuple("Code").field(code).finish(),
            AttributeValue::Deprecated => f.write_str("Deprecated"),
            AttributeValue::Exceptions(v) => f.debug_tuple("Exceptions").field(v).finish(),
            AttributeValue::InnerClasses(v) => f.debug_tuple("InnerClasses").field(v).finish(),
            AttributeValue::LineNumberTable(v) => f.debug_tuple("LineNumberTable").field(v).finish(),
            AttributeValue::LocalVariableTable(v) => {
                f.debug_tuple("LocalVariableTable").field(v).finish()
            }
            AttributeValue::RuntimeVisibleAnnotations(v) => {
                f.debug_tuple("RuntimeVisibleAnnotations").field(v).finish()
            }
            AttributeValue::RuntimeInvisibleAnnotations(v) => {
                f.debug_tuple("RuntimeInvisibleAnnotations").field(v).finish()
            }
            AttributeValue::AnnotationDefault(v) => f.debug_tuple("AnnotationDefault").field(v).finish(),
            AttributeValue::Signature(v) => f.debug_tuple("Signature").field(v).finish(),
            AttributeValue::SourceFile(v) => f.debug_tuple("SourceFile").field(v).finish(),
            AttributeValue::Synthetic => f.write_str("Synthetic"),
            AttributeValue::Unknown(info) => f
                .debug_tuple("Unknown")
                .field(&format!("({} bytes)", info.len()))
                .finish(),
        }
    }
}

/// Attributes of a class, field, method or code body, in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn find_by_kind(&self, kind: AttributeKind) -> Option<&AttributeValue> {
        self.0
            .iter()
            .map(|a| &a.value)
            .find(|value| value.kind() == Some(kind))
    }

    pub fn constant_value(&self) -> Option<&ConstantValue> {
        match self.find_by_kind(AttributeKind::ConstantValue)? {
            AttributeValue::ConstantValue(v) => Some(v),
            _ => None,
        }
    }

    pub fn code_attribute(&self) -> Option<&CodeAttribute> {
        match self.find_by_kind(AttributeKind::Code)? {
            AttributeValue::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn exceptions(&self) -> Option<&[String]> {
        match self.find_by_kind(AttributeKind::Exceptions)? {
            AttributeValue::Exceptions(exceptions) => Some(exceptions),
            _ => None,
        }
    }

    pub fn inner_classes(&self) -> Option<&[InnerClass]> {
        match self.find_by_kind(AttributeKind::InnerClasses)? {
            AttributeValue::InnerClasses(inner_classes) => Some(inner_classes),
            _ => None,
        }
    }

    pub fn line_numbers(&self) -> Option<&[LineNumber]> {
        match self.find_by_kind(AttributeKind::LineNumberTable)? {
            AttributeValue::LineNumberTable(line_numbers) => Some(line_numbers),
            _ => None,
        }
    }

    pub fn local_variables(&self) -> Option<&[LocalVariable]> {
        match self.find_by_kind(AttributeKind::LocalVariableTable)? {
            AttributeValue::LocalVariableTable(local_variables) => Some(local_variables),
            _ => None,
        }
    }

    pub fn runtime_visible_annotations(&self) -> Option<&[Annotation]> {
        match self.find_by_kind(AttributeKind::RuntimeVisibleAnnotations)? {
            AttributeValue::RuntimeVisibleAnnotations(annotations) => Some(annotations),
            _ => None,
        }
    }

    pub fn runtime_invisible_annotations(&self) -> Option<&[Annotation]> {
        match self.find_by_kind(AttributeKind::RuntimeInvisibleAnnotations)? {
            AttributeValue::RuntimeInvisibleAnnotations(annotations) => Some(annotations),
            _ => None,
        }
    }

    pub fn annotation_default(&self) -> Option<&ElementValue> {
        match self.find_by_kind(AttributeKind::AnnotationDefault)? {
            AttributeValue::AnnotationDefault(value) => Some(value),
            _ => None,
        }
    }

    pub fn signature(&self) -> Option<&str> {
        match self.find_by_kind(AttributeKind::Signature)? {
            AttributeValue::Signature(signature) => Some(signature),
            _ => None,
        }
    }

    pub fn source_file(&self) -> Option<&str> {
        match self.find_by_kind(AttributeKind::SourceFile)? {
            AttributeValue::SourceFile(source_file) => Some(source_file),
            _ => None,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.find_by_kind(AttributeKind::Deprecated).is_some()
    }

    pub fn is_synthetic(&self) -> bool {
        self.find_by_kind(AttributeKind::Synthetic).is_some()
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Binary name of the caught class, `None` for a handler that catches
    /// everything.
    pub catch_type: Option<String>,
}

#[derive(Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl fmt::Debug for CodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAttribute")
            .field("max_stack", &self.max_stack)
            .field("max_locals", &self.max_locals)
            .field("code", &format!("({} bytes)", self.code.len()))
            .field("exception_table", &self.exception_table)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub name: String,
    /// `None` when the class is not a member of another class.
    pub outer_name: Option<String>,
    /// `None` for anonymous classes.
    pub simple_name: Option<String>,
    pub access_flags: AccessFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub index: u16,
}
