use std::{fmt, io};

use thiserror::Error;

/// Failure of a whole decode.
#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] io::Error),
    #[error("Malformed class file: {}", join_errors(.0))]
    Malformed(Vec<ParseError>),
}

impl ClassFileError {
    /// The errors accumulated before the decode was aborted.
    pub fn parse_errors(&self) -> &[ParseError] {
        match self {
            ClassFileError::Malformed(errors) => errors,
            ClassFileError::IOError(_) => &[],
        }
    }
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    #[error("Invalid magic identifier")]
    MagicInvalid,
    #[error("Unknown major version")]
    UnknownMajorVersion,
    #[error("Invalid cp info tag")]
    ConstantPoolTagInvalid,
    #[error("Unexpected end of class data")]
    Truncated,
    #[error("Invalid class name index")]
    ClassNameIndexInvalid,
    #[error("Invalid super class name index")]
    SuperClassNameIndexInvalid,
    #[error("Invalid interface name index")]
    InterfaceNameIndexInvalid,
    #[error("Invalid field name index")]
    FieldNameIndexInvalid,
    #[error("Invalid field descriptor index")]
    FieldDescriptorIndexInvalid,
    #[error("Invalid field descriptor")]
    FieldDescriptorInvalid,
    #[error("Invalid method name index")]
    MethodNameIndexInvalid,
    #[error("Invalid method descriptor index")]
    MethodDescriptorIndexInvalid,
    #[error("Invalid method descriptor")]
    MethodDescriptorInvalid,
    #[error("Invalid attribute name index")]
    AttributeNameIndexInvalid,
    #[error("Attribute length does not match its content")]
    AttributeLengthInvalid,
    #[error("Attribute nested too deeply")]
    AttributeNestingTooDeep,
    #[error("Invalid constant value index")]
    ConstantValueIndexInvalid,
    #[error("Invalid code catch type index")]
    CodeCatchTypeIndexInvalid,
    #[error("Invalid exceptions class index")]
    ExceptionsClassIndexInvalid,
    #[error("Invalid inner class index")]
    InnerClassIndexInvalid,
    #[error("Invalid inner class outer class index")]
    InnerClassOuterIndexInvalid,
    #[error("Invalid inner class name index")]
    InnerClassNameIndexInvalid,
    #[error("Invalid local variable name index")]
    LocalVariableNameIndexInvalid,
    #[error("Invalid local variable descriptor index")]
    LocalVariableDescriptorIndexInvalid,
    #[error("Invalid local variable descriptor")]
    LocalVariableDescriptorInvalid,
    #[error("Invalid signature index")]
    SignatureIndexInvalid,
    #[error("Invalid source file index")]
    SourceFileIndexInvalid,
    #[error("Invalid annotation type index")]
    AnnotationTypeIndexInvalid,
    #[error("Invalid annotation type")]
    AnnotationTypeInvalid,
    #[error("Invalid annotation element name index")]
    AnnotationNameIndexInvalid,
    #[error("Invalid annotation element value tag")]
    AnnotationValueTagInvalid,
    #[error("Invalid annotation constant value index")]
    AnnotationConstIndexInvalid,
    #[error("Invalid annotation enum type index")]
    AnnotationEnumTypeIndexInvalid,
    #[error("Invalid annotation enum constant index")]
    AnnotationEnumConstIndexInvalid,
    #[error("Invalid annotation class index")]
    AnnotationClassIndexInvalid,
    #[error("Invalid annotation class")]
    AnnotationClassInvalid,
    #[error("Annotation values nested too deeply")]
    AnnotationNestingTooDeep,
}

/// Context attached to a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    Index(u16),
    Value(i64),
    Text(String),
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Index(index) => write!(f, "#{}", index),
            ErrorDetail::Value(value) => write!(f, "0x{:X}", value),
            ErrorDetail::Text(text) => write!(f, "{:?}", text),
        }
    }
}

/// A problem found while decoding, recorded in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub detail: Option<ErrorDetail>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_index(kind: ParseErrorKind, index: u16) -> Self {
        Self {
            kind,
            detail: Some(ErrorDetail::Index(index)),
        }
    }

    pub fn with_value(kind: ParseErrorKind, value: impl Into<i64>) -> Self {
        Self {
            kind,
            detail: Some(ErrorDetail::Value(value.into())),
        }
    }

    pub fn with_text(kind: ParseErrorKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(ErrorDetail::Text(text.into())),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ParseError {}

/// Unwinds decoding to the nearest point that can resynchronize.
#[derive(Debug)]
pub(crate) enum Failure {
    Io(io::Error),
    Parse(ParseError),
}

impl From<io::Error> for Failure {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => Failure::Parse(ParseError::new(ParseErrorKind::Truncated)),
            _ => Failure::Io(error),
        }
    }
}

impl From<ParseError> for Failure {
    fn from(error: ParseError) -> Self {
        Failure::Parse(error)
    }
}

/// Invalid type or method descriptor text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Unexpected end of descriptor at {0}")]
    UnexpectedEnd(usize),
    #[error("Invalid type character {0:?}")]
    InvalidTypeChar(char),
    #[error("Reference type without terminating ';'")]
    UnterminatedReference,
    #[error("Reference type with an empty name")]
    EmptyReferenceName,
    #[error("Method descriptor does not start with '('")]
    MissingParameterList,
    #[error("Method descriptor shorter than \"()V\"")]
    TooShort,
    #[error("Unexpected characters after descriptor at {0}")]
    TrailingCharacters(usize),
}
