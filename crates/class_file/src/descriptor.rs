// The grammar for descriptors is:
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
//
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
// "V" is accepted anywhere a base type may appear.

use std::{fmt, str::FromStr};

use crate::DescriptorError;

type Result<T, E = DescriptorError> = std::result::Result<T, E>;

/// Converts an internal class name (`java/lang/String`) to its binary form
/// (`java.lang.String`).
pub fn internal_to_binary_name(name: &str) -> String {
    name.replace('/', ".")
}

/// Position inside a descriptor string.
///
/// A method descriptor packs its parameter types and its return type without
/// separators, so parsing passes the cursor along and gets the advanced one
/// back from every [`parse_type`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorCursor<'a> {
    text: &'a str,
    pos: usize,
}
impl<'a> DescriptorCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::at(text, 0)
    }

    pub fn at(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn advance(self, n: usize) -> Self {
        Self {
            text: self.text,
            pos: self.pos + n,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos..)?.chars().next()
    }
}

/// Base type of a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
    /// An object type, named in binary form (`java.lang.String`).
    Reference(String),
}
impl BaseType {
    fn primitive(tag: u8) -> Option<Self> {
        Some(match tag {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            b'V' => BaseType::Void,
            _ => return None,
        })
    }

    /// The descriptor character of this base type.
    pub fn tag(&self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
            BaseType::Void => 'V',
            BaseType::Reference(_) => 'L',
        }
    }

    pub fn is_primitive(&self) -> bool {
        !self.is_reference()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, BaseType::Reference(_))
    }

    /// The Java keyword of a primitive, or the name of a reference type.
    pub fn name(&self) -> &str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
            BaseType::Void => "void",
            BaseType::Reference(name) => name,
        }
    }
}

/// Type of a field, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub array_depth: usize,
    pub base: BaseType,
}
impl TypeDescriptor {
    /// Parses a descriptor that must span the whole `text`.
    pub fn parse(text: &str) -> Result<Self> {
        let (descriptor, cursor) = parse_type(DescriptorCursor::new(text))?;
        if !cursor.is_at_end() {
            return Err(DescriptorError::TrailingCharacters(cursor.position()));
        }
        Ok(descriptor)
    }

    pub fn is_array(&self) -> bool {
        self.array_depth > 0
    }

    pub fn reference_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// The name of the element type with all array and reference decoration
    /// stripped.
    pub fn data_class_name(&self) -> &str {
        self.base.name()
    }
}
impl FromStr for TypeDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.name())?;
        for _ in 0..self.array_depth {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Parses one type starting at `cursor`, returning it with the cursor moved
/// just past it.
pub fn parse_type(cursor: DescriptorCursor<'_>) -> Result<(TypeDescriptor, DescriptorCursor<'_>)> {
    let mut cursor = cursor;
    let mut array_depth = 0;
    while cursor.peek() == Some(b'[') {
        array_depth += 1;
        cursor = cursor.advance(1);
    }

    let tag = cursor
        .peek()
        .ok_or(DescriptorError::UnexpectedEnd(cursor.position()))?;
    if tag == b'L' {
        let start = cursor.position() + 1;
        let end = cursor.text[start..]
            .find(';')
            .map(|i| start + i)
            .ok_or(DescriptorError::UnterminatedReference)?;
        if end == start {
            return Err(DescriptorError::EmptyReferenceName);
        }
        let name = internal_to_binary_name(&cursor.text[start..end]);
        let descriptor = TypeDescriptor {
            array_depth,
            base: BaseType::Reference(name),
        };
        return Ok((descriptor, DescriptorCursor::at(cursor.text, end + 1)));
    }

    match BaseType::primitive(tag) {
        Some(base) => Ok((TypeDescriptor { array_depth, base }, cursor.advance(1))),
        None => Err(DescriptorError::InvalidTypeChar(
            cursor.current_char().unwrap_or(char::REPLACEMENT_CHARACTER),
        )),
    }
}

/// Parameter and return types of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
}
impl MethodDescriptor {
    pub fn parse(text: &str) -> Result<Self> {
        // "()V" is the shortest method descriptor
        if text.len() < 3 {
            return Err(DescriptorError::TooShort);
        }
        if !text.starts_with('(') {
            return Err(DescriptorError::MissingParameterList);
        }

        let mut cursor = DescriptorCursor::at(text, 1);
        let mut parameters = Vec::new();
        loop {
            match cursor.peek() {
                Some(b')') => break,
                Some(_) => {
                    let (parameter, next) = parse_type(cursor)?;
                    parameters.push(parameter);
                    cursor = next;
                }
                None => return Err(DescriptorError::UnexpectedEnd(cursor.position())),
            }
        }

        let (return_type, cursor) = parse_type(cursor.advance(1))?;
        if !cursor.is_at_end() {
            return Err(DescriptorError::TrailingCharacters(cursor.position()));
        }

        Ok(Self {
            parameters,
            return_type,
        })
    }
}
impl FromStr for MethodDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", parameter)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}
