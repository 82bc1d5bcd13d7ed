use std::io::Read;

use super::{require_name, Parser, Result};
use crate::{
    annotation::{Annotation, ElementConst, ElementValue, ElementValuePair},
    constant_pool::ConstantValue,
    descriptor::{internal_to_binary_name, TypeDescriptor},
    ConstantPool, NameRef, ParseError, ParseErrorKind,
};

// Deepest nesting of annotations and arrays inside one element value.
const MAX_NESTING: usize = 255;

impl<R: Read> Parser<R> {
    pub(super) fn parse_annotations(&mut self, cp: &ConstantPool) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(cp, 0))
            .collect()
    }

    fn parse_annotation(&mut self, cp: &ConstantPool, depth: usize) -> Result<Annotation> {
        let type_index = self.read_u16()?;
        let type_descriptor =
            require_name(cp, type_index, ParseErrorKind::AnnotationTypeIndexInvalid)?;
        let type_name = TypeDescriptor::parse(type_descriptor)
            .ok()
            .and_then(|descriptor| descriptor.reference_name().map(str::to_owned))
            .ok_or_else(|| {
                ParseError::with_text(ParseErrorKind::AnnotationTypeInvalid, type_descriptor)
            })?;

        let num_element_value_pairs = self.read_u16()?;
        let values = (0..num_element_value_pairs)
            .map(|_| -> Result<ElementValuePair> {
                let name_index = self.read_u16()?;
                let name = self
                    .resolve_name(cp, name_index, ParseErrorKind::AnnotationNameIndexInvalid)
                    .map_or(NameRef::Unresolved(name_index), NameRef::Named);
                let value = self.parse_element_value(cp, depth)?;
                Ok(ElementValuePair { name, value })
            })
            .collect::<Result<_>>()?;

        Ok(Annotation { type_name, values })
    }

    pub(super) fn parse_element_value(
        &mut self,
        cp: &ConstantPool,
        depth: usize,
    ) -> Result<ElementValue> {
        if depth > MAX_NESTING {
            return Err(ParseError::new(ParseErrorKind::AnnotationNestingTooDeep).into());
        }

        let tag = self.read_u8()?;
        let value = match tag {
            b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D' | b'Z' | b's' => {
                let index = self.read_u16()?;
                match parse_const_value(cp, tag, index) {
                    Some(value) => ElementValue::Const(value),
                    None => {
                        self.record(ParseError::with_index(
                            ParseErrorKind::AnnotationConstIndexInvalid,
                            index,
                        ));
                        ElementValue::Unresolved { tag, index }
                    }
                }
            }
            b'e' => {
                let type_name_index = self.read_u16()?;
                let const_name_index = self.read_u16()?;
                let type_name = require_name(
                    cp,
                    type_name_index,
                    ParseErrorKind::AnnotationEnumTypeIndexInvalid,
                )?;
                let const_name = require_name(
                    cp,
                    const_name_index,
                    ParseErrorKind::AnnotationEnumConstIndexInvalid,
                )?;
                ElementValue::Enum {
                    type_name: enum_type_name(type_name),
                    const_name: const_name.to_owned(),
                }
            }
            b'c' => {
                let class_info_index = self.read_u16()?;
                let descriptor = require_name(
                    cp,
                    class_info_index,
                    ParseErrorKind::AnnotationClassIndexInvalid,
                )?;
                let class = TypeDescriptor::parse(descriptor).map_err(|_| {
                    ParseError::with_text(ParseErrorKind::AnnotationClassInvalid, descriptor)
                })?;
                ElementValue::Class(class.data_class_name().to_owned())
            }
            b'@' => ElementValue::Annotation(self.parse_annotation(cp, depth + 1)?),
            b'[' => {
                let num_values = self.read_u16()?;
                let values = (0..num_values)
                    .map(|_| self.parse_element_value(cp, depth + 1))
                    .collect::<Result<_>>()?;
                ElementValue::Array(values)
            }
            _ => {
                return Err(
                    ParseError::with_value(ParseErrorKind::AnnotationValueTagInvalid, tag).into(),
                )
            }
        };

        Ok(value)
    }
}

/// Resolves a constant element. `B`, `C`, `S` and `Z` are stored as
/// `Integer` entries and narrowed here.
fn parse_const_value(cp: &ConstantPool, tag: u8, index: u16) -> Option<ElementConst> {
    if tag == b's' {
        return cp
            .find_name(index)
            .map(|text| ElementConst::String(text.to_owned()));
    }

    let value = match (tag, cp.find_value(index)?) {
        (b'B', ConstantValue::Integer(i)) => ElementConst::Byte(i as i8),
        (b'C', ConstantValue::Integer(i)) => ElementConst::Char(i as u16),
        (b'S', ConstantValue::Integer(i)) => ElementConst::Short(i as i16),
        (b'Z', ConstantValue::Integer(i)) => ElementConst::Boolean(i != 0),
        (b'I', ConstantValue::Integer(i)) => ElementConst::Int(i),
        (b'J', ConstantValue::Long(l)) => ElementConst::Long(l),
        (b'F', ConstantValue::Float(f)) => ElementConst::Float(f),
        (b'D', ConstantValue::Double(d)) => ElementConst::Double(d),
        _ => return None,
    };

    Some(value)
}

/// Enum types are stored as field descriptors, but some compilers emit the
/// bare internal name.
fn enum_type_name(descriptor: &str) -> String {
    match TypeDescriptor::parse(descriptor) {
        Ok(TypeDescriptor {
            array_depth: 0,
            base,
        }) if base.is_reference() => base.name().to_owned(),
        _ => internal_to_binary_name(descriptor),
    }
}
