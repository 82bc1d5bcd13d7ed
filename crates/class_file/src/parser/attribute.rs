use std::io::Read;

use log::{debug, trace};

use super::{require_class_name, require_name, Parser, Result};
use crate::{
    attributes::{
        Attribute, AttributeKind, AttributeValue, CodeAttribute, ExceptionTableEntry, InnerClass,
        LineNumber, LocalVariable,
    },
    descriptor::TypeDescriptor,
    error::Failure,
    AccessFlags, ConstantPool, ParseError, ParseErrorKind,
};

impl<R: Read> Parser<R> {
    /// Reads one attribute. `None` means it was dropped and the reason
    /// recorded; the stream is positioned after it either way.
    ///
    /// `depth` counts the Code attributes enclosing this one. Code itself is
    /// only accepted at depth 0.
    pub(super) fn parse_attribute(
        &mut self,
        cp: &ConstantPool,
        depth: usize,
    ) -> Result<Option<Attribute>> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;
        let info = self.read_bytes(attribute_length as usize)?;

        let name = match self.resolve_name(
            cp,
            attribute_name_index,
            ParseErrorKind::AttributeNameIndexInvalid,
        ) {
            Some(name) => name,
            None => return Ok(None),
        };
        let kind = match AttributeKind::from_name(&name) {
            Some(kind) => kind,
            None => {
                trace!("keeping {} attribute as {} raw bytes", name, info.len());
                return Ok(Some(Attribute {
                    name,
                    value: AttributeValue::Unknown(info),
                }));
            }
        };

        if kind == AttributeKind::Code && depth > 0 {
            self.record(ParseError::with_text(ParseErrorKind::AttributeNestingTooDeep, name));
            return Ok(None);
        }

        let mut body = Parser::new(info.as_slice());
        let result = body.parse_attribute_value(kind, cp, depth);
        // Code is dropped with any of its children
        let partial = kind == AttributeKind::Code && !body.errors.is_empty();
        let remaining = body.r.len();
        self.errors.append(&mut body.errors);

        match result {
            Ok(_) if partial => {
                debug!("dropping {} attribute", name);
                Ok(None)
            }
            Ok(value) if remaining == 0 => Ok(Some(Attribute { name, value })),
            Ok(_) => {
                debug!("{} attribute has {} trailing bytes", name, remaining);
                self.record(ParseError::with_text(ParseErrorKind::AttributeLengthInvalid, name));
                Ok(None)
            }
            Err(Failure::Parse(error)) if error.kind == ParseErrorKind::Truncated => {
                self.record(ParseError::with_text(ParseErrorKind::AttributeLengthInvalid, name));
                Ok(None)
            }
            Err(Failure::Parse(error)) => {
                self.record(error);
                Ok(None)
            }
            Err(Failure::Io(error)) => Err(Failure::Io(error)),
        }
    }

    fn parse_attribute_value(
        &mut self,
        kind: AttributeKind,
        cp: &ConstantPool,
        depth: usize,
    ) -> Result<AttributeValue> {
        let value = match kind {
            AttributeKind::ConstantValue => {
                let index = self.read_u16()?;
                let value = cp.find_value(index).ok_or_else(|| {
                    ParseError::with_index(ParseErrorKind::ConstantValueIndexInvalid, index)
                })?;
                AttributeValue::ConstantValue(value)
            }
            AttributeKind::Code => AttributeValue::Code(self.parse_code_attribute(cp, depth)?),
            AttributeKind::Deprecated => AttributeValue::Deprecated,
            AttributeKind::Exceptions => AttributeValue::Exceptions(self.parse_exceptions(cp)?),
            AttributeKind::InnerClasses => {
                let count = self.read_u16()?;
                let inner_classes = (0..count)
                    .map(|_| self.parse_inner_class(cp))
                    .collect::<Result<_>>()?;
                AttributeValue::InnerClasses(inner_classes)
            }
            AttributeKind::LineNumberTable => {
                let count = self.read_u16()?;
                let line_numbers = (0..count)
                    .map(|_| -> Result<LineNumber> {
                        Ok(LineNumber {
                            start_pc: self.read_u16()?,
                            line_number: self.read_u16()?,
                        })
                    })
                    .collect::<Result<_>>()?;
                AttributeValue::LineNumberTable(line_numbers)
            }
            AttributeKind::LocalVariableTable => {
                let count = self.read_u16()?;
                let local_variables = (0..count)
                    .map(|_| self.parse_local_variable(cp))
                    .collect::<Result<_>>()?;
                AttributeValue::LocalVariableTable(local_variables)
            }
            AttributeKind::RuntimeVisibleAnnotations => {
                AttributeValue::RuntimeVisibleAnnotations(self.parse_annotations(cp)?)
            }
            AttributeKind::RuntimeInvisibleAnnotations => {
                AttributeValue::RuntimeInvisibleAnnotations(self.parse_annotations(cp)?)
            }
            AttributeKind::AnnotationDefault => {
                AttributeValue::AnnotationDefault(self.parse_element_value(cp, 0)?)
            }
            AttributeKind::Signature => {
                let index = self.read_u16()?;
                let signature = require_name(cp, index, ParseErrorKind::SignatureIndexInvalid)?;
                AttributeValue::Signature(signature.to_owned())
            }
            AttributeKind::SourceFile => {
                let index = self.read_u16()?;
                let source_file = require_name(cp, index, ParseErrorKind::SourceFileIndexInvalid)?;
                AttributeValue::SourceFile(source_file.to_owned())
            }
            AttributeKind::Synthetic => AttributeValue::Synthetic,
        };

        Ok(value)
    }

    fn parse_code_attribute(&mut self, cp: &ConstantPool, depth: usize) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;

        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry(cp))
            .collect::<Result<_>>()?;

        let attributes = self.parse_attributes(cp, depth + 1)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self, cp: &ConstantPool) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type_index = self.read_u16()?;
        // 0 catches everything
        let catch_type = match catch_type_index {
            0 => None,
            index => Some(require_class_name(
                cp,
                index,
                ParseErrorKind::CodeCatchTypeIndexInvalid,
            )?),
        };

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_exceptions(&mut self, cp: &ConstantPool) -> Result<Vec<String>> {
        let number_of_exceptions = self.read_u16()?;
        (0..number_of_exceptions)
            .map(|_| -> Result<String> {
                let index = self.read_u16()?;
                require_class_name(cp, index, ParseErrorKind::ExceptionsClassIndexInvalid)
            })
            .collect()
    }

    fn parse_inner_class(&mut self, cp: &ConstantPool) -> Result<InnerClass> {
        let inner_class_info_index = self.read_u16()?;
        let outer_class_info_index = self.read_u16()?;
        let inner_name_index = self.read_u16()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);

        let name = require_class_name(
            cp,
            inner_class_info_index,
            ParseErrorKind::InnerClassIndexInvalid,
        )?;
        let outer_name = match outer_class_info_index {
            0 => None,
            index => Some(require_class_name(
                cp,
                index,
                ParseErrorKind::InnerClassOuterIndexInvalid,
            )?),
        };
        let simple_name = match inner_name_index {
            0 => None,
            index => Some(
                require_name(cp, index, ParseErrorKind::InnerClassNameIndexInvalid)?.to_owned(),
            ),
        };

        Ok(InnerClass {
            name,
            outer_name,
            simple_name,
            access_flags,
        })
    }

    fn parse_local_variable(&mut self, cp: &ConstantPool) -> Result<LocalVariable> {
        let start_pc = self.read_u16()?;
        let length = self.read_u16()?;
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let index = self.read_u16()?;

        let name = require_name(cp, name_index, ParseErrorKind::LocalVariableNameIndexInvalid)?;
        let descriptor = require_name(
            cp,
            descriptor_index,
            ParseErrorKind::LocalVariableDescriptorIndexInvalid,
        )?;
        let descriptor = TypeDescriptor::parse(descriptor).map_err(|_| {
            ParseError::with_text(ParseErrorKind::LocalVariableDescriptorInvalid, descriptor)
        })?;

        Ok(LocalVariable {
            start_pc,
            length,
            name: name.to_owned(),
            descriptor,
            index,
        })
    }
}
