mod annotation;
mod attribute;

use std::{io::Read, mem};

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};

use crate::{
    attributes::Attributes,
    class_file::{FieldInfo, MethodInfo, NameRef},
    constant_pool::{self, CpInfo},
    descriptor::{internal_to_binary_name, MethodDescriptor, TypeDescriptor},
    error::Failure,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, JdkVersion, ParseError, ParseErrorKind,
};

type Result<T, E = Failure> = std::result::Result<T, E>;
type Endian = BigEndian;

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

// Largest block allocated before its bytes have actually been read.
const PREALLOCATE_LIMIT: usize = 16 * 1024;

/// Decodes a class file from a byte source.
///
/// The source is read sequentially and never past the end of the class, so
/// a `Parser` can decode one class out of a longer stream. Wrap unbuffered
/// sources in a `BufReader` yourself if needed.
pub struct Parser<R> {
    r: R,
    errors: Vec<ParseError>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r,
            errors: Vec::new(),
        }
    }

    pub fn parse(&mut self) -> crate::Result<ClassFile> {
        let result = self.parse_class_file();
        self.finish(result)
    }

    /// Reads a constant pool on its own, starting at its entry count.
    pub fn parse_constant_pool(&mut self) -> crate::Result<ConstantPool> {
        let result = self.read_constant_pool();
        self.finish(result)
    }

    fn finish<T>(&mut self, result: Result<T>) -> crate::Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(Failure::Parse(error)) => {
                debug!("aborting class file: {}", error);
                self.errors.push(error);
                Err(ClassFileError::Malformed(mem::take(&mut self.errors)))
            }
            Err(Failure::Io(error)) => Err(ClassFileError::IOError(error)),
        }
    }

    fn record(&mut self, error: ParseError) {
        debug!("recoverable: {}", error);
        self.errors.push(error);
    }

    fn parse_class_file(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;
        if JdkVersion::from_major(major_version).is_none() {
            self.record(ParseError::with_value(
                ParseErrorKind::UnknownMajorVersion,
                major_version,
            ));
        }

        let constant_pool = self.read_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);

        let this_class_index = self.read_u16()?;
        let this_class = self.resolve_class_ref(
            &constant_pool,
            this_class_index,
            ParseErrorKind::ClassNameIndexInvalid,
        );
        let super_class_index = self.read_u16()?;
        // Only java.lang.Object has no super class.
        let super_class = if super_class_index == 0 {
            NameRef::Absent
        } else {
            self.resolve_class_ref(
                &constant_pool,
                super_class_index,
                ParseErrorKind::SuperClassNameIndexInvalid,
            )
        };

        let interfaces = self.parse_interfaces(&constant_pool)?;

        let fields_count = self.read_u16()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.extend(self.parse_field_info(&constant_pool)?);
        }

        let methods_count = self.read_u16()?;
        let mut all_methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            all_methods.extend(self.parse_method_info(&constant_pool)?);
        }
        let (constructors, methods) = all_methods
            .into_iter()
            .partition::<Vec<_>, _>(MethodInfo::is_constructor);

        let attributes = self.parse_attributes(&constant_pool, 0)?;

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            constructors,
            methods,
            attributes,
            errors: mem::take(&mut self.errors),
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ParseError::with_value(
                ParseErrorKind::MagicInvalid,
                magic_identifier,
            )
            .into()),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn read_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        // index 0 is never stored
        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let cp_info = self.parse_cp_info()?;
            let slot_size = cp_info.slot_size();
            res.push(cp_info);
            (1..slot_size).for_each(|_| res.push(CpInfo::Unusable));

            count = count.saturating_sub(slot_size);
        }
        trace!("read constant pool with {} slots", res.len());

        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<CpInfo> {
        let tag = self.read_u8()?;
        let cp_info = match tag {
            1 => self.parse_utf8()?,
            3 => CpInfo::Integer(self.read_i32()?),
            4 => CpInfo::Float(self.r.read_f32::<Endian>()?),
            5 => CpInfo::Long(self.r.read_i64::<Endian>()?),
            6 => CpInfo::Double(self.r.read_f64::<Endian>()?),
            7 => CpInfo::Class(constant_pool::ClassInfo {
                name_index: self.read_u16()?,
            }),
            8 => CpInfo::String {
                string_index: self.read_u16()?,
            },
            9 => CpInfo::FieldRef(self.parse_ref_info()?),
            10 => CpInfo::MethodRef(self.parse_ref_info()?),
            11 => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            12 => self.parse_name_and_type_info()?,
            15 => self.parse_method_handle()?,
            16 => CpInfo::MethodType(constant_pool::MethodTypeInfo {
                descriptor_index: self.read_u16()?,
            }),
            17 => CpInfo::Dynamic(self.parse_invoke_dynamic_info()?),
            18 => CpInfo::InvokeDynamic(self.parse_invoke_dynamic_info()?),
            19 => CpInfo::Module {
                name_index: self.read_u16()?,
            },
            20 => CpInfo::Package {
                name_index: self.read_u16()?,
            },
            // entry sizes depend on the tag, nothing after this can be located
            _ => {
                return Err(
                    ParseError::with_value(ParseErrorKind::ConstantPoolTagInvalid, tag).into(),
                )
            }
        };

        Ok(cp_info)
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(String::from_utf8_lossy(&bytes).into()))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(constant_pool::NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(constant_pool::MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_invoke_dynamic_info(&mut self) -> Result<constant_pool::InvokeDynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::InvokeDynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<constant_pool::RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_interfaces(&mut self, cp: &ConstantPool) -> Result<Vec<String>> {
        let interfaces_count = self.read_u16()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            let index = self.read_u16()?;
            interfaces.extend(self.resolve_class_name(
                cp,
                index,
                ParseErrorKind::InterfaceNameIndexInvalid,
            ));
        }
        Ok(interfaces)
    }

    fn parse_field_info(&mut self, cp: &ConstantPool) -> Result<Option<FieldInfo>> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let name = self.resolve_name(cp, name_index, ParseErrorKind::FieldNameIndexInvalid);
        let descriptor_index = self.read_u16()?;
        let descriptor = match name {
            Some(_) => self.resolve_field_descriptor(cp, descriptor_index),
            None => None,
        };
        // always consumed so the next field starts in the right place
        let attributes = self.parse_attributes(cp, 0)?;

        Ok(name
            .zip(descriptor)
            .map(|(name, descriptor)| FieldInfo {
                access_flags,
                name,
                descriptor,
                attributes,
            }))
    }

    fn parse_method_info(&mut self, cp: &ConstantPool) -> Result<Option<MethodInfo>> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let name = self.resolve_name(cp, name_index, ParseErrorKind::MethodNameIndexInvalid);
        let descriptor_index = self.read_u16()?;
        let descriptor = match name {
            Some(_) => self.resolve_method_descriptor(cp, descriptor_index),
            None => None,
        };
        let attributes = self.parse_attributes(cp, 0)?;

        Ok(name
            .zip(descriptor)
            .map(|(name, descriptor)| MethodInfo {
                access_flags,
                name,
                descriptor,
                attributes,
            }))
    }

    fn parse_attributes(&mut self, cp: &ConstantPool, depth: usize) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        for _ in 0..attributes_count {
            attributes.extend(self.parse_attribute(cp, depth)?);
        }
        Ok(Attributes(attributes))
    }

    fn resolve_name(
        &mut self,
        cp: &ConstantPool,
        index: u16,
        kind: ParseErrorKind,
    ) -> Option<String> {
        let name = cp.find_name(index).map(str::to_owned);
        if name.is_none() {
            self.record(ParseError::with_index(kind, index));
        }
        name
    }

    fn resolve_class_name(
        &mut self,
        cp: &ConstantPool,
        index: u16,
        kind: ParseErrorKind,
    ) -> Option<String> {
        let name = cp.find_class_name(index).map(internal_to_binary_name);
        if name.is_none() {
            self.record(ParseError::with_index(kind, index));
        }
        name
    }

    fn resolve_class_ref(
        &mut self,
        cp: &ConstantPool,
        index: u16,
        kind: ParseErrorKind,
    ) -> NameRef {
        match self.resolve_class_name(cp, index, kind) {
            Some(name) => NameRef::Named(name),
            None => NameRef::Unresolved(index),
        }
    }

    fn resolve_field_descriptor(
        &mut self,
        cp: &ConstantPool,
        index: u16,
    ) -> Option<TypeDescriptor> {
        let text = self.resolve_name(cp, index, ParseErrorKind::FieldDescriptorIndexInvalid)?;
        match TypeDescriptor::parse(&text) {
            Ok(descriptor) => Some(descriptor),
            Err(error) => {
                debug!("field descriptor {:?}: {}", text, error);
                self.record(ParseError::with_text(
                    ParseErrorKind::FieldDescriptorInvalid,
                    text,
                ));
                None
            }
        }
    }

    fn resolve_method_descriptor(
        &mut self,
        cp: &ConstantPool,
        index: u16,
    ) -> Option<MethodDescriptor> {
        let text = self.resolve_name(cp, index, ParseErrorKind::MethodDescriptorIndexInvalid)?;
        match MethodDescriptor::parse(&text) {
            Ok(descriptor) => Some(descriptor),
            Err(error) => {
                debug!("method descriptor {:?}: {}", text, error);
                self.record(ParseError::with_text(
                    ParseErrorKind::MethodDescriptorInvalid,
                    text,
                ));
                None
            }
        }
    }

    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(length.min(PREALLOCATE_LIMIT));
        self.r.by_ref().take(length as u64).read_to_end(&mut bytes)?;
        if bytes.len() != length {
            return Err(ParseError::new(ParseErrorKind::Truncated).into());
        }
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}

/// Looks up a `Utf8` entry inside an attribute body, where a missing entry
/// abandons the attribute.
fn require_name<'c>(cp: &'c ConstantPool, index: u16, kind: ParseErrorKind) -> Result<&'c str> {
    cp.find_name(index)
        .ok_or_else(|| ParseError::with_index(kind, index).into())
}

/// Like [`require_name`] for `Class` entries, returning the binary name.
fn require_class_name(cp: &ConstantPool, index: u16, kind: ParseErrorKind) -> Result<String> {
    cp.find_class_name(index)
        .map(internal_to_binary_name)
        .ok_or_else(|| ParseError::with_index(kind, index).into())
}
