#![allow(dead_code)]

use std::collections::HashMap;

use byteorder::{BigEndian, WriteBytesExt};

pub const OBJECT: &str = "java/lang/Object";

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

/// Big-endian byte writer for class file fragments.
#[derive(Debug, Default, Clone)]
pub struct Bytes(pub Vec<u8>);
impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.0.write_u8(value).unwrap();
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.0.write_u16::<BigEndian>(value).unwrap();
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.0.write_u32::<BigEndian>(value).unwrap();
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

/// Assembles a class file in memory, handing out constant pool indices as
/// entries are added.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pool: Vec<u8>,
    next_index: u16,
    utf8s: HashMap<String, u16>,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    /// A public class `name` extending `java.lang.Object`, major version 52.
    pub fn new(name: &str) -> Self {
        let mut builder = Self::empty();
        builder.access_flags = 0x0021;
        builder.this_class = builder.class(name);
        builder.super_class = builder.class(OBJECT);
        builder
    }

    /// No pool entries, and this/super class indices of 0.
    pub fn empty() -> Self {
        Self {
            magic: 0xCAFEBABE,
            minor_version: 0,
            major_version: 52,
            access_flags: 0,
            this_class: 0,
            super_class: 0,
            pool: Vec::new(),
            next_index: 1,
            utf8s: HashMap::new(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Appends a raw pool entry occupying `slots` indices.
    pub fn entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.extend_from_slice(bytes);
        self.next_index += slots;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self.utf8s.get(text) {
            return *index;
        }
        let entry = Bytes::new()
            .u8(1)
            .u16(text.len() as u16)
            .bytes(text.as_bytes())
            .into_inner();
        let index = self.entry(&entry, 1);
        self.utf8s.insert(text.to_owned(), index);
        index
    }

    pub fn class(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        self.entry(&Bytes::new().u8(7).u16(name_index).into_inner(), 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.entry(&Bytes::new().u8(3).u32(value as u32).into_inner(), 1)
    }

    pub fn float(&mut self, value: f32) -> u16 {
        self.entry(&Bytes::new().u8(4).u32(value.to_bits()).into_inner(), 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let bits = value as u64;
        let entry = Bytes::new()
            .u8(5)
            .u32((bits >> 32) as u32)
            .u32(bits as u32)
            .into_inner();
        self.entry(&entry, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let bits = value.to_bits();
        let entry = Bytes::new()
            .u8(6)
            .u32((bits >> 32) as u32)
            .u32(bits as u32)
            .into_inner();
        self.entry(&entry, 2)
    }

    pub fn string(&mut self, text: &str) -> u16 {
        let string_index = self.utf8(text);
        self.entry(&Bytes::new().u8(8).u16(string_index).into_inner(), 1)
    }

    pub fn interface(&mut self, internal_name: &str) -> &mut Self {
        let index = self.class(internal_name);
        self.interfaces.push(index);
        self
    }

    pub fn interface_index(&mut self, index: u16) -> &mut Self {
        self.interfaces.push(index);
        self
    }

    /// An encoded attribute named `name` with `body` as its content.
    pub fn attribute(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        let name_index = self.utf8(name);
        raw_attribute(name_index, body.len() as u32, body)
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.field_raw(access_flags, name_index, descriptor_index, attributes)
    }

    pub fn field_raw(
        &mut self,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        self.fields
            .push(member(access_flags, name_index, descriptor_index, attributes));
        self
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.method_raw(access_flags, name_index, descriptor_index, attributes)
    }

    pub fn method_raw(
        &mut self,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: &[Vec<u8>],
    ) -> &mut Self {
        self.methods
            .push(member(access_flags, name_index, descriptor_index, attributes));
        self
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Bytes::new()
            .u32(self.magic)
            .u16(self.minor_version)
            .u16(self.major_version)
            .u16(self.next_index)
            .bytes(&self.pool)
            .u16(self.access_flags)
            .u16(self.this_class)
            .u16(self.super_class)
            .u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            bytes = bytes.u16(*interface);
        }
        bytes = append_all(bytes, &self.fields);
        bytes = append_all(bytes, &self.methods);
        bytes = append_all(bytes, &self.attributes);
        bytes.into_inner()
    }
}

/// An attribute with an explicit name index and declared length.
pub fn raw_attribute(name_index: u16, length: u32, body: &[u8]) -> Vec<u8> {
    Bytes::new()
        .u16(name_index)
        .u32(length)
        .bytes(body)
        .into_inner()
}

fn member(
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: &[Vec<u8>],
) -> Vec<u8> {
    let bytes = Bytes::new()
        .u16(access_flags)
        .u16(name_index)
        .u16(descriptor_index);
    append_all(bytes, attributes).into_inner()
}

fn append_all(mut bytes: Bytes, items: &[Vec<u8>]) -> Bytes {
    bytes = bytes.u16(items.len() as u16);
    for item in items {
        bytes = bytes.bytes(item);
    }
    bytes
}
