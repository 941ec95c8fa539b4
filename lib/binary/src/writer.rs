//! Writes the primitives of the binary format.

use crate::leb;
use wasmcodec_types::{
    GlobalType, Ieee32, Ieee64, Limits, MemArg, MemoryType, RefType, TableType, ValueType,
};

/// A growable output buffer, the mirror of [`ByteReader`](crate::ByteReader).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one byte.
    pub fn put_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Appends raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// A little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// The raw bits of an `f32`.
    pub fn write_f32(&mut self, value: Ieee32) {
        self.put_bytes(&value.bits().to_le_bytes());
    }

    /// The raw bits of an `f64`.
    pub fn write_f64(&mut self, value: Ieee64) {
        self.put_bytes(&value.bits().to_le_bytes());
    }

    /// An unsigned LEB128 integer, minimally encoded.
    pub fn write_uleb(&mut self, value: u64) {
        leb::write_unsigned(&mut self.buf, value);
    }

    /// A signed LEB128 integer, minimally encoded.
    pub fn write_sleb(&mut self, value: i64) {
        leb::write_signed(&mut self.buf, value);
    }

    /// A `u32` as unsigned LEB128.
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_uleb(value.into());
    }

    /// A length-prefixed byte vector.
    pub fn write_byte_vec(&mut self, bytes: &[u8]) {
        self.write_uleb(bytes.len() as u64);
        self.put_bytes(bytes);
    }

    /// A length-prefixed UTF-8 name.
    pub fn write_name(&mut self, name: &str) {
        self.write_byte_vec(name.as_bytes());
    }

    /// Table or memory limits.
    pub fn write_limits(&mut self, limits: Limits) {
        limits.to_bytes(self);
    }

    /// A value type.
    pub fn write_value_type(&mut self, ty: ValueType) {
        ty.to_bytes(self);
    }

    /// Writes anything with a binary representation.
    pub fn write<T: ToBytes + ?Sized>(&mut self, value: &T) {
        value.to_bytes(self);
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing was written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer, returning its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// A trait for converting a value to bytes.
pub trait ToBytes {
    /// Appends the binary representation of `self` to `writer`.
    fn to_bytes(&self, writer: &mut ByteWriter);
}

/// Encode a `u32` into bytes with a LEB128 representation.
///
/// Decoder is `ByteReader::read_var_u32`.
impl ToBytes for u32 {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        writer.write_var_u32(*self);
    }
}

/// Encode a `str` into bytes: size first, then the UTF-8 bytes.
///
/// Decoder is `ByteReader::read_name`.
impl ToBytes for str {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        writer.write_name(self);
    }
}

/// Encode a slice into bytes: size first, then the items.
impl<T: ToBytes> ToBytes for [T] {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        writer.write_uleb(self.len() as u64);
        for item in self {
            item.to_bytes(writer);
        }
    }
}

impl ToBytes for ValueType {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        writer.put_byte(self.to_byte());
    }
}

impl ToBytes for RefType {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        writer.put_byte(self.to_byte());
    }
}

/// Decoder is `ByteReader::read_limits`.
impl ToBytes for Limits {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        match self.max {
            None => {
                writer.put_byte(0x00);
                writer.write_var_u32(self.min);
            }
            Some(max) => {
                writer.put_byte(0x01);
                writer.write_var_u32(self.min);
                writer.write_var_u32(max);
            }
        }
    }
}

impl ToBytes for TableType {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        self.element.to_bytes(writer);
        self.limits.to_bytes(writer);
    }
}

impl ToBytes for MemoryType {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        self.limits.to_bytes(writer);
    }
}

impl ToBytes for GlobalType {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        self.ty.to_bytes(writer);
        writer.put_byte(self.mutability as u8);
    }
}

impl ToBytes for MemArg {
    fn to_bytes(&self, writer: &mut ByteWriter) {
        writer.write_var_u32(self.align);
        writer.write_var_u32(self.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmcodec_types::Mutability;

    /// Helper to easily test that a value `$input` transformed into a vector
    /// of bytes equals `$expected_output`.
    macro_rules! assert_to_bytes {
        ($input:expr, $expected_output:expr) => {{
            let mut writer = ByteWriter::new();
            writer.write(&$input);
            assert_eq!(writer.as_slice(), &$expected_output[..]);
        }};
    }

    #[test]
    fn test_u32() {
        assert_to_bytes!(0x01_u32, [0x01]);
        assert_to_bytes!(0x80_u32, [0x80, 0x01]);
        assert_to_bytes!(u32::MAX, [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_str() {
        assert_to_bytes!(*"abc", [0x03, 0x61, 0x62, 0x63]);
        assert_to_bytes!(*"", [0x00]);
    }

    #[test]
    fn test_value_types() {
        assert_to_bytes!(
            [ValueType::I32, ValueType::F64, ValueType::ExternRef][..],
            [
                0x03, // list of 3 items
                0x7F, // I32
                0x7C, // F64
                0x6F, // ExternRef
            ]
        );
    }

    #[test]
    fn test_limits() {
        assert_to_bytes!(Limits::new(1, None), [0x00, 0x01]);
        assert_to_bytes!(Limits::new(1, Some(0x80)), [0x01, 0x01, 0x80, 0x01]);
        assert_to_bytes!(
            TableType {
                element: RefType::FuncRef,
                limits: Limits::new(2, None)
            },
            [0x70, 0x00, 0x02]
        );
    }

    #[test]
    fn test_global_type() {
        assert_to_bytes!(GlobalType::new(ValueType::I64, Mutability::Var), [0x7E, 0x01]);
        assert_to_bytes!(MemArg { align: 3, offset: 200 }, [0x03, 0xC8, 0x01]);
    }

    #[test]
    fn test_primitives() {
        let mut writer = ByteWriter::new();
        writer.write_u32_le(1);
        writer.write_f32(Ieee32::from(1.0f32));
        writer.write_sleb(-2);
        writer.write_byte_vec(&[0xAA]);
        assert_eq!(
            writer.into_inner(),
            vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3f, 0x7E, 0x01, 0xAA]
        );
    }
}
