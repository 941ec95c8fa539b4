//! A forward-only byte cursor with nested length bounds.

use crate::leb;
use std::io::{self, BufRead, BufReader, Read};
use std::ops::{Deref, DerefMut};
use wasmcodec_types::{
    BinaryError, BinaryResult, ErrorKind, Ieee32, Ieee64, LebPolicy, Limits, RefType, ValueType,
};

/// The region a bound allows reading, as absolute offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn len(self) -> usize {
        self.end - self.start
    }
}

/// Reads the primitives of the binary format from any [`Read`] source.
///
/// The reader tracks the absolute offset of the next byte. A bound set
/// with [`bounded`](Self::bounded) makes the reader behave as if the input
/// ended at the bound: [`next_byte`](Self::next_byte) returns `None` there,
/// and the `read_*` methods fail with `SectionLengthMismatch`.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: BufReader<R>,
    offset: usize,
    bound: Option<Span>,
    policy: LebPolicy,
    skipped: u64,
}

impl<R: Read> ByteReader<R> {
    /// Creates a reader positioned at offset 0.
    pub fn new(source: R) -> Self {
        Self {
            inner: BufReader::new(source),
            offset: 0,
            bound: None,
            policy: LebPolicy::default(),
            skipped: 0,
        }
    }

    /// Sets how LEB128 integers are read.
    pub fn with_policy(mut self, policy: LebPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The absolute offset of the next byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The LEB128 policy in use.
    pub fn policy(&self) -> LebPolicy {
        self.policy
    }

    /// Bytes left before the current bound, if there is one.
    pub fn remaining(&self) -> Option<usize> {
        self.bound.map(|span| span.end - self.offset)
    }

    /// Total bytes discarded through [`Bounded::skip_remaining`].
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped
    }

    /// Builds an error at the current offset.
    pub fn error(&self, kind: ErrorKind) -> BinaryError {
        BinaryError::new(kind, self.offset)
    }

    fn at_bound(&self) -> bool {
        self.bound.is_some_and(|span| span.end == self.offset)
    }

    fn pull(&mut self) -> Result<Option<u8>, ErrorKind> {
        if self.at_bound() {
            return Ok(None);
        }
        let byte = loop {
            match self.inner.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ErrorKind::Io(e.to_string())),
            }
        };
        if byte.is_some() {
            self.inner.consume(1);
            self.offset += 1;
        }
        Ok(byte)
    }

    fn take(&mut self) -> Result<u8, ErrorKind> {
        match self.pull()? {
            Some(byte) => Ok(byte),
            None => Err(self.end_of_input()),
        }
    }

    /// The error for running out of bytes at the current offset.
    fn end_of_input(&self) -> ErrorKind {
        match self.bound {
            Some(span) if span.end == self.offset => ErrorKind::SectionLengthMismatch {
                declared: span.len(),
                consumed: span.len() + 1,
            },
            _ => ErrorKind::UnexpectedEof,
        }
    }

    /// The next byte, or `None` at the end of the input or of the current bound.
    pub fn next_byte(&mut self) -> BinaryResult<Option<u8>> {
        self.pull().map_err(|kind| self.error(kind))
    }

    /// The next byte, failing at the end of the input or of the current bound.
    pub fn expect_byte(&mut self) -> BinaryResult<u8> {
        self.take().map_err(|kind| self.error(kind))
    }

    fn read_array<const N: usize>(&mut self) -> BinaryResult<[u8; N]> {
        let mut bytes = [0; N];
        for byte in &mut bytes {
            *byte = self.expect_byte()?;
        }
        Ok(bytes)
    }

    /// A little-endian `u32`.
    pub fn read_u32_le(&mut self) -> BinaryResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// The raw bits of an `f32`.
    pub fn read_f32(&mut self) -> BinaryResult<Ieee32> {
        self.read_array().map(|bytes| Ieee32(u32::from_le_bytes(bytes)))
    }

    /// The raw bits of an `f64`.
    pub fn read_f64(&mut self) -> BinaryResult<Ieee64> {
        self.read_array().map(|bytes| Ieee64(u64::from_le_bytes(bytes)))
    }

    /// An unsigned LEB128 integer of at most `bits` bits.
    pub fn read_uleb(&mut self, bits: u32) -> BinaryResult<u64> {
        let policy = self.policy;
        leb::read_unsigned(|| self.take(), bits, policy).map_err(|kind| self.error(kind))
    }

    /// A signed LEB128 integer of at most `bits` bits.
    pub fn read_sleb(&mut self, bits: u32) -> BinaryResult<i64> {
        let policy = self.policy;
        leb::read_signed(|| self.take(), bits, policy).map_err(|kind| self.error(kind))
    }

    /// Continues a signed LEB128 read whose first byte was already consumed.
    pub fn read_sleb_after(&mut self, first: u8, bits: u32) -> BinaryResult<i64> {
        let policy = self.policy;
        let mut first = Some(first);
        leb::read_signed(
            || match first.take() {
                Some(byte) => Ok(byte),
                None => self.take(),
            },
            bits,
            policy,
        )
        .map_err(|kind| self.error(kind))
    }

    /// A `u32` as unsigned LEB128.
    pub fn read_var_u32(&mut self) -> BinaryResult<u32> {
        self.read_uleb(32).map(|value| value as u32)
    }

    /// A `u64` as unsigned LEB128.
    pub fn read_var_u64(&mut self) -> BinaryResult<u64> {
        self.read_uleb(64)
    }

    /// An `i32` as signed LEB128.
    pub fn read_var_i32(&mut self) -> BinaryResult<i32> {
        self.read_sleb(32).map(|value| value as i32)
    }

    /// An `i64` as signed LEB128.
    pub fn read_var_i64(&mut self) -> BinaryResult<i64> {
        self.read_sleb(64)
    }

    /// Exactly `len` bytes.
    ///
    /// The buffer grows as bytes arrive, so a corrupt length cannot force
    /// a large allocation by itself.
    pub fn read_bytes(&mut self, len: usize) -> BinaryResult<Vec<u8>> {
        if let Some(remaining) = self.remaining() {
            if len > remaining {
                let span = self.bound.map_or(0, Span::len);
                return Err(self.error(ErrorKind::SectionLengthMismatch {
                    declared: span,
                    consumed: span - remaining + len,
                }));
            }
        }
        let mut bytes = Vec::new();
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| self.error(ErrorKind::Io(e.to_string())))?;
        self.offset += read;
        if read < len {
            return Err(self.error(ErrorKind::UnexpectedEof));
        }
        Ok(bytes)
    }

    /// A length-prefixed byte vector.
    pub fn read_byte_vec(&mut self) -> BinaryResult<Vec<u8>> {
        let len = self.read_var_u32()?;
        self.read_bytes(len as usize)
    }

    /// A length-prefixed UTF-8 name.
    pub fn read_name(&mut self) -> BinaryResult<String> {
        let len = self.read_var_u32()?;
        let start = self.offset;
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes).map_err(|_| BinaryError::new(ErrorKind::InvalidUtf8, start))
    }

    /// Table or memory limits.
    pub fn read_limits(&mut self) -> BinaryResult<Limits> {
        let start = self.offset;
        match self.expect_byte()? {
            0x00 => Ok(Limits::new(self.read_var_u32()?, None)),
            0x01 => {
                let min = self.read_var_u32()?;
                let max = self.read_var_u32()?;
                Ok(Limits::new(min, Some(max)))
            }
            flag => Err(BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "limits flag",
                    tag: flag.into(),
                },
                start,
            )),
        }
    }

    /// A value type.
    pub fn read_value_type(&mut self) -> BinaryResult<ValueType> {
        let start = self.offset;
        let byte = self.expect_byte()?;
        ValueType::from_byte(byte).ok_or_else(|| {
            BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "value type",
                    tag: byte.into(),
                },
                start,
            )
        })
    }

    /// A reference type.
    pub fn read_ref_type(&mut self) -> BinaryResult<RefType> {
        let start = self.offset;
        let byte = self.expect_byte()?;
        RefType::from_byte(byte).ok_or_else(|| {
            BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "reference type",
                    tag: byte.into(),
                },
                start,
            )
        })
    }

    /// A vector of value types.
    pub fn read_value_types(&mut self) -> BinaryResult<Vec<ValueType>> {
        let count = self.read_var_u32()?;
        let mut types = Vec::with_capacity(capacity(count));
        for _ in 0..count {
            types.push(self.read_value_type()?);
        }
        Ok(types)
    }

    /// Limits reading to the next `len` bytes until the returned guard is
    /// dropped.
    pub fn bounded(&mut self, len: usize) -> BinaryResult<Bounded<'_, R>> {
        let span = Span {
            start: self.offset,
            end: self.offset.saturating_add(len),
        };
        if let Some(parent) = self.bound {
            if span.end > parent.end {
                return Err(self.error(ErrorKind::SectionLengthMismatch {
                    declared: parent.len(),
                    consumed: span.end - parent.start,
                }));
            }
        }
        let parent = self.bound.replace(span);
        Ok(Bounded {
            reader: self,
            parent,
        })
    }
}

/// Caps a preallocation sized from an untrusted count.
pub(crate) fn capacity(count: u32) -> usize {
    (count as usize).min(1024)
}

/// A [`ByteReader`] limited to a length-prefixed region.
///
/// Dereferences to the reader. Dropping the guard restores the enclosing
/// bound whether or not the region was consumed.
#[derive(Debug)]
pub struct Bounded<'a, R: Read> {
    reader: &'a mut ByteReader<R>,
    parent: Option<Span>,
}

impl<R: Read> Bounded<'_, R> {
    fn span(&self) -> Span {
        // Set by `ByteReader::bounded` for as long as the guard lives.
        self.reader.bound.unwrap_or(Span {
            start: self.reader.offset,
            end: self.reader.offset,
        })
    }

    /// Fails with `SectionLengthMismatch` if bytes of the region are left.
    pub fn expect_exhausted(self) -> BinaryResult<()> {
        let span = self.span();
        if self.reader.offset == span.end {
            Ok(())
        } else {
            Err(self.reader.error(ErrorKind::SectionLengthMismatch {
                declared: span.len(),
                consumed: self.reader.offset - span.start,
            }))
        }
    }

    /// Discards the rest of the region without materializing it, returning
    /// how many bytes were skipped.
    pub fn skip_remaining(self) -> BinaryResult<u64> {
        let wanted = (self.span().end - self.reader.offset) as u64;
        let skipped = io::copy(&mut (&mut self.reader.inner).take(wanted), &mut io::sink())
            .map_err(|e| self.reader.error(ErrorKind::Io(e.to_string())))?;
        self.reader.offset += skipped as usize;
        self.reader.skipped += skipped;
        if skipped < wanted {
            return Err(self.reader.error(ErrorKind::UnexpectedEof));
        }
        Ok(skipped)
    }
}

impl<R: Read> Deref for Bounded<'_, R> {
    type Target = ByteReader<R>;

    fn deref(&self) -> &Self::Target {
        &*self.reader
    }
}

impl<R: Read> DerefMut for Bounded<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.reader
    }
}

impl<R: Read> Drop for Bounded<'_, R> {
    fn drop(&mut self) {
        self.reader.bound = self.parent;
    }
}
