//! Streaming decoder: reads a binary module and drives a visitor pipeline.

mod expression;
mod sections;

pub use self::expression::decode_expression;

use self::sections::*;
use crate::ByteReader;
use std::fmt;
use std::io::Read;
use wasmcodec_types::{
    BinaryError, BinaryResult, DecoderConfig, ErrorKind, MAGIC, SectionId, VERSION, VisitResult,
};
use wasmcodec_visitor::ModuleVisitor;

/// Counters collected during a decode pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// Known sections read or skipped.
    pub sections: usize,
    /// Custom sections read.
    pub custom_sections: usize,
    /// Function bodies encountered, decoded or skipped.
    pub function_bodies: usize,
    /// Instructions decoded, including those of uninteresting structures
    /// walked without producing events.
    pub instructions: u64,
    /// Bytes discarded without being decoded.
    pub skipped_bytes: u64,
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} sections, {} custom sections, {} function bodies, {} instructions, {} bytes skipped",
            self.sections,
            self.custom_sections,
            self.function_bodies,
            self.instructions,
            self.skipped_bytes
        )
    }
}

/// State shared by the section decoders.
struct Context<'a> {
    config: &'a DecoderConfig,
    stats: &'a mut DecodeStats,
}

/// Maps a visitor's refusal to a decode error at a given offset.
trait VisitResultExt<T> {
    fn at(self, offset: usize) -> BinaryResult<T>;
}

impl<T> VisitResultExt<T> for VisitResult<T> {
    fn at(self, offset: usize) -> BinaryResult<T> {
        self.map_err(|e| BinaryError::new(ErrorKind::Rejected(e.message), offset))
    }
}

/// Decodes a module from a byte source, once.
///
/// # Usage
///
/// ```
/// use wasmcodec_binary::Decoder;
/// use wasmcodec_visitor::Printer;
///
/// let bytes = b"\0asm\x01\0\0\0";
/// let mut printer = Printer::new();
/// let mut decoder = Decoder::new(&bytes[..]);
/// decoder.decode(&mut printer)?;
/// assert_eq!(printer.as_str(), "module version=1\nend module\n");
/// # Ok::<(), wasmcodec_types::BinaryError>(())
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    reader: Option<ByteReader<R>>,
    config: DecoderConfig,
    stats: DecodeStats,
    end: usize,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder with the default configuration.
    pub fn new(source: R) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    /// Creates a decoder with the given configuration.
    pub fn with_config(source: R, config: DecoderConfig) -> Self {
        let reader = ByteReader::new(source).with_policy(config.leb_policy);
        Self {
            reader: Some(reader),
            config,
            stats: DecodeStats::default(),
            end: 0,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Counters of the last decode pass.
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Reads the whole module, emitting its events to `visitor`.
    ///
    /// Stops at the first error. A decoder reads its source once; calling
    /// this again fails with `AlreadyConsumed`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn decode(&mut self, visitor: &mut dyn ModuleVisitor) -> BinaryResult<()> {
        let Some(mut reader) = self.reader.take() else {
            return Err(BinaryError::new(ErrorKind::AlreadyConsumed, self.end));
        };
        let mut cx = Context {
            config: &self.config,
            stats: &mut self.stats,
        };
        let result = decode_module(&mut reader, &mut cx, visitor);
        self.stats.skipped_bytes = reader.skipped_bytes();
        self.end = reader.offset();
        if let Err(error) = &result {
            tracing::debug!(%error, "decoding failed");
        }
        result
    }
}

fn decode_module<R: Read>(
    reader: &mut ByteReader<R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let magic = reader.read_u32_le()?;
    let expected = u32::from_le_bytes(MAGIC);
    if magic != expected {
        return Err(BinaryError::new(
            ErrorKind::BadHeader {
                field: "magic",
                expected,
                found: magic,
            },
            0,
        ));
    }
    let version = reader.read_u32_le()?;
    if version != VERSION {
        return Err(BinaryError::new(
            ErrorKind::BadHeader {
                field: "version",
                expected: VERSION,
                found: version,
            },
            MAGIC.len(),
        ));
    }
    visitor.visit_header(version).at(reader.offset())?;

    let mut last: Option<SectionId> = None;
    while let Some(byte) = reader.next_byte()? {
        let start = reader.offset() - 1;
        let id = SectionId::from_byte(byte).ok_or_else(|| {
            BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "section id",
                    tag: byte.into(),
                },
                start,
            )
        })?;
        let size = reader.read_var_u32()? as usize;
        tracing::debug!(%id, size, offset = start, "section");

        if id != SectionId::Custom {
            if let Some(previous) = last {
                if id.position() <= previous.position() {
                    return Err(BinaryError::new(
                        ErrorKind::SectionOutOfOrder { id, previous },
                        start,
                    ));
                }
            }
            last = Some(id);
            cx.stats.sections += 1;
        }

        let section = reader.bounded(size)?;
        match id {
            SectionId::Custom => decode_custom_section(section, cx, visitor)?,
            SectionId::Type => decode_type_section(section, cx, visitor)?,
            SectionId::Import => decode_import_section(section, cx, visitor)?,
            SectionId::Function => decode_function_section(section, cx, visitor)?,
            SectionId::Table => decode_table_section(section, cx, visitor)?,
            SectionId::Memory => decode_memory_section(section, cx, visitor)?,
            SectionId::Global => decode_global_section(section, cx, visitor)?,
            SectionId::Export => decode_export_section(section, cx, visitor)?,
            SectionId::Start => decode_start_section(section, visitor)?,
            SectionId::Element => decode_element_section(section, cx, visitor)?,
            SectionId::DataCount => decode_data_count_section(section, visitor)?,
            SectionId::Code => decode_code_section(section, cx, visitor)?,
            SectionId::Data => decode_data_section(section, cx, visitor)?,
        }
    }

    visitor.visit_end().at(reader.offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wasmcodec_visitor::{Discard, Printer};

    const HEADER: [u8; 8] = [
        0x00, 0x61, 0x73, 0x6d, // magic
        0x01, 0x00, 0x00, 0x00, // version
    ];

    fn module(sections: &[u8]) -> Vec<u8> {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(sections);
        bytes
    }

    fn dump(bytes: &[u8]) -> BinaryResult<String> {
        let mut printer = Printer::new();
        Decoder::new(bytes).decode(&mut printer)?;
        Ok(printer.into_string())
    }

    #[test]
    fn test_header() {
        assert_eq!(
            dump(&[0x00, 0x61, 0x73, 0x6e, 0x01, 0x00, 0x00, 0x00]),
            Err(BinaryError::new(
                ErrorKind::BadHeader {
                    field: "magic",
                    expected: 0x6d73_6100,
                    found: 0x6e73_6100
                },
                0
            ))
        );
        assert_eq!(
            dump(&[0x00, 0x61, 0x73, 0x6d, 0x02, 0x00, 0x00, 0x00]),
            Err(BinaryError::new(
                ErrorKind::BadHeader {
                    field: "version",
                    expected: 1,
                    found: 2
                },
                4
            ))
        );
        assert_eq!(
            dump(&[0x00, 0x61, 0x73]),
            Err(BinaryError::new(ErrorKind::UnexpectedEof, 3))
        );
    }

    #[test]
    fn test_already_consumed() {
        let bytes = module(&[]);
        let mut decoder = Decoder::new(&bytes[..]);
        decoder.decode(&mut Discard).unwrap();
        assert_eq!(
            decoder.decode(&mut Discard),
            Err(BinaryError::new(ErrorKind::AlreadyConsumed, 8))
        );
    }

    #[test]
    fn test_section_order() {
        let bytes = module(&[
            0x03, 0x01, 0x00, // function section, no entries
            0x00, 0x02, 0x01, b'x', // custom section "x", anywhere
            0x01, 0x01, 0x00, // type section after the function section
        ]);
        assert_eq!(
            dump(&bytes),
            Err(BinaryError::new(
                ErrorKind::SectionOutOfOrder {
                    id: SectionId::Type,
                    previous: SectionId::Function
                },
                15
            ))
        );

        let twice = module(&[0x01, 0x01, 0x00, 0x01, 0x01, 0x00]);
        assert!(matches!(
            dump(&twice),
            Err(BinaryError {
                kind: ErrorKind::SectionOutOfOrder { .. },
                offset: 11
            })
        ));
    }

    #[test]
    fn test_data_count_position() {
        let bytes = module(&[
            0x09, 0x01, 0x00, // element section
            0x0C, 0x01, 0x00, // data count 0
            0x0A, 0x01, 0x00, // code section
        ]);
        assert_eq!(
            dump(&bytes).unwrap(),
            "\
module version=1
element section
  end
datacount 0
code section
  end
end module
"
        );

        let late = module(&[0x0A, 0x01, 0x00, 0x0C, 0x01, 0x00]);
        assert!(matches!(
            dump(&late),
            Err(BinaryError {
                kind: ErrorKind::SectionOutOfOrder {
                    id: SectionId::DataCount,
                    previous: SectionId::Code
                },
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            dump(&module(&[0x0D, 0x00])),
            Err(BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "section id",
                    tag: 0x0D
                },
                8
            ))
        );
    }

    #[test]
    fn test_section_length_mismatch() {
        // The type section declares 6 bytes but its single entry needs 4.
        let longer = module(&[0x01, 0x06, 0x01, 0x60, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            dump(&longer),
            Err(BinaryError::new(
                ErrorKind::SectionLengthMismatch {
                    declared: 6,
                    consumed: 4
                },
                14
            ))
        );

        // The type section declares 3 bytes but its single entry needs 4.
        let shorter = module(&[0x01, 0x03, 0x01, 0x60, 0x00, 0x00]);
        assert_eq!(
            dump(&shorter),
            Err(BinaryError::new(
                ErrorKind::SectionLengthMismatch {
                    declared: 3,
                    consumed: 4
                },
                13
            ))
        );
    }

    #[test_log::test]
    fn test_stats() {
        let bytes = module(&[
            0x00, 0x03, 0x01, b'a', 0xFF, // custom section "a"
            0x0A, 0x07, 0x01, // code section, one body
            0x05, 0x00, 0x41, 0x00, 0x1A, 0x0B, // i32.const 0, drop, end
        ]);
        let mut decoder = Decoder::new(&bytes[..]);
        decoder.decode(&mut Discard).unwrap();
        assert_eq!(
            *decoder.stats(),
            DecodeStats {
                sections: 1,
                custom_sections: 1,
                function_bodies: 1,
                instructions: 3,
                skipped_bytes: 0,
            }
        );
    }
}
