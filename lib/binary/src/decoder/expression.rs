//! Decoding of instruction sequences.

use super::VisitResultExt;
use crate::ByteReader;
use crate::reader::capacity;
use std::io::Read;
use wasmcodec_types::{
    BinaryError, BinaryResult, BlockType, DecoderConfig, ErrorKind, Immediate, MemArg, Opcode,
    PREFIX_MISC, ValueType,
};
use wasmcodec_visitor::ExpressionVisitor;

/// An open `block`, `loop` or `if`, tracked when nesting is checked.
#[derive(Debug, Clone, Copy)]
struct Frame {
    is_if: bool,
    seen_else: bool,
}

/// Decodes one expression, emitting an event per instruction.
///
/// Decoding stops right after the `end` closing the outermost level. Returns
/// the number of instructions read, that final `end` included.
pub fn decode_expression<R: Read>(
    reader: &mut ByteReader<R>,
    visitor: &mut dyn ExpressionVisitor,
    config: &DecoderConfig,
) -> BinaryResult<u64> {
    let mut depth: i64 = 0;
    let mut frames: Vec<Frame> = Vec::new();
    let mut count = 0;
    loop {
        let start = reader.offset();
        let op = read_opcode(reader)?;
        count += 1;
        match op.immediate() {
            Immediate::None => match op {
                Opcode::Else => {
                    if config.strict_nesting {
                        match frames.last_mut() {
                            Some(frame) if frame.is_if && !frame.seen_else => frame.seen_else = true,
                            Some(frame) if frame.is_if => {
                                return Err(BinaryError::new(
                                    ErrorKind::MalformedNesting("second `else` in one `if`"),
                                    start,
                                ));
                            }
                            _ => {
                                return Err(BinaryError::new(
                                    ErrorKind::MalformedNesting("`else` outside of `if`"),
                                    start,
                                ));
                            }
                        }
                    }
                    visitor.visit_else().at(start)?;
                }
                Opcode::End => {
                    visitor.visit_end().at(start)?;
                    depth -= 1;
                    if depth < 0 {
                        return Ok(count);
                    }
                    frames.pop();
                }
                _ => visitor.visit_instruction(op).at(start)?,
            },
            Immediate::Block => {
                let ty = read_block_type(reader)?;
                visitor.visit_block(op, ty).at(start)?;
                depth += 1;
                if config.strict_nesting {
                    frames.push(Frame {
                        is_if: op == Opcode::If,
                        seen_else: false,
                    });
                }
            }
            Immediate::Index => {
                let index = reader.read_var_u32()?;
                visitor.visit_index(op, index).at(start)?;
            }
            Immediate::BrTable => {
                let len = reader.read_var_u32()?;
                let mut targets = Vec::with_capacity(capacity(len));
                for _ in 0..len {
                    targets.push(reader.read_var_u32()?);
                }
                let default = reader.read_var_u32()?;
                visitor.visit_br_table(&targets, default).at(start)?;
            }
            Immediate::CallIndirect => {
                let type_index = reader.read_var_u32()?;
                let table_index = reader.read_var_u32()?;
                visitor
                    .visit_call_indirect(type_index, table_index)
                    .at(start)?;
            }
            Immediate::MemArg => {
                let align = reader.read_var_u32()?;
                let offset = reader.read_var_u32()?;
                visitor
                    .visit_memory_access(op, MemArg { align, offset })
                    .at(start)?;
            }
            Immediate::I32 => {
                let value = reader.read_var_i32()?;
                visitor.visit_i32_const(value).at(start)?;
            }
            Immediate::I64 => {
                let value = reader.read_var_i64()?;
                visitor.visit_i64_const(value).at(start)?;
            }
            Immediate::F32 => {
                let value = reader.read_f32()?;
                visitor.visit_f32_const(value).at(start)?;
            }
            Immediate::F64 => {
                let value = reader.read_f64()?;
                visitor.visit_f64_const(value).at(start)?;
            }
            Immediate::RefNull => {
                let ty = reader.read_ref_type()?;
                visitor.visit_ref_null(ty).at(start)?;
            }
            Immediate::SelectTyped => {
                let types = reader.read_value_types()?;
                visitor.visit_select_typed(&types).at(start)?;
            }
            Immediate::Reserved => {
                read_reserved(reader)?;
                visitor.visit_instruction(op).at(start)?;
            }
            Immediate::MemoryInit => {
                let data_index = reader.read_var_u32()?;
                read_reserved(reader)?;
                visitor.visit_index(op, data_index).at(start)?;
            }
            Immediate::MemoryCopy => {
                read_reserved(reader)?;
                read_reserved(reader)?;
                visitor.visit_instruction(op).at(start)?;
            }
            Immediate::TableInit => {
                let elem_index = reader.read_var_u32()?;
                let table_index = reader.read_var_u32()?;
                visitor.visit_table_init(table_index, elem_index).at(start)?;
            }
            Immediate::TableCopy => {
                let dst = reader.read_var_u32()?;
                let src = reader.read_var_u32()?;
                visitor.visit_table_copy(dst, src).at(start)?;
            }
        }
    }
}

fn read_opcode<R: Read>(reader: &mut ByteReader<R>) -> BinaryResult<Opcode> {
    let start = reader.offset();
    let byte = reader.expect_byte()?;
    if byte == PREFIX_MISC {
        let code = reader.read_var_u32()?;
        return Opcode::from_prefixed(code).ok_or_else(|| {
            BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "prefixed opcode",
                    tag: code,
                },
                start,
            )
        });
    }
    Opcode::from_byte(byte).ok_or_else(|| {
        BinaryError::new(
            ErrorKind::UnknownTag {
                what: "opcode",
                tag: byte.into(),
            },
            start,
        )
    })
}

/// Reads a block type: `0x40`, a value type, or a non-negative s33 type index.
fn read_block_type<R: Read>(reader: &mut ByteReader<R>) -> BinaryResult<BlockType> {
    let start = reader.offset();
    let byte = reader.expect_byte()?;
    if byte == BlockType::EMPTY {
        return Ok(BlockType::Empty);
    }
    if let Some(ty) = ValueType::from_byte(byte) {
        return Ok(BlockType::Value(ty));
    }
    let index = reader.read_sleb_after(byte, 33)?;
    if index < 0 {
        return Err(BinaryError::new(
            ErrorKind::UnknownTag {
                what: "block type",
                tag: byte.into(),
            },
            start,
        ));
    }
    Ok(BlockType::FuncType(index as u32))
}

fn read_reserved<R: Read>(reader: &mut ByteReader<R>) -> BinaryResult<()> {
    let start = reader.offset();
    match reader.expect_byte()? {
        0 => Ok(()),
        byte => Err(BinaryError::new(
            ErrorKind::UnknownTag {
                what: "reserved byte",
                tag: byte.into(),
            },
            start,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wasmcodec_types::{Ieee32, RefType, VisitError};
    use wasmcodec_visitor::{Discard, VisitResult};

    /// Records every event as a line of text.
    #[derive(Default)]
    struct Log(Vec<String>);

    impl Log {
        fn push(&mut self, line: String) -> VisitResult {
            self.0.push(line);
            Ok(())
        }
    }

    impl ExpressionVisitor for Log {
        fn visit_instruction(&mut self, op: Opcode) -> VisitResult {
            self.push(op.to_string())
        }

        fn visit_block(&mut self, op: Opcode, ty: BlockType) -> VisitResult {
            self.push(format!("{op}{ty}"))
        }

        fn visit_else(&mut self) -> VisitResult {
            self.push("else".into())
        }

        fn visit_end(&mut self) -> VisitResult {
            self.push("end".into())
        }

        fn visit_index(&mut self, op: Opcode, index: u32) -> VisitResult {
            self.push(format!("{op} {index}"))
        }

        fn visit_i32_const(&mut self, value: i32) -> VisitResult {
            self.push(format!("i32.const {value}"))
        }

        fn visit_f32_const(&mut self, value: Ieee32) -> VisitResult {
            self.push(format!("f32.const {:#x}", value.bits()))
        }

        fn visit_ref_null(&mut self, ty: RefType) -> VisitResult {
            self.push(format!("ref.null {ty}"))
        }

        fn visit_table_init(&mut self, table_index: u32, elem_index: u32) -> VisitResult {
            self.push(format!("table.init table={table_index} elem={elem_index}"))
        }

        fn visit_table_copy(&mut self, dst: u32, src: u32) -> VisitResult {
            self.push(format!("table.copy dst={dst} src={src}"))
        }
    }

    fn reader(bytes: &[u8]) -> ByteReader<&[u8]> {
        ByteReader::new(bytes)
    }

    fn decode(bytes: &[u8], config: &DecoderConfig) -> BinaryResult<Vec<String>> {
        let mut log = Log::default();
        decode_expression(&mut reader(bytes), &mut log, config)?;
        Ok(log.0)
    }

    #[test]
    fn test_nesting_depth() {
        let bytes = [
            0x02, 0x40, // block
            0x04, 0x7F, // if (result i32)
            0x41, 0x01, // i32.const 1
            0x05, // else
            0x41, 0x02, // i32.const 2
            0x0B, // end
            0x0B, // end
            0x0B, // end (expression)
            0x01, // trailing byte, not part of the expression
        ];
        let mut input = reader(&bytes);
        let count =
            decode_expression(&mut input, &mut Discard, &DecoderConfig::default()).unwrap();
        assert_eq!(count, 8);
        assert_eq!(input.offset(), 12);
        assert_eq!(input.next_byte(), Ok(Some(0x01)));
    }

    #[test]
    fn test_events() {
        let bytes = [
            0x03, 0x01, // loop (type 1)
            0x0C, 0x00, // br 0
            0x0B, // end
            0x43, 0x00, 0x00, 0x80, 0x3F, // f32.const 1.0
            0x3F, 0x00, // memory.size
            0xD0, 0x6F, // ref.null extern
            0xFC, 0x0C, 0x02, 0x03, // table.init elem=2 table=3
            0xFC, 0x0E, 0x04, 0x05, // table.copy dst=4 src=5
            0xFC, 0x08, 0x07, 0x00, // memory.init 7
            0x0B, // end
        ];
        assert_eq!(
            decode(&bytes, &DecoderConfig::default()).unwrap(),
            vec![
                "loop (type 1)",
                "br 0",
                "end",
                "f32.const 0x3f800000",
                "memory.size",
                "ref.null externref",
                "table.init table=3 elem=2",
                "table.copy dst=4 src=5",
                "memory.init 7",
                "end",
            ]
        );
    }

    #[test]
    fn test_block_types() {
        let config = DecoderConfig::default();
        // A type index needing two bytes.
        assert_eq!(
            decode(&[0x02, 0x80, 0x01, 0x0B, 0x0B], &config).unwrap()[0],
            "block (type 128)"
        );
        // A negative s33 is not a type index.
        assert_eq!(
            decode(&[0x02, 0x7B, 0x0B, 0x0B], &config),
            Err(BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "block type",
                    tag: 0x7B
                },
                1
            ))
        );
    }

    #[test]
    fn test_unknown_opcodes() {
        let config = DecoderConfig::default();
        assert_eq!(
            decode(&[0x01, 0x06], &config),
            Err(BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "opcode",
                    tag: 0x06
                },
                1
            ))
        );
        assert_eq!(
            decode(&[0xFC, 0x12], &config),
            Err(BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "prefixed opcode",
                    tag: 0x12
                },
                0
            ))
        );
        assert_eq!(
            decode(&[0x40, 0x01, 0x0B], &config),
            Err(BinaryError::new(
                ErrorKind::UnknownTag {
                    what: "reserved byte",
                    tag: 0x01
                },
                1
            ))
        );
        assert_eq!(
            decode(&[0x41, 0x00], &config),
            Err(BinaryError::new(ErrorKind::UnexpectedEof, 2))
        );
    }

    #[test]
    fn test_else_is_structural_by_default() {
        let bytes = [0x05, 0x05, 0x0B];
        assert_eq!(
            decode(&bytes, &DecoderConfig::default()).unwrap(),
            vec!["else", "else", "end"]
        );
    }

    #[test]
    fn test_strict_nesting() {
        let mut config = DecoderConfig::default();
        config.strict_nesting(true);
        assert_eq!(
            decode(&[0x05, 0x0B], &config),
            Err(BinaryError::new(
                ErrorKind::MalformedNesting("`else` outside of `if`"),
                0
            ))
        );
        assert_eq!(
            decode(&[0x04, 0x40, 0x05, 0x05, 0x0B, 0x0B], &config),
            Err(BinaryError::new(
                ErrorKind::MalformedNesting("second `else` in one `if`"),
                3
            ))
        );
        assert_eq!(
            decode(&[0x02, 0x40, 0x05, 0x0B, 0x0B], &config),
            Err(BinaryError::new(
                ErrorKind::MalformedNesting("`else` outside of `if`"),
                2
            ))
        );
        assert!(decode(&[0x04, 0x40, 0x05, 0x0B, 0x0B], &config).is_ok());
    }

    #[test]
    fn test_visitor_rejection() {
        struct Refuse;

        impl ExpressionVisitor for Refuse {
            fn visit_i32_const(&mut self, _: i32) -> VisitResult {
                Err(VisitError::new("no constants"))
            }
        }

        assert_eq!(
            decode_expression(
                &mut reader(&[0x01, 0x41, 0x05, 0x0B]),
                &mut Refuse,
                &DecoderConfig::default()
            ),
            Err(BinaryError::new(
                ErrorKind::Rejected("no constants".into()),
                1
            ))
        );
    }
}
