//! The instruction table.
//!
//! Every instruction the codec understands is listed once in the
//! `opcodes!` invocation below, together with its mnemonic, its wire
//! encoding and the shape of its immediates. Decoder and encoder both
//! dispatch on [`Opcode::immediate`], so the two sides cannot drift apart.

use std::fmt;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// The byte introducing a prefixed (`0xFC`) instruction.
pub const PREFIX_MISC: u8 = 0xFC;

/// How an opcode is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// A single opcode byte.
    Byte(u8),
    /// [`PREFIX_MISC`] followed by a uleb32 sub-opcode.
    Prefixed(u32),
}

/// The shape of the immediates following an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Immediate {
    /// Nothing.
    None,
    /// A block type.
    Block,
    /// One index (label, function, local, global, table, data or element).
    Index,
    /// A vector of label indices and a default label.
    BrTable,
    /// A type index, then a table index.
    CallIndirect,
    /// Alignment and offset.
    MemArg,
    /// A signed LEB128 32-bit integer.
    I32,
    /// A signed LEB128 64-bit integer.
    I64,
    /// Four little-endian bytes.
    F32,
    /// Eight little-endian bytes.
    F64,
    /// A reference type.
    RefNull,
    /// A vector of value types.
    SelectTyped,
    /// One reserved zero byte.
    Reserved,
    /// A data index, then one reserved zero byte.
    MemoryInit,
    /// Two reserved zero bytes.
    MemoryCopy,
    /// An element index, then a table index.
    TableInit,
    /// A destination table index, then a source table index.
    TableCopy,
}

macro_rules! opcodes {
    (
        plain { $($pv:ident = $pb:literal $pn:literal $pi:ident;)* }
        prefixed { $($xv:ident = $xb:literal $xn:literal $xi:ident;)* }
    ) => {
        /// Every instruction opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
        pub enum Opcode {
            $(
                #[doc = concat!("`", $pn, "`")]
                $pv,
            )*
            $(
                #[doc = concat!("`", $xn, "`")]
                $xv,
            )*
        }

        impl Opcode {
            /// All opcodes, in encoding order.
            pub const ALL: &'static [Self] = &[$(Self::$pv,)* $(Self::$xv,)*];

            /// Looks up a single-byte opcode.
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($pb => Some(Self::$pv),)*
                    _ => None,
                }
            }

            /// Looks up the sub-opcode following [`PREFIX_MISC`].
            pub fn from_prefixed(code: u32) -> Option<Self> {
                match code {
                    $($xb => Some(Self::$xv),)*
                    _ => None,
                }
            }

            /// The wire encoding of this opcode.
            pub fn encoding(self) -> Encoding {
                match self {
                    $(Self::$pv => Encoding::Byte($pb),)*
                    $(Self::$xv => Encoding::Prefixed($xb),)*
                }
            }

            /// The text-format name of this instruction.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$pv => $pn,)*
                    $(Self::$xv => $xn,)*
                }
            }

            /// The immediates this instruction carries.
            pub fn immediate(self) -> Immediate {
                match self {
                    $(Self::$pv => Immediate::$pi,)*
                    $(Self::$xv => Immediate::$xi,)*
                }
            }
        }
    };
}

opcodes! {
    plain {
        Unreachable = 0x00 "unreachable" None;
        Nop = 0x01 "nop" None;
        Block = 0x02 "block" Block;
        Loop = 0x03 "loop" Block;
        If = 0x04 "if" Block;
        Else = 0x05 "else" None;
        End = 0x0B "end" None;
        Br = 0x0C "br" Index;
        BrIf = 0x0D "br_if" Index;
        BrTable = 0x0E "br_table" BrTable;
        Return = 0x0F "return" None;
        Call = 0x10 "call" Index;
        CallIndirect = 0x11 "call_indirect" CallIndirect;

        Drop = 0x1A "drop" None;
        Select = 0x1B "select" None;
        SelectTyped = 0x1C "select" SelectTyped;

        LocalGet = 0x20 "local.get" Index;
        LocalSet = 0x21 "local.set" Index;
        LocalTee = 0x22 "local.tee" Index;
        GlobalGet = 0x23 "global.get" Index;
        GlobalSet = 0x24 "global.set" Index;
        TableGet = 0x25 "table.get" Index;
        TableSet = 0x26 "table.set" Index;

        I32Load = 0x28 "i32.load" MemArg;
        I64Load = 0x29 "i64.load" MemArg;
        F32Load = 0x2A "f32.load" MemArg;
        F64Load = 0x2B "f64.load" MemArg;
        I32Load8S = 0x2C "i32.load8_s" MemArg;
        I32Load8U = 0x2D "i32.load8_u" MemArg;
        I32Load16S = 0x2E "i32.load16_s" MemArg;
        I32Load16U = 0x2F "i32.load16_u" MemArg;
        I64Load8S = 0x30 "i64.load8_s" MemArg;
        I64Load8U = 0x31 "i64.load8_u" MemArg;
        I64Load16S = 0x32 "i64.load16_s" MemArg;
        I64Load16U = 0x33 "i64.load16_u" MemArg;
        I64Load32S = 0x34 "i64.load32_s" MemArg;
        I64Load32U = 0x35 "i64.load32_u" MemArg;
        I32Store = 0x36 "i32.store" MemArg;
        I64Store = 0x37 "i64.store" MemArg;
        F32Store = 0x38 "f32.store" MemArg;
        F64Store = 0x39 "f64.store" MemArg;
        I32Store8 = 0x3A "i32.store8" MemArg;
        I32Store16 = 0x3B "i32.store16" MemArg;
        I64Store8 = 0x3C "i64.store8" MemArg;
        I64Store16 = 0x3D "i64.store16" MemArg;
        I64Store32 = 0x3E "i64.store32" MemArg;
        MemorySize = 0x3F "memory.size" Reserved;
        MemoryGrow = 0x40 "memory.grow" Reserved;

        I32Const = 0x41 "i32.const" I32;
        I64Const = 0x42 "i64.const" I64;
        F32Const = 0x43 "f32.const" F32;
        F64Const = 0x44 "f64.const" F64;

        I32Eqz = 0x45 "i32.eqz" None;
        I32Eq = 0x46 "i32.eq" None;
        I32Ne = 0x47 "i32.ne" None;
        I32LtS = 0x48 "i32.lt_s" None;
        I32LtU = 0x49 "i32.lt_u" None;
        I32GtS = 0x4A "i32.gt_s" None;
        I32GtU = 0x4B "i32.gt_u" None;
        I32LeS = 0x4C "i32.le_s" None;
        I32LeU = 0x4D "i32.le_u" None;
        I32GeS = 0x4E "i32.ge_s" None;
        I32GeU = 0x4F "i32.ge_u" None;

        I64Eqz = 0x50 "i64.eqz" None;
        I64Eq = 0x51 "i64.eq" None;
        I64Ne = 0x52 "i64.ne" None;
        I64LtS = 0x53 "i64.lt_s" None;
        I64LtU = 0x54 "i64.lt_u" None;
        I64GtS = 0x55 "i64.gt_s" None;
        I64GtU = 0x56 "i64.gt_u" None;
        I64LeS = 0x57 "i64.le_s" None;
        I64LeU = 0x58 "i64.le_u" None;
        I64GeS = 0x59 "i64.ge_s" None;
        I64GeU = 0x5A "i64.ge_u" None;

        F32Eq = 0x5B "f32.eq" None;
        F32Ne = 0x5C "f32.ne" None;
        F32Lt = 0x5D "f32.lt" None;
        F32Gt = 0x5E "f32.gt" None;
        F32Le = 0x5F "f32.le" None;
        F32Ge = 0x60 "f32.ge" None;

        F64Eq = 0x61 "f64.eq" None;
        F64Ne = 0x62 "f64.ne" None;
        F64Lt = 0x63 "f64.lt" None;
        F64Gt = 0x64 "f64.gt" None;
        F64Le = 0x65 "f64.le" None;
        F64Ge = 0x66 "f64.ge" None;

        I32Clz = 0x67 "i32.clz" None;
        I32Ctz = 0x68 "i32.ctz" None;
        I32Popcnt = 0x69 "i32.popcnt" None;
        I32Add = 0x6A "i32.add" None;
        I32Sub = 0x6B "i32.sub" None;
        I32Mul = 0x6C "i32.mul" None;
        I32DivS = 0x6D "i32.div_s" None;
        I32DivU = 0x6E "i32.div_u" None;
        I32RemS = 0x6F "i32.rem_s" None;
        I32RemU = 0x70 "i32.rem_u" None;
        I32And = 0x71 "i32.and" None;
        I32Or = 0x72 "i32.or" None;
        I32Xor = 0x73 "i32.xor" None;
        I32Shl = 0x74 "i32.shl" None;
        I32ShrS = 0x75 "i32.shr_s" None;
        I32ShrU = 0x76 "i32.shr_u" None;
        I32Rotl = 0x77 "i32.rotl" None;
        I32Rotr = 0x78 "i32.rotr" None;

        I64Clz = 0x79 "i64.clz" None;
        I64Ctz = 0x7A "i64.ctz" None;
        I64Popcnt = 0x7B "i64.popcnt" None;
        I64Add = 0x7C "i64.add" None;
        I64Sub = 0x7D "i64.sub" None;
        I64Mul = 0x7E "i64.mul" None;
        I64DivS = 0x7F "i64.div_s" None;
        I64DivU = 0x80 "i64.div_u" None;
        I64RemS = 0x81 "i64.rem_s" None;
        I64RemU = 0x82 "i64.rem_u" None;
        I64And = 0x83 "i64.and" None;
        I64Or = 0x84 "i64.or" None;
        I64Xor = 0x85 "i64.xor" None;
        I64Shl = 0x86 "i64.shl" None;
        I64ShrS = 0x87 "i64.shr_s" None;
        I64ShrU = 0x88 "i64.shr_u" None;
        I64Rotl = 0x89 "i64.rotl" None;
        I64Rotr = 0x8A "i64.rotr" None;

        F32Abs = 0x8B "f32.abs" None;
        F32Neg = 0x8C "f32.neg" None;
        F32Ceil = 0x8D "f32.ceil" None;
        F32Floor = 0x8E "f32.floor" None;
        F32Trunc = 0x8F "f32.trunc" None;
        F32Nearest = 0x90 "f32.nearest" None;
        F32Sqrt = 0x91 "f32.sqrt" None;
        F32Add = 0x92 "f32.add" None;
        F32Sub = 0x93 "f32.sub" None;
        F32Mul = 0x94 "f32.mul" None;
        F32Div = 0x95 "f32.div" None;
        F32Min = 0x96 "f32.min" None;
        F32Max = 0x97 "f32.max" None;
        F32Copysign = 0x98 "f32.copysign" None;

        F64Abs = 0x99 "f64.abs" None;
        F64Neg = 0x9A "f64.neg" None;
        F64Ceil = 0x9B "f64.ceil" None;
        F64Floor = 0x9C "f64.floor" None;
        F64Trunc = 0x9D "f64.trunc" None;
        F64Nearest = 0x9E "f64.nearest" None;
        F64Sqrt = 0x9F "f64.sqrt" None;
        F64Add = 0xA0 "f64.add" None;
        F64Sub = 0xA1 "f64.sub" None;
        F64Mul = 0xA2 "f64.mul" None;
        F64Div = 0xA3 "f64.div" None;
        F64Min = 0xA4 "f64.min" None;
        F64Max = 0xA5 "f64.max" None;
        F64Copysign = 0xA6 "f64.copysign" None;

        I32WrapI64 = 0xA7 "i32.wrap_i64" None;
        I32TruncF32S = 0xA8 "i32.trunc_f32_s" None;
        I32TruncF32U = 0xA9 "i32.trunc_f32_u" None;
        I32TruncF64S = 0xAA "i32.trunc_f64_s" None;
        I32TruncF64U = 0xAB "i32.trunc_f64_u" None;
        I64ExtendI32S = 0xAC "i64.extend_i32_s" None;
        I64ExtendI32U = 0xAD "i64.extend_i32_u" None;
        I64TruncF32S = 0xAE "i64.trunc_f32_s" None;
        I64TruncF32U = 0xAF "i64.trunc_f32_u" None;
        I64TruncF64S = 0xB0 "i64.trunc_f64_s" None;
        I64TruncF64U = 0xB1 "i64.trunc_f64_u" None;
        F32ConvertI32S = 0xB2 "f32.convert_i32_s" None;
        F32ConvertI32U = 0xB3 "f32.convert_i32_u" None;
        F32ConvertI64S = 0xB4 "f32.convert_i64_s" None;
        F32ConvertI64U = 0xB5 "f32.convert_i64_u" None;
        F32DemoteF64 = 0xB6 "f32.demote_f64" None;
        F64ConvertI32S = 0xB7 "f64.convert_i32_s" None;
        F64ConvertI32U = 0xB8 "f64.convert_i32_u" None;
        F64ConvertI64S = 0xB9 "f64.convert_i64_s" None;
        F64ConvertI64U = 0xBA "f64.convert_i64_u" None;
        F64PromoteF32 = 0xBB "f64.promote_f32" None;
        I32ReinterpretF32 = 0xBC "i32.reinterpret_f32" None;
        I64ReinterpretF64 = 0xBD "i64.reinterpret_f64" None;
        F32ReinterpretI32 = 0xBE "f32.reinterpret_i32" None;
        F64ReinterpretI64 = 0xBF "f64.reinterpret_i64" None;

        I32Extend8S = 0xC0 "i32.extend8_s" None;
        I32Extend16S = 0xC1 "i32.extend16_s" None;
        I64Extend8S = 0xC2 "i64.extend8_s" None;
        I64Extend16S = 0xC3 "i64.extend16_s" None;
        I64Extend32S = 0xC4 "i64.extend32_s" None;

        RefNull = 0xD0 "ref.null" RefNull;
        RefIsNull = 0xD1 "ref.is_null" None;
        RefFunc = 0xD2 "ref.func" Index;
    }
    prefixed {
        I32TruncSatF32S = 0 "i32.trunc_sat_f32_s" None;
        I32TruncSatF32U = 1 "i32.trunc_sat_f32_u" None;
        I32TruncSatF64S = 2 "i32.trunc_sat_f64_s" None;
        I32TruncSatF64U = 3 "i32.trunc_sat_f64_u" None;
        I64TruncSatF32S = 4 "i64.trunc_sat_f32_s" None;
        I64TruncSatF32U = 5 "i64.trunc_sat_f32_u" None;
        I64TruncSatF64S = 6 "i64.trunc_sat_f64_s" None;
        I64TruncSatF64U = 7 "i64.trunc_sat_f64_u" None;
        MemoryInit = 8 "memory.init" MemoryInit;
        DataDrop = 9 "data.drop" Index;
        MemoryCopy = 10 "memory.copy" MemoryCopy;
        MemoryFill = 11 "memory.fill" Reserved;
        TableInit = 12 "table.init" TableInit;
        ElemDrop = 13 "elem.drop" Index;
        TableCopy = 14 "table.copy" TableCopy;
        TableGrow = 15 "table.grow" Index;
        TableSize = 16 "table.size" Index;
        TableFill = 17 "table.fill" Index;
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trips() {
        for &op in Opcode::ALL {
            let back = match op.encoding() {
                Encoding::Byte(byte) => Opcode::from_byte(byte),
                Encoding::Prefixed(code) => Opcode::from_prefixed(code),
            };
            assert_eq!(back, Some(op), "{op:?}");
        }
    }

    #[test]
    fn prefix_is_not_an_opcode() {
        assert_eq!(Opcode::from_byte(PREFIX_MISC), None);
        assert_eq!(Opcode::from_byte(0x06), None);
        assert_eq!(Opcode::from_prefixed(18), None);
    }

    #[test]
    fn immediates() {
        assert_eq!(Opcode::Block.immediate(), Immediate::Block);
        assert_eq!(Opcode::MemoryGrow.immediate(), Immediate::Reserved);
        assert_eq!(Opcode::MemoryFill.immediate(), Immediate::Reserved);
        assert_eq!(Opcode::TableInit.immediate(), Immediate::TableInit);
        assert_eq!(Opcode::I64Store32.immediate(), Immediate::MemArg);
        assert_eq!(Opcode::TableSize.encoding(), Encoding::Prefixed(16));
        assert_eq!(Opcode::SelectTyped.to_string(), "select");
    }
}
