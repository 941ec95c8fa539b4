use std::fmt;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

// Value Types

/// A list of all value types the binary format can carry.
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ValueType {
    /// Signed 32 bit integer.
    I32 = 0x7F,
    /// Signed 64 bit integer.
    I64 = 0x7E,
    /// Floating point 32 bit number.
    F32 = 0x7D,
    /// Floating point 64 bit number.
    F64 = 0x7C,
    /// A reference to a function.
    FuncRef = 0x70,
    /// A reference to opaque host data.
    ExternRef = 0x6F,
}

impl ValueType {
    /// Decodes a value type from its single-byte tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x7F => Self::I32,
            0x7E => Self::I64,
            0x7D => Self::F32,
            0x7C => Self::F64,
            0x70 => Self::FuncRef,
            0x6F => Self::ExternRef,
            _ => return None,
        })
    }

    /// The single-byte tag of this value type.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Returns true if `ValueType` matches any of the numeric types.
    pub fn is_num(self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::F32 | Self::F64)
    }

    /// Returns true if `ValueType` matches either of the reference types.
    pub fn is_ref(self) -> bool {
        matches!(self, Self::FuncRef | Self::ExternRef)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::FuncRef => "funcref",
            Self::ExternRef => "externref",
        })
    }
}

/// The subset of value types that can be stored in tables.
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum RefType {
    /// A reference to a function.
    FuncRef = 0x70,
    /// A reference to opaque host data.
    ExternRef = 0x6F,
}

impl RefType {
    /// Decodes a reference type from its single-byte tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x70 => Some(Self::FuncRef),
            0x6F => Some(Self::ExternRef),
            _ => None,
        }
    }

    /// The single-byte tag of this reference type.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl From<RefType> for ValueType {
    fn from(ty: RefType) -> Self {
        match ty {
            RefType::FuncRef => Self::FuncRef,
            RefType::ExternRef => Self::ExternRef,
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ValueType::from(*self).fmt(f)
    }
}

/// The raw bit pattern of an `f32` literal.
///
/// Floats travel through the codec as bits so NaN payloads survive a
/// decode/encode round trip untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Ieee32(pub u32);

impl Ieee32 {
    /// The raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl From<f32> for Ieee32 {
    fn from(value: f32) -> Self {
        Self(value.to_bits())
    }
}

impl From<Ieee32> for f32 {
    fn from(value: Ieee32) -> Self {
        Self::from_bits(value.0)
    }
}

/// The raw bit pattern of an `f64` literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Ieee64(pub u64);

impl Ieee64 {
    /// The raw bits.
    pub fn bits(self) -> u64 {
        self.0
    }
}

impl From<f64> for Ieee64 {
    fn from(value: f64) -> Self {
        Self(value.to_bits())
    }
}

impl From<Ieee64> for f64 {
    fn from(value: Ieee64) -> Self {
        Self::from_bits(value.0)
    }
}

// Function Types

/// The signature of a function: its parameter and result types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct FuncType {
    /// The parameters of the function
    params: Box<[ValueType]>,
    /// The return values of the function
    results: Box<[ValueType]>,
}

impl FuncType {
    /// The form byte every function type starts with.
    pub const FORM: u8 = 0x60;

    /// Creates a new function type with the given parameter and return types.
    pub fn new<Params, Returns>(params: Params, returns: Returns) -> Self
    where
        Params: Into<Box<[ValueType]>>,
        Returns: Into<Box<[ValueType]>>,
    {
        Self {
            params: params.into(),
            results: returns.into(),
        }
    }

    /// Parameter types.
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Return types.
    pub fn results(&self) -> &[ValueType] {
        &self.results
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] -> [{}]", join(&self.params), join(&self.results))
    }
}

/// Joins value types with single spaces, the way events print them.
pub fn join(types: &[ValueType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// Limits, tables, memories and globals

/// Size bounds of a table or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Limits {
    /// The minimum size.
    pub min: u32,
    /// The optional maximum size.
    pub max: Option<u32>,
}

impl Limits {
    /// Limits with only a minimum.
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{} {}", self.min, max),
            None => write!(f, "{}", self.min),
        }
    }
}

/// A table descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct TableType {
    /// The type of the stored references.
    pub element: RefType,
    /// The size bounds, in elements.
    pub limits: Limits,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.limits, self.element)
    }
}

/// A linear memory descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct MemoryType {
    /// The size bounds, in pages.
    pub limits: Limits,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.limits.fmt(f)
    }
}

/// Indicator of whether a global is mutable or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Mutability {
    /// The global is constant and its value does not change
    Const = 0,
    /// The value of the global can change over time
    Var = 1,
}

impl Mutability {
    /// Returns a boolean indicating if the enum is set to mutable.
    pub fn is_mutable(self) -> bool {
        self.into()
    }
}

impl From<bool> for Mutability {
    fn from(value: bool) -> Self {
        if value { Self::Var } else { Self::Const }
    }
}

impl From<Mutability> for bool {
    fn from(value: Mutability) -> Self {
        match value {
            Mutability::Var => true,
            Mutability::Const => false,
        }
    }
}

/// A global descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct GlobalType {
    /// The type of the value stored in the global.
    pub ty: ValueType,
    /// A flag indicating whether the value may change at runtime.
    pub mutability: Mutability,
}

impl GlobalType {
    /// Create a new global descriptor.
    pub fn new(ty: ValueType, mutability: Mutability) -> Self {
        Self { ty, mutability }
    }
}

impl fmt::Display for GlobalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mutability {
            Mutability::Const => write!(f, "{}", self.ty),
            Mutability::Var => write!(f, "(mut {})", self.ty),
        }
    }
}

/// The kind of entity an import or export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ExternalKind {
    /// A function.
    Function = 0,
    /// A table.
    Table = 1,
    /// A linear memory.
    Memory = 2,
    /// A global.
    Global = 3,
}

impl ExternalKind {
    /// Decodes an external kind from its tag byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Function,
            1 => Self::Table,
            2 => Self::Memory,
            3 => Self::Global,
            _ => return None,
        })
    }

    /// The tag byte of this kind.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Function => "func",
            Self::Table => "table",
            Self::Memory => "memory",
            Self::Global => "global",
        })
    }
}

// Segments

/// How an element segment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum ElementMode {
    /// Copied into `table_index` at instantiation, at an offset given by
    /// an expression.
    Active {
        /// The destination table.
        table_index: u32,
    },
    /// Available to `table.init`.
    Passive,
    /// Only declares function references for `ref.func`.
    Declarative,
}

impl fmt::Display for ElementMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Active { table_index } => write!(f, "active table={table_index}"),
            Self::Passive => f.write_str("passive"),
            Self::Declarative => f.write_str("declarative"),
        }
    }
}

/// How a data segment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum DataMode {
    /// Copied into `memory_index` at instantiation, at an offset given by
    /// an expression.
    Active {
        /// The destination memory.
        memory_index: u32,
    },
    /// Available to `memory.init`.
    Passive,
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Active { memory_index } => write!(f, "active memory={memory_index}"),
            Self::Passive => f.write_str("passive"),
        }
    }
}

// Instruction immediates

/// The result signature of a `block`, `loop` or `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum BlockType {
    /// No parameters, no results (`0x40`).
    Empty,
    /// No parameters, a single result.
    Value(ValueType),
    /// The signature at this index of the type section.
    FuncType(u32),
}

impl BlockType {
    /// The tag of the empty block type.
    pub const EMPTY: u8 = 0x40;
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Value(ty) => write!(f, " (result {ty})"),
            Self::FuncType(index) => write!(f, " (type {index})"),
        }
    }
}

/// The immediate of a load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct MemArg {
    /// Alignment, as a power of two.
    pub align: u32,
    /// Constant byte offset added to the dynamic address.
    pub offset: u32,
}

impl fmt::Display for MemArg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "align={} offset={}", 1u64 << self.align.min(63), self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_tags() {
        for byte in 0..=u8::MAX {
            if let Some(ty) = ValueType::from_byte(byte) {
                assert_eq!(ty.to_byte(), byte);
            }
        }
        assert_eq!(ValueType::from_byte(0x40), None);
        assert_eq!(ValueType::from_byte(0x7B), None);
        assert!(ValueType::I64.is_num());
        assert!(ValueType::ExternRef.is_ref());
    }

    #[test]
    fn ref_types_are_value_types() {
        assert_eq!(ValueType::from(RefType::FuncRef), ValueType::FuncRef);
        assert_eq!(
            RefType::from_byte(ValueType::ExternRef.to_byte()),
            Some(RefType::ExternRef)
        );
        assert_eq!(RefType::from_byte(ValueType::I32.to_byte()), None);
    }

    #[test]
    fn float_bits_are_preserved() {
        let nan = Ieee32(0x7FC0_0001);
        assert!(f32::from(nan).is_nan());
        assert_eq!(Ieee32::from(f32::from(nan)), nan);
        assert_eq!(Ieee64::from(-0.0f64).bits(), 0x8000_0000_0000_0000);
    }

    #[test]
    fn display() {
        let ty = FuncType::new([ValueType::I32, ValueType::I64], [ValueType::F32]);
        assert_eq!(ty.to_string(), "[i32 i64] -> [f32]");
        assert_eq!(
            GlobalType::new(ValueType::I32, Mutability::Var).to_string(),
            "(mut i32)"
        );
        assert_eq!(Limits::new(1, Some(2)).to_string(), "1 2");
        assert_eq!(MemArg { align: 2, offset: 8 }.to_string(), "align=4 offset=8");
    }
}
