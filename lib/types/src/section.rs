use std::fmt;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// The four bytes every module starts with: `\0asm`.
pub const MAGIC: [u8; 4] = *b"\0asm";

/// The only binary format version understood by this codec.
pub const VERSION: u32 = 1;

/// The identifier byte of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum SectionId {
    /// Named, opaque payload. May appear anywhere, any number of times.
    Custom = 0,
    /// Function signatures.
    Type = 1,
    /// Imported functions, tables, memories and globals.
    Import = 2,
    /// Type indices of the functions defined in the code section.
    Function = 3,
    /// Table definitions.
    Table = 4,
    /// Memory definitions.
    Memory = 5,
    /// Global definitions with their initializers.
    Global = 6,
    /// Exported entities.
    Export = 7,
    /// The start function.
    Start = 8,
    /// Element segments.
    Element = 9,
    /// Function bodies.
    Code = 10,
    /// Data segments.
    Data = 11,
    /// Number of data segments, needed by `memory.init`/`data.drop`.
    DataCount = 12,
}

impl SectionId {
    /// Decodes a section identifier.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Custom,
            1 => Self::Type,
            2 => Self::Import,
            3 => Self::Function,
            4 => Self::Table,
            5 => Self::Memory,
            6 => Self::Global,
            7 => Self::Export,
            8 => Self::Start,
            9 => Self::Element,
            10 => Self::Code,
            11 => Self::Data,
            12 => Self::DataCount,
            _ => return None,
        })
    }

    /// The identifier byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Where this section must sit relative to the other known sections.
    ///
    /// Equal to the identifier except for `DataCount`, which goes between
    /// the element and code sections. `Custom` has no position.
    pub fn position(self) -> Option<u8> {
        match self {
            Self::Custom => None,
            Self::DataCount => Some(Self::Element.to_byte() * 2 + 1),
            id => Some(id.to_byte() * 2),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Custom => "custom",
            Self::Type => "type",
            Self::Import => "import",
            Self::Function => "function",
            Self::Table => "table",
            Self::Memory => "memory",
            Self::Global => "global",
            Self::Export => "export",
            Self::Start => "start",
            Self::Element => "element",
            Self::Code => "code",
            Self::Data => "data",
            Self::DataCount => "datacount",
        })
    }
}
