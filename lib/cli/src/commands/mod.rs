//! The commands available in the wasmcodec binary.
mod check;
mod dump;
mod roundtrip;
mod strip;

pub use self::{check::*, dump::*, roundtrip::*, strip::*};
