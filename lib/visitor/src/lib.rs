//! Event interfaces for the WebAssembly binary codec.
//!
//! A decode pass is a stream of events: one trait per structural position
//! of a module, one method per thing that can be observed there. Methods
//! that open a nested structure return a visitor for it, or `None` when
//! the stage is not interested, in which case the decoder skips the
//! structure without producing its events.
//!
//! Every trait has a [`delegate`](ModuleVisitor::delegate) hook. A stage
//! wrapping another stage returns it from `delegate`, and every method it
//! does not override is forwarded there unchanged. A stage with no
//! delegate ignores everything it does not override. The same contract
//! thus covers the null object, a transparent pass-through and a filter
//! overriding only a few events:
//!
//! ```
//! use wasmcodec_visitor::{Discard, ModuleVisitor, VisitResult};
//!
//! /// Counts custom sections, forwarding every event downstream.
//! struct CountCustom<'a> {
//!     next: &'a mut dyn ModuleVisitor,
//!     seen: usize,
//! }
//!
//! impl ModuleVisitor for CountCustom<'_> {
//!     fn delegate(&mut self) -> Option<&mut dyn ModuleVisitor> {
//!         Some(&mut *self.next)
//!     }
//!
//!     fn visit_custom_section(&mut self, name: &str, payload: &[u8]) -> VisitResult {
//!         self.seen += 1;
//!         self.next.visit_custom_section(name, payload)
//!     }
//! }
//!
//! let mut sink = Discard;
//! let mut stage = CountCustom { next: &mut sink, seen: 0 };
//! stage.visit_custom_section("name", &[]).unwrap();
//! assert_eq!(stage.seen, 1);
//! ```

#![deny(missing_docs, unused_extern_crates)]
#![warn(unused_import_braces)]

/// Forwards an event to the delegate, or does nothing without one.
macro_rules! forward {
    ($self:ident . $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self.delegate() {
            Some(next) => next.$method($($arg),*),
            None => Ok(Default::default()),
        }
    };
}

mod discard;
mod expression;
mod filter;
mod module;
mod print;

pub use crate::discard::Discard;
pub use crate::expression::ExpressionVisitor;
pub use crate::filter::CustomSectionFilter;
pub use crate::module::{
    CodeSectionVisitor, DataSectionVisitor, DataSegmentVisitor, ElementSectionVisitor,
    ElementSegmentVisitor, ExportSectionVisitor, FunctionBodyVisitor, FunctionSectionVisitor,
    GlobalSectionVisitor, ImportSectionVisitor, MemorySectionVisitor, ModuleVisitor,
    TableSectionVisitor, TypeSectionVisitor,
};
pub use crate::print::Printer;

pub use wasmcodec_types::{VisitError, VisitResult};
