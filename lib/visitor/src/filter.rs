use crate::ModuleVisitor;
use std::fmt;
use wasmcodec_types::VisitResult;

/// Forwards every event downstream, dropping the custom sections whose
/// name the predicate rejects.
pub struct CustomSectionFilter<'a, F: FnMut(&str) -> bool> {
    /// The downstream stage.
    next: &'a mut dyn ModuleVisitor,

    /// Returns true for the custom sections to keep.
    keep: F,

    /// How many custom sections were dropped.
    dropped: usize,
}

impl<'a, F: FnMut(&str) -> bool> CustomSectionFilter<'a, F> {
    /// Creates a filter in front of `next`.
    pub fn new(next: &'a mut dyn ModuleVisitor, keep: F) -> Self {
        Self {
            next,
            keep,
            dropped: 0,
        }
    }

    /// How many custom sections were dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<F: FnMut(&str) -> bool> fmt::Debug for CustomSectionFilter<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSectionFilter")
            .field("keep", &"<function>")
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl<F: FnMut(&str) -> bool> ModuleVisitor for CustomSectionFilter<'_, F> {
    fn delegate(&mut self) -> Option<&mut dyn ModuleVisitor> {
        Some(&mut *self.next)
    }

    fn visit_custom_section(&mut self, name: &str, payload: &[u8]) -> VisitResult {
        if (self.keep)(name) {
            self.next.visit_custom_section(name, payload)
        } else {
            self.dropped += 1;
            Ok(())
        }
    }
}
