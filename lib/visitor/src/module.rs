//! Visitors for the module and its sections.

use crate::ExpressionVisitor;
use wasmcodec_types::{
    DataMode, ElementMode, ExternalKind, GlobalType, MemoryType, RefType, TableType, ValueType,
    VisitResult,
};

/// Receives the top-level events of a module.
///
/// Sections arrive in the order they appear in the binary. Each
/// `visit_*_section` opener is called at most once per module.
pub trait ModuleVisitor {
    /// The next stage, if any. Events not overridden are forwarded there.
    fn delegate(&mut self) -> Option<&mut dyn ModuleVisitor> {
        None
    }

    /// The module header was read.
    fn visit_header(&mut self, version: u32) -> VisitResult {
        forward!(self.visit_header(version))
    }

    /// A custom section with its name and raw payload.
    fn visit_custom_section(&mut self, name: &str, payload: &[u8]) -> VisitResult {
        forward!(self.visit_custom_section(name, payload))
    }

    /// Opens the type section.
    fn visit_type_section(&mut self) -> VisitResult<Option<Box<dyn TypeSectionVisitor + '_>>> {
        forward!(self.visit_type_section())
    }

    /// Opens the import section.
    fn visit_import_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ImportSectionVisitor + '_>>> {
        forward!(self.visit_import_section())
    }

    /// Opens the function section.
    fn visit_function_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionSectionVisitor + '_>>> {
        forward!(self.visit_function_section())
    }

    /// Opens the table section.
    fn visit_table_section(&mut self) -> VisitResult<Option<Box<dyn TableSectionVisitor + '_>>> {
        forward!(self.visit_table_section())
    }

    /// Opens the memory section.
    fn visit_memory_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn MemorySectionVisitor + '_>>> {
        forward!(self.visit_memory_section())
    }

    /// Opens the global section.
    fn visit_global_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn GlobalSectionVisitor + '_>>> {
        forward!(self.visit_global_section())
    }

    /// Opens the export section.
    fn visit_export_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ExportSectionVisitor + '_>>> {
        forward!(self.visit_export_section())
    }

    /// The start section, naming the function run at instantiation.
    fn visit_start_section(&mut self, function_index: u32) -> VisitResult {
        forward!(self.visit_start_section(function_index))
    }

    /// Opens the element section.
    fn visit_element_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ElementSectionVisitor + '_>>> {
        forward!(self.visit_element_section())
    }

    /// The data count section.
    fn visit_data_count_section(&mut self, count: u32) -> VisitResult {
        forward!(self.visit_data_count_section(count))
    }

    /// Opens the code section.
    fn visit_code_section(&mut self) -> VisitResult<Option<Box<dyn CodeSectionVisitor + '_>>> {
        forward!(self.visit_code_section())
    }

    /// Opens the data section.
    fn visit_data_section(&mut self) -> VisitResult<Option<Box<dyn DataSectionVisitor + '_>>> {
        forward!(self.visit_data_section())
    }

    /// The whole module was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the type section.
pub trait TypeSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn TypeSectionVisitor> {
        None
    }

    /// A function signature.
    fn visit_func_type(&mut self, params: &[ValueType], results: &[ValueType]) -> VisitResult {
        forward!(self.visit_func_type(params, results))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the import section.
pub trait ImportSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn ImportSectionVisitor> {
        None
    }

    /// An imported function with the index of its signature.
    fn visit_function_import(&mut self, module: &str, field: &str, type_index: u32) -> VisitResult {
        forward!(self.visit_function_import(module, field, type_index))
    }

    /// An imported table.
    fn visit_table_import(&mut self, module: &str, field: &str, ty: TableType) -> VisitResult {
        forward!(self.visit_table_import(module, field, ty))
    }

    /// An imported memory.
    fn visit_memory_import(&mut self, module: &str, field: &str, ty: MemoryType) -> VisitResult {
        forward!(self.visit_memory_import(module, field, ty))
    }

    /// An imported global.
    fn visit_global_import(&mut self, module: &str, field: &str, ty: GlobalType) -> VisitResult {
        forward!(self.visit_global_import(module, field, ty))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the function section.
pub trait FunctionSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn FunctionSectionVisitor> {
        None
    }

    /// The signature of the next defined function.
    fn visit_function(&mut self, type_index: u32) -> VisitResult {
        forward!(self.visit_function(type_index))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the table section.
pub trait TableSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn TableSectionVisitor> {
        None
    }

    /// A table definition.
    fn visit_table(&mut self, ty: TableType) -> VisitResult {
        forward!(self.visit_table(ty))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the memory section.
pub trait MemorySectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn MemorySectionVisitor> {
        None
    }

    /// A memory definition.
    fn visit_memory(&mut self, ty: MemoryType) -> VisitResult {
        forward!(self.visit_memory(ty))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the global section.
pub trait GlobalSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn GlobalSectionVisitor> {
        None
    }

    /// A global definition. The returned visitor receives its initializer.
    fn visit_global(
        &mut self,
        ty: GlobalType,
    ) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        forward!(self.visit_global(ty))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the export section.
pub trait ExportSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn ExportSectionVisitor> {
        None
    }

    /// An exported entity.
    fn visit_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> VisitResult {
        forward!(self.visit_export(name, kind, index))
    }

    /// The last entry was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the segments of the element section.
pub trait ElementSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn ElementSectionVisitor> {
        None
    }

    /// Opens an element segment.
    fn visit_element(
        &mut self,
        mode: ElementMode,
    ) -> VisitResult<Option<Box<dyn ElementSegmentVisitor + '_>>> {
        forward!(self.visit_element(mode))
    }

    /// The last segment was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the contents of one element segment.
///
/// An active segment first receives its offset expression. Every segment
/// then receives its reference type, followed by its items: either plain
/// function indices or one expression per item.
pub trait ElementSegmentVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn ElementSegmentVisitor> {
        None
    }

    /// Opens the offset expression of an active segment.
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        forward!(self.visit_offset())
    }

    /// The type of the references in this segment.
    fn visit_ref_type(&mut self, ty: RefType) -> VisitResult {
        forward!(self.visit_ref_type(ty))
    }

    /// An item given as a function index.
    fn visit_function_index(&mut self, function_index: u32) -> VisitResult {
        forward!(self.visit_function_index(function_index))
    }

    /// Opens an item given as an expression.
    fn visit_item(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        forward!(self.visit_item())
    }

    /// The last item was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the entries of the code section.
pub trait CodeSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn CodeSectionVisitor> {
        None
    }

    /// Opens the next function body.
    fn visit_function_body(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionBodyVisitor + '_>>> {
        forward!(self.visit_function_body())
    }

    /// The last body was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the contents of one function body.
pub trait FunctionBodyVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn FunctionBodyVisitor> {
        None
    }

    /// The declared locals, one entry per slot.
    fn visit_locals(&mut self, locals: &[ValueType]) -> VisitResult {
        forward!(self.visit_locals(locals))
    }

    /// Opens the body's instructions.
    fn visit_expression(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        forward!(self.visit_expression())
    }

    /// The body was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the segments of the data section.
pub trait DataSectionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn DataSectionVisitor> {
        None
    }

    /// Opens a data segment.
    fn visit_data(
        &mut self,
        mode: DataMode,
    ) -> VisitResult<Option<Box<dyn DataSegmentVisitor + '_>>> {
        forward!(self.visit_data(mode))
    }

    /// The last segment was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}

/// Receives the contents of one data segment.
pub trait DataSegmentVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn DataSegmentVisitor> {
        None
    }

    /// Opens the offset expression of an active segment.
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        forward!(self.visit_offset())
    }

    /// The bytes to copy into memory.
    fn visit_bytes(&mut self, bytes: &[u8]) -> VisitResult {
        forward!(self.visit_bytes(bytes))
    }

    /// The segment was read.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }
}
