use crate::{
    CodeSectionVisitor, DataSectionVisitor, DataSegmentVisitor, ElementSectionVisitor,
    ElementSegmentVisitor, ExportSectionVisitor, ExpressionVisitor, FunctionBodyVisitor,
    FunctionSectionVisitor, GlobalSectionVisitor, ImportSectionVisitor, MemorySectionVisitor,
    ModuleVisitor, TableSectionVisitor, TypeSectionVisitor,
};
use wasmcodec_types::{DataMode, ElementMode, GlobalType, VisitResult};

/// A stage that accepts every structure and drops every event.
///
/// Unlike a visitor that returns `None` from its openers, `Discard` makes
/// the decoder walk the whole module, so it is what a pure well-formedness
/// check decodes into.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl ModuleVisitor for Discard {
    fn visit_type_section(&mut self) -> VisitResult<Option<Box<dyn TypeSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_import_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ImportSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_function_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_table_section(&mut self) -> VisitResult<Option<Box<dyn TableSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_memory_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn MemorySectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_global_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn GlobalSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_export_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ExportSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_element_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ElementSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_code_section(&mut self) -> VisitResult<Option<Box<dyn CodeSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_data_section(&mut self) -> VisitResult<Option<Box<dyn DataSectionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl TypeSectionVisitor for Discard {}
impl ImportSectionVisitor for Discard {}
impl FunctionSectionVisitor for Discard {}
impl TableSectionVisitor for Discard {}
impl MemorySectionVisitor for Discard {}
impl ExportSectionVisitor for Discard {}
impl ExpressionVisitor for Discard {}

impl GlobalSectionVisitor for Discard {
    fn visit_global(&mut self, _: GlobalType) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl ElementSectionVisitor for Discard {
    fn visit_element(
        &mut self,
        _: ElementMode,
    ) -> VisitResult<Option<Box<dyn ElementSegmentVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl ElementSegmentVisitor for Discard {
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }

    fn visit_item(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl CodeSectionVisitor for Discard {
    fn visit_function_body(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionBodyVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl FunctionBodyVisitor for Discard {
    fn visit_expression(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl DataSectionVisitor for Discard {
    fn visit_data(&mut self, _: DataMode) -> VisitResult<Option<Box<dyn DataSegmentVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}

impl DataSegmentVisitor for Discard {
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(Self)))
    }
}
