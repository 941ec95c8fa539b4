//! A stage rendering the event stream as indented text.

use crate::{
    CodeSectionVisitor, DataSectionVisitor, DataSegmentVisitor, ElementSectionVisitor,
    ElementSegmentVisitor, ExportSectionVisitor, ExpressionVisitor, FunctionBodyVisitor,
    FunctionSectionVisitor, GlobalSectionVisitor, ImportSectionVisitor, MemorySectionVisitor,
    ModuleVisitor, TableSectionVisitor, TypeSectionVisitor,
};
use wasmcodec_types::{
    BlockType, DataMode, ElementMode, ExternalKind, GlobalType, Ieee32, Ieee64, MemArg,
    MemoryType, Opcode, RefType, TableType, ValueType, VisitResult, join,
};

/// Renders every event as one line of text, indented by nesting level.
///
/// Two event streams are equal exactly when their renderings are, which
/// makes the printer the reference for structural round-trip tests as
/// well as the output of `wasmcodec dump`.
#[derive(Debug, Default, Clone)]
pub struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    /// Creates an empty printer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The text rendered so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consumes the printer, returning the rendered text.
    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }
}

impl ModuleVisitor for Printer {
    fn visit_header(&mut self, version: u32) -> VisitResult {
        self.line(format!("module version={version}"));
        Ok(())
    }

    fn visit_custom_section(&mut self, name: &str, payload: &[u8]) -> VisitResult {
        self.line(format!("custom {name:?} ({} bytes)", payload.len()));
        Ok(())
    }

    fn visit_type_section(&mut self) -> VisitResult<Option<Box<dyn TypeSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "type section"))))
    }

    fn visit_import_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ImportSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "import section"))))
    }

    fn visit_function_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "function section"))))
    }

    fn visit_table_section(&mut self) -> VisitResult<Option<Box<dyn TableSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "table section"))))
    }

    fn visit_memory_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn MemorySectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "memory section"))))
    }

    fn visit_global_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn GlobalSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "global section"))))
    }

    fn visit_export_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ExportSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "export section"))))
    }

    fn visit_start_section(&mut self, function_index: u32) -> VisitResult {
        self.line(format!("start {function_index}"));
        Ok(())
    }

    fn visit_element_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ElementSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "element section"))))
    }

    fn visit_data_count_section(&mut self, count: u32) -> VisitResult {
        self.line(format!("datacount {count}"));
        Ok(())
    }

    fn visit_code_section(&mut self) -> VisitResult<Option<Box<dyn CodeSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "code section"))))
    }

    fn visit_data_section(&mut self) -> VisitResult<Option<Box<dyn DataSectionVisitor + '_>>> {
        Ok(Some(Box::new(Scope::open(self, "data section"))))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end module");
        Ok(())
    }
}

/// One indentation level of a [`Printer`], alive while its structure is open.
struct Scope<'a> {
    printer: &'a mut Printer,
    /// Blocks opened inside this scope's expression and not yet closed.
    blocks: usize,
}

impl<'a> Scope<'a> {
    fn open(printer: &'a mut Printer, title: impl AsRef<str>) -> Self {
        printer.line(title);
        printer.depth += 1;
        Self { printer, blocks: 0 }
    }

    fn nested(&mut self, title: impl AsRef<str>) -> Box<Scope<'_>> {
        Box::new(Scope::open(self.printer, title))
    }

    fn line(&mut self, text: impl AsRef<str>) -> VisitResult {
        self.printer.line(text);
        Ok(())
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.printer.depth = self.printer.depth.saturating_sub(1 + self.blocks);
    }
}

impl TypeSectionVisitor for Scope<'_> {
    fn visit_func_type(&mut self, params: &[ValueType], results: &[ValueType]) -> VisitResult {
        self.line(format!("func [{}] -> [{}]", join(params), join(results)))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl ImportSectionVisitor for Scope<'_> {
    fn visit_function_import(&mut self, module: &str, field: &str, type_index: u32) -> VisitResult {
        self.line(format!("import {module:?} {field:?} func type={type_index}"))
    }

    fn visit_table_import(&mut self, module: &str, field: &str, ty: TableType) -> VisitResult {
        self.line(format!("import {module:?} {field:?} table {ty}"))
    }

    fn visit_memory_import(&mut self, module: &str, field: &str, ty: MemoryType) -> VisitResult {
        self.line(format!("import {module:?} {field:?} memory {ty}"))
    }

    fn visit_global_import(&mut self, module: &str, field: &str, ty: GlobalType) -> VisitResult {
        self.line(format!("import {module:?} {field:?} global {ty}"))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl FunctionSectionVisitor for Scope<'_> {
    fn visit_function(&mut self, type_index: u32) -> VisitResult {
        self.line(format!("function type={type_index}"))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl TableSectionVisitor for Scope<'_> {
    fn visit_table(&mut self, ty: TableType) -> VisitResult {
        self.line(format!("table {ty}"))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl MemorySectionVisitor for Scope<'_> {
    fn visit_memory(&mut self, ty: MemoryType) -> VisitResult {
        self.line(format!("memory {ty}"))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl GlobalSectionVisitor for Scope<'_> {
    fn visit_global(
        &mut self,
        ty: GlobalType,
    ) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(self.nested(format!("global {ty}"))))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl ExportSectionVisitor for Scope<'_> {
    fn visit_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> VisitResult {
        self.line(format!("export {name:?} {kind} {index}"))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl ElementSectionVisitor for Scope<'_> {
    fn visit_element(
        &mut self,
        mode: ElementMode,
    ) -> VisitResult<Option<Box<dyn ElementSegmentVisitor + '_>>> {
        Ok(Some(self.nested(format!("element {mode}"))))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl ElementSegmentVisitor for Scope<'_> {
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(self.nested("offset")))
    }

    fn visit_ref_type(&mut self, ty: RefType) -> VisitResult {
        self.line(format!("type {ty}"))
    }

    fn visit_function_index(&mut self, function_index: u32) -> VisitResult {
        self.line(format!("func {function_index}"))
    }

    fn visit_item(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(self.nested("item")))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl CodeSectionVisitor for Scope<'_> {
    fn visit_function_body(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionBodyVisitor + '_>>> {
        Ok(Some(self.nested("body")))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl FunctionBodyVisitor for Scope<'_> {
    fn visit_locals(&mut self, locals: &[ValueType]) -> VisitResult {
        self.line(format!("locals [{}]", join(locals)))
    }

    fn visit_expression(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(self.nested("code")))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl DataSectionVisitor for Scope<'_> {
    fn visit_data(
        &mut self,
        mode: DataMode,
    ) -> VisitResult<Option<Box<dyn DataSegmentVisitor + '_>>> {
        Ok(Some(self.nested(format!("data {mode}"))))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl DataSegmentVisitor for Scope<'_> {
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(self.nested("offset")))
    }

    fn visit_bytes(&mut self, bytes: &[u8]) -> VisitResult {
        self.line(format!("bytes \"{}\"", bytes.escape_ascii()))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.line("end")
    }
}

impl ExpressionVisitor for Scope<'_> {
    fn visit_instruction(&mut self, op: Opcode) -> VisitResult {
        self.line(op.mnemonic())
    }

    fn visit_block(&mut self, op: Opcode, ty: BlockType) -> VisitResult {
        self.line(format!("{op}{ty}"))?;
        self.blocks += 1;
        self.printer.depth += 1;
        Ok(())
    }

    fn visit_else(&mut self) -> VisitResult {
        let depth = self.printer.depth;
        self.printer.depth = depth.saturating_sub(1);
        self.printer.line("else");
        self.printer.depth = depth;
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        if self.blocks > 0 {
            self.blocks -= 1;
            self.printer.depth -= 1;
        }
        self.line("end")
    }

    fn visit_index(&mut self, op: Opcode, index: u32) -> VisitResult {
        self.line(format!("{op} {index}"))
    }

    fn visit_call_indirect(&mut self, type_index: u32, table_index: u32) -> VisitResult {
        self.line(format!("call_indirect type={type_index} table={table_index}"))
    }

    fn visit_br_table(&mut self, targets: &[u32], default: u32) -> VisitResult {
        let labels: String = targets.iter().map(|target| format!(" {target}")).collect();
        self.line(format!("br_table{labels} default={default}"))
    }

    fn visit_memory_access(&mut self, op: Opcode, memarg: MemArg) -> VisitResult {
        self.line(format!("{op} {memarg}"))
    }

    fn visit_i32_const(&mut self, value: i32) -> VisitResult {
        self.line(format!("i32.const {value}"))
    }

    fn visit_i64_const(&mut self, value: i64) -> VisitResult {
        self.line(format!("i64.const {value}"))
    }

    fn visit_f32_const(&mut self, value: Ieee32) -> VisitResult {
        self.line(format!("f32.const {:#010x}", value.bits()))
    }

    fn visit_f64_const(&mut self, value: Ieee64) -> VisitResult {
        self.line(format!("f64.const {:#018x}", value.bits()))
    }

    fn visit_ref_null(&mut self, ty: RefType) -> VisitResult {
        self.line(format!("ref.null {ty}"))
    }

    fn visit_select_typed(&mut self, types: &[ValueType]) -> VisitResult {
        self.line(format!("select (result {})", join(types)))
    }

    fn visit_table_init(&mut self, table_index: u32, elem_index: u32) -> VisitResult {
        self.line(format!("table.init {table_index} {elem_index}"))
    }

    fn visit_table_copy(&mut self, dst: u32, src: u32) -> VisitResult {
        self.line(format!("table.copy {dst} {src}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_blocks_are_indented() -> VisitResult {
        let mut printer = Printer::new();
        printer.visit_header(1)?;
        {
            let mut code = printer.visit_code_section()?.unwrap();
            {
                let mut body = code.visit_function_body()?.unwrap();
                body.visit_locals(&[ValueType::I32, ValueType::I32])?;
                {
                    let mut expr = body.visit_expression()?.unwrap();
                    expr.visit_block(Opcode::If, BlockType::Value(ValueType::I32))?;
                    expr.visit_i32_const(1)?;
                    expr.visit_else()?;
                    expr.visit_i32_const(2)?;
                    expr.visit_end()?;
                    expr.visit_end()?;
                }
                body.visit_end()?;
            }
            code.visit_end()?;
        }
        printer.visit_end()?;

        assert_eq!(
            printer.as_str(),
            "\
module version=1
code section
  body
    locals [i32 i32]
    code
      if (result i32)
        i32.const 1
      else
        i32.const 2
      end
      end
    end
  end
end module
"
        );
        Ok(())
    }

    #[test]
    fn abandoned_scopes_restore_depth() -> VisitResult {
        let mut printer = Printer::new();
        {
            let mut globals = printer.visit_global_section()?.unwrap();
            let mut init = globals.visit_global(GlobalType::new(
                ValueType::I32,
                wasmcodec_types::Mutability::Const,
            ))?
            .unwrap();
            init.visit_block(Opcode::Block, BlockType::Empty)?;
        }
        printer.visit_start_section(3)?;
        assert!(printer.as_str().ends_with("\nstart 3\n"));
        Ok(())
    }

    #[test]
    fn immediates_are_rendered() -> VisitResult {
        let mut printer = Printer::new();
        {
            let mut data = printer.visit_data_section()?.unwrap();
            let mut segment = data.visit_data(DataMode::Active { memory_index: 0 })?.unwrap();
            {
                let mut offset = segment.visit_offset()?.unwrap();
                offset.visit_memory_access(Opcode::I32Load, MemArg { align: 2, offset: 4 })?;
                offset.visit_br_table(&[0, 1], 2)?;
                offset.visit_br_table(&[], 0)?;
                offset.visit_f32_const(Ieee32::from(1.0f32))?;
                offset.visit_end()?;
            }
            segment.visit_bytes(b"hi\n")?;
        }
        assert_eq!(
            printer.as_str(),
            "\
data section
  data active memory=0
    offset
      i32.load align=4 offset=4
      br_table 0 1 default=2
      br_table default=0
      f32.const 0x3f800000
      end
    bytes \"hi\\n\"
"
        );
        Ok(())
    }
}
