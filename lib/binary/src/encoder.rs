//! Writes a binary module back from a stream of events.
//!
//! [`Encoder`] is a terminal pipeline stage: every trait is implemented,
//! every opener accepts. Sections are buffered until their `visit_end`
//! because the section header carries the payload length.

use crate::{ByteWriter, ToBytes};
use wasmcodec_types::{
    BlockType, DataMode, ElementMode, Encoding, ExternalKind, FuncType, GlobalType, Ieee32, Ieee64,
    Immediate, MAGIC, MemArg, MemoryType, Opcode, PREFIX_MISC, RefType, SectionId, TableType,
    ValueType, VisitError, VisitResult,
};
use wasmcodec_visitor::{
    CodeSectionVisitor, DataSectionVisitor, DataSegmentVisitor, ElementSectionVisitor,
    ElementSegmentVisitor, ExportSectionVisitor, ExpressionVisitor, FunctionBodyVisitor,
    FunctionSectionVisitor, GlobalSectionVisitor, ImportSectionVisitor, MemorySectionVisitor,
    ModuleVisitor, TableSectionVisitor, TypeSectionVisitor,
};

/// Builds a module from the events it receives.
///
/// # Usage
///
/// ```
/// use wasmcodec_binary::{Decoder, Encoder};
///
/// let bytes = b"\0asm\x01\0\0\0\x08\x01\x00";
/// let mut encoder = Encoder::new();
/// Decoder::new(&bytes[..]).decode(&mut encoder)?;
/// assert_eq!(encoder.finish(), bytes);
/// # Ok::<(), wasmcodec_types::BinaryError>(())
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    out: ByteWriter,
}

impl Encoder {
    /// Creates an encoder with an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes produced so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Returns true if nothing was produced yet.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consumes the encoder, returning the module bytes.
    pub fn finish(self) -> Vec<u8> {
        self.out.into_inner()
    }

    fn section(&mut self, id: SectionId) -> Box<SectionEncoder<'_>> {
        Box::new(SectionEncoder {
            out: &mut self.out,
            id,
            count: 0,
            body: ByteWriter::new(),
        })
    }
}

/// Appends `[id][size][payload]`.
fn write_section(out: &mut ByteWriter, id: SectionId, payload: &[u8]) {
    out.put_byte(id.to_byte());
    out.write_byte_vec(payload);
}

impl ModuleVisitor for Encoder {
    fn visit_header(&mut self, version: u32) -> VisitResult {
        self.out.put_bytes(&MAGIC);
        self.out.write_u32_le(version);
        Ok(())
    }

    fn visit_custom_section(&mut self, name: &str, payload: &[u8]) -> VisitResult {
        let mut section = ByteWriter::new();
        section.write_name(name);
        section.put_bytes(payload);
        write_section(&mut self.out, SectionId::Custom, section.as_slice());
        Ok(())
    }

    fn visit_type_section(&mut self) -> VisitResult<Option<Box<dyn TypeSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Type)))
    }

    fn visit_import_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ImportSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Import)))
    }

    fn visit_function_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn FunctionSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Function)))
    }

    fn visit_table_section(&mut self) -> VisitResult<Option<Box<dyn TableSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Table)))
    }

    fn visit_memory_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn MemorySectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Memory)))
    }

    fn visit_global_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn GlobalSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Global)))
    }

    fn visit_export_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ExportSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Export)))
    }

    fn visit_start_section(&mut self, function_index: u32) -> VisitResult {
        let mut section = ByteWriter::new();
        section.write_var_u32(function_index);
        write_section(&mut self.out, SectionId::Start, section.as_slice());
        Ok(())
    }

    fn visit_element_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ElementSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Element)))
    }

    fn visit_data_count_section(&mut self, count: u32) -> VisitResult {
        let mut section = ByteWriter::new();
        section.write_var_u32(count);
        write_section(&mut self.out, SectionId::DataCount, section.as_slice());
        Ok(())
    }

    fn visit_code_section(&mut self) -> VisitResult<Option<Box<dyn CodeSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Code)))
    }

    fn visit_data_section(&mut self) -> VisitResult<Option<Box<dyn DataSectionVisitor + '_>>> {
        Ok(Some(self.section(SectionId::Data)))
    }

    fn visit_end(&mut self) -> VisitResult {
        Ok(())
    }
}

/// Buffers the entries of one vector section.
///
/// The section is written on `visit_end`, and only if it has entries.
struct SectionEncoder<'a> {
    out: &'a mut ByteWriter,
    id: SectionId,
    count: u32,
    body: ByteWriter,
}

impl SectionEncoder<'_> {
    /// Counts a new entry and returns the buffer it goes to.
    fn entry(&mut self) -> &mut ByteWriter {
        self.count += 1;
        &mut self.body
    }

    fn end(&mut self) -> VisitResult {
        if self.count == 0 {
            tracing::trace!(id = %self.id, "empty section omitted");
            return Ok(());
        }
        let mut payload = ByteWriter::new();
        payload.write_var_u32(self.count);
        payload.put_bytes(self.body.as_slice());
        tracing::trace!(id = %self.id, count = self.count, size = payload.len(), "section encoded");
        write_section(self.out, self.id, payload.as_slice());
        Ok(())
    }
}

impl TypeSectionVisitor for SectionEncoder<'_> {
    fn visit_func_type(&mut self, params: &[ValueType], results: &[ValueType]) -> VisitResult {
        let out = self.entry();
        out.put_byte(FuncType::FORM);
        out.write(params);
        out.write(results);
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl SectionEncoder<'_> {
    fn import(&mut self, module: &str, field: &str, kind: ExternalKind) -> &mut ByteWriter {
        let out = self.entry();
        out.write_name(module);
        out.write_name(field);
        out.put_byte(kind.to_byte());
        out
    }
}

impl ImportSectionVisitor for SectionEncoder<'_> {
    fn visit_function_import(&mut self, module: &str, field: &str, type_index: u32) -> VisitResult {
        self.import(module, field, ExternalKind::Function)
            .write_var_u32(type_index);
        Ok(())
    }

    fn visit_table_import(&mut self, module: &str, field: &str, ty: TableType) -> VisitResult {
        self.import(module, field, ExternalKind::Table).write(&ty);
        Ok(())
    }

    fn visit_memory_import(&mut self, module: &str, field: &str, ty: MemoryType) -> VisitResult {
        self.import(module, field, ExternalKind::Memory).write(&ty);
        Ok(())
    }

    fn visit_global_import(&mut self, module: &str, field: &str, ty: GlobalType) -> VisitResult {
        self.import(module, field, ExternalKind::Global).write(&ty);
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl FunctionSectionVisitor for SectionEncoder<'_> {
    fn visit_function(&mut self, type_index: u32) -> VisitResult {
        self.entry().write_var_u32(type_index);
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl TableSectionVisitor for SectionEncoder<'_> {
    fn visit_table(&mut self, ty: TableType) -> VisitResult {
        self.entry().write(&ty);
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl MemorySectionVisitor for SectionEncoder<'_> {
    fn visit_memory(&mut self, ty: MemoryType) -> VisitResult {
        self.entry().write(&ty);
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl GlobalSectionVisitor for SectionEncoder<'_> {
    fn visit_global(
        &mut self,
        ty: GlobalType,
    ) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        let out = self.entry();
        out.write(&ty);
        Ok(Some(Box::new(ExpressionEncoder { out })))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl ExportSectionVisitor for SectionEncoder<'_> {
    fn visit_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> VisitResult {
        let out = self.entry();
        out.write_name(name);
        out.put_byte(kind.to_byte());
        out.write_var_u32(index);
        Ok(())
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl ElementSectionVisitor for SectionEncoder<'_> {
    fn visit_element(
        &mut self,
        mode: ElementMode,
    ) -> VisitResult<Option<Box<dyn ElementSegmentVisitor + '_>>> {
        Ok(Some(Box::new(ElementEncoder {
            out: self.entry(),
            mode,
            offset: ByteWriter::new(),
            ty: RefType::FuncRef,
            items: Vec::new(),
        })))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl CodeSectionVisitor for SectionEncoder<'_> {
    fn visit_function_body(&mut self) -> VisitResult<Option<Box<dyn FunctionBodyVisitor + '_>>> {
        Ok(Some(Box::new(BodyEncoder {
            out: self.entry(),
            body: ByteWriter::new(),
        })))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

impl DataSectionVisitor for SectionEncoder<'_> {
    fn visit_data(
        &mut self,
        mode: DataMode,
    ) -> VisitResult<Option<Box<dyn DataSegmentVisitor + '_>>> {
        let out = self.entry();
        match mode {
            DataMode::Active { memory_index: 0 } => out.write_var_u32(0),
            DataMode::Passive => out.write_var_u32(1),
            DataMode::Active { memory_index } => {
                out.write_var_u32(2);
                out.write_var_u32(memory_index);
            }
        }
        Ok(Some(Box::new(DataEncoder { out })))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.end()
    }
}

/// One item of an element segment, kept until the encoding form is known.
enum ElementItem {
    Function(u32),
    Expression(ByteWriter),
}

/// Buffers an element segment: its flags depend on events arriving last.
struct ElementEncoder<'a> {
    out: &'a mut ByteWriter,
    mode: ElementMode,
    offset: ByteWriter,
    ty: RefType,
    items: Vec<ElementItem>,
}

impl ElementEncoder<'_> {
    /// The flags describing this segment in its most compact form.
    fn flags(&self) -> u32 {
        let expressions = self.ty != RefType::FuncRef
            || self
                .items
                .iter()
                .any(|item| matches!(item, ElementItem::Expression(_)));
        let mode = match self.mode {
            ElementMode::Active { table_index: 0 } if self.ty == RefType::FuncRef => 0b000,
            ElementMode::Active { .. } => 0b010,
            ElementMode::Passive => 0b001,
            ElementMode::Declarative => 0b011,
        };
        if expressions { mode | 0b100 } else { mode }
    }
}

impl ElementSegmentVisitor for ElementEncoder<'_> {
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        self.offset = ByteWriter::new();
        Ok(Some(Box::new(ExpressionEncoder {
            out: &mut self.offset,
        })))
    }

    fn visit_ref_type(&mut self, ty: RefType) -> VisitResult {
        self.ty = ty;
        Ok(())
    }

    fn visit_function_index(&mut self, function_index: u32) -> VisitResult {
        self.items.push(ElementItem::Function(function_index));
        Ok(())
    }

    fn visit_item(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        self.items.push(ElementItem::Expression(ByteWriter::new()));
        match self.items.last_mut() {
            Some(ElementItem::Expression(out)) => Ok(Some(Box::new(ExpressionEncoder { out }))),
            _ => Err(VisitError::new("element item buffer missing")),
        }
    }

    fn visit_end(&mut self) -> VisitResult {
        let flags = self.flags();
        let out = &mut *self.out;
        out.write_var_u32(flags);
        if let ElementMode::Active { table_index } = self.mode {
            if flags & 0b010 != 0 {
                out.write_var_u32(table_index);
            }
            out.put_bytes(self.offset.as_slice());
        }
        if flags & 0b011 != 0 {
            if flags & 0b100 != 0 {
                out.write(&self.ty);
            } else {
                // Element kind: funcref.
                out.put_byte(0x00);
            }
        }
        out.write_uleb(self.items.len() as u64);
        for item in &self.items {
            match item {
                ElementItem::Function(index) if flags & 0b100 == 0 => out.write_var_u32(*index),
                ElementItem::Function(index) => {
                    let mut expr = ExpressionEncoder { out: &mut *out };
                    expr.visit_index(Opcode::RefFunc, *index)?;
                    expr.visit_end()?;
                }
                ElementItem::Expression(bytes) => out.put_bytes(bytes.as_slice()),
            }
        }
        Ok(())
    }
}

/// Buffers one function body until its size is known.
struct BodyEncoder<'a> {
    out: &'a mut ByteWriter,
    body: ByteWriter,
}

impl FunctionBodyVisitor for BodyEncoder<'_> {
    fn visit_locals(&mut self, locals: &[ValueType]) -> VisitResult {
        let mut runs: Vec<(u32, ValueType)> = Vec::new();
        for &ty in locals {
            match runs.last_mut() {
                Some((count, last)) if *last == ty => *count += 1,
                _ => runs.push((1, ty)),
            }
        }
        self.body.write_uleb(runs.len() as u64);
        for (count, ty) in runs {
            self.body.write_var_u32(count);
            self.body.write_value_type(ty);
        }
        Ok(())
    }

    fn visit_expression(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(ExpressionEncoder {
            out: &mut self.body,
        })))
    }

    fn visit_end(&mut self) -> VisitResult {
        self.out.write_byte_vec(self.body.as_slice());
        Ok(())
    }
}

/// Writes a data segment as its events arrive.
struct DataEncoder<'a> {
    out: &'a mut ByteWriter,
}

impl DataSegmentVisitor for DataEncoder<'_> {
    fn visit_offset(&mut self) -> VisitResult<Option<Box<dyn ExpressionVisitor + '_>>> {
        Ok(Some(Box::new(ExpressionEncoder {
            out: &mut *self.out,
        })))
    }

    fn visit_bytes(&mut self, bytes: &[u8]) -> VisitResult {
        self.out.write_byte_vec(bytes);
        Ok(())
    }
}

/// Writes instructions straight to its buffer.
///
/// Also usable on its own to encode a stand-alone expression.
#[derive(Debug)]
pub struct ExpressionEncoder<'a> {
    out: &'a mut ByteWriter,
}

impl<'a> ExpressionEncoder<'a> {
    /// Writes instructions to `out`.
    pub fn new(out: &'a mut ByteWriter) -> Self {
        Self { out }
    }

    /// Writes the opcode of `op` after checking it takes immediates shaped
    /// like one of `shapes`.
    fn opcode(&mut self, op: Opcode, shapes: &[Immediate]) -> VisitResult {
        if !shapes.contains(&op.immediate()) {
            return Err(VisitError::new(format!(
                "`{op}` takes {:?} immediates, not {:?}",
                op.immediate(),
                shapes[0]
            )));
        }
        match op.encoding() {
            Encoding::Byte(byte) => self.out.put_byte(byte),
            Encoding::Prefixed(code) => {
                self.out.put_byte(PREFIX_MISC);
                self.out.write_var_u32(code);
            }
        }
        Ok(())
    }
}

impl ExpressionVisitor for ExpressionEncoder<'_> {
    fn visit_instruction(&mut self, op: Opcode) -> VisitResult {
        self.opcode(
            op,
            &[Immediate::None, Immediate::Reserved, Immediate::MemoryCopy],
        )?;
        match op.immediate() {
            Immediate::Reserved => self.out.put_byte(0x00),
            Immediate::MemoryCopy => self.out.put_bytes(&[0x00, 0x00]),
            _ => {}
        }
        Ok(())
    }

    fn visit_block(&mut self, op: Opcode, ty: BlockType) -> VisitResult {
        self.opcode(op, &[Immediate::Block])?;
        match ty {
            BlockType::Empty => self.out.put_byte(BlockType::EMPTY),
            BlockType::Value(ty) => self.out.write_value_type(ty),
            BlockType::FuncType(index) => self.out.write_sleb(index.into()),
        }
        Ok(())
    }

    fn visit_else(&mut self) -> VisitResult {
        self.opcode(Opcode::Else, &[Immediate::None])
    }

    fn visit_end(&mut self) -> VisitResult {
        self.opcode(Opcode::End, &[Immediate::None])
    }

    fn visit_index(&mut self, op: Opcode, index: u32) -> VisitResult {
        self.opcode(op, &[Immediate::Index, Immediate::MemoryInit])?;
        self.out.write_var_u32(index);
        if op.immediate() == Immediate::MemoryInit {
            self.out.put_byte(0x00);
        }
        Ok(())
    }

    fn visit_call_indirect(&mut self, type_index: u32, table_index: u32) -> VisitResult {
        self.opcode(Opcode::CallIndirect, &[Immediate::CallIndirect])?;
        self.out.write_var_u32(type_index);
        self.out.write_var_u32(table_index);
        Ok(())
    }

    fn visit_br_table(&mut self, targets: &[u32], default: u32) -> VisitResult {
        self.opcode(Opcode::BrTable, &[Immediate::BrTable])?;
        self.out.write(targets);
        self.out.write_var_u32(default);
        Ok(())
    }

    fn visit_memory_access(&mut self, op: Opcode, memarg: MemArg) -> VisitResult {
        self.opcode(op, &[Immediate::MemArg])?;
        memarg.to_bytes(self.out);
        Ok(())
    }

    fn visit_i32_const(&mut self, value: i32) -> VisitResult {
        self.opcode(Opcode::I32Const, &[Immediate::I32])?;
        self.out.write_sleb(value.into());
        Ok(())
    }

    fn visit_i64_const(&mut self, value: i64) -> VisitResult {
        self.opcode(Opcode::I64Const, &[Immediate::I64])?;
        self.out.write_sleb(value);
        Ok(())
    }

    fn visit_f32_const(&mut self, value: Ieee32) -> VisitResult {
        self.opcode(Opcode::F32Const, &[Immediate::F32])?;
        self.out.write_f32(value);
        Ok(())
    }

    fn visit_f64_const(&mut self, value: Ieee64) -> VisitResult {
        self.opcode(Opcode::F64Const, &[Immediate::F64])?;
        self.out.write_f64(value);
        Ok(())
    }

    fn visit_ref_null(&mut self, ty: RefType) -> VisitResult {
        self.opcode(Opcode::RefNull, &[Immediate::RefNull])?;
        self.out.write(&ty);
        Ok(())
    }

    fn visit_select_typed(&mut self, types: &[ValueType]) -> VisitResult {
        self.opcode(Opcode::SelectTyped, &[Immediate::SelectTyped])?;
        self.out.write(types);
        Ok(())
    }

    fn visit_table_init(&mut self, table_index: u32, elem_index: u32) -> VisitResult {
        self.opcode(Opcode::TableInit, &[Immediate::TableInit])?;
        // Wire order: element index first.
        self.out.write_var_u32(elem_index);
        self.out.write_var_u32(table_index);
        Ok(())
    }

    fn visit_table_copy(&mut self, dst: u32, src: u32) -> VisitResult {
        self.opcode(Opcode::TableCopy, &[Immediate::TableCopy])?;
        self.out.write_var_u32(dst);
        self.out.write_var_u32(src);
        Ok(())
    }
}
