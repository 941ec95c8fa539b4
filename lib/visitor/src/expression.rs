use wasmcodec_types::{BlockType, Ieee32, Ieee64, MemArg, Opcode, RefType, ValueType, VisitResult};

/// Receives the instructions of one expression: a function body, a
/// global initializer, or a segment offset or item.
///
/// Each instruction arrives through the method matching the shape of its
/// immediates (see [`Opcode::immediate`]). Instructions whose immediates
/// are only reserved zero bytes, such as `memory.size`, arrive through
/// [`visit_instruction`](Self::visit_instruction). The expression is
/// complete after the `end` that closes the outermost level.
pub trait ExpressionVisitor {
    /// The next stage, if any.
    fn delegate(&mut self) -> Option<&mut dyn ExpressionVisitor> {
        None
    }

    /// An instruction without immediates.
    fn visit_instruction(&mut self, op: Opcode) -> VisitResult {
        forward!(self.visit_instruction(op))
    }

    /// `block`, `loop` or `if`.
    fn visit_block(&mut self, op: Opcode, ty: BlockType) -> VisitResult {
        forward!(self.visit_block(op, ty))
    }

    /// `else`.
    fn visit_else(&mut self) -> VisitResult {
        forward!(self.visit_else())
    }

    /// `end`, closing a block or the whole expression.
    fn visit_end(&mut self) -> VisitResult {
        forward!(self.visit_end())
    }

    /// An instruction with a single index immediate, e.g. `call` or `local.get`.
    fn visit_index(&mut self, op: Opcode, index: u32) -> VisitResult {
        forward!(self.visit_index(op, index))
    }

    /// `call_indirect`.
    fn visit_call_indirect(&mut self, type_index: u32, table_index: u32) -> VisitResult {
        forward!(self.visit_call_indirect(type_index, table_index))
    }

    /// `br_table`.
    fn visit_br_table(&mut self, targets: &[u32], default: u32) -> VisitResult {
        forward!(self.visit_br_table(targets, default))
    }

    /// A load or store.
    fn visit_memory_access(&mut self, op: Opcode, memarg: MemArg) -> VisitResult {
        forward!(self.visit_memory_access(op, memarg))
    }

    /// `i32.const`.
    fn visit_i32_const(&mut self, value: i32) -> VisitResult {
        forward!(self.visit_i32_const(value))
    }

    /// `i64.const`.
    fn visit_i64_const(&mut self, value: i64) -> VisitResult {
        forward!(self.visit_i64_const(value))
    }

    /// `f32.const`.
    fn visit_f32_const(&mut self, value: Ieee32) -> VisitResult {
        forward!(self.visit_f32_const(value))
    }

    /// `f64.const`.
    fn visit_f64_const(&mut self, value: Ieee64) -> VisitResult {
        forward!(self.visit_f64_const(value))
    }

    /// `ref.null`.
    fn visit_ref_null(&mut self, ty: RefType) -> VisitResult {
        forward!(self.visit_ref_null(ty))
    }

    /// `select` with explicit result types.
    fn visit_select_typed(&mut self, types: &[ValueType]) -> VisitResult {
        forward!(self.visit_select_typed(types))
    }

    /// `table.init`, copying from element segment `elem_index` into `table_index`.
    fn visit_table_init(&mut self, table_index: u32, elem_index: u32) -> VisitResult {
        forward!(self.visit_table_init(table_index, elem_index))
    }

    /// `table.copy`, from table `src` into table `dst`.
    fn visit_table_copy(&mut self, dst: u32, src: u32) -> VisitResult {
        forward!(self.visit_table_copy(dst, src))
    }
}
