//! One decoding function per section kind.
//!
//! Each function receives the section's bounded reader. When the visitor
//! opens the section, every entry is decoded and emitted, the bound must
//! then be exhausted exactly. When it does not, the payload is skipped
//! unread.

use super::expression::decode_expression;
use super::{Context, VisitResultExt};
use crate::{Bounded, ByteReader};
use std::io::Read;
use wasmcodec_types::{
    BinaryError, BinaryResult, DataMode, ElementMode, ErrorKind, ExternalKind, FuncType,
    GlobalType, MemoryType, Mutability, RefType, TableType, VisitResult,
};
use wasmcodec_visitor::{
    DataSegmentVisitor, Discard, ElementSegmentVisitor, ExpressionVisitor, FunctionBodyVisitor,
    ModuleVisitor,
};

/// Bit 0 of the element segment flags: passive or declarative.
const ELEM_NOT_ACTIVE: u32 = 0b001;
/// Bit 1: explicit table index when active, declarative otherwise.
const ELEM_EXPLICIT_OR_DECLARATIVE: u32 = 0b010;
/// Bit 2: items are expressions rather than function indices.
const ELEM_EXPRESSIONS: u32 = 0b100;

fn unknown(what: &'static str, tag: u32, offset: usize) -> BinaryError {
    BinaryError::new(ErrorKind::UnknownTag { what, tag }, offset)
}

/// Skips an uninteresting section.
fn skip<R: Read>(section: Bounded<'_, R>) -> BinaryResult<()> {
    let offset = section.offset();
    let skipped = section.skip_remaining()?;
    tracing::trace!(offset, skipped, "section skipped");
    Ok(())
}

/// Checks the section was consumed exactly, then emits its end event.
fn finish<R: Read>(
    section: Bounded<'_, R>,
    visit_end: impl FnOnce() -> VisitResult,
) -> BinaryResult<()> {
    let end = section.offset();
    section.expect_exhausted()?;
    visit_end().at(end)
}

/// Decodes an expression into `visitor`, or walks it without events.
fn expression<R: Read>(
    reader: &mut ByteReader<R>,
    cx: &mut Context<'_>,
    visitor: Option<Box<dyn ExpressionVisitor + '_>>,
) -> BinaryResult<()> {
    let count = match visitor {
        Some(mut visitor) => decode_expression(reader, &mut *visitor, cx.config)?,
        None => {
            tracing::trace!(offset = reader.offset(), "expression walked without events");
            decode_expression(reader, &mut Discard, cx.config)?
        }
    };
    cx.stats.instructions += count;
    Ok(())
}

fn read_table_type<R: Read>(reader: &mut ByteReader<R>) -> BinaryResult<TableType> {
    let element = reader.read_ref_type()?;
    let limits = reader.read_limits()?;
    Ok(TableType { element, limits })
}

fn read_global_type<R: Read>(reader: &mut ByteReader<R>) -> BinaryResult<GlobalType> {
    let ty = reader.read_value_type()?;
    let start = reader.offset();
    let mutability = match reader.expect_byte()? {
        0 => Mutability::Const,
        1 => Mutability::Var,
        byte => return Err(unknown("mutability", byte.into(), start)),
    };
    Ok(GlobalType::new(ty, mutability))
}

pub(super) fn decode_custom_section<R: Read>(
    mut section: Bounded<'_, R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let start = section.offset();
    let name = section.read_name()?;
    let len = section.remaining().unwrap_or_default();
    let payload = section.read_bytes(len)?;
    cx.stats.custom_sections += 1;
    visitor.visit_custom_section(&name, &payload).at(start)?;
    section.expect_exhausted()
}

pub(super) fn decode_type_section<R: Read>(
    mut section: Bounded<'_, R>,
    _cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut types) = visitor.visit_type_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let form = section.expect_byte()?;
        if form != FuncType::FORM {
            return Err(unknown("type form", form.into(), start));
        }
        let params = section.read_value_types()?;
        let results = section.read_value_types()?;
        types.visit_func_type(&params, &results).at(start)?;
    }
    finish(section, || types.visit_end())
}

pub(super) fn decode_import_section<R: Read>(
    mut section: Bounded<'_, R>,
    _cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut imports) = visitor.visit_import_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let module = section.read_name()?;
        let field = section.read_name()?;
        let kind_offset = section.offset();
        let kind = section.expect_byte()?;
        let visited = match ExternalKind::from_byte(kind) {
            Some(ExternalKind::Function) => {
                let type_index = section.read_var_u32()?;
                imports.visit_function_import(&module, &field, type_index)
            }
            Some(ExternalKind::Table) => {
                let ty = read_table_type(&mut section)?;
                imports.visit_table_import(&module, &field, ty)
            }
            Some(ExternalKind::Memory) => {
                let limits = section.read_limits()?;
                imports.visit_memory_import(&module, &field, MemoryType { limits })
            }
            Some(ExternalKind::Global) => {
                let ty = read_global_type(&mut section)?;
                imports.visit_global_import(&module, &field, ty)
            }
            None => return Err(unknown("import kind", kind.into(), kind_offset)),
        };
        visited.at(start)?;
    }
    finish(section, || imports.visit_end())
}

pub(super) fn decode_function_section<R: Read>(
    mut section: Bounded<'_, R>,
    _cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut functions) = visitor.visit_function_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let type_index = section.read_var_u32()?;
        functions.visit_function(type_index).at(start)?;
    }
    finish(section, || functions.visit_end())
}

pub(super) fn decode_table_section<R: Read>(
    mut section: Bounded<'_, R>,
    _cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut tables) = visitor.visit_table_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let ty = read_table_type(&mut section)?;
        tables.visit_table(ty).at(start)?;
    }
    finish(section, || tables.visit_end())
}

pub(super) fn decode_memory_section<R: Read>(
    mut section: Bounded<'_, R>,
    _cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut memories) = visitor.visit_memory_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let limits = section.read_limits()?;
        memories.visit_memory(MemoryType { limits }).at(start)?;
    }
    finish(section, || memories.visit_end())
}

pub(super) fn decode_global_section<R: Read>(
    mut section: Bounded<'_, R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut globals) = visitor.visit_global_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let ty = read_global_type(&mut section)?;
        let init = globals.visit_global(ty).at(start)?;
        expression(&mut section, cx, init)?;
    }
    finish(section, || globals.visit_end())
}

pub(super) fn decode_export_section<R: Read>(
    mut section: Bounded<'_, R>,
    _cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut exports) = visitor.visit_export_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let name = section.read_name()?;
        let kind_offset = section.offset();
        let kind = section.expect_byte()?;
        let kind = ExternalKind::from_byte(kind)
            .ok_or_else(|| unknown("export kind", kind.into(), kind_offset))?;
        let index = section.read_var_u32()?;
        exports.visit_export(&name, kind, index).at(start)?;
    }
    finish(section, || exports.visit_end())
}

pub(super) fn decode_start_section<R: Read>(
    mut section: Bounded<'_, R>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let start = section.offset();
    let function_index = section.read_var_u32()?;
    visitor.visit_start_section(function_index).at(start)?;
    section.expect_exhausted()
}

pub(super) fn decode_data_count_section<R: Read>(
    mut section: Bounded<'_, R>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let start = section.offset();
    let count = section.read_var_u32()?;
    visitor.visit_data_count_section(count).at(start)?;
    section.expect_exhausted()
}

pub(super) fn decode_element_section<R: Read>(
    mut section: Bounded<'_, R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut elements) = visitor.visit_element_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let flags = section.read_var_u32()?;
        if flags > 0b111 {
            return Err(unknown("element segment flags", flags, start));
        }
        let mode = match (
            flags & ELEM_NOT_ACTIVE != 0,
            flags & ELEM_EXPLICIT_OR_DECLARATIVE != 0,
        ) {
            (false, false) => ElementMode::Active { table_index: 0 },
            (false, true) => ElementMode::Active {
                table_index: section.read_var_u32()?,
            },
            (true, false) => ElementMode::Passive,
            (true, true) => ElementMode::Declarative,
        };
        let mut segment: Box<dyn ElementSegmentVisitor + '_> =
            match elements.visit_element(mode).at(start)? {
                Some(segment) => segment,
                None => {
                    tracing::trace!(offset = start, "element segment walked without events");
                    Box::new(Discard)
                }
            };
        decode_element_segment(&mut section, cx, flags, &mut *segment)?;
    }
    finish(section, || elements.visit_end())
}

fn decode_element_segment<R: Read>(
    reader: &mut ByteReader<R>,
    cx: &mut Context<'_>,
    flags: u32,
    segment: &mut dyn ElementSegmentVisitor,
) -> BinaryResult<()> {
    if flags & ELEM_NOT_ACTIVE == 0 {
        let offset = segment.visit_offset().at(reader.offset())?;
        expression(reader, cx, offset)?;
    }

    let start = reader.offset();
    let ty = if flags & 0b011 == 0 {
        RefType::FuncRef
    } else if flags & ELEM_EXPRESSIONS == 0 {
        match reader.expect_byte()? {
            0x00 => RefType::FuncRef,
            kind => return Err(unknown("element kind", kind.into(), start)),
        }
    } else {
        reader.read_ref_type()?
    };
    segment.visit_ref_type(ty).at(start)?;

    for _ in 0..reader.read_var_u32()? {
        let start = reader.offset();
        if flags & ELEM_EXPRESSIONS == 0 {
            let function_index = reader.read_var_u32()?;
            segment.visit_function_index(function_index).at(start)?;
        } else {
            let item = segment.visit_item().at(start)?;
            expression(reader, cx, item)?;
        }
    }
    segment.visit_end().at(reader.offset())
}

pub(super) fn decode_code_section<R: Read>(
    mut section: Bounded<'_, R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut code) = visitor.visit_code_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let size = section.read_var_u32()? as usize;
        let start = section.offset();
        let body = section.bounded(size)?;
        cx.stats.function_bodies += 1;
        match code.visit_function_body().at(start)? {
            Some(mut visitor) => decode_function_body(body, cx, &mut *visitor)?,
            None => {
                let skipped = body.skip_remaining()?;
                tracing::trace!(offset = start, skipped, "function body skipped");
            }
        }
    }
    finish(section, || code.visit_end())
}

fn decode_function_body<R: Read>(
    mut body: Bounded<'_, R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn FunctionBodyVisitor,
) -> BinaryResult<()> {
    let start = body.offset();
    let mut locals = Vec::new();
    for _ in 0..body.read_var_u32()? {
        let count = body.read_var_u32()? as usize;
        let ty = body.read_value_type()?;
        if count > cx.config.max_locals - locals.len() {
            return Err(body.error(ErrorKind::ImplementationLimit {
                what: "locals",
                limit: cx.config.max_locals,
            }));
        }
        locals.resize(locals.len() + count, ty);
    }
    visitor.visit_locals(&locals).at(start)?;

    let code_start = body.offset();
    let decoded = match visitor.visit_expression().at(code_start)? {
        Some(mut expr) => {
            cx.stats.instructions += decode_expression(&mut body, &mut *expr, cx.config)?;
            true
        }
        None => false,
    };
    if !decoded {
        let skipped = body.skip_remaining()?;
        tracing::trace!(offset = code_start, skipped, "function code skipped");
        return visitor.visit_end().at(code_start + skipped as usize);
    }
    finish(body, || visitor.visit_end())
}

pub(super) fn decode_data_section<R: Read>(
    mut section: Bounded<'_, R>,
    cx: &mut Context<'_>,
    visitor: &mut dyn ModuleVisitor,
) -> BinaryResult<()> {
    let Some(mut data) = visitor.visit_data_section().at(section.offset())? else {
        return skip(section);
    };
    for _ in 0..section.read_var_u32()? {
        let start = section.offset();
        let mode = match section.read_var_u32()? {
            0 => DataMode::Active { memory_index: 0 },
            1 => DataMode::Passive,
            2 => DataMode::Active {
                memory_index: section.read_var_u32()?,
            },
            flags => return Err(unknown("data segment flags", flags, start)),
        };
        match data.visit_data(mode).at(start)? {
            Some(mut segment) => decode_data_segment(&mut section, cx, mode, &mut *segment)?,
            None => {
                if let DataMode::Active { .. } = mode {
                    expression(&mut section, cx, None)?;
                }
                let len = section.read_var_u32()? as usize;
                let skipped = section.bounded(len)?.skip_remaining()?;
                tracing::trace!(offset = start, skipped, "data segment skipped");
            }
        }
    }
    finish(section, || data.visit_end())
}

fn decode_data_segment<R: Read>(
    reader: &mut ByteReader<R>,
    cx: &mut Context<'_>,
    mode: DataMode,
    segment: &mut dyn DataSegmentVisitor,
) -> BinaryResult<()> {
    if let DataMode::Active { .. } = mode {
        let offset = segment.visit_offset().at(reader.offset())?;
        expression(reader, cx, offset)?;
    }
    let start = reader.offset();
    let bytes = reader.read_byte_vec()?;
    segment.visit_bytes(&bytes).at(start)?;
    segment.visit_end().at(reader.offset())
}
