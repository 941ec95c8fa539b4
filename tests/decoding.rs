//! Decoder behavior on hand-assembled modules: errors and their offsets,
//! skipping, and pipelines of several stages.

use pretty_assertions::assert_eq;
use wasmcodec::binary::DecodeStats;
use wasmcodec::types::{BinaryError, DecoderConfig, ErrorKind, SectionId, VisitError, VisitResult};
use wasmcodec::visitor::{
    CodeSectionVisitor, CustomSectionFilter, Discard, ElementSectionVisitor, FunctionBodyVisitor,
    ModuleVisitor, Printer, TypeSectionVisitor,
};

const HEADER: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

/// `(type (func))`
const TYPE_SECTION: [u8; 6] = [0x01, 0x04, 0x01, 0x60, 0x00, 0x00];

fn module(sections: &[&[u8]]) -> Vec<u8> {
    let mut bytes = HEADER.to_vec();
    for section in sections {
        bytes.extend_from_slice(section);
    }
    bytes
}

#[test]
fn sections_out_of_order() {
    let bytes = module(&[&[0x05, 0x03, 0x01, 0x00, 0x01], &[0x01, 0x01, 0x00]]);
    assert_eq!(
        wasmcodec::check(&bytes),
        Err(BinaryError::new(
            ErrorKind::SectionOutOfOrder {
                id: SectionId::Type,
                previous: SectionId::Memory,
            },
            13
        ))
    );

    let bytes = module(&[&[0x05, 0x03, 0x01, 0x00, 0x01], &[0x04, 0x04, 0x01, 0x70, 0x00, 0x01]]);
    assert_eq!(
        wasmcodec::check(&bytes),
        Err(BinaryError::new(
            ErrorKind::SectionOutOfOrder {
                id: SectionId::Table,
                previous: SectionId::Memory,
            },
            13
        ))
    );
}

#[test]
fn custom_sections_anywhere() {
    let bytes = module(&[
        &[0x00, 0x02, 0x01, b'a'],
        &[0x00, 0x02, 0x01, b'b'],
        &TYPE_SECTION,
        &[0x03, 0x02, 0x01, 0x00],
        &[0x0A, 0x04, 0x01, 0x02, 0x00, 0x0B],
        &[0x00, 0x02, 0x01, b'c'],
    ]);
    let stats = wasmcodec::check(&bytes).unwrap();
    assert_eq!((stats.sections, stats.custom_sections), (3, 3));

    let dump = wasmcodec::print(&bytes).unwrap();
    let at = |line: &str| dump.find(line).unwrap();
    assert!(at("custom \"a\"") < at("custom \"b\""), "{dump}");
    assert!(at("custom \"b\"") < at("type section"), "{dump}");
    assert!(at("code section") < at("custom \"c\""), "{dump}");

    assert_eq!(wasmcodec::reencode(&bytes).unwrap(), bytes);
}

#[test]
fn function_body_bound_left_unconsumed() {
    let bytes = module(&[
        &TYPE_SECTION,
        &[0x03, 0x02, 0x01, 0x00],
        // one body declaring 4 bytes: no locals, nop, end, then a stray byte
        &[0x0A, 0x06, 0x01, 0x04, 0x00, 0x01, 0x0B, 0x00],
    ]);
    assert_eq!(
        wasmcodec::check(&bytes),
        Err(BinaryError::new(
            ErrorKind::SectionLengthMismatch {
                declared: 4,
                consumed: 3,
            },
            25
        ))
    );
}

#[test]
fn function_body_bound_overrun() {
    let bytes = module(&[
        &TYPE_SECTION,
        &[0x03, 0x02, 0x01, 0x00],
        // one body declaring 2 bytes but needing 3
        &[0x0A, 0x05, 0x01, 0x02, 0x00, 0x01, 0x0B],
    ]);
    assert_eq!(
        wasmcodec::check(&bytes),
        Err(BinaryError::new(
            ErrorKind::SectionLengthMismatch {
                declared: 2,
                consumed: 3,
            },
            24
        ))
    );
}

#[test_log::test]
fn deeply_nested_blocks() {
    let text = format!(
        "(module (func {} {}))",
        "block ".repeat(100),
        "end ".repeat(100)
    );
    let bytes = wat::parse_str(text).unwrap();
    let stats = wasmcodec::check(&bytes).unwrap();
    assert_eq!(stats.function_bodies, 1);
    assert_eq!(stats.instructions, 201);
    assert_eq!(wasmcodec::reencode(&bytes).unwrap(), bytes);
}

#[test]
fn else_outside_of_if() {
    let bytes = module(&[
        &TYPE_SECTION,
        &[0x03, 0x02, 0x01, 0x00],
        &[0x0A, 0x05, 0x01, 0x03, 0x00, 0x05, 0x0B],
    ]);
    assert!(wasmcodec::check(&bytes).is_ok());

    let mut config = DecoderConfig::default();
    config.strict_nesting(true);
    assert_eq!(
        wasmcodec::decode_with_config(&bytes, &mut Discard, config),
        Err(BinaryError::new(
            ErrorKind::MalformedNesting("`else` outside of `if`"),
            23
        ))
    );
}

#[test]
fn too_many_locals() {
    // one body declaring ten i32 locals
    let bytes = module(&[&[0x0A, 0x06, 0x01, 0x04, 0x01, 0x0A, 0x7F, 0x0B]]);
    assert!(wasmcodec::check(&bytes).is_ok());

    let mut config = DecoderConfig::default();
    config.max_locals(5);
    assert_eq!(
        wasmcodec::decode_with_config(&bytes, &mut Discard, config),
        Err(BinaryError::new(
            ErrorKind::ImplementationLimit {
                what: "locals",
                limit: 5,
            },
            15
        ))
    );
}

/// What a [`Skipping`] stage declines to look at.
#[derive(Clone, Copy)]
enum Skip {
    CodeSection,
    FunctionBodies,
    Expressions,
}

/// Takes every event except part of the code section.
struct Skipping {
    skip: Skip,
    rest: Discard,
}

impl ModuleVisitor for Skipping {
    fn delegate(&mut self) -> Option<&mut dyn ModuleVisitor> {
        Some(&mut self.rest)
    }

    fn visit_code_section(&mut self) -> VisitResult<Option<Box<dyn CodeSectionVisitor + '_>>> {
        Ok(match self.skip {
            Skip::CodeSection => None,
            Skip::FunctionBodies => Some(Box::new(NoBodies)),
            Skip::Expressions => Some(Box::new(LocalsOnly)),
        })
    }
}

struct NoBodies;

impl CodeSectionVisitor for NoBodies {}

struct LocalsOnly;

impl CodeSectionVisitor for LocalsOnly {
    fn visit_function_body(&mut self) -> VisitResult<Option<Box<dyn FunctionBodyVisitor + '_>>> {
        Ok(Some(Box::new(NoCode)))
    }
}

struct NoCode;

impl FunctionBodyVisitor for NoCode {}

fn two_bodies() -> Vec<u8> {
    module(&[
        &TYPE_SECTION,
        &[0x03, 0x03, 0x02, 0x00, 0x00],
        &[
            0x0A, 0x0B, 0x02, // code section, two bodies
            0x05, 0x00, 0x41, 0x01, 0x1A, 0x0B, // i32.const 1, drop, end
            0x03, 0x00, 0x01, 0x0B, // nop, end
        ],
    ])
}

fn stats_skipping(skip: Skip) -> DecodeStats {
    let mut visitor = Skipping {
        skip,
        rest: Discard,
    };
    wasmcodec::decode(&two_bodies(), &mut visitor).unwrap()
}

#[test_log::test]
fn skipping_code() {
    assert_eq!(
        wasmcodec::check(&two_bodies()).unwrap(),
        DecodeStats {
            sections: 3,
            custom_sections: 0,
            function_bodies: 2,
            instructions: 5,
            skipped_bytes: 0,
        }
    );

    let stats = stats_skipping(Skip::CodeSection);
    assert_eq!((stats.function_bodies, stats.instructions), (0, 0));
    assert_eq!(stats.skipped_bytes, 11);

    let stats = stats_skipping(Skip::FunctionBodies);
    assert_eq!((stats.function_bodies, stats.instructions), (2, 0));
    assert_eq!(stats.skipped_bytes, 8);

    let stats = stats_skipping(Skip::Expressions);
    assert_eq!((stats.function_bodies, stats.instructions), (2, 0));
    assert_eq!(stats.skipped_bytes, 6);
}

/// Opens the element section but none of its segments.
struct ElementsClosed;

impl ModuleVisitor for ElementsClosed {
    fn visit_element_section(
        &mut self,
    ) -> VisitResult<Option<Box<dyn ElementSectionVisitor + '_>>> {
        Ok(Some(Box::new(NoSegments)))
    }
}

struct NoSegments;

impl ElementSectionVisitor for NoSegments {}

#[test]
fn unprefixed_segments_are_walked() {
    // (elem (i32.const 0) 0)
    let bytes = module(&[&[0x09, 0x07, 0x01, 0x00, 0x41, 0x00, 0x0B, 0x01, 0x00]]);
    let stats = wasmcodec::decode(&bytes, &mut ElementsClosed).unwrap();
    assert_eq!(stats.instructions, 2);
    assert_eq!(stats.skipped_bytes, 0);

    // A truncated offset expression is still an error.
    let truncated = module(&[&[0x09, 0x06, 0x01, 0x00, 0x41, 0x00, 0x01, 0x00]]);
    assert!(wasmcodec::decode(&truncated, &mut ElementsClosed).is_err());
}

/// Counts type sections on their way to the next stage.
struct CountTypes<'a> {
    next: &'a mut dyn ModuleVisitor,
    seen: usize,
}

impl ModuleVisitor for CountTypes<'_> {
    fn delegate(&mut self) -> Option<&mut dyn ModuleVisitor> {
        Some(&mut *self.next)
    }

    fn visit_type_section(&mut self) -> VisitResult<Option<Box<dyn TypeSectionVisitor + '_>>> {
        self.seen += 1;
        self.next.visit_type_section()
    }
}

#[test]
fn delegation_is_transparent() {
    let bytes = two_bodies();
    let mut printer = Printer::new();
    let mut counter = CountTypes {
        next: &mut printer,
        seen: 0,
    };
    wasmcodec::decode(&bytes, &mut counter).unwrap();
    assert_eq!(counter.seen, 1);
    assert_eq!(printer.into_string(), wasmcodec::print(&bytes).unwrap());
}

#[test]
fn filter_in_a_pipeline() {
    let bytes = module(&[
        &[0x00, 0x03, 0x01, b'a', 0xFF],
        &[0x08, 0x01, 0x00],
        &[0x00, 0x02, 0x01, b'b'],
    ]);
    let mut printer = Printer::new();
    let mut filter = CustomSectionFilter::new(&mut printer, |name| name == "b");
    let stats = wasmcodec::decode(&bytes, &mut filter).unwrap();
    assert_eq!(filter.dropped(), 1);
    assert_eq!(stats.custom_sections, 2);
    assert_eq!(
        printer.into_string(),
        "module version=1\nstart 0\ncustom \"b\" (0 bytes)\nend module\n"
    );
}

/// Refuses modules carrying custom sections.
struct NoCustomSections;

impl ModuleVisitor for NoCustomSections {
    fn visit_custom_section(&mut self, name: &str, _: &[u8]) -> VisitResult {
        Err(VisitError::new(format!("custom section {name:?}")))
    }
}

#[test]
fn stage_rejection_stops_decoding() {
    let bytes = module(&[&[0x08, 0x01, 0x00], &[0x00, 0x03, 0x01, b'a', 0xFF]]);
    assert_eq!(
        wasmcodec::decode(&bytes, &mut NoCustomSections),
        Err(BinaryError::new(
            ErrorKind::Rejected("custom section \"a\"".to_string()),
            13
        ))
    );
}
