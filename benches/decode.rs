use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wasmcodec::binary::Decoder;
use wasmcodec::types::VisitResult;
use wasmcodec::visitor::{CodeSectionVisitor, Discard, ModuleVisitor};

/// A module with `functions` copies of a small loop.
fn generate(functions: usize) -> Vec<u8> {
    let func = r#"
  (func (param i32) (result i32) (local i32 i64)
    loop $l
      local.get 0
      i32.const 1
      i32.sub
      local.tee 0
      i64.extend_i32_u
      local.set 2
      local.get 0
      br_if $l
    end
    local.get 1
    i32.load offset=4
    local.get 0
    i32.add)"#;
    let text = format!("(module (memory 1){})", func.repeat(functions));
    wat::parse_str(text).expect("benchmark module is valid")
}

/// Decodes everything but the code section.
struct SkipCode(Discard);

impl ModuleVisitor for SkipCode {
    fn delegate(&mut self) -> Option<&mut dyn ModuleVisitor> {
        Some(&mut self.0)
    }

    fn visit_code_section(&mut self) -> VisitResult<Option<Box<dyn CodeSectionVisitor + '_>>> {
        Ok(None)
    }
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for functions in [10, 1000] {
        let module = generate(functions);
        group.throughput(Throughput::Bytes(module.len() as u64));

        group.bench_with_input(BenchmarkId::new("full", functions), &module, |b, module| {
            b.iter(|| {
                Decoder::new(black_box(&module[..]))
                    .decode(&mut Discard)
                    .unwrap()
            })
        });
        group.bench_with_input(
            BenchmarkId::new("skip_code", functions),
            &module,
            |b, module| {
                b.iter(|| {
                    Decoder::new(black_box(&module[..]))
                        .decode(&mut SkipCode(Discard))
                        .unwrap()
                })
            },
        );
        group.bench_with_input(BenchmarkId::new("reencode", functions), &module, |b, module| {
            b.iter(|| wasmcodec::reencode(black_box(module)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, decode);
criterion_main!(benches);
