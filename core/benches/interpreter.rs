//! Benchmarks for the Ember interpreter and heap.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. straight_line: Assignment chains of increasing length
//! 2. heap: Size-class allocate/release churn and reset

use bumpalo::Bump;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ember_core::{
    api::{Engine, EngineOptions},
    mem::Heap,
    opcode::{Instruction, Operand, build::*},
};

/// Generate `n` assignments cycling through every operand kind, then exit.
fn generate_assignment_chain(n: usize) -> Vec<Instruction> {
    let mut program = Vec::with_capacity(n + 2);
    program.push(reg_var_decl(4, 0));
    for i in 0..n {
        let value = match i % 4 {
            0 => Operand::small_int((i % 256) as u8),
            1 => Operand::string(0),
            2 => Operand::number(1),
            _ => Operand::variable(0),
        };
        program.push(assignment((i % 4) as u16, value));
    }
    program.push(exitval(0));
    program
}

fn bench_straight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("straight_line");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let arena = Bump::new();
            let mut engine = Engine::new(&arena, EngineOptions::default()).unwrap();
            let mut serializer = engine.serializer();
            let boundary = serializer.dump_strings(&["s"]).unwrap();
            serializer.dump_nums(&[1.5], boundary, 1).unwrap();
            let pool = serializer.finish();
            let program = generate_assignment_chain(size);

            b.iter(|| engine.execute(black_box(&program), &pool).unwrap());
        });
    }

    group.finish();
}

fn bench_heap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap");
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 64 * 1024).unwrap();

    group.bench_function("allocate_release", |b| {
        b.iter(|| {
            let block = heap.allocate(black_box(100)).unwrap();
            heap.release(block);
        })
    });

    group.bench_function("allocate_reset", |b| {
        b.iter(|| {
            for size in [8, 64, 512, 4096] {
                black_box(heap.allocate(size).unwrap());
            }
            heap.reset();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_straight_line, bench_heap);
criterion_main!(benches);
