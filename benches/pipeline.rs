#![allow(unused)]
extern crate hirgen;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use hirgen::prelude::*;
use std::hint::black_box;

/// Builds a function with `count` sequential counting loops.
///
/// `let i = 0; while (i < 10) { i = i + 1; }` repeated, then `return i;`. Every loop
/// header needs a phi, so this exercises incomplete phi sealing and elimination.
fn loops(count: usize) -> CompilationUnit {
    let mut env = Environment::new();
    let mut b = HirBuilder::new(&mut env);
    let mut current = b.entry();
    b.name("loops");

    let zero = b
        .temp(
            current,
            InstructionValue::Primitive {
                value: Primitive::Number(0.0),
            },
        )
        .unwrap();
    b.store(
        current,
        InstructionKind::Let,
        "i",
        InstructionValue::LoadLocal { place: zero },
    )
    .unwrap();

    for _ in 0..count {
        let test = b.reserve();
        let body = b.reserve();
        let exit = b.reserve();
        b.terminate(
            current,
            Terminal::While {
                test,
                loop_block: body,
                fallthrough: exit,
            },
        )
        .unwrap();

        let i = b.read("i");
        let ten = b
            .temp(
                test,
                InstructionValue::Primitive {
                    value: Primitive::Number(10.0),
                },
            )
            .unwrap();
        let cond = b
            .temp(
                test,
                InstructionValue::Binary {
                    left: i.clone(),
                    operator: BinaryOperator::Lt,
                    right: ten,
                },
            )
            .unwrap();
        b.terminate(
            test,
            Terminal::Branch {
                test: cond,
                consequent: body,
                alternate: exit,
            },
        )
        .unwrap();

        let one = b
            .temp(
                body,
                InstructionValue::Primitive {
                    value: Primitive::Number(1.0),
                },
            )
            .unwrap();
        let next = b
            .temp(
                body,
                InstructionValue::Binary {
                    left: i,
                    operator: BinaryOperator::Add,
                    right: one,
                },
            )
            .unwrap();
        b.store(
            body,
            InstructionKind::Reassign,
            "i",
            InstructionValue::LoadLocal { place: next },
        )
        .unwrap();
        b.terminate(
            body,
            Terminal::Goto {
                block: test,
                variant: GotoVariant::Continue,
            },
        )
        .unwrap();
        current = exit;
    }

    let i = b.read("i");
    b.terminate(current, Terminal::Return { value: Some(i) })
        .unwrap();
    let function = b.build().unwrap();
    CompilationUnit::new(function, env)
}

fn bench_compile(c: &mut Criterion) {
    let config = PipelineConfig::default();

    let mut group = c.benchmark_group("compile");
    for count in [1usize, 16, 128] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("loops_{count}"), |b| {
            b.iter_batched(
                || loops(count),
                |unit| black_box(compile(unit, &config).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_compile_batch(c: &mut Criterion) {
    let config = PipelineConfig::production();

    let mut group = c.benchmark_group("compile_batch");
    group.throughput(Throughput::Elements(64));
    group.bench_function("64_units", |b| {
        b.iter_batched(
            || (0..64).map(|_| loops(16)).collect::<Vec<_>>(),
            |units| black_box(compile_batch(units, &config)),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_compile, bench_compile_batch);
criterion_main!(benches);
