//! Benchmarks for the transformation pipeline.
//!
//! Measures the two host-facing costs:
//! - Building the spec registry (one-time, at initialization)
//! - Transforming a class presented by the host (per class load)

#![allow(unused)]
extern crate leakscope;

use criterion::{criterion_group, criterion_main, Criterion};
use leakscope::prelude::*;
use std::hint::black_box;

fn method(name: &str, params: Vec<TypeDesc>, instructions: Vec<Instruction>) -> MethodDef {
    MethodDef::instance(
        MethodSignature::new(name, params, TypeDesc::Void),
        MethodBody {
            instructions,
            regions: vec![],
        },
    )
}

/// A class in the builtin file-resource shape, with a guarded open call in the
/// constructor and a handful of branchy return paths in close().
fn file_stream_class() -> ClassBody {
    let file = TypeDesc::Named(ClassId::new("java/io/File"));
    ClassBody::new(
        ClassId::new("java/io/FileInputStream"),
        vec![
            MethodDef::instance(
                MethodSignature::constructor(vec![file.clone()]),
                MethodBody {
                    instructions: vec![
                        Instruction::CallInternal {
                            name: "open".to_string(),
                            arg_slots: vec![0, 1],
                        },
                        Instruction::Return,
                    ],
                    regions: vec![],
                },
            ),
            method("open", vec![file], vec![Instruction::Return]),
            method(
                "close",
                vec![],
                vec![
                    Instruction::PushLiteral(Literal::Bool(true)),
                    Instruction::BranchIfFalse(Target::Offset(3)),
                    Instruction::Return,
                    Instruction::Nop,
                    Instruction::Return,
                ],
            ),
        ],
    )
}

/// Benchmark registry construction from the builtin spec table.
fn bench_registry_build(c: &mut Criterion) {
    c.bench_function("registry_build_builtin", |b| {
        b.iter(|| {
            let registry = SpecRegistry::build(black_box(builtin_specs())).unwrap();
            black_box(registry)
        });
    });
}

/// Benchmark transforming a registered class (rewrite + verification) and the
/// pass-through cost for an unregistered one.
fn bench_transform_class(c: &mut Criterion) {
    let registry = SpecRegistry::build(builtin_specs()).unwrap();
    let engine = TransformEngine::new(&registry);

    let registered = file_stream_class();
    c.bench_function("transform_registered_class", |b| {
        b.iter(|| {
            let outcome = engine.transform(black_box(&registered)).unwrap();
            black_box(outcome)
        });
    });

    let unregistered = ClassBody::new(
        ClassId::new("com/example/Plain"),
        vec![method("run", vec![], vec![Instruction::Return])],
    );
    c.bench_function("transform_unregistered_class", |b| {
        b.iter(|| {
            let outcome = engine.transform(black_box(&unregistered)).unwrap();
            black_box(outcome)
        });
    });
}

criterion_group!(benches, bench_registry_build, bench_transform_class);
criterion_main!(benches);
