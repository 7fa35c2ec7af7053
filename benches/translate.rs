use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use silcast::ast::TreeFactory;
use silcast::config::TranslatorConfig;
use silcast::ir::{ApplySite, Fixity, InstKind, Module, ModuleBuilder, SwitchCase};
use silcast::translate::translate_module;

/// Generate a function with N blocks chained by branches.
/// Each block sums two literals and passes the result to the next block.
fn generate_chain(blocks: usize) -> Module {
    let mut builder = ModuleBuilder::new("chain.swift");
    let plus = builder.declare_operator("Int.+", "+", Fixity::Infix);
    let mut main = builder.function("main");

    let ids: Vec<_> = (0..blocks).map(|_| main.block_with_params(1)).collect();
    for (index, (block, params)) in ids.iter().enumerate() {
        main.switch_to(*block);
        let meta = main.push(InstKind::Metatype {
            type_name: "Int.Type".to_string(),
        });
        let rhs = main.push(InstKind::IntegerLiteral {
            value: index as i128,
        });
        let callee = main.push(InstKind::FunctionRef { function: plus });
        let sum = main.push(InstKind::Apply {
            site: ApplySite {
                callee,
                referenced: Some(plus),
                args: vec![params[0], rhs, meta],
            },
        });
        match ids.get(index + 1) {
            Some((next, _)) => {
                main.push(InstKind::Branch {
                    dest: *next,
                    args: vec![sum],
                });
            }
            None => {
                main.push(InstKind::Return { operand: Some(sum) });
            }
        }
    }
    main.finish();
    builder.build()
}

/// Generate a single block with an N-way integer switch
fn generate_switch(cases: usize) -> Module {
    let mut builder = ModuleBuilder::new("switch.swift");
    let mut main = builder.function("main");
    let entry = main.block();
    let targets: Vec<_> = (0..cases).map(|_| main.block()).collect();
    let fallback = main.block();

    main.switch_to(entry);
    let slot = main.push(InstKind::AllocStack {
        var_name: Some("selector".to_string()),
    });
    let values: Vec<_> = (0..cases)
        .map(|value| {
            main.push(InstKind::IntegerLiteral {
                value: value as i128,
            })
        })
        .collect();
    main.push(InstKind::SwitchValue {
        operand: slot,
        cases: values
            .iter()
            .zip(&targets)
            .map(|(&value, &dest)| SwitchCase { value, dest })
            .collect(),
        default: Some(fallback),
    });
    for &target in targets.iter().chain(std::iter::once(&fallback)) {
        main.switch_to(target);
        main.push(InstKind::Return { operand: None });
    }
    main.finish();
    builder.build()
}

fn bench_block_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_chain");
    let config = TranslatorConfig::default();

    for block_count in [10, 100, 1000].iter() {
        let module = generate_chain(*block_count);
        group.bench_with_input(
            BenchmarkId::new("translate", block_count),
            block_count,
            |b, _| {
                b.iter(|| {
                    let mut tree = TreeFactory::new();
                    let output = translate_module(black_box(&module), &mut tree, &config);
                    black_box(output)
                });
            },
        );
    }

    group.finish();
}

fn bench_switch_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("switch_width");
    let config = TranslatorConfig::default();

    for case_count in [4, 64, 512].iter() {
        let module = generate_switch(*case_count);
        group.bench_with_input(
            BenchmarkId::new("translate", case_count),
            case_count,
            |b, _| {
                b.iter(|| {
                    let mut tree = TreeFactory::new();
                    let output = translate_module(black_box(&module), &mut tree, &config);
                    black_box(output)
                });
            },
        );
    }

    group.finish();
}

fn bench_json_load(c: &mut Criterion) {
    let json = generate_chain(500)
        .to_json()
        .expect("Failed to encode module");

    c.bench_function("json_load_500_blocks", |b| {
        b.iter(|| black_box(Module::from_json(black_box(&json))));
    });
}

criterion_group!(
    benches,
    bench_block_chain,
    bench_switch_width,
    bench_json_load
);
criterion_main!(benches);
