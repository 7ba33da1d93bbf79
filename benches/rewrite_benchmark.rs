use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use estuarylib::engine::objects::{
    BetweenCriteria, CompareOp, Constant, Criteria, Expression, FunctionCall, FunctionKind,
    SetCriteria, SqlType,
};
use estuarylib::engine::test_objects::{element, get_catalog, get_context};
use estuarylib::engine::Rewriter;

/// A wide AND-of-ORs criteria over every rewrite rule family, repeated to
/// the requested width.
fn build_criteria(width: usize, catalog: &estuarylib::engine::test_objects::TestCatalog) -> Criteria {
    let mut parts = vec![];
    for i in 0..width {
        let k = i as i64;
        parts.push(Criteria::or(vec![
            Criteria::compare(
                Expression::Constant(Constant::integer(k)),
                CompareOp::Gt,
                element(&catalog.g1, 0),
            ),
            Criteria::Between(BetweenCriteria {
                expr: element(&catalog.g1, 1),
                negated: false,
                low: Expression::Constant(Constant::integer(k)),
                high: Expression::Constant(Constant::integer(k + 100)),
            }),
            Criteria::SetCriteria(SetCriteria {
                expr: element(&catalog.g1, 2),
                values: vec![
                    Expression::Constant(Constant::text("a")),
                    Expression::Constant(Constant::text("a")),
                    Expression::Constant(Constant::text("b")),
                ],
                negated: false,
            }),
            Criteria::compare(
                Expression::Function(FunctionCall::new(
                    FunctionKind::Multiply,
                    SqlType::Integer,
                    vec![element(&catalog.g1, 1), Expression::Constant(Constant::integer(-5))],
                )),
                CompareOp::Gt,
                Expression::Constant(Constant::integer(10 * k)),
            ),
        ]));
    }
    Criteria::and(parts)
}

fn criteria_rewrite_benchmark(c: &mut Criterion) {
    let _ = simplelog::SimpleLogger::init(simplelog::LevelFilter::Warn, simplelog::Config::default());

    let catalog = get_catalog();
    let context = get_context();

    let mut group = c.benchmark_group("criteria_rewrite");
    for width in [10usize, 100, 500].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, &width| {
            let criteria = build_criteria(width, &catalog);
            b.iter(|| {
                Rewriter::rewrite_criteria(criteria.clone(), &catalog.metadata, &context)
                    .expect("rewrite failed")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criteria_rewrite_benchmark);
criterion_main!(benches);
