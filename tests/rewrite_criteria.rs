use estuarylib::engine::objects::{
    BetweenCriteria, CompareOp, Constant, Criteria, Expression, FunctionCall, FunctionKind,
    MatchCriteria, SetCriteria, SqlType,
};
use estuarylib::engine::test_objects::{element, get_catalog, get_context};
use estuarylib::engine::Rewriter;

fn int(i: i64) -> Expression {
    Expression::Constant(Constant::integer(i))
}

fn text(t: &str) -> Expression {
    Expression::Constant(Constant::text(t))
}

#[test]
fn criteria_golden_outputs() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    let cases: Vec<(Criteria, &str)> = vec![
        (
            Criteria::and(vec![
                Criteria::compare(element(&catalog.g1, 0), CompareOp::Eq, int(1)),
                Criteria::compare(int(1), CompareOp::Eq, int(0)),
            ]),
            "1 = 0",
        ),
        (
            Criteria::SetCriteria(SetCriteria {
                expr: element(&catalog.g1, 2),
                values: vec![text("1"), text("1"), text("2")],
                negated: false,
            }),
            "e3 IN ('1', '2')",
        ),
        (
            Criteria::SetCriteria(SetCriteria {
                expr: element(&catalog.g1, 2),
                values: vec![text("1")],
                negated: false,
            }),
            "e3 = '1'",
        ),
        (
            Criteria::SetCriteria(SetCriteria {
                expr: element(&catalog.g1, 2),
                values: vec![],
                negated: false,
            }),
            "1 = 0",
        ),
        (
            Criteria::compare(text("x"), CompareOp::Gt, element(&catalog.g1, 2)),
            "e3 < 'x'",
        ),
        (
            Criteria::compare(
                Expression::Function(FunctionCall::new(
                    FunctionKind::Multiply,
                    SqlType::Integer,
                    vec![element(&catalog.g1, 1), int(-5)],
                )),
                CompareOp::Gt,
                int(10),
            ),
            "e2 < -2",
        ),
        (
            Criteria::Between(BetweenCriteria {
                expr: element(&catalog.g1, 0),
                negated: false,
                low: int(1000),
                high: int(2000),
            }),
            "(e1 >= 1000) AND (e1 <= 2000)",
        ),
        (
            Criteria::compare(
                Expression::Function(FunctionCall::new(
                    FunctionKind::Convert(SqlType::Text),
                    SqlType::Text,
                    vec![element(&catalog.g1, 1)],
                )),
                CompareOp::Eq,
                text("x"),
            ),
            "1 = 0",
        ),
        (
            Criteria::SetCriteria(SetCriteria {
                expr: Expression::null(SqlType::Text),
                values: vec![text("a"), text("b"), text("c")],
                negated: false,
            }),
            "null <> null",
        ),
        (
            Criteria::Match(MatchCriteria {
                expr: element(&catalog.g1, 2),
                pattern: text("abc"),
                escape: None,
                negated: true,
            }),
            "e3 <> 'abc'",
        ),
    ];

    for (input, expected) in cases {
        let rewritten = Rewriter::rewrite_criteria(input, &catalog.metadata, &context)?;
        assert_eq!(rewritten.to_string(), expected);
    }
    Ok(())
}

#[test]
fn rewriting_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    let corpus: Vec<Criteria> = vec![
        Criteria::and(vec![
            Criteria::compare(element(&catalog.g1, 0), CompareOp::Eq, int(1)),
            Criteria::or(vec![
                Criteria::compare(element(&catalog.g1, 1), CompareOp::Lt, int(5)),
                Criteria::compare(text("x"), CompareOp::Le, element(&catalog.g1, 2)),
            ]),
        ]),
        Criteria::Between(BetweenCriteria {
            expr: element(&catalog.g1, 0),
            negated: true,
            low: int(1),
            high: int(2),
        }),
        Criteria::Not(Box::new(Criteria::compare(
            Expression::Function(FunctionCall::new(
                FunctionKind::Add,
                SqlType::Integer,
                vec![element(&catalog.g1, 0), int(3)],
            )),
            CompareOp::Ge,
            int(10),
        ))),
        Criteria::SetCriteria(SetCriteria {
            expr: element(&catalog.g1, 2),
            values: vec![
                text("a"),
                Expression::null(SqlType::Text),
                text("a"),
                text("b"),
            ],
            negated: true,
        }),
        Criteria::Match(MatchCriteria {
            expr: element(&catalog.g1, 2),
            pattern: text("a%b_c"),
            escape: Some('#'),
            negated: false,
        }),
    ];

    for criteria in corpus {
        let once = Rewriter::rewrite_criteria(criteria, &catalog.metadata, &context)?;
        let twice = Rewriter::rewrite_criteria(once.clone(), &catalog.metadata, &context)?;
        assert_eq!(once, twice, "rewrite is not a fixed point: {}", once);
    }
    Ok(())
}

#[test]
fn evaluation_errors_surface_as_validator_errors() {
    let catalog = get_catalog();
    let context = get_context();

    //Division by zero in a foldable predicate must not be absorbed
    let division = Criteria::compare(
        Expression::Function(FunctionCall::new(
            FunctionKind::Divide,
            SqlType::Integer,
            vec![int(1), int(0)],
        )),
        CompareOp::Eq,
        int(1),
    );
    assert!(Rewriter::rewrite_criteria(division, &catalog.metadata, &context).is_err());
}
