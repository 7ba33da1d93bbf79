use estuarylib::engine::objects::{
    Command, CompareOp, Constant, Criteria, Expression, FromItem, OrderBy, OrderByElement,
    OrderKey, Query, QueryCommand, SetOperation, SetQuery, Symbol,
};
use estuarylib::engine::test_objects::{element, get_catalog, get_context, group, select_elements};
use estuarylib::engine::Rewriter;

fn int(i: i64) -> Expression {
    Expression::Constant(Constant::integer(i))
}

#[test]
fn where_clause_elision() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    let mut query = select_elements("g1", &catalog.g1, &[0]);
    query.criteria = Some(Criteria::compare(int(0), CompareOp::Eq, int(0)));

    let rewritten =
        Rewriter::rewrite_command(Command::Query(query), &catalog.metadata, &context)?;
    assert_eq!(rewritten.to_string(), "SELECT e1 FROM g1");
    Ok(())
}

#[test]
fn order_by_duplicate_target_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    let mut query = Query::select_from(
        vec![
            Symbol::new(element(&catalog.g1, 0)),
            Symbol::aliased(element(&catalog.g1, 0), "c"),
        ],
        vec![FromItem::Group(group("g1"))],
    );
    query.order_by = Some(OrderBy {
        elements: vec![
            OrderByElement {
                key: OrderKey::Alias("c".to_string()),
                ascending: true,
            },
            OrderByElement {
                key: OrderKey::Expr(element(&catalog.g1, 0)),
                ascending: true,
            },
        ],
    });

    let rewritten =
        Rewriter::rewrite_command(Command::Query(query), &catalog.metadata, &context)?;
    assert_eq!(
        rewritten.to_string(),
        "SELECT e1, e1 AS c FROM g1 ORDER BY c"
    );
    Ok(())
}

#[test]
fn nested_subquery_is_rewritten() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    let mut inner = select_elements("g2", &catalog.g2, &[0]);
    inner.criteria = Some(Criteria::compare(int(1), CompareOp::Eq, int(1)));
    let outer = Query::select_from(
        vec![Symbol::new(element(&catalog.g2, 0))],
        vec![FromItem::Subquery {
            name: "v".to_string(),
            command: Box::new(QueryCommand::Query(inner)),
        }],
    );

    let rewritten =
        Rewriter::rewrite_command(Command::Query(outer), &catalog.metadata, &context)?;
    assert_eq!(
        rewritten.to_string(),
        "SELECT e1 FROM (SELECT e1 FROM g2) AS v"
    );
    Ok(())
}

#[test]
fn union_branch_types_reconcile() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    //An integer branch against a double branch widens the integer side
    let set_query = SetQuery {
        op: SetOperation::Union,
        all: true,
        left: Box::new(QueryCommand::Query(select_elements("g1", &catalog.g1, &[0]))),
        right: Box::new(QueryCommand::Query(select_elements("g1", &catalog.g1, &[3]))),
        order_by: None,
    };

    let rewritten =
        Rewriter::rewrite_command(Command::SetQuery(set_query), &catalog.metadata, &context)?;
    assert_eq!(
        rewritten.to_string(),
        "SELECT convert(e1, double) AS e1 FROM g1 UNION ALL SELECT e4 FROM g1"
    );
    Ok(())
}

#[test]
fn whole_command_rewrite_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = get_catalog();
    let context = get_context();

    let mut query = Query::select_from(
        vec![
            Symbol::new(element(&catalog.g1, 0)),
            Symbol::aliased(int(7), "k"),
        ],
        vec![FromItem::Group(group("g1"))],
    );
    query.criteria = Some(Criteria::and(vec![
        Criteria::compare(int(5), CompareOp::Lt, element(&catalog.g1, 1)),
        Criteria::compare(element(&catalog.g1, 2), CompareOp::Ne, Expression::Constant(Constant::text("x"))),
    ]));
    query.order_by = Some(OrderBy {
        elements: vec![
            OrderByElement {
                key: OrderKey::Position(2),
                ascending: true,
            },
            OrderByElement {
                key: OrderKey::Position(1),
                ascending: false,
            },
        ],
    });

    let once =
        Rewriter::rewrite_command(Command::Query(query), &catalog.metadata, &context)?;
    let twice = Rewriter::rewrite_command(once.clone(), &catalog.metadata, &context)?;
    assert_eq!(once, twice);
    assert_eq!(
        once.to_string(),
        "SELECT e1, 7 AS k FROM g1 WHERE (e2 > 5) AND (e3 <> 'x') ORDER BY 1 DESC"
    );
    Ok(())
}
