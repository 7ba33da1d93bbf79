//! Command level orchestration: rewrites every clause of a command through
//! the simplifier, canonicalizes ORDER BY, reconciles set-query branch
//! types, adapts SELECT INTO projections, and recurses into every nested
//! command exactly once.

use super::criteria::simplify_criteria;
use super::expression::simplify_expression;
use super::{procedure, RewriteEnv, RewriterError};
use crate::engine::objects::{
    Command, Constant, Criteria, ElementRef, Expression, FromItem, FunctionCall, FunctionKind,
    Insert, InsertSource, JoinItem, OrderBy, OrderByElement, OrderKey, Query, QueryCommand,
    SetQuery, SqlType, StoredProcedureCall, Symbol, Update,
};
use uuid::Uuid;

pub(crate) fn rewrite_command(command: Command, env: &RewriteEnv) -> Result<Command, RewriterError> {
    match command {
        Command::Query(q) => Ok(Command::Query(rewrite_query(q, env)?)),
        Command::SetQuery(s) => Ok(Command::SetQuery(rewrite_set_query(s, env)?)),
        Command::Insert(i) => Ok(Command::Insert(rewrite_insert(i, env)?)),
        Command::Update(u) => Ok(Command::Update(rewrite_update(u, env)?)),
        Command::Delete(mut d) => {
            d.criteria = rewrite_where(d.criteria, env)?;
            Ok(Command::Delete(d))
        }
        Command::StoredProcedure(p) => {
            let mut args = vec![];
            for arg in p.args {
                args.push(simplify_expression(arg, env)?);
            }
            Ok(Command::StoredProcedure(StoredProcedureCall {
                name: p.name,
                args,
            }))
        }
        Command::Block(b) => Ok(Command::Block(procedure::rewrite_block(b, env)?)),
    }
}

pub(crate) fn rewrite_query_command(
    command: QueryCommand,
    env: &RewriteEnv,
) -> Result<QueryCommand, RewriterError> {
    match command {
        QueryCommand::Query(q) => Ok(QueryCommand::Query(rewrite_query(q, env)?)),
        QueryCommand::SetQuery(s) => Ok(QueryCommand::SetQuery(rewrite_set_query(s, env)?)),
    }
}

fn rewrite_query(query: Query, env: &RewriteEnv) -> Result<Query, RewriterError> {
    let mut from = vec![];
    for item in query.from {
        from.push(rewrite_from_item(item, env)?);
    }

    let mut select = vec![];
    for symbol in query.select {
        select.push(Symbol {
            expr: simplify_expression(symbol.expr, env)?,
            alias: symbol.alias,
        });
    }

    let criteria = rewrite_where(query.criteria, env)?;

    let mut group_by = vec![];
    for expr in query.group_by {
        group_by.push(simplify_expression(expr, env)?);
    }

    let having = rewrite_where(query.having, env)?;

    let order_by = match query.order_by {
        Some(order_by) => canonicalize_order_by(order_by, &select, true, env)?,
        None => None,
    };

    let rewritten = Query {
        distinct: query.distinct,
        select,
        from,
        criteria,
        group_by,
        having,
        order_by,
        into: query.into,
    };

    if rewritten.into.is_some() {
        return adapt_select_into(rewritten);
    }
    Ok(rewritten)
}

/// WHERE/HAVING handling: an always-true predicate disappears; always-false
/// and always-unknown stay, since they legitimately empty the result.
fn rewrite_where(
    criteria: Option<Criteria>,
    env: &RewriteEnv,
) -> Result<Option<Criteria>, RewriterError> {
    match criteria {
        None => Ok(None),
        Some(c) => {
            let c = simplify_criteria(c, env)?;
            if c.is_true_criteria() {
                Ok(None)
            } else {
                Ok(Some(c))
            }
        }
    }
}

fn rewrite_from_item(item: FromItem, env: &RewriteEnv) -> Result<FromItem, RewriterError> {
    match item {
        FromItem::Group(g) => Ok(FromItem::Group(g)),
        FromItem::Subquery { name, command } => Ok(FromItem::Subquery {
            name,
            command: Box::new(rewrite_query_command(*command, env)?),
        }),
        FromItem::Join(join) => {
            let left = rewrite_from_item(join.left, env)?;
            let right = rewrite_from_item(join.right, env)?;
            let on = match join.on {
                None => None,
                Some(on) => {
                    let mut on = simplify_criteria(on, env)?;
                    //Join semantics cannot observe unknown on an inner or
                    //cross predicate; it behaves as false
                    if on.is_unknown_criteria() && join.kind.unknown_on_is_false() {
                        on = crate::engine::objects::false_criteria();
                    }
                    if on.is_true_criteria() {
                        None
                    } else {
                        Some(on)
                    }
                }
            };
            Ok(FromItem::Join(Box::new(JoinItem {
                kind: join.kind,
                left,
                right,
                on,
            })))
        }
    }
}

/// Resolves positional and alias ORDER BY keys to the projected symbol they
/// name, drops later keys that resolve to the same target, and (outside set
/// queries) drops keys whose target is a compile time constant.
fn canonicalize_order_by(
    order_by: OrderBy,
    select: &[Symbol],
    drop_constants: bool,
    env: &RewriteEnv,
) -> Result<Option<OrderBy>, RewriterError> {
    let names: Vec<String> = select
        .iter()
        .enumerate()
        .map(|(i, s)| s.output_name(i))
        .collect();

    let mut seen: Vec<Expression> = vec![];
    let mut elements = vec![];
    for element in order_by.elements {
        let (target, key) = match element.key {
            OrderKey::Position(p) => {
                if p == 0 || p > select.len() {
                    return Err(RewriterError::UnknownOrderKey(p.to_string()));
                }
                let index = p - 1;
                (select[index].expr.clone(), canonical_key(select, index))
            }
            OrderKey::Alias(a) => {
                match names.iter().position(|n| n.eq_ignore_ascii_case(&a)) {
                    Some(index) => (select[index].expr.clone(), canonical_key(select, index)),
                    None => return Err(RewriterError::UnknownOrderKey(a)),
                }
            }
            OrderKey::Expr(e) => {
                let e = simplify_expression(e, env)?;
                match select.iter().position(|s| s.expr == e) {
                    Some(index) => (e, canonical_key(select, index)),
                    None => (e.clone(), OrderKey::Expr(e)),
                }
            }
        };

        //A constant cannot influence row order
        if drop_constants && target.is_constant() {
            debug!("Dropping constant ORDER BY key");
            continue;
        }
        //Keys over the same target sort nothing new; the first wins
        if seen.contains(&target) {
            continue;
        }
        seen.push(target);
        elements.push(OrderByElement {
            key,
            ascending: element.ascending,
        });
    }

    if elements.is_empty() {
        return Ok(None);
    }
    Ok(Some(OrderBy { elements }))
}

fn canonical_key(select: &[Symbol], index: usize) -> OrderKey {
    match &select[index].alias {
        Some(alias) => OrderKey::Alias(alias.clone()),
        None => OrderKey::Position(index + 1),
    }
}

fn rewrite_set_query(set_query: SetQuery, env: &RewriteEnv) -> Result<SetQuery, RewriterError> {
    let left = rewrite_query_command(*set_query.left, env)?;
    let right = rewrite_query_command(*set_query.right, env)?;

    //Reconcile each output position to the common type across branches; a
    //literal null branch never constrains the decision
    let left_types = left.output_types();
    let right_types = right.output_types();
    let mut common = vec![];
    for (position, (l, r)) in left_types.iter().zip(right_types.iter()).enumerate() {
        match SqlType::common_type(*l, *r) {
            Some(ty) => common.push(ty),
            None => return Err(RewriterError::NoCommonType(position)),
        }
    }
    let left = convert_projection(left, &common);
    let right = convert_projection(right, &common);

    let order_by = match set_query.order_by {
        Some(order_by) => {
            let select = leftmost_select(&left).to_vec();
            //Constant keys survive here: another branch's projection may
            //not be constant
            canonicalize_order_by(order_by, &select, false, env)?
        }
        None => None,
    };

    Ok(SetQuery {
        op: set_query.op,
        all: set_query.all,
        left: Box::new(left),
        right: Box::new(right),
        order_by,
    })
}

fn leftmost_select(command: &QueryCommand) -> &[Symbol] {
    match command {
        QueryCommand::Query(q) => &q.select,
        QueryCommand::SetQuery(s) => leftmost_select(&s.left),
    }
}

/// Inserts an explicit conversion into every projected column whose type
/// differs from the reconciled common type.
fn convert_projection(command: QueryCommand, types: &[SqlType]) -> QueryCommand {
    match command {
        QueryCommand::Query(mut q) => {
            for (i, symbol) in q.select.iter_mut().enumerate() {
                let common = match types.get(i) {
                    Some(t) => *t,
                    None => continue,
                };
                let current = symbol.expr.ty();
                if current == common || common == SqlType::Null {
                    continue;
                }
                if symbol.expr.is_null_constant() {
                    //A null literal just takes the common type
                    symbol.expr = Expression::Constant(Constant::null(common));
                    continue;
                }
                //Wrapping must not change the column's output name
                if symbol.alias.is_none() {
                    symbol.alias = Some(symbol.output_name(i));
                }
                let expr = std::mem::replace(
                    &mut symbol.expr,
                    Expression::Constant(Constant::null(common)),
                );
                symbol.expr = Expression::Function(FunctionCall::new(
                    FunctionKind::Convert(common),
                    common,
                    vec![expr],
                ));
            }
            QueryCommand::Query(q)
        }
        QueryCommand::SetQuery(mut s) => {
            s.left = Box::new(convert_projection(*s.left, types));
            s.right = Box::new(convert_projection(*s.right, types));
            QueryCommand::SetQuery(s)
        }
    }
}

fn rewrite_insert(insert: Insert, env: &RewriteEnv) -> Result<Insert, RewriterError> {
    let source = match insert.source {
        InsertSource::Values(values) => {
            let mut rewritten = vec![];
            for value in values {
                rewritten.push(simplify_expression(value, env)?);
            }
            InsertSource::Values(rewritten)
        }
        InsertSource::Query(q) => InsertSource::Query(Box::new(rewrite_query_command(*q, env)?)),
    };
    Ok(Insert {
        group: insert.group,
        columns: insert.columns,
        source,
    })
}

fn rewrite_update(update: Update, env: &RewriteEnv) -> Result<Update, RewriterError> {
    let mut changes = vec![];
    for (column, value) in update.changes {
        changes.push((column, simplify_expression(value, env)?));
    }
    //An always-false WHERE stays; the planner sees the no-op rather than a
    //silently different command shape
    let criteria = rewrite_where(update.criteria, env)?;
    Ok(Update {
        group: update.group,
        changes,
        criteria,
    })
}

/// Materializing into a target table goes through a generated inline view:
/// duplicate or retyped projected columns get synthetic unique names, and a
/// new outer projection matches the target's column order and types exactly.
fn adapt_select_into(mut query: Query) -> Result<Query, RewriterError> {
    let into = match &query.into {
        Some(into) => into.clone(),
        None => return Ok(query),
    };
    if query.select.len() != into.columns.len() {
        //Arity is the resolver's contract; nothing to adapt here
        return Ok(query);
    }

    let names: Vec<String> = query
        .select
        .iter()
        .enumerate()
        .map(|(i, s)| s.output_name(i))
        .collect();
    let needs_adapting = query.select.iter().enumerate().any(|(i, s)| {
        s.expr.ty() != into.columns[i].ty
            || names[..i].iter().any(|n| n.eq_ignore_ascii_case(&names[i]))
    });
    if !needs_adapting {
        return Ok(query);
    }

    debug!("Adapting SELECT INTO projection for {}", into.group.name);

    //The inline view: the original query, its ambiguous or retyped columns
    //renamed apart. Row order is meaningless to the insertion, so no ORDER
    //BY survives.
    let mut inner = query.clone();
    inner.into = None;
    inner.order_by = None;
    let mut inner_names = vec![];
    for (i, symbol) in inner.select.iter_mut().enumerate() {
        let duplicate = names[..i].iter().any(|n| n.eq_ignore_ascii_case(&names[i]));
        let retyped = symbol.expr.ty() != into.columns[i].ty;
        let name = if duplicate || retyped {
            format!("c_{}", i + 1)
        } else {
            names[i].clone()
        };
        let synthetic =
            symbol.alias.is_none() && !matches!(symbol.expr, Expression::Element(_));
        if duplicate || retyped || synthetic {
            symbol.alias = Some(name.clone());
        }
        inner_names.push(name);
    }

    //The outer projection: one entry per target column, in target order,
    //converting where the view's type differs
    let mut select = vec![];
    for (i, target) in into.columns.iter().enumerate() {
        let view_type = inner.select[i].expr.ty();
        let view_column = Expression::Element(ElementRef::new(
            Uuid::new_v5(
                &Uuid::NAMESPACE_OID,
                format!("x.{}", inner_names[i]).as_bytes(),
            ),
            "x",
            &inner_names[i],
            view_type,
        ));
        let expr = if view_type == target.ty {
            view_column
        } else {
            Expression::Function(FunctionCall::new(
                FunctionKind::Convert(target.ty),
                target.ty,
                vec![view_column],
            ))
        };
        select.push(Symbol::aliased(expr, &target.name));
    }

    query.select = select;
    query.from = vec![FromItem::Subquery {
        name: "x".to_string(),
        command: Box::new(QueryCommand::Query(inner)),
    }];
    query.criteria = None;
    query.group_by = vec![];
    query.having = None;
    query.order_by = None;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::objects::{
        CompareOp, GroupRef, IntoClause, JoinKind, SetOperation,
    };
    use crate::engine::test_objects::{element, get_catalog, get_context, select_elements};

    fn int(i: i64) -> Expression {
        Expression::Constant(Constant::integer(i))
    }

    #[test]
    fn test_where_elision() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let mut query = select_elements("g1", &catalog.g1, &[0]);
        query.criteria = Some(Criteria::compare(int(0), CompareOp::Eq, int(0)));
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(rewritten.to_string(), "SELECT e1 FROM g1");
        Ok(())
    }

    #[test]
    fn test_false_where_is_retained() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let mut query = select_elements("g1", &catalog.g1, &[0]);
        query.criteria = Some(Criteria::compare(int(0), CompareOp::Eq, int(1)));
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(rewritten.to_string(), "SELECT e1 FROM g1 WHERE 1 = 0");
        Ok(())
    }

    #[test]
    fn test_order_by_dedup_on_same_target() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        //SELECT e1, e1 AS c FROM g1 ORDER BY c, e1: both keys sort the same
        //expression, the first wins
        let mut query = Query::select_from(
            vec![
                Symbol::new(element(&catalog.g1, 0)),
                Symbol::aliased(element(&catalog.g1, 0), "c"),
            ],
            vec![FromItem::Group(crate::engine::test_objects::group("g1"))],
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
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT e1, e1 AS c FROM g1 ORDER BY c"
        );
        Ok(())
    }

    #[test]
    fn test_order_by_position_resolution() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let mut query = select_elements("g1", &catalog.g1, &[0, 1]);
        query.order_by = Some(OrderBy {
            elements: vec![OrderByElement {
                key: OrderKey::Position(2),
                ascending: false,
            }],
        });
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT e1, e2 FROM g1 ORDER BY 2 DESC"
        );
        Ok(())
    }

    #[test]
    fn test_constant_order_key_dropped() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let mut query = Query::select_from(
            vec![
                Symbol::new(element(&catalog.g1, 0)),
                Symbol::aliased(int(1), "one"),
            ],
            vec![FromItem::Group(crate::engine::test_objects::group("g1"))],
        );
        query.order_by = Some(OrderBy {
            elements: vec![
                OrderByElement {
                    key: OrderKey::Position(2),
                    ascending: true,
                },
                OrderByElement {
                    key: OrderKey::Position(1),
                    ascending: true,
                },
            ],
        });
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT e1, 1 AS one FROM g1 ORDER BY 1"
        );
        Ok(())
    }

    #[test]
    fn test_unknown_order_key_is_an_error() {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let mut query = select_elements("g1", &catalog.g1, &[0]);
        query.order_by = Some(OrderBy {
            elements: vec![OrderByElement {
                key: OrderKey::Position(9),
                ascending: true,
            }],
        });
        assert!(matches!(
            rewrite_query(query, &env),
            Err(RewriterError::UnknownOrderKey(_))
        ));
    }

    #[test]
    fn test_inner_join_unknown_on_becomes_false() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let join = FromItem::Join(Box::new(JoinItem {
            kind: JoinKind::Inner,
            left: FromItem::Group(crate::engine::test_objects::group("g1")),
            right: FromItem::Group(crate::engine::test_objects::group("g2")),
            on: Some(Criteria::compare(
                element(&catalog.g1, 0),
                CompareOp::Eq,
                Expression::null(SqlType::Integer),
            )),
        }));
        let query = Query::select_from(vec![Symbol::new(element(&catalog.g1, 0))], vec![join]);
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT e1 FROM g1 INNER JOIN g2 ON 1 = 0"
        );
        Ok(())
    }

    #[test]
    fn test_left_join_keeps_unknown_on() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let join = FromItem::Join(Box::new(JoinItem {
            kind: JoinKind::LeftOuter,
            left: FromItem::Group(crate::engine::test_objects::group("g1")),
            right: FromItem::Group(crate::engine::test_objects::group("g2")),
            on: Some(Criteria::compare(
                element(&catalog.g1, 0),
                CompareOp::Eq,
                Expression::null(SqlType::Integer),
            )),
        }));
        let query = Query::select_from(vec![Symbol::new(element(&catalog.g1, 0))], vec![join]);
        let rewritten = rewrite_query(query, &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT e1 FROM g1 LEFT OUTER JOIN g2 ON null <> null"
        );
        Ok(())
    }

    #[test]
    fn test_set_query_type_reconciliation() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        //g1.e1 is an integer, g1.e4 is a double: the integer branch converts
        let set_query = SetQuery {
            op: SetOperation::Union,
            all: true,
            left: Box::new(QueryCommand::Query(select_elements("g1", &catalog.g1, &[0]))),
            right: Box::new(QueryCommand::Query(select_elements(
                "g1",
                &catalog.g1,
                &[3],
            ))),
            order_by: None,
        };
        let rewritten = rewrite_set_query(set_query, &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT convert(e1, double) AS e1 FROM g1 UNION ALL SELECT e4 FROM g1"
        );
        assert_eq!(
            QueryCommand::SetQuery(rewritten).output_types(),
            vec![SqlType::Double]
        );
        Ok(())
    }

    #[test]
    fn test_set_query_null_branch_does_not_constrain() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let null_branch = Query::select_from(
            vec![Symbol::aliased(Expression::null(SqlType::Null), "e1")],
            vec![FromItem::Group(crate::engine::test_objects::group("g2"))],
        );
        let set_query = SetQuery {
            op: SetOperation::Union,
            all: false,
            left: Box::new(QueryCommand::Query(select_elements("g1", &catalog.g1, &[0]))),
            right: Box::new(QueryCommand::Query(null_branch)),
            order_by: None,
        };
        let rewritten = rewrite_set_query(set_query, &env)?;
        //The null literal takes the integer type instead of forcing text
        assert_eq!(
            QueryCommand::SetQuery(rewritten).output_types(),
            vec![SqlType::Integer]
        );
        Ok(())
    }

    #[test]
    fn test_set_query_keeps_constant_order_key() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let constant_branch = Query::select_from(
            vec![Symbol::aliased(int(1), "c")],
            vec![FromItem::Group(crate::engine::test_objects::group("g2"))],
        );
        let other_branch = Query::select_from(
            vec![Symbol::aliased(element(&catalog.g1, 0), "c")],
            vec![FromItem::Group(crate::engine::test_objects::group("g1"))],
        );
        let set_query = SetQuery {
            op: SetOperation::Union,
            all: false,
            left: Box::new(QueryCommand::Query(constant_branch)),
            right: Box::new(QueryCommand::Query(other_branch)),
            order_by: Some(OrderBy {
                elements: vec![OrderByElement {
                    key: OrderKey::Alias("c".to_string()),
                    ascending: true,
                }],
            }),
        };
        let rewritten = rewrite_set_query(set_query, &env)?;
        assert!(rewritten.order_by.is_some());
        Ok(())
    }

    #[test]
    fn test_select_into_adaptation() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        //Materialize a double projection into integer g2.e1 and string g2.e2
        let mut query = Query::select_from(
            vec![
                Symbol::new(element(&catalog.g1, 3)),
                Symbol::new(element(&catalog.g1, 2)),
            ],
            vec![FromItem::Group(crate::engine::test_objects::group("g1"))],
        );
        query.into = Some(IntoClause {
            group: GroupRef::new(uuid::Uuid::nil(), "g2"),
            columns: vec![catalog.g2[0].clone(), catalog.g2[1].clone()],
        });
        let rewritten = rewrite_query(query.clone(), &env)?;
        assert_eq!(
            rewritten.to_string(),
            "SELECT convert(c_1, integer) AS e1, e3 AS e2 INTO g2 \
             FROM (SELECT e4 AS c_1, e3 FROM g1) AS x"
        );

        //The adapted form is a fixed point
        let again = rewrite_query(rewritten.clone(), &env)?;
        assert_eq!(again, rewritten);
        Ok(())
    }

    #[test]
    fn test_update_and_delete_rewrites() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let update = Command::Update(Update {
            group: crate::engine::test_objects::group("g1"),
            changes: vec![(
                catalog.g1[0].clone(),
                Expression::Function(FunctionCall::new(
                    FunctionKind::Add,
                    SqlType::Integer,
                    vec![int(1), int(2)],
                )),
            )],
            criteria: Some(Criteria::compare(int(1), CompareOp::Eq, int(2))),
        });
        let rewritten = rewrite_command(update, &env)?;
        assert_eq!(rewritten.to_string(), "UPDATE g1 SET e1 = 3 WHERE 1 = 0");
        Ok(())
    }
}
