//! Bottom-up expression simplification: children first, then the node
//! itself. Deterministic functions over constant arguments fold through the
//! evaluator; the convenience null-handling functions compile into their
//! canonical CASE forms before any folding happens.

use super::criteria::simplify_criteria;
use super::{command, RewriteEnv, RewriterError};
use crate::engine::evaluator::Evaluator;
use crate::engine::objects::{
    CaseExpression, CompareOp, Constant, Criteria, ElementRef, Expression, FunctionCall,
    FunctionKind, IsNullCriteria, SearchedCaseExpression, SqlType, SqlValue, VariableValue,
};

pub(crate) fn simplify_expression(
    expr: Expression,
    env: &RewriteEnv,
) -> Result<Expression, RewriterError> {
    match expr {
        Expression::Constant(_) | Expression::Reference(_) => Ok(expr),
        Expression::Element(e) => substitute_element(e, env, false),
        Expression::Function(call) => simplify_function(call, env),
        Expression::Case(c) => simplify_case(c, env),
        Expression::SearchedCase(c) => simplify_searched_case(c, env),
        Expression::Aggregate(mut a) => {
            if let Some(arg) = a.arg {
                a.arg = Some(Box::new(simplify_expression(*arg, env)?));
            }
            Ok(Expression::Aggregate(a))
        }
        Expression::ScalarSubquery(q) => Ok(Expression::ScalarSubquery(Box::new(
            command::rewrite_query_command(*q, env)?,
        ))),
    }
}

/// Replaces an INPUT/CHANGING pseudo-group reference with its binding. With
/// `lenient` set, a column with neither value nor default becomes a typed
/// null instead of an error; only a bare procedural assignment may ask for
/// that.
pub(crate) fn substitute_element(
    element: ElementRef,
    env: &RewriteEnv,
    lenient: bool,
) -> Result<Expression, RewriterError> {
    let variables = match env.variables {
        Some(v) => v,
        None => return Ok(Expression::Element(element)),
    };

    match element.group.to_uppercase().as_str() {
        "INPUT" => match variables.input(&element.name) {
            VariableValue::Value(c) => Ok(Expression::Constant(c.clone())),
            VariableValue::NotSupplied => {
                let meta = env.metadata.element(&element.id)?;
                if let Some(default) = &meta.default {
                    return Ok(Expression::Constant(default.clone()));
                }
                if lenient {
                    return Ok(Expression::Constant(Constant::null(element.ty)));
                }
                Err(RewriterError::UnresolvedVariable(format!(
                    "INPUT.{}",
                    element.name
                )))
            }
            VariableValue::Unknown => Ok(Expression::Element(element)),
        },
        "CHANGING" => match variables.changing(&element.name) {
            Some(changed) => Ok(Expression::Constant(Constant::boolean(changed))),
            None => Ok(Expression::Element(element)),
        },
        _ => Ok(Expression::Element(element)),
    }
}

fn simplify_function(call: FunctionCall, env: &RewriteEnv) -> Result<Expression, RewriterError> {
    let mut args = vec![];
    for arg in call.args {
        args.push(simplify_expression(arg, env)?);
    }
    let descriptor = call.descriptor;

    //The convenience functions compile into their canonical forms first so
    //one set of CASE/IFNULL rules covers them all.
    match &descriptor.kind {
        FunctionKind::Coalesce => {
            return simplify_expression(expand_coalesce(args, descriptor.returns), env);
        }
        FunctionKind::NullIf => {
            return simplify_expression(expand_nullif(args, descriptor.returns), env);
        }
        FunctionKind::DecodeString | FunctionKind::DecodeInteger => {
            return simplify_expression(expand_decode(args, descriptor.returns), env);
        }
        FunctionKind::Concat2 => {
            return simplify_expression(expand_concat2(args), env);
        }
        _ => {}
    }

    //ifnull folds against its first argument alone
    if descriptor.kind == FunctionKind::IfNull && args.len() == 2 {
        if let Some(first) = args[0].as_constant() {
            let replacement = if first.is_null() {
                args.swap_remove(1)
            } else {
                args.swap_remove(0)
            };
            return Ok(replacement);
        }
    }

    if descriptor.deterministic && args.iter().all(Expression::is_constant) {
        let folded = Evaluator::evaluate(
            &Expression::Function(FunctionCall {
                descriptor,
                args,
            }),
            env.context,
        )?;
        return Ok(Expression::Constant(folded));
    }

    //A null argument decides the result without looking at the others
    if descriptor.kind.propagates_nulls() && args.iter().any(Expression::is_null_constant) {
        return Ok(Expression::Constant(Constant::null(descriptor.returns)));
    }

    Ok(Expression::Function(FunctionCall { descriptor, args }))
}

/// coalesce(a, b, c) compiles to ifnull(a, ifnull(b, c)).
fn expand_coalesce(mut args: Vec<Expression>, returns: SqlType) -> Expression {
    let mut result = match args.pop() {
        Some(last) => last,
        None => Expression::Constant(Constant::null(returns)),
    };
    while let Some(arg) = args.pop() {
        result = Expression::Function(FunctionCall::new(
            FunctionKind::IfNull,
            returns,
            vec![arg, result],
        ));
    }
    result
}

/// nullif(a, b) compiles to CASE WHEN a = b THEN null ELSE a END.
fn expand_nullif(mut args: Vec<Expression>, returns: SqlType) -> Expression {
    let second = args.pop().unwrap_or_else(|| Expression::null(returns));
    let first = args.pop().unwrap_or_else(|| Expression::null(returns));
    Expression::SearchedCase(SearchedCaseExpression {
        whens: vec![(
            Criteria::compare(first.clone(), CompareOp::Eq, second),
            Expression::Constant(Constant::null(returns)),
        )],
        else_expr: Some(Box::new(first)),
    })
}

/// The decode family compiles to a searched CASE over flat literal pairs,
/// with the reserved 'null' token matching an IS NULL test.
fn expand_decode(args: Vec<Expression>, returns: SqlType) -> Expression {
    let mut iter = args.into_iter();
    let input = iter
        .next()
        .unwrap_or_else(|| Expression::Constant(Constant::null(returns)));
    let rest: Vec<Expression> = iter.collect();

    let mut whens = vec![];
    let mut default = None;
    let mut i = 0;
    while i < rest.len() {
        if i + 1 >= rest.len() {
            default = Some(rest[i].clone());
            break;
        }
        let condition = match rest[i].as_constant() {
            Some(c) if matches!(&c.value, Some(SqlValue::Text(t)) if t == "null") => {
                Criteria::IsNull(IsNullCriteria {
                    expr: input.clone(),
                    negated: false,
                })
            }
            _ => Criteria::compare(input.clone(), CompareOp::Eq, rest[i].clone()),
        };
        whens.push((condition, rest[i + 1].clone()));
        i += 2;
    }

    let else_expr = default.unwrap_or_else(|| input.clone());
    Expression::SearchedCase(SearchedCaseExpression {
        whens,
        else_expr: Some(Box::new(else_expr)),
    })
}

/// concat2(a, b) is null only when both arguments are null; otherwise each
/// null argument concatenates as the empty string.
fn expand_concat2(mut args: Vec<Expression>) -> Expression {
    let second = args
        .pop()
        .unwrap_or_else(|| Expression::null(SqlType::Text));
    let first = args
        .pop()
        .unwrap_or_else(|| Expression::null(SqlType::Text));

    let both_null = Criteria::and(vec![
        Criteria::IsNull(IsNullCriteria {
            expr: first.clone(),
            negated: false,
        }),
        Criteria::IsNull(IsNullCriteria {
            expr: second.clone(),
            negated: false,
        }),
    ]);
    let empty = Expression::Constant(Constant::text(""));
    let concat = Expression::Function(FunctionCall::new(
        FunctionKind::Concat,
        SqlType::Text,
        vec![
            Expression::Function(FunctionCall::new(
                FunctionKind::IfNull,
                SqlType::Text,
                vec![first, empty.clone()],
            )),
            Expression::Function(FunctionCall::new(
                FunctionKind::IfNull,
                SqlType::Text,
                vec![second, empty],
            )),
        ],
    ));
    Expression::SearchedCase(SearchedCaseExpression {
        whens: vec![(both_null, Expression::null(SqlType::Text))],
        else_expr: Some(Box::new(concat)),
    })
}

fn simplify_case(case: CaseExpression, env: &RewriteEnv) -> Result<Expression, RewriterError> {
    let result_type = case.result_type();
    let operand = simplify_expression(*case.operand, env)?;
    let mut else_expr = match case.else_expr {
        Some(e) => Some(Box::new(simplify_expression(*e, env)?)),
        None => None,
    };

    //A null operand never matches any branch
    if operand.is_null_constant() {
        return Ok(collapse_case(else_expr, result_type));
    }

    let mut whens = vec![];
    for (when, then) in case.whens {
        let when = simplify_expression(when, env)?;
        let then = simplify_expression(then, env)?;
        if let (Some(op), Some(w)) = (operand.as_constant(), when.as_constant()) {
            match (&op.value, &w.value) {
                (Some(l), Some(r)) => {
                    if Evaluator::compare_values(CompareOp::Eq, l, r)
                        .map_err(RewriterError::Evaluation)?
                    {
                        if whens.is_empty() {
                            //First branch that can match always matches
                            return Ok(retype_null(then, result_type));
                        }
                        //Everything after an always-matching branch is
                        //dead; it becomes the else
                        else_expr = Some(Box::new(then));
                        break;
                    }
                    //This branch can never match
                    continue;
                }
                //A null when value never matches
                (_, _) => continue,
            }
        }
        whens.push((when, then));
    }

    if whens.is_empty() {
        return Ok(collapse_case(else_expr, result_type));
    }
    Ok(Expression::Case(CaseExpression {
        operand: Box::new(operand),
        whens,
        else_expr,
    }))
}

fn simplify_searched_case(
    case: SearchedCaseExpression,
    env: &RewriteEnv,
) -> Result<Expression, RewriterError> {
    let result_type = case.result_type();
    let mut whens = vec![];
    let mut else_expr = match case.else_expr {
        Some(e) => Some(Box::new(simplify_expression(*e, env)?)),
        None => None,
    };

    for (when, then) in case.whens {
        let when = simplify_criteria(when, env)?;
        let then = simplify_expression(then, env)?;
        if when.is_true_criteria() {
            if whens.is_empty() {
                return Ok(retype_null(then, result_type));
            }
            //Everything after an always-true branch is dead; it becomes
            //the else
            else_expr = Some(Box::new(then));
            break;
        }
        if when.is_false_criteria() || when.is_unknown_criteria() {
            continue;
        }
        whens.push((when, then));
    }

    if whens.is_empty() {
        return Ok(collapse_case(else_expr, result_type));
    }
    Ok(Expression::SearchedCase(SearchedCaseExpression {
        whens,
        else_expr,
    }))
}

fn collapse_case(else_expr: Option<Box<Expression>>, result_type: SqlType) -> Expression {
    match else_expr {
        Some(e) => retype_null(*e, result_type),
        None => Expression::Constant(Constant::null(result_type)),
    }
}

/// Collapsing a CASE must not change its declared type: an untyped null
/// result takes the type of the case it replaced.
fn retype_null(expr: Expression, result_type: SqlType) -> Expression {
    match expr {
        Expression::Constant(c) if c.is_null() && c.ty == SqlType::Null => {
            Expression::Constant(Constant::null(result_type))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_objects::{element, get_catalog, get_context};

    fn int(i: i64) -> Expression {
        Expression::Constant(Constant::integer(i))
    }

    #[test]
    fn test_constant_folding() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let sum = Expression::Function(FunctionCall::new(
            FunctionKind::Add,
            SqlType::Integer,
            vec![int(1), int(2)],
        ));
        assert_eq!(simplify_expression(sum, &env)?, int(3));
        Ok(())
    }

    #[test]
    fn test_null_propagation_with_nonconstant_arg() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let sum = Expression::Function(FunctionCall::new(
            FunctionKind::Add,
            SqlType::Integer,
            vec![element(&catalog.g1, 0), Expression::null(SqlType::Integer)],
        ));
        assert_eq!(
            simplify_expression(sum, &env)?,
            Expression::Constant(Constant::null(SqlType::Integer))
        );
        Ok(())
    }

    #[test]
    fn test_nondeterministic_not_folded() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let now = Expression::Function(FunctionCall::new(
            FunctionKind::Now,
            SqlType::Timestamp,
            vec![],
        ));
        let result = simplify_expression(now.clone(), &env)?;
        assert_eq!(result, now);
        Ok(())
    }

    #[test]
    fn test_searched_case_truncation() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let case = Expression::SearchedCase(SearchedCaseExpression {
            whens: vec![(
                Criteria::compare(int(0), CompareOp::Eq, int(0)),
                int(1),
            )],
            else_expr: Some(Box::new(int(2))),
        });
        assert_eq!(simplify_expression(case, &env)?, int(1));

        let dead = Expression::SearchedCase(SearchedCaseExpression {
            whens: vec![(
                Criteria::compare(int(0), CompareOp::Eq, int(1)),
                int(1),
            )],
            else_expr: Some(Box::new(int(2))),
        });
        assert_eq!(simplify_expression(dead, &env)?, int(2));
        Ok(())
    }

    #[test]
    fn test_decode_compiles_to_case() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let decoded = Expression::Function(FunctionCall::new(
            FunctionKind::DecodeString,
            SqlType::Text,
            vec![
                element(&catalog.g1, 2),
                Expression::Constant(Constant::text("a")),
                Expression::Constant(Constant::text("first")),
                Expression::Constant(Constant::text("null")),
                Expression::Constant(Constant::text("missing")),
            ],
        ));
        let result = simplify_expression(decoded, &env)?;
        assert_eq!(
            result.to_string(),
            "CASE WHEN e3 = 'a' THEN 'first' WHEN e3 IS NULL THEN 'missing' ELSE e3 END"
        );
        Ok(())
    }

    #[test]
    fn test_coalesce_expansion() -> Result<(), Box<dyn std::error::Error>> {
        let catalog = get_catalog();
        let context = get_context();
        let env = RewriteEnv::new(&catalog.metadata, &context);

        let coalesced = Expression::Function(FunctionCall::new(
            FunctionKind::Coalesce,
            SqlType::Integer,
            vec![
                Expression::null(SqlType::Integer),
                element(&catalog.g1, 0),
                int(1),
            ],
        ));
        let result = simplify_expression(coalesced, &env)?;
        assert_eq!(result.to_string(), "ifnull(e1, 1)");
        Ok(())
    }
}
