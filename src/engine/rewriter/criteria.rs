//! Bottom-up criteria simplification under three valued logic. Every rule
//! that proves a predicate always true/false/unknown emits the matching
//! sentinel from `objects::criteria`, so later passes detect the outcome by
//! structural equality.

use super::expression::simplify_expression;
use super::{command, RewriteEnv, RewriterError};
use crate::constants::Ternary;
use crate::engine::evaluator::{Evaluator, EvaluatorError};
use crate::engine::objects::{
    false_criteria, true_criteria, unknown_criteria, BetweenCriteria, CompareCriteria, CompareOp,
    CompoundCriteria, CompoundOp, Constant, Criteria, Expression, FunctionCall, FunctionKind,
    HasCriteria, IsNullCriteria, MatchCriteria, Quantifier, SetCriteria, SqlType, SqlValue,
    SubqueryCompareCriteria, TranslateCriteria,
};

pub(crate) fn simplify_criteria(
    criteria: Criteria,
    env: &RewriteEnv,
) -> Result<Criteria, RewriterError> {
    match criteria {
        Criteria::Compound(c) => simplify_compound(c, env),
        Criteria::Not(inner) => simplify_not(*inner, env),
        Criteria::Compare(c) => simplify_compare(c, env),
        Criteria::Between(b) => simplify_between(b, env),
        Criteria::Match(m) => simplify_match(m, env),
        Criteria::SetCriteria(s) => simplify_set(s, env),
        Criteria::IsNull(n) => simplify_is_null(n, env),
        Criteria::SubqueryCompare(s) => simplify_subquery_compare(s, env),
        Criteria::Exists(q) => Ok(Criteria::Exists(Box::new(command::rewrite_query_command(
            *q, env,
        )?))),
        Criteria::HasCriteria(h) => resolve_has_criteria(h, env),
        Criteria::TranslateCriteria(t) => resolve_translate_criteria(t, env),
    }
}

fn ternary_to_sentinel(value: Ternary) -> Criteria {
    match value {
        Ternary::True => true_criteria(),
        Ternary::False => false_criteria(),
        Ternary::Unknown => unknown_criteria(),
    }
}

fn simplify_compound(
    compound: CompoundCriteria,
    env: &RewriteEnv,
) -> Result<Criteria, RewriterError> {
    let (neutral, absorbing): (fn(&Criteria) -> bool, fn(&Criteria) -> bool) = match compound.op {
        CompoundOp::And => (Criteria::is_true_criteria, Criteria::is_false_criteria),
        CompoundOp::Or => (Criteria::is_false_criteria, Criteria::is_true_criteria),
    };

    let mut parts: Vec<Criteria> = vec![];
    for part in compound.parts {
        let part = simplify_criteria(part, env)?;
        if absorbing(&part) {
            return Ok(ternary_to_sentinel(match compound.op {
                CompoundOp::And => Ternary::False,
                CompoundOp::Or => Ternary::True,
            }));
        }
        if neutral(&part) {
            continue;
        }
        match part {
            //Nested compounds of the same operator flatten; they were
            //already simplified on the way up
            Criteria::Compound(inner) if inner.op == compound.op => parts.extend(inner.parts),
            other => parts.push(other),
        }
    }

    //AND/OR are idempotent, so one always-unknown operand subsumes the rest
    let mut seen_unknown = false;
    parts.retain(|p| {
        if p.is_unknown_criteria() {
            if seen_unknown {
                return false;
            }
            seen_unknown = true;
        }
        true
    });

    match parts.len() {
        0 => Ok(match compound.op {
            CompoundOp::And => true_criteria(),
            CompoundOp::Or => false_criteria(),
        }),
        1 => Ok(parts.remove(0)),
        _ => Ok(Criteria::Compound(CompoundCriteria {
            op: compound.op,
            parts,
        })),
    }
}

fn simplify_not(inner: Criteria, env: &RewriteEnv) -> Result<Criteria, RewriterError> {
    //Negation pushes into the shapes that carry it themselves before any
    //other rule runs, so the negated form simplifies as a whole
    match inner {
        //Double negation cancels
        Criteria::Not(child) => simplify_criteria(*child, env),
        Criteria::Compare(mut c) => {
            c.op = c.op.negate();
            simplify_compare(c, env)
        }
        Criteria::Between(mut b) => {
            b.negated = !b.negated;
            simplify_between(b, env)
        }
        Criteria::SetCriteria(mut s) => {
            s.negated = !s.negated;
            simplify_set(s, env)
        }
        Criteria::Match(mut m) => {
            m.negated = !m.negated;
            simplify_match(m, env)
        }
        Criteria::IsNull(mut n) => {
            n.negated = !n.negated;
            simplify_is_null(n, env)
        }
        other => {
            let inner = simplify_criteria(other, env)?;
            if inner.is_true_criteria() {
                return Ok(false_criteria());
            }
            if inner.is_false_criteria() {
                return Ok(true_criteria());
            }
            if inner.is_unknown_criteria() {
                return Ok(unknown_criteria());
            }
            match inner {
                //The child simplified into a negatable shape after all,
                //e.g. a compound that collapsed to a single comparison
                Criteria::Compare(mut c) => {
                    c.op = c.op.negate();
                    Ok(Criteria::Compare(c))
                }
                Criteria::SetCriteria(mut s) => {
                    s.negated = !s.negated;
                    Ok(Criteria::SetCriteria(s))
                }
                Criteria::Match(mut m) => {
                    m.negated = !m.negated;
                    Ok(Criteria::Match(m))
                }
                Criteria::IsNull(mut n) => {
                    n.negated = !n.negated;
                    Ok(Criteria::IsNull(n))
                }
                Criteria::Not(child) => Ok(*child),
                //No safe flip exists; keep the explicit NOT
                simplified => Ok(Criteria::Not(Box::new(simplified))),
            }
        }
    }
}

fn simplify_compare(
    compare: CompareCriteria,
    env: &RewriteEnv,
) -> Result<Criteria, RewriterError> {
    let mut left = simplify_expression(compare.left, env)?;
    let mut right = simplify_expression(compare.right, env)?;
    let mut op = compare.op;

    if left.is_constant() && right.is_constant() {
        let folded = Evaluator::evaluate_criteria(
            &Criteria::compare(left, op, right),
            env.context,
        )?;
        return Ok(ternary_to_sentinel(folded));
    }

    //Canonical orientation puts the constant on the right
    if left.is_constant() && !right.is_constant() {
        std::mem::swap(&mut left, &mut right);
        op = op.mirror();
    }

    if let Some(constant) = right.as_constant().cloned() {
        if !constant.is_null() {
            if let Expression::Function(call) = &left {
                if call.descriptor.kind.is_arithmetic() {
                    if let Some(rewritten) = isolate_arithmetic(call, op, &constant)? {
                        return Ok(rewritten);
                    }
                }
                if let Some(rewritten) = invert_function(call, op, &constant, env)? {
                    //The freed operand may expose another inversion
                    return simplify_criteria(rewritten, env);
                }
            }
        }
    }

    Ok(Criteria::Compare(CompareCriteria { op, left, right }))
}

/// Pulls a single level of arithmetic off the element side of a comparison:
/// `e + c op k` becomes `e op k - c` and so on. Multiplying or dividing by a
/// negative constant reverses the operator. Anything that is not exactly one
/// arithmetic level over one element, or that would not be exact (integer
/// division, inexact integer quotients, overflow), is left alone.
fn isolate_arithmetic(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
) -> Result<Option<Criteria>, RewriterError> {
    if call.args.len() != 2 {
        return Ok(None);
    }
    let (element, operand, element_first) = match (&call.args[0], &call.args[1]) {
        (e @ Expression::Element(_), Expression::Constant(c)) => (e, c, true),
        (Expression::Constant(c), e @ Expression::Element(_)) => (e, c, false),
        (_, _) => return Ok(None),
    };
    let operand_value = match &operand.value {
        Some(v) => v,
        //A null operand already folded the whole expression upstream
        None => return Ok(None),
    };
    let target = match &constant.value {
        Some(v) => v,
        None => return Ok(None),
    };

    let result = match (&call.descriptor.kind, element_first) {
        //e + c op k  =>  e op k - c   (and the mirrored c + e)
        (FunctionKind::Add, _) => numeric_subtract(target, operand_value).map(|v| (v, op)),
        //e - c op k  =>  e op k + c
        (FunctionKind::Subtract, true) => numeric_add(target, operand_value).map(|v| (v, op)),
        //c - e op k  =>  e mirror(op) c - k
        (FunctionKind::Subtract, false) => {
            numeric_subtract(operand_value, target).map(|v| (v, op.mirror()))
        }
        //e * c op k  =>  e op' k / c, only when the quotient is exact
        (FunctionKind::Multiply, _) => match exact_divide(target, operand_value) {
            Some((v, negative)) => Some((v, if negative { op.mirror() } else { op })),
            None => None,
        },
        //e / c op k  =>  e op' k * c, doubles only: integer division
        //truncates and has no inverse
        (FunctionKind::Divide, true) => match (operand_value, target) {
            (SqlValue::Double(c), SqlValue::Double(k)) if *c != 0.0 => {
                let flipped = *c < 0.0;
                Some((
                    SqlValue::Double(k * c),
                    if flipped { op.mirror() } else { op },
                ))
            }
            (_, _) => None,
        },
        //c / e op k  =>  e = c / k for equality over doubles; the division
        //is not monotone across zero so ordering stays put
        (FunctionKind::Divide, false) => match (operand_value, target) {
            (SqlValue::Double(c), SqlValue::Double(k))
                if op.is_equality() && *k != 0.0 && *c != 0.0 =>
            {
                Some((SqlValue::Double(c / k), op))
            }
            (_, _) => None,
        },
        (_, _) => None,
    };

    Ok(result.map(|(value, op)| {
        Criteria::compare(element.clone(), op, Expression::constant(value))
    }))
}

fn numeric_add(left: &SqlValue, right: &SqlValue) -> Option<SqlValue> {
    match (left, right) {
        (SqlValue::Integer(l), SqlValue::Integer(r)) => l.checked_add(*r).map(SqlValue::Integer),
        (SqlValue::Double(l), SqlValue::Double(r)) => Some(SqlValue::Double(l + r)),
        (_, _) => None,
    }
}

fn numeric_subtract(left: &SqlValue, right: &SqlValue) -> Option<SqlValue> {
    match (left, right) {
        (SqlValue::Integer(l), SqlValue::Integer(r)) => l.checked_sub(*r).map(SqlValue::Integer),
        (SqlValue::Double(l), SqlValue::Double(r)) => Some(SqlValue::Double(l - r)),
        (_, _) => None,
    }
}

/// `target / divisor` when exact, with a flag for a negative divisor.
fn exact_divide(target: &SqlValue, divisor: &SqlValue) -> Option<(SqlValue, bool)> {
    match (target, divisor) {
        (SqlValue::Integer(k), SqlValue::Integer(c)) => {
            if *c == 0 || k % c != 0 {
                return None;
            }
            Some((SqlValue::Integer(k / c), *c < 0))
        }
        (SqlValue::Double(k), SqlValue::Double(c)) => {
            if *c == 0.0 {
                return None;
            }
            Some((SqlValue::Double(k / c), *c < 0.0))
        }
        (_, _) => None,
    }
}

/// The closed allow-list of invertible functions. Every entry carries the
/// proof obligation that moving the function across the comparison preserves
/// the three valued result for every binding; conversions that cannot
/// round-trip the literal fold to the FALSE/TRUE sentinel instead.
fn invert_function(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
    env: &RewriteEnv,
) -> Result<Option<Criteria>, RewriterError> {
    match &call.descriptor.kind {
        FunctionKind::Convert(to) => invert_convert(call, op, constant, *to),
        FunctionKind::ParseInteger => {
            invert_parse_numeric(call, op, constant, SqlType::Integer)
        }
        FunctionKind::ParseDouble => invert_parse_numeric(call, op, constant, SqlType::Double),
        FunctionKind::FormatInteger => {
            invert_format_numeric(call, op, constant, SqlType::Integer)
        }
        FunctionKind::FormatDouble => invert_format_numeric(call, op, constant, SqlType::Double),
        FunctionKind::ParseDate | FunctionKind::ParseTime | FunctionKind::ParseTimestamp => {
            invert_temporal(call, op, constant, true, env)
        }
        FunctionKind::FormatDate | FunctionKind::FormatTime | FunctionKind::FormatTimestamp => {
            invert_temporal(call, op, constant, false, env)
        }
        FunctionKind::TimestampCreate => invert_timestamp_create(call, op, constant, env),
        _ => Ok(None),
    }
}

/// The comparison this inversion failure statically decides to.
fn inversion_failure_sentinel(op: CompareOp) -> Criteria {
    match op {
        CompareOp::Eq => false_criteria(),
        //The literal matches no value of the source type, so every value
        //differs from it
        CompareOp::Ne => true_criteria(),
        _ => unknown_criteria(),
    }
}

fn invert_convert(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
    to: SqlType,
) -> Result<Option<Criteria>, RewriterError> {
    if call.args.len() != 1 {
        return Ok(None);
    }
    let inner = &call.args[0];
    let source_type = inner.ty();
    //Ordering survives the move only for numeric-to-numeric conversions,
    //which are monotone
    if !op.is_equality() && !(source_type.is_numeric() && to.is_numeric()) {
        return Ok(None);
    }
    let value = match &constant.value {
        Some(v) => v,
        None => return Ok(None),
    };

    let inverted = match value.convert(source_type) {
        Ok(v) => v,
        Err(e) => {
            let e = EvaluatorError::from(e);
            if e.is_conversion_failure() && op.is_equality() {
                return Ok(Some(inversion_failure_sentinel(op)));
            }
            return Ok(None);
        }
    };
    //The literal must survive the round trip, otherwise no source value
    //can produce it
    match inverted.convert(to) {
        Ok(round_tripped) if round_tripped == *value => {}
        _ => {
            if op.is_equality() {
                return Ok(Some(inversion_failure_sentinel(op)));
            }
            return Ok(None);
        }
    }

    Ok(Some(Criteria::compare(
        inner.clone(),
        op,
        Expression::constant(inverted),
    )))
}

/// `parseinteger(x) = 5` becomes `x = '5'`; formatting the literal always
/// round-trips, so no sentinel case exists here.
fn invert_parse_numeric(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
    numeric: SqlType,
) -> Result<Option<Criteria>, RewriterError> {
    if !op.is_equality() || call.args.len() != 1 {
        return Ok(None);
    }
    let formatted = match (&constant.value, numeric) {
        (Some(SqlValue::Integer(i)), SqlType::Integer) => i.to_string(),
        (Some(SqlValue::Double(d)), SqlType::Double) => {
            crate::engine::objects::format_double(*d)
        }
        (_, _) => return Ok(None),
    };
    Ok(Some(Criteria::compare(
        call.args[0].clone(),
        op,
        Expression::Constant(Constant::text(&formatted)),
    )))
}

/// `formatinteger(x) = '012'` can only hold when the literal is the canonical
/// format of some value; '012' is not, so the equality folds to FALSE.
fn invert_format_numeric(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
    numeric: SqlType,
) -> Result<Option<Criteria>, RewriterError> {
    if !op.is_equality() || call.args.len() != 1 {
        return Ok(None);
    }
    let text = match &constant.value {
        Some(SqlValue::Text(t)) => t,
        _ => return Ok(None),
    };
    let (parsed, canonical) = match numeric {
        SqlType::Integer => match text.parse::<i64>() {
            Ok(i) => (SqlValue::Integer(i), i.to_string()),
            Err(_) => return Ok(Some(inversion_failure_sentinel(op))),
        },
        SqlType::Double => match text.parse::<f64>() {
            Ok(d) => (
                SqlValue::Double(d),
                crate::engine::objects::format_double(d),
            ),
            Err(_) => return Ok(Some(inversion_failure_sentinel(op))),
        },
        _ => return Ok(None),
    };
    if canonical != *text {
        return Ok(Some(inversion_failure_sentinel(op)));
    }
    Ok(Some(Criteria::compare(
        call.args[0].clone(),
        op,
        Expression::constant(parsed),
    )))
}

/// Shared inversion for the temporal parse/format pairs: the function moves
/// to the constant side as its inverse and evaluates immediately. A bad
/// format pattern is a validator error; an unparsable or non-round-tripping
/// literal folds to the sentinel.
fn invert_temporal(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
    parsing: bool,
    env: &RewriteEnv,
) -> Result<Option<Criteria>, RewriterError> {
    if !op.is_equality() || call.args.len() != 2 {
        return Ok(None);
    }
    let format = match call.args[1].as_constant() {
        Some(c) => match &c.value {
            Some(SqlValue::Text(t)) => t.clone(),
            _ => return Ok(None),
        },
        None => return Ok(None),
    };
    //A malformed pattern is always surfaced, never absorbed
    crate::engine::evaluator::validate_temporal_format(&format)?;

    let (inverse_kind, inverse_returns) = match (&call.descriptor.kind, parsing) {
        (FunctionKind::ParseDate, true) => (FunctionKind::FormatDate, SqlType::Text),
        (FunctionKind::ParseTime, true) => (FunctionKind::FormatTime, SqlType::Text),
        (FunctionKind::ParseTimestamp, true) => (FunctionKind::FormatTimestamp, SqlType::Text),
        (FunctionKind::FormatDate, false) => (FunctionKind::ParseDate, SqlType::Date),
        (FunctionKind::FormatTime, false) => (FunctionKind::ParseTime, SqlType::Time),
        (FunctionKind::FormatTimestamp, false) => {
            (FunctionKind::ParseTimestamp, SqlType::Timestamp)
        }
        (_, _) => return Ok(None),
    };

    let inverse = Expression::Function(FunctionCall::new(
        inverse_kind,
        inverse_returns,
        vec![
            Expression::Constant(constant.clone()),
            Expression::Constant(Constant::text(&format)),
        ],
    ));
    let inverted = match Evaluator::evaluate(&inverse, env.context) {
        Ok(c) => c,
        Err(e) if e.is_conversion_failure() => {
            return Ok(Some(inversion_failure_sentinel(op)));
        }
        Err(e) => return Err(RewriterError::Evaluation(e)),
    };

    //Round trip the literal through the original function
    let round_trip = Expression::Function(FunctionCall::new(
        call.descriptor.kind.clone(),
        call.descriptor.returns,
        vec![
            Expression::Constant(inverted.clone()),
            Expression::Constant(Constant::text(&format)),
        ],
    ));
    match Evaluator::evaluate(&round_trip, env.context) {
        Ok(c) if c == *constant => {}
        Ok(_) => return Ok(Some(inversion_failure_sentinel(op))),
        Err(e) if e.is_conversion_failure() => {
            return Ok(Some(inversion_failure_sentinel(op)));
        }
        Err(e) => return Err(RewriterError::Evaluation(e)),
    }

    Ok(Some(Criteria::compare(
        call.args[0].clone(),
        op,
        Expression::Constant(inverted),
    )))
}

/// `timestampcreate(d, t) = ts` splits into a date-part and a time-part
/// equality when both operands are directly addressable columns.
fn invert_timestamp_create(
    call: &FunctionCall,
    op: CompareOp,
    constant: &Constant,
    env: &RewriteEnv,
) -> Result<Option<Criteria>, RewriterError> {
    if !op.is_equality() || call.args.len() != 2 {
        return Ok(None);
    }
    let (date_el, time_el) = match (&call.args[0], &call.args[1]) {
        (d @ Expression::Element(_), t @ Expression::Element(_)) => (d, t),
        (_, _) => return Ok(None),
    };
    let ts = match &constant.value {
        Some(SqlValue::Timestamp(ts)) => *ts,
        _ => return Ok(None),
    };

    let date_part = Criteria::compare(
        date_el.clone(),
        CompareOp::Eq,
        Expression::constant(SqlValue::Date(ts.date())),
    );
    let time_part = Criteria::compare(
        time_el.clone(),
        CompareOp::Eq,
        Expression::constant(SqlValue::Time(ts.time())),
    );
    let combined = match op {
        CompareOp::Eq => Criteria::and(vec![date_part, time_part]),
        _ => Criteria::or(vec![
            Criteria::Not(Box::new(date_part)),
            Criteria::Not(Box::new(time_part)),
        ]),
    };
    Ok(Some(simplify_criteria(combined, env)?))
}

/// BETWEEN expands into its comparison pair and each half simplifies on its
/// own.
fn simplify_between(
    between: BetweenCriteria,
    env: &RewriteEnv,
) -> Result<Criteria, RewriterError> {
    let expanded = if between.negated {
        Criteria::or(vec![
            Criteria::compare(between.expr.clone(), CompareOp::Lt, between.low),
            Criteria::compare(between.expr, CompareOp::Gt, between.high),
        ])
    } else {
        Criteria::and(vec![
            Criteria::compare(between.expr.clone(), CompareOp::Ge, between.low),
            Criteria::compare(between.expr, CompareOp::Le, between.high),
        ])
    };
    simplify_criteria(expanded, env)
}

fn simplify_match(matcher: MatchCriteria, env: &RewriteEnv) -> Result<Criteria, RewriterError> {
    let expr = simplify_expression(matcher.expr, env)?;
    let pattern = simplify_expression(matcher.pattern, env)?;
    let mut escape = matcher.escape;

    let pattern_constant = match pattern.as_constant() {
        Some(c) => c.clone(),
        None => {
            return Ok(Criteria::Match(MatchCriteria {
                expr,
                pattern,
                escape,
                negated: matcher.negated,
            }));
        }
    };

    //A null pattern can never decide the match
    if pattern_constant.is_null() {
        return Ok(unknown_criteria());
    }

    if expr.is_constant() {
        let folded = Evaluator::evaluate_criteria(
            &Criteria::Match(MatchCriteria {
                expr,
                pattern,
                escape,
                negated: matcher.negated,
            }),
            env.context,
        )?;
        return Ok(ternary_to_sentinel(folded));
    }

    let text = match &pattern_constant.value {
        Some(SqlValue::Text(t)) => t.clone(),
        _ => {
            return Ok(Criteria::Match(MatchCriteria {
                expr,
                pattern,
                escape,
                negated: matcher.negated,
            }));
        }
    };

    //An escape character that never occurs does nothing
    if let Some(e) = escape {
        if !text.contains(e) {
            escape = None;
        }
    }

    let mut literal = String::new();
    let mut has_wildcard = false;
    let mut all_match_any = !text.is_empty();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            match chars.next() {
                Some(next) => {
                    literal.push(next);
                    all_match_any = false;
                }
                None => {
                    //A trailing escape matches nothing we can decide here
                    return Ok(Criteria::Match(MatchCriteria {
                        expr,
                        pattern,
                        escape,
                        negated: matcher.negated,
                    }));
                }
            }
        } else if c == '%' {
            has_wildcard = true;
        } else if c == '_' {
            has_wildcard = true;
            all_match_any = false;
        } else {
            literal.push(c);
            all_match_any = false;
        }
    }

    if all_match_any {
        return Ok(if matcher.negated {
            false_criteria()
        } else {
            true_criteria()
        });
    }

    if !has_wildcard {
        let op = if matcher.negated {
            CompareOp::Ne
        } else {
            CompareOp::Eq
        };
        return Ok(Criteria::compare(
            expr,
            op,
            Expression::Constant(Constant::text(&literal)),
        ));
    }

    Ok(Criteria::Match(MatchCriteria {
        expr,
        pattern: Expression::Constant(Constant::text(&text)),
        escape,
        negated: matcher.negated,
    }))
}

fn simplify_set(set: SetCriteria, env: &RewriteEnv) -> Result<Criteria, RewriterError> {
    let expr = simplify_expression(set.expr, env)?;

    //null IN (...) is unknown no matter what the list holds
    if expr.is_null_constant() {
        return Ok(unknown_criteria());
    }

    let mut values: Vec<Expression> = vec![];
    let mut saw_null = false;
    for value in set.values {
        let value = simplify_expression(value, env)?;
        if value.is_null_constant() {
            saw_null = true;
            continue;
        }
        //Duplicates drop, first occurrence wins
        if !values.contains(&value) {
            values.push(value);
        }
    }

    if expr.is_constant() && values.iter().all(Expression::is_constant) {
        let folded = Evaluator::evaluate_criteria(
            &Criteria::SetCriteria(SetCriteria {
                expr,
                values,
                negated: set.negated,
            }),
            env.context,
        );
        return match folded {
            //A discarded null candidate turns a definite miss into unknown
            Ok(t) => {
                let miss = if set.negated { Ternary::True } else { Ternary::False };
                Ok(ternary_to_sentinel(if saw_null && t == miss {
                    Ternary::Unknown
                } else {
                    t
                }))
            }
            Err(e) => Err(RewriterError::Evaluation(e)),
        };
    }

    if values.is_empty() {
        if saw_null {
            //The only candidates were null, so no row ever decides
            return Ok(unknown_criteria());
        }
        return Ok(if set.negated {
            true_criteria()
        } else {
            false_criteria()
        });
    }

    if saw_null {
        //The null candidate still forces unknown instead of false on a
        //non-match, so it stays in canonical tail position
        values.push(Expression::Constant(Constant::null(expr.ty())));
        return Ok(Criteria::SetCriteria(SetCriteria {
            expr,
            values,
            negated: set.negated,
        }));
    }

    if values.len() == 1 {
        let op = if set.negated {
            CompareOp::Ne
        } else {
            CompareOp::Eq
        };
        let single = values.remove(0);
        return simplify_criteria(Criteria::compare(expr, op, single), env);
    }

    Ok(Criteria::SetCriteria(SetCriteria {
        expr,
        values,
        negated: set.negated,
    }))
}

fn simplify_is_null(is_null: IsNullCriteria, env: &RewriteEnv) -> Result<Criteria, RewriterError> {
    let expr = simplify_expression(is_null.expr, env)?;
    if let Some(c) = expr.as_constant() {
        return Ok(if c.is_null() != is_null.negated {
            true_criteria()
        } else {
            false_criteria()
        });
    }
    Ok(Criteria::IsNull(IsNullCriteria {
        expr,
        negated: is_null.negated,
    }))
}

fn simplify_subquery_compare(
    compare: SubqueryCompareCriteria,
    env: &RewriteEnv,
) -> Result<Criteria, RewriterError> {
    let expr = simplify_expression(compare.expr, env)?;

    //A provably unknown scalar side decides without running the subquery
    if expr.is_null_constant() {
        return Ok(unknown_criteria());
    }

    let quantifier = match compare.quantifier {
        //ANY is a synonym; SOME is canonical
        Quantifier::Any => Quantifier::Some,
        q => q,
    };
    let subquery = command::rewrite_query_command(*compare.subquery, env)?;
    Ok(Criteria::SubqueryCompare(SubqueryCompareCriteria {
        expr,
        op: compare.op,
        quantifier,
        subquery: Box::new(subquery),
    }))
}

/// HAS CRITERIA resolves to a plain boolean at rewrite time: did the user's
/// command touch every named column?
fn resolve_has_criteria(has: HasCriteria, env: &RewriteEnv) -> Result<Criteria, RewriterError> {
    let procedure = env
        .procedure
        .ok_or(RewriterError::ProcedureOnly("HAS CRITERIA"))?;
    let satisfied = has
        .elements
        .iter()
        .all(|name| procedure.supplied.contains(&name.to_uppercase()));
    Ok(if satisfied {
        true_criteria()
    } else {
        false_criteria()
    })
}

/// TRANSLATE CRITERIA substitutes the user's own WHERE clause, restricted to
/// the named columns, mapping each virtual column through the WITH clause
/// when one is given.
fn resolve_translate_criteria(
    translate: TranslateCriteria,
    env: &RewriteEnv,
) -> Result<Criteria, RewriterError> {
    let procedure = env
        .procedure
        .ok_or(RewriterError::ProcedureOnly("TRANSLATE CRITERIA"))?;

    let user_criteria = match &procedure.user_criteria {
        Some(c) => c.clone(),
        None => return Ok(true_criteria()),
    };

    let restrict: Option<Vec<String>> = if translate.elements.is_empty() {
        None
    } else {
        Some(
            translate
                .elements
                .iter()
                .map(|e| e.to_uppercase())
                .collect(),
        )
    };

    let mut translated = vec![];
    for conjunct in user_criteria.conjuncts() {
        if let Some(allowed) = &restrict {
            let referenced = referenced_columns(&conjunct);
            if !referenced.iter().all(|c| allowed.contains(c)) {
                continue;
            }
        }
        if translate.like && !matches!(conjunct, Criteria::Match(_)) {
            //The LIKE variant demands pattern-compatible user predicates
            return Ok(false_criteria());
        }
        let mut translations_applied = conjunct;
        for (column, replacement) in &translate.translations {
            let replacement = simplify_expression(replacement.clone(), env)?;
            translations_applied =
                substitute_column(translations_applied, column, &replacement);
        }
        translated.push(translations_applied);
    }

    if translated.is_empty() {
        return Ok(true_criteria());
    }
    simplify_criteria(Criteria::and(translated), env)
}

pub(crate) fn referenced_columns(criteria: &Criteria) -> Vec<String> {
    let mut columns = vec![];
    collect_columns_criteria(criteria, &mut columns);
    columns
}

fn collect_columns_criteria(criteria: &Criteria, columns: &mut Vec<String>) {
    match criteria {
        Criteria::Compare(c) => {
            collect_columns_expression(&c.left, columns);
            collect_columns_expression(&c.right, columns);
        }
        Criteria::Compound(c) => {
            for part in &c.parts {
                collect_columns_criteria(part, columns);
            }
        }
        Criteria::Not(inner) => collect_columns_criteria(inner, columns),
        Criteria::Between(b) => {
            collect_columns_expression(&b.expr, columns);
            collect_columns_expression(&b.low, columns);
            collect_columns_expression(&b.high, columns);
        }
        Criteria::Match(m) => {
            collect_columns_expression(&m.expr, columns);
            collect_columns_expression(&m.pattern, columns);
        }
        Criteria::SetCriteria(s) => {
            collect_columns_expression(&s.expr, columns);
            for value in &s.values {
                collect_columns_expression(value, columns);
            }
        }
        Criteria::IsNull(n) => collect_columns_expression(&n.expr, columns),
        Criteria::SubqueryCompare(s) => collect_columns_expression(&s.expr, columns),
        Criteria::Exists(_)
        | Criteria::HasCriteria(_)
        | Criteria::TranslateCriteria(_) => {}
    }
}

fn collect_columns_expression(expr: &Expression, columns: &mut Vec<String>) {
    match expr {
        Expression::Element(e) => columns.push(e.name.to_uppercase()),
        Expression::Function(f) => {
            for arg in &f.args {
                collect_columns_expression(arg, columns);
            }
        }
        Expression::Case(c) => {
            collect_columns_expression(&c.operand, columns);
            for (when, then) in &c.whens {
                collect_columns_expression(when, columns);
                collect_columns_expression(then, columns);
            }
            if let Some(e) = &c.else_expr {
                collect_columns_expression(e, columns);
            }
        }
        Expression::SearchedCase(c) => {
            for (when, then) in &c.whens {
                collect_columns_criteria(when, columns);
                collect_columns_expression(then, columns);
            }
            if let Some(e) = &c.else_expr {
                collect_columns_expression(e, columns);
            }
        }
        Expression::Aggregate(a) => {
            if let Some(arg) = &a.arg {
                collect_columns_expression(arg, columns);
            }
        }
        Expression::Constant(_) | Expression::Reference(_) | Expression::ScalarSubquery(_) => {}
    }
}

/// Replaces every reference to the named virtual column with the mapped
/// expression, case-insensitively by column name.
fn substitute_column(criteria: Criteria, column: &str, replacement: &Expression) -> Criteria {
    map_criteria_expressions(criteria, &|expr| match &expr {
        Expression::Element(e) if e.name.eq_ignore_ascii_case(column) => replacement.clone(),
        _ => expr,
    })
}

fn map_criteria_expressions(
    criteria: Criteria,
    map: &impl Fn(Expression) -> Expression,
) -> Criteria {
    match criteria {
        Criteria::Compare(c) => Criteria::Compare(CompareCriteria {
            op: c.op,
            left: map_expression(c.left, map),
            right: map_expression(c.right, map),
        }),
        Criteria::Compound(c) => Criteria::Compound(CompoundCriteria {
            op: c.op,
            parts: c
                .parts
                .into_iter()
                .map(|p| map_criteria_expressions(p, map))
                .collect(),
        }),
        Criteria::Not(inner) => {
            Criteria::Not(Box::new(map_criteria_expressions(*inner, map)))
        }
        Criteria::Between(b) => Criteria::Between(BetweenCriteria {
            expr: map_expression(b.expr, map),
            negated: b.negated,
            low: map_expression(b.low, map),
            high: map_expression(b.high, map),
        }),
        Criteria::Match(m) => Criteria::Match(MatchCriteria {
            expr: map_expression(m.expr, map),
            pattern: map_expression(m.pattern, map),
            escape: m.escape,
            negated: m.negated,
        }),
        Criteria::SetCriteria(s) => Criteria::SetCriteria(SetCriteria {
            expr: map_expression(s.expr, map),
            values: s.values.into_iter().map(|v| map_expression(v, map)).collect(),
            negated: s.negated,
        }),
        Criteria::IsNull(n) => Criteria::IsNull(IsNullCriteria {
            expr: map_expression(n.expr, map),
            negated: n.negated,
        }),
        other => other,
    }
}

fn map_expression(expr: Expression, map: &impl Fn(Expression) -> Expression) -> Expression {
    let mapped = map(expr);
    match mapped {
        Expression::Function(mut f) => {
            f.args = f.args.into_iter().map(|a| map_expression(a, map)).collect();
            Expression::Function(f)
        }
        other => other,
    }
}
