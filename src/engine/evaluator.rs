//! Compile time evaluation of fully constant expressions and criteria.
//!
//! The simplifier hands subtrees here once every leaf has folded to a
//! constant; nothing in this module ever touches live data. Errors carry the
//! distinction the caller needs: a conversion or format failure can mean
//! "no value of the target type produces this literal" in a comparison
//! context, while everything else is a hard validator error.

use super::objects::{
    AggregateCall, CaseExpression, CommandContext, CompareOp, CompoundOp, Constant, Criteria,
    Expression, FunctionCall, FunctionKind, SearchedCaseExpression, SqlType, SqlValue,
    SqlValueError,
};
use crate::constants::Ternary;
use chrono::format::{parse as chrono_parse, Item, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write as _;
use thiserror::Error;

pub struct Evaluator {}

impl Evaluator {
    /// Evaluates an expression whose every leaf is a constant. Anything else
    /// is an `EvaluatorError::NotConstant`.
    pub fn evaluate(
        expr: &Expression,
        context: &CommandContext,
    ) -> Result<Constant, EvaluatorError> {
        match expr {
            Expression::Constant(c) => Ok(c.clone()),
            Expression::Function(call) => Evaluator::evaluate_function(call, context),
            Expression::Case(c) => Evaluator::evaluate_case(c, context),
            Expression::SearchedCase(c) => Evaluator::evaluate_searched_case(c, context),
            Expression::Element(e) => Err(EvaluatorError::NotConstant(e.name.clone())),
            Expression::Reference(_) => Err(EvaluatorError::NotConstant("?".to_string())),
            Expression::Aggregate(AggregateCall { .. }) => {
                Err(EvaluatorError::NotConstant("aggregate".to_string()))
            }
            Expression::ScalarSubquery(_) => {
                Err(EvaluatorError::NotConstant("subquery".to_string()))
            }
        }
    }

    /// Evaluates a fully constant criteria to its three valued result.
    pub fn evaluate_criteria(
        criteria: &Criteria,
        context: &CommandContext,
    ) -> Result<Ternary, EvaluatorError> {
        match criteria {
            Criteria::Compare(c) => {
                let left = Evaluator::evaluate(&c.left, context)?;
                let right = Evaluator::evaluate(&c.right, context)?;
                match (&left.value, &right.value) {
                    (Some(l), Some(r)) => {
                        Ok(Ternary::from(Evaluator::compare_values(c.op, l, r)?))
                    }
                    (_, _) => Ok(Ternary::Unknown),
                }
            }
            Criteria::Compound(c) => {
                let (mut acc, absorbing) = match c.op {
                    CompoundOp::And => (Ternary::True, Ternary::False),
                    CompoundOp::Or => (Ternary::False, Ternary::True),
                };
                for part in &c.parts {
                    let value = Evaluator::evaluate_criteria(part, context)?;
                    acc = match c.op {
                        CompoundOp::And => acc.and(value),
                        CompoundOp::Or => acc.or(value),
                    };
                    if acc == absorbing {
                        break;
                    }
                }
                Ok(acc)
            }
            Criteria::Not(inner) => Ok(Evaluator::evaluate_criteria(inner, context)?.not()),
            Criteria::Between(b) => {
                let ge = Criteria::compare(b.expr.clone(), CompareOp::Ge, b.low.clone());
                let le = Criteria::compare(b.expr.clone(), CompareOp::Le, b.high.clone());
                let result = Evaluator::evaluate_criteria(&ge, context)?
                    .and(Evaluator::evaluate_criteria(&le, context)?);
                Ok(if b.negated { result.not() } else { result })
            }
            Criteria::Match(m) => {
                let value = Evaluator::evaluate(&m.expr, context)?;
                let pattern = Evaluator::evaluate(&m.pattern, context)?;
                match (&value.value, &pattern.value) {
                    (Some(SqlValue::Text(v)), Some(SqlValue::Text(p))) => {
                        let matched = like_match(v, p, m.escape)?;
                        Ok(Ternary::from(matched != m.negated))
                    }
                    (None, _) | (_, None) => Ok(Ternary::Unknown),
                    (_, _) => Err(EvaluatorError::InvalidArguments("like".to_string())),
                }
            }
            Criteria::SetCriteria(s) => {
                let value = Evaluator::evaluate(&s.expr, context)?;
                let left = match &value.value {
                    Some(v) => v,
                    None => return Ok(Ternary::Unknown),
                };
                let mut saw_null = false;
                let mut found = false;
                for candidate in &s.values {
                    let candidate = Evaluator::evaluate(candidate, context)?;
                    match &candidate.value {
                        None => saw_null = true,
                        Some(v) => {
                            if Evaluator::compare_values(CompareOp::Eq, left, v)? {
                                found = true;
                                break;
                            }
                        }
                    }
                }
                let result = if found {
                    Ternary::True
                } else if saw_null {
                    Ternary::Unknown
                } else {
                    Ternary::False
                };
                Ok(if s.negated { result.not() } else { result })
            }
            Criteria::IsNull(n) => {
                let value = Evaluator::evaluate(&n.expr, context)?;
                Ok(Ternary::from(value.is_null() != n.negated))
            }
            Criteria::SubqueryCompare(_) | Criteria::Exists(_) => {
                Err(EvaluatorError::NotConstant("subquery".to_string()))
            }
            Criteria::HasCriteria(_) | Criteria::TranslateCriteria(_) => {
                Err(EvaluatorError::NotConstant("procedural criteria".to_string()))
            }
        }
    }

    /// Compares two non-null values, promoting across the numeric types.
    pub fn compare_values(
        op: CompareOp,
        left: &SqlValue,
        right: &SqlValue,
    ) -> Result<bool, EvaluatorError> {
        let ordering = match (left, right) {
            (SqlValue::Integer(l), SqlValue::Double(r)) => (*l as f64).partial_cmp(r),
            (SqlValue::Double(l), SqlValue::Integer(r)) => l.partial_cmp(&(*r as f64)),
            (l, r) if l.sql_type() == r.sql_type() => l.partial_cmp(r),
            (_, _) => None,
        };
        let ordering = ordering.ok_or_else(|| {
            EvaluatorError::InvalidArguments(format!("{} {} {}", left, op, right))
        })?;
        Ok(match op {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Ne => !ordering.is_eq(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Le => ordering.is_le(),
            CompareOp::Ge => ordering.is_ge(),
        })
    }

    fn evaluate_function(
        call: &FunctionCall,
        context: &CommandContext,
    ) -> Result<Constant, EvaluatorError> {
        let mut args = vec![];
        for arg in &call.args {
            args.push(Evaluator::evaluate(arg, context)?);
        }

        let kind = &call.descriptor.kind;
        let returns = call.descriptor.returns;
        if kind.propagates_nulls() && args.iter().any(Constant::is_null) {
            return Ok(Constant::null(returns));
        }

        match kind {
            FunctionKind::Add | FunctionKind::Subtract | FunctionKind::Multiply => {
                arithmetic(kind, &args)
            }
            FunctionKind::Divide => divide(&args),
            FunctionKind::Negate => match value(&args, 0)? {
                SqlValue::Integer(i) => i
                    .checked_neg()
                    .map(|i| Constant::new(SqlValue::Integer(i)))
                    .ok_or_else(|| EvaluatorError::NumericOverflow(format!("-({})", i))),
                SqlValue::Double(d) => Ok(Constant::new(SqlValue::Double(-d))),
                other => Err(EvaluatorError::InvalidArguments(other.to_string())),
            },
            FunctionKind::Concat => {
                let left = text_value(&args, 0)?;
                let right = text_value(&args, 1)?;
                Ok(Constant::new(SqlValue::Text(format!("{}{}", left, right))))
            }
            FunctionKind::Convert(to) => {
                let converted = value(&args, 0)?.convert(*to)?;
                Ok(Constant::new(converted))
            }
            FunctionKind::ParseDate => {
                let date: NaiveDate = parse_temporal(text_value(&args, 0)?, text_value(&args, 1)?)?;
                Ok(Constant::new(SqlValue::Date(date)))
            }
            FunctionKind::ParseTime => {
                let time: NaiveTime = parse_temporal(text_value(&args, 0)?, text_value(&args, 1)?)?;
                Ok(Constant::new(SqlValue::Time(time)))
            }
            FunctionKind::ParseTimestamp => {
                let ts: NaiveDateTime =
                    parse_temporal(text_value(&args, 0)?, text_value(&args, 1)?)?;
                Ok(Constant::new(SqlValue::Timestamp(ts)))
            }
            FunctionKind::FormatDate | FunctionKind::FormatTime | FunctionKind::FormatTimestamp => {
                let formatted = format_temporal(value(&args, 0)?, text_value(&args, 1)?)?;
                Ok(Constant::new(SqlValue::Text(formatted)))
            }
            FunctionKind::ParseInteger => {
                let text = text_value(&args, 0)?;
                text.parse::<i64>()
                    .map(|i| Constant::new(SqlValue::Integer(i)))
                    .map_err(|_| EvaluatorError::InvalidFormat(text.to_string()))
            }
            FunctionKind::FormatInteger => match value(&args, 0)? {
                SqlValue::Integer(i) => Ok(Constant::new(SqlValue::Text(i.to_string()))),
                other => Err(EvaluatorError::InvalidArguments(other.to_string())),
            },
            FunctionKind::ParseDouble => {
                let text = text_value(&args, 0)?;
                text.parse::<f64>()
                    .map(|d| Constant::new(SqlValue::Double(d)))
                    .map_err(|_| EvaluatorError::InvalidFormat(text.to_string()))
            }
            FunctionKind::FormatDouble => match value(&args, 0)? {
                SqlValue::Double(d) => Ok(Constant::new(SqlValue::Text(
                    super::objects::format_double(*d),
                ))),
                SqlValue::Integer(i) => Ok(Constant::new(SqlValue::Text(
                    super::objects::format_double(*i as f64),
                ))),
                other => Err(EvaluatorError::InvalidArguments(other.to_string())),
            },
            FunctionKind::TimestampCreate => match (value(&args, 0)?, value(&args, 1)?) {
                (SqlValue::Date(d), SqlValue::Time(t)) => {
                    Ok(Constant::new(SqlValue::Timestamp(NaiveDateTime::new(*d, *t))))
                }
                (_, _) => Err(EvaluatorError::InvalidArguments(
                    "timestampcreate".to_string(),
                )),
            },
            FunctionKind::Coalesce | FunctionKind::IfNull => Ok(args
                .iter()
                .find(|a| !a.is_null())
                .cloned()
                .unwrap_or_else(|| Constant::null(returns))),
            FunctionKind::NullIf => {
                let first = arg(&args, 0)?;
                let second = arg(&args, 1)?;
                match (&first.value, &second.value) {
                    (Some(l), Some(r)) if Evaluator::compare_values(CompareOp::Eq, l, r)? => {
                        Ok(Constant::null(returns))
                    }
                    (_, _) => Ok(first.clone()),
                }
            }
            FunctionKind::DecodeString | FunctionKind::DecodeInteger => decode(&args, returns),
            FunctionKind::Concat2 => {
                let first = arg(&args, 0)?;
                let second = arg(&args, 1)?;
                if first.is_null() && second.is_null() {
                    return Ok(Constant::null(returns));
                }
                let mut out = String::new();
                for part in [first, second] {
                    if let Some(SqlValue::Text(t)) = &part.value {
                        let _ = write!(out, "{}", t);
                    }
                }
                Ok(Constant::new(SqlValue::Text(out)))
            }
            FunctionKind::Upper => Ok(Constant::new(SqlValue::Text(
                text_value(&args, 0)?.to_uppercase(),
            ))),
            FunctionKind::Lower => Ok(Constant::new(SqlValue::Text(
                text_value(&args, 0)?.to_lowercase(),
            ))),
            FunctionKind::Length => Ok(Constant::new(SqlValue::Integer(
                text_value(&args, 0)?.chars().count() as i64,
            ))),
            FunctionKind::Env => {
                let key = text_value(&args, 0)?;
                match context.property(key) {
                    Some(v) => Ok(Constant::new(SqlValue::Text(v.clone()))),
                    None => Ok(Constant::null(SqlType::Text)),
                }
            }
            FunctionKind::SessionId => Ok(Constant::new(SqlValue::Text(
                context.session_id.to_string(),
            ))),
            FunctionKind::Now => Ok(Constant::new(SqlValue::Timestamp(context.now))),
        }
    }

    fn evaluate_case(
        case: &CaseExpression,
        context: &CommandContext,
    ) -> Result<Constant, EvaluatorError> {
        let operand = Evaluator::evaluate(&case.operand, context)?;
        if let Some(operand) = &operand.value {
            for (when, then) in &case.whens {
                let when = Evaluator::evaluate(when, context)?;
                if let Some(when) = &when.value {
                    if Evaluator::compare_values(CompareOp::Eq, operand, when)? {
                        return Evaluator::evaluate(then, context);
                    }
                }
            }
        }
        match &case.else_expr {
            Some(e) => Evaluator::evaluate(e, context),
            None => Ok(Constant::null(case.result_type())),
        }
    }

    fn evaluate_searched_case(
        case: &SearchedCaseExpression,
        context: &CommandContext,
    ) -> Result<Constant, EvaluatorError> {
        for (when, then) in &case.whens {
            if Evaluator::evaluate_criteria(when, context)?.is_true() {
                return Evaluator::evaluate(then, context);
            }
        }
        match &case.else_expr {
            Some(e) => Evaluator::evaluate(e, context),
            None => Ok(Constant::null(case.result_type())),
        }
    }
}

fn arg<'a>(args: &'a [Constant], index: usize) -> Result<&'a Constant, EvaluatorError> {
    args.get(index)
        .ok_or_else(|| EvaluatorError::InvalidArguments(format!("missing argument {}", index)))
}

fn value<'a>(args: &'a [Constant], index: usize) -> Result<&'a SqlValue, EvaluatorError> {
    arg(args, index)?
        .value
        .as_ref()
        .ok_or_else(|| EvaluatorError::InvalidArguments("unexpected null".to_string()))
}

fn text_value<'a>(args: &'a [Constant], index: usize) -> Result<&'a str, EvaluatorError> {
    match value(args, index)? {
        SqlValue::Text(t) => Ok(t),
        other => Err(EvaluatorError::InvalidArguments(other.to_string())),
    }
}

fn arithmetic(kind: &FunctionKind, args: &[Constant]) -> Result<Constant, EvaluatorError> {
    let left = value(args, 0)?;
    let right = value(args, 1)?;
    match (left, right) {
        (SqlValue::Integer(l), SqlValue::Integer(r)) => {
            let result = match kind {
                FunctionKind::Add => l.checked_add(*r),
                FunctionKind::Subtract => l.checked_sub(*r),
                FunctionKind::Multiply => l.checked_mul(*r),
                _ => None,
            };
            result
                .map(|i| Constant::new(SqlValue::Integer(i)))
                .ok_or_else(|| {
                    EvaluatorError::NumericOverflow(format!(
                        "{} {} {}",
                        l,
                        kind.canonical_name(),
                        r
                    ))
                })
        }
        (_, _) => {
            let l = as_double(left)?;
            let r = as_double(right)?;
            let result = match kind {
                FunctionKind::Add => l + r,
                FunctionKind::Subtract => l - r,
                FunctionKind::Multiply => l * r,
                _ => return Err(EvaluatorError::InvalidArguments(kind.canonical_name().to_string())),
            };
            if result.is_finite() {
                Ok(Constant::new(SqlValue::Double(result)))
            } else {
                Err(EvaluatorError::NumericOverflow(format!(
                    "{} {} {}",
                    l,
                    kind.canonical_name(),
                    r
                )))
            }
        }
    }
}

fn divide(args: &[Constant]) -> Result<Constant, EvaluatorError> {
    let left = value(args, 0)?;
    let right = value(args, 1)?;
    match (left, right) {
        (SqlValue::Integer(l), SqlValue::Integer(r)) => {
            if *r == 0 {
                return Err(EvaluatorError::DivisionByZero);
            }
            l.checked_div(*r)
                .map(|i| Constant::new(SqlValue::Integer(i)))
                .ok_or_else(|| EvaluatorError::NumericOverflow(format!("{} / {}", l, r)))
        }
        (_, _) => {
            let l = as_double(left)?;
            let r = as_double(right)?;
            if r == 0.0 {
                return Err(EvaluatorError::DivisionByZero);
            }
            Ok(Constant::new(SqlValue::Double(l / r)))
        }
    }
}

fn as_double(value: &SqlValue) -> Result<f64, EvaluatorError> {
    match value {
        SqlValue::Integer(i) => Ok(*i as f64),
        SqlValue::Double(d) => Ok(*d),
        other => Err(EvaluatorError::InvalidArguments(other.to_string())),
    }
}

fn decode(args: &[Constant], returns: SqlType) -> Result<Constant, EvaluatorError> {
    let input = arg(args, 0)?;
    let pairs = &args[1..];
    let mut i = 0;
    while i + 1 < pairs.len() {
        let matches = match (&pairs[i].value, &input.value) {
            //The reserved 'null' token matches a null input
            (Some(SqlValue::Text(t)), None) if t == "null" => true,
            (Some(m), Some(v)) => Evaluator::compare_values(CompareOp::Eq, v, m)?,
            (_, _) => false,
        };
        if matches {
            return Ok(pairs[i + 1].clone());
        }
        i += 2;
    }
    //A trailing unpaired entry is the default
    if i < pairs.len() {
        return Ok(pairs[i].clone());
    }
    match &input.value {
        Some(v) => Ok(Constant::new(v.convert(returns)?)),
        None => Ok(Constant::null(returns)),
    }
}

/// Checks a date/time format pattern without evaluating anything, so the
/// rewriter can distinguish a malformed pattern (a validator error) from an
/// unparsable value (a statically decidable comparison).
pub fn validate_temporal_format(fmt: &str) -> Result<(), EvaluatorError> {
    format_items(fmt).map(|_| ())
}

/// Validated chrono format items; a bad pattern is an invalid format error,
/// never a panic inside the formatter.
fn format_items(fmt: &str) -> Result<Vec<Item<'_>>, EvaluatorError> {
    let items: Vec<Item> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(EvaluatorError::InvalidFormat(fmt.to_string()));
    }
    Ok(items)
}

trait FromParsed: Sized {
    fn from_parsed(parsed: &Parsed) -> Option<Self>;
}

impl FromParsed for NaiveDate {
    fn from_parsed(parsed: &Parsed) -> Option<Self> {
        parsed.to_naive_date().ok()
    }
}

impl FromParsed for NaiveTime {
    fn from_parsed(parsed: &Parsed) -> Option<Self> {
        parsed.to_naive_time().ok()
    }
}

impl FromParsed for NaiveDateTime {
    fn from_parsed(parsed: &Parsed) -> Option<Self> {
        parsed.to_naive_datetime_with_offset(0).ok()
    }
}

fn parse_temporal<T: FromParsed>(text: &str, fmt: &str) -> Result<T, EvaluatorError> {
    let items = format_items(fmt)?;
    let mut parsed = Parsed::new();
    chrono_parse(&mut parsed, text, items.into_iter())
        .map_err(|_| EvaluatorError::InvalidFormat(text.to_string()))?;
    T::from_parsed(&parsed).ok_or_else(|| EvaluatorError::InvalidFormat(text.to_string()))
}

fn format_temporal(value: &SqlValue, fmt: &str) -> Result<String, EvaluatorError> {
    //Validate the pattern up front so formatting cannot fail midway
    format_items(fmt)?;
    let formatted = match value {
        SqlValue::Date(d) => d.format(fmt).to_string(),
        SqlValue::Time(t) => t.format(fmt).to_string(),
        SqlValue::Timestamp(ts) => ts.format(fmt).to_string(),
        other => return Err(EvaluatorError::InvalidArguments(other.to_string())),
    };
    Ok(formatted)
}

/// SQL LIKE matching: `%` matches any run, `_` one character, the escape
/// character forces the next pattern character literal.
pub fn like_match(
    value: &str,
    pattern: &str,
    escape: Option<char>,
) -> Result<bool, EvaluatorError> {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_inner(&value, &pattern, escape)
}

fn like_match_inner(
    value: &[char],
    pattern: &[char],
    escape: Option<char>,
) -> Result<bool, EvaluatorError> {
    match pattern.first() {
        None => Ok(value.is_empty()),
        Some(&c) if Some(c) == escape => match pattern.get(1) {
            Some(&literal) => match value.first() {
                Some(&v) if v == literal => {
                    like_match_inner(&value[1..], &pattern[2..], escape)
                }
                _ => Ok(false),
            },
            None => Err(EvaluatorError::InvalidFormat(
                pattern.iter().collect::<String>(),
            )),
        },
        Some('%') => {
            for skip in 0..=value.len() {
                if like_match_inner(&value[skip..], &pattern[1..], escape)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Some('_') => match value.first() {
            Some(_) => like_match_inner(&value[1..], &pattern[1..], escape),
            None => Ok(false),
        },
        Some(&c) => match value.first() {
            Some(&v) if v == c => like_match_inner(&value[1..], &pattern[1..], escape),
            _ => Ok(false),
        },
    }
}

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Expression is not constant: {0}")]
    NotConstant(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Numeric overflow evaluating {0}")]
    NumericOverflow(String),
    #[error("Invalid format or unparsable value: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Conversion(#[from] SqlValueError),
    #[error("Function is not defined for the given arguments: {0}")]
    InvalidArguments(String),
}

impl EvaluatorError {
    /// Whether this failure means "no value of the target type can produce
    /// this literal". Only the comparison inversion rewrite may absorb these
    /// into a sentinel; every other call site propagates.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            EvaluatorError::Conversion(_) | EvaluatorError::InvalidFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::objects::Expression;
    use super::*;
    use uuid::Uuid;

    fn context() -> CommandContext {
        CommandContext::new(
            Uuid::nil(),
            NaiveDateTime::parse_from_str("2021-10-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
        )
    }

    fn call(kind: FunctionKind, returns: SqlType, args: Vec<Expression>) -> Expression {
        Expression::Function(FunctionCall::new(kind, returns, args))
    }

    fn int(i: i64) -> Expression {
        Expression::Constant(Constant::integer(i))
    }

    #[test]
    fn test_arithmetic() -> Result<(), Box<dyn std::error::Error>> {
        let sum = call(FunctionKind::Add, SqlType::Integer, vec![int(1), int(2)]);
        assert_eq!(Evaluator::evaluate(&sum, &context())?, Constant::integer(3));

        let div = call(FunctionKind::Divide, SqlType::Integer, vec![int(7), int(2)]);
        assert_eq!(Evaluator::evaluate(&div, &context())?, Constant::integer(3));
        Ok(())
    }

    #[test]
    fn test_division_by_zero() {
        let div = call(FunctionKind::Divide, SqlType::Integer, vec![int(1), int(0)]);
        assert!(matches!(
            Evaluator::evaluate(&div, &context()),
            Err(EvaluatorError::DivisionByZero)
        ));
    }

    #[test]
    fn test_null_propagation() -> Result<(), Box<dyn std::error::Error>> {
        let sum = call(
            FunctionKind::Add,
            SqlType::Integer,
            vec![int(1), Expression::null(SqlType::Integer)],
        );
        assert_eq!(
            Evaluator::evaluate(&sum, &context())?,
            Constant::null(SqlType::Integer)
        );
        Ok(())
    }

    #[test]
    fn test_convert_failure_is_detectable() {
        let convert = call(
            FunctionKind::Convert(SqlType::Integer),
            SqlType::Integer,
            vec![Expression::Constant(Constant::text("x"))],
        );
        let err = Evaluator::evaluate(&convert, &context()).unwrap_err();
        assert!(err.is_conversion_failure());
    }

    #[test]
    fn test_parse_format_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let parsed = call(
            FunctionKind::ParseDate,
            SqlType::Date,
            vec![
                Expression::Constant(Constant::text("2021-10-01")),
                Expression::Constant(Constant::text("%Y-%m-%d")),
            ],
        );
        let date = Evaluator::evaluate(&parsed, &context())?;
        assert_eq!(
            date,
            Constant::new(SqlValue::Date(
                NaiveDate::from_ymd_opt(2021, 10, 1).unwrap()
            ))
        );

        let bad_pattern = call(
            FunctionKind::FormatDate,
            SqlType::Text,
            vec![
                Expression::Constant(date),
                Expression::Constant(Constant::text("%Q")),
            ],
        );
        assert!(matches!(
            Evaluator::evaluate(&bad_pattern, &context()),
            Err(EvaluatorError::InvalidFormat(_))
        ));
        Ok(())
    }

    #[test]
    fn test_ternary_compare() -> Result<(), Box<dyn std::error::Error>> {
        let unknown = Criteria::compare(
            Expression::null(SqlType::Integer),
            CompareOp::Eq,
            int(1),
        );
        assert_eq!(
            Evaluator::evaluate_criteria(&unknown, &context())?,
            Ternary::Unknown
        );

        let true_compare = Criteria::compare(int(1), CompareOp::Eq, int(1));
        assert_eq!(
            Evaluator::evaluate_criteria(&true_compare, &context())?,
            Ternary::True
        );
        Ok(())
    }

    #[test]
    fn test_like_matching() -> Result<(), Box<dyn std::error::Error>> {
        assert!(like_match("abc", "a%", None)?);
        assert!(like_match("abc", "a_c", None)?);
        assert!(!like_match("abc", "a_b", None)?);
        assert!(like_match("a%c", "a\\%c", Some('\\'))?);
        assert!(!like_match("abc", "a\\%c", Some('\\'))?);
        Ok(())
    }

    #[test]
    fn test_in_list_with_null() -> Result<(), Box<dyn std::error::Error>> {
        let in_list = Criteria::SetCriteria(super::super::objects::SetCriteria {
            expr: int(5),
            values: vec![int(1), Expression::null(SqlType::Integer)],
            negated: false,
        });
        assert_eq!(
            Evaluator::evaluate_criteria(&in_list, &context())?,
            Ternary::Unknown
        );
        Ok(())
    }

    #[test]
    fn test_decode() -> Result<(), Box<dyn std::error::Error>> {
        let decoded = call(
            FunctionKind::DecodeString,
            SqlType::Text,
            vec![
                Expression::Constant(Constant::text("a")),
                Expression::Constant(Constant::text("a")),
                Expression::Constant(Constant::text("first")),
                Expression::Constant(Constant::text("b")),
                Expression::Constant(Constant::text("second")),
            ],
        );
        assert_eq!(
            Evaluator::evaluate(&decoded, &context())?,
            Constant::text("first")
        );
        Ok(())
    }
}
