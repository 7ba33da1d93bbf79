//! The expression layer of the resolved command tree. Everything here is an
//! immutable value tree, rewrites build new nodes instead of mutating.

use super::{Criteria, QueryCommand, SqlType, SqlValue};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Constant(Constant),
    Element(ElementRef),
    Function(FunctionCall),
    Case(CaseExpression),
    SearchedCase(SearchedCaseExpression),
    Aggregate(AggregateCall),
    ScalarSubquery(Box<QueryCommand>),
    Reference(Reference),
}

/// A typed literal. `value: None` is a typed SQL null.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub value: Option<SqlValue>,
    pub ty: SqlType,
}

impl Constant {
    pub fn new(value: SqlValue) -> Constant {
        let ty = value.sql_type();
        Constant {
            value: Some(value),
            ty,
        }
    }

    pub fn null(ty: SqlType) -> Constant {
        Constant { value: None, ty }
    }

    pub fn integer(value: i64) -> Constant {
        Constant::new(SqlValue::Integer(value))
    }

    pub fn double(value: f64) -> Constant {
        Constant::new(SqlValue::Double(value))
    }

    pub fn text(value: &str) -> Constant {
        Constant::new(SqlValue::Text(value.to_string()))
    }

    pub fn boolean(value: bool) -> Constant {
        Constant::new(SqlValue::Boolean(value))
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// A column reference resolved against the metadata catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementRef {
    pub id: Uuid,
    pub group: String,
    pub name: String,
    pub ty: SqlType,
}

impl ElementRef {
    pub fn new(id: Uuid, group: &str, name: &str, ty: SqlType) -> ElementRef {
        ElementRef {
            id,
            group: group.to_string(),
            name: name.to_string(),
            ty,
        }
    }
}

/// An unbound external input, e.g. a prepared statement parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    pub index: u32,
    pub ty: SqlType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    pub descriptor: FunctionDescriptor,
    pub args: Vec<Expression>,
}

impl FunctionCall {
    pub fn new(kind: FunctionKind, returns: SqlType, args: Vec<Expression>) -> FunctionCall {
        FunctionCall {
            descriptor: FunctionDescriptor::new(kind, returns),
            args,
        }
    }
}

/// The executable descriptor a function name resolved to.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub kind: FunctionKind,
    pub returns: SqlType,
    pub deterministic: bool,
}

impl FunctionDescriptor {
    pub fn new(kind: FunctionKind, returns: SqlType) -> FunctionDescriptor {
        let name = kind.canonical_name().to_string();
        let deterministic = kind.is_deterministic();
        FunctionDescriptor {
            name,
            kind,
            returns,
            deterministic,
        }
    }
}

/// The closed builtin function library. Resolution happened upstream, so the
/// rewriter and evaluator dispatch on this tag exhaustively.
#[derive(Clone, Debug, PartialEq)]
pub enum FunctionKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Concat,
    Convert(SqlType),
    ParseDate,
    FormatDate,
    ParseTime,
    FormatTime,
    ParseTimestamp,
    FormatTimestamp,
    ParseInteger,
    FormatInteger,
    ParseDouble,
    FormatDouble,
    TimestampCreate,
    Coalesce,
    IfNull,
    NullIf,
    DecodeString,
    DecodeInteger,
    Concat2,
    Upper,
    Lower,
    Length,
    Env,
    SessionId,
    Now,
}

impl FunctionKind {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            FunctionKind::Add => "+",
            FunctionKind::Subtract => "-",
            FunctionKind::Multiply => "*",
            FunctionKind::Divide => "/",
            FunctionKind::Negate => "-",
            FunctionKind::Concat => "||",
            FunctionKind::Convert(_) => "convert",
            FunctionKind::ParseDate => "parsedate",
            FunctionKind::FormatDate => "formatdate",
            FunctionKind::ParseTime => "parsetime",
            FunctionKind::FormatTime => "formattime",
            FunctionKind::ParseTimestamp => "parsetimestamp",
            FunctionKind::FormatTimestamp => "formattimestamp",
            FunctionKind::ParseInteger => "parseinteger",
            FunctionKind::FormatInteger => "formatinteger",
            FunctionKind::ParseDouble => "parsedouble",
            FunctionKind::FormatDouble => "formatdouble",
            FunctionKind::TimestampCreate => "timestampcreate",
            FunctionKind::Coalesce => "coalesce",
            FunctionKind::IfNull => "ifnull",
            FunctionKind::NullIf => "nullif",
            FunctionKind::DecodeString => "decodestring",
            FunctionKind::DecodeInteger => "decodeinteger",
            FunctionKind::Concat2 => "concat2",
            FunctionKind::Upper => "upper",
            FunctionKind::Lower => "lower",
            FunctionKind::Length => "length",
            FunctionKind::Env => "env",
            FunctionKind::SessionId => "session_id",
            FunctionKind::Now => "now",
        }
    }

    /// `now()` changes between calls. `env()` and `session_id()` are fixed
    /// for the life of a session, which is the scope a rewritten command
    /// lives in, so they fold.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, FunctionKind::Now)
    }

    /// Whether a null argument forces a null result.
    pub fn propagates_nulls(&self) -> bool {
        !matches!(
            self,
            FunctionKind::Coalesce
                | FunctionKind::IfNull
                | FunctionKind::NullIf
                | FunctionKind::DecodeString
                | FunctionKind::DecodeInteger
                | FunctionKind::Concat2
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            FunctionKind::Add
                | FunctionKind::Subtract
                | FunctionKind::Multiply
                | FunctionKind::Divide
        )
    }
}

/// CASE <operand> WHEN <value> THEN <result> ... ELSE <result> END
#[derive(Clone, Debug, PartialEq)]
pub struct CaseExpression {
    pub operand: Box<Expression>,
    pub whens: Vec<(Expression, Expression)>,
    pub else_expr: Option<Box<Expression>>,
}

impl CaseExpression {
    pub fn result_type(&self) -> SqlType {
        for (_, then) in &self.whens {
            let ty = then.ty();
            if ty != SqlType::Null {
                return ty;
            }
        }
        match &self.else_expr {
            Some(e) => e.ty(),
            None => SqlType::Null,
        }
    }
}

/// CASE WHEN <criteria> THEN <result> ... ELSE <result> END
#[derive(Clone, Debug, PartialEq)]
pub struct SearchedCaseExpression {
    pub whens: Vec<(Criteria, Expression)>,
    pub else_expr: Option<Box<Expression>>,
}

impl SearchedCaseExpression {
    pub fn result_type(&self) -> SqlType {
        for (_, then) in &self.whens {
            let ty = then.ty();
            if ty != SqlType::Null {
                return ty;
            }
        }
        match &self.else_expr {
            Some(e) => e.ty(),
            None => SqlType::Null,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    pub distinct: bool,
    //None is COUNT(*)
    pub arg: Option<Box<Expression>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Expression {
    pub fn constant(value: SqlValue) -> Expression {
        Expression::Constant(Constant::new(value))
    }

    pub fn null(ty: SqlType) -> Expression {
        Expression::Constant(Constant::null(ty))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Expression::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Expression::Constant(c) if c.is_null())
    }

    /// The declared result type. Rewrites never change it.
    pub fn ty(&self) -> SqlType {
        match self {
            Expression::Constant(c) => c.ty,
            Expression::Element(e) => e.ty,
            Expression::Function(f) => f.descriptor.returns,
            Expression::Case(c) => c.result_type(),
            Expression::SearchedCase(c) => c.result_type(),
            Expression::Aggregate(a) => match a.function {
                AggregateFunction::Count => SqlType::Integer,
                AggregateFunction::Avg => SqlType::Double,
                AggregateFunction::Sum | AggregateFunction::Min | AggregateFunction::Max => {
                    match &a.arg {
                        Some(arg) => arg.ty(),
                        None => SqlType::Integer,
                    }
                }
            },
            Expression::ScalarSubquery(q) => {
                q.output_types().into_iter().next().unwrap_or(SqlType::Null)
            }
            Expression::Reference(r) => r.ty,
        }
    }
}

fn escape_text(value: &str) -> String {
    value.replace('\'', "''")
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value {
            None => write!(f, "null"),
            Some(SqlValue::Boolean(b)) => {
                if *b {
                    write!(f, "TRUE")
                } else {
                    write!(f, "FALSE")
                }
            }
            Some(SqlValue::Text(t)) => write!(f, "'{}'", escape_text(t)),
            Some(v @ SqlValue::Date(_)) => write!(f, "DATE '{}'", v),
            Some(v @ SqlValue::Time(_)) => write!(f, "TIME '{}'", v),
            Some(v @ SqlValue::Timestamp(_)) => write!(f, "TIMESTAMP '{}'", v),
            Some(v) => write!(f, "{}", v),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(c) => write!(f, "{}", c),
            Expression::Element(e) => write!(f, "{}", e.name),
            Expression::Function(call) => write!(f, "{}", call),
            Expression::Case(c) => {
                write!(f, "CASE {}", c.operand)?;
                for (when, then) in &c.whens {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = &c.else_expr {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
            Expression::SearchedCase(c) => {
                write!(f, "CASE")?;
                for (when, then) in &c.whens {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = &c.else_expr {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
            Expression::Aggregate(a) => {
                let name = match a.function {
                    AggregateFunction::Count => "COUNT",
                    AggregateFunction::Sum => "SUM",
                    AggregateFunction::Avg => "AVG",
                    AggregateFunction::Min => "MIN",
                    AggregateFunction::Max => "MAX",
                };
                match &a.arg {
                    Some(arg) => {
                        if a.distinct {
                            write!(f, "{}(DISTINCT {})", name, arg)
                        } else {
                            write!(f, "{}({})", name, arg)
                        }
                    }
                    None => write!(f, "{}(*)", name),
                }
            }
            Expression::ScalarSubquery(q) => write!(f, "({})", q),
            Expression::Reference(_) => write!(f, "?"),
        }
    }
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.descriptor.kind {
            FunctionKind::Add
            | FunctionKind::Subtract
            | FunctionKind::Multiply
            | FunctionKind::Divide
            | FunctionKind::Concat => {
                write!(
                    f,
                    "({} {} {})",
                    self.args[0],
                    self.descriptor.kind.canonical_name(),
                    self.args[1]
                )
            }
            FunctionKind::Negate => write!(f, "-({})", self.args[0]),
            FunctionKind::Convert(to) => write!(f, "convert({}, {})", self.args[0], to),
            _ => {
                write!(f, "{}(", self.descriptor.name)?;
                for (i, arg) in self.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_display() {
        assert_eq!(Constant::integer(5).to_string(), "5");
        assert_eq!(Constant::text("it's").to_string(), "'it''s'");
        assert_eq!(Constant::null(SqlType::Text).to_string(), "null");
        assert_eq!(Constant::boolean(true).to_string(), "TRUE");
    }

    #[test]
    fn test_function_display() {
        let call = FunctionCall::new(
            FunctionKind::Add,
            SqlType::Integer,
            vec![
                Expression::Constant(Constant::integer(1)),
                Expression::Constant(Constant::integer(2)),
            ],
        );
        assert_eq!(call.to_string(), "(1 + 2)");

        let convert = FunctionCall::new(
            FunctionKind::Convert(SqlType::Text),
            SqlType::Text,
            vec![Expression::Constant(Constant::integer(1))],
        );
        assert_eq!(convert.to_string(), "convert(1, string)");
    }

    #[test]
    fn test_expression_types() {
        assert_eq!(
            Expression::Constant(Constant::integer(1)).ty(),
            SqlType::Integer
        );
        let case = Expression::SearchedCase(SearchedCaseExpression {
            whens: vec![],
            else_expr: Some(Box::new(Expression::Constant(Constant::text("x")))),
        });
        assert_eq!(case.ty(), SqlType::Text);
    }
}
