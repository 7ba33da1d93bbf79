//! The criteria (predicate) layer of the resolved command tree, together
//! with the three sentinel criteria every rewrite rule funnels into.
//!
//! The sentinels have exactly one canonical shape each, so downstream code
//! detects "always true/false/unknown" by structural equality instead of
//! re-deriving it.

use super::{Constant, Expression, QueryCommand, SqlType};
use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, PartialEq)]
pub enum Criteria {
    Compare(CompareCriteria),
    Compound(CompoundCriteria),
    Not(Box<Criteria>),
    Between(BetweenCriteria),
    Match(MatchCriteria),
    SetCriteria(SetCriteria),
    IsNull(IsNullCriteria),
    SubqueryCompare(SubqueryCompareCriteria),
    Exists(Box<QueryCommand>),
    //The two below only appear inside virtual procedure bodies and are
    //resolved away by the procedural rewriter.
    HasCriteria(HasCriteria),
    TranslateCriteria(TranslateCriteria),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    /// The operator for the logically negated comparison.
    pub fn negate(self) -> CompareOp {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            CompareOp::Ne => CompareOp::Eq,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Ge => CompareOp::Lt,
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Le => CompareOp::Gt,
        }
    }

    /// The operator after the two sides swap places.
    pub fn mirror(self) -> CompareOp {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompareCriteria {
    pub op: CompareOp,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompoundOp {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompoundCriteria {
    pub op: CompoundOp,
    pub parts: Vec<Criteria>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BetweenCriteria {
    pub expr: Expression,
    pub negated: bool,
    pub low: Expression,
    pub high: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchCriteria {
    pub expr: Expression,
    pub pattern: Expression,
    pub escape: Option<char>,
    pub negated: bool,
}

/// IN / NOT IN over an explicit value list.
#[derive(Clone, Debug, PartialEq)]
pub struct SetCriteria {
    pub expr: Expression,
    pub values: Vec<Expression>,
    pub negated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IsNullCriteria {
    pub expr: Expression,
    pub negated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Quantifier {
    Any,
    Some,
    All,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubqueryCompareCriteria {
    pub expr: Expression,
    pub op: CompareOp,
    pub quantifier: Quantifier,
    pub subquery: Box<QueryCommand>,
}

/// HAS CRITERIA [ON (col, ...)]
#[derive(Clone, Debug, PartialEq)]
pub struct HasCriteria {
    pub elements: Vec<String>,
}

/// TRANSLATE [LIKE] CRITERIA [ON (col, ...)] [WITH (col = expr, ...)]
#[derive(Clone, Debug, PartialEq)]
pub struct TranslateCriteria {
    pub like: bool,
    pub elements: Vec<String>,
    pub translations: Vec<(String, Expression)>,
}

fn sentinel_compare(op: CompareOp, value: Constant, other: Constant) -> Criteria {
    Criteria::Compare(CompareCriteria {
        op,
        left: Expression::Constant(value),
        right: Expression::Constant(other),
    })
}

/// The canonical always-true criteria: `1 = 1`.
pub fn true_criteria() -> Criteria {
    sentinel_compare(CompareOp::Eq, Constant::integer(1), Constant::integer(1))
}

/// The canonical always-false criteria: `1 = 0`.
pub fn false_criteria() -> Criteria {
    sentinel_compare(CompareOp::Eq, Constant::integer(1), Constant::integer(0))
}

/// The canonical always-unknown criteria: `null <> null`.
pub fn unknown_criteria() -> Criteria {
    sentinel_compare(
        CompareOp::Ne,
        Constant::null(SqlType::Null),
        Constant::null(SqlType::Null),
    )
}

impl Criteria {
    pub fn is_true_criteria(&self) -> bool {
        *self == true_criteria()
    }

    pub fn is_false_criteria(&self) -> bool {
        *self == false_criteria()
    }

    pub fn is_unknown_criteria(&self) -> bool {
        *self == unknown_criteria()
    }

    pub fn and(parts: Vec<Criteria>) -> Criteria {
        Criteria::Compound(CompoundCriteria {
            op: CompoundOp::And,
            parts,
        })
    }

    pub fn or(parts: Vec<Criteria>) -> Criteria {
        Criteria::Compound(CompoundCriteria {
            op: CompoundOp::Or,
            parts,
        })
    }

    pub fn compare(left: Expression, op: CompareOp, right: Expression) -> Criteria {
        Criteria::Compare(CompareCriteria { op, left, right })
    }

    /// Splits a criteria into its top level AND parts, for callers that push
    /// individual conjuncts toward sources.
    pub fn conjuncts(self) -> Vec<Criteria> {
        match self {
            Criteria::Compound(c) if c.op == CompoundOp::And => c.parts,
            other => vec![other],
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "<>"),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Compare(c) => write!(f, "{} {} {}", c.left, c.op, c.right),
            Criteria::Compound(c) => {
                let join = match c.op {
                    CompoundOp::And => " AND ",
                    CompoundOp::Or => " OR ",
                };
                for (i, part) in c.parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", join)?;
                    }
                    write!(f, "({})", part)?;
                }
                Ok(())
            }
            Criteria::Not(c) => write!(f, "NOT ({})", c),
            Criteria::Between(b) => {
                if b.negated {
                    write!(f, "{} NOT BETWEEN {} AND {}", b.expr, b.low, b.high)
                } else {
                    write!(f, "{} BETWEEN {} AND {}", b.expr, b.low, b.high)
                }
            }
            Criteria::Match(m) => {
                if m.negated {
                    write!(f, "{} NOT LIKE {}", m.expr, m.pattern)?;
                } else {
                    write!(f, "{} LIKE {}", m.expr, m.pattern)?;
                }
                if let Some(escape) = m.escape {
                    write!(f, " ESCAPE '{}'", escape)?;
                }
                Ok(())
            }
            Criteria::SetCriteria(s) => {
                if s.negated {
                    write!(f, "{} NOT IN (", s.expr)?;
                } else {
                    write!(f, "{} IN (", s.expr)?;
                }
                for (i, value) in s.values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            Criteria::IsNull(n) => {
                if n.negated {
                    write!(f, "{} IS NOT NULL", n.expr)
                } else {
                    write!(f, "{} IS NULL", n.expr)
                }
            }
            Criteria::SubqueryCompare(s) => {
                let quantifier = match s.quantifier {
                    Quantifier::Any => "ANY",
                    Quantifier::Some => "SOME",
                    Quantifier::All => "ALL",
                };
                write!(f, "{} {} {} ({})", s.expr, s.op, quantifier, s.subquery)
            }
            Criteria::Exists(q) => write!(f, "EXISTS ({})", q),
            Criteria::HasCriteria(h) => {
                write!(f, "HAS CRITERIA ON (")?;
                for (i, name) in h.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name)?;
                }
                write!(f, ")")
            }
            Criteria::TranslateCriteria(t) => {
                if t.like {
                    write!(f, "TRANSLATE LIKE CRITERIA")?;
                } else {
                    write!(f, "TRANSLATE CRITERIA")?;
                }
                if !t.elements.is_empty() {
                    write!(f, " ON (")?;
                    for (i, name) in t.elements.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", name)?;
                    }
                    write!(f, ")")?;
                }
                if !t.translations.is_empty() {
                    write!(f, " WITH (")?;
                    for (i, (name, expr)) in t.translations.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{} = {}", name, expr)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}
