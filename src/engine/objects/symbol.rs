//! A projected entry in a select list. ORDER BY keys resolve to one of
//! these, so the output name rules live here.

use super::Expression;
use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl Symbol {
    pub fn new(expr: Expression) -> Symbol {
        Symbol { expr, alias: None }
    }

    pub fn aliased(expr: Expression, alias: &str) -> Symbol {
        Symbol {
            expr,
            alias: Some(alias.to_string()),
        }
    }

    /// The name this column is addressable by from an ORDER BY: the alias if
    /// one was given, the element's short name for a plain column reference,
    /// otherwise a position derived name.
    pub fn output_name(&self, position: usize) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match &self.expr {
            Expression::Element(e) => e.name.clone(),
            _ => format!("expr_{}", position + 1),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.expr, alias),
            None => write!(f, "{}", self.expr),
        }
    }
}
