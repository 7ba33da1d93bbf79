//! The binding of INPUT/CHANGING pseudo-group references for one virtual
//! procedure invocation, derived from the user's actual DML command.

use super::Constant;
use std::collections::HashMap;

/// What the user's command supplied for one virtual column.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableValue {
    /// The user's command assigned a concrete literal.
    Value(Constant),
    /// The column was not assigned; the declared default (or null) applies.
    NotSupplied,
    /// The binding cannot be decided at rewrite time, e.g. an
    /// update-vs-insert ambiguity. The reference is left unresolved.
    Unknown,
}

/// Case-insensitive map from virtual column name to its INPUT binding and
/// its CHANGING flag.
#[derive(Clone, Debug, Default)]
pub struct VariableContext {
    values: HashMap<String, VariableValue>,
}

impl VariableContext {
    pub fn new() -> VariableContext {
        VariableContext {
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, column: &str, value: VariableValue) {
        self.values.insert(column.to_uppercase(), value);
    }

    pub fn input(&self, column: &str) -> &VariableValue {
        self.values
            .get(&column.to_uppercase())
            .unwrap_or(&VariableValue::NotSupplied)
    }

    /// Whether the user's command explicitly assigned this column.
    pub fn changing(&self, column: &str) -> Option<bool> {
        match self.values.get(&column.to_uppercase()) {
            Some(VariableValue::Unknown) => None,
            Some(_) => Some(true),
            None => Some(false),
        }
    }

    pub fn supplied_columns(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut context = VariableContext::new();
        context.set("Col_A", VariableValue::Value(Constant::integer(1)));

        assert_eq!(
            *context.input("col_a"),
            VariableValue::Value(Constant::integer(1))
        );
        assert_eq!(*context.input("missing"), VariableValue::NotSupplied);
    }

    #[test]
    fn test_changing() {
        let mut context = VariableContext::new();
        context.set("a", VariableValue::Value(Constant::integer(1)));
        context.set("b", VariableValue::Unknown);

        assert_eq!(context.changing("A"), Some(true));
        assert_eq!(context.changing("b"), None);
        assert_eq!(context.changing("c"), Some(false));
    }
}
