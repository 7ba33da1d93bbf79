//! The declared type of every resolved expression. `Null` is the type of an
//! untyped null literal; it never constrains a type reconciliation decision.

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SqlType {
    Boolean,
    Integer,
    Double,
    Text,
    Date,
    Time,
    Timestamp,
    Null,
}

impl SqlType {
    /// The widened type two set-query branches reconcile to, or None when the
    /// pair has no common representation.
    pub fn common_type(left: SqlType, right: SqlType) -> Option<SqlType> {
        if left == right {
            return Some(left);
        }

        match (left, right) {
            (SqlType::Null, other) | (other, SqlType::Null) => Some(other),
            (SqlType::Integer, SqlType::Double) | (SqlType::Double, SqlType::Integer) => {
                Some(SqlType::Double)
            }
            (SqlType::Date, SqlType::Timestamp) | (SqlType::Timestamp, SqlType::Date) => {
                Some(SqlType::Timestamp)
            }
            (SqlType::Time, SqlType::Timestamp) | (SqlType::Timestamp, SqlType::Time) => {
                Some(SqlType::Timestamp)
            }
            //Everything has a text form, so text is the widest common type
            (SqlType::Text, _) | (_, SqlType::Text) => Some(SqlType::Text),
            (_, _) => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SqlType::Integer | SqlType::Double)
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Boolean => write!(f, "boolean"),
            SqlType::Integer => write!(f, "integer"),
            SqlType::Double => write!(f, "double"),
            SqlType::Text => write!(f, "string"),
            SqlType::Date => write!(f, "date"),
            SqlType::Time => write!(f, "time"),
            SqlType::Timestamp => write!(f, "timestamp"),
            SqlType::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_type() {
        assert_eq!(
            SqlType::common_type(SqlType::Integer, SqlType::Integer),
            Some(SqlType::Integer)
        );
        assert_eq!(
            SqlType::common_type(SqlType::Integer, SqlType::Double),
            Some(SqlType::Double)
        );
        assert_eq!(
            SqlType::common_type(SqlType::Null, SqlType::Date),
            Some(SqlType::Date)
        );
        assert_eq!(
            SqlType::common_type(SqlType::Date, SqlType::Timestamp),
            Some(SqlType::Timestamp)
        );
        assert_eq!(
            SqlType::common_type(SqlType::Integer, SqlType::Text),
            Some(SqlType::Text)
        );
        assert_eq!(SqlType::common_type(SqlType::Boolean, SqlType::Date), None);
    }
}
