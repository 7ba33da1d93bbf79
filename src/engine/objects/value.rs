use super::SqlType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Display, Formatter};
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// A runtime SQL value. Every constant in a resolved command carries one of
/// these (or is a typed null, see `Constant`).
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum SqlValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl SqlValue {
    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Boolean(_) => SqlType::Boolean,
            SqlValue::Integer(_) => SqlType::Integer,
            SqlValue::Double(_) => SqlType::Double,
            SqlValue::Text(_) => SqlType::Text,
            SqlValue::Date(_) => SqlType::Date,
            SqlValue::Time(_) => SqlType::Time,
            SqlValue::Timestamp(_) => SqlType::Timestamp,
        }
    }

    /// Converts a value to the target type, following the engine's implicit
    /// conversion matrix. An impossible conversion is an error, never a
    /// silent truncation: a double only converts to an integer when it has
    /// no fractional part and fits.
    pub fn convert(&self, target: SqlType) -> Result<SqlValue, SqlValueError> {
        if self.sql_type() == target {
            return Ok(self.clone());
        }

        match (self, target) {
            (SqlValue::Integer(i), SqlType::Double) => Ok(SqlValue::Double(*i as f64)),
            (SqlValue::Integer(i), SqlType::Text) => Ok(SqlValue::Text(i.to_string())),
            (SqlValue::Double(d), SqlType::Integer) => {
                if d.fract() == 0.0 && *d >= i64::MIN as f64 && *d <= i64::MAX as f64 {
                    Ok(SqlValue::Integer(*d as i64))
                } else {
                    Err(SqlValueError::Conversion(
                        self.to_string(),
                        SqlType::Double,
                        target,
                    ))
                }
            }
            (SqlValue::Double(d), SqlType::Text) => Ok(SqlValue::Text(format_double(*d))),
            (SqlValue::Boolean(b), SqlType::Text) => Ok(SqlValue::Text(b.to_string())),
            (SqlValue::Text(t), SqlType::Boolean) => match t.as_str() {
                "true" => Ok(SqlValue::Boolean(true)),
                "false" => Ok(SqlValue::Boolean(false)),
                _ => Err(SqlValueError::Conversion(
                    t.clone(),
                    SqlType::Text,
                    target,
                )),
            },
            (SqlValue::Text(t), SqlType::Integer) => t
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|e| SqlValueError::from_int_parse(t, e)),
            (SqlValue::Text(t), SqlType::Double) => t
                .parse::<f64>()
                .map(SqlValue::Double)
                .map_err(|e| SqlValueError::from_float_parse(t, e)),
            (SqlValue::Text(t), SqlType::Date) => NaiveDate::parse_from_str(t, DATE_FORMAT)
                .map(SqlValue::Date)
                .map_err(|_| SqlValueError::Conversion(t.clone(), SqlType::Text, target)),
            (SqlValue::Text(t), SqlType::Time) => NaiveTime::parse_from_str(t, TIME_FORMAT)
                .map(SqlValue::Time)
                .map_err(|_| SqlValueError::Conversion(t.clone(), SqlType::Text, target)),
            (SqlValue::Text(t), SqlType::Timestamp) => {
                NaiveDateTime::parse_from_str(t, TIMESTAMP_FORMAT)
                    .map(SqlValue::Timestamp)
                    .map_err(|_| SqlValueError::Conversion(t.clone(), SqlType::Text, target))
            }
            (SqlValue::Date(d), SqlType::Timestamp) => {
                Ok(SqlValue::Timestamp(NaiveDateTime::new(*d, NaiveTime::MIN)))
            }
            (SqlValue::Date(d), SqlType::Text) => {
                Ok(SqlValue::Text(d.format(DATE_FORMAT).to_string()))
            }
            (SqlValue::Time(t), SqlType::Text) => {
                Ok(SqlValue::Text(t.format(TIME_FORMAT).to_string()))
            }
            (SqlValue::Timestamp(ts), SqlType::Date) => Ok(SqlValue::Date(ts.date())),
            (SqlValue::Timestamp(ts), SqlType::Time) => Ok(SqlValue::Time(ts.time())),
            (SqlValue::Timestamp(ts), SqlType::Text) => {
                Ok(SqlValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()))
            }
            (_, _) => Err(SqlValueError::Conversion(
                self.to_string(),
                self.sql_type(),
                target,
            )),
        }
    }
}

/// Canonical text form for a double. Keeps a trailing `.0` on whole values so
/// the text form always reads back as a double.
pub fn format_double(d: f64) -> String {
    if d.fract() == 0.0 && d.is_finite() && d.abs() < 1e15 {
        format!("{:.1}", d)
    } else {
        format!("{}", d)
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Boolean(value) => {
                write!(f, "{}", value)
            }
            SqlValue::Integer(value) => {
                write!(f, "{}", value)
            }
            SqlValue::Double(value) => {
                write!(f, "{}", format_double(*value))
            }
            SqlValue::Text(value) => {
                write!(f, "{}", value)
            }
            SqlValue::Date(value) => {
                write!(f, "{}", value.format(DATE_FORMAT))
            }
            SqlValue::Time(value) => {
                write!(f, "{}", value.format(TIME_FORMAT))
            }
            SqlValue::Timestamp(value) => {
                write!(f, "{}", value.format(TIMESTAMP_FORMAT))
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SqlValueError {
    #[error("Unable to convert {0} from {1} to {2}")]
    Conversion(String, SqlType, SqlType),
    #[error("{0} is not a valid integer literal: {1}")]
    InvalidInt(String, ParseIntError),
    #[error("{0} is not a valid double literal: {1}")]
    InvalidDouble(String, ParseFloatError),
}

impl SqlValueError {
    fn from_int_parse(text: &str, e: ParseIntError) -> SqlValueError {
        SqlValueError::InvalidInt(text.to_string(), e)
    }

    fn from_float_parse(text: &str, e: ParseFloatError) -> SqlValueError {
        SqlValueError::InvalidDouble(text.to_string(), e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::Boolean(true).to_string(), "true");
        assert_eq!(SqlValue::Integer(5).to_string(), "5");
        assert_eq!(SqlValue::Double(2.5).to_string(), "2.5");
        assert_eq!(SqlValue::Double(2.0).to_string(), "2.0");
        assert_eq!(SqlValue::Text("FOOBAR".to_string()).to_string(), "FOOBAR");
    }

    #[test]
    fn test_numeric_conversions() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(
            SqlValue::Integer(5).convert(SqlType::Double)?,
            SqlValue::Double(5.0)
        );
        assert_eq!(
            SqlValue::Double(5.0).convert(SqlType::Integer)?,
            SqlValue::Integer(5)
        );
        assert!(SqlValue::Double(5.5).convert(SqlType::Integer).is_err());
        Ok(())
    }

    #[test]
    fn test_text_conversions() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(
            SqlValue::Text("17".to_string()).convert(SqlType::Integer)?,
            SqlValue::Integer(17)
        );
        assert!(SqlValue::Text("x".to_string())
            .convert(SqlType::Integer)
            .is_err());
        assert_eq!(
            SqlValue::Text("2021-10-01".to_string()).convert(SqlType::Date)?,
            SqlValue::Date(NaiveDate::from_ymd_opt(2021, 10, 1).unwrap())
        );
        Ok(())
    }

    #[test]
    fn test_temporal_conversions() -> Result<(), Box<dyn std::error::Error>> {
        let date = NaiveDate::from_ymd_opt(2021, 10, 1).unwrap();
        let ts = date.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(
            SqlValue::Timestamp(ts).convert(SqlType::Date)?,
            SqlValue::Date(date)
        );
        assert_eq!(
            SqlValue::Date(date).convert(SqlType::Timestamp)?,
            SqlValue::Timestamp(date.and_hms_opt(0, 0, 0).unwrap())
        );
        Ok(())
    }
}
