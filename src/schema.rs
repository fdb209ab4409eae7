//! Declarative per-column CSV schemas and record validation.
//!
//! A [`CsvSchema`] is either hand-authored (see [`stock_data_schema`]) or
//! produced by [`crate::inference`]. Schemas are immutable after
//! construction and shared read-only across all validation calls.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

/// Default format for [`ColumnType::Date`] columns without an explicit one.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Default format for [`ColumnType::DateTime`] columns without an explicit one.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Expected data type of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnType {
    /// UTF-8 string (optionally length-bounded).
    #[default]
    String,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean literal (`true/false`, `1/0`, `yes/no`, `y/n`).
    Bool,
    /// Calendar date, checked against a chrono format string.
    Date,
    /// Date and time, checked against a chrono format string.
    DateTime,
    /// Email address.
    Email,
    /// Arbitrary regex constraint via [`ColumnDef::pattern`].
    Regex,
}

/// Constraint description for one CSV column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column index (0-based).
    pub index: usize,
    /// Column name (for documentation and errors).
    pub name: String,
    /// Expected data type.
    pub data_type: ColumnType,
    /// Whether the column must be present and non-empty.
    pub required: bool,
    /// Minimum string length (0 = unbounded).
    pub min_length: usize,
    /// Maximum string length (0 = unbounded).
    pub max_length: usize,
    /// Minimum numeric value (for `Int`/`Float`).
    pub min: Option<f64>,
    /// Maximum numeric value (for `Int`/`Float`).
    pub max: Option<f64>,
    /// Regex pattern (for [`ColumnType::Regex`]).
    pub pattern: Option<String>,
    /// chrono format string (for `Date`/`DateTime`).
    pub date_format: Option<String>,
    /// Whitelist of allowed values (empty = unconstrained).
    pub allowed_values: Vec<String>,
}

/// Complete schema for a CSV file: ordered column definitions plus a
/// column-count policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CsvSchema {
    /// Ordered column definitions.
    pub columns: Vec<ColumnDef>,
    /// Minimum number of columns a record must have.
    pub min_columns: usize,
    /// If `true`, reject records with columns beyond the last defined index.
    pub strict_columns: bool,
}

/// Why a record failed validation.
///
/// Returned per record and never fatal to the stream; the caller decides
/// whether to count, log or discard the record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expected at least {min} columns, got {got}")]
    TooFewColumns { min: usize, got: usize },

    #[error("expected exactly {expected} columns, got {got}")]
    TooManyColumns { expected: usize, got: usize },

    #[error("column {column} ({name}): invalid value {value:?} - {reason}")]
    Column {
        column: usize,
        name: String,
        value: String,
        reason: String,
    },
}

impl CsvSchema {
    /// Validate a record against the schema.
    ///
    /// Columns are checked in definition order and the first failure aborts
    /// validation; errors are not accumulated per record.
    pub fn validate_record<S: AsRef<str>>(&self, record: &[S]) -> Result<(), ValidationError> {
        if record.len() < self.min_columns {
            return Err(ValidationError::TooFewColumns {
                min: self.min_columns,
                got: record.len(),
            });
        }

        if self.strict_columns && !self.columns.is_empty() {
            let max_index = self.columns.iter().map(|c| c.index).max().unwrap_or(0);
            if record.len() > max_index + 1 {
                return Err(ValidationError::TooManyColumns {
                    expected: max_index + 1,
                    got: record.len(),
                });
            }
        }

        for col in &self.columns {
            let Some(value) = record.get(col.index) else {
                if col.required {
                    return Err(col.error("", "column is required but missing"));
                }
                continue;
            };
            let value = value.as_ref();

            if value.is_empty() {
                if col.required {
                    return Err(col.error(value, "non-empty value required"));
                }
                continue;
            }

            if let Err(reason) = check_value(value, col) {
                return Err(col.error(value, reason));
            }
        }

        Ok(())
    }
}

impl ColumnDef {
    fn error(&self, value: &str, reason: impl Into<String>) -> ValidationError {
        ValidationError::Column {
            column: self.index,
            name: self.name.clone(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Returns `true` for the accepted boolean literals, case-insensitively.
pub(crate) fn is_bool_literal(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "false" | "1" | "0" | "yes" | "no" | "y" | "n"
    )
}

fn check_value(value: &str, col: &ColumnDef) -> Result<(), String> {
    if !col.allowed_values.is_empty() && !col.allowed_values.iter().any(|v| v == value) {
        return Err(format!("value must be one of: {:?}", col.allowed_values));
    }

    match col.data_type {
        ColumnType::String => {
            if col.min_length > 0 && value.len() < col.min_length {
                return Err(format!("string length must be at least {}", col.min_length));
            }
            if col.max_length > 0 && value.len() > col.max_length {
                return Err(format!("string length must be at most {}", col.max_length));
            }
        }

        ColumnType::Int => {
            let parsed: i64 = value.parse().map_err(|_| "expected integer".to_string())?;
            check_bounds(parsed as f64, col)?;
        }

        ColumnType::Float => {
            let parsed: f64 = value.parse().map_err(|_| "expected float".to_string())?;
            check_bounds(parsed, col)?;
        }

        ColumnType::Bool => {
            if !is_bool_literal(value) {
                return Err("expected boolean (true/false, 1/0, yes/no, y/n)".to_string());
            }
        }

        ColumnType::Date => {
            let format = col.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
            NaiveDate::parse_from_str(value, format)
                .map_err(|_| format!("expected date in format {format}"))?;
        }

        ColumnType::DateTime => {
            let format = col
                .date_format
                .as_deref()
                .unwrap_or(DEFAULT_DATETIME_FORMAT);
            NaiveDateTime::parse_from_str(value, format)
                .map_err(|_| format!("expected datetime in format {format}"))?;
        }

        ColumnType::Email => {
            if !EMAIL_RE.is_match(value) {
                return Err("expected valid email address".to_string());
            }
        }

        ColumnType::Regex => {
            let Some(pattern) = col.pattern.as_deref() else {
                return Err("regex pattern not specified".to_string());
            };
            let re = Regex::new(pattern).map_err(|e| format!("invalid regex pattern: {e}"))?;
            if !re.is_match(value) {
                return Err(format!("value must match pattern: {pattern}"));
            }
        }
    }

    Ok(())
}

fn check_bounds(value: f64, col: &ColumnDef) -> Result<(), String> {
    if let Some(min) = col.min {
        if value < min {
            return Err(format!("value must be >= {min:.2}"));
        }
    }
    if let Some(max) = col.max {
        if value > max {
            return Err(format!("value must be <= {max:.2}"));
        }
    }
    Ok(())
}

/// Hand-authored schema for the synthetic stock trade CSV.
pub fn stock_data_schema() -> CsvSchema {
    let col = |index: usize, name: &str, data_type: ColumnType| ColumnDef {
        index,
        name: name.to_string(),
        data_type,
        required: true,
        ..ColumnDef::default()
    };
    let non_negative = |mut c: ColumnDef| {
        c.min = Some(0.0);
        c
    };
    let positive = |mut c: ColumnDef| {
        c.min = Some(1.0);
        c
    };

    CsvSchema {
        min_columns: 22,
        strict_columns: false,
        columns: vec![
            positive(col(0, "TradeID", ColumnType::Int)),
            ColumnDef {
                date_format: Some(DEFAULT_DATETIME_FORMAT.to_string()),
                ..col(1, "Timestamp", ColumnType::DateTime)
            },
            ColumnDef {
                min_length: 1,
                max_length: 10,
                ..col(2, "Symbol", ColumnType::String)
            },
            ColumnDef {
                allowed_values: ["NYSE", "NASDAQ", "EURONEXT", "LSE", "TSE"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ..col(3, "Exchange", ColumnType::String)
            },
            col(4, "Sector", ColumnType::String),
            ColumnDef {
                allowed_values: vec!["Buy".to_string(), "Sell".to_string()],
                ..col(5, "TradeType", ColumnType::String)
            },
            ColumnDef {
                allowed_values: ["Market", "Limit", "Stop", "Stop-Limit"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ..col(6, "OrderType", ColumnType::String)
            },
            positive(col(7, "Quantity", ColumnType::Int)),
            non_negative(col(8, "Price", ColumnType::Float)),
            non_negative(col(9, "TotalValue", ColumnType::Float)),
            non_negative(col(10, "OpenPrice", ColumnType::Float)),
            non_negative(col(11, "ClosePrice", ColumnType::Float)),
            non_negative(col(12, "HighPrice", ColumnType::Float)),
            non_negative(col(13, "LowPrice", ColumnType::Float)),
            non_negative(col(14, "Volume", ColumnType::Int)),
            non_negative(col(15, "MarketCap", ColumnType::Float)),
            non_negative(col(16, "PERatio", ColumnType::Float)),
            non_negative(col(17, "DividendYield", ColumnType::Float)),
            non_negative(col(18, "Beta", ColumnType::Float)),
            non_negative(col(19, "52WeekHigh", ColumnType::Float)),
            non_negative(col(20, "52WeekLow", ColumnType::Float)),
            col(21, "ChangePercent", ColumnType::Float),
        ],
    }
}
