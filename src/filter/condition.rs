//! Single filter conditions: `column op value`.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::error::{AnalysisError, AnalysisResult};

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
}

impl FilterOperator {
    /// Operators for which the right-hand value is pre-parsed as a float.
    fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Gt | Self::Ge | Self::Lt | Self::Le
        )
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Regex => "~=",
        }
    }
}

// Ordered so that multi-character operators are tried before their
// single-character prefixes (">=" before ">").
const OPERATOR_TOKENS: [(FilterOperator, &str); 10] = [
    (FilterOperator::Ge, " >= "),
    (FilterOperator::Le, " <= "),
    (FilterOperator::Ne, " != "),
    (FilterOperator::Regex, " ~= "),
    (FilterOperator::Eq, " = "),
    (FilterOperator::Gt, " > "),
    (FilterOperator::Lt, " < "),
    (FilterOperator::Contains, " contains "),
    (FilterOperator::StartsWith, " startswith "),
    (FilterOperator::EndsWith, " endswith "),
];

/// A single parsed filter condition.
///
/// Built once at parse time and shared read-only by every row evaluation:
/// the numeric value is pre-parsed and the regex pattern pre-compiled, so
/// evaluation never re-tokenizes anything.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Column index to filter on.
    pub column_index: usize,
    /// Column name (for display).
    pub column_name: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Right-hand value, quotes stripped.
    pub value: String,
    /// Pre-parsed numeric value for numeric comparisons.
    pub numeric_value: Option<f64>,
    /// Compiled pattern for the regex operator.
    pub pattern: Option<Regex>,
}

impl Filter {
    /// Parse a condition like `amount > 100` or `symbol = 'AAPL'`.
    ///
    /// The left side is a 0-based column index or, with a header, a
    /// case-insensitive column name. One layer of matching single or double
    /// quotes is stripped from the value.
    pub fn parse(expr: &str, header: Option<&[String]>) -> AnalysisResult<Self> {
        let expr = expr.trim();

        let mut split = None;
        for (op, token) in OPERATOR_TOKENS {
            if let Some(idx) = expr.find(token) {
                split = Some((op, expr[..idx].trim(), expr[idx + token.len()..].trim()));
                break;
            }
        }
        let Some((operator, left, right)) = split else {
            return Err(AnalysisError::filter_parse(expr, "no operator found"));
        };

        let (column_index, column_name) = resolve_column(expr, left, header)?;
        let value = strip_quotes(right).to_string();

        let numeric_value = if operator.is_comparison() {
            value.parse::<f64>().ok()
        } else {
            None
        };

        let pattern = if operator == FilterOperator::Regex {
            Some(Regex::new(&value).map_err(|e| {
                AnalysisError::filter_parse(expr, format!("invalid regex pattern {value:?}: {e}"))
            })?)
        } else {
            None
        };

        Ok(Self {
            column_index,
            column_name,
            operator,
            value,
            numeric_value,
            pattern,
        })
    }

    /// Check whether a record matches this condition.
    ///
    /// Numeric comparisons degrade gracefully: a cell that does not parse as
    /// a number makes `=`/`>`/`>=`/`<`/`<=` evaluate `false` and `!=`
    /// evaluate `true`, so one heterogeneous column never aborts a scan. An
    /// out-of-range column index, on the other hand, is an error.
    pub fn evaluate<S: AsRef<str>>(&self, record: &[S]) -> AnalysisResult<bool> {
        let cell = record
            .get(self.column_index)
            .ok_or(AnalysisError::ColumnOutOfRange {
                index: self.column_index,
                len: record.len(),
            })?
            .as_ref();

        Ok(match self.operator {
            FilterOperator::Eq => match self.numeric_value {
                Some(n) => cell.parse::<f64>().map(|v| v == n).unwrap_or(false),
                None => cell == self.value,
            },
            FilterOperator::Ne => match self.numeric_value {
                Some(n) => cell.parse::<f64>().map(|v| v != n).unwrap_or(true),
                None => cell != self.value,
            },
            FilterOperator::Gt => self.ordered(cell, Ordering::is_gt),
            FilterOperator::Ge => self.ordered(cell, Ordering::is_ge),
            FilterOperator::Lt => self.ordered(cell, Ordering::is_lt),
            FilterOperator::Le => self.ordered(cell, Ordering::is_le),
            FilterOperator::Contains => cell.contains(&self.value),
            FilterOperator::StartsWith => cell.starts_with(&self.value),
            FilterOperator::EndsWith => cell.ends_with(&self.value),
            FilterOperator::Regex => self
                .pattern
                .as_ref()
                .map(|p| p.is_match(cell))
                .unwrap_or(false),
        })
    }

    // Ordering comparison. With a numeric right-hand value the cell must
    // parse as a float; a non-numeric right-hand value falls back to
    // lexicographic comparison.
    fn ordered(&self, cell: &str, pred: fn(Ordering) -> bool) -> bool {
        match self.numeric_value {
            Some(n) => match cell.parse::<f64>() {
                Ok(v) => v.partial_cmp(&n).map(pred).unwrap_or(false),
                Err(_) => false,
            },
            None => pred(cell.cmp(self.value.as_str())),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:?}",
            self.column_name,
            self.operator.symbol(),
            self.value
        )
    }
}

fn resolve_column(
    expr: &str,
    left: &str,
    header: Option<&[String]>,
) -> AnalysisResult<(usize, String)> {
    if let Ok(idx) = left.parse::<usize>() {
        let name = match header.and_then(|h| h.get(idx)) {
            Some(name) => name.clone(),
            None => format!("col_{idx}"),
        };
        return Ok((idx, name));
    }

    let Some(header) = header else {
        return Err(AnalysisError::filter_parse(
            expr,
            format!("column name {left:?} used but no header provided"),
        ));
    };

    header
        .iter()
        .position(|name| name.eq_ignore_ascii_case(left))
        .map(|idx| (idx, header[idx].clone()))
        .ok_or_else(|| {
            AnalysisError::filter_parse(expr, format!("column {left:?} not found in header"))
        })
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
