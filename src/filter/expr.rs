//! Boolean expression trees over filter conditions.
//!
//! Textual predicates like `(Price > 100 OR Volume > 5000) AND Exchange =
//! 'NASDAQ'` parse into a tree of leaf [`Filter`] conditions and AND/OR
//! groups. AND binds tighter than OR; parentheses force explicit grouping.

use std::fmt;

use crate::error::{AnalysisError, AnalysisResult};
use crate::filter::condition::Filter;

/// Logical connective of a group node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Parsed filter expression: a leaf condition or an AND/OR group.
///
/// Owned tree, no cycles; each node belongs to exactly one parent.
#[derive(Debug, Clone)]
pub enum FilterExpr {
    /// A single `column op value` condition.
    Condition(Filter),
    /// An AND/OR combination of sub-expressions, evaluated left to right.
    Group {
        op: LogicOp,
        children: Vec<FilterExpr>,
    },
}

impl FilterExpr {
    /// Parse a textual predicate into an expression tree.
    ///
    /// Splitting happens at parenthesis depth 0, on ` OR ` before ` AND ` so
    /// that OR binds looser. A lone token wrapped in matching parentheses is
    /// unwrapped one layer and reparsed; anything else is a single condition.
    pub fn parse(expr: &str, header: Option<&[String]>) -> AnalysisResult<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(AnalysisError::filter_parse(expr, "empty expression"));
        }

        let or_parts = split_top_level(expr, " OR ")?;
        if or_parts.len() > 1 {
            let children = or_parts
                .into_iter()
                .map(|part| Self::parse(part, header))
                .collect::<AnalysisResult<Vec<_>>>()?;
            return Ok(Self::Group {
                op: LogicOp::Or,
                children,
            });
        }

        let and_parts = split_top_level(expr, " AND ")?;
        if and_parts.len() > 1 {
            let children = and_parts
                .into_iter()
                .map(|part| Self::parse(part, header))
                .collect::<AnalysisResult<Vec<_>>>()?;
            return Ok(Self::Group {
                op: LogicOp::And,
                children,
            });
        }

        if let Some(inner) = strip_outer_parens(expr) {
            return Self::parse(inner, header);
        }

        Filter::parse(expr, header).map(Self::Condition)
    }

    /// Evaluate the expression against one record.
    ///
    /// Children are evaluated left to right with short-circuiting: AND stops
    /// at the first `false`, OR at the first `true`. The first error
    /// encountered propagates without evaluating the remaining children.
    /// An empty group evaluates to `true` (only the degenerate empty filter
    /// set produces one).
    pub fn evaluate<S: AsRef<str>>(&self, record: &[S]) -> AnalysisResult<bool> {
        match self {
            Self::Condition(filter) => filter.evaluate(record),
            Self::Group { op, children } => match op {
                LogicOp::And => {
                    for child in children {
                        if !child.evaluate(record)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                LogicOp::Or => {
                    if children.is_empty() {
                        return Ok(true);
                    }
                    for child in children {
                        if child.evaluate(record)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
            },
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition(filter) => write!(f, "{filter}"),
            Self::Group { op, children } => {
                let joiner = match op {
                    LogicOp::And => " AND ",
                    LogicOp::Or => " OR ",
                };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    match child {
                        Self::Group { .. } => write!(f, "({child})")?,
                        Self::Condition(_) => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

// Split `expr` on `separator` occurrences at parenthesis depth 0. Returns a
// single-element vec when the separator never occurs at top level. Errors on
// unbalanced parentheses.
fn split_top_level<'a>(expr: &'a str, separator: &str) -> AnalysisResult<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    // Byte-wise scan; the separator is ASCII, so it can never match starting
    // inside a multi-byte character and every slice boundary below is valid.
    let bytes = expr.as_bytes();
    let sep = separator.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(AnalysisError::filter_parse(expr, "unbalanced parentheses"));
                }
            }
            _ if depth == 0 && bytes[i..].starts_with(sep) => {
                parts.push(expr[start..i].trim());
                i += separator.len();
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if depth != 0 {
        return Err(AnalysisError::filter_parse(expr, "unbalanced parentheses"));
    }

    parts.push(expr[start..].trim());
    Ok(parts)
}

// If the whole expression is wrapped in one matching pair of parentheses,
// return the inside. `(a) AND (b)` is not wrapped: the first `(` closes
// before the end.
fn strip_outer_parens(expr: &str) -> Option<&str> {
    let bytes = expr.as_bytes();
    if bytes.first() != Some(&b'(') || bytes.last() != Some(&b')') {
        return None;
    }

    let mut depth = 0;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return (i == bytes.len() - 1).then(|| expr[1..expr.len() - 1].trim());
                }
            }
            _ => {}
        }
    }
    None
}
