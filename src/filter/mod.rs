//! Filter expression engine: textual predicates parsed once into an
//! expression tree, evaluated per row without re-tokenizing.
//!
//! Grammar (informal):
//!
//! ```text
//! expr      := term (("AND" | "OR") term)*
//! term      := "(" expr ")" | condition
//! condition := column op value
//! op        := ">=" | "<=" | "!=" | "~=" | "=" | ">" | "<"
//!            | "contains" | "startswith" | "endswith"
//! column    := integer | identifier
//! value     := quoted-string | bare-token
//! ```

mod condition;
mod expr;

use std::fmt;

use crate::error::AnalysisResult;

pub use condition::{Filter, FilterOperator};
pub use expr::{FilterExpr, LogicOp};

/// A ready-to-evaluate filter: one expression tree.
///
/// Flat lists of simple expressions are a convenience constructor that
/// builds an all-AND tree; there is no separate flat representation.
#[derive(Debug, Clone)]
pub struct FilterSet {
    root: FilterExpr,
}

impl FilterSet {
    /// Parse a single (possibly complex) predicate.
    pub fn parse(expr: &str, header: Option<&[String]>) -> AnalysisResult<Self> {
        Ok(Self {
            root: FilterExpr::parse(expr, header)?,
        })
    }

    /// Build a filter set from multiple expressions combined with AND.
    ///
    /// An empty list yields a filter that matches every record.
    pub fn from_exprs<E: AsRef<str>>(
        exprs: &[E],
        header: Option<&[String]>,
    ) -> AnalysisResult<Self> {
        let children = exprs
            .iter()
            .map(|expr| FilterExpr::parse(expr.as_ref(), header))
            .collect::<AnalysisResult<Vec<_>>>()?;

        Ok(Self {
            root: FilterExpr::Group {
                op: LogicOp::And,
                children,
            },
        })
    }

    /// Check whether a record matches.
    pub fn evaluate<S: AsRef<str>>(&self, record: &[S]) -> AnalysisResult<bool> {
        self.root.evaluate(record)
    }

    /// The underlying expression tree.
    pub fn root(&self) -> &FilterExpr {
        &self.root
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            FilterExpr::Group { children, .. } if children.is_empty() => f.write_str("no filters"),
            root => write!(f, "{root}"),
        }
    }
}
