//! Typed view of one CSV record for the aggregation layer.

use crate::error::{AnalysisError, AnalysisResult};

/// Where the typed fields live inside a raw record.
///
/// Replaces per-call magic indexes: the pipeline is handed one layout and
/// applies it to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Index of the numeric amount column.
    pub amount_index: usize,
    /// Optional index of the group-by key column.
    pub group_by: Option<usize>,
}

impl RowLayout {
    /// Layout with only an amount column.
    pub fn new(amount_index: usize) -> Self {
        Self {
            amount_index,
            group_by: None,
        }
    }

    /// Layout with an amount column and a group-by key column.
    pub fn with_group_by(amount_index: usize, group_by: usize) -> Self {
        Self {
            amount_index,
            group_by: Some(group_by),
        }
    }
}

/// A cleaned, typed version of a CSV record.
///
/// Only the fields the aggregation layer needs: the parsed amount and an
/// optional group-by key. A row that fails to parse is never constructed;
/// the caller gets an error and drops the record upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRow {
    /// The original record, kept for debug output.
    pub raw: Vec<String>,
    /// Parsed numeric amount column.
    pub amount: f64,
    /// Group-by key, when the layout has one and the record covers it.
    pub group_key: Option<String>,
}

impl LogicalRow {
    /// Parse a raw record into a [`LogicalRow`] according to `layout`.
    ///
    /// Fails if the amount column is missing or not a number. A group-by
    /// index beyond the record is not an error; the key is just absent.
    pub fn parse(record: &[String], layout: RowLayout) -> AnalysisResult<Self> {
        let raw_amount =
            record
                .get(layout.amount_index)
                .ok_or(AnalysisError::MissingColumn {
                    index: layout.amount_index,
                    len: record.len(),
                })?;

        let amount = raw_amount
            .parse::<f64>()
            .map_err(|e| AnalysisError::InvalidAmount {
                index: layout.amount_index,
                raw: raw_amount.clone(),
                message: e.to_string(),
            })?;

        let group_key = layout
            .group_by
            .and_then(|idx| record.get(idx))
            .map(|key| key.clone());

        Ok(Self {
            raw: record.to_vec(),
            amount,
            group_key,
        })
    }
}
