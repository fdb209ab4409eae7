//! Streaming entry point: read → validate → filter → parse → aggregate.
//!
//! One row is read, checked and fanned out to the aggregators before the
//! next row is read. There is no overlap and no background work: row order
//! is preserved for deterministic debug output and stable group-by
//! accumulation, and per-row cost is cheap enough that I/O dominates.
//!
//! Per-row failures (validation, filter evaluation, amount parsing) skip the
//! offending row and keep the stream going; a malformed row must not stop a
//! bulk scan. They are counted in the summary and reported to an optional
//! observer, never silently dropped.

use std::io::Read;

use crate::aggregate::{Aggregator, DebugAggregator};
use crate::error::{AnalysisError, AnalysisResult};
use crate::filter::FilterSet;
use crate::row::{LogicalRow, RowLayout};
use crate::schema::{CsvSchema, ValidationError};

/// Configuration for one pipeline run.
///
/// An explicit struct handed to [`run_pipeline`]; the core keeps no
/// process-wide mutable state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// CSV field delimiter.
    pub delimiter: u8,
    /// Whether the first row is a header (also enables name-based filters).
    pub has_header: bool,
    /// Where the amount and group-by columns live.
    pub layout: RowLayout,
    /// Optional schema; records failing validation are skipped and counted.
    pub schema: Option<CsvSchema>,
    /// Filter expressions, combined with AND. Parsed after the header is
    /// read, before any data row is processed.
    pub filter_exprs: Vec<String>,
    /// Print the first N rows that reach the aggregation layer (0 = off).
    pub show_first: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
            layout: RowLayout::new(8),
            schema: None,
            filter_exprs: Vec::new(),
            show_first: 0,
        }
    }
}

/// Row counts from a completed pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Data rows read (header excluded).
    pub total_rows: usize,
    /// Rows parsed and fed to the aggregators.
    pub valid_rows: usize,
    /// Rows skipped because of an amount-parse or filter-evaluation error.
    pub invalid_rows: usize,
    /// Rows rejected by the filter.
    pub filtered_out: usize,
    /// Rows rejected by schema validation.
    pub validation_failures: usize,
}

/// Callbacks for per-row events during a pipeline run.
///
/// All methods default to no-ops, so implementors only override what they
/// care about.
pub trait PipelineObserver {
    /// A row was skipped because it could not be parsed or evaluated.
    fn on_invalid_row(&self, _row: usize, _error: &AnalysisError) {}

    /// A row was rejected by schema validation.
    fn on_validation_failure(&self, _row: usize, _error: &ValidationError) {}

    /// A row was skipped because the filter could not be evaluated against
    /// it (e.g. a referenced column is out of range).
    fn on_filter_error(&self, _row: usize, _error: &AnalysisError) {}

    /// The run finished.
    fn on_complete(&self, _summary: &PipelineSummary) {}
}

/// Logs pipeline events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_invalid_row(&self, row: usize, error: &AnalysisError) {
        eprintln!("[pipeline] skipping invalid row {row}: {error}");
    }

    fn on_validation_failure(&self, row: usize, error: &ValidationError) {
        eprintln!("[pipeline] row {row} failed validation: {error}");
    }

    fn on_filter_error(&self, row: usize, error: &AnalysisError) {
        eprintln!("[pipeline] filter failed on row {row}: {error}");
    }

    fn on_complete(&self, summary: &PipelineSummary) {
        eprintln!(
            "[pipeline] done: total={} valid={} invalid={} filtered={} validation_failures={}",
            summary.total_rows,
            summary.valid_rows,
            summary.invalid_rows,
            summary.filtered_out,
            summary.validation_failures
        );
    }
}

/// Run the streaming pipeline over a CSV source.
///
/// Filter expressions are parsed up front (against the header when there is
/// one); a parse failure surfaces before any row is processed. Rows then
/// flow through validation, filtering and [`LogicalRow`] parsing into the
/// aggregator, one at a time.
pub fn run_pipeline<R: Read>(
    reader: R,
    config: &PipelineConfig,
    aggregator: &mut dyn Aggregator,
    observer: Option<&dyn PipelineObserver>,
) -> AnalysisResult<PipelineSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();

    let header: Option<Vec<String>> = if config.has_header {
        match records.next() {
            Some(result) => Some(result?.iter().map(str::to_string).collect()),
            None => None,
        }
    } else {
        None
    };

    let filter = if config.filter_exprs.is_empty() {
        None
    } else {
        Some(FilterSet::from_exprs(
            &config.filter_exprs,
            header.as_deref(),
        )?)
    };

    let mut debug = (config.show_first > 0).then(|| DebugAggregator::new(config.show_first));

    let mut summary = PipelineSummary::default();

    for result in records {
        let record = result?;
        summary.total_rows += 1;
        let row_number = summary.total_rows;

        let record: Vec<String> = record.iter().map(str::to_string).collect();

        if let Some(schema) = &config.schema {
            if let Err(e) = schema.validate_record(&record) {
                summary.validation_failures += 1;
                if let Some(obs) = observer {
                    obs.on_validation_failure(row_number, &e);
                }
                continue;
            }
        }

        if let Some(filter) = &filter {
            match filter.evaluate(&record) {
                Ok(true) => {}
                Ok(false) => {
                    summary.filtered_out += 1;
                    continue;
                }
                Err(e) => {
                    summary.invalid_rows += 1;
                    if let Some(obs) = observer {
                        obs.on_filter_error(row_number, &e);
                    }
                    continue;
                }
            }
        }

        match LogicalRow::parse(&record, config.layout) {
            Ok(row) => {
                summary.valid_rows += 1;
                if let Some(debug) = debug.as_mut() {
                    debug.consume(&row);
                }
                aggregator.consume(&row);
            }
            Err(e) => {
                summary.invalid_rows += 1;
                if let Some(obs) = observer {
                    obs.on_invalid_row(row_number, &e);
                }
            }
        }
    }

    if let Some(obs) = observer {
        obs.on_complete(&summary);
    }

    Ok(summary)
}
