//! Statistical schema inference over a sampled row stream.
//!
//! The engine scans up to a configurable number of rows, gathers per-column
//! [`ColumnStats`], and derives one [`ColumnDef`] per column by comparing
//! type-confidence ratios (matching values over non-empty values) against a
//! threshold. This runs as its own pass over the raw-record stream,
//! independent of the filter/aggregation pipeline.

mod codegen;

use std::collections::HashSet;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AnalysisResult;
use crate::schema::{
    is_bool_literal, ColumnDef, ColumnType, CsvSchema, DEFAULT_DATETIME_FORMAT,
    DEFAULT_DATE_FORMAT, EMAIL_RE,
};

pub use codegen::{schema_to_code, schema_to_json};

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Tuning knobs for schema inference.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Number of rows to analyze (0 = consume the entire stream).
    ///
    /// Uniqueness for enum detection is counted within the sampled rows
    /// only, so with a bounded sample the inferred whitelist may be
    /// incomplete relative to the full dataset.
    pub sample_size: usize,
    /// Minimum confidence ratio to infer a type, in `[0, 1]`.
    pub min_confidence: f64,
    /// Maximum distinct values for a string column to become an enum.
    pub max_unique_for_enum: usize,
    /// Number of sample values to keep per column.
    pub sample_count: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            min_confidence: 0.8,
            max_unique_for_enum: 20,
            sample_count: 5,
        }
    }
}

/// Per-column counters gathered during inference.
///
/// Ephemeral: created at the start of a pass, updated once per non-skipped
/// cell, discarded once the final [`ColumnDef`] is derived.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub index: usize,
    pub name: String,
    pub total_values: usize,
    pub empty_values: usize,
    pub unique_values: HashSet<String>,
    pub numeric_values: usize,
    pub integer_values: usize,
    pub float_values: usize,
    pub bool_values: usize,
    pub date_values: usize,
    pub datetime_values: usize,
    pub email_values: usize,
    pub min_numeric: f64,
    pub max_numeric: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub sample_values: Vec<String>,
}

impl ColumnStats {
    fn new(index: usize, name: String, sample_count: usize) -> Self {
        Self {
            index,
            name,
            total_values: 0,
            empty_values: 0,
            unique_values: HashSet::new(),
            numeric_values: 0,
            integer_values: 0,
            float_values: 0,
            bool_values: 0,
            date_values: 0,
            datetime_values: 0,
            email_values: 0,
            min_numeric: f64::INFINITY,
            max_numeric: f64::NEG_INFINITY,
            min_length: usize::MAX,
            max_length: 0,
            sample_values: Vec::with_capacity(sample_count),
        }
    }

    /// Update the counters with a single cell value.
    fn analyze(&mut self, value: &str, config: &InferenceConfig) {
        self.total_values += 1;

        if value.is_empty() {
            self.empty_values += 1;
            return;
        }

        // Unique values are capped at twice the enum threshold; membership
        // and cardinality are all enum detection needs.
        if self.unique_values.len() < config.max_unique_for_enum * 2 {
            self.unique_values.insert(value.to_string());
        }

        let length = value.len();
        self.min_length = self.min_length.min(length);
        self.max_length = self.max_length.max(length);

        if self.sample_values.len() < config.sample_count {
            self.sample_values.push(value.to_string());
        }

        if let Ok(numeric) = value.parse::<f64>() {
            self.numeric_values += 1;
            self.min_numeric = self.min_numeric.min(numeric);
            self.max_numeric = self.max_numeric.max(numeric);

            if value.parse::<i64>().is_ok() {
                self.integer_values += 1;
            } else {
                self.float_values += 1;
            }
        }

        if is_bool_literal(value.trim()) {
            self.bool_values += 1;
        }

        // A datetime-formatted value also fails the narrower date-only
        // formats, so datetime is tested first and the counts stay disjoint.
        if is_datetime(value) {
            self.datetime_values += 1;
        } else if is_date(value) {
            self.date_values += 1;
        }

        if EMAIL_RE.is_match(value) {
            self.email_values += 1;
        }
    }
}

/// Analyze a CSV stream and infer its schema.
///
/// Malformed rows are skipped, not fatal. Without a header, column names are
/// synthesized as `Column{i}` from the first data row.
pub fn infer_schema<R: Read>(
    reader: R,
    delimiter: u8,
    has_header: bool,
    config: &InferenceConfig,
) -> AnalysisResult<CsvSchema> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut column_stats: Vec<ColumnStats> = Vec::new();
    let mut row_count = 0usize;
    let mut header_pending = has_header;

    for result in rdr.records() {
        let Ok(record) = result else {
            continue; // skip malformed rows
        };

        if header_pending {
            header_pending = false;
            column_stats = record
                .iter()
                .enumerate()
                .map(|(i, name)| ColumnStats::new(i, name.to_string(), config.sample_count))
                .collect();
            continue;
        }

        row_count += 1;

        if column_stats.is_empty() {
            column_stats = (0..record.len())
                .map(|i| ColumnStats::new(i, format!("Column{i}"), config.sample_count))
                .collect();
        }

        for (i, value) in record.iter().enumerate() {
            let Some(stats) = column_stats.get_mut(i) else {
                break; // skip extra columns
            };
            stats.analyze(value, config);
        }

        if config.sample_size > 0 && row_count >= config.sample_size {
            break;
        }
    }

    Ok(CsvSchema {
        min_columns: column_stats.len(),
        strict_columns: false,
        columns: column_stats
            .iter()
            .map(|stats| infer_column_def(stats, config))
            .collect(),
    })
}

/// Derive a column definition from gathered statistics.
///
/// Candidate types are tried in priority order (datetime, date, email, bool,
/// integer, float); the first whose confidence meets the threshold wins,
/// with a string fallback carrying observed length bounds.
pub fn infer_column_def(stats: &ColumnStats, config: &InferenceConfig) -> ColumnDef {
    let mut col = ColumnDef {
        index: stats.index,
        name: stats.name.clone(),
        ..ColumnDef::default()
    };

    let non_empty = stats.total_values - stats.empty_values;
    if non_empty == 0 {
        return col; // all empty: optional string
    }

    let confidence = |count: usize| count as f64 / non_empty as f64;

    if confidence(stats.datetime_values) >= config.min_confidence {
        col.data_type = ColumnType::DateTime;
        col.date_format = Some(detect_format(
            &stats.sample_values,
            &DATETIME_FORMATS,
            is_datetime_format,
            DEFAULT_DATETIME_FORMAT,
        ));
    } else if confidence(stats.date_values) >= config.min_confidence {
        col.data_type = ColumnType::Date;
        col.date_format = Some(detect_format(
            &stats.sample_values,
            &DATE_FORMATS,
            is_date_format,
            DEFAULT_DATE_FORMAT,
        ));
    } else if confidence(stats.email_values) >= config.min_confidence {
        col.data_type = ColumnType::Email;
    } else if confidence(stats.bool_values) >= config.min_confidence {
        col.data_type = ColumnType::Bool;
    } else if confidence(stats.integer_values) >= config.min_confidence {
        col.data_type = ColumnType::Int;
        (col.min, col.max) = numeric_bounds(stats);
    } else if confidence(stats.numeric_values) >= config.min_confidence {
        col.data_type = ColumnType::Float;
        (col.min, col.max) = numeric_bounds(stats);
    } else {
        col.data_type = ColumnType::String;
        if stats.min_length != usize::MAX && stats.min_length > 0 {
            col.min_length = stats.min_length;
        }
        col.max_length = stats.max_length;
    }

    let unique = stats.unique_values.len();
    if col.data_type == ColumnType::String && unique > 0 && unique <= config.max_unique_for_enum {
        let mut allowed: Vec<String> = stats.unique_values.iter().cloned().collect();
        allowed.sort(); // deterministic output
        col.allowed_values = allowed;
    }

    let empty_ratio = stats.empty_values as f64 / stats.total_values as f64;
    col.required = empty_ratio < 0.05;

    col
}

fn numeric_bounds(stats: &ColumnStats) -> (Option<f64>, Option<f64>) {
    (
        stats.min_numeric.is_finite().then_some(stats.min_numeric),
        stats.max_numeric.is_finite().then_some(stats.max_numeric),
    )
}

fn is_date_format(value: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(value, format).is_ok()
}

fn is_datetime_format(value: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(value, format).is_ok()
}

fn is_date(value: &str) -> bool {
    DATE_FORMATS.iter().any(|f| is_date_format(value, f))
}

fn is_datetime(value: &str) -> bool {
    DATETIME_FORMATS.iter().any(|f| is_datetime_format(value, f))
}

// First format (in priority order) that parses any of the samples.
fn detect_format(
    samples: &[String],
    formats: &[&str],
    matches: fn(&str, &str) -> bool,
    default: &str,
) -> String {
    for format in formats {
        if samples.iter().any(|sample| matches(sample, format)) {
            return (*format).to_string();
        }
    }
    default.to_string()
}

#[cfg(test)]
mod tests {
    use super::{infer_schema, InferenceConfig};
    use crate::schema::ColumnType;

    fn config() -> InferenceConfig {
        InferenceConfig::default()
    }

    #[test]
    fn infers_types_from_headered_csv() {
        let input = "\
id,price,active,day,at,contact,label
1,10.5,true,2024-03-01,2024-03-01 09:30:00,ada@example.com,alpha
2,11.0,false,2024-03-02,2024-03-02 09:30:00,bob@example.com,beta
3,12.25,yes,2024-03-03,2024-03-03 09:30:00,eve@example.com,alpha
";
        let schema = infer_schema(input.as_bytes(), b',', true, &config()).unwrap();
        assert_eq!(schema.min_columns, 7);

        let types: Vec<ColumnType> = schema.columns.iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Int,
                ColumnType::Float,
                ColumnType::Bool,
                ColumnType::Date,
                ColumnType::DateTime,
                ColumnType::Email,
                ColumnType::String,
            ]
        );

        assert_eq!(schema.columns[0].min, Some(1.0));
        assert_eq!(schema.columns[0].max, Some(3.0));
        assert_eq!(schema.columns[3].date_format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(
            schema.columns[4].date_format.as_deref(),
            Some("%Y-%m-%d %H:%M:%S")
        );
    }

    #[test]
    fn synthesizes_column_names_without_header() {
        let input = "1,a\n2,b\n";
        let schema = infer_schema(input.as_bytes(), b',', false, &config()).unwrap();
        assert_eq!(schema.columns[0].name, "Column0");
        assert_eq!(schema.columns[1].name, "Column1");
        assert_eq!(schema.columns[0].data_type, ColumnType::Int);
    }

    #[test]
    fn integer_column_with_empties_meets_confidence() {
        // 950 integers, 50 empty: confidence over non-empty values is 1.0
        // and the 5% empty ratio boundary makes the column optional.
        let mut input = String::from("n,filler\n");
        for i in 0..950 {
            input.push_str(&format!("{i},x\n"));
        }
        for _ in 0..50 {
            input.push_str(",x\n");
        }

        let mut cfg = config();
        cfg.sample_size = 0;
        let schema = infer_schema(input.as_bytes(), b',', true, &cfg).unwrap();
        assert_eq!(schema.columns[0].data_type, ColumnType::Int);
        assert!(!schema.columns[0].required);
    }

    #[test]
    fn low_integer_ratio_falls_back_to_string() {
        // 60% integers, 40% arbitrary strings: below the 0.8 threshold.
        let mut input = String::from("n\n");
        for i in 0..60 {
            input.push_str(&format!("{i}\n"));
        }
        for i in 0..40 {
            input.push_str(&format!("value-{i}-xyz\n"));
        }

        let mut cfg = config();
        cfg.sample_size = 0;
        cfg.max_unique_for_enum = 5; // 100 distinct values: no enum either
        let schema = infer_schema(input.as_bytes(), b',', true, &cfg).unwrap();
        assert_eq!(schema.columns[0].data_type, ColumnType::String);
        assert!(schema.columns[0].allowed_values.is_empty());
    }

    #[test]
    fn enum_detected_at_or_under_threshold() {
        let mut input = String::from("exchange\n");
        for _ in 0..30 {
            input.push_str("NYSE\nNASDAQ\nLSE\n");
        }

        let mut cfg = config();
        cfg.max_unique_for_enum = 3;
        let schema = infer_schema(input.as_bytes(), b',', true, &cfg).unwrap();
        assert_eq!(
            schema.columns[0].allowed_values,
            vec!["LSE", "NASDAQ", "NYSE"]
        );

        cfg.max_unique_for_enum = 2;
        let schema = infer_schema(input.as_bytes(), b',', true, &cfg).unwrap();
        assert!(schema.columns[0].allowed_values.is_empty());
    }

    #[test]
    fn datetime_is_not_reported_as_date() {
        let input = "at\n2024-03-01 09:30:00\n2024-03-02 10:00:00\n";
        let schema = infer_schema(input.as_bytes(), b',', true, &config()).unwrap();
        assert_eq!(schema.columns[0].data_type, ColumnType::DateTime);
    }

    #[test]
    fn sample_size_bounds_the_scan() {
        // The first two data rows are integers; the strings after the cutoff
        // must not be seen.
        let input = "n\n1\n2\nnot-a-number\nalso-not\n";
        let mut cfg = config();
        cfg.sample_size = 2;
        let schema = infer_schema(input.as_bytes(), b',', true, &cfg).unwrap();
        assert_eq!(schema.columns[0].data_type, ColumnType::Int);
    }

    #[test]
    fn all_empty_column_defaults_to_optional_string() {
        let input = "a,b\n1,\n2,\n";
        let schema = infer_schema(input.as_bytes(), b',', true, &config()).unwrap();
        assert_eq!(schema.columns[1].data_type, ColumnType::String);
        assert!(!schema.columns[1].required);
    }

    #[test]
    fn custom_delimiter_is_honored() {
        let input = "a;b\n1;x\n2;y\n";
        let schema = infer_schema(input.as_bytes(), b';', true, &config()).unwrap();
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].data_type, ColumnType::Int);
    }
}
