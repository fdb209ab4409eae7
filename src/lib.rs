//! `csv-stream-analysis` is a small library for analyzing CSV streams in a
//! single pass: boolean filter expressions evaluated per row, statistical
//! schema inference, declarative schema validation, and composable streaming
//! aggregation.
//!
//! Nothing is materialized: rows flow from a CSV reader through optional
//! validation and filtering into a set of aggregators, one row at a time.
//!
//! ## Filter expressions
//!
//! Predicates support AND/OR (AND binds tighter) and parentheses, with
//! columns referenced by name (against a header) or 0-based index:
//!
//! ```rust
//! use csv_stream_analysis::filter::FilterSet;
//!
//! # fn main() -> Result<(), csv_stream_analysis::AnalysisError> {
//! let header: Vec<String> = ["Symbol", "Price", "Volume", "Exchange"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let fs = FilterSet::parse(
//!     "Price > 100 AND Volume > 1000 OR Exchange = 'NYSE'",
//!     Some(header.as_slice()),
//! )?;
//!
//! assert!(fs.evaluate(&["AAPL", "150", "2000", "NASDAQ"])?);
//! assert!(fs.evaluate(&["F", "12", "500", "NYSE"])?); // OR branch
//! assert!(!fs.evaluate(&["F", "12", "500", "NASDAQ"])?);
//! # Ok(())
//! # }
//! ```
//!
//! ## One-pass aggregation
//!
//! ```rust
//! use csv_stream_analysis::aggregate::{
//!     Aggregator, CompositeAggregator, GlobalAmountAggregator, GroupByAggregator,
//! };
//! use csv_stream_analysis::pipeline::{run_pipeline, PipelineConfig};
//! use csv_stream_analysis::row::RowLayout;
//!
//! # fn main() -> Result<(), csv_stream_analysis::AnalysisError> {
//! let input = "\
//! Symbol,Price,Exchange
//! AAPL,150.5,NASDAQ
//! MSFT,99.0,NASDAQ
//! SHEL,61.2,LSE
//! ";
//!
//! let config = PipelineConfig {
//!     has_header: true,
//!     layout: RowLayout::with_group_by(1, 2),
//!     ..PipelineConfig::default()
//! };
//!
//! let mut aggregator = CompositeAggregator::default();
//! aggregator.push(Box::new(GlobalAmountAggregator::new()));
//! aggregator.push(Box::new(GroupByAggregator::new()));
//!
//! let summary = run_pipeline(input.as_bytes(), &config, &mut aggregator, None)?;
//! assert_eq!(summary.valid_rows, 3);
//!
//! let mut report = Vec::new();
//! aggregator.report(&mut report)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Schema inference
//!
//! ```rust
//! use csv_stream_analysis::inference::{infer_schema, InferenceConfig};
//! use csv_stream_analysis::schema::ColumnType;
//!
//! # fn main() -> Result<(), csv_stream_analysis::AnalysisError> {
//! let input = "id,name\n1,Ada\n2,Grace\n";
//! let schema = infer_schema(input.as_bytes(), b',', true, &InferenceConfig::default())?;
//!
//! assert_eq!(schema.columns[0].data_type, ColumnType::Int);
//! assert_eq!(schema.columns[1].data_type, ColumnType::String);
//! // Inferred bounds and enums are enforced on later records.
//! assert!(schema.validate_record(&["2".to_string(), "Grace".to_string()]).is_ok());
//! assert!(schema.validate_record(&["9".to_string(), "Grace".to_string()]).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`filter`]: filter expression parsing and per-row evaluation
//! - [`schema`]: declarative column schemas and record validation
//! - [`inference`]: statistical schema inference + code/JSON rendering
//! - [`aggregate`]: streaming aggregators and the composite fan-out
//! - [`pipeline`]: the read → validate → filter → parse → aggregate loop
//! - [`row`] / [`stats`]: the typed row and its streaming accumulator
//! - [`error`]: error types used across the crate

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod inference;
pub mod pipeline;
pub mod row;
pub mod schema;
pub mod stats;

pub use error::{AnalysisError, AnalysisResult};
