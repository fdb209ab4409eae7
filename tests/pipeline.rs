use csv_stream_analysis::aggregate::{
    Aggregator, CompositeAggregator, GlobalAmountAggregator, GroupByAggregator,
};
use csv_stream_analysis::pipeline::{run_pipeline, PipelineConfig, PipelineSummary};
use csv_stream_analysis::row::RowLayout;
use csv_stream_analysis::schema::{ColumnDef, ColumnType, CsvSchema};

const TRADES: &str = "\
Symbol,Exchange,Price,Volume
AAPL,NASDAQ,150.25,2000
MSFT,NASDAQ,410.10,1500
SHEL,LSE,61.20,900
AAPL,NASDAQ,150.75,1200
SONY,TSE,88.75,3000
BAD,NASDAQ,not-a-number,100
";

fn config() -> PipelineConfig {
    PipelineConfig {
        has_header: true,
        layout: RowLayout::with_group_by(2, 1), // amount = Price, group = Exchange
        ..PipelineConfig::default()
    }
}

#[test]
fn full_run_aggregates_globally_and_per_group() {
    let mut aggregator = CompositeAggregator::default();
    aggregator.push(Box::new(GlobalAmountAggregator::new()));
    aggregator.push(Box::new(GroupByAggregator::new()));

    let summary = run_pipeline(TRADES.as_bytes(), &config(), &mut aggregator, None).unwrap();

    assert_eq!(
        summary,
        PipelineSummary {
            total_rows: 6,
            valid_rows: 5,
            invalid_rows: 1, // the non-numeric price
            filtered_out: 0,
            validation_failures: 0,
        }
    );

    let mut out = Vec::new();
    aggregator.report(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.contains("=== Amount stats (global) ==="));
    assert!(report.contains("Count:   5"));
    assert!(report.contains("Sum:     861.05"));
    assert!(report.contains("Min:     61.20"));
    assert!(report.contains("Max:     410.10"));

    assert!(report.contains("=== Group-by statistics ==="));
    assert!(report.contains("Number of groups: 3"));
    // NASDAQ has the largest total (711.10) and must be listed first.
    assert!(report.contains("[1] NASDAQ"));
}

#[test]
fn filter_reduces_what_reaches_the_aggregators() {
    let mut cfg = config();
    cfg.filter_exprs = vec!["Price > 100 AND Exchange = 'NASDAQ'".to_string()];

    let mut agg = GroupByAggregator::new();
    let summary = run_pipeline(TRADES.as_bytes(), &cfg, &mut agg, None).unwrap();

    // AAPL x2 and MSFT pass; the bad-price row fails the comparison and is
    // filtered out rather than erroring.
    assert_eq!(summary.valid_rows, 3);
    assert_eq!(summary.filtered_out, 3);
    assert_eq!(summary.invalid_rows, 0);
    assert_eq!(agg.group_count(), 1);
    assert_eq!(agg.group("NASDAQ").unwrap().count, 3);
}

#[test]
fn or_filter_spans_groups() {
    let mut cfg = config();
    cfg.filter_exprs = vec!["Exchange = 'LSE' OR Exchange = 'TSE'".to_string()];

    let mut agg = GroupByAggregator::new();
    let summary = run_pipeline(TRADES.as_bytes(), &cfg, &mut agg, None).unwrap();

    assert_eq!(summary.valid_rows, 2);
    assert_eq!(agg.group("LSE").unwrap().sum, 61.20);
    assert_eq!(agg.group("TSE").unwrap().sum, 88.75);
}

#[test]
fn schema_rejects_rows_before_filtering_and_parsing() {
    let mut cfg = config();
    cfg.schema = Some(CsvSchema {
        min_columns: 4,
        strict_columns: false,
        columns: vec![ColumnDef {
            index: 2,
            name: "Price".to_string(),
            data_type: ColumnType::Float,
            required: true,
            min: Some(0.0),
            ..ColumnDef::default()
        }],
    });

    let mut agg = GlobalAmountAggregator::new();
    let summary = run_pipeline(TRADES.as_bytes(), &cfg, &mut agg, None).unwrap();

    // The non-numeric price now fails validation instead of row parsing.
    assert_eq!(summary.validation_failures, 1);
    assert_eq!(summary.invalid_rows, 0);
    assert_eq!(summary.valid_rows, 5);
    assert_eq!(agg.stats().count, 5);
}

#[test]
fn positional_filters_work_without_header() {
    let input = "\
AAPL,NASDAQ,150.25,2000
SHEL,LSE,61.20,900
";
    let cfg = PipelineConfig {
        has_header: false,
        layout: RowLayout::new(2),
        filter_exprs: vec!["2 > 100".to_string()],
        ..PipelineConfig::default()
    };

    let mut agg = GlobalAmountAggregator::new();
    let summary = run_pipeline(input.as_bytes(), &cfg, &mut agg, None).unwrap();

    assert_eq!(summary.valid_rows, 1);
    assert_eq!(summary.filtered_out, 1);
    assert_eq!(agg.stats().sum, 150.25);
}

#[test]
fn header_only_input_processes_zero_rows() {
    let input = "Symbol,Exchange,Price,Volume\n";
    let mut agg = GlobalAmountAggregator::new();
    let summary = run_pipeline(input.as_bytes(), &config(), &mut agg, None).unwrap();
    assert_eq!(summary, PipelineSummary::default());
    assert!(!agg.stats().has_data());
}
