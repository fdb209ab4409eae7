//! Streaming aggregation over [`LogicalRow`]s.
//!
//! Each aggregator consumes rows one at a time and renders a human-readable
//! report at the end of the pass. [`CompositeAggregator`] fans both calls out
//! to a list of independent aggregators so several aggregations run in a
//! single pass over the stream.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::row::LogicalRow;
use crate::stats::AmountStats;

/// A consumer of logical rows.
///
/// `consume` must not fail: invalid rows are filtered upstream, before the
/// aggregation layer ever sees them. `report` writes human-readable text to
/// a caller-supplied sink.
pub trait Aggregator {
    /// Feed one row into the aggregation.
    fn consume(&mut self, row: &LogicalRow);

    /// Write the final report.
    fn report(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Fans each row out to a fixed list of aggregators in one call.
///
/// Reports are rendered in registration order.
#[derive(Default)]
pub struct CompositeAggregator {
    aggregators: Vec<Box<dyn Aggregator>>,
}

impl CompositeAggregator {
    pub fn new(aggregators: Vec<Box<dyn Aggregator>>) -> Self {
        Self { aggregators }
    }

    /// Append an aggregator to the fan-out list.
    pub fn push(&mut self, aggregator: Box<dyn Aggregator>) {
        self.aggregators.push(aggregator);
    }
}

impl Aggregator for CompositeAggregator {
    fn consume(&mut self, row: &LogicalRow) {
        for a in &mut self.aggregators {
            a.consume(row);
        }
    }

    fn report(&self, w: &mut dyn Write) -> io::Result<()> {
        for a in &self.aggregators {
            a.report(w)?;
        }
        Ok(())
    }
}

/// Feeds every row into a single [`AmountStats`].
#[derive(Debug, Default)]
pub struct GlobalAmountAggregator {
    stats: AmountStats,
}

impl GlobalAmountAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated global stats.
    pub fn stats(&self) -> &AmountStats {
        &self.stats
    }
}

impl Aggregator for GlobalAmountAggregator {
    fn consume(&mut self, row: &LogicalRow) {
        self.stats.add(row.amount);
    }

    fn report(&self, w: &mut dyn Write) -> io::Result<()> {
        if !self.stats.has_data() {
            writeln!(w, "\nNo valid amount data to compute stats.")?;
            return Ok(());
        }

        writeln!(w, "\n=== Amount stats (global) ===")?;
        writeln!(w, "Count:   {}", self.stats.count)?;
        writeln!(w, "Sum:     {:.2}", self.stats.sum)?;
        writeln!(w, "Min:     {:.2}", self.stats.min)?;
        writeln!(w, "Max:     {:.2}", self.stats.max)?;
        writeln!(w, "Average: {:.2}", self.stats.average())?;
        Ok(())
    }
}

/// Maintains one [`AmountStats`] per group key.
///
/// Stats are created lazily on the first occurrence of a key; rows without a
/// group key are ignored. The report lists groups by descending total sum.
#[derive(Debug, Default)]
pub struct GroupByAggregator {
    stats_by_key: HashMap<String, AmountStats>,
}

impl GroupByAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for one group, if the key has been seen.
    pub fn group(&self, key: &str) -> Option<&AmountStats> {
        self.stats_by_key.get(key)
    }

    /// Number of distinct groups observed.
    pub fn group_count(&self) -> usize {
        self.stats_by_key.len()
    }

    /// Groups sorted by total sum, descending.
    pub fn sorted_groups(&self) -> Vec<(&str, &AmountStats)> {
        let mut groups: Vec<(&str, &AmountStats)> = self
            .stats_by_key
            .iter()
            .map(|(k, s)| (k.as_str(), s))
            .collect();
        groups.sort_by(|a, b| {
            b.1.sum
                .partial_cmp(&a.1.sum)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        groups
    }
}

impl Aggregator for GroupByAggregator {
    fn consume(&mut self, row: &LogicalRow) {
        let Some(key) = row.group_key.as_deref() else {
            return;
        };
        if key.is_empty() {
            return;
        }

        self.stats_by_key
            .entry(key.to_string())
            .or_default()
            .add(row.amount);
    }

    fn report(&self, w: &mut dyn Write) -> io::Result<()> {
        if self.stats_by_key.is_empty() {
            return Ok(());
        }

        writeln!(w, "\n=== Group-by statistics ===")?;
        writeln!(w, "Number of groups: {}\n", self.stats_by_key.len())?;

        writeln!(w, "Groups sorted by total sum (descending):")?;
        for (i, (key, stats)) in self.sorted_groups().iter().enumerate() {
            writeln!(w, "[{}] {}", i + 1, key)?;
            writeln!(w, "  Count:   {}", stats.count)?;
            writeln!(w, "  Sum:     {:.2}", stats.sum)?;
            writeln!(w, "  Min:     {:.2}", stats.min)?;
            writeln!(w, "  Max:     {:.2}", stats.max)?;
            writeln!(w, "  Average: {:.2}\n", stats.average())?;
        }
        Ok(())
    }
}

/// Prints the first `max_rows` raw records it observes, then goes quiet.
///
/// Useful for eyeballing what the pipeline actually feeds the aggregation
/// layer. `report` is a no-op.
#[derive(Debug)]
pub struct DebugAggregator {
    current_row: usize,
    max_rows: usize,
}

impl DebugAggregator {
    pub fn new(max_rows: usize) -> Self {
        Self {
            current_row: 0,
            max_rows,
        }
    }
}

impl Aggregator for DebugAggregator {
    fn consume(&mut self, row: &LogicalRow) {
        if self.current_row < self.max_rows {
            println!("Debug Row {}: {:?}", self.current_row + 1, row.raw);
            self.current_row += 1;
        }
    }

    fn report(&self, _w: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Aggregator, CompositeAggregator, DebugAggregator, GlobalAmountAggregator,
        GroupByAggregator,
    };
    use crate::row::LogicalRow;

    fn row(amount: f64, group_key: Option<&str>) -> LogicalRow {
        LogicalRow {
            raw: vec![amount.to_string()],
            amount,
            group_key: group_key.map(|k| k.to_string()),
        }
    }

    #[test]
    fn global_aggregator_accumulates_all_rows() {
        let mut agg = GlobalAmountAggregator::new();
        for r in [row(10.0, None), row(20.0, None), row(5.0, None)] {
            agg.consume(&r);
        }

        assert_eq!(agg.stats().count, 3);
        assert_eq!(agg.stats().sum, 35.0);
        assert_eq!(agg.stats().min, 5.0);
        assert_eq!(agg.stats().max, 20.0);
    }

    #[test]
    fn global_report_without_data_says_so() {
        let agg = GlobalAmountAggregator::new();
        let mut out = Vec::new();
        agg.report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No valid amount data"));
    }

    #[test]
    fn group_by_tracks_stats_per_key() {
        let mut agg = GroupByAggregator::new();
        for r in [
            row(10.0, Some("A")),
            row(20.0, Some("A")),
            row(5.0, Some("B")),
        ] {
            agg.consume(&r);
        }

        let a = agg.group("A").unwrap();
        assert_eq!(a.count, 2);
        assert_eq!(a.sum, 30.0);
        assert_eq!(a.min, 10.0);
        assert_eq!(a.max, 20.0);

        let b = agg.group("B").unwrap();
        assert_eq!(b.count, 1);
        assert_eq!(b.sum, 5.0);
        assert_eq!(b.min, 5.0);
        assert_eq!(b.max, 5.0);
    }

    #[test]
    fn group_by_ignores_missing_and_empty_keys() {
        let mut agg = GroupByAggregator::new();
        agg.consume(&row(10.0, None));
        agg.consume(&row(10.0, Some("")));
        assert_eq!(agg.group_count(), 0);
    }

    #[test]
    fn group_by_report_sorts_by_descending_sum() {
        let mut agg = GroupByAggregator::new();
        for r in [
            row(10.0, Some("A")),
            row(20.0, Some("A")),
            row(5.0, Some("B")),
        ] {
            agg.consume(&r);
        }

        let mut out = Vec::new();
        agg.report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let a_pos = text.find("[1] A").expect("A listed first");
        let b_pos = text.find("[2] B").expect("B listed second");
        assert!(a_pos < b_pos);
    }

    #[test]
    fn composite_fans_out_in_registration_order() {
        let mut composite = CompositeAggregator::default();
        composite.push(Box::new(GlobalAmountAggregator::new()));
        composite.push(Box::new(GroupByAggregator::new()));
        composite.push(Box::new(DebugAggregator::new(0)));

        for r in [row(10.0, Some("A")), row(5.0, Some("B"))] {
            composite.consume(&r);
        }

        let mut out = Vec::new();
        composite.report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let global_pos = text.find("Amount stats (global)").unwrap();
        let group_pos = text.find("Group-by statistics").unwrap();
        assert!(global_pos < group_pos);
    }
}
