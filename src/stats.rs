//! Streaming min/max/sum/count accumulator over row amounts.

/// Simple streaming statistics for a numeric field.
///
/// Created empty with `min = +inf` and `max = -inf` so that any real value
/// replaces them on the first [`AmountStats::add`].
#[derive(Debug, Clone, PartialEq)]
pub struct AmountStats {
    /// Number of values added.
    pub count: i64,
    /// Sum of all added values.
    pub sum: f64,
    /// Smallest added value (`+inf` when empty).
    pub min: f64,
    /// Largest added value (`-inf` when empty).
    pub max: f64,
}

impl Default for AmountStats {
    fn default() -> Self {
        Self::new()
    }
}

impl AmountStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Update the stats with a new value.
    pub fn add(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.count += 1;
        self.sum += value;
    }

    /// Returns `true` if at least one value has been added.
    pub fn has_data(&self) -> bool {
        self.count > 0
    }

    /// Average of added values, or NaN if there is no data.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Fold another accumulator into this one.
    ///
    /// Associative, so independently built stats (e.g. per input shard) can
    /// be combined into the same result as a single sequential pass.
    pub fn merge(&mut self, other: &AmountStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
        self.sum += other.sum;
    }
}

#[cfg(test)]
mod tests {
    use super::AmountStats;

    #[test]
    fn empty_stats_have_no_data_and_nan_average() {
        let stats = AmountStats::new();
        assert!(!stats.has_data());
        assert!(stats.average().is_nan());
        assert_eq!(stats.count, 0);
        assert!(stats.min.is_infinite() && stats.min > 0.0);
        assert!(stats.max.is_infinite() && stats.max < 0.0);
    }

    #[test]
    fn add_tracks_min_max_sum_count() {
        let mut stats = AmountStats::new();
        for v in [10.0, -2.5, 7.0, 10.0] {
            stats.add(v);
        }

        assert!(stats.has_data());
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, -2.5);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.sum, 24.5);
        assert_eq!(stats.average(), 24.5 / 4.0);
    }

    #[test]
    fn single_value_sets_both_bounds() {
        let mut stats = AmountStats::new();
        stats.add(5.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.average(), 5.0);
    }

    #[test]
    fn merge_matches_sequential_adds() {
        let values = [3.0, 9.0, -1.0, 4.5, 2.0];

        let mut sequential = AmountStats::new();
        for v in values {
            sequential.add(v);
        }

        let mut left = AmountStats::new();
        let mut right = AmountStats::new();
        for v in &values[..2] {
            left.add(*v);
        }
        for v in &values[2..] {
            right.add(*v);
        }
        left.merge(&right);

        assert_eq!(left, sequential);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut stats = AmountStats::new();
        stats.add(1.0);
        stats.add(2.0);
        let before = stats.clone();

        stats.merge(&AmountStats::new());
        assert_eq!(stats, before);
    }
}
