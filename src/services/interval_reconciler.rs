//! View timeline bucketing and "most replayed" reconciliation.
//!
//! During a session, watched intervals are split into fixed-size buckets
//! aligned to multiples of the bucket size, and each bucket counts how many
//! times it was watched. When a session is flushed, its buckets are merged
//! with the ranges persisted from earlier sessions.

use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::TimeRange;

const DEFAULT_BUCKET_SIZE_SECS: f64 = 1.0;

/// Per-session view timeline.
#[derive(Debug, Clone)]
pub struct IntervalReconciler {
    bucket_size: f64,
    ranges: Vec<TimeRange>,
    /// bucket index -> position in `ranges`
    positions: HashMap<u64, usize>,
}

impl Default for IntervalReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_SIZE_SECS)
    }
}

impl IntervalReconciler {
    /// Create an empty timeline. A non-positive or non-finite bucket size
    /// falls back to one second.
    pub fn new(bucket_size: f64) -> Self {
        let bucket_size = if bucket_size.is_finite() && bucket_size > 0.0 {
            bucket_size
        } else {
            DEFAULT_BUCKET_SIZE_SECS
        };
        Self {
            bucket_size,
            ranges: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn bucket_size(&self) -> f64 {
        self.bucket_size
    }

    /// Record one view of `[start, end)`.
    ///
    /// Every bucket the interval touches gains one view; buckets are created
    /// on first touch and keep their creation order.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn accumulate(&mut self, start: f64, end: f64) {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return;
        }

        let mut index = (start.max(0.0) / self.bucket_size).floor() as u64;
        loop {
            let bucket_start = index as f64 * self.bucket_size;
            if bucket_start >= end {
                break;
            }

            match self.positions.get(&index) {
                Some(&position) => self.ranges[position].views += 1,
                None => {
                    self.positions.insert(index, self.ranges.len());
                    self.ranges.push(TimeRange::new(
                        bucket_start,
                        bucket_start + self.bucket_size,
                        1,
                    ));
                }
            }
            index += 1;
        }
    }

    /// Buckets in creation order.
    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// The `n` most viewed buckets, views descending, ties in creation order.
    pub fn top_ranges(&self, n: usize) -> Vec<TimeRange> {
        top_ranges(&self.ranges, n)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
        self.positions.clear();
    }

    /// Merge previously persisted ranges with the current session's ranges.
    ///
    /// Both lists are concatenated and sorted by start, then folded left to
    /// right: a range that starts at or before the running range's end extends
    /// it and adds its views into it. The result is ascending and
    /// non-overlapping, with a gap between any two ranges.
    pub fn reconcile(previous: &[TimeRange], current: &[TimeRange]) -> Vec<TimeRange> {
        let mut all: Vec<TimeRange> = previous.iter().chain(current).copied().collect();
        all.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<TimeRange> = Vec::with_capacity(all.len());
        for next in all {
            match merged.last_mut() {
                Some(last) if last.end >= next.start => {
                    last.end = last.end.max(next.end);
                    last.views += next.views;
                }
                _ => merged.push(next),
            }
        }
        merged
    }

    pub fn format(range: &TimeRange) -> String {
        range.to_string()
    }

    pub fn parse(input: &str) -> DomainResult<TimeRange> {
        TimeRange::parse(input)
    }

    /// Parse a list of persisted ranges, failing on the first malformed one.
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> DomainResult<Vec<TimeRange>> {
        inputs.iter().map(|s| TimeRange::parse(s.as_ref())).collect()
    }
}

/// The `n` ranges with the most views, views descending, ties in input order.
pub fn top_ranges(ranges: &[TimeRange], n: usize) -> Vec<TimeRange> {
    let mut sorted = ranges.to_vec();
    // sort_by is stable, so equal view counts keep their original order
    sorted.sort_by(|a, b| b.views.cmp(&a.views));
    sorted.truncate(n);
    sorted
}
