//! Time range domain model.
//!
//! A `TimeRange` is a half-open segment `[start, end)` of media time, in
//! seconds, annotated with how many times it was viewed. Ranges are persisted
//! in their text form, `HH:MM:SS - HH:MM:SS | Views: N`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult};

const VIEWS_SEPARATOR: &str = " | Views: ";
const BOUNDS_SEPARATOR: &str = " - ";

/// A viewed segment of media time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Segment start, in seconds
    pub start: f64,
    /// Segment end (exclusive), in seconds
    pub end: f64,
    /// Number of times the segment was watched
    pub views: u64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64, views: u64) -> Self {
        Self { start, end, views }
    }

    /// Parse the persisted text form of a range.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let (bounds, views) = input.trim().split_once(VIEWS_SEPARATOR).ok_or_else(|| {
            DomainError::ValidationFailed(format!("time range '{input}' has no views segment"))
        })?;
        let (start, end) = bounds.split_once(BOUNDS_SEPARATOR).ok_or_else(|| {
            DomainError::ValidationFailed(format!("time range '{input}' has no ' - ' separator"))
        })?;

        let views = views.trim().parse::<u64>().map_err(|e| {
            DomainError::ValidationFailed(format!("invalid view count in '{input}': {e}"))
        })?;
        let start = parse_timestamp(start)?;
        let end = parse_timestamp(end)?;

        if start >= end {
            return Err(DomainError::ValidationFailed(format!(
                "time range '{input}' must start before it ends"
            )));
        }

        Ok(Self {
            start: start as f64,
            end: end as f64,
            views,
        })
    }
}

/// Whole-second bounds are widened outward, so the text form always parses
/// back to a non-empty range covering the original one.
impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = whole_seconds(self.start.floor());
        let end = whole_seconds(self.end.ceil()).max(start + 1);
        write!(
            f,
            "{}{}{}{}{}",
            format_timestamp(start),
            BOUNDS_SEPARATOR,
            format_timestamp(end),
            VIEWS_SEPARATOR,
            self.views
        )
    }
}

impl FromStr for TimeRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(seconds: f64) -> u64 {
    seconds.max(0.0) as u64
}

fn format_timestamp(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

fn parse_timestamp(input: &str) -> DomainResult<u64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(DomainError::ValidationFailed(format!(
            "timestamp '{input}' is not HH:MM:SS"
        )));
    };

    let field = |value: &str, name: &str| {
        value.parse::<u64>().map_err(|e| {
            DomainError::ValidationFailed(format!("invalid {name} in timestamp '{input}': {e}"))
        })
    };
    let hours = field(hours, "hours")?;
    let minutes = field(minutes, "minutes")?;
    let seconds = field(seconds, "seconds")?;

    if minutes >= 60 || seconds >= 60 {
        return Err(DomainError::ValidationFailed(format!(
            "timestamp '{input}' is out of range"
        )));
    }

    Ok(hours * 3600 + minutes * 60 + seconds)
}
