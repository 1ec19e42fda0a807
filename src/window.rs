use std::borrow::Cow;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Which end of a window a user-supplied timestamp is meant for. Only
/// matters for date-only input, which expands to the first or last instant
/// of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Rewrites a trailing `Z` as `+00:00`, so UTC shorthand and explicit offsets
/// go through one parser.
pub fn normalize_offset(timestamp: &str) -> Cow<'_, str> {
    match timestamp.strip_suffix('Z') {
        Some(stem) => Cow::Owned(format!("{stem}+00:00")),
        None => Cow::Borrowed(timestamp),
    }
}

/// Parses an ISO-8601 timestamp with a `Z` or numeric offset, or a bare
/// `YYYY-MM-DD` date.
pub fn parse_timestamp(input: &str, bound: Bound) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::from_hms_opt(0, 0, 0),
            Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999),
        }
        .context("time of day out of range")?;
        return Ok(date.and_time(time).and_utc());
    }

    let normalized = normalize_offset(trimmed);
    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| {
            format!(
                "Invalid timestamp '{}' (expected YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)",
                input
            )
        })
}

/// Closed interval `[start, end]` over pull request creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            anyhow::bail!(
                "Start of window ({}) is after its end ({})",
                start.to_rfc3339(),
                end.to_rfc3339()
            );
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(
            parse_timestamp(start, Bound::Start).context("Invalid --start")?,
            parse_timestamp(end, Bound::End).context("Invalid --end")?,
        )
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Both boundaries are included.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// `created:<start>..<end>` qualifier for the search API.
    pub fn search_qualifier(&self) -> String {
        format!(
            "created:{}..{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
