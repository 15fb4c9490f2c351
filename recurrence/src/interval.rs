// Fixed-interval recurrence

use crate::errors::ScheduleError;
use chrono::{DateTime, Utc};
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 86_400;

/// Run every fixed interval, optionally also on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntervalRecurrence {
    pub interval: Duration,
    /// Defaults to running on startup when unset.
    pub run_on_startup: Option<bool>,
}

impl IntervalRecurrence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            run_on_startup: None,
        }
    }

    pub fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = Some(run_on_startup);
        self
    }

    pub fn runs_on_startup(&self) -> bool {
        self.run_on_startup.unwrap_or(true)
    }

    /// `after` plus the interval. A zero interval is valid and yields
    /// `after` itself. `None` only if the sum overflows the calendar.
    pub fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let step = chrono::Duration::from_std(self.interval).ok()?;
        after.checked_add_signed(step)
    }
}

impl From<Duration> for IntervalRecurrence {
    fn from(interval: Duration) -> Self {
        IntervalRecurrence::new(interval)
    }
}

/// Parse a time span in `[d.]hh:mm[:ss[.fffffff]]` form, or a bare day count.
pub fn parse_time_span(text: &str) -> Result<Duration, ScheduleError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::time_span(text, "empty value"));
    }
    if trimmed.starts_with('-') {
        return Err(ScheduleError::time_span(text, "negative intervals are not supported"));
    }

    let Some(first_colon) = trimmed.find(':') else {
        let days = parse_number(text, trimmed, u64::MAX / SECONDS_PER_DAY)?;
        return Ok(Duration::from_secs(days * SECONDS_PER_DAY));
    };

    let (days, clock) = match trimmed[..first_colon].find('.') {
        Some(dot) => (
            parse_number(text, &trimmed[..dot], u64::MAX / SECONDS_PER_DAY / 2)?,
            &trimmed[dot + 1..],
        ),
        None => (0, trimmed),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(ScheduleError::time_span(text, "expected hh:mm or hh:mm:ss"));
    }

    let hours = parse_number(text, parts[0], 23)?;
    let minutes = parse_number(text, parts[1], 59)?;
    let (seconds, nanos) = match parts.get(2) {
        Some(part) => match part.split_once('.') {
            Some((whole, fraction)) => (parse_number(text, whole, 59)?, parse_fraction(text, fraction)?),
            None => (parse_number(text, part, 59)?, 0),
        },
        None => (0, 0),
    };

    let total = days * SECONDS_PER_DAY + hours * 3600 + minutes * 60 + seconds;
    Ok(Duration::new(total, nanos))
}

fn parse_number(text: &str, part: &str, max: u64) -> Result<u64, ScheduleError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScheduleError::time_span(text, format!("'{}' is not a number", part)));
    }
    let value = part
        .parse::<u64>()
        .map_err(|e| ScheduleError::time_span(text, e.to_string()))?;
    if value > max {
        return Err(ScheduleError::time_span(
            text,
            format!("{} is out of range (max {})", value, max),
        ));
    }
    Ok(value)
}

fn parse_fraction(text: &str, fraction: &str) -> Result<u32, ScheduleError> {
    if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScheduleError::time_span(text, "fraction must be 1-9 digits"));
    }
    let padded = format!("{:0<9}", fraction);
    padded
        .parse::<u32>()
        .map_err(|e| ScheduleError::time_span(text, e.to_string()))
}

/// Format as `[d.]hh:mm:ss[.fffffff]`, the inverse of [`parse_time_span`].
pub fn format_time_span(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = if days > 0 {
        format!("{}.{:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    };

    let nanos = duration.subsec_nanos();
    if nanos > 0 {
        if nanos % 100 == 0 {
            out.push_str(&format!(".{:07}", nanos / 100));
        } else {
            out.push_str(&format!(".{:09}", nanos));
        }
    }
    out
}
