// Error handling framework
//
// Next-execution queries never fail: a mis-configured schedule degrades to
// "does not run". These errors cover construction, parsing and loading.

use thiserror::Error;

/// Schedule-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid wall-clock time '{value}': {reason}")]
    InvalidWallClockTime { value: String, reason: String },

    #[error("Invalid time span '{value}': {reason}")]
    InvalidTimeSpan { value: String, reason: String },

    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("Unknown recurrence type: {0}")]
    UnknownRecurrenceType(String),

    #[error("Unrecognised frequency shape: {0}")]
    UnrecognisedFrequency(String),

    #[error("Invalid schedule configuration: {0}")]
    InvalidConfiguration(String),
}

impl ScheduleError {
    pub(crate) fn wall_clock(value: impl Into<String>, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidWallClockTime {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn time_span(value: impl Into<String>, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidTimeSpan {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::InvalidConfiguration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_error_display() {
        let err = ScheduleError::wall_clock("25:00:00", "hours must be 0-23");
        assert!(err.to_string().contains("Invalid wall-clock time '25:00:00'"));
    }

    #[test]
    fn test_json_error_maps_to_configuration() {
        let err: ScheduleError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ScheduleError::InvalidConfiguration(_)));
    }
}
