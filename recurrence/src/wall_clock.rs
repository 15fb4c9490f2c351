// Time-of-day values used as trigger times

use crate::errors::ScheduleError;
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A time of day, independent of any date or time zone.
///
/// Ordering is chronological within a day, so a sorted collection of
/// `WallClockTime`s iterates from midnight onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WallClockTime {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl WallClockTime {
    /// Midnight, `00:00:00`.
    pub const MIDNIGHT: WallClockTime = WallClockTime {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, ScheduleError> {
        let value = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
        if hours > 23 {
            return Err(ScheduleError::wall_clock(value, "hours must be 0-23"));
        }
        if minutes > 59 {
            return Err(ScheduleError::wall_clock(value, "minutes must be 0-59"));
        }
        if seconds > 59 {
            return Err(ScheduleError::wall_clock(value, "seconds must be 0-59"));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        // Fields are range-checked on construction.
        NaiveTime::from_hms_opt(self.hours, self.minutes, self.seconds).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for WallClockTime {
    fn from(time: NaiveTime) -> Self {
        use chrono::Timelike;
        Self {
            hours: time.hour(),
            minutes: time.minute(),
            // Leap seconds collapse onto :59.
            seconds: time.second().min(59),
        }
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

impl FromStr for WallClockTime {
    type Err = ScheduleError;

    /// Parse `HH:MM:SS` or `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(ScheduleError::wall_clock(s, "expected HH:MM or HH:MM:SS"));
        }

        let mut fields = [0u32; 3];
        for (slot, part) in fields.iter_mut().zip(parts.iter()) {
            *slot = part
                .parse::<u32>()
                .map_err(|e| ScheduleError::wall_clock(s, e.to_string()))?;
        }

        WallClockTime::new(fields[0], fields[1], fields[2])
    }
}

impl Serialize for WallClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        WallClockTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}
