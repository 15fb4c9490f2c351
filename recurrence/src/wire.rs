// Wire format for recurrence configuration
//
// Stored configuration comes in several historical shapes. Detection of the
// shape happens here, before anything reaches the engine:
//
//   1. a bare time-span string            -> Interval
//   2. an object with `RecurrenceType`    -> the tagged variant
//   3. an object with `Triggers`          -> Schedule
//   4. an object with interval fields     -> Interval
//   5. null                               -> Unknown

use crate::errors::ScheduleError;
use crate::frequency::Frequency;
use crate::interval::{format_time_span, parse_time_span, IntervalRecurrence};
use crate::schedule::Schedule;
use crate::timezone::TriggerTimeZone;
use crate::trigger::Trigger;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Fields that mark an object as an interval.
const INTERVAL_FIELDS: &[&str] = &[
    "Interval",
    "Days",
    "Hours",
    "Minutes",
    "Seconds",
    "Milliseconds",
    "Ticks",
];

const NANOS_PER_TICK: u64 = 100;

// ============================================================================
// Schedule
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum TriggerTimeType {
    #[default]
    #[serde(alias = "Default")]
    ServerTime,
    #[serde(rename = "UTC", alias = "Utc")]
    Utc,
    Custom,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ScheduleRepr {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    run_on_startup: Option<bool>,
    #[serde(default)]
    trigger_time_type: TriggerTimeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger_time_custom_time_zone: Option<String>,
    #[serde(default)]
    triggers: Vec<Trigger>,
}

impl From<ScheduleRepr> for Schedule {
    fn from(repr: ScheduleRepr) -> Self {
        let time_zone = match (repr.trigger_time_type, repr.trigger_time_custom_time_zone) {
            (TriggerTimeType::ServerTime, _) => TriggerTimeZone::ServerLocal,
            (TriggerTimeType::Utc, _) => TriggerTimeZone::Utc,
            (TriggerTimeType::Custom, Some(id)) => TriggerTimeZone::Custom(id),
            (TriggerTimeType::Custom, None) => TriggerTimeZone::ServerLocal,
        };
        Schedule {
            enabled: repr.enabled,
            run_on_startup: repr.run_on_startup,
            time_zone,
            triggers: repr.triggers,
        }
    }
}

impl From<Schedule> for ScheduleRepr {
    fn from(schedule: Schedule) -> Self {
        let (trigger_time_type, trigger_time_custom_time_zone) = match schedule.time_zone {
            TriggerTimeZone::ServerLocal => (TriggerTimeType::ServerTime, None),
            TriggerTimeZone::Utc => (TriggerTimeType::Utc, None),
            TriggerTimeZone::Custom(id) => (TriggerTimeType::Custom, Some(id)),
        };
        ScheduleRepr {
            enabled: schedule.enabled,
            run_on_startup: schedule.run_on_startup,
            trigger_time_type,
            trigger_time_custom_time_zone,
            triggers: schedule.triggers,
        }
    }
}

// ============================================================================
// Interval
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct IntervalRepr {
    interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_on_startup: Option<bool>,
}

impl Serialize for IntervalRecurrence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        IntervalRepr {
            interval: format_time_span(self.interval),
            run_on_startup: self.run_on_startup,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IntervalRecurrence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        interval_from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Read an interval from a bare string or an interval-shaped object.
///
/// A bare string is the legacy form and always runs on startup.
pub fn interval_from_value(value: &Value) -> Result<IntervalRecurrence, ScheduleError> {
    match value {
        Value::String(text) => Ok(IntervalRecurrence::new(parse_time_span(text)?)),
        Value::Object(map) => {
            let run_on_startup = match map.get("RunOnStartup") {
                None | Some(Value::Null) => None,
                Some(Value::Bool(flag)) => Some(*flag),
                Some(other) => {
                    return Err(ScheduleError::InvalidConfiguration(format!(
                        "RunOnStartup must be a boolean, got {}",
                        other
                    )))
                }
            };
            let interval = match map.get("Interval") {
                Some(inner) => duration_from_value(inner)?,
                None => duration_from_units(map)?,
            };
            Ok(IntervalRecurrence {
                interval,
                run_on_startup,
            })
        }
        other => Err(ScheduleError::UnrecognisedFrequency(format!(
            "expected an interval, got {}",
            other
        ))),
    }
}

fn duration_from_value(value: &Value) -> Result<Duration, ScheduleError> {
    match value {
        Value::String(text) => parse_time_span(text),
        Value::Object(map) => duration_from_units(map),
        other => Err(ScheduleError::time_span(
            other.to_string(),
            "expected a string or an object of units",
        )),
    }
}

/// `{"Days":..,"Hours":..,"Minutes":..,"Seconds":..,"Milliseconds":..}`, or
/// `{"Ticks":..}` in 100ns units, which wins when present.
fn duration_from_units(map: &Map<String, Value>) -> Result<Duration, ScheduleError> {
    if let Some(ticks) = map.get("Ticks") {
        let ticks = unit(ticks, "Ticks")?;
        return Ok(Duration::from_nanos(ticks.saturating_mul(NANOS_PER_TICK)));
    }

    let mut parts = Vec::with_capacity(5);
    for (name, seconds_per_unit) in [("Days", 86_400u64), ("Hours", 3600), ("Minutes", 60), ("Seconds", 1)] {
        if let Some(value) = map.get(name) {
            parts.push(Duration::from_secs(unit(value, name)?.saturating_mul(seconds_per_unit)));
        }
    }
    if let Some(value) = map.get("Milliseconds") {
        parts.push(Duration::from_millis(unit(value, "Milliseconds")?));
    }

    parts
        .into_iter()
        .try_fold(Duration::ZERO, |total, part| total.checked_add(part))
        .ok_or_else(|| ScheduleError::time_span(Value::Object(map.clone()).to_string(), "interval overflows"))
}

fn unit(value: &Value, name: &str) -> Result<u64, ScheduleError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(number) => number.as_u64().ok_or_else(|| {
            ScheduleError::time_span(
                number.to_string(),
                format!("{} must be a non-negative whole number", name),
            )
        }),
        other => Err(ScheduleError::time_span(
            other.to_string(),
            format!("{} must be a number", name),
        )),
    }
}

// ============================================================================
// Frequency
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FrequencyRepr<'a> {
    recurrence_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<&'a IntervalRecurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<&'a Schedule>,
}

impl Serialize for Frequency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let repr = match self {
            Frequency::Unknown => FrequencyRepr {
                recurrence_type: "Unknown",
                interval: None,
                schedule: None,
            },
            Frequency::Interval(interval) => FrequencyRepr {
                recurrence_type: "Interval",
                interval: Some(interval),
                schedule: None,
            },
            Frequency::Schedule(schedule) => FrequencyRepr {
                recurrence_type: "Schedule",
                interval: None,
                schedule: Some(schedule),
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        frequency_from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Resolve any supported frequency shape into a [`Frequency`].
pub fn frequency_from_value(value: Value) -> Result<Frequency, ScheduleError> {
    match value {
        Value::Null => Ok(Frequency::Unknown),
        Value::String(text) => Ok(Frequency::Interval(IntervalRecurrence::new(
            parse_time_span(&text)?,
        ))),
        Value::Object(map) => {
            if let Some(tag) = map.get("RecurrenceType") {
                return tagged_frequency(tag, &map);
            }
            if map.contains_key("Triggers") {
                let schedule: Schedule = serde_json::from_value(Value::Object(map))?;
                return Ok(Frequency::Schedule(schedule));
            }
            if INTERVAL_FIELDS.iter().any(|field| map.contains_key(*field)) {
                return interval_from_value(&Value::Object(map)).map(Frequency::Interval);
            }
            Err(ScheduleError::UnrecognisedFrequency(format!(
                "object has none of RecurrenceType, Triggers or interval fields: {}",
                Value::Object(map)
            )))
        }
        other => Err(ScheduleError::UnrecognisedFrequency(other.to_string())),
    }
}

fn tagged_frequency(tag: &Value, map: &Map<String, Value>) -> Result<Frequency, ScheduleError> {
    let kind = match tag {
        Value::String(name) => name.to_ascii_lowercase(),
        Value::Number(number) => match number.as_u64() {
            Some(0) => "unknown".to_string(),
            Some(1) => "interval".to_string(),
            Some(2) => "schedule".to_string(),
            _ => return Err(ScheduleError::UnknownRecurrenceType(number.to_string())),
        },
        other => return Err(ScheduleError::UnknownRecurrenceType(other.to_string())),
    };

    let payload = |name: &str| map.get(name).filter(|value| !value.is_null());

    match kind.as_str() {
        "unknown" => Ok(Frequency::Unknown),
        "interval" => match payload("Interval") {
            Some(value) => interval_from_value(value).map(Frequency::Interval),
            None => {
                debug!("Interval recurrence without an interval, treating as unknown");
                Ok(Frequency::Unknown)
            }
        },
        "schedule" => match payload("Schedule") {
            Some(value) => Ok(Frequency::Schedule(serde_json::from_value(value.clone())?)),
            None => {
                debug!("Schedule recurrence without a schedule, treating as unknown");
                Ok(Frequency::Unknown)
            }
        },
        _ => Err(ScheduleError::UnknownRecurrenceType(kind)),
    }
}
