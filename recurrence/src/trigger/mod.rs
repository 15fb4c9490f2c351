// Calendar triggers
//
// A trigger turns a reference instant into the next instant it fires at.
// Weekly and monthly triggers embed a daily trigger for their times of day
// and reuse its per-date search.

pub mod daily;
pub mod monthly;
pub mod weekly;

pub use daily::DailyTrigger;
pub use monthly::{last_day_of_month, next_day_of_month, DayOfMonthTrigger, UnrepresentableDateHandling};
pub use weekly::WeeklyTrigger;

use crate::timezone::EffectiveZone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// NextExecution defines the interface for calculating the next execution time
pub trait NextExecution {
    /// The first instant at or after `after` (strictly after, for monthly
    /// triggers) at which this fires, with trigger times read in `zone`.
    /// `None` when it can never fire.
    fn next_execution(&self, after: DateTime<Utc>, zone: &EffectiveZone) -> Option<DateTime<Utc>>;
}

/// One trigger rule of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Trigger {
    Daily(DailyTrigger),
    Weekly(WeeklyTrigger),
    Monthly(DayOfMonthTrigger),
    /// An unrecognised trigger type; never fires.
    #[serde(other)]
    Unknown,
}

impl Trigger {
    /// The times-of-day part shared by every calendar trigger.
    pub fn daily(&self) -> Option<&DailyTrigger> {
        match self {
            Trigger::Unknown => None,
            Trigger::Daily(daily) => Some(daily),
            Trigger::Weekly(weekly) => Some(&weekly.daily),
            Trigger::Monthly(monthly) => Some(&monthly.daily),
        }
    }
}

impl From<DailyTrigger> for Trigger {
    fn from(trigger: DailyTrigger) -> Self {
        Trigger::Daily(trigger)
    }
}

impl From<WeeklyTrigger> for Trigger {
    fn from(trigger: WeeklyTrigger) -> Self {
        Trigger::Weekly(trigger)
    }
}

impl From<DayOfMonthTrigger> for Trigger {
    fn from(trigger: DayOfMonthTrigger) -> Self {
        Trigger::Monthly(trigger)
    }
}

impl NextExecution for Trigger {
    fn next_execution(&self, after: DateTime<Utc>, zone: &EffectiveZone) -> Option<DateTime<Utc>> {
        match self {
            Trigger::Unknown => None,
            Trigger::Daily(trigger) => trigger.next_execution(after, zone),
            Trigger::Weekly(trigger) => trigger.next_execution(after, zone),
            Trigger::Monthly(trigger) => trigger.next_execution(after, zone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wall_clock::WallClockTime;
    use chrono::{TimeZone, Weekday};

    #[test]
    fn test_unknown_trigger_never_fires() {
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Trigger::Unknown.next_execution(after, &EffectiveZone::Utc), None);
    }

    #[test]
    fn test_dispatches_to_variant() {
        let after = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();
        let daily = DailyTrigger::new([WallClockTime::new(12, 0, 0).unwrap()]);
        let trigger = Trigger::from(daily.clone());
        assert_eq!(
            trigger.next_execution(after, &EffectiveZone::Utc),
            daily.next_execution(after, &EffectiveZone::Utc)
        );
    }

    #[test]
    fn test_wire_tags() {
        let json = r#"[
            {"Type":"Daily","TriggerTimes":["01:30:32"]},
            {"Type":"Weekly","TriggerTimes":["09:00:00"],"TriggerDays":["Friday"]},
            {"Type":"Monthly","TriggerTimes":["09:00:00"],"TriggerDays":[30],
             "UnrepresentableDateHandling":"LastDayOfMonth"},
            {"Type":"Yearly"}
        ]"#;
        let triggers: Vec<Trigger> = serde_json::from_str(json).unwrap();

        assert!(matches!(&triggers[0], Trigger::Daily(d) if d.trigger_times.len() == 1));
        assert!(matches!(&triggers[1], Trigger::Weekly(w) if w.trigger_days == vec![Weekday::Fri]));
        match &triggers[2] {
            Trigger::Monthly(m) => {
                assert!(m.trigger_days.contains(&30));
                assert_eq!(
                    m.unrepresentable_date_handling,
                    UnrepresentableDateHandling::LastDayOfMonth
                );
            }
            other => panic!("Expected monthly trigger, got {:?}", other),
        }
        assert_eq!(triggers[3], Trigger::Unknown);
    }

    #[test]
    fn test_unrecognised_type_with_fields_is_unknown() {
        let json = r#"{"Type":"Yearly","TriggerTimes":["09:00"],"TriggerMonths":[1, 7]}"#;
        let trigger: Trigger = serde_json::from_str(json).unwrap();
        assert_eq!(trigger, Trigger::Unknown);

        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(trigger.next_execution(after, &EffectiveZone::Utc), None);
    }

    #[test]
    fn test_extreme_instants_do_not_panic() {
        let times = DailyTrigger::new([
            WallClockTime::MIDNIGHT,
            WallClockTime::new(12, 0, 0).unwrap(),
            WallClockTime::new(23, 59, 59).unwrap(),
        ]);
        let triggers = [
            Trigger::Daily(times.clone()),
            Trigger::Weekly(WeeklyTrigger::new(
                times.clone(),
                [Weekday::Mon, Weekday::Wed, Weekday::Sat, Weekday::Sun],
            )),
            Trigger::Monthly(DayOfMonthTrigger::new(
                times.clone(),
                [1, 15, 31],
                UnrepresentableDateHandling::LastDayOfMonth,
            )),
            Trigger::Monthly(DayOfMonthTrigger::new(
                times,
                [30],
                UnrepresentableDateHandling::Skip,
            )),
        ];
        let zones = [
            EffectiveZone::Utc,
            EffectiveZone::Named(chrono_tz::America::New_York),
            EffectiveZone::Named(chrono_tz::Asia::Tokyo),
            EffectiveZone::Named(chrono_tz::Pacific::Kiritimati),
        ];

        for after in [DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC] {
            for zone in &zones {
                for trigger in &triggers {
                    if let Some(next) = trigger.next_execution(after, zone) {
                        assert!(next >= after, "{:?} in {:?} at {}", trigger, zone, after);
                    }
                }
            }
        }
    }

    #[test]
    fn test_wire_round_trip() {
        let trigger = Trigger::Weekly(WeeklyTrigger::new(
            DailyTrigger::new([WallClockTime::new(6, 0, 0).unwrap()]),
            [Weekday::Sat],
        ));
        let json = serde_json::to_string(&trigger).unwrap();
        assert!(json.contains("\"Type\":\"Weekly\""));
        let back: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trigger);
    }
}
