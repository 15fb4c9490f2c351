use super::{DailyTrigger, NextExecution};
use crate::timezone::EffectiveZone;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Fires on selected weekdays at each of the daily trigger times.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyTrigger {
    #[serde(flatten)]
    pub daily: DailyTrigger,
    #[serde(default, with = "weekday_set")]
    pub trigger_days: Vec<Weekday>,
}

impl WeeklyTrigger {
    pub fn new(daily: DailyTrigger, days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            daily,
            trigger_days: days.into_iter().collect(),
        }
    }

    /// Configured weekdays, Monday first, without duplicates.
    pub fn days(&self) -> Vec<Weekday> {
        let mut days = self.trigger_days.clone();
        days.sort_by_key(|day| day.num_days_from_monday());
        days.dedup();
        days
    }
}

/// Dates on or after `from` falling on `day`. When `from` is already that
/// weekday, the same day next week is included too, since today's times
/// may all have passed.
fn candidate_dates(from: NaiveDate, day: Weekday) -> Vec<NaiveDate> {
    let ahead = (7 + day.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    let offsets = if ahead == 0 { vec![0, 7] } else { vec![ahead] };
    offsets
        .into_iter()
        .filter_map(|days| from.checked_add_days(Days::new(u64::from(days))))
        .collect()
}

impl NextExecution for WeeklyTrigger {
    fn next_execution(&self, after: DateTime<Utc>, zone: &EffectiveZone) -> Option<DateTime<Utc>> {
        let days = self.days();
        if days.is_empty() || self.daily.trigger_times.is_empty() {
            return None;
        }

        let today = zone.local_date(after)?;
        days.into_iter()
            .flat_map(|day| candidate_dates(today, day))
            .flat_map(|date| self.daily.instants_on(date, zone).collect::<Vec<_>>())
            .filter(|candidate| *candidate >= after)
            .min()
    }
}

/// Weekdays on the wire: full English names, or .NET `DayOfWeek` numbers
/// (0 = Sunday) on input.
mod weekday_set {
    use crate::errors::ScheduleError;
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireWeekday {
        Number(u8),
        Name(String),
    }

    pub(super) fn serialize<S>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(days.iter().map(|day| full_name(*day)))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<WireWeekday>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|day| match day {
                WireWeekday::Number(n) => from_dotnet(n).ok_or_else(|| {
                    D::Error::custom(ScheduleError::InvalidWeekday(format!(
                        "{} is not a day number (0 = Sunday .. 6 = Saturday)",
                        n
                    )))
                }),
                WireWeekday::Name(name) => name.trim().parse::<Weekday>().map_err(|_| {
                    D::Error::custom(ScheduleError::InvalidWeekday(format!("'{}'", name)))
                }),
            })
            .collect()
    }

    fn from_dotnet(n: u8) -> Option<Weekday> {
        match n {
            0 => Some(Weekday::Sun),
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            _ => None,
        }
    }

    pub(crate) fn full_name(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

pub(crate) use weekday_set::full_name as weekday_name;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wall_clock::WallClockTime;
    use chrono::TimeZone;

    fn weekly(times: &[(u32, u32)], days: &[Weekday]) -> WeeklyTrigger {
        WeeklyTrigger::new(
            DailyTrigger::new(
                times
                    .iter()
                    .map(|(h, m)| WallClockTime::new(*h, *m, 0).unwrap()),
            ),
            days.iter().copied(),
        )
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_same_weekday_later_time_fires_today() {
        // 2024-01-10 is a Wednesday.
        let trigger = weekly(&[(17, 0)], &[Weekday::Wed]);
        assert_eq!(
            trigger.next_execution(utc(2024, 1, 10, 9, 0, 0), &EffectiveZone::Utc),
            Some(utc(2024, 1, 10, 17, 0, 0))
        );
    }

    #[test]
    fn test_same_weekday_past_time_waits_a_week() {
        let trigger = weekly(&[(9, 0)], &[Weekday::Wed]);
        assert_eq!(
            trigger.next_execution(utc(2024, 1, 10, 10, 0, 0), &EffectiveZone::Utc),
            Some(utc(2024, 1, 17, 9, 0, 0))
        );
    }

    #[test]
    fn test_picks_nearest_of_several_days() {
        let trigger = weekly(&[(8, 0)], &[Weekday::Mon, Weekday::Fri]);
        // Wednesday -> Friday.
        assert_eq!(
            trigger.next_execution(utc(2024, 1, 10, 10, 0, 0), &EffectiveZone::Utc),
            Some(utc(2024, 1, 12, 8, 0, 0))
        );
        // Saturday -> Monday.
        assert_eq!(
            trigger.next_execution(utc(2024, 1, 13, 10, 0, 0), &EffectiveZone::Utc),
            Some(utc(2024, 1, 15, 8, 0, 0))
        );
    }

    #[test]
    fn test_empty_days_or_times_never_fire() {
        let after = utc(2024, 1, 10, 10, 0, 0);
        assert_eq!(
            weekly(&[(8, 0)], &[]).next_execution(after, &EffectiveZone::Utc),
            None
        );
        assert_eq!(
            weekly(&[], &[Weekday::Mon]).next_execution(after, &EffectiveZone::Utc),
            None
        );
    }

    #[test]
    fn test_local_weekday_decides_in_named_zone() {
        // 2024-01-09 23:30 UTC is already Wednesday 08:30 in Tokyo.
        let zone = EffectiveZone::Named(chrono_tz::Asia::Tokyo);
        let trigger = weekly(&[(9, 0)], &[Weekday::Wed]);
        assert_eq!(
            trigger.next_execution(utc(2024, 1, 9, 23, 30, 0), &zone),
            Some(utc(2024, 1, 10, 0, 0, 0))
        );
    }

    #[test]
    fn test_candidates_past_last_date_are_dropped() {
        let last = NaiveDate::MAX;
        assert_eq!(candidate_dates(last, last.weekday()), vec![last]);
        assert!(candidate_dates(last, last.weekday().succ()).is_empty());
    }

    #[test]
    fn test_days_are_sorted_and_unique() {
        let trigger = weekly(&[(8, 0)], &[Weekday::Sun, Weekday::Mon, Weekday::Sun]);
        assert_eq!(trigger.days(), vec![Weekday::Mon, Weekday::Sun]);
    }

    #[test]
    fn test_wire_days_accept_names_and_numbers() {
        let json = r#"{"TriggerTimes":["09:00:00"],"TriggerDays":["Monday","tue",0]}"#;
        let trigger: WeeklyTrigger = serde_json::from_str(json).unwrap();
        assert_eq!(
            trigger.trigger_days,
            vec![Weekday::Mon, Weekday::Tue, Weekday::Sun]
        );

        let out = serde_json::to_value(&trigger).unwrap();
        assert_eq!(
            out["TriggerDays"],
            serde_json::json!(["Monday", "Tuesday", "Sunday"])
        );
    }

    #[test]
    fn test_wire_rejects_bad_weekday() {
        let json = r#"{"TriggerTimes":[],"TriggerDays":[9]}"#;
        let err = serde_json::from_str::<WeeklyTrigger>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid weekday: 9"), "{}", err);

        let json = r#"{"TriggerTimes":[],"TriggerDays":["Someday"]}"#;
        let err = serde_json::from_str::<WeeklyTrigger>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid weekday: 'Someday'"), "{}", err);
    }
}
