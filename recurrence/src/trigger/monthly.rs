use super::{DailyTrigger, NextExecution};
use crate::timezone::EffectiveZone;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Months inspected before giving up on a day-of-month.
const MAX_MONTHS_SEARCHED: usize = 6;

/// What to do when a configured day does not exist in a month (the 30th in
/// February, the 31st in April).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnrepresentableDateHandling {
    /// Move on to the next month that has the day.
    #[default]
    Skip,
    /// Use the last day of the short month instead.
    LastDayOfMonth,
}

/// Fires on selected days of the month at each of the daily trigger times.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayOfMonthTrigger {
    #[serde(flatten)]
    pub daily: DailyTrigger,
    #[serde(default)]
    pub trigger_days: BTreeSet<u32>,
    #[serde(default)]
    pub unrepresentable_date_handling: UnrepresentableDateHandling,
}

impl DayOfMonthTrigger {
    pub fn new(
        daily: DailyTrigger,
        days: impl IntoIterator<Item = u32>,
        unrepresentable_date_handling: UnrepresentableDateHandling,
    ) -> Self {
        Self {
            daily,
            trigger_days: days.into_iter().collect(),
            unrepresentable_date_handling,
        }
    }
}

impl NextExecution for DayOfMonthTrigger {
    fn next_execution(&self, after: DateTime<Utc>, zone: &EffectiveZone) -> Option<DateTime<Utc>> {
        if self.trigger_days.is_empty() || self.daily.trigger_times.is_empty() {
            return None;
        }

        let today = zone.local_date(after)?;
        self.trigger_days
            .iter()
            .flat_map(|day| next_day_of_month(today, *day, self.unrepresentable_date_handling))
            .flat_map(|date| self.daily.instants_on(date, zone).collect::<Vec<_>>())
            .filter(|candidate| *candidate > after)
            .min()
    }
}

/// Upcoming dates, on or after `after`, for a day of the month.
///
/// When `day` is today, both today and next month's occurrence are
/// returned: today's trigger times may already have passed. Days outside
/// 1..=31 yield nothing.
pub fn next_day_of_month(
    after: NaiveDate,
    day: u32,
    policy: UnrepresentableDateHandling,
) -> Vec<NaiveDate> {
    if !(1..=31).contains(&day) {
        return Vec::new();
    }

    let this_month = (after.year(), after.month());
    let next_month = following_month(this_month);

    let first = if day <= after.day() {
        if day == after.day() {
            Some(after)
        } else {
            first_occurrence(next_month, day, policy)
        }
    } else {
        first_occurrence(this_month, day, policy)
    };

    let mut dates: Vec<NaiveDate> = first.into_iter().collect();
    // Today may also have been reached by substituting the last day of the
    // month; either way the following month is a candidate as well.
    if first == Some(after) {
        dates.extend(first_occurrence(next_month, day, policy));
    }
    dates
}

/// First representable occurrence of `day`, starting at `(year, month)`.
fn first_occurrence(
    (mut year, mut month): (i32, u32),
    day: u32,
    policy: UnrepresentableDateHandling,
) -> Option<NaiveDate> {
    for _ in 0..MAX_MONTHS_SEARCHED {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
        match policy {
            UnrepresentableDateHandling::Skip => {
                (year, month) = following_month((year, month));
            }
            UnrepresentableDateHandling::LastDayOfMonth => {
                return last_day_of_month(year, month);
            }
        }
    }
    None
}

fn following_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Last calendar day of a month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = following_month((year, month));
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}
