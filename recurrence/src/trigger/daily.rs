use super::NextExecution;
use crate::timezone::EffectiveZone;
use crate::wall_clock::WallClockTime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fires every day at each of its trigger times.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyTrigger {
    #[serde(default)]
    pub trigger_times: BTreeSet<WallClockTime>,
}

impl DailyTrigger {
    pub fn new(times: impl IntoIterator<Item = WallClockTime>) -> Self {
        Self {
            trigger_times: times.into_iter().collect(),
        }
    }

    /// The instant of every trigger time on a local `date`, in ascending
    /// wall-clock order. Times that cannot be represented are skipped.
    pub fn instants_on(
        &self,
        date: NaiveDate,
        zone: &EffectiveZone,
    ) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let zone = *zone;
        self.trigger_times
            .iter()
            .filter_map(move |time| zone.to_instant(date.and_time(time.to_naive_time())))
    }
}

impl NextExecution for DailyTrigger {
    fn next_execution(&self, after: DateTime<Utc>, zone: &EffectiveZone) -> Option<DateTime<Utc>> {
        if self.trigger_times.is_empty() {
            return None;
        }

        let today = zone.local_date(after)?;

        [Some(today), today.succ_opt()]
            .into_iter()
            .flatten()
            .flat_map(|date| self.instants_on(date, zone))
            .filter(|candidate| *candidate >= after)
            .min()
    }
}
