// Calendar schedules
//
// A schedule combines any number of triggers; the earliest next execution
// among them wins.

use crate::clock::Clock;
use crate::timezone::{EffectiveZone, TriggerTimeZone};
use crate::trigger::{NextExecution, Trigger};
use crate::wire::ScheduleRepr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Schedule defines when work should run on the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScheduleRepr", into = "ScheduleRepr")]
pub struct Schedule {
    pub enabled: bool,
    pub run_on_startup: Option<bool>,
    pub time_zone: TriggerTimeZone,
    pub triggers: Vec<Trigger>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_startup: None,
            time_zone: TriggerTimeZone::ServerLocal,
            triggers: Vec::new(),
        }
    }
}

impl Schedule {
    /// An enabled schedule in server time.
    pub fn new(triggers: impl IntoIterator<Item = Trigger>) -> Self {
        Self {
            triggers: triggers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_time_zone(mut self, time_zone: TriggerTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = Some(run_on_startup);
        self
    }

    pub fn effective_zone(&self) -> EffectiveZone {
        self.time_zone.resolve()
    }

    /// The earliest instant at or after `after` at which any trigger fires.
    ///
    /// Always `None` for a disabled schedule or one without triggers.
    pub fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.enabled {
            return None;
        }

        let zone = self.effective_zone();
        let next = self
            .triggers
            .iter()
            .filter_map(|trigger| trigger.next_execution(after, &zone))
            .min();

        trace!(
            %after,
            next = ?next,
            triggers = self.triggers.len(),
            "Calculated next schedule execution"
        );
        next
    }

    /// As [`Schedule::next_execution`], reading `clock` when no reference
    /// instant is given.
    pub fn next_execution_or_now(
        &self,
        after: Option<DateTime<Utc>>,
        clock: &dyn Clock,
    ) -> Option<DateTime<Utc>> {
        self.next_execution(after.unwrap_or_else(|| clock.now()))
    }
}
