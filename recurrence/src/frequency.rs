// Unified recurrence: fixed interval or calendar schedule

use crate::clock::Clock;
use crate::interval::IntervalRecurrence;
use crate::schedule::Schedule;
use chrono::{DateTime, Duration, Utc};

/// Frequency is what calling code holds to decide when work runs next
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Frequency {
    /// Nothing configured; never runs.
    #[default]
    Unknown,
    Interval(IntervalRecurrence),
    Schedule(Schedule),
}

impl Frequency {
    pub fn from_interval(interval: impl Into<IntervalRecurrence>) -> Self {
        Frequency::Interval(interval.into())
    }

    pub fn from_schedule(schedule: Schedule) -> Self {
        Frequency::Schedule(schedule)
    }

    /// Whether work should also run once when the host starts.
    pub fn run_on_startup(&self) -> bool {
        match self {
            Frequency::Unknown => false,
            Frequency::Interval(interval) => interval.runs_on_startup(),
            Frequency::Schedule(schedule) => {
                schedule.enabled && schedule.run_on_startup.unwrap_or(false)
            }
        }
    }

    /// The next instant, at or after `after`, at which work should run.
    pub fn next_execution(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Frequency::Unknown => None,
            Frequency::Interval(interval) => interval.next_execution(after),
            Frequency::Schedule(schedule) => schedule.next_execution(after),
        }
    }

    /// As [`Frequency::next_execution`], reading `clock` when no reference
    /// instant is given.
    pub fn next_execution_or_now(
        &self,
        after: Option<DateTime<Utc>>,
        clock: &dyn Clock,
    ) -> Option<DateTime<Utc>> {
        self.next_execution(after.unwrap_or_else(|| clock.now()))
    }

    /// Successive executions starting from `after`.
    ///
    /// Each search after the first starts one second past the previous
    /// result, so a time that is due "now" is not repeated. A zero
    /// interval therefore advances one second per step.
    pub fn upcoming(&self, after: DateTime<Utc>) -> Upcoming<'_> {
        Upcoming {
            frequency: self,
            cursor: Some(after),
        }
    }
}

impl From<IntervalRecurrence> for Frequency {
    fn from(interval: IntervalRecurrence) -> Self {
        Frequency::Interval(interval)
    }
}

impl From<Schedule> for Frequency {
    fn from(schedule: Schedule) -> Self {
        Frequency::Schedule(schedule)
    }
}

/// Iterator returned by [`Frequency::upcoming`].
#[derive(Debug, Clone)]
pub struct Upcoming<'a> {
    frequency: &'a Frequency,
    cursor: Option<DateTime<Utc>>,
}

impl Iterator for Upcoming<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let after = self.cursor.take()?;
        let next = self.frequency.next_execution(after)?;
        self.cursor = next.checked_add_signed(Duration::seconds(1));
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::timezone::TriggerTimeZone;
    use crate::trigger::{DailyTrigger, Trigger};
    use crate::wall_clock::WallClockTime;
    use chrono::TimeZone;
    use std::time::Duration as StdDuration;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn daily_schedule(times: &[(u32, u32)]) -> Schedule {
        Schedule::new(times.iter().map(|(h, m)| {
            Trigger::Daily(DailyTrigger::new([WallClockTime::new(*h, *m, 0).unwrap()]))
        }))
        .with_time_zone(TriggerTimeZone::Utc)
    }

    #[test]
    fn test_unknown_never_runs() {
        let frequency = Frequency::Unknown;
        assert_eq!(frequency.next_execution(utc(2024, 1, 1, 0, 0, 0)), None);
        assert!(!frequency.run_on_startup());
    }

    #[test]
    fn test_interval_from_clock() {
        let now = utc(2024, 1, 1, 0, 0, 0);
        let frequency = Frequency::from_interval(StdDuration::from_secs(3723));
        assert_eq!(
            frequency.next_execution_or_now(None, &FixedClock(now)),
            Some(utc(2024, 1, 1, 1, 2, 3))
        );
    }

    #[test]
    fn test_interval_from_system_clock_is_close_to_now() {
        let frequency = Frequency::from_interval(StdDuration::from_secs(3723));
        let before = Utc::now();
        let next = frequency
            .next_execution_or_now(None, &crate::clock::SystemClock)
            .unwrap();
        let expected = before + Duration::seconds(3723);
        assert!((next - expected).num_seconds().abs() < 2);
    }

    #[test]
    fn test_schedule_dispatch() {
        let frequency = Frequency::from_schedule(daily_schedule(&[(17, 0), (12, 0)]));
        assert_eq!(
            frequency.next_execution(utc(2024, 1, 10, 1, 0, 0)),
            Some(utc(2024, 1, 10, 12, 0, 0))
        );
    }

    #[test]
    fn test_run_on_startup_derivation() {
        let interval = IntervalRecurrence::new(StdDuration::from_secs(60));
        assert!(Frequency::from(interval).run_on_startup());
        assert!(!Frequency::from(interval.with_run_on_startup(false)).run_on_startup());

        let schedule = daily_schedule(&[(9, 0)]);
        assert!(!Frequency::from(schedule.clone()).run_on_startup());
        assert!(Frequency::from(schedule.clone().with_run_on_startup(true)).run_on_startup());
        assert!(!Frequency::from(
            schedule.with_run_on_startup(true).with_enabled(false)
        )
        .run_on_startup());
    }

    #[test]
    fn test_upcoming_does_not_repeat_inclusive_match() {
        let frequency = Frequency::from_schedule(daily_schedule(&[(12, 0)]));
        let runs: Vec<_> = frequency.upcoming(utc(2024, 1, 10, 12, 0, 0)).take(3).collect();
        assert_eq!(
            runs,
            vec![
                utc(2024, 1, 10, 12, 0, 0),
                utc(2024, 1, 11, 12, 0, 0),
                utc(2024, 1, 12, 12, 0, 0),
            ]
        );
    }

    #[test]
    fn test_upcoming_interval_steps() {
        let frequency = Frequency::from_interval(StdDuration::from_secs(600));
        let runs: Vec<_> = frequency.upcoming(utc(2024, 1, 1, 0, 0, 0)).take(2).collect();
        assert_eq!(
            runs,
            vec![utc(2024, 1, 1, 0, 10, 0), utc(2024, 1, 1, 0, 20, 1)]
        );
    }

    #[test]
    fn test_upcoming_ends_for_disabled_schedule() {
        let frequency =
            Frequency::from_schedule(daily_schedule(&[(12, 0)]).with_enabled(false));
        assert_eq!(frequency.upcoming(utc(2024, 1, 1, 0, 0, 0)).count(), 0);
    }
}
