// Human-readable descriptions for dashboards
//
// Every recurrence renders as a sentence; anything that can never run says
// so explicitly rather than rendering blank.

use crate::frequency::Frequency;
use crate::interval::IntervalRecurrence;
use crate::schedule::Schedule;
use crate::timezone::TriggerTimeZone;
use crate::trigger::weekly::weekday_name;
use crate::trigger::{
    DailyTrigger, DayOfMonthTrigger, Trigger, UnrepresentableDateHandling, WeeklyTrigger,
};
use std::time::Duration;

/// Days of the month that exist in every month.
const ALWAYS_REPRESENTABLE: u32 = 28;

impl DailyTrigger {
    pub fn to_display_string(&self, zone: &TriggerTimeZone) -> String {
        if self.trigger_times.is_empty() {
            return "Daily trigger without times; it will not run.".to_string();
        }
        format!(
            "Daily at the following times: {} ({}).",
            self.times_list(),
            zone.label()
        )
    }

    fn times_list(&self) -> String {
        self.trigger_times
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl WeeklyTrigger {
    pub fn to_display_string(&self, zone: &TriggerTimeZone) -> String {
        let days = self.days();
        if days.is_empty() || self.daily.trigger_times.is_empty() {
            return "Weekly trigger without days or times; it will not run.".to_string();
        }
        let names: Vec<String> = days.iter().map(|day| weekday_name(*day).to_string()).collect();
        format!(
            "Weekly on {} at the following times: {} ({}).",
            join_list(&names),
            self.daily.times_list(),
            zone.label()
        )
    }
}

impl DayOfMonthTrigger {
    pub fn to_display_string(&self, zone: &TriggerTimeZone) -> String {
        let days: Vec<u32> = self
            .trigger_days
            .iter()
            .copied()
            .filter(|day| (1..=31).contains(day))
            .collect();
        if days.is_empty() || self.daily.trigger_times.is_empty() {
            return "Monthly trigger without days or times; it will not run.".to_string();
        }

        let ordinals: Vec<String> = days.iter().map(|day| ordinal(*day)).collect();
        let mut out = format!(
            "Monthly on the {} at the following times: {} ({}).",
            join_list(&ordinals),
            self.daily.times_list(),
            zone.label()
        );
        if days.iter().any(|day| *day > ALWAYS_REPRESENTABLE) {
            out.push_str(match self.unrepresentable_date_handling {
                UnrepresentableDateHandling::Skip => {
                    " Months without that day are skipped."
                }
                UnrepresentableDateHandling::LastDayOfMonth => {
                    " Months without that day use their last day instead."
                }
            });
        }
        out
    }
}

impl Trigger {
    pub fn to_display_string(&self, zone: &TriggerTimeZone) -> String {
        match self {
            Trigger::Unknown => "Unknown trigger; it will not run.".to_string(),
            Trigger::Daily(trigger) => trigger.to_display_string(zone),
            Trigger::Weekly(trigger) => trigger.to_display_string(zone),
            Trigger::Monthly(trigger) => trigger.to_display_string(zone),
        }
    }
}

impl Schedule {
    /// One line per trigger.
    pub fn to_display_string(&self) -> String {
        if !self.enabled {
            return "The schedule is disabled and will not run.".to_string();
        }
        if self.triggers.is_empty() {
            return "The schedule has no triggers and will not run.".to_string();
        }

        let mut lines: Vec<String> = self
            .triggers
            .iter()
            .map(|trigger| trigger.to_display_string(&self.time_zone))
            .collect();
        if self.run_on_startup == Some(true) {
            lines.push("Also runs on startup.".to_string());
        }
        lines.join("\n")
    }
}

impl IntervalRecurrence {
    pub fn to_display_string(&self) -> String {
        let mut out = if self.interval.is_zero() {
            "Runs continuously, with no delay between runs.".to_string()
        } else {
            format!("Runs every {}.", describe_duration(self.interval))
        };
        if self.runs_on_startup() {
            out.push_str(" Also runs on startup.");
        }
        out
    }
}

impl Frequency {
    pub fn to_display_string(&self) -> String {
        match self {
            Frequency::Unknown => "No recurrence is configured; it will not run.".to_string(),
            Frequency::Interval(interval) => interval.to_display_string(),
            Frequency::Schedule(schedule) => schedule.to_display_string(),
        }
    }
}

/// "1 hour, 2 minutes and 3 seconds"
pub fn describe_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let units = [
        (total / 86_400, "day"),
        ((total % 86_400) / 3600, "hour"),
        ((total % 3600) / 60, "minute"),
        (total % 60, "second"),
        (u64::from(duration.subsec_millis()), "millisecond"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, name)| {
            if *count == 1 {
                format!("1 {}", name)
            } else {
                format!("{} {}s", count, name)
            }
        })
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        join_list(&parts)
    }
}

fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}
