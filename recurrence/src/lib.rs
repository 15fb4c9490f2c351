// Recurrence engine: computes when scheduled work should next run
//
// Every query takes its reference instant explicitly; `clock` supplies the
// real time at the integration boundary.

pub mod clock;
pub mod config;
pub mod display;
pub mod errors;
pub mod frequency;
pub mod interval;
pub mod schedule;
pub mod telemetry;
pub mod timezone;
pub mod trigger;
pub mod wall_clock;
pub mod wire;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::ScheduleError;
pub use frequency::Frequency;
pub use interval::IntervalRecurrence;
pub use schedule::Schedule;
pub use timezone::{EffectiveZone, TriggerTimeZone};
pub use trigger::{
    next_day_of_month, DailyTrigger, DayOfMonthTrigger, NextExecution, Trigger,
    UnrepresentableDateHandling, WeeklyTrigger,
};
pub use wall_clock::WallClockTime;
