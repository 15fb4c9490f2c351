// Time zone interpretation of trigger times
//
// Trigger times are wall-clock values. They are interpreted either in the
// server's local zone, in UTC, or in a named zone, and converted back to UTC
// instants using the offset of the candidate's own local date.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Platform-native (Windows) zone identifiers offered by the configuration UI,
/// mapped to their IANA equivalents.
const WINDOWS_ZONES: &[(&str, &str)] = &[
    ("UTC", "UTC"),
    ("GMT Standard Time", "Europe/London"),
    ("Greenwich Standard Time", "Atlantic/Reykjavik"),
    ("W. Europe Standard Time", "Europe/Berlin"),
    ("Central Europe Standard Time", "Europe/Budapest"),
    ("Central European Standard Time", "Europe/Warsaw"),
    ("Romance Standard Time", "Europe/Paris"),
    ("GTB Standard Time", "Europe/Bucharest"),
    ("FLE Standard Time", "Europe/Kiev"),
    ("E. Europe Standard Time", "Europe/Chisinau"),
    ("Russian Standard Time", "Europe/Moscow"),
    ("Turkey Standard Time", "Europe/Istanbul"),
    ("Israel Standard Time", "Asia/Jerusalem"),
    ("Arabian Standard Time", "Asia/Dubai"),
    ("India Standard Time", "Asia/Kolkata"),
    ("SE Asia Standard Time", "Asia/Bangkok"),
    ("China Standard Time", "Asia/Shanghai"),
    ("Singapore Standard Time", "Asia/Singapore"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("Korea Standard Time", "Asia/Seoul"),
    ("AUS Eastern Standard Time", "Australia/Sydney"),
    ("E. Australia Standard Time", "Australia/Brisbane"),
    ("Cen. Australia Standard Time", "Australia/Adelaide"),
    ("W. Australia Standard Time", "Australia/Perth"),
    ("New Zealand Standard Time", "Pacific/Auckland"),
    ("Hawaiian Standard Time", "Pacific/Honolulu"),
    ("Alaskan Standard Time", "America/Anchorage"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("Mountain Standard Time", "America/Denver"),
    ("US Mountain Standard Time", "America/Phoenix"),
    ("Central Standard Time", "America/Chicago"),
    ("Eastern Standard Time", "America/New_York"),
    ("Atlantic Standard Time", "America/Halifax"),
    ("Newfoundland Standard Time", "America/St_Johns"),
    ("E. South America Standard Time", "America/Sao_Paulo"),
    ("Argentina Standard Time", "America/Buenos_Aires"),
    ("South Africa Standard Time", "Africa/Johannesburg"),
    ("Egypt Standard Time", "Africa/Cairo"),
];

/// How a schedule's trigger times are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TriggerTimeZone {
    /// The host's local zone.
    #[default]
    ServerLocal,
    Utc,
    /// A named zone: an IANA id or a platform-native (Windows) id.
    Custom(String),
}

impl TriggerTimeZone {
    /// Resolve to a concrete zone.
    ///
    /// An unresolvable custom name falls back to the server's local zone;
    /// configuration may reference a zone that the host does not know.
    pub fn resolve(&self) -> EffectiveZone {
        match self {
            TriggerTimeZone::ServerLocal => EffectiveZone::Local,
            TriggerTimeZone::Utc => EffectiveZone::Utc,
            TriggerTimeZone::Custom(id) => match lookup_zone(id) {
                Some(tz) => EffectiveZone::Named(tz),
                None => {
                    debug!(zone_id = %id, "Unresolvable time zone, using server time");
                    EffectiveZone::Local
                }
            },
        }
    }

    /// Annotation used by display strings.
    pub fn label(&self) -> String {
        match self {
            TriggerTimeZone::ServerLocal => "server time".to_string(),
            TriggerTimeZone::Utc => "UTC".to_string(),
            TriggerTimeZone::Custom(id) if id.trim().is_empty() => "server time".to_string(),
            TriggerTimeZone::Custom(id) => id.trim().to_string(),
        }
    }
}

/// Look up a zone by IANA id (case-insensitive) or Windows id.
pub fn lookup_zone(id: &str) -> Option<Tz> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    if let Ok(tz) = id.parse::<Tz>() {
        return Some(tz);
    }
    if let Ok(tz) = Tz::from_str_insensitive(id) {
        return Some(tz);
    }
    WINDOWS_ZONES
        .iter()
        .find(|(windows, _)| windows.eq_ignore_ascii_case(id))
        .and_then(|(_, iana)| iana.parse::<Tz>().ok())
}

/// Every IANA zone id known to the engine, for zone pickers.
pub fn available_time_zones() -> Vec<&'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect()
}

/// A resolved zone used for local/UTC conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveZone {
    Local,
    Utc,
    Named(Tz),
}

impl EffectiveZone {
    /// Wall-clock date and time of `instant` in this zone, or `None` when
    /// that falls outside the representable calendar.
    pub fn to_local(&self, instant: DateTime<Utc>) -> Option<NaiveDateTime> {
        let utc = instant.naive_utc();
        let offset = match self {
            EffectiveZone::Local => chrono::Local.offset_from_utc_datetime(&utc).fix(),
            EffectiveZone::Utc => return Some(utc),
            EffectiveZone::Named(tz) => tz.offset_from_utc_datetime(&utc).fix(),
        };
        utc.checked_add_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> Option<NaiveDate> {
        self.to_local(instant).map(|local| local.date())
    }

    /// Absolute instant of a wall-clock date and time in this zone.
    ///
    /// The offset is the one in force at `local` itself. Ambiguous times
    /// (clocks going back) take the later instant; times inside a gap
    /// (clocks going forward) keep the pre-transition offset and so land
    /// after the gap. `None` at the edges of the representable calendar.
    pub fn to_instant(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            EffectiveZone::Local => resolve_local(&chrono::Local, local),
            EffectiveZone::Utc => Some(Utc.from_utc_datetime(&local)),
            EffectiveZone::Named(tz) => resolve_local(tz, local),
        }
    }
}

fn resolve_local<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    // Offsets stay within a day, so a day of headroom either side keeps
    // every conversion below in range.
    let day_before = local.checked_sub_signed(Duration::days(1))?;
    local.checked_add_signed(Duration::days(1))?;

    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(a, b) => {
            let (a, b) = (a.with_timezone(&Utc), b.with_timezone(&Utc));
            Some(a.max(b))
        }
        LocalResult::None => {
            // Transitions are never a day apart, so a day earlier is before the gap.
            let before = zone.offset_from_utc_datetime(&day_before);
            let offset = i64::from(before.fix().local_minus_utc());
            let utc = local.checked_sub_signed(Duration::seconds(offset))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}
