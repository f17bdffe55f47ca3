//! Instant conversion engine.
//!
//! Pure functions converting between a wall-clock value paired with an IANA
//! timezone and an absolute UTC instant, and rendering an instant in any
//! timezone. Nothing here reads process-wide state; the timezone database
//! is the one compiled into `chrono-tz`.
//!
//! All persistence and comparison happens on [`DateTime<Utc>`]. Display
//! goes through [`format`], which applies the offset in force at that
//! instant in the target zone (not a fixed offset).

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, NaiveDateTime, Offset, SecondsFormat, SubsecRound, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

/// Wall-clock formats accepted for input, most specific first.
const WALL_CLOCK_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Years whose instants serialize as four-digit RFC 3339 text.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimezoneError {
    #[error("Invalid timezone: '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid date/time: '{0}'")]
    InvalidDateTime(String),

    #[error("Invalid format pattern: '{0}'")]
    InvalidFormat(String),
}

/// How an instant should be rendered by [`format`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormatSpec {
    /// RFC 3339 with the zone's offset, e.g. `2024-03-09T23:00:00-05:00`
    #[default]
    Iso,
    /// Value of an HTML datetime-local input, e.g. `2024-03-09T23:00`
    DateTimeLocal,
    /// Human display, e.g. `Mar 09, 2024 11:00 PM`
    Display,
    /// Arbitrary chrono strftime pattern
    Pattern(String),
}

impl FormatSpec {
    /// Resolve a preset name, treating anything else as a strftime pattern.
    pub fn parse(spec: &str) -> Self {
        match spec {
            "iso" => FormatSpec::Iso,
            "datetime-local" => FormatSpec::DateTimeLocal,
            "display" => FormatSpec::Display,
            pattern => FormatSpec::Pattern(pattern.to_string()),
        }
    }

    fn pattern(&self) -> Option<&str> {
        match self {
            FormatSpec::Iso => None,
            FormatSpec::DateTimeLocal => Some("%Y-%m-%dT%H:%M"),
            FormatSpec::Display => Some("%b %d, %Y %-I:%M %p"),
            FormatSpec::Pattern(p) => Some(p.as_str()),
        }
    }
}

/// A time value as supplied by a client: either already absolute, or a
/// wall-clock reading that still needs a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    Instant(DateTime<Utc>),
    WallClock(NaiveDateTime),
}

impl TimeInput {
    /// Parse an RFC 3339 instant, falling back to a bare wall-clock value.
    pub fn parse(input: &str) -> Result<Self, TimezoneError> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(TimeInput::Instant(dt.with_timezone(&Utc)));
        }
        parse_wall_clock(input).map(TimeInput::WallClock)
    }

    /// Resolve to an absolute instant, reading wall-clock values in `tz`.
    ///
    /// Precision is cut to milliseconds, the granularity instants are stored at.
    /// Instants outside years 0000-9999 are rejected since their text form
    /// would not read back or sort.
    pub fn resolve(&self, tz: &str) -> Result<DateTime<Utc>, TimezoneError> {
        let instant = match self {
            TimeInput::Instant(instant) => *instant,
            TimeInput::WallClock(wall_clock) => to_instant(*wall_clock, tz)?,
        };
        if !STORABLE_YEARS.contains(&instant.year()) {
            return Err(TimezoneError::InvalidDateTime(serialize_instant(instant)));
        }
        Ok(instant.trunc_subsecs(3))
    }
}

/// Parse an IANA timezone identifier.
pub fn parse_timezone(tz: &str) -> Result<Tz, TimezoneError> {
    tz.parse::<Tz>()
        .map_err(|_| TimezoneError::InvalidTimezone(tz.to_string()))
}

pub fn is_known_timezone(tz: &str) -> bool {
    parse_timezone(tz).is_ok()
}

/// Parse a timezone-less date/time such as `2024-03-09T23:00`.
///
/// Only unsigned four-digit years are accepted.
pub fn parse_wall_clock(input: &str) -> Result<NaiveDateTime, TimezoneError> {
    WALL_CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .filter(|wall_clock| {
            STORABLE_YEARS.contains(&wall_clock.year()) && !input.starts_with(['+', '-'])
        })
        .ok_or_else(|| TimezoneError::InvalidDateTime(input.to_string()))
}

/// Interpret `wall_clock` as local time in `tz` and return the instant.
///
/// An ambiguous reading (the repeated hour when clocks fall back) resolves
/// to the earlier instant. A reading inside a spring-forward gap is taken
/// with the offset in force just before the gap, so it lands after the
/// transition by the same distance it sits past the gap start.
pub fn to_instant(wall_clock: NaiveDateTime, tz: &str) -> Result<DateTime<Utc>, TimezoneError> {
    let zone = parse_timezone(tz)?;

    let instant = match zone.from_local_datetime(&wall_clock) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        chrono::LocalResult::None => {
            let before_gap = offset_before_gap(&zone, wall_clock);
            let utc = wall_clock - chrono::Duration::seconds(before_gap.local_minus_utc() as i64);
            Utc.from_utc_datetime(&utc)
        }
    };

    Ok(instant)
}

/// Offset in force one second before the transition that skips `wall_clock`.
///
/// The transition is the first instant whose local reading lies past
/// `wall_clock`. Every candidate instant sits within a day of the reading,
/// since no real offset reaches 24 hours, so a binary search over that
/// window finds it to the second.
fn offset_before_gap(zone: &Tz, wall_clock: NaiveDateTime) -> chrono::FixedOffset {
    let target = wall_clock.and_utc().timestamp();
    let is_past = |utc: NaiveDateTime| {
        let offset = zone.offset_from_utc_datetime(&utc).fix().local_minus_utc() as i64;
        utc.and_utc().timestamp() + offset > target
    };

    let mut lo = wall_clock - chrono::Duration::days(1);
    let mut hi = wall_clock + chrono::Duration::days(1);
    while (hi - lo).num_seconds() > 1 {
        let mid = lo + (hi - lo) / 2;
        if is_past(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    zone.offset_from_utc_datetime(&(hi - chrono::Duration::seconds(1))).fix()
}

/// Render `instant` as wall-clock time in `tz`.
pub fn format(instant: DateTime<Utc>, tz: &str, spec: &FormatSpec) -> Result<String, TimezoneError> {
    let zone = parse_timezone(tz)?;
    let local = instant.with_timezone(&zone);

    match spec.pattern() {
        None => Ok(local.to_rfc3339()),
        Some(pattern) => {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(TimezoneError::InvalidFormat(pattern.to_string()));
            }
            Ok(local.format(pattern).to_string())
        }
    }
}

/// Short zone name (e.g. `EST`, `PDT`) valid at `at`.
pub fn abbreviation(tz: &str, at: DateTime<Utc>) -> Result<String, TimezoneError> {
    let zone = parse_timezone(tz)?;
    Ok(at.with_timezone(&zone).format("%Z").to_string())
}

/// Canonical storage form of an instant: RFC 3339, UTC, milliseconds.
///
/// Every stored instant uses this form so text order is time order.
pub fn serialize_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Snapshot of a zone's rules at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInfo {
    pub timezone: String,
    pub abbreviation: String,
    /// UTC offset at this instant (e.g. `-05:00`)
    pub utc_offset: String,
    pub dst_active: bool,
    /// The instant rendered in the zone (RFC 3339)
    pub now: String,
}

/// Describe `tz` as observed at `at`.
pub fn zone_info(tz: &str, at: DateTime<Utc>) -> Result<ZoneInfo, TimezoneError> {
    let zone = parse_timezone(tz)?;
    let local = at.with_timezone(&zone);
    let offset = local.offset().fix();

    Ok(ZoneInfo {
        timezone: tz.to_string(),
        abbreviation: local.format("%Z").to_string(),
        utc_offset: local.format("%:z").to_string(),
        dst_active: offset != standard_offset(&zone, at),
        now: local.to_rfc3339(),
    })
}

/// The smaller of the January and July offsets, which is standard time
/// in both hemispheres.
fn standard_offset(zone: &Tz, at: DateTime<Utc>) -> chrono::FixedOffset {
    let year = at.year();
    let probe = |month| {
        Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0)
            .single()
            .map(|dt| dt.with_timezone(zone).offset().fix())
            .unwrap_or_else(|| at.with_timezone(zone).offset().fix())
    };
    let (jan, jul) = (probe(1), probe(7));
    if jan.local_minus_utc() <= jul.local_minus_utc() {
        jan
    } else {
        jul
    }
}

/// A curated timezone offered to users.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogEntry {
    pub value: &'static str,
    pub label: &'static str,
    pub region: &'static str,
}

const fn entry(value: &'static str, label: &'static str, region: &'static str) -> CatalogEntry {
    CatalogEntry { value, label, region }
}

/// Common timezones grouped by region.
pub const COMMON_TIMEZONES: &[CatalogEntry] = &[
    entry("America/New_York", "Eastern Time (ET)", "Americas"),
    entry("America/Chicago", "Central Time (CT)", "Americas"),
    entry("America/Denver", "Mountain Time (MT)", "Americas"),
    entry("America/Los_Angeles", "Pacific Time (PT)", "Americas"),
    entry("America/Anchorage", "Alaska Time (AKT)", "Americas"),
    entry("Pacific/Honolulu", "Hawaii Time (HT)", "Americas"),
    entry("America/Phoenix", "Arizona Time (MST)", "Americas"),
    entry("America/Toronto", "Toronto", "Americas"),
    entry("America/Vancouver", "Vancouver", "Americas"),
    entry("America/Sao_Paulo", "São Paulo", "Americas"),
    entry("America/Mexico_City", "Mexico City", "Americas"),
    entry("America/Argentina/Buenos_Aires", "Buenos Aires", "Americas"),
    entry("Europe/London", "London (GMT/BST)", "Europe"),
    entry("Europe/Paris", "Paris (CET/CEST)", "Europe"),
    entry("Europe/Berlin", "Berlin (CET/CEST)", "Europe"),
    entry("Europe/Rome", "Rome (CET/CEST)", "Europe"),
    entry("Europe/Madrid", "Madrid (CET/CEST)", "Europe"),
    entry("Europe/Amsterdam", "Amsterdam (CET/CEST)", "Europe"),
    entry("Europe/Brussels", "Brussels (CET/CEST)", "Europe"),
    entry("Europe/Vienna", "Vienna (CET/CEST)", "Europe"),
    entry("Europe/Zurich", "Zurich (CET/CEST)", "Europe"),
    entry("Europe/Athens", "Athens (EET/EEST)", "Europe"),
    entry("Europe/Istanbul", "Istanbul (TRT)", "Europe"),
    entry("Europe/Moscow", "Moscow (MSK)", "Europe"),
    entry("Asia/Dubai", "Dubai (GST)", "Asia"),
    entry("Asia/Kolkata", "India (IST)", "Asia"),
    entry("Asia/Shanghai", "China (CST)", "Asia"),
    entry("Asia/Tokyo", "Tokyo (JST)", "Asia"),
    entry("Asia/Seoul", "Seoul (KST)", "Asia"),
    entry("Asia/Hong_Kong", "Hong Kong (HKT)", "Asia"),
    entry("Asia/Singapore", "Singapore (SGT)", "Asia"),
    entry("Asia/Bangkok", "Bangkok (ICT)", "Asia"),
    entry("Asia/Jakarta", "Jakarta (WIB)", "Asia"),
    entry("Asia/Manila", "Manila (PHT)", "Asia"),
    entry("Australia/Sydney", "Sydney (AEDT/AEST)", "Pacific"),
    entry("Australia/Melbourne", "Melbourne (AEDT/AEST)", "Pacific"),
    entry("Australia/Brisbane", "Brisbane (AEST)", "Pacific"),
    entry("Australia/Perth", "Perth (AWST)", "Pacific"),
    entry("Pacific/Auckland", "Auckland (NZDT/NZST)", "Pacific"),
    entry("Africa/Cairo", "Cairo (EET)", "Africa"),
    entry("Africa/Johannesburg", "Johannesburg (SAST)", "Africa"),
    entry("Africa/Lagos", "Lagos (WAT)", "Africa"),
    entry("Africa/Nairobi", "Nairobi (EAT)", "Africa"),
    entry("UTC", "UTC (Coordinated Universal Time)", "UTC"),
];
