//! Turning command-line date arguments into filter bounds.

use anyhow::{Result, anyhow};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const INSTANT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Which end of a day a bare date stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

/// Parses `YYYY-MM-DD` (the start or end of that day in `tz`) or an RFC 3339 timestamp.
pub fn parse_bound(input: &str, tz: Tz, edge: DayEdge) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date '{input}': expected YYYY-MM-DD or RFC 3339"))?;
    let time = match edge {
        DayEdge::Start => NaiveTime::MIN,
        DayEdge::End => NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| anyhow!("invalid end-of-day time"))?,
    };
    localize(date.and_time(time), tz)
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DDTHH:MM[:SS]` wall-clock time in `tz`.
pub fn parse_instant(input: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&tz));
    }
    let naive = INSTANT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| {
            anyhow!("invalid timestamp '{input}': expected RFC 3339 or YYYY-MM-DDTHH:MM:SS")
        })?;
    Ok(localize(naive, tz)?.with_timezone(&tz))
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(anyhow!("{naive} does not exist in {}", tz.name())),
    }
}
