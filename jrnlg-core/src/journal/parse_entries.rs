//! Parses the content of an entry file into a structured `JournalEntry`.
//!
//! Expected layout:
//!
//! ```text
//! ## Sunday 2026-02-08 8:31 AM America/Los_Angeles
//!
//! Body text with #tags and @mentions.
//! ```
use super::journal_entry::{JournalEntry, Timestamp};
use crate::errors::ParseError;
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

pub const MAX_TAG_LENGTH: usize = 80;
pub const MAX_MENTION_LENGTH: usize = 80;

/// `#` + letter + letters, digits, `_` or `-`. Hyphenated tags are split afterwards.
pub(crate) static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([a-zA-Z][a-zA-Z0-9_-]*)").expect("valid tag regex"));

/// `@` + letter + letters, digits or `_`, not preceded by an identifier character, so
/// `bob@example.com` is not a mention.
pub(crate) static MENTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^a-zA-Z0-9_])@([a-zA-Z][a-zA-Z0-9_]*)").expect("valid mention regex")
});

/// Case folding used for tags, mentions and every index key.
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Parses a complete entry file.
///
/// The first line starting with `##` is the header; everything after it, trimmed, is the body.
pub fn parse_entry(content: &str) -> Result<JournalEntry, ParseError> {
    let (header, body) = split_header(content)?;
    let timestamp = parse_timestamp(header)?;
    JournalEntry::new(timestamp, body)
}

fn split_header(content: &str) -> Result<(&str, &str), ParseError> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix("##") {
            let body = &content[offset + line.len()..];
            return Ok((header.trim(), body));
        }
        offset += line.len();
    }
    Err(ParseError::MissingHeader)
}

/// Parses `Weekday YYYY-MM-DD H:MM AM|PM Zone` (the header without its `##`).
pub fn parse_timestamp(header: &str) -> Result<Timestamp, ParseError> {
    let parts: Vec<&str> = header.split_whitespace().collect();
    let [weekday, date, time, meridiem, zone] = parts.as_slice() else {
        return Err(ParseError::InvalidTimestampFormat(header.to_string()));
    };

    if *meridiem != "AM" && *meridiem != "PM" {
        return Err(ParseError::InvalidMeridiem(meridiem.to_string()));
    }

    let date = parse_date(date)?;
    let (hour, minute) = parse_clock(time, meridiem)?;

    let tz: Tz = zone
        .parse()
        .map_err(|_| ParseError::UnknownLocation(zone.to_string()))?;
    let naive = date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| ParseError::InvalidTimeFormat(time.to_string()))?;
    let timestamp = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ParseError::NonexistentLocalTime(naive.to_string(), zone.to_string()))?;

    let expected = timestamp.format("%A").to_string();
    if *weekday != expected {
        return Err(ParseError::WeekdayMismatch {
            expected,
            got: weekday.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
        });
    }
    Ok(timestamp)
}

fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let parts: Vec<&str> = s.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(ParseError::InvalidDateFormat(s.to_string()));
    };
    let y: i32 = year
        .parse()
        .map_err(|_| ParseError::InvalidYear(year.to_string()))?;
    let m: u32 = month
        .parse()
        .map_err(|_| ParseError::InvalidMonth(month.to_string()))?;
    let d: u32 = day
        .parse()
        .map_err(|_| ParseError::InvalidDay(day.to_string()))?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| ParseError::InvalidDate(s.to_string()))
}

/// `H:MM` on a 12-hour clock, converted to 24-hour `(hour, minute)`.
fn parse_clock(s: &str, meridiem: &str) -> Result<(u32, u32), ParseError> {
    let Some((hour, minute)) = s.split_once(':') else {
        return Err(ParseError::InvalidTimeFormat(s.to_string()));
    };
    let hour: i64 = hour
        .parse()
        .map_err(|_| ParseError::InvalidHour(hour.to_string()))?;
    let minute: i64 = minute
        .parse()
        .map_err(|_| ParseError::InvalidMinute(minute.to_string()))?;
    if !(1..=12).contains(&hour) {
        return Err(ParseError::InvalidHour(hour.to_string()));
    }
    if !(0..=59).contains(&minute) {
        return Err(ParseError::InvalidMinute(minute.to_string()));
    }
    let hour = match (meridiem, hour) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        (_, h) => h + 12,
    };
    Ok((hour as u32, minute as u32))
}

/// All hashtags in `text`, lowercased, deduplicated and sorted.
///
/// `#machine-learning` yields both `machine` and `learning`; hyphen-split words that do not
/// start with a letter are dropped.
pub fn extract_tags(text: &str) -> Result<Vec<String>, ParseError> {
    let mut tags = BTreeSet::new();
    for caps in TAG_PATTERN.captures_iter(text) {
        for word in caps[1].split('-').filter(|w| !w.is_empty()) {
            let tag = fold_case(word);
            if tag.len() > MAX_TAG_LENGTH {
                return Err(ParseError::TagTooLong {
                    tag,
                    max: MAX_TAG_LENGTH,
                });
            }
            if !tag.starts_with(|c: char| c.is_ascii_lowercase()) {
                continue;
            }
            tags.insert(tag);
        }
    }
    Ok(tags.into_iter().collect())
}

/// All `@mentions` in `text`, lowercased, deduplicated and sorted. E-mail addresses are ignored.
pub fn extract_mentions(text: &str) -> Result<Vec<String>, ParseError> {
    let mut mentions = BTreeSet::new();
    for caps in MENTION_PATTERN.captures_iter(text) {
        let mention = fold_case(&caps[1]);
        if mention.len() > MAX_MENTION_LENGTH {
            return Err(ParseError::MentionTooLong {
                mention,
                max: MAX_MENTION_LENGTH,
            });
        }
        mentions.insert(mention);
    }
    Ok(mentions.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parse_err(content: &str) -> String {
        parse_entry(content)
            .expect_err("content should be rejected")
            .to_string()
    }

    #[test]
    fn parse_valid_entry() {
        let content = r#"
## Sunday 2026-02-08 8:31 AM America/Los_Angeles

Had a meeting with @Alice and @bob about #work #Meeting.
Email carol@example.com later.
"#;
        let entry = parse_entry(content).unwrap();
        let ts = entry.timestamp();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2026, 2, 8));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (8, 31, 0));
        assert_eq!(ts.timezone().name(), "America/Los_Angeles");
        assert_eq!(entry.tags(), ["meeting", "work"]);
        assert_eq!(entry.mentions(), ["alice", "bob"]);
        assert!(entry.body().starts_with("Had a meeting"));
        assert!(entry.body().ends_with("later."));
    }

    #[test]
    fn meridiem_conversion() {
        let midnight =
            parse_entry("## Monday 2026-02-16 12:00 AM America/Los_Angeles\n\nx").unwrap();
        assert_eq!(midnight.timestamp().hour(), 0);
        let noon = parse_entry("## Sunday 2026-02-15 12:00 PM America/Los_Angeles\n\nx").unwrap();
        assert_eq!(noon.timestamp().hour(), 12);
        let evening = parse_entry("## Wednesday 2026-02-11 5:45 PM UTC\n\nx").unwrap();
        assert_eq!(evening.timestamp().hour(), 17);
        assert_eq!(evening.timestamp().minute(), 45);
    }

    #[test]
    fn header_may_follow_leading_text() {
        let entry =
            parse_entry("preamble\n  ## Sunday 2026-02-08 4:31 PM UTC\n\nUTC entry.").unwrap();
        assert_eq!(entry.body(), "UTC entry.");
    }

    #[test]
    fn hyphenated_tags_split_into_words() {
        let tags =
            extract_tags("Topics: #machine-learning and #data-science, #a--b #x-9z").unwrap();
        assert_eq!(tags, ["a", "b", "data", "learning", "machine", "science", "x"]);
    }

    #[test]
    fn case_variants_collapse_to_one_tag() {
        assert_eq!(extract_tags("#Work #WORK #work #work").unwrap(), ["work"]);
    }

    #[test]
    fn emails_are_not_mentions() {
        let mentions =
            extract_mentions("Contact alice@example.com, @Bob and (@carol_1) or x_@dan").unwrap();
        assert_eq!(mentions, ["bob", "carol_1"]);
        assert_eq!(extract_mentions("@start of line").unwrap(), ["start"]);
    }

    #[test]
    fn oversized_tag_and_mention_are_rejected() {
        let long = "a".repeat(MAX_TAG_LENGTH + 1);
        assert!(matches!(
            extract_tags(&format!("#{long}")),
            Err(ParseError::TagTooLong { .. })
        ));
        assert!(matches!(
            extract_mentions(&format!("@{long}")),
            Err(ParseError::MentionTooLong { .. })
        ));
        let exact = "b".repeat(MAX_TAG_LENGTH);
        assert_eq!(extract_tags(&format!("#{exact}")).unwrap(), [exact]);
    }

    #[test]
    fn parse_errors() {
        let cases = [
            ("This is just body text with no header.", "missing header"),
            ("## Friday 2026-02-13 8:00 AM America/Los_Angeles\n\n", "empty body"),
            ("## Friday 02/13/2026 8:00 AM America/Los_Angeles\n\nBody.", "invalid date format"),
            ("## Sunday 2026/02/08 8:00 AM America/Los_Angeles\n\nBody.", "invalid date format"),
            ("## Monday 2026-02-08 8:00 AM America/Los_Angeles\n\nBody.", "weekday mismatch"),
            ("## Sunday 2026-02-08 8:00 AM PST\n\nBody.", "unknown location"),
            ("## Sunday 2026-02-08 8:00 America/Los_Angeles\n\nBody.", "invalid timestamp format"),
            ("## Sunday 2026-02-08 8:00 XM America/Los_Angeles\n\nBody.", "invalid meridiem"),
            ("## Sunday 2026-02-08 0:00 AM America/Los_Angeles\n\nBody.", "invalid hour"),
            ("## Sunday 2026-02-08 13:00 PM America/Los_Angeles\n\nBody.", "invalid hour"),
            ("## Sunday 2026-02-08 8:60 AM America/Los_Angeles\n\nBody.", "invalid minute"),
            ("## Sunday 2026-02-08 8:-5 AM America/Los_Angeles\n\nBody.", "invalid minute"),
            ("## Sunday 2026-02-08 800 AM America/Los_Angeles\n\nBody.", "invalid time format"),
            ("## Monday 2026-02-30 8:00 AM UTC\n\nBody.", "invalid date"),
            ("## Sunday 2026-03-08 2:30 AM America/Los_Angeles\n\nBody.", "nonexistent local time"),
        ];
        for (content, expected) in cases {
            let msg = parse_err(content);
            assert!(msg.contains(expected), "`{content}` gave `{msg}`, want `{expected}`");
        }
    }

    #[test]
    fn oversized_tag_in_entry_fails_parse() {
        let content = format!(
            "## Sunday 2026-02-08 8:00 AM America/Los_Angeles\n\nThis has a #{} tag.",
            "t".repeat(90)
        );
        assert!(parse_err(&content).contains("tag exceeds maximum length"));
    }
}
