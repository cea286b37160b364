//! Showtime text to absolute time conversion.
//!
//! Listings only spell out am/pm on some of their times, e.g.
//! `10:00 10:45 11:45pm`. A time without a suffix borrows the suffix of the
//! nearest later time in the same listing that has one.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+):([0-9]{2})\W*(\w*)$").expect("valid showtime regex")
});

fn meridiem_suffix(text: &str) -> Option<String> {
    let tail = text.get(text.len().saturating_sub(2)..)?.to_ascii_lowercase();
    (tail == "am" || tail == "pm").then_some(tail)
}

/// Appends the borrowed am/pm suffix to every entry that lacks one.
///
/// Entries are scanned from last to first; entries with no suffixed time
/// after them are returned unchanged and later parse as 24-hour times.
#[must_use]
pub fn fill_meridiem<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    let mut filled = vec![String::new(); texts.len()];
    let mut last_suffix = String::new();
    for (index, text) in texts.iter().enumerate().rev() {
        let text = text.as_ref();
        filled[index] = match meridiem_suffix(text) {
            Some(suffix) => {
                last_suffix = suffix;
                text.to_owned()
            }
            None => format!("{text}{last_suffix}"),
        };
    }
    filled
}

/// Parses `<hour>:<minute>[am|pm]` into a UTC timestamp on `date`.
///
/// Returns `None` when there is no `h:mm` pattern or the resulting clock
/// time is out of range.
#[must_use]
pub fn parse_time(text: &str, date: NaiveDate) -> Option<DateTime<Utc>> {
    let caps = TIME_RE.captures(text)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let suffix = caps[3].to_ascii_lowercase();
    if hour > 23 {
        return None;
    }

    if suffix == "pm" && hour != 12 {
        hour += 12;
    } else if suffix == "am" && hour == 12 {
        hour = 0;
    }

    date.and_hms_opt(hour, minute, 0).map(|naive| naive.and_utc())
}

/// Fills missing meridiems and parses every entry. Entries that fail to
/// parse come back as `None` so callers can keep their positions aligned.
#[must_use]
pub fn normalize<S: AsRef<str>>(texts: &[S], date: NaiveDate) -> Vec<Option<DateTime<Utc>>> {
    fill_meridiem(texts)
        .iter()
        .map(|text| parse_time(text, date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2009, 12, 23).unwrap()
    }

    fn hm(time: DateTime<Utc>) -> (u32, u32) {
        (time.hour(), time.minute())
    }

    #[test]
    fn suffix_propagates_backwards() {
        let filled = fill_meridiem(&["10:00", "10:45", "11:45pm"]);
        assert_eq!(filled, vec!["10:00pm", "10:45pm", "11:45pm"]);
    }

    #[test]
    fn nearest_later_suffix_wins() {
        let filled = fill_meridiem(&["11:30", "11:50am", "1:00", "3:15pm"]);
        assert_eq!(filled, vec!["11:30am", "11:50am", "1:00pm", "3:15pm"]);
    }

    #[test]
    fn trailing_unsuffixed_times_stay_ambiguous() {
        let filled = fill_meridiem(&["1:00pm", "11:30"]);
        assert_eq!(filled, vec!["1:00pm", "11:30"]);
    }

    #[test]
    fn uppercase_suffix_is_recognised() {
        let filled = fill_meridiem(&["7:00", "9:30PM"]);
        assert_eq!(filled, vec!["7:00pm", "9:30PM"]);
    }

    #[test]
    fn filled_times_all_parse_to_pm() {
        let times = normalize(&["10:00", "10:45", "11:45pm"], day());
        let times: Vec<_> = times.into_iter().map(|t| hm(t.unwrap())).collect();
        assert_eq!(times, vec![(22, 0), (22, 45), (23, 45)]);
    }

    #[test]
    fn noon_and_midnight() {
        assert_eq!(hm(parse_time("12:15pm", day()).unwrap()), (12, 15));
        assert_eq!(hm(parse_time("12:15am", day()).unwrap()), (0, 15));
    }

    #[test]
    fn bare_time_is_24_hour() {
        assert_eq!(hm(parse_time("13:45", day()).unwrap()), (13, 45));
        assert_eq!(hm(parse_time("9:05", day()).unwrap()), (9, 5));
    }

    #[test]
    fn parsed_time_is_on_the_given_date_with_zero_seconds() {
        let time = parse_time("4:00pm", day()).unwrap();
        assert_eq!(time.date_naive(), day());
        assert_eq!(time.second(), 0);
    }

    #[test]
    fn meridiem_may_be_separated_by_space() {
        assert_eq!(hm(parse_time("7:30 pm", day()).unwrap()), (19, 30));
    }

    #[test]
    fn rejects_text_without_time() {
        assert!(parse_time("Tickets", day()).is_none());
    }

    #[test]
    fn rejects_hour_too_large_for_meridiem_shift() {
        assert!(parse_time("4294967290:00pm", day()).is_none());
        assert!(parse_time("99999999999:00pm", day()).is_none());
    }

    #[test]
    fn rejects_out_of_range_clock_time() {
        assert!(parse_time("25:00", day()).is_none());
        assert!(parse_time("13:00pm", day()).is_none());
    }
}
