//! Recency window applied to listing cards and article pages.
//!
//! The window is half-open: anything dated strictly before the target date is
//! rejected and there is no upper bound. Dates are compared as local wall-clock
//! values, the way they are rendered on the blog.

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Canonical text form of the target date handed from the listing stage to
/// the article stage
pub const TARGET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date and datetime layouts accepted for card and article dates
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Recency boundary computed once per listing visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Today at 00:00:00 local time
    pub start_of_today: NaiveDateTime,
    /// `start_of_today` minus the lookback window in calendar days
    pub target_date: NaiveDateTime,
}

impl DateWindow {
    /// The target date as canonical `YYYY-MM-DD` text
    pub fn target_date_text(&self) -> String {
        self.target_date.format(TARGET_DATE_FORMAT).to_string()
    }

    pub fn start_of_today_text(&self) -> String {
        self.start_of_today.format(TARGET_DATE_FORMAT).to_string()
    }

    /// Whether a parsed date falls before this window
    pub fn rejects(&self, date: Option<NaiveDateTime>) -> bool {
        is_before_window(date, self.target_date)
    }
}

/// Computes the window for `look_back_window` days ending at the local day of `now`
pub fn compute_window(look_back_window: u32, now: NaiveDateTime) -> DateWindow {
    let today = now.date();
    let target_day = today
        .checked_sub_days(Days::new(u64::from(look_back_window)))
        .unwrap_or(NaiveDate::MIN);

    DateWindow {
        start_of_today: today.and_time(NaiveTime::MIN),
        target_date: target_day.and_time(NaiveTime::MIN),
    }
}

/// Computes the window against the current local time
pub fn compute_window_now(look_back_window: u32) -> DateWindow {
    compute_window(look_back_window, Local::now().naive_local())
}

/// Parses date text as shown on the blog into a local wall-clock value.
///
/// Date-only text resolves to midnight. Text carrying an explicit offset is
/// converted to local time. Returns `None` for anything unrecognised.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|day| day.and_time(NaiveTime::MIN))
        })
}

/// True iff `date` is strictly earlier than `target_date`.
///
/// An unparseable date never compares as before the window.
pub fn is_before_window(date: Option<NaiveDateTime>, target_date: NaiveDateTime) -> bool {
    matches!(date, Some(d) if d < target_date)
}

/// Attaches the local UTC offset to a wall-clock value.
///
/// A time skipped by a DST jump has no local reading and yields `None`; an
/// ambiguous one resolves to the earlier offset.
pub fn with_local_offset(date: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    Local
        .from_local_datetime(&date)
        .earliest()
        .map(|d| d.fixed_offset())
}

/// Formats an optional parsed date for log lines
pub fn display_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format(TARGET_DATE_FORMAT).to_string())
        .unwrap_or_else(|| "invalid date".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_zero_day_window_starts_today() {
        let window = compute_window(0, at(2024, 1, 10, 15));
        assert_eq!(window.start_of_today, at(2024, 1, 10, 0));
        assert_eq!(window.target_date, at(2024, 1, 10, 0));
        assert_eq!(window.target_date_text(), "2024-01-10");
    }

    #[test]
    fn test_lookback_crosses_month_and_year() {
        let window = compute_window(12, at(2024, 1, 5, 8));
        assert_eq!(window.target_date, at(2023, 12, 24, 0));
        assert_eq!(window.start_of_today_text(), "2024-01-05");
        assert_eq!(window.target_date_text(), "2023-12-24");
    }

    #[test]
    fn test_comparison_is_strict() {
        let target = at(2024, 1, 10, 0);
        assert!(is_before_window(Some(at(2024, 1, 9, 23)), target));
        assert!(!is_before_window(Some(target), target));
        assert!(!is_before_window(Some(at(2024, 1, 10, 1)), target));
        // no upper bound
        assert!(!is_before_window(Some(at(2030, 1, 1, 0)), target));
    }

    #[test]
    fn test_invalid_date_is_never_before_window() {
        let target = at(2024, 1, 10, 0);
        assert!(!is_before_window(parse_date("not a date"), target));
        assert!(!is_before_window(parse_date(""), target));
    }

    #[test]
    fn test_parse_blog_date_forms() {
        let expected = Some(at(2024, 1, 10, 0));
        assert_eq!(parse_date("January 10, 2024"), expected);
        assert_eq!(parse_date("Jan 10, 2024"), expected);
        assert_eq!(parse_date("  10 January 2024 "), expected);
        assert_eq!(parse_date("01/10/2024"), expected);
        assert_eq!(parse_date("2024-01-10"), expected);
        assert_eq!(parse_date("2024-01-10T09:30:00"), Some(at(2024, 1, 10, 9) + chrono::Duration::minutes(30)));
    }

    #[test]
    fn test_target_text_round_trips() {
        let window = compute_window(3, at(2024, 3, 31, 23));
        assert_eq!(parse_date(&window.target_date_text()), Some(window.target_date));
    }

    #[test]
    fn test_window_rejects() {
        let window = compute_window(2, at(2024, 1, 10, 12));
        assert!(window.rejects(parse_date("January 7, 2024")));
        assert!(!window.rejects(parse_date("January 8, 2024")));
        assert!(!window.rejects(None));
    }

    #[test]
    fn test_local_offset_keeps_wall_clock() {
        let dated = with_local_offset(at(2024, 1, 10, 0)).unwrap();
        assert_eq!(dated.naive_local(), at(2024, 1, 10, 0));
        assert_eq!(
            dated.offset().local_minus_utc(),
            Local
                .from_local_datetime(&at(2024, 1, 10, 0))
                .earliest()
                .unwrap()
                .offset()
                .local_minus_utc()
        );
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(parse_date("Jan 2, 2024")), "2024-01-02");
        assert_eq!(display_date(None), "invalid date");
    }
}
