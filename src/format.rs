//! Display formatting for distances and collection dates

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Timelike};

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    En,
    #[default]
    Ko,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "ko" | "ko-kr" => Ok(Locale::Ko),
            other => Err(format!("unknown locale '{other}' (expected 'en' or 'ko')")),
        }
    }
}

/// Format a distance in meters
///
/// Under 1000m: rounded whole meters ("999m").
/// From 1000m: kilometers with one decimal ("1.5km").
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// Format a collection timestamp, e.g. "October 19, 2026 at 02:30 PM"
/// or "2026년 10월 19일 오후 02:30"
pub fn format_collected_date<Tz: TimeZone>(ts: &DateTime<Tz>, locale: Locale) -> String
where
    Tz::Offset: Display,
{
    match locale {
        Locale::En => ts.format("%B %-d, %Y at %I:%M %p").to_string(),
        Locale::Ko => {
            let meridiem = if ts.hour() < 12 { "오전" } else { "오후" };
            format!(
                "{} {} {}",
                ts.format("%Y년 %-m월 %-d일"),
                meridiem,
                ts.format("%I:%M")
            )
        }
    }
}

/// Human relative time between `ts` and `now`
///
/// Falls back to [`format_collected_date`] after a week.
pub fn relative_time<Tz: TimeZone>(ts: &DateTime<Tz>, now: &DateTime<Tz>, locale: Locale) -> String
where
    Tz::Offset: Display,
{
    let elapsed = now.clone().signed_duration_since(ts.clone());
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    match locale {
        Locale::En => {
            if minutes < 1 {
                "Just now".to_string()
            } else if minutes < 60 {
                format!("{minutes}m ago")
            } else if hours < 24 {
                format!("{hours}h ago")
            } else if days < 7 {
                format!("{days}d ago")
            } else {
                format_collected_date(ts, locale)
            }
        }
        Locale::Ko => {
            if minutes < 1 {
                "방금 전".to_string()
            } else if minutes < 60 {
                format!("{minutes}분 전")
            } else if hours < 24 {
                format!("{hours}시간 전")
            } else if days < 7 {
                format!("{days}일 전")
            } else {
                format_collected_date(ts, locale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(42.4), "42m");
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(1500.0), "1.5km");
        assert_eq!(format_distance(12_345.0), "12.3km");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("ko-KR".parse::<Locale>(), Ok(Locale::Ko));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_collected_date() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap();
        assert_eq!(format_collected_date(&ts, Locale::En), "October 19, 2026 at 02:30 PM");
        assert_eq!(format_collected_date(&ts, Locale::Ko), "2026년 10월 19일 오후 02:30");
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        assert_eq!(relative_time(&(now - Duration::seconds(30)), &now, Locale::En), "Just now");
        assert_eq!(relative_time(&(now - Duration::minutes(5)), &now, Locale::En), "5m ago");
        assert_eq!(relative_time(&(now - Duration::hours(3)), &now, Locale::En), "3h ago");
        assert_eq!(relative_time(&(now - Duration::days(2)), &now, Locale::Ko), "2일 전");
        assert_eq!(
            relative_time(&(now - Duration::days(8)), &now, Locale::En),
            "October 11, 2026 at 12:00 PM"
        );
    }
}
