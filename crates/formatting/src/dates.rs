use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

const MINUTES_IN_DAY: u64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: u64 = 2520;
const MINUTES_IN_MONTH: u64 = 43200;
const MINUTES_IN_TWO_MONTHS: u64 = 86400;

/// `Oct 19, 2026 14:05`
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%b %d, %Y %H:%M").to_string()
}

/// `Oct 19`
pub fn format_date_short<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%b %d").to_string()
}

/// Relative wording such as `5 minutes ago`, `about 2 hours ago` or `in 3 days`.
pub fn format_time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    let words = distance_in_words(seconds.unsigned_abs());
    if seconds < 0 {
        format!("in {}", words)
    } else {
        format!("{} ago", words)
    }
}

fn distance_in_words(seconds: u64) -> String {
    let minutes = (seconds as f64 / 60.0).round() as u64;

    match minutes {
        0 => "less than a minute".to_string(),
        1..=44 => plural(minutes, "minute"),
        45..=89 => "about 1 hour".to_string(),
        90..MINUTES_IN_DAY => {
            let hours = (minutes as f64 / 60.0).round() as u64;
            format!("about {}", plural(hours, "hour"))
        }
        MINUTES_IN_DAY..MINUTES_IN_ALMOST_TWO_DAYS => "1 day".to_string(),
        MINUTES_IN_ALMOST_TWO_DAYS..MINUTES_IN_MONTH => {
            let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as u64;
            plural(days, "day")
        }
        MINUTES_IN_MONTH..MINUTES_IN_TWO_MONTHS => {
            let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as u64;
            format!("about {}", plural(months, "month"))
        }
        _ => {
            let months = minutes / MINUTES_IN_MONTH;
            if months < 12 {
                let nearest = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as u64;
                return plural(nearest, "month");
            }
            let years = months / 12;
            match months % 12 {
                0..=2 => format!("about {}", plural(years, "year")),
                3..=8 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
