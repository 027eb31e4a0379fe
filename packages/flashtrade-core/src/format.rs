//! Display helpers for balances, percentages, volumes and timers.

use chrono::{DateTime, Utc};

/// Format a value as US dollars, e.g. `$45,000.00` or `-$85.00`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.reverse();
    groups.join(",")
}

/// Format a signed percentage with two decimals, e.g. `+2.85%`.
pub fn format_percentage(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

/// Abbreviate large values with K/M/B suffixes.
pub fn format_large_number(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        value.to_string()
    }
}

/// Format minutes as `45m`, `1h` or `1h 30m`.
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining > 0 {
        format!("{}h {}m", hours, remaining)
    } else {
        format!("{}h", hours)
    }
}

/// Countdown to `end` as `m:ss`; `0:00` once elapsed.
pub fn format_time_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = (end - now).num_milliseconds();
    if remaining <= 0 {
        return "0:00".to_string();
    }
    let minutes = remaining / 60_000;
    let seconds = (remaining % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(45000.0), "$45,000.00");
        assert_eq!(format_currency(0.85), "$0.85");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-85.0), "-$85.00");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(2.85), "+2.85%");
        assert_eq!(format_percentage(-2.594), "-2.59%");
        assert_eq!(format_percentage(0.0), "+0.00%");
    }

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(28_500_000_000.0), "28.5B");
        assert_eq!(format_large_number(2_100_000.0), "2.1M");
        assert_eq!(format_large_number(1500.0), "1.5K");
        assert_eq!(format_large_number(500.0), "500");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(90), "1h 30m");
    }

    #[test]
    fn test_format_time_remaining() {
        let now = Utc::now();
        assert_eq!(format_time_remaining(now + Duration::seconds(905), now), "15:05");
        assert_eq!(format_time_remaining(now - Duration::seconds(1), now), "0:00");
    }
}
