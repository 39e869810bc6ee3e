use chrono::{DateTime, Utc};

/// Format a price in cents as whole-dollar USD with thousands
/// separators, e.g. `1500_00` -> "$1,500". Cents round half-up.
pub fn format_price(price_cents: u64) -> String {
    let dollars = (price_cents + 50) / 100;
    format!("${}", group_thousands(dollars))
}

/// Format a mileage reading, e.g. `12345` -> "12,345 miles".
pub fn format_mileage(mileage: u32) -> String {
    format!("{} miles", group_thousands(mileage as u64))
}

/// Human "posted ... ago" label for a listing timestamp. Future or
/// just-posted timestamps read "just now".
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);

    // Average month (30.4375 days) and Julian year, matching common
    // calendar-agnostic "time ago" conventions.
    const MINUTE: i64 = 60;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 86_400;
    const WEEK: i64 = 604_800;
    const MONTH: i64 = 2_629_800;
    const YEAR: i64 = 31_557_600;

    let (count, unit) = if seconds < MINUTE {
        return "just now".to_string();
    } else if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if seconds < WEEK {
        (seconds / DAY, "day")
    } else if seconds < MONTH {
        (seconds / WEEK, "week")
    } else if seconds < YEAR {
        (seconds / MONTH, "month")
    } else {
        (seconds / YEAR, "year")
    };

    let plural = if count > 1 { "s" } else { "" };
    format!("{count} {unit}{plural} ago")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
