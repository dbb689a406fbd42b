use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Parses a timezone label such as `+09:00` or `UTC`; unknown labels fall back to UTC.
pub fn parse_timezone(label: &str) -> FixedOffset {
    let label = label.trim();
    if label.eq_ignore_ascii_case("utc") || label.eq_ignore_ascii_case("z") {
        return utc_offset();
    }

    match label.parse::<FixedOffset>() {
        Ok(offset) => offset,
        Err(_) => {
            tracing::warn!("Unrecognized timezone label {:?}, using UTC", label);
            utc_offset()
        }
    }
}

pub fn is_valid_timezone(label: &str) -> bool {
    let label = label.trim();
    label.eq_ignore_ascii_case("utc")
        || label.eq_ignore_ascii_case("z")
        || label.parse::<FixedOffset>().is_ok()
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

pub fn date_in_timezone(timestamp: DateTime<Utc>, timezone: &str) -> NaiveDate {
    timestamp.with_timezone(&parse_timezone(timezone)).date_naive()
}

pub fn current_date_in(timezone: &str) -> NaiveDate {
    date_in_timezone(Utc::now(), timezone)
}

pub fn format_time_in(datetime: DateTime<Utc>, timezone: &str) -> String {
    datetime
        .with_timezone(&parse_timezone(timezone))
        .format("%H:%M")
        .to_string()
}

pub fn format_duration_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
