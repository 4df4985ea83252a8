//! Human-readable timestamps stored alongside log and rating rows.
//!
//! Rows keep only the formatted string, rendered in a fixed UTC+8 offset as
//! `YYYY/M/D HH:MM:SS`.

use chrono::{DateTime, FixedOffset, Offset, Utc};

const OFFSET_SECS: i32 = 8 * 3600;

/// Format an instant for persistence.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    // 8h is always inside FixedOffset's ±24h range
    let offset = FixedOffset::east_opt(OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
        .format("%Y/%-m/%-d %H:%M:%S")
        .to_string()
}

/// Format the current instant for persistence.
pub fn now_formatted() -> String {
    format_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn shifts_to_utc_plus_eight() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 2, 30, 5).unwrap();
        assert_eq!(format_timestamp(at), "2024/1/15 10:30:05");
    }

    #[test]
    fn rolls_over_the_date() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2025/1/1 04:00:00");
    }
}
