//! Human-readable durations, byte sizes and timestamps

use chrono::{DateTime, Local, SecondsFormat, Utc};
use std::fmt;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;

/// Milliseconds rendered in the largest whole unit: `3d`, `2h`, `5m`, `1s`, `250ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub u64);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0 as f64;
        for (unit, suffix) in [(DAY, "d"), (HOUR, "h"), (MINUTE, "m"), (SECOND, "s")] {
            if ms >= unit {
                return write!(f, "{}{}", (ms / unit).round(), suffix);
            }
        }
        write!(f, "{}ms", self.0)
    }
}

/// Byte count with binary multiples: `0 B`, `11 B`, `1.5 KB`, `2 MB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanBytes(pub u64);

impl fmt::Display for HumanBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            return write!(f, "{} B", self.0);
        }

        let rounded = format!("{:.2}", value);
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{} {}", trimmed, UNITS[unit])
    }
}

/// Date column for plain output.
pub fn format_date(now: DateTime<Utc>, utc: bool) -> String {
    if utc {
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    } else {
        now.with_timezone(&Local)
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_human_duration_formats_all_ranges() {
        assert_eq!(HumanDuration(0).to_string(), "0ms");
        assert_eq!(HumanDuration(999).to_string(), "999ms");
        assert_eq!(HumanDuration(1_000).to_string(), "1s");
        assert_eq!(HumanDuration(1_500).to_string(), "2s");
        assert_eq!(HumanDuration(90_000).to_string(), "2m");
        assert_eq!(HumanDuration(3 * 3_600_000).to_string(), "3h");
        assert_eq!(HumanDuration(36 * 3_600_000).to_string(), "2d");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(HumanBytes(0).to_string(), "0 B");
        assert_eq!(HumanBytes(11).to_string(), "11 B");
        assert_eq!(HumanBytes(1023).to_string(), "1023 B");
        assert_eq!(HumanBytes(1024).to_string(), "1 KB");
        assert_eq!(HumanBytes(1536).to_string(), "1.5 KB");
        assert_eq!(HumanBytes(5 * 1024 * 1024).to_string(), "5 MB");
    }

    #[test]
    fn test_format_date_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(format_date(now, true), "2024-03-09T14:05:07.000Z");

        let local = format_date(now, false);
        assert_eq!(local.len(), "2024-03-09T14:05:07.000".len());
        assert!(!local.ends_with('Z'));
    }
}
