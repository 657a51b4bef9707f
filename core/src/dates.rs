//! Relative ("3 weeks ago") rendering of commit timestamps.

/// Turns a Unix timestamp string into a human-relative description.
pub trait RelativeDateFormatter {
    fn relative(&self, timestamp: &str) -> String;
}

/// Coarse relative dates measured against a fixed `now`.
///
/// `now` is supplied by the host because wasm32 has no system clock.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyDates {
    pub now: u64,
}

impl FuzzyDates {
    pub fn new(now: u64) -> Self {
        FuzzyDates { now }
    }
}

impl RelativeDateFormatter for FuzzyDates {
    fn relative(&self, timestamp: &str) -> String {
        match timestamp.trim().parse::<u64>() {
            Ok(then) => fuzzy(self.now.saturating_sub(then)),
            Err(_) => timestamp.to_string(),
        }
    }
}

fn plural(n: u64, unit: &str) -> String {
    format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" })
}

fn fuzzy(seconds: u64) -> String {
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        plural(seconds / 60, "minute")
    } else if seconds < 86400 {
        plural(seconds / 3600, "hour")
    } else if seconds < 604800 {
        plural(seconds / 86400, "day")
    } else if seconds < 2592000 {
        plural(seconds / 604800, "week")
    } else if seconds < 31536000 {
        plural(seconds / 2592000, "month")
    } else {
        plural(seconds / 31536000, "year")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn ago(seconds: u64) -> String {
        FuzzyDates::new(NOW).relative(&(NOW - seconds).to_string())
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(ago(5), "just now");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(59 * 60), "59 minutes ago");
        assert_eq!(ago(2 * 3600), "2 hours ago");
        assert_eq!(ago(86400), "1 day ago");
        assert_eq!(ago(3 * 604800), "3 weeks ago");
        assert_eq!(ago(2 * 2592000), "2 months ago");
        assert_eq!(ago(5 * 31536000), "5 years ago");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let dates = FuzzyDates::new(NOW);
        assert_eq!(dates.relative(&(NOW + 500).to_string()), "just now");
    }

    #[test]
    fn test_unparsable_timestamp_passes_through() {
        let dates = FuzzyDates::new(NOW);
        assert_eq!(dates.relative("yesterday"), "yesterday");
    }
}
