//! Classification of a feed item's displayed time label.
//!
//! The page only shows relative phrases ("3小时前", "昨天 21:30", "2天前"),
//! so labels are bucketed, never parsed into timestamps.

use regex::Regex;

static TODAY: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"分钟前|小时前|刚刚").unwrap());

static YESTERDAY: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^昨天\s+[0-9]{1,2}:[0-9]{2}").unwrap());

static TWO_DAYS_AGO: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^2\s*天前$").unwrap());

/// Bucket a time label falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Today,
    Yesterday,
    TwoDaysAgo,
    Other,
}

/// Classify a raw time label. Empty or unmatched labels are [`TimeBucket::Other`].
#[must_use]
pub fn classify(label: &str) -> TimeBucket {
    if is_today(label) {
        TimeBucket::Today
    } else if is_yesterday(label) {
        TimeBucket::Yesterday
    } else if is_two_days_ago(label) {
        TimeBucket::TwoDaysAgo
    } else {
        TimeBucket::Other
    }
}

#[must_use]
pub fn is_today(label: &str) -> bool {
    TODAY.is_match(label)
}

#[must_use]
pub fn is_yesterday(label: &str) -> bool {
    YESTERDAY.is_match(label)
}

/// Only the literal two-day phrase; "3天前" and friends are not a match.
#[must_use]
pub fn is_two_days_ago(label: &str) -> bool {
    TWO_DAYS_AGO.is_match(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_phrases() {
        assert_eq!(classify("5分钟前"), TimeBucket::Today);
        assert_eq!(classify("3小时前"), TimeBucket::Today);
        assert_eq!(classify("刚刚"), TimeBucket::Today);
    }

    #[test]
    fn test_yesterday_phrases() {
        assert_eq!(classify("昨天 21:30"), TimeBucket::Yesterday);
        assert_eq!(classify("昨天 8:05"), TimeBucket::Yesterday);
        assert_eq!(classify("昨天  08:05"), TimeBucket::Yesterday);
    }

    #[test]
    fn test_yesterday_requires_time() {
        assert_eq!(classify("昨天"), TimeBucket::Other);
        assert_eq!(classify("前天 21:30"), TimeBucket::Other);
        assert_eq!(classify(" 昨天 21:30"), TimeBucket::Other);
    }

    #[test]
    fn test_two_days_ago_is_exact() {
        assert_eq!(classify("2天前"), TimeBucket::TwoDaysAgo);
        assert_eq!(classify("2 天前"), TimeBucket::TwoDaysAgo);
        assert_eq!(classify("3天前"), TimeBucket::Other);
        assert_eq!(classify("12天前"), TimeBucket::Other);
        assert_eq!(classify("2天前 ·投稿了视频"), TimeBucket::Other);
    }

    #[test]
    fn test_full_width_digits_not_yesterday() {
        assert_eq!(classify("昨天 ２１:３０"), TimeBucket::Other);
        assert_eq!(classify("２天前"), TimeBucket::Other);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify(""), TimeBucket::Other);
        assert_eq!(classify("2025-01-08"), TimeBucket::Other);
        assert_eq!(classify("01-08"), TimeBucket::Other);
    }
}
