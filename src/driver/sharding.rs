//! # Date Folder Sharding
//!
//! Written keys get a `YYYY/MM/DD/` prefix unless they already carry one.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

static DATE_PREFIX: OnceLock<Regex> = OnceLock::new();

fn date_prefix() -> &'static Regex {
    DATE_PREFIX.get_or_init(|| Regex::new(r"^\d{4}/\d{2}/\d{2}/").expect("static regex"))
}

/// Whether the key already starts with a `YYYY/MM/DD/` segment group
pub fn has_date_prefix(key: &str) -> bool {
    date_prefix().is_match(key)
}

/// Prefix `key` with `date` unless it is already date-prefixed
pub fn shard_key(key: &str, date: NaiveDate) -> String {
    if has_date_prefix(key) {
        return key.to_string();
    }

    format!("{}/{}", date.format("%Y/%m/%d"), key.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_prefixes_plain_key() {
        assert_eq!(shard_key("log.txt", jan5()), "2024/01/05/log.txt");
        assert_eq!(shard_key("/a/b.txt", jan5()), "2024/01/05/a/b.txt");
    }

    #[test]
    fn test_idempotent() {
        let once = shard_key("log.txt", jan5());
        assert_eq!(shard_key(&once, jan5()), once);

        let other_day = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(shard_key("2024/01/05/log.txt", other_day), "2024/01/05/log.txt");
    }

    #[test]
    fn test_prefix_detection() {
        assert!(has_date_prefix("2024/01/05/x"));
        assert!(!has_date_prefix("2024/01/05"));
        assert!(!has_date_prefix("/2024/01/05/x"));
        assert!(!has_date_prefix("2024/1/05/x"));
        assert!(!has_date_prefix("reports/2024/01/05/x"));
    }
}
