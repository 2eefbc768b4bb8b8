use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::Contract;

/// Fixed-width UTC timestamp, so lexical order matches time order
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

/// Object key of one snapshot: `{contract}/{timestamp}.json`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    /// Derives the key for a snapshot of `contract` captured at `captured_at`
    #[must_use]
    pub fn new(contract: &Contract, captured_at: DateTime<Utc>) -> Self {
        Self(format!(
            "{contract}/{}.json",
            captured_at.format(TIMESTAMP_FORMAT)
        ))
    }

    /// Key as stored
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn paris() -> Contract {
        Contract::new("paris").unwrap()
    }

    #[test]
    fn test_key_layout() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 8, 15, 0).unwrap() + Duration::milliseconds(250);
        assert_eq!(
            SnapshotKey::new(&paris(), at).as_str(),
            "paris/20261014T081500.250Z.json"
        );
    }

    #[test]
    fn test_same_instant_same_key() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(SnapshotKey::new(&paris(), at), SnapshotKey::new(&paris(), at));
    }

    #[test]
    fn test_keys_sort_in_time_order() {
        let base = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        let instants = [
            base - Duration::days(400),
            base - Duration::hours(1),
            base - Duration::milliseconds(1),
            base,
            base + Duration::milliseconds(1),
            base + Duration::seconds(1),
        ];

        let keys: Vec<String> = instants
            .iter()
            .map(|at| SnapshotKey::new(&paris(), *at).to_string())
            .collect();

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        sorted.dedup();
        assert_eq!(sorted.len(), instants.len());
    }
}
