//! Station payload as returned by the provider

use serde::de::IgnoredAny;

/// One contract's station records at one point in time.
///
/// The provider's response body is kept byte for byte. The only check applied
/// is that it is a JSON array; individual records are not inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationDataset {
    body: Vec<u8>,
    record_count: usize,
}

impl StationDataset {
    /// Parses a response body into a dataset
    ///
    /// # Errors
    ///
    /// Returns the parser error if the body is not valid JSON or not an array
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let record_count = count_records(body)?;
        Ok(Self {
            body: body.to_vec(),
            record_count,
        })
    }

    /// Number of station records
    #[must_use]
    pub const fn record_count(&self) -> usize {
        self.record_count
    }

    /// Whether the provider returned no stations
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Encodes the dataset as the bytes of a snapshot object
    ///
    /// # Errors
    ///
    /// Returns the parser error if the body no longer decodes as the array it was built from
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        if count_records(&self.body)? != self.record_count {
            return Err(serde::de::Error::custom(
                "record count changed since the payload was fetched",
            ));
        }
        Ok(self.body.clone())
    }
}

fn count_records(body: &[u8]) -> serde_json::Result<usize> {
    let records: Vec<IgnoredAny> = serde_json::from_slice(body)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn stations(count: usize) -> Value {
        Value::Array(
            (0..count)
                .map(|n| {
                    json!({
                        "number": n,
                        "name": format!("{n:05} - STATION"),
                        "position": { "lat": 48.8566, "lng": 2.3522 },
                        "status": "OPEN",
                        "bike_stands": 20,
                        "available_bikes": n % 20,
                        "last_update": 1_617_282_000_000_u64
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn test_parses_array_and_counts_records() {
        let body = serde_json::to_vec(&stations(3)).unwrap();
        let dataset = StationDataset::from_slice(&body).unwrap();
        assert_eq!(dataset.record_count(), 3);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn test_records_are_not_inspected() {
        let dataset = StationDataset::from_slice(br#"[1, "two", null, {"new_field": []}]"#).unwrap();
        assert_eq!(dataset.record_count(), 4);
    }

    #[test]
    fn test_empty_array_is_valid() {
        let dataset = StationDataset::from_slice(b"[]").unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.to_json_bytes().unwrap(), b"[]");
    }

    #[test]
    fn test_rejects_non_array_payloads() {
        assert!(StationDataset::from_slice(br#"{ "error" : "Unauthorized" }"#).is_err());
        assert!(StationDataset::from_slice(b"<html>Bad Gateway</html>").is_err());
        assert!(StationDataset::from_slice(b"[{\"number\": 1}").is_err());
        assert!(StationDataset::from_slice(b"").is_err());
    }

    #[test]
    fn test_serialization_keeps_provider_text() {
        let body = br#"[{"number":123,"name":"Test Station","position":{"lat":48.8566,"lng":2.3522}}]"#;
        let dataset = StationDataset::from_slice(body).unwrap();
        assert_eq!(dataset.to_json_bytes().unwrap(), body);
    }

    #[test]
    fn test_surrounding_whitespace_is_kept() {
        let body = b"  [ {\"number\": 1} ]\n";
        let dataset = StationDataset::from_slice(body).unwrap();
        assert_eq!(dataset.record_count(), 1);
        assert_eq!(dataset.to_json_bytes().unwrap(), body);
    }

    #[test]
    fn test_round_trip_small_and_large() {
        for count in [0, 1, 1000, 2500] {
            let original = stations(count);
            let dataset = StationDataset::from_slice(&serde_json::to_vec(&original).unwrap()).unwrap();

            let written = dataset.to_json_bytes().unwrap();
            let reread = StationDataset::from_slice(&written).unwrap();
            assert_eq!(reread, dataset, "round trip failed for {count} records");
            assert_eq!(reread.record_count(), count);

            let decoded: Value = serde_json::from_slice(&written).unwrap();
            assert_eq!(decoded, original);
        }
    }
}
