use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Custom deserializer for timestamp that accepts both integers (ms) and RFC3339 strings
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => {
            // Unix timestamp in milliseconds, possibly written as a float
            let ms = match n.as_i64() {
                Some(ms) => ms,
                None => n
                    .as_f64()
                    .map(f64::round)
                    .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
                    .map(|ms| ms as i64)
                    .ok_or_else(|| Error::custom("invalid timestamp"))?,
            };
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| Error::custom("timestamp out of range"))
        }
        Value::String(s) => s
            .parse::<DateTime<Utc>>()
            .map_err(|e| Error::custom(format!("invalid RFC3339 timestamp: {}", e))),
        _ => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Deserializes a string field, treating an empty string as absent
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Stamped {
        #[serde(deserialize_with = "deserialize_timestamp")]
        timestamp: DateTime<Utc>,
        #[serde(default, deserialize_with = "deserialize_non_empty_string")]
        label: Option<String>,
    }

    #[test]
    fn test_timestamp_integer_millis() {
        let parsed: Stamped = serde_json::from_str(r#"{"timestamp": 1762076480016}"#).unwrap();
        let expected = DateTime::from_timestamp_millis(1762076480016).unwrap();
        assert_eq!(parsed.timestamp, expected);
    }

    #[test]
    fn test_timestamp_float_millis() {
        let parsed: Stamped = serde_json::from_str(r#"{"timestamp": 1704153600000.0}"#).unwrap();
        assert_eq!(parsed.timestamp, DateTime::from_timestamp_millis(1704153600000).unwrap());

        let parsed: Stamped = serde_json::from_str(r#"{"timestamp": 1704153600000.6}"#).unwrap();
        assert_eq!(parsed.timestamp, DateTime::from_timestamp_millis(1704153600001).unwrap());

        assert!(serde_json::from_str::<Stamped>(r#"{"timestamp": 1e300}"#).is_err());
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let parsed: Stamped =
            serde_json::from_str(r#"{"timestamp": "2025-11-02T09:41:20.016Z"}"#).unwrap();
        assert_eq!(parsed.timestamp, DateTime::from_timestamp_millis(1762076480016).unwrap());
    }

    #[test]
    fn test_timestamp_wrong_type() {
        let result = serde_json::from_str::<Stamped>(r#"{"timestamp": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_string_is_absent() {
        let parsed: Stamped = serde_json::from_str(r#"{"timestamp": 0, "label": "  "}"#).unwrap();
        assert!(parsed.label.is_none());

        let parsed: Stamped = serde_json::from_str(r#"{"timestamp": 0, "label": "x"}"#).unwrap();
        assert_eq!(parsed.label.as_deref(), Some("x"));
    }
}
