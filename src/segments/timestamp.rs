use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An RFC 3339 timestamp that re-encodes exactly as it was received.
///
/// The source text keeps its offset and fractional digits; the parsed
/// instant is used for time columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    text: String,
}

impl Timestamp {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let instant = DateTime::parse_from_rfc3339(&text)
            .map_err(|err| Error::Decode(format!("invalid RFC 3339 timestamp {}: {}", text, err)))?;
        Ok(Self { instant, text })
    }

    /// The instant with the offset it was written in.
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.instant.with_timezone(&Utc)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            instant: instant.fixed_offset(),
            text: instant.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        }
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.text
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_keeps_source_text() {
        let ts: Timestamp = "2019-09-13T01:00:00+02:00".parse().unwrap();
        assert_eq!(ts.as_str(), "2019-09-13T01:00:00+02:00");
        assert_eq!(ts.to_utc(), Utc.with_ymd_and_hms(2019, 9, 12, 23, 0, 0).unwrap());
        assert_eq!(ts.instant().offset().local_minus_utc(), 7200);

        let ts = Timestamp::parse("2019-09-13T01:00:00.000Z").unwrap();
        assert_eq!(ts.to_string(), "2019-09-13T01:00:00.000Z");
    }

    #[test]
    fn test_rejects_non_rfc3339() {
        assert!(matches!(Timestamp::parse("13 Sep 2019"), Err(Error::Decode(_))));
        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }

    #[test]
    fn test_from_utc() {
        let ts = Timestamp::from(Utc.with_ymd_and_hms(2019, 9, 13, 1, 0, 0).unwrap());
        assert_eq!(ts.as_str(), "2019-09-13T01:00:00Z");
        assert_eq!(serde_json::to_value(&ts).unwrap(), serde_json::json!("2019-09-13T01:00:00Z"));
    }
}
