//! Codecs for the ad hoc wire encodings used by the services.
//!
//! Each module is meant for `#[serde(with = "...")]` and is symmetric: what it
//! decodes it encodes back in the same shape, so update requests carry the
//! server's own convention.

/// Booleans transported as `0`/`1`.
pub mod bool_as_int {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use serde::Serializer;
    use std::fmt;

    /// Encode `true` as `1` and `false` as `0`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    /// Decode `0`/`1`; genuine JSON booleans are accepted as well.
    ///
    /// # Errors
    ///
    /// Fails on any integer other than 0 or 1 and on non-numeric input.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IntBoolVisitor)
    }

    pub(super) struct IntBoolVisitor;

    impl<'de> Visitor<'de> for IntBoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("0 or 1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
            }
        }
    }
}

/// Optional booleans transported as `0`/`1` or `null`.
pub mod option_bool_as_int {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Encode `Some(b)` as `0`/`1` and `None` as `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_u8(u8::from(*value)),
            None => serializer.serialize_none(),
        }
    }

    /// Decode `0`/`1`/`null`.
    ///
    /// # Errors
    ///
    /// Fails on any integer other than 0 or 1.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::bool_as_int")] bool);

        Option::<Wrapped>::deserialize(deserializer).map(|value| value.map(|Wrapped(b)| b))
    }
}

/// Numbers that may arrive as JSON strings (`"12.5"`) or as JSON numbers.
///
/// Encodes back as a string.
pub mod number_from_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber<T> {
        Number(T),
        String(String),
    }

    /// Encode the number as its decimal string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Decode a number from either representation.
    ///
    /// # Errors
    ///
    /// Fails when the string does not parse as `T`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + Deserialize<'de>,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match StringOrNumber::<T>::deserialize(deserializer)? {
            StringOrNumber::Number(value) => Ok(value),
            StringOrNumber::String(text) => text.trim().parse().map_err(D::Error::custom),
        }
    }
}

/// Timestamps without a zone suffix (`2006-01-02T15:04:05.999999`), read as UTC.
///
/// A trailing `Z` is tolerated on input and never produced on output.
pub mod naive_datetime {
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Output format.
    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub(super) fn parse(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        let trimmed = text.trim_end_matches('Z');
        NaiveDateTime::parse_from_str(trimmed, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
    }

    /// Encode without zone suffix.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    /// Decode with or without a trailing `Z`.
    ///
    /// # Errors
    ///
    /// Fails on any other layout.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(D::Error::custom)
    }

    /// Optional variant; empty strings decode as `None`.
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Encode `Some` without zone suffix and `None` as `null`.
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        #[allow(clippy::ref_option)]
        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Decode `null`, `""` or a timestamp.
        ///
        /// # Errors
        ///
        /// Fails on an unrecognised layout.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(text) if text.is_empty() => Ok(None),
                Some(text) => super::parse(&text).map(Some).map_err(D::Error::custom),
            }
        }
    }
}

/// Date-only values (`2006-01-02`).
pub mod naive_date {
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Wire format.
    pub const FORMAT: &str = "%Y-%m-%d";

    /// Encode as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    /// Decode `YYYY-MM-DD`; a time part, if present, is ignored.
    ///
    /// # Errors
    ///
    /// Fails when the date part does not parse.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let date = text.split('T').next().unwrap_or_default();
        NaiveDate::parse_from_str(date, FORMAT).map_err(D::Error::custom)
    }
}

/// Timestamps sent as Unix seconds by some endpoints and as RFC3339 by others.
///
/// RFC3339 offsets written without a colon (`+0000`) are accepted too. Encodes
/// as RFC3339.
pub mod unix_or_rfc3339 {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(i64),
        Text(String),
    }

    pub(super) fn parse_text(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map(|value| value.with_timezone(&Utc))
    }

    /// Encode as RFC3339 with the precision the value carries.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// Decode Unix seconds or an RFC3339 string.
    ///
    /// # Errors
    ///
    /// Fails on out-of-range seconds and unrecognised layouts.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(seconds) => Utc
                .timestamp_opt(seconds, 0)
                .single()
                .ok_or_else(|| D::Error::custom(format!("timestamp {seconds} out of range"))),
            Raw::Text(text) => parse_text(&text).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Flags {
        #[serde(with = "super::bool_as_int")]
        enabled: bool,
        #[serde(default, with = "super::option_bool_as_int")]
        inherited: Option<bool>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Amount {
        #[serde(with = "super::number_from_string")]
        value: f64,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamps {
        #[serde(with = "super::naive_datetime")]
        at: NaiveDateTime,
        #[serde(default, with = "super::naive_datetime::option")]
        changed: Option<NaiveDateTime>,
        #[serde(with = "super::naive_date")]
        day: NaiveDate,
    }

    #[test]
    fn bool_as_int_round_trip() {
        for sample in [
            Flags { enabled: false, inherited: None },
            Flags { enabled: true, inherited: Some(false) },
            Flags { enabled: true, inherited: Some(true) },
        ] {
            let encoded = serde_json::to_value(&sample).unwrap();
            let decoded: Flags = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, sample);
        }

        let encoded = serde_json::to_value(Flags { enabled: true, inherited: Some(false) }).unwrap();
        assert_eq!(encoded, json!({"enabled": 1, "inherited": 0}));
    }

    #[test]
    fn bool_as_int_rejects_other_integers() {
        let err = serde_json::from_value::<Flags>(json!({"enabled": 2})).unwrap_err();
        assert!(err.to_string().contains("0 or 1"));
    }

    #[test]
    fn bool_as_int_accepts_json_booleans() {
        let flags: Flags = serde_json::from_value(json!({"enabled": true, "inherited": null})).unwrap();
        assert!(flags.enabled);
        assert_eq!(flags.inherited, None);
    }

    #[test]
    fn number_from_string_accepts_both_forms() {
        let a: Amount = serde_json::from_value(json!({"value": "12.5"})).unwrap();
        let b: Amount = serde_json::from_value(json!({"value": 12.5})).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap(), json!({"value": "12.5"}));

        let err = serde_json::from_value::<Amount>(json!({"value": "twelve"}));
        assert!(err.is_err());
    }

    #[test]
    fn naive_times_round_trip() {
        let sample = Stamps {
            at: NaiveDate::from_ymd_opt(2023, 7, 14)
                .unwrap()
                .and_hms_micro_opt(8, 15, 0, 123_456)
                .unwrap(),
            changed: None,
            day: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
        };
        let encoded = serde_json::to_value(&sample).unwrap();
        assert_eq!(encoded["at"], json!("2023-07-14T08:15:00.123456"));
        assert_eq!(encoded["day"], json!("2023-07-01"));
        let decoded: Stamps = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn naive_datetime_tolerates_trailing_z_and_empty() {
        let decoded: Stamps = serde_json::from_value(json!({
            "at": "2023-07-14T08:15:00Z",
            "changed": "",
            "day": "2023-07-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(decoded.at.to_string(), "2023-07-14 08:15:00");
        assert_eq!(decoded.changed, None);
        assert_eq!(decoded.day, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Observed {
        #[serde(with = "super::unix_or_rfc3339")]
        at: DateTime<Utc>,
    }

    #[test]
    fn unix_or_rfc3339_accepts_every_layout() {
        let expected = Observed {
            at: DateTime::parse_from_rfc3339("2017-11-17T08:53:32Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        for raw in [
            json!(1_510_908_812),
            json!("2017-11-17T08:53:32Z"),
            json!("2017-11-17T09:53:32+01:00"),
            json!("2017-11-17T08:53:32+0000"),
        ] {
            let decoded: Observed = serde_json::from_value(json!({"at": raw})).unwrap();
            assert_eq!(decoded, expected);
        }
        assert_eq!(
            serde_json::to_value(&expected).unwrap(),
            json!({"at": "2017-11-17T08:53:32Z"})
        );
    }
}
