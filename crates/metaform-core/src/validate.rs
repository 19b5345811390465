//! Property value validation
//!
//! A pure function of `(schema, candidate)`. Absent candidates are decided by
//! nullability alone; everything else goes through the rule of the schema's
//! kind. The match over `Constraint` is exhaustive, so a new kind does not
//! compile until it has a rule here.

use crate::error::{Error, Result};
use crate::kind::{Constraint, PropertyKind, ResourceKind};
use crate::property::PropertySchema;
use crate::value::{RawValue, ResourcePayload, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Naive formats accepted for textual date-times, read as UTC
const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Largest magnitude up to which every integer has an exact `f64`
const MAX_EXACT_FLOAT_INTEGER: u64 = 1 << 53;

/// Validate `raw` against `schema`
///
/// Returns `Ok(None)` for an accepted absent value and `Ok(Some(_))` with the
/// normalized value otherwise.
pub fn validate(schema: &PropertySchema, raw: RawValue) -> Result<Option<Value>> {
    if raw.is_null() {
        return if schema.is_nullable() {
            Ok(None)
        } else {
            Err(Error::MissingRequiredValue {
                property: schema.name().to_string(),
            })
        };
    }

    let name = schema.name();
    let kind = schema.kind();
    let value = match schema.constraint() {
        Constraint::Integer => Value::Integer(integer(name, kind, raw)?),
        Constraint::Boolean => Value::Boolean(boolean(name, kind, raw)?),
        Constraint::Float => Value::Float(float(name, kind, raw)?),
        Constraint::DateTime { .. } => Value::DateTime(date_time(name, kind, raw)?),
        Constraint::ShortText { max_len } | Constraint::LongText { max_len } => {
            Value::Text(text(name, kind, *max_len, raw)?)
        }
        Constraint::ValueObject => Value::Json(document(name, kind, raw)?),
        Constraint::SingleOption { allowed } => {
            Value::SingleOption(single_option(name, kind, allowed, raw)?)
        }
        Constraint::MultiOption { allowed } => {
            Value::MultiOption(multi_option(name, kind, allowed, raw)?)
        }
        Constraint::SinglePair { allowed } => {
            let (key, value) = single_pair(name, kind, allowed, raw)?;
            Value::SinglePair { key, value }
        }
        Constraint::MultiPair { allowed } => Value::MultiPair(multi_pair(name, kind, allowed, raw)?),
        Constraint::Resource { category } => {
            Value::Resource(resource(name, kind, *category, raw)?)
        }
    };
    Ok(Some(value))
}

fn wrong_shape(name: &str, kind: PropertyKind, raw: &RawValue) -> Error {
    Error::malformed(name, kind, format!("unexpected {} value", raw.shape()))
}

fn integer(name: &str, kind: PropertyKind, raw: RawValue) -> Result<i64> {
    match raw {
        RawValue::Integer(n) => Ok(n),
        RawValue::Text(s) => s
            .parse::<i64>()
            .map_err(|e| Error::malformed(name, kind, format!("'{}' is not an integer: {}", s, e))),
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn boolean(name: &str, kind: PropertyKind, raw: RawValue) -> Result<bool> {
    match raw {
        RawValue::Boolean(b) => Ok(b),
        RawValue::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        RawValue::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        RawValue::Text(s) => Err(Error::malformed(
            name,
            kind,
            format!("'{}' is not a boolean", s),
        )),
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn float(name: &str, kind: PropertyKind, raw: RawValue) -> Result<f64> {
    let parsed = match raw {
        RawValue::Float(n) => n,
        RawValue::Integer(n) if n.unsigned_abs() <= MAX_EXACT_FLOAT_INTEGER => n as f64,
        RawValue::Integer(n) => {
            return Err(Error::malformed(
                name,
                kind,
                format!("{} cannot be represented exactly as a float", n),
            ))
        }
        RawValue::Text(s) => s
            .parse::<f64>()
            .map_err(|e| Error::malformed(name, kind, format!("'{}' is not a number: {}", s, e)))?,
        other => return Err(wrong_shape(name, kind, &other)),
    };
    if !parsed.is_finite() {
        return Err(Error::malformed(name, kind, "value is not finite"));
    }
    Ok(parsed)
}

fn date_time(name: &str, kind: PropertyKind, raw: RawValue) -> Result<DateTime<Utc>> {
    match raw {
        RawValue::DateTime(ts) => Ok(ts),
        RawValue::Text(s) => parse_date_time(&s)
            .ok_or_else(|| Error::malformed(name, kind, format!("'{}' is not a date-time", s))),
        other => Err(wrong_shape(name, kind, &other)),
    }
}

/// Parse RFC 3339, a naive date-time or a bare date; naive forms are UTC
fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn text(name: &str, kind: PropertyKind, max_len: usize, raw: RawValue) -> Result<String> {
    match raw {
        RawValue::Text(s) => {
            let len = s.chars().count();
            if len > max_len {
                return Err(Error::ValueTooLong {
                    property: name.to_string(),
                    len,
                    max: max_len,
                });
            }
            Ok(s)
        }
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn document(name: &str, kind: PropertyKind, raw: RawValue) -> Result<serde_json::Value> {
    match raw {
        RawValue::Json(doc) => Ok(doc),
        RawValue::Text(s) => serde_json::from_str(&s)
            .map_err(|e| Error::malformed(name, kind, format!("not a well-formed document: {}", e))),
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn ensure_not_empty(name: &str, is_empty: bool) -> Result<()> {
    if is_empty {
        return Err(Error::ConstraintSetEmpty {
            property: name.to_string(),
        });
    }
    Ok(())
}

fn not_allowed(name: &str, value: &str) -> Error {
    Error::ValueNotAllowed {
        property: name.to_string(),
        value: value.to_string(),
    }
}

fn single_option(
    name: &str,
    kind: PropertyKind,
    allowed: &BTreeSet<String>,
    raw: RawValue,
) -> Result<String> {
    ensure_not_empty(name, allowed.is_empty())?;
    match raw {
        RawValue::Text(s) if allowed.contains(&s) => Ok(s),
        RawValue::Text(s) => Err(not_allowed(name, &s)),
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn multi_option(
    name: &str,
    kind: PropertyKind,
    allowed: &BTreeSet<String>,
    raw: RawValue,
) -> Result<BTreeSet<String>> {
    ensure_not_empty(name, allowed.is_empty())?;
    match raw {
        RawValue::Set(set) => match set.iter().find(|item| !allowed.contains(*item)) {
            Some(item) => Err(not_allowed(name, item)),
            None => Ok(set),
        },
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn single_pair(
    name: &str,
    kind: PropertyKind,
    allowed: &BTreeMap<String, String>,
    raw: RawValue,
) -> Result<(String, String)> {
    ensure_not_empty(name, allowed.is_empty())?;
    match raw {
        RawValue::Pair { key, value } if allowed.contains_key(&key) => Ok((key, value)),
        RawValue::Pair { key, .. } => Err(not_allowed(name, &key)),
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn multi_pair(
    name: &str,
    kind: PropertyKind,
    allowed: &BTreeMap<String, String>,
    raw: RawValue,
) -> Result<BTreeMap<String, String>> {
    ensure_not_empty(name, allowed.is_empty())?;
    match raw {
        RawValue::Map(map) => match map.keys().find(|key| !allowed.contains_key(*key)) {
            Some(key) => Err(not_allowed(name, key)),
            None => Ok(map),
        },
        other => Err(wrong_shape(name, kind, &other)),
    }
}

fn resource(
    name: &str,
    kind: PropertyKind,
    category: ResourceKind,
    raw: RawValue,
) -> Result<ResourcePayload> {
    match raw {
        RawValue::Resource(payload) => {
            if !payload.is_empty() && payload.file_name.is_empty() {
                return Err(Error::malformed(
                    name,
                    kind,
                    format!("{} payload has no file name", category),
                ));
            }
            Ok(payload)
        }
        other => Err(wrong_shape(name, kind, &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::kind::DateFormat;
    use chrono::TimeZone;

    fn kind_of(result: Result<Option<Value>>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn test_absent_depends_only_on_nullability() {
        let schemas = vec![
            PropertySchema::integer("a").unwrap(),
            PropertySchema::boolean("b").unwrap(),
            PropertySchema::float("c").unwrap(),
            PropertySchema::date_time("d", DateFormat::Time24Hours).unwrap(),
            PropertySchema::short_text("e").unwrap(),
            PropertySchema::long_text("f", 500).unwrap(),
            PropertySchema::value_object("g").unwrap(),
            PropertySchema::single_option("h", ["x"]).unwrap(),
            PropertySchema::single_option("i", Vec::<String>::new()).unwrap(),
            PropertySchema::multi_option("j", ["x", "y"]).unwrap(),
            PropertySchema::single_pair("k", [("kg", "Kilogram")]).unwrap(),
            PropertySchema::multi_pair("l", [("kg", "Kilogram")]).unwrap(),
            PropertySchema::multi_pair("m", Vec::<(String, String)>::new()).unwrap(),
        ];
        let resources = ResourceKind::ALL
            .iter()
            .map(|category| PropertySchema::resource(category.as_str(), *category).unwrap());

        let mut kinds = BTreeSet::new();
        for schema in schemas.into_iter().chain(resources) {
            kinds.insert(schema.kind().to_string());
            assert_eq!(
                kind_of(schema.validate(RawValue::Null)),
                ErrorKind::MissingRequiredValue,
                "{} must reject an absent value",
                schema.kind()
            );
            let schema = schema.nullable();
            assert_eq!(schema.validate(RawValue::Null).unwrap(), None);
        }
        assert_eq!(kinds.len(), 11 + ResourceKind::ALL.len());
    }

    #[test]
    fn test_integer_strict_parse() {
        let schema = PropertySchema::integer("count").unwrap();
        assert_eq!(
            schema.validate("42".into()).unwrap(),
            Some(Value::Integer(42))
        );
        assert_eq!(
            schema.validate(RawValue::Integer(-7)).unwrap(),
            Some(Value::Integer(-7))
        );
        assert_eq!(kind_of(schema.validate("42abc".into())), ErrorKind::MalformedValue);
        assert_eq!(kind_of(schema.validate(" 42".into())), ErrorKind::MalformedValue);
        assert_eq!(kind_of(schema.validate("4.2".into())), ErrorKind::MalformedValue);
        assert_eq!(kind_of(schema.validate(true.into())), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_boolean_parse() {
        let schema = PropertySchema::boolean("active").unwrap();
        assert_eq!(
            schema.validate("True".into()).unwrap(),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            schema.validate("false".into()).unwrap(),
            Some(Value::Boolean(false))
        );
        assert_eq!(kind_of(schema.validate("yes".into())), ErrorKind::MalformedValue);
        assert_eq!(kind_of(schema.validate("1".into())), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_float_parse() {
        let schema = PropertySchema::float("ratio").unwrap();
        assert_eq!(schema.validate("0.25".into()).unwrap(), Some(Value::Float(0.25)));
        assert_eq!(schema.validate(RawValue::Integer(2)).unwrap(), Some(Value::Float(2.0)));
        assert_eq!(kind_of(schema.validate("0.25x".into())), ErrorKind::MalformedValue);
        assert_eq!(kind_of(schema.validate("NaN".into())), ErrorKind::MalformedValue);
        assert_eq!(
            kind_of(schema.validate(RawValue::Float(f64::INFINITY))),
            ErrorKind::MalformedValue
        );
    }

    #[test]
    fn test_float_from_integer_must_be_exact() {
        let schema = PropertySchema::float("ratio").unwrap();
        let limit = 9_007_199_254_740_992_i64;
        assert_eq!(
            schema.validate(RawValue::Integer(limit)).unwrap(),
            Some(Value::Float(9_007_199_254_740_992.0))
        );
        assert_eq!(
            schema.validate(RawValue::Integer(-limit)).unwrap(),
            Some(Value::Float(-9_007_199_254_740_992.0))
        );
        assert_eq!(
            kind_of(schema.validate(RawValue::Integer(limit + 1))),
            ErrorKind::MalformedValue
        );
        assert_eq!(
            kind_of(schema.validate(RawValue::Integer(-limit - 1))),
            ErrorKind::MalformedValue
        );
        assert_eq!(
            kind_of(schema.validate(RawValue::Integer(i64::MAX))),
            ErrorKind::MalformedValue
        );
    }

    #[test]
    fn test_date_time_parse() {
        let schema = PropertySchema::date_time("due", DateFormat::Time24Hours).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        for text in [
            "2024-05-01T08:30:00Z",
            "2024-05-01T10:30:00+02:00",
            "2024-05-01 08:30:00",
            "2024-05-01T08:30:00",
            "2024-05-01 08:30",
        ] {
            assert_eq!(
                schema.validate(text.into()).unwrap(),
                Some(Value::DateTime(expected)),
                "parsing {}",
                text
            );
        }

        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(
            schema.validate("2024-05-01".into()).unwrap(),
            Some(Value::DateTime(midnight))
        );
        assert_eq!(
            kind_of(schema.validate("2024-05-01 garbage".into())),
            ErrorKind::MalformedValue
        );
        assert_eq!(kind_of(schema.validate("2024-13-01".into())), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_short_text_boundary() {
        let schema = PropertySchema::short_text("code").unwrap();
        let ten = "a".repeat(10);
        assert_eq!(
            schema.validate(ten.clone().into()).unwrap(),
            Some(Value::Text(ten))
        );
        let err = schema.validate("a".repeat(11).into()).unwrap_err();
        assert_eq!(
            err,
            Error::ValueTooLong {
                property: "code".to_string(),
                len: 11,
                max: 10
            }
        );
        assert_eq!(schema.validate("".into()).unwrap(), Some(Value::Text(String::new())));
    }

    #[test]
    fn test_long_text_boundary() {
        let schema = PropertySchema::long_text("notes", 300).unwrap();
        assert!(schema.validate("n".repeat(300).into()).is_ok());
        assert_eq!(
            kind_of(schema.validate("n".repeat(301).into())),
            ErrorKind::ValueTooLong
        );
    }

    #[test]
    fn test_text_length_counts_chars() {
        let schema = PropertySchema::short_text_with_max_len("label", 3).unwrap();
        assert!(schema.validate("泵站甲".into()).is_ok());
        assert_eq!(kind_of(schema.validate("泵站甲乙".into())), ErrorKind::ValueTooLong);
    }

    #[test]
    fn test_value_object() {
        let schema = PropertySchema::value_object("extra").unwrap();
        assert_eq!(
            schema.validate(r#"{"a": [1, 2]}"#.into()).unwrap(),
            Some(Value::Json(serde_json::json!({"a": [1, 2]})))
        );
        assert_eq!(
            schema.validate(serde_json::json!(null).into()).unwrap(),
            Some(Value::Json(serde_json::Value::Null))
        );
        assert_eq!(kind_of(schema.validate("{not json".into())), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_single_option() {
        let schema = PropertySchema::single_option("grade", ["A", "B"]).unwrap();
        assert_eq!(
            schema.validate("A".into()).unwrap(),
            Some(Value::SingleOption("A".to_string()))
        );
        assert_eq!(
            schema.validate("C".into()).unwrap_err(),
            Error::ValueNotAllowed {
                property: "grade".to_string(),
                value: "C".to_string()
            }
        );

        let empty = PropertySchema::single_option("grade", Vec::<String>::new()).unwrap();
        assert_eq!(kind_of(empty.validate("A".into())), ErrorKind::ConstraintSetEmpty);
    }

    #[test]
    fn test_multi_option_rejects_whole_value() {
        let schema = PropertySchema::multi_option("tags", ["A", "B", "C"]).unwrap();
        assert_eq!(
            schema.validate(RawValue::set(["A", "B"])).unwrap(),
            Some(Value::MultiOption(
                ["A", "B"].into_iter().map(String::from).collect()
            ))
        );
        assert_eq!(
            schema.validate(RawValue::set(["A", "D"])).unwrap_err(),
            Error::ValueNotAllowed {
                property: "tags".to_string(),
                value: "D".to_string()
            }
        );
        assert_eq!(kind_of(schema.validate("A".into())), ErrorKind::MalformedValue);

        let empty = PropertySchema::multi_option("tags", Vec::<String>::new()).unwrap();
        assert_eq!(
            kind_of(empty.validate(RawValue::set(["A"]))),
            ErrorKind::ConstraintSetEmpty
        );
    }

    #[test]
    fn test_single_pair() {
        let schema = PropertySchema::single_pair("unit", [("kg", "Kilogram"), ("g", "Gram")]).unwrap();
        assert_eq!(
            schema.validate(RawValue::pair("kg", "Kilogram")).unwrap(),
            Some(Value::SinglePair {
                key: "kg".to_string(),
                value: "Kilogram".to_string()
            })
        );
        assert_eq!(
            kind_of(schema.validate(RawValue::pair("lb", "Pound"))),
            ErrorKind::ValueNotAllowed
        );

        let empty = PropertySchema::single_pair("unit", Vec::<(String, String)>::new()).unwrap();
        assert_eq!(
            kind_of(empty.validate(RawValue::pair("kg", "Kilogram"))),
            ErrorKind::ConstraintSetEmpty
        );
    }

    #[test]
    fn test_multi_pair() {
        let schema =
            PropertySchema::multi_pair("units", [("kg", "Kilogram"), ("g", "Gram")]).unwrap();
        assert!(schema
            .validate(RawValue::map([("kg", "Kilogram"), ("g", "Gram")]))
            .is_ok());
        assert_eq!(
            schema
                .validate(RawValue::map([("kg", "Kilogram"), ("t", "Tonne")]))
                .unwrap_err(),
            Error::ValueNotAllowed {
                property: "units".to_string(),
                value: "t".to_string()
            }
        );
    }

    #[test]
    fn test_resource_payload() {
        let schema = PropertySchema::resource("photo", ResourceKind::Image).unwrap();
        let payload = ResourcePayload::new("front.jpg", vec![0xff, 0xd8]);
        assert_eq!(
            schema.validate(payload.clone().into()).unwrap(),
            Some(Value::Resource(payload))
        );
        assert!(schema.validate(ResourcePayload::empty().into()).is_ok());
        assert_eq!(
            kind_of(schema.validate(ResourcePayload::new("", vec![1]).into())),
            ErrorKind::MalformedValue
        );
        assert_eq!(kind_of(schema.validate("front.jpg".into())), ErrorKind::MalformedValue);
    }
}
