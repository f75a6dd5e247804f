//! Lenient deserializers for request fields that arrive either as JSON
//! values or as multipart text (`"1500"`, `"2026-03-01"`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Int(n)) => Ok(Some(n as f64)),
        Some(NumberOrText::Float(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Int(n)) => Ok(Some(n)),
        Some(NumberOrText::Float(n)) if n.fract() == 0.0 => Ok(Some(n as i64)),
        Some(NumberOrText::Float(n)) => {
            Err(D::Error::custom(format!("expected an integer, got {n}")))
        }
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got {s:?}"))),
    }
}

pub fn opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_i64(deserializer)?
        .map(|n| i32::try_from(n).map_err(|_| D::Error::custom("integer out of range")))
        .transpose()
}

pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {s:?}"))),
    }
}

pub fn opt_id_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Vec<NumberOrText>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    raw.into_iter()
        .map(|item| match item {
            NumberOrText::Int(n) => Ok(n),
            NumberOrText::Float(n) if n.fract() == 0.0 => Ok(n as i64),
            NumberOrText::Float(n) => Err(D::Error::custom(format!("invalid id: {n}"))),
            NumberOrText::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid id: {s:?}"))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// A list of strings, or a single string from a one-field form post.
pub fn opt_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(s)) if s.trim().is_empty() => Some(Vec::new()),
        Some(OneOrMany::One(s)) => Some(vec![s]),
        Some(OneOrMany::Many(v)) => Some(v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_f64")]
        fees: Option<f64>,
        #[serde(default, deserialize_with = "opt_i64")]
        country: Option<i64>,
        #[serde(default, deserialize_with = "opt_datetime")]
        deadline: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "opt_id_list")]
        courses: Option<Vec<i64>>,
        #[serde(default, deserialize_with = "opt_string_list")]
        tags: Option<Vec<String>>,
    }

    #[test]
    fn test_accepts_text_and_json_numbers() {
        let p: Probe = serde_json::from_value(json!({
            "fees": "1500.5",
            "country": "7",
            "courses": ["1", 2]
        }))
        .unwrap();
        assert_eq!(p.fees, Some(1500.5));
        assert_eq!(p.country, Some(7));
        assert_eq!(p.courses, Some(vec![1, 2]));
        assert!(p.deadline.is_none());
        assert!(p.tags.is_none());

        let p: Probe = serde_json::from_value(json!({ "fees": 20, "country": 3 })).unwrap();
        assert_eq!(p.fees, Some(20.0));
        assert_eq!(p.country, Some(3));
    }

    #[test]
    fn test_dates_in_several_shapes() {
        assert!(parse_datetime("2026-03-01").is_some());
        assert!(parse_datetime("2026-03-01T10:00:00Z").is_some());
        assert!(parse_datetime("2026-03-01T10:00:00").is_some());
        assert!(parse_datetime("01/03/2026").is_none());

        let p: Probe = serde_json::from_value(json!({ "tags": "ielts" })).unwrap();
        assert_eq!(p.tags, Some(vec!["ielts".to_string()]));

        let bad = serde_json::from_value::<Probe>(json!({ "deadline": "tomorrow" }));
        assert!(bad.is_err());
    }
}
