use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

static DAY_FIRST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4})$").unwrap());

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parses the date formats found in dealership spreadsheets and forms:
/// `DD-MM-YYYY`, `DD/MM/YYYY`, `YYYY-MM-DD` and RFC 3339 timestamps.
/// Anything else yields `None`.
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = DAY_FIRST_PATTERN.captures(trimmed) {
        let day = caps[1].parse::<u32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let year = caps[3].parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }

    // "2024-03-05T10:00:00" and "2024-03-05 10:00:00" without offsets
    trimmed
        .get(..10)
        .filter(|_| matches!(trimmed.as_bytes().get(10), Some(b'T') | Some(b' ')))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Resolves an English month name or abbreviation (`Feb`, `sept`, `August`)
/// to its number.
pub fn month_from_name(value: &str) -> Option<u32> {
    let wanted = value.trim().trim_end_matches('.').to_ascii_lowercase();
    if wanted.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&wanted))
        .map(|index| index as u32 + 1)
}

/// Serde helper for optional date fields: blank or unparseable input becomes `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_loose_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_first_formats_agree() {
        let dashed = parse_loose_date("05-03-2024");
        let slashed = parse_loose_date("05/03/2024");
        assert_eq!(dashed, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(dashed, slashed);
    }

    #[test]
    fn test_iso_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_loose_date("2024-03-05"), expected);
        assert_eq!(parse_loose_date("2024-03-05T08:30:00.000Z"), expected);
        assert_eq!(parse_loose_date("2024-03-05 08:30:00"), expected);
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_loose_date("next tuesday"), None);
        assert_eq!(parse_loose_date(""), None);
        assert_eq!(parse_loose_date("31-02-2024"), None);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_from_name("Feb"), Some(2));
        assert_eq!(month_from_name("aug"), Some(8));
        assert_eq!(month_from_name("September"), Some(9));
        assert_eq!(month_from_name("Sept."), Some(9));
        assert_eq!(month_from_name("Ma"), None);
        assert_eq!(month_from_name("Foo"), None);
    }

    #[test]
    fn test_deserialize_optional_date() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "deserialize_optional_date")]
            when: Option<NaiveDate>,
        }

        let parsed: Probe = serde_json::from_str(r#"{"when":"05/03/2024"}"#).unwrap();
        assert_eq!(parsed.when, NaiveDate::from_ymd_opt(2024, 3, 5));

        let garbage: Probe = serde_json::from_str(r#"{"when":"soon"}"#).unwrap();
        assert_eq!(garbage.when, None);

        let missing: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.when, None);
    }
}
