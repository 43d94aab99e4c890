use crate::date::error::DateError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub mod error;

/// A due date as callers supply it: either a Unix timestamp or an RFC 3339
/// string, depending on the call path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DueDateInput {
    Timestamp(i64),
    Text(String),
}

pub fn parse_due_date(input: &DueDateInput) -> Result<DateTime<Utc>, DateError> {
    match input {
        DueDateInput::Timestamp(secs) => DateTime::<Utc>::from_timestamp(*secs, 0).ok_or(DateError::Overflow),
        DueDateInput::Text(text) => Ok(DateTime::parse_from_rfc3339(text)?.to_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_parse(input: DueDateInput, expected: &str) {
        let expected = DateTime::parse_from_rfc3339(expected).unwrap().to_utc();
        assert_eq!(parse_due_date(&input).unwrap(), expected);
    }

    #[test]
    fn test_parse_due_date() {
        check_parse(DueDateInput::Timestamp(1_700_000_000), "2023-11-14T22:13:20Z");
        check_parse(
            DueDateInput::Text("2023-11-03T12:00:00Z".to_owned()),
            "2023-11-03T12:00:00Z",
        );
        check_parse(
            DueDateInput::Text("2023-11-03T12:00:00+02:00".to_owned()),
            "2023-11-03T10:00:00Z",
        );
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        parse_due_date(&DueDateInput::Text("next tuesday".to_owned())).unwrap_err();
    }

    #[test]
    fn test_untagged_deserialization() {
        let ts: DueDateInput = serde_json::from_str("1700000000").unwrap();
        assert_eq!(ts, DueDateInput::Timestamp(1_700_000_000));
        let text: DueDateInput = serde_json::from_str("\"2023-11-03T12:00:00Z\"").unwrap();
        assert_eq!(text, DueDateInput::Text("2023-11-03T12:00:00Z".to_owned()));
    }
}
