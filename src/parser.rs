//! Interpretation of raw model replies as typed records.
//!
//! The model may wrap its JSON in prose or code fences, so the candidate
//! object is the span from the first `{` to the last `}`. The span is decoded
//! into a generic JSON value first, then validated into the target record.

use crate::model::{RecommendationItem, RecommendationSet, SummaryResult, ITEMS_PER_CATEGORY};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no JSON object found")]
    NoJsonObject,
    #[error("malformed JSON: {0}")]
    Malformed(serde_json::Error),
    #[error("unexpected response shape: {0}")]
    InvalidShape(String),
}

/// Parse a book summary reply.
///
/// Missing keys, wrong types and empty learnings are errors. A learning count
/// outside the requested range is only logged.
pub fn parse_summary(raw: &str) -> Result<SummaryResult, ParseError> {
    let summary: SummaryResult = decode(raw)?;

    if let Some(pos) = summary
        .key_learnings
        .iter()
        .position(|k| k.learning.trim().is_empty())
    {
        return Err(ParseError::InvalidShape(format!(
            "keyLearnings[{pos}].learning is empty"
        )));
    }
    if !summary.has_expected_learnings() {
        log::warn!(
            "model returned {} key learnings, expected 5-7",
            summary.key_learnings.len()
        );
    }

    Ok(summary)
}

/// Parse a learning recommendation reply.
///
/// Missing keys, wrong types and empty titles are errors. Categories that do
/// not hold exactly three items are only logged.
pub fn parse_recommendations(raw: &str) -> Result<RecommendationSet, ParseError> {
    let set: RecommendationSet = decode(raw)?;

    for (label, items) in set.categories() {
        if let Some(pos) = items.iter().position(|i| i.title.trim().is_empty()) {
            return Err(ParseError::InvalidShape(format!(
                "{}[{pos}].title is empty",
                label.to_lowercase()
            )));
        }
        check_count(label, items);
    }

    Ok(set)
}

fn check_count(label: &str, items: &[RecommendationItem]) {
    if items.len() != ITEMS_PER_CATEGORY {
        log::warn!(
            "model returned {} {}, expected {}",
            items.len(),
            label.to_lowercase(),
            ITEMS_PER_CATEGORY
        );
    }
}

/// Locate the outermost `{ ... }` span in the trimmed reply
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let candidate = extract_json_object(raw).ok_or(ParseError::NoJsonObject)?;
    let value: Value = serde_json::from_str(candidate).map_err(ParseError::Malformed)?;
    serde_json::from_value(value).map_err(|e| ParseError::InvalidShape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyLearning;

    #[test]
    fn extracts_summary_from_surrounding_prose() {
        let raw = r#"blah {"author":"A","summary":"S","keyLearnings":[{"learning":"L1","visual":"💡"}]} trailing"#;
        let summary = parse_summary(raw).unwrap();
        assert_eq!(
            summary,
            SummaryResult::new("A".into(), "S".into(), vec![KeyLearning::new("L1", "💡")])
        );
    }

    #[test]
    fn extracts_summary_from_code_fence() {
        let raw = "```json\n{\"author\":\"A\",\"summary\":\"S\",\"keyLearnings\":[]}\n```";
        let summary = parse_summary(raw).unwrap();
        assert_eq!(summary.author, "A");
        assert!(summary.key_learnings.is_empty());
    }

    #[test]
    fn no_braces_is_no_json_object() {
        assert!(matches!(
            parse_summary("I could not find that book."),
            Err(ParseError::NoJsonObject)
        ));
        assert!(matches!(
            parse_recommendations(""),
            Err(ParseError::NoJsonObject)
        ));
        assert!(matches!(
            parse_recommendations("} backwards {"),
            Err(ParseError::NoJsonObject)
        ));
    }

    #[test]
    fn trailing_comma_is_malformed() {
        let raw = r#"{"author":"A","summary":"S","keyLearnings":[],}"#;
        assert!(matches!(parse_summary(raw), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn trailing_comma_in_recommendations_is_malformed() {
        let raw = r#"x {"books":[],"websites":[],"courses":[],} y"#;
        assert!(matches!(
            parse_recommendations(raw),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn missing_key_is_invalid_shape() {
        let raw = r#"{"author":"A","keyLearnings":[]}"#;
        let err = parse_summary(raw).unwrap_err();
        assert!(matches!(err, ParseError::InvalidShape(_)));
        assert!(err.to_string().contains("summary"), "{err}");
    }

    #[test]
    fn wrong_type_is_invalid_shape() {
        let raw = r#"{"books":"none","websites":[],"courses":[]}"#;
        assert!(matches!(
            parse_recommendations(raw),
            Err(ParseError::InvalidShape(_))
        ));
    }

    #[test]
    fn empty_learning_is_invalid_shape() {
        let raw = r#"{"author":"A","summary":"S","keyLearnings":[{"learning":"  ","visual":"x"}]}"#;
        let err = parse_summary(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected response shape: keyLearnings[0].learning is empty"
        );
    }

    #[test]
    fn recommendations_keep_order_and_tolerate_short_lists() {
        let raw = r#"{
            "books": [{"title":"B1","description":"d"},{"title":"B2","description":"d"},{"title":"B3","description":"d"}],
            "websites": [{"title":"W1","description":"d"}],
            "courses": []
        }"#;
        let set = parse_recommendations(raw).unwrap();
        let titles: Vec<_> = set.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["B1", "B2", "B3"]);
        assert_eq!(set.websites.len(), 1);
        assert!(set.courses.is_empty());
    }

    #[test]
    fn empty_title_is_invalid_shape() {
        let raw = r#"{"books":[],"websites":[{"title":"","description":"d"}],"courses":[]}"#;
        let err = parse_recommendations(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected response shape: websites[0].title is empty"
        );
    }

    #[test]
    fn extract_uses_first_open_and_last_close() {
        assert_eq!(
            extract_json_object("  x {\"a\":{\"b\":1}} y } z "),
            Some("{\"a\":{\"b\":1}} y }")
        );
        assert_eq!(extract_json_object("{}"), Some("{}"));
        assert_eq!(extract_json_object("only {"), None);
    }
}
