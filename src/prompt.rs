//! Prompt construction for both flows.
//!
//! Each builder returns the prompt text together with a declarative output
//! shape in the schema dialect the Gemini API accepts for constrained decoding.
//! Builders are pure; callers are expected to pass trimmed, non-empty input.

use crate::model::{ITEMS_PER_CATEGORY, KEY_LEARNINGS_RANGE};
use serde_json::{json, Value};

/// How the gateway should shape the model's reply.
///
/// The two strategies are mutually exclusive in the Gemini API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Attach the output shape as a response schema
    Structured,
    /// Ground the answer with web search; the shape travels only in the prompt text
    SearchGrounded,
}

/// A fully built request for the model gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub text: String,
    /// Declarative schema of the expected JSON reply
    pub shape: Value,
    pub mode: RequestMode,
}

/// Build the book summary prompt.
pub fn build_summary_prompt(title: &str, mode: RequestMode) -> Prompt {
    let min = *KEY_LEARNINGS_RANGE.start();
    let max = *KEY_LEARNINGS_RANGE.end();
    let grounding = match mode {
        RequestMode::SearchGrounded => "Using Google Search to ensure factual accuracy, first",
        RequestMode::Structured => "First",
    };

    let text = format!(
        r#"{grounding} verify the correct author of the book titled "{title}". Only once the author is confirmed, write a concise summary of the book and {min}-{max} key actionable learnings. Give every learning exactly one relevant emoji as its visual.

Return the entire response as a single, raw JSON object. Do not use markdown (e.g. ```json) and do not add explanations. The JSON object must have this exact structure:
{{
  "author": "string",
  "summary": "string",
  "keyLearnings": [{{ "learning": "string", "visual": "string" }}]
}}"#
    );

    Prompt {
        text,
        shape: summary_shape(),
        mode,
    }
}

/// Build the learning recommendation prompt. Always uses structured output.
pub fn build_recommendation_prompt(topic: &str) -> Prompt {
    let n = ITEMS_PER_CATEGORY;
    let text = format!(
        r#"Based on an interest in "{topic}", recommend the top {n} books, {n} websites or blogs, and {n} online courses for further learning. Recommend exactly {n} items per category. For each recommendation, provide a title and a brief, one-sentence description."#
    );

    Prompt {
        text,
        shape: recommendations_shape(),
        mode: RequestMode::Structured,
    }
}

fn summary_shape() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "author": {
                "type": "STRING",
                "description": "The verified author of the book."
            },
            "summary": {
                "type": "STRING",
                "description": "A concise summary of the book."
            },
            "keyLearnings": {
                "type": "ARRAY",
                "description": "Key actionable learnings from the book.",
                "minItems": *KEY_LEARNINGS_RANGE.start(),
                "maxItems": *KEY_LEARNINGS_RANGE.end(),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "learning": { "type": "STRING", "description": "One actionable learning." },
                        "visual": { "type": "STRING", "description": "A single emoji illustrating the learning." }
                    },
                    "required": ["learning", "visual"]
                }
            }
        },
        "required": ["author", "summary", "keyLearnings"]
    })
}

fn recommendations_shape() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "books": item_list("A list of recommended books related to the user's interest.", "The title of the book."),
            "websites": item_list("A list of recommended websites, blogs, or online resources.", "The name of the website or resource."),
            "courses": item_list("A list of recommended online courses (e.g., from Coursera, Udemy, etc.).", "The title of the course.")
        },
        "required": ["books", "websites", "courses"]
    })
}

fn item_list(description: &str, title_description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "minItems": ITEMS_PER_CATEGORY,
        "maxItems": ITEMS_PER_CATEGORY,
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING", "description": title_description },
                "description": { "type": "STRING", "description": "A brief, one-sentence description." }
            },
            "required": ["title", "description"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_asks_for_author_check_and_glyphs() {
        let prompt = build_summary_prompt("Sapiens", RequestMode::SearchGrounded);
        assert!(prompt.text.contains(r#""Sapiens""#));
        assert!(prompt.text.contains("verify the correct author"));
        assert!(prompt.text.contains("exactly one relevant emoji"));
        assert!(prompt.text.contains("5-7"));
        assert!(prompt.text.contains("Google Search"));
        assert_eq!(prompt.mode, RequestMode::SearchGrounded);
    }

    #[test]
    fn structured_summary_prompt_skips_search_wording() {
        let prompt = build_summary_prompt("Sapiens", RequestMode::Structured);
        assert!(!prompt.text.contains("Google Search"));
        assert_eq!(prompt.mode, RequestMode::Structured);
    }

    #[test]
    fn summary_shape_requires_all_fields() {
        let prompt = build_summary_prompt("Dune", RequestMode::Structured);
        assert_eq!(
            prompt.shape["required"],
            json!(["author", "summary", "keyLearnings"])
        );
        let learnings = &prompt.shape["properties"]["keyLearnings"];
        assert_eq!(learnings["minItems"], 5);
        assert_eq!(learnings["maxItems"], 7);
        assert_eq!(learnings["items"]["required"], json!(["learning", "visual"]));
    }

    #[test]
    fn recommendation_prompt_is_structured_with_three_per_category() {
        let prompt = build_recommendation_prompt("Quantum Physics");
        assert_eq!(prompt.mode, RequestMode::Structured);
        assert!(prompt.text.contains(r#""Quantum Physics""#));
        assert!(prompt.text.contains("exactly 3 items per category"));
        assert!(prompt.text.contains("one-sentence description"));

        for category in ["books", "websites", "courses"] {
            let list = &prompt.shape["properties"][category];
            assert_eq!(list["minItems"], 3, "{category}");
            assert_eq!(list["maxItems"], 3, "{category}");
            assert_eq!(list["items"]["required"], json!(["title", "description"]));
        }
    }
}
