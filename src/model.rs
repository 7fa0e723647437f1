//! Result records - the structured output returned by the model for each flow.

use serde::{Deserialize, Serialize};

/// Summary of a single book.
///
/// The model is asked for 5 to 7 key learnings; see [`SummaryResult::has_expected_learnings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    /// Author as verified by the model
    pub author: String,
    /// Concise summary paragraph
    pub summary: String,
    /// Actionable learnings, in the order the model gave them
    pub key_learnings: Vec<KeyLearning>,
}

/// One learning point with its glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLearning {
    pub learning: String,
    /// Short visual token, usually a single emoji
    pub visual: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub title: String,
    /// One-sentence description
    pub description: String,
}

/// Curated resources for a topic of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub books: Vec<RecommendationItem>,
    pub websites: Vec<RecommendationItem>,
    pub courses: Vec<RecommendationItem>,
}

/// Number of key learnings requested from the model.
pub const KEY_LEARNINGS_RANGE: std::ops::RangeInclusive<usize> = 5..=7;

/// Number of items requested per recommendation category.
pub const ITEMS_PER_CATEGORY: usize = 3;

impl SummaryResult {
    pub fn new(author: String, summary: String, key_learnings: Vec<KeyLearning>) -> Self {
        Self {
            author,
            summary,
            key_learnings,
        }
    }

    /// Whether the learning count is within the requested range
    pub fn has_expected_learnings(&self) -> bool {
        KEY_LEARNINGS_RANGE.contains(&self.key_learnings.len())
    }
}

impl KeyLearning {
    pub fn new(learning: impl Into<String>, visual: impl Into<String>) -> Self {
        Self {
            learning: learning.into(),
            visual: visual.into(),
        }
    }
}

impl RecommendationItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl RecommendationSet {
    /// Categories with their display labels, in display order
    pub fn categories(&self) -> [(&'static str, &[RecommendationItem]); 3] {
        [
            ("Books", self.books.as_slice()),
            ("Websites", self.websites.as_slice()),
            ("Courses", self.courses.as_slice()),
        ]
    }

    /// Check if no category has any item
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.websites.is_empty() && self.courses.is_empty()
    }
}
