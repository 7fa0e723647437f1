//! Plain-terminal rendering of flow results for the one-shot commands,
//! plus the plain-text form used when copying a result.

use crate::model::{RecommendationSet, SummaryResult};
use colored::Colorize;
use std::fmt::Write;

/// Print a book summary, headed by the title the user asked for
pub fn print_summary(title: &str, summary: &SummaryResult) {
    println!("=== {} ===\n", title.bold().cyan());
    println!("✍️  {}", summary.author.italic());
    println!("\n📖 Summary:");
    println!("  {}\n", summary.summary);

    println!("💡 Key Learnings:");
    if summary.key_learnings.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for item in &summary.key_learnings {
        println!("  {} {}", item.visual, item.learning);
    }
}

pub fn print_recommendations(topic: &str, set: &RecommendationSet) {
    println!("=== {} ===", topic.bold().cyan());
    for (label, items) in set.categories() {
        println!("\n{}", label.bold());
        if items.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for item in items {
            println!("  • {}", item.title.bold());
            println!("    {}", item.description);
        }
    }
}

/// Summary as plain text, for the clipboard
pub fn summary_text(title: &str, summary: &SummaryResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "by {}\n", summary.author);
    let _ = writeln!(out, "{}\n", summary.summary);
    let _ = writeln!(out, "Key Learnings:");
    for item in &summary.key_learnings {
        let _ = writeln!(out, "{} {}", item.visual, item.learning);
    }
    out
}

/// Recommendations as plain text, for the clipboard
pub fn recommendations_text(topic: &str, set: &RecommendationSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Learning resources for {topic}");
    for (label, items) in set.categories() {
        let _ = writeln!(out, "\n{label}:");
        for item in items {
            let _ = writeln!(out, "- {}: {}", item.title, item.description);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyLearning, RecommendationItem};

    #[test]
    fn summary_text_lists_glyph_then_learning() {
        let summary = SummaryResult::new(
            "Yuval Noah Harari".into(),
            "A history of humankind.".into(),
            vec![
                KeyLearning::new("Shared fictions scale cooperation", "🧠"),
                KeyLearning::new("Agriculture was a trap", "🌾"),
            ],
        );
        let text = summary_text("Sapiens", &summary);
        assert!(text.starts_with("Sapiens\nby Yuval Noah Harari\n"));
        assert!(text.contains("🧠 Shared fictions scale cooperation\n🌾 Agriculture was a trap\n"));
    }

    #[test]
    fn recommendations_text_has_every_category() {
        let set = RecommendationSet {
            books: vec![RecommendationItem::new("QED", "Feynman on light.")],
            websites: vec![],
            courses: vec![RecommendationItem::new("Quantum 101", "Intro course.")],
        };
        let text = recommendations_text("Quantum Physics", &set);
        assert!(text.contains("Books:\n- QED: Feynman on light.\n"));
        assert!(text.contains("Websites:\n"));
        assert!(text.contains("Courses:\n- Quantum 101: Intro course.\n"));
    }
}
