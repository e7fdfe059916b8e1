//! Context assembly: formatting scored records into the text block that
//! is injected into the generation prompt.
//!
//! Documents are rendered first, then meetings, with a fixed delimiter
//! line between records. An empty assembly result means "no context" and
//! callers adjust the prompt and confidence accordingly.

use crate::models::{ActionItem, Document, MeetingSummary};
use crate::retrieval::Scored;

/// Delimiter between formatted records and between the document and
/// meeting blocks.
pub const DELIMITER: &str = "\n\n---\n\n";

/// Maximum characters for source previews.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Truncate free text to [`PREVIEW_MAX_CHARS`] characters with an
/// ellipsis marker. Counts characters, not bytes.
pub fn preview(text: &str) -> String {
    truncate_chars(text, PREVIEW_MAX_CHARS)
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Render ranked documents into one context block.
pub fn format_documents(docs: &[Scored<Document>]) -> String {
    let parts: Vec<String> = docs
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let doc = &scored.item;
            format!(
                "Document {}: {}\nCategory: {}\nTags: {}\nContent: {}",
                i + 1,
                doc.title,
                doc.category,
                doc.tags.join(", "),
                doc.content
            )
        })
        .collect();
    parts.join(DELIMITER)
}

/// Render ranked meetings into one context block.
pub fn format_meetings(meetings: &[Scored<MeetingSummary>]) -> String {
    let parts: Vec<String> = meetings
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let m = &scored.item;
            format!(
                "Meeting {}: {}\nDate: {}\nParticipants: {}\nSummary: {}\nKey Points: {}\nAction Items: {}\nDecisions: {}",
                i + 1,
                m.title,
                m.date.format("%Y-%m-%d"),
                m.participants.join(", "),
                m.summary,
                m.key_points.join(", "),
                format_action_items(&m.action_items),
                m.decisions.join(", ")
            )
        })
        .collect();
    parts.join(DELIMITER)
}

fn format_action_items(items: &[ActionItem]) -> String {
    if items.is_empty() {
        return "No action items".to_string();
    }
    let formatted: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "{} (Assigned to: {}, Due: {})",
                item.task,
                item.assignee.as_deref().unwrap_or("Unassigned"),
                item.due_date.as_deref().unwrap_or("No due date")
            )
        })
        .collect();
    formatted.join("; ")
}

/// Join non-empty blocks into the final context string. Returns the
/// empty string when nothing is relevant.
pub fn assemble(blocks: Vec<String>) -> String {
    let non_empty: Vec<String> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
    non_empty.join(DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn scored_doc(title: &str, content: &str) -> Scored<Document> {
        Scored {
            item: Document {
                doc_id: "DOC-TEST0001".to_string(),
                title: title.to_string(),
                content: content.to_string(),
                category: "general".to_string(),
                tags: vec!["alpha".to_string(), "beta".to_string()],
                metadata: serde_json::json!({}),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            score: 1.0,
        }
    }

    fn scored_meeting() -> Scored<MeetingSummary> {
        Scored {
            item: MeetingSummary {
                meeting_id: "MTG-20250101-090000".to_string(),
                title: "Kickoff".to_string(),
                participants: vec!["ana".to_string(), "ben".to_string()],
                date: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
                duration_minutes: 60,
                transcript: String::new(),
                summary: "Scope agreed.".to_string(),
                key_points: vec!["scope".to_string()],
                action_items: vec![ActionItem {
                    task: "Write plan".to_string(),
                    assignee: Some("ana".to_string()),
                    due_date: None,
                }],
                decisions: vec!["ship in Q2".to_string()],
                tags: vec![],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            score: 0.5,
        }
    }

    #[test]
    fn test_assemble_empty_is_empty_string() {
        assert_eq!(assemble(vec![]), "");
        assert_eq!(assemble(vec![String::new(), String::new()]), "");
    }

    #[test]
    fn test_assemble_joins_with_delimiter() {
        let ctx = assemble(vec!["a".to_string(), String::new(), "b".to_string()]);
        assert_eq!(ctx, "a\n\n---\n\nb");
    }

    #[test]
    fn test_document_block_layout() {
        let block = format_documents(&[scored_doc("Guide", "Body text.")]);
        assert!(block.starts_with("Document 1: Guide"));
        assert!(block.contains("Category: general"));
        assert!(block.contains("Tags: alpha, beta"));
        assert!(block.contains("Content: Body text."));
    }

    #[test]
    fn test_meeting_block_layout() {
        let block = format_meetings(&[scored_meeting()]);
        assert!(block.starts_with("Meeting 1: Kickoff"));
        assert!(block.contains("Date: 2025-01-01"));
        assert!(block.contains("Participants: ana, ben"));
        assert!(block.contains("Write plan (Assigned to: ana, Due: No due date)"));
        assert!(block.contains("Decisions: ship in Q2"));
    }

    #[test]
    fn test_no_action_items_placeholder() {
        assert_eq!(format_action_items(&[]), "No action items");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        // 210 multibyte chars must not panic on a byte boundary.
        let long = "é".repeat(210);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
    }
}
