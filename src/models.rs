//! Core data models for Meetwise.
//!
//! These types represent the documents, meeting summaries, and chat
//! request/response pairs that flow through the retrieval and answer
//! pipeline. They are stored as-is (with list fields encoded as JSON
//! columns) and serialized directly on the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-text document uploaded to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque caller-supplied metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Generate a new document ID in the `DOC-XXXXXXXX` format.
    pub fn new_id() -> String {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        format!("DOC-{}", hex[..8].to_uppercase())
    }
}

/// Partial-field update for a document. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.metadata.is_none()
    }
}

/// An action item extracted from a meeting transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// A summarized meeting: the raw transcript plus everything the
/// answer generator extracted from it. Regenerated wholesale on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub meeting_id: String,
    pub title: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub date: DateTime<Utc>,
    pub duration_minutes: i64,
    pub transcript: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingSummary {
    /// Generate a new meeting ID in the `MTG-YYYYMMDD-HHMMSS` format.
    pub fn new_id(now: DateTime<Utc>) -> String {
        format!("MTG-{}", now.format("%Y%m%d-%H%M%S"))
    }
}

/// A chat request against the stored documents and meetings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatQuery {
    pub question: String,
    /// Restrict context to a specific meeting.
    pub meeting_id: Option<String>,
    /// Restrict context to a specific document.
    pub doc_id: Option<String>,
    /// Requested provider; falls back to the first available one.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Lookback window (days) for relevant meetings.
    pub context_days: Option<i64>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

/// The answer returned for a [`ChatQuery`].
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub provider: String,
    /// Heuristic trust signal in `[0.0, 1.0]`; a UI hint, not a probability.
    pub confidence: f64,
}

/// A pointer to a record that contributed context to an answer.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SourceRef {
    Document {
        doc_id: String,
        title: String,
        category: String,
        content_preview: String,
    },
    Meeting {
        meeting_id: String,
        title: String,
        date: DateTime<Utc>,
        summary_preview: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_update_is_empty() {
        // An all-None body carries nothing to apply and is rejected
        // upstream with a 400.
        assert!(DocumentUpdate::default().is_empty());

        let update = DocumentUpdate {
            content: Some("new".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_id_formats() {
        let doc_id = Document::new_id();
        assert!(doc_id.starts_with("DOC-"));
        assert_eq!(doc_id.len(), 12);

        let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap();
        assert_eq!(MeetingSummary::new_id(now), "MTG-20250601-103000");
    }
}
