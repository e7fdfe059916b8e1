//! Transcript summarization: turn a raw transcript into a stored
//! [`MeetingSummary`] via the configured answer generator.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::MeetingSummary;
use crate::provider::Provider;
use crate::store::{MeetingUpdate, Store};

/// Caller-supplied metadata attached to an uploaded transcript.
#[derive(Debug, Clone)]
pub struct MeetingMeta {
    pub title: String,
    pub participants: Vec<String>,
    pub duration_minutes: i64,
    pub date: DateTime<Utc>,
}

impl Default for MeetingMeta {
    fn default() -> Self {
        Self {
            title: "Untitled Meeting".to_string(),
            participants: Vec::new(),
            duration_minutes: 60,
            date: Utc::now(),
        }
    }
}

/// Summarize a transcript and store the resulting meeting record.
pub async fn generate_and_store(
    store: &dyn Store,
    provider: &dyn Provider,
    transcript: &str,
    meta: MeetingMeta,
) -> Result<MeetingSummary> {
    info!("generating meeting summary via {}", provider.name());
    let parts = provider
        .generate_summary(transcript)
        .await
        .context("summary generation failed")?;

    let now = Utc::now();
    let meeting = MeetingSummary {
        meeting_id: MeetingSummary::new_id(now),
        title: meta.title,
        participants: meta.participants,
        date: meta.date,
        duration_minutes: meta.duration_minutes,
        transcript: transcript.to_string(),
        summary: parts.summary,
        key_points: parts.key_points,
        action_items: parts.action_items,
        decisions: parts.decisions,
        tags: parts.tags,
        created_at: now,
        updated_at: now,
    };

    store.insert_meeting(&meeting).await?;
    info!("stored meeting {}", meeting.meeting_id);
    Ok(meeting)
}

/// Re-summarize a transcript and replace the stored summary wholesale.
/// Returns false when the meeting does not exist.
pub async fn regenerate(
    store: &dyn Store,
    provider: &dyn Provider,
    meeting_id: &str,
    transcript: &str,
) -> Result<bool> {
    let parts = provider
        .generate_summary(transcript)
        .await
        .context("summary regeneration failed")?;

    let update = MeetingUpdate {
        transcript: transcript.to_string(),
        summary: parts.summary,
        key_points: parts.key_points,
        action_items: parts.action_items,
        decisions: parts.decisions,
        tags: parts.tags,
    };
    store.update_meeting(meeting_id, &update).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::StubProvider;
    use crate::store::memory::MemStore;

    #[tokio::test]
    async fn test_generate_and_store_creates_meeting() {
        let store = MemStore::new();
        let provider = StubProvider {
            name: "gemini",
            answer: String::new(),
        };

        let meeting = generate_and_store(
            &store,
            &provider,
            "we talked about things",
            MeetingMeta::default(),
        )
        .await
        .unwrap();

        assert!(meeting.meeting_id.starts_with("MTG-"));
        assert_eq!(meeting.summary, "Stub summary");
        assert_eq!(meeting.transcript, "we talked about things");

        let fetched = store.get_meeting(&meeting.meeting_id).await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_regenerate_missing_meeting_returns_false() {
        let store = MemStore::new();
        let provider = StubProvider {
            name: "gemini",
            answer: String::new(),
        };
        let updated = regenerate(&store, &provider, "MTG-NOPE", "new transcript")
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_summary_wholesale() {
        let store = MemStore::new();
        let provider = StubProvider {
            name: "gemini",
            answer: String::new(),
        };
        let meeting = generate_and_store(&store, &provider, "first", MeetingMeta::default())
            .await
            .unwrap();

        let updated = regenerate(&store, &provider, &meeting.meeting_id, "second")
            .await
            .unwrap();
        assert!(updated);

        let fetched = store
            .get_meeting(&meeting.meeting_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.transcript, "second");
    }
}
