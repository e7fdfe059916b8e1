//! Keyword search over recent meetings.
//!
//! Backs both the `mw search` CLI command and the `GET /search` HTTP
//! endpoint. Unlike the chat retrieval path, this is an all-terms
//! filter: every whitespace-separated term must appear in the meeting's
//! title or summary.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::context;
use crate::db;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// Preview length for search hit summaries.
const HIT_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct MeetingHit {
    pub meeting_id: String,
    pub title: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub summary_preview: String,
}

/// Find recent meetings whose title or summary contains every term of
/// `query` (case-insensitive). At most `candidate_limit` recent
/// meetings are scanned (`retrieval.recent_meetings_limit` in config).
pub async fn search_recent_meetings(
    store: &dyn Store,
    query: &str,
    limit: usize,
    days: i64,
    candidate_limit: i64,
) -> Result<Vec<MeetingHit>> {
    let terms: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let meetings = store.recent_meetings(days, candidate_limit).await?;

    let hits: Vec<MeetingHit> = meetings
        .into_iter()
        .filter(|m| {
            let text = format!("{} {}", m.title, m.summary).to_lowercase();
            terms.iter().all(|t| text.contains(t.as_str()))
        })
        .take(limit)
        .map(|m| MeetingHit {
            meeting_id: m.meeting_id,
            title: m.title,
            date: m.date,
            summary_preview: context::truncate_chars(&m.summary, HIT_PREVIEW_CHARS),
        })
        .collect();

    Ok(hits)
}

/// `mw search` entry point.
pub async fn run_search(config: &Config, query: &str, limit: usize, days: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));

    let hits = search_recent_meetings(
        store.as_ref(),
        query,
        limit,
        days,
        config.retrieval.recent_meetings_limit,
    )
    .await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{}] {} ({})",
            i + 1,
            hit.meeting_id,
            hit.title,
            hit.date.format("%Y-%m-%d")
        );
        println!("    {}", hit.summary_preview.replace('\n', " "));
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeetingSummary;
    use crate::store::memory::MemStore;
    use chrono::Utc;

    fn meeting(id: &str, title: &str, summary: &str) -> MeetingSummary {
        MeetingSummary {
            meeting_id: id.to_string(),
            title: title.to_string(),
            participants: vec![],
            date: Utc::now(),
            duration_minutes: 30,
            transcript: String::new(),
            summary: summary.to_string(),
            key_points: vec![],
            action_items: vec![],
            decisions: vec![],
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_all_terms_must_match() {
        let store = MemStore::new();
        store
            .insert_meeting(&meeting("m1", "Budget Review", "Discussed Q3 budget."))
            .await
            .unwrap();
        store
            .insert_meeting(&meeting("m2", "Standup", "Daily sync."))
            .await
            .unwrap();

        let hits = search_recent_meetings(&store, "budget q3", 10, 30, 50)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].meeting_id, "m1");

        let hits = search_recent_meetings(&store, "budget missing", 10, 30, 50)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let store = MemStore::new();
        store
            .insert_meeting(&meeting("m1", "Anything", "text"))
            .await
            .unwrap();
        let hits = search_recent_meetings(&store, "   ", 10, 30, 50)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_candidate_limit_bounds_the_scan() {
        let store = MemStore::new();
        let mut older = meeting("m1", "Budget Review", "old budget notes");
        older.date = Utc::now() - chrono::Duration::days(5);
        store.insert_meeting(&older).await.unwrap();
        store
            .insert_meeting(&meeting("m2", "Budget Sync", "fresh budget notes"))
            .await
            .unwrap();

        // Candidates are fetched newest-first, so a limit of 1 leaves
        // only the most recent meeting in scope.
        let hits = search_recent_meetings(&store, "budget", 10, 30, 1)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].meeting_id, "m2");
    }

    #[tokio::test]
    async fn test_preview_is_bounded() {
        let store = MemStore::new();
        let long_summary = format!("budget {}", "x".repeat(300));
        store
            .insert_meeting(&meeting("m1", "Review", &long_summary))
            .await
            .unwrap();
        let hits = search_recent_meetings(&store, "budget", 10, 30, 50)
            .await
            .unwrap();
        assert!(hits[0].summary_preview.ends_with("..."));
        assert_eq!(hits[0].summary_preview.chars().count(), 103);
    }
}
