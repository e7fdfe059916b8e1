//! In-memory [`Store`] implementation for unit tests.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Search and filtering are
//! linear scans with the same semantics as the SQLite backend.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::models::{Document, DocumentUpdate, MeetingSummary};

use super::{DocumentFilter, MeetingFilter, MeetingUpdate, Store};

#[derive(Default)]
pub struct MemStore {
    docs: RwLock<Vec<Document>>,
    meetings: RwLock<Vec<MeetingSummary>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_document(&self, doc: &Document) -> Result<()> {
        let mut docs = self.docs.write().unwrap();
        if docs.iter().any(|d| d.doc_id == doc.doc_id) {
            bail!("duplicate doc_id: {}", doc.doc_id);
        }
        docs.push(doc.clone());
        Ok(())
    }

    async fn get_document(&self, doc_id: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.iter().find(|d| d.doc_id == doc_id).cloned())
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        let docs = self.docs.read().unwrap();
        let mut out: Vec<Document> = docs
            .iter()
            .filter(|d| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| &d.category == c)
            })
            .filter(|d| {
                filter
                    .tag
                    .as_ref()
                    .map_or(true, |t| d.tags.iter().any(|dt| dt == t))
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let out: Vec<Document> = out
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok(out)
    }

    async fn search_documents_text(&self, keyword: &str, limit: i64) -> Result<Vec<Document>> {
        let needle = keyword.to_lowercase();
        let docs = self.docs.read().unwrap();
        let out: Vec<Document> = docs
            .iter()
            .filter(|d| {
                d.title.to_lowercase().contains(&needle)
                    || d.content.to_lowercase().contains(&needle)
                    || d.tags.iter().any(|t| t.to_lowercase() == needle)
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(out)
    }

    async fn update_document(&self, doc_id: &str, update: &DocumentUpdate) -> Result<bool> {
        let mut docs = self.docs.write().unwrap();
        match docs.iter_mut().find(|d| d.doc_id == doc_id) {
            Some(doc) => {
                if let Some(title) = &update.title {
                    doc.title = title.clone();
                }
                if let Some(content) = &update.content {
                    doc.content = content.clone();
                }
                if let Some(category) = &update.category {
                    doc.category = category.clone();
                }
                if let Some(tags) = &update.tags {
                    doc.tags = tags.clone();
                }
                if let Some(metadata) = &update.metadata {
                    doc.metadata = metadata.clone();
                }
                doc.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_document(&self, doc_id: &str) -> Result<bool> {
        let mut docs = self.docs.write().unwrap();
        let before = docs.len();
        docs.retain(|d| d.doc_id != doc_id);
        Ok(docs.len() < before)
    }

    async fn insert_meeting(&self, meeting: &MeetingSummary) -> Result<()> {
        let mut meetings = self.meetings.write().unwrap();
        if meetings.iter().any(|m| m.meeting_id == meeting.meeting_id) {
            bail!("duplicate meeting_id: {}", meeting.meeting_id);
        }
        meetings.push(meeting.clone());
        Ok(())
    }

    async fn get_meeting(&self, meeting_id: &str) -> Result<Option<MeetingSummary>> {
        let meetings = self.meetings.read().unwrap();
        Ok(meetings
            .iter()
            .find(|m| m.meeting_id == meeting_id)
            .cloned())
    }

    async fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<MeetingSummary>> {
        let meetings = self.meetings.read().unwrap();
        let mut out: Vec<MeetingSummary> = meetings
            .iter()
            .filter(|m| {
                filter
                    .tag
                    .as_ref()
                    .map_or(true, |t| m.tags.iter().any(|mt| mt == t))
            })
            .filter(|m| {
                filter
                    .participant
                    .as_ref()
                    .map_or(true, |p| m.participants.iter().any(|mp| mp == p))
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out.truncate(filter.limit.max(0) as usize);
        Ok(out)
    }

    async fn recent_meetings(&self, days: i64, limit: i64) -> Result<Vec<MeetingSummary>> {
        let cutoff = Utc::now() - Duration::days(days);
        let meetings = self.meetings.read().unwrap();
        let mut out: Vec<MeetingSummary> = meetings
            .iter()
            .filter(|m| m.date >= cutoff)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out.truncate(limit.max(0) as usize);
        Ok(out)
    }

    async fn update_meeting(&self, meeting_id: &str, update: &MeetingUpdate) -> Result<bool> {
        let mut meetings = self.meetings.write().unwrap();
        match meetings.iter_mut().find(|m| m.meeting_id == meeting_id) {
            Some(meeting) => {
                meeting.transcript = update.transcript.clone();
                meeting.summary = update.summary.clone();
                meeting.key_points = update.key_points.clone();
                meeting.action_items = update.action_items.clone();
                meeting.decisions = update.decisions.clone();
                meeting.tags = update.tags.clone();
                meeting.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<bool> {
        let mut meetings = self.meetings.write().unwrap();
        let before = meetings.len();
        meetings.retain(|m| m.meeting_id != meeting_id);
        Ok(meetings.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(id: &str, tags: &[&str]) -> Document {
        Document {
            doc_id: id.to_string(),
            title: "Untitled".to_string(),
            content: "nothing searchable".to_string(),
            category: "general".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_search_matches_tags_case_insensitively() {
        let store = MemStore::new();
        store
            .insert_document(&doc("d1", &["MongoDB"]))
            .await
            .unwrap();

        // Search keywords arrive lowercased; stored tag case must not
        // matter.
        let found = store.search_documents_text("mongodb", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].doc_id, "d1");

        let missed = store.search_documents_text("postgres", 10).await.unwrap();
        assert!(missed.is_empty());
    }
}
