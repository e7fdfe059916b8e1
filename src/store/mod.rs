//! Storage abstraction for Meetwise.
//!
//! The [`Store`] trait defines every persistence operation the chat and
//! CRUD surfaces need, enabling pluggable backends. The shipped backend
//! is SQLite ([`sqlite::SqliteStore`]); [`memory::MemStore`] backs unit
//! tests.
//!
//! ID uniqueness (`doc_id`, `meeting_id`) is enforced by the backend,
//! not the application layer. All writes are single-record operations;
//! there are no cross-record transactions.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Document, DocumentUpdate, MeetingSummary};

/// Filters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Filters for listing meetings.
#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub tag: Option<String>,
    pub participant: Option<String>,
    pub limit: i64,
}

/// Regenerated summary fields written back on meeting update.
/// The whole summary is replaced; there is no diffing.
#[derive(Debug, Clone)]
pub struct MeetingUpdate {
    pub transcript: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<crate::models::ActionItem>,
    pub decisions: Vec<String>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_document(&self, doc: &Document) -> Result<()>;
    async fn get_document(&self, doc_id: &str) -> Result<Option<Document>>;
    /// Recency-sorted listing with optional category/tag filters.
    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>>;
    /// Case-insensitive substring search over title, content, and tags.
    async fn search_documents_text(&self, keyword: &str, limit: i64) -> Result<Vec<Document>>;
    /// Partial-field update; returns false when the document is absent.
    async fn update_document(&self, doc_id: &str, update: &DocumentUpdate) -> Result<bool>;
    async fn delete_document(&self, doc_id: &str) -> Result<bool>;

    async fn insert_meeting(&self, meeting: &MeetingSummary) -> Result<()>;
    async fn get_meeting(&self, meeting_id: &str) -> Result<Option<MeetingSummary>>;
    async fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<MeetingSummary>>;
    /// Meetings from the last `days` days, newest first.
    async fn recent_meetings(&self, days: i64, limit: i64) -> Result<Vec<MeetingSummary>>;
    /// Replace the summary fields wholesale; returns false when absent.
    async fn update_meeting(&self, meeting_id: &str, update: &MeetingUpdate) -> Result<bool>;
    async fn delete_meeting(&self, meeting_id: &str) -> Result<bool>;
}
