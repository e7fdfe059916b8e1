//! SQLite-backed [`Store`] implementation.
//!
//! List-valued fields (tags, participants, key points, action items,
//! decisions) and the opaque metadata map are stored as JSON text
//! columns. Timestamps are unix seconds.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{ActionItem, Document, DocumentUpdate, MeetingSummary};

use super::{DocumentFilter, MeetingFilter, MeetingUpdate, Store};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_ts(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

fn json_vec(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn json_action_items(raw: &str) -> Vec<ActionItem> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn row_to_document(row: &SqliteRow) -> Document {
    let tags: String = row.get("tags");
    let metadata: String = row.get("metadata");
    Document {
        doc_id: row.get("doc_id"),
        title: row.get("title"),
        content: row.get("content"),
        category: row.get("category"),
        tags: json_vec(&tags),
        metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::json!({})),
        created_at: from_ts(row.get("created_at")),
        updated_at: from_ts(row.get("updated_at")),
    }
}

fn row_to_meeting(row: &SqliteRow) -> MeetingSummary {
    let participants: String = row.get("participants");
    let key_points: String = row.get("key_points");
    let action_items: String = row.get("action_items");
    let decisions: String = row.get("decisions");
    let tags: String = row.get("tags");
    MeetingSummary {
        meeting_id: row.get("meeting_id"),
        title: row.get("title"),
        participants: json_vec(&participants),
        date: from_ts(row.get("date")),
        duration_minutes: row.get("duration_minutes"),
        transcript: row.get("transcript"),
        summary: row.get("summary"),
        key_points: json_vec(&key_points),
        action_items: json_action_items(&action_items),
        decisions: json_vec(&decisions),
        tags: json_vec(&tags),
        created_at: from_ts(row.get("created_at")),
        updated_at: from_ts(row.get("updated_at")),
    }
}

/// JSON membership probe: matches the exact quoted string inside a JSON
/// array column (e.g. `"planning"` inside `["planning","q3"]`).
fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_document(&self, doc: &Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (doc_id, title, content, category, tags, metadata, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.doc_id)
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&doc.category)
        .bind(serde_json::to_string(&doc.tags)?)
        .bind(serde_json::to_string(&doc.metadata)?)
        .bind(to_ts(doc.created_at))
        .bind(to_ts(doc.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_document(&self, doc_id: &str) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT * FROM documents WHERE doc_id = ?")
            .bind(doc_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_document))
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        // Both filters go into the WHERE clause so pagination applies
        // to the filtered set, not the other way around.
        let mut sql = String::from("SELECT * FROM documents WHERE 1=1");
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.tag.is_some() {
            sql.push_str(" AND instr(tags, ?) > 0");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(tag) = &filter.tag {
            query = query.bind(quoted(tag));
        }
        let rows = query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn search_documents_text(&self, keyword: &str, limit: i64) -> Result<Vec<Document>> {
        let needle = keyword.to_lowercase();
        let rows = sqlx::query(
            r#"
            SELECT * FROM documents
            WHERE instr(lower(title), ?1) > 0
               OR instr(lower(content), ?1) > 0
               OR instr(lower(tags), ?2) > 0
            ORDER BY created_at DESC
            LIMIT ?3
            "#,
        )
        .bind(&needle)
        .bind(quoted(&needle))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn update_document(&self, doc_id: &str, update: &DocumentUpdate) -> Result<bool> {
        // Read-merge-write: partial updates replace only the provided
        // fields and always bump updated_at.
        let existing = match self.get_document(doc_id).await? {
            Some(doc) => doc,
            None => return Ok(false),
        };

        let title = update.title.clone().unwrap_or(existing.title);
        let content = update.content.clone().unwrap_or(existing.content);
        let category = update.category.clone().unwrap_or(existing.category);
        let tags = update.tags.clone().unwrap_or(existing.tags);
        let metadata = update.metadata.clone().unwrap_or(existing.metadata);

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET title = ?, content = ?, category = ?, tags = ?, metadata = ?, updated_at = ?
            WHERE doc_id = ?
            "#,
        )
        .bind(&title)
        .bind(&content)
        .bind(&category)
        .bind(serde_json::to_string(&tags)?)
        .bind(serde_json::to_string(&metadata)?)
        .bind(to_ts(Utc::now()))
        .bind(doc_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_document(&self, doc_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_meeting(&self, meeting: &MeetingSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meetings (meeting_id, title, participants, date, duration_minutes,
                                  transcript, summary, key_points, action_items, decisions,
                                  tags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&meeting.meeting_id)
        .bind(&meeting.title)
        .bind(serde_json::to_string(&meeting.participants)?)
        .bind(to_ts(meeting.date))
        .bind(meeting.duration_minutes)
        .bind(&meeting.transcript)
        .bind(&meeting.summary)
        .bind(serde_json::to_string(&meeting.key_points)?)
        .bind(serde_json::to_string(&meeting.action_items)?)
        .bind(serde_json::to_string(&meeting.decisions)?)
        .bind(serde_json::to_string(&meeting.tags)?)
        .bind(to_ts(meeting.created_at))
        .bind(to_ts(meeting.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_meeting(&self, meeting_id: &str) -> Result<Option<MeetingSummary>> {
        let row = sqlx::query("SELECT * FROM meetings WHERE meeting_id = ?")
            .bind(meeting_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_meeting))
    }

    async fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<MeetingSummary>> {
        let rows = sqlx::query("SELECT * FROM meetings ORDER BY date DESC")
            .fetch_all(&self.pool)
            .await?;
        let mut meetings: Vec<MeetingSummary> = rows.iter().map(row_to_meeting).collect();
        if let Some(tag) = &filter.tag {
            meetings.retain(|m| m.tags.iter().any(|t| t == tag));
        }
        if let Some(participant) = &filter.participant {
            meetings.retain(|m| m.participants.iter().any(|p| p == participant));
        }
        meetings.truncate(filter.limit.max(0) as usize);
        Ok(meetings)
    }

    async fn recent_meetings(&self, days: i64, limit: i64) -> Result<Vec<MeetingSummary>> {
        let cutoff = Utc::now() - Duration::days(days);
        let rows = sqlx::query(
            "SELECT * FROM meetings WHERE date >= ? ORDER BY date DESC LIMIT ?",
        )
        .bind(to_ts(cutoff))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_meeting).collect())
    }

    async fn update_meeting(&self, meeting_id: &str, update: &MeetingUpdate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE meetings
            SET transcript = ?, summary = ?, key_points = ?, action_items = ?,
                decisions = ?, tags = ?, updated_at = ?
            WHERE meeting_id = ?
            "#,
        )
        .bind(&update.transcript)
        .bind(&update.summary)
        .bind(serde_json::to_string(&update.key_points)?)
        .bind(serde_json::to_string(&update.action_items)?)
        .bind(serde_json::to_string(&update.decisions)?)
        .bind(serde_json::to_string(&update.tags)?)
        .bind(to_ts(Utc::now()))
        .bind(meeting_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meetings WHERE meeting_id = ?")
            .bind(meeting_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate::create_schema(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    fn doc(id: &str, tags: &[&str], age_secs: i64) -> Document {
        let created = Utc::now() - Duration::seconds(age_secs);
        Document {
            doc_id: id.to_string(),
            title: format!("Title {}", id),
            content: "content".to_string(),
            category: "general".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: serde_json::json!({}),
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn test_list_tag_filter_applies_before_pagination() {
        let store = test_store().await;
        // Two newer untagged docs ahead of the tagged one: the tag
        // filter must not be starved by LIMIT.
        store.insert_document(&doc("d1", &[], 0)).await.unwrap();
        store.insert_document(&doc("d2", &[], 10)).await.unwrap();
        store
            .insert_document(&doc("d3", &["runbook"], 20))
            .await
            .unwrap();

        let filter = DocumentFilter {
            category: None,
            tag: Some("runbook".to_string()),
            limit: 2,
            offset: 0,
        };
        let docs = store.list_documents(&filter).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].doc_id, "d3");
    }

    #[tokio::test]
    async fn test_list_combines_category_and_tag_filters() {
        let store = test_store().await;
        let mut tagged = doc("d1", &["ops"], 0);
        tagged.category = "operations".to_string();
        store.insert_document(&tagged).await.unwrap();
        store.insert_document(&doc("d2", &["ops"], 10)).await.unwrap();

        let filter = DocumentFilter {
            category: Some("operations".to_string()),
            tag: Some("ops".to_string()),
            limit: 50,
            offset: 0,
        };
        let docs = store.list_documents(&filter).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].doc_id, "d1");
    }

    #[tokio::test]
    async fn test_update_document_merges_partial_fields() {
        let store = test_store().await;
        store
            .insert_document(&doc("d1", &["keep"], 0))
            .await
            .unwrap();

        let update = DocumentUpdate {
            content: Some("new content".to_string()),
            ..Default::default()
        };
        let updated = store.update_document("d1", &update).await.unwrap();
        assert!(updated);

        let fetched = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(fetched.content, "new content");
        // Untouched fields survive the merge.
        assert_eq!(fetched.title, "Title d1");
        assert_eq!(fetched.category, "general");
        assert_eq!(fetched.tags, vec!["keep"]);
    }

    #[tokio::test]
    async fn test_update_missing_document_returns_false() {
        let store = test_store().await;
        let update = DocumentUpdate {
            title: Some("anything".to_string()),
            ..Default::default()
        };
        assert!(!store.update_document("DOC-NOPE", &update).await.unwrap());
    }
}
