//! Sample data for local development: `mw seed`.

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::db;
use crate::models::{ActionItem, Document, MeetingSummary};
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

pub async fn run_seed(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    crate::migrate::create_schema(&pool).await?;
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));

    let now = Utc::now();

    let documents = vec![
        Document {
            doc_id: "DOC-SEED0001".to_string(),
            title: "MongoDB Overview".to_string(),
            content: "MongoDB is a NoSQL database used for storing flexible, \
                      schema-less documents. It is commonly used for content \
                      management, catalogs, and event logging."
                .to_string(),
            category: "documentation".to_string(),
            tags: vec!["mongodb".to_string(), "database".to_string()],
            metadata: serde_json::json!({"author": "platform team"}),
            created_at: now,
            updated_at: now,
        },
        Document {
            doc_id: "DOC-SEED0002".to_string(),
            title: "Deployment Runbook".to_string(),
            content: "Deployments run through the staging pipeline. Rollbacks \
                      are triggered from the release dashboard and take about \
                      five minutes."
                .to_string(),
            category: "operations".to_string(),
            tags: vec!["deployment".to_string(), "runbook".to_string()],
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        },
        Document {
            doc_id: "DOC-SEED0003".to_string(),
            title: "Onboarding Checklist".to_string(),
            content: "New hires need laptop setup, repository access, and an \
                      onboarding buddy for the first two weeks."
                .to_string(),
            category: "hr".to_string(),
            tags: vec!["onboarding".to_string()],
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        },
    ];

    let meetings = vec![
        MeetingSummary {
            meeting_id: "MTG-SEED-0001".to_string(),
            title: "Q3 Planning".to_string(),
            participants: vec!["ana@example.com".to_string(), "ben@example.com".to_string()],
            date: now - Duration::days(2),
            duration_minutes: 60,
            transcript: "Ana: Let's review the Q3 budget... Ben: Agreed, and we \
                         should decide on the database migration."
                .to_string(),
            summary: "Reviewed the Q3 budget and agreed to start the MongoDB \
                      migration in August."
                .to_string(),
            key_points: vec![
                "Q3 budget approved".to_string(),
                "Migration scheduled for August".to_string(),
            ],
            action_items: vec![ActionItem {
                task: "Draft migration plan".to_string(),
                assignee: Some("ben".to_string()),
                due_date: Some("2025-08-15".to_string()),
            }],
            decisions: vec!["Start MongoDB migration in August".to_string()],
            tags: vec!["planning".to_string(), "budget".to_string()],
            created_at: now,
            updated_at: now,
        },
        MeetingSummary {
            meeting_id: "MTG-SEED-0002".to_string(),
            title: "Incident Retro".to_string(),
            participants: vec!["ana@example.com".to_string()],
            date: now - Duration::days(7),
            duration_minutes: 30,
            transcript: "Ana: The outage was caused by a bad deployment...".to_string(),
            summary: "Retrospective on last week's outage caused by a bad \
                      deployment. Rollback docs need updating."
                .to_string(),
            key_points: vec!["Outage root cause: bad deployment".to_string()],
            action_items: vec![ActionItem {
                task: "Update rollback runbook".to_string(),
                assignee: Some("ana".to_string()),
                due_date: None,
            }],
            decisions: vec![],
            tags: vec!["incident".to_string()],
            created_at: now,
            updated_at: now,
        },
    ];

    let mut inserted = 0;
    for doc in &documents {
        if store.get_document(&doc.doc_id).await?.is_none() {
            store.insert_document(doc).await?;
            inserted += 1;
        }
    }
    for meeting in &meetings {
        if store.get_meeting(&meeting.meeting_id).await?.is_none() {
            store.insert_meeting(meeting).await?;
            inserted += 1;
        }
    }

    println!(
        "Seeded {} records ({} documents, {} meetings available).",
        inserted,
        documents.len(),
        meetings.len()
    );
    Ok(())
}
