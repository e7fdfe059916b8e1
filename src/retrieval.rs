//! Keyword extraction and relevance scoring.
//!
//! The retrieval pipeline is deliberately lexical: a question is broken
//! into lowercase word tokens, candidate records are flattened into one
//! lowercase string, and relevance is the fraction of tokens found as
//! substrings of that string. There is no embedding index and no ranking
//! model — scores are only meaningful relative to each other within a
//! single query.
//!
//! Documents and meetings use different tokenizers: the document path
//! drops tokens shorter than 3 characters, the meeting path keeps every
//! token. The two call sites inherited different rules and both are kept.

use crate::models::{Document, MeetingSummary};

/// A candidate record paired with its relevance score in `[0.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct Scored<T> {
    pub item: T,
    pub score: f64,
}

/// Only the first N keywords are used to query the store for candidates.
/// Scoring still uses the full keyword set.
pub const MAX_SEARCH_KEYWORDS: usize = 5;

fn tokenize(question: &str) -> impl Iterator<Item = String> + '_ {
    question
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

/// Keywords for the document path: word tokens of length >= 3.
pub fn document_keywords(question: &str) -> Vec<String> {
    tokenize(question).filter(|t| t.chars().count() >= 3).collect()
}

/// Keywords for the meeting path: every word token, any length.
pub fn meeting_keywords(question: &str) -> Vec<String> {
    tokenize(question).collect()
}

/// Fraction of keywords found as substrings of `text` (already lowercase).
/// Returns 0 when there are no keywords.
pub fn keyword_score(keywords: &[String], text: &str) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let matches = keywords.iter().filter(|k| text.contains(k.as_str())).count();
    matches as f64 / keywords.len() as f64
}

fn document_text(doc: &Document) -> String {
    format!("{} {} {}", doc.title, doc.content, doc.tags.join(" ")).to_lowercase()
}

fn meeting_text(meeting: &MeetingSummary) -> String {
    format!(
        "{} {} {}",
        meeting.title,
        meeting.summary,
        meeting.tags.join(" ")
    )
    .to_lowercase()
}

/// Remove duplicate candidates (the same document can match several
/// keyword searches), keeping the first occurrence of each `doc_id`.
pub fn dedup_documents(docs: Vec<Document>) -> Vec<Document> {
    let mut seen = std::collections::HashSet::new();
    docs.into_iter()
        .filter(|d| seen.insert(d.doc_id.clone()))
        .collect()
}

/// Score and rank documents by keyword overlap.
///
/// All candidates are kept (including zero-score ones), sorted by score
/// descending with a stable sort, and truncated to `max`.
pub fn rank_documents(
    keywords: &[String],
    docs: Vec<Document>,
    max: usize,
) -> Vec<Scored<Document>> {
    let mut scored: Vec<Scored<Document>> = docs
        .into_iter()
        .map(|doc| {
            let score = keyword_score(keywords, &document_text(&doc));
            Scored { item: doc, score }
        })
        .collect();
    sort_and_truncate(&mut scored, max);
    scored
}

/// Score and rank meetings by keyword overlap.
///
/// Unlike the document path, meetings with zero matches are dropped
/// before ranking.
pub fn rank_meetings(
    keywords: &[String],
    meetings: Vec<MeetingSummary>,
    max: usize,
) -> Vec<Scored<MeetingSummary>> {
    let mut scored: Vec<Scored<MeetingSummary>> = meetings
        .into_iter()
        .filter_map(|meeting| {
            let score = keyword_score(keywords, &meeting_text(&meeting));
            (score > 0.0).then_some(Scored {
                item: meeting,
                score,
            })
        })
        .collect();
    sort_and_truncate(&mut scored, max);
    scored
}

fn sort_and_truncate<T>(scored: &mut Vec<Scored<T>>, max: usize) {
    // sort_by is stable: equal scores keep arrival order.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(id: &str, title: &str, content: &str, tags: &[&str]) -> Document {
        Document {
            doc_id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category: "general".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

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

    #[test]
    fn test_document_keywords_drop_short_tokens() {
        let kw = document_keywords("What is MongoDB used for?");
        assert_eq!(kw, vec!["what", "mongodb", "used", "for"]);
    }

    #[test]
    fn test_meeting_keywords_keep_every_token() {
        let kw = meeting_keywords("What is it?");
        assert_eq!(kw, vec!["what", "is", "it"]);
    }

    #[test]
    fn test_score_empty_keywords_is_zero() {
        assert_eq!(keyword_score(&[], "anything at all"), 0.0);
    }

    #[test]
    fn test_score_in_unit_interval() {
        let kw = document_keywords("alpha beta gamma delta");
        let score = keyword_score(&kw, "only alpha appears here");
        assert!(score > 0.0 && score <= 1.0);
        assert!((score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_mongodb_example_ranks_top() {
        // "What is MongoDB used for?" -> keywords include mongodb + used,
        // both present in the first document.
        let kw = document_keywords("What is MongoDB used for?");
        let docs = vec![
            doc(
                "d1",
                "MongoDB Guide",
                "MongoDB is a NoSQL database commonly used for flexible schemas.",
                &["database"],
            ),
            doc("d2", "Team Handbook", "Vacation policy and onboarding.", &[]),
        ];
        let ranked = rank_documents(&kw, docs, 10);
        assert_eq!(ranked[0].item.doc_id, "d1");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_rank_documents_keeps_zero_score_candidates() {
        let kw = document_keywords("kubernetes");
        let docs = vec![doc("d1", "Unrelated", "Nothing relevant here.", &[])];
        let ranked = rank_documents(&kw, docs, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn test_rank_meetings_drops_zero_score() {
        let kw = meeting_keywords("budget");
        let meetings = vec![
            meeting("m1", "Standup", "Daily sync, no decisions."),
            meeting("m2", "Planning", "Budget review for Q3."),
        ];
        let ranked = rank_meetings(&kw, meetings, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.meeting_id, "m2");
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let kw = document_keywords("shared term here");
        let docs = vec![
            doc("first", "shared term here", "", &[]),
            doc("second", "shared term here", "", &[]),
            doc("third", "shared term here", "", &[]),
        ];
        let ranked = rank_documents(&kw, docs, 10);
        let order: Vec<&str> = ranked.iter().map(|s| s.item.doc_id.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_truncation_respects_max() {
        let kw = document_keywords("note");
        let docs: Vec<Document> = (0..15)
            .map(|i| doc(&format!("d{}", i), "note", "note", &[]))
            .collect();
        let ranked = rank_documents(&kw, docs, 10);
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let docs = vec![
            doc("d1", "first copy", "", &[]),
            doc("d2", "other", "", &[]),
            doc("d1", "second copy", "", &[]),
        ];
        let unique = dedup_documents(docs);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "first copy");
    }

    #[test]
    fn test_empty_candidates_yield_empty_result() {
        let kw = document_keywords("anything");
        assert!(rank_documents(&kw, vec![], 10).is_empty());
        let kw = meeting_keywords("anything");
        assert!(rank_meetings(&kw, vec![], 10).is_empty());
    }
}
