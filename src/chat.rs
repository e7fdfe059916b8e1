//! Chat orchestration: context building, answer generation, and the
//! confidence heuristic.
//!
//! The [`Chatbot`] owns nothing global — it is handed the store and the
//! provider registry at construction and is shared across requests
//! behind an `Arc`. Store failures during context building are logged
//! and degrade to "no context" rather than failing the request;
//! generation failures degrade to an error-text answer with zero
//! confidence. Only provider *selection* failures (no providers at all)
//! propagate as errors, since they are configuration problems the
//! caller should see.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, warn};

use crate::config::RetrievalConfig;
use crate::context;
use crate::models::{ChatQuery, ChatResponse, SourceRef};
use crate::provider::ProviderRegistry;
use crate::retrieval::{
    self, dedup_documents, document_keywords, meeting_keywords, MAX_SEARCH_KEYWORDS,
};
use crate::store::Store;

/// Confidence forced when no context could be assembled.
pub const NO_CONTEXT_CONFIDENCE: f64 = 0.3;

/// Confidence when the answer admits uncertainty.
const UNCERTAIN_CONFIDENCE: f64 = 0.2;

/// How many of each record kind are reported as sources.
const MAX_SOURCES_PER_KIND: usize = 3;
const MAX_SOURCES: usize = 5;

const UNCERTAINTY_PHRASES: &[&str] = &[
    "i don't know",
    "i'm not sure",
    "no information",
    "not mentioned",
    "not specified",
    "not available",
];

/// Heuristic confidence for an answer, in `[0.2, 0.95]`.
///
/// Uncertainty phrases short-circuit to 0.2; otherwise confidence grows
/// with the lexical overlap between question and answer words. This is
/// a UI hint, not a calibrated probability.
pub fn estimate_confidence(answer: &str, question: &str) -> f64 {
    let answer_lower = answer.to_lowercase();
    let question_lower = question.to_lowercase();

    for phrase in UNCERTAINTY_PHRASES {
        if answer_lower.contains(phrase) {
            return UNCERTAIN_CONFIDENCE;
        }
    }

    let question_terms: HashSet<&str> = question_lower.split_whitespace().collect();
    let answer_terms: HashSet<&str> = answer_lower.split_whitespace().collect();

    let term_similarity = if question_terms.is_empty() {
        0.0
    } else {
        question_terms.intersection(&answer_terms).count() as f64 / question_terms.len() as f64
    };

    let confidence = (0.7 + term_similarity * 0.3).min(0.95);
    (confidence * 100.0).round() / 100.0
}

struct ContextBundle {
    context: String,
    sources: Vec<SourceRef>,
}

pub struct Chatbot {
    store: Arc<dyn Store>,
    providers: Arc<ProviderRegistry>,
    retrieval: RetrievalConfig,
}

impl Chatbot {
    pub fn new(
        store: Arc<dyn Store>,
        providers: Arc<ProviderRegistry>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            providers,
            retrieval,
        }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Answer a question against the stored documents and meetings.
    ///
    /// Returns `Err` only for provider-selection (configuration)
    /// failures; store and generation failures degrade to fallback
    /// responses.
    pub async fn ask(&self, query: &ChatQuery) -> Result<ChatResponse> {
        let provider = self.providers.resolve(&query.provider)?;
        let provider_name = provider.name().to_string();

        let bundle = self.build_context(query).await;

        if bundle.context.trim().is_empty() {
            // No context: answer from general knowledge, tell the user,
            // and force a low confidence.
            let prompt = format!(
                "{}\n\nNote: I don't have specific context from your connected data, \
                 so I'm providing a general answer. Please upload documents to the \
                 database for more accurate responses based on your data.",
                query.question
            );
            let answer = match provider.generate(&prompt, "").await {
                Ok(answer) => answer,
                Err(e) => return Ok(self.generation_failure(e, provider_name)),
            };
            return Ok(ChatResponse {
                answer,
                sources: Vec::new(),
                provider: provider_name,
                confidence: NO_CONTEXT_CONFIDENCE,
            });
        }

        let answer = match provider.generate(&query.question, &bundle.context).await {
            Ok(answer) => answer,
            Err(e) => return Ok(self.generation_failure(e, provider_name)),
        };
        let confidence = estimate_confidence(&answer, &query.question);

        Ok(ChatResponse {
            answer,
            sources: bundle.sources,
            provider: provider_name,
            confidence,
        })
    }

    fn generation_failure(&self, e: anyhow::Error, provider: String) -> ChatResponse {
        error!("answer generation failed: {:#}", e);
        ChatResponse {
            answer: format!("Error processing your question: {}", e),
            sources: Vec::new(),
            provider,
            confidence: 0.0,
        }
    }

    /// Assemble the context block and source list for a query.
    ///
    /// A specific `doc_id`/`meeting_id` bypasses search; otherwise
    /// keyword retrieval runs over documents then recent meetings.
    async fn build_context(&self, query: &ChatQuery) -> ContextBundle {
        let mut blocks = Vec::new();
        let mut sources = Vec::new();

        if let Some(doc_id) = &query.doc_id {
            match self.store.get_document(doc_id).await {
                Ok(Some(doc)) => {
                    sources.push(document_source(&doc));
                    blocks.push(context::format_documents(&[retrieval::Scored {
                        item: doc,
                        score: 1.0,
                    }]));
                }
                Ok(None) => {}
                Err(e) => warn!("document lookup failed for {}: {:#}", doc_id, e),
            }
        }

        if let Some(meeting_id) = &query.meeting_id {
            match self.store.get_meeting(meeting_id).await {
                Ok(Some(meeting)) => {
                    sources.push(meeting_source(&meeting));
                    blocks.push(context::format_meetings(&[retrieval::Scored {
                        item: meeting,
                        score: 1.0,
                    }]));
                }
                Ok(None) => {}
                Err(e) => warn!("meeting lookup failed for {}: {:#}", meeting_id, e),
            }
        }

        if query.doc_id.is_none() && query.meeting_id.is_none() {
            let docs = self.relevant_documents(&query.question).await;
            if !docs.is_empty() {
                sources.extend(
                    docs.iter()
                        .take(MAX_SOURCES_PER_KIND)
                        .map(|s| document_source(&s.item)),
                );
                blocks.push(context::format_documents(&docs));
            }

            let meetings = self.relevant_meetings(query).await;
            if !meetings.is_empty() {
                sources.extend(
                    meetings
                        .iter()
                        .take(MAX_SOURCES_PER_KIND)
                        .map(|s| meeting_source(&s.item)),
                );
                blocks.push(context::format_meetings(&meetings));
            }
        }

        sources.truncate(MAX_SOURCES);
        ContextBundle {
            context: context::assemble(blocks),
            sources,
        }
    }

    async fn relevant_documents(
        &self,
        question: &str,
    ) -> Vec<retrieval::Scored<crate::models::Document>> {
        let keywords = document_keywords(question);
        let mut candidates = Vec::new();
        for keyword in keywords.iter().take(MAX_SEARCH_KEYWORDS) {
            match self
                .store
                .search_documents_text(keyword, self.retrieval.keyword_search_limit)
                .await
            {
                Ok(docs) => candidates.extend(docs),
                Err(e) => warn!("document search failed for '{}': {:#}", keyword, e),
            }
        }
        retrieval::rank_documents(
            &keywords,
            dedup_documents(candidates),
            self.retrieval.max_context_documents,
        )
    }

    async fn relevant_meetings(
        &self,
        query: &ChatQuery,
    ) -> Vec<retrieval::Scored<crate::models::MeetingSummary>> {
        let keywords = meeting_keywords(&query.question);
        let days = query.context_days.unwrap_or(self.retrieval.lookback_days);
        let recent = match self
            .store
            .recent_meetings(days, self.retrieval.recent_meetings_limit)
            .await
        {
            Ok(meetings) => meetings,
            Err(e) => {
                warn!("recent meetings lookup failed: {:#}", e);
                Vec::new()
            }
        };
        retrieval::rank_meetings(&keywords, recent, self.retrieval.max_context_meetings)
    }
}

fn document_source(doc: &crate::models::Document) -> SourceRef {
    SourceRef::Document {
        doc_id: doc.doc_id.clone(),
        title: doc.title.clone(),
        category: doc.category.clone(),
        content_preview: context::preview(&doc.content),
    }
}

fn meeting_source(meeting: &crate::models::MeetingSummary) -> SourceRef {
    SourceRef::Meeting {
        meeting_id: meeting.meeting_id.clone(),
        title: meeting.title.clone(),
        date: meeting.date,
        summary_preview: context::preview(&meeting.summary),
    }
}

/// `mw ask` entry point.
pub async fn run_ask(
    config: &crate::config::Config,
    question: &str,
    provider: Option<String>,
    doc_id: Option<String>,
    meeting_id: Option<String>,
    context_days: Option<i64>,
) -> Result<()> {
    let pool = crate::db::connect(config).await?;
    let store: Arc<dyn Store> = Arc::new(crate::store::sqlite::SqliteStore::new(pool));
    let providers = Arc::new(ProviderRegistry::from_env(&config.providers));
    let bot = Chatbot::new(store, providers, config.retrieval.clone());

    let query = ChatQuery {
        question: question.to_string(),
        meeting_id,
        doc_id,
        provider: provider.unwrap_or_else(|| config.providers.default.clone()),
        context_days,
    };

    let resp = bot.ask(&query).await?;

    println!("{}", resp.answer);
    println!();
    println!(
        "[provider: {}, confidence: {:.2}]",
        resp.provider, resp.confidence
    );
    if !resp.sources.is_empty() {
        println!("Sources:");
        for source in &resp.sources {
            match source {
                SourceRef::Document { doc_id, title, .. } => {
                    println!("  - [{}] {}", doc_id, title);
                }
                SourceRef::Meeting {
                    meeting_id,
                    title,
                    date,
                    ..
                } => {
                    println!("  - [{}] {} ({})", meeting_id, title, date.format("%Y-%m-%d"));
                }
            }
        }
    }

    Ok(())
}
