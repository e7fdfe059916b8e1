//! Answer generator abstraction and implementations.
//!
//! Defines the [`Provider`] trait and two concrete backends:
//! - **[`OpenAiProvider`]** — chat completions API, JSON-mode summaries.
//! - **[`GeminiProvider`]** — generateContent API with a context-grounded
//!   prompt template; summaries parsed out of loosely structured text.
//!
//! Providers are constructed once at startup into a [`ProviderRegistry`]
//! and passed to request handlers — there is no ambient global state.
//! A provider only registers when its API key is present, so the
//! registry's contents reflect what can actually serve requests.
//!
//! There is no retry or backoff: a failed generation surfaces to the
//! caller as a generation error. The only timeout is the HTTP client's.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::config::ProvidersConfig;
use crate::models::ActionItem;

/// Structured output of transcript summarization.
#[derive(Debug, Clone, Default)]
pub struct SummaryParts {
    pub summary: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub decisions: Vec<String>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name used for request dispatch (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Generate an answer for `prompt`, optionally grounded in `context`.
    /// An empty context means "answer from general knowledge".
    async fn generate(&self, prompt: &str, context: &str) -> Result<String>;

    /// Summarize a meeting transcript into structured parts.
    async fn generate_summary(&self, transcript: &str) -> Result<SummaryParts>;
}

// ============ OpenAI ============

pub struct OpenAiProvider {
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Fails when `OPENAI_API_KEY` is not set; the key itself is read
    /// again at call time.
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        if api_key("OPENAI_API_KEY").is_none() {
            bail!("OPENAI_API_KEY environment variable not set");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            model: config.openai_model.clone(),
            max_tokens: config.max_tokens,
            client,
        })
    }

    async fn chat(&self, body: serde_json::Value) -> Result<String> {
        let key = api_key("OPENAI_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", key))
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("OpenAI API error {}: {}", status, text);
        }

        let json: serde_json::Value = response.json().await?;
        let content = json
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing content"))?;
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, context: &str) -> Result<String> {
        let full_prompt = format!("Context: {}\n\nQuestion: {}\n\nAnswer:", context, prompt);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a helpful meeting assistant. Answer questions based on the provided meeting context."},
                {"role": "user", "content": full_prompt}
            ],
            "max_tokens": self.max_tokens,
            "temperature": 0.7
        });
        self.chat(body).await
    }

    async fn generate_summary(&self, transcript: &str) -> Result<SummaryParts> {
        let prompt = format!(
            "Analyze this meeting transcript and provide:\n\
             1. A concise summary\n\
             2. Key discussion points (as bullet points)\n\
             3. Action items with assignees and due dates\n\
             4. Decisions made\n\
             5. Relevant tags\n\n\
             Transcript:\n{}\n\n\
             Format the response as a JSON object with these keys: summary, key_points, action_items, decisions, tags",
            transcript
        );
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are an expert meeting summarizer. Extract key information and structure it properly."},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 1500,
            "temperature": 0.3,
            "response_format": {"type": "json_object"}
        });
        let text = self.chat(body).await?;
        let value: serde_json::Value =
            serde_json::from_str(&text).context("OpenAI summary was not valid JSON")?;
        Ok(parse_summary_value(&value))
    }
}

// ============ Gemini ============

pub struct GeminiProvider {
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        if api_key("GEMINI_API_KEY").is_none() {
            bail!("GEMINI_API_KEY environment variable not set");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            model: config.gemini_model.clone(),
            client,
        })
    }

    async fn generate_content(&self, text: &str) -> Result<String> {
        let key = api_key("GEMINI_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY not set"))?;
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, key
        );
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": text}]}],
            "generationConfig": {
                "temperature": 0.3,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": 2048
            }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, text);
        }

        let json: serde_json::Value = response.json().await?;
        let content = json
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response: missing text"))?;
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, context: &str) -> Result<String> {
        let full_prompt = if context.trim().is_empty() {
            format!(
                "You are a helpful assistant. Answer the following question to the best of your knowledge:\n\n\
                 Question: {}\n\n\
                 Provide a clear and helpful answer.",
                prompt
            )
        } else {
            format!(
                "You are an intelligent assistant that answers questions based on provided context from connected documents and data.\n\n\
                 CONTEXT FROM DATABASE:\n{}\n\n\
                 QUESTION: {}\n\n\
                 INSTRUCTIONS:\n\
                 1. Answer the question based SOLELY on the context provided above\n\
                 2. If the context contains relevant information, use it to provide a detailed answer\n\
                 3. If the context doesn't contain enough information to answer the question, say so clearly\n\
                 4. Be accurate and cite specific details from the context when possible\n\
                 5. If asked about something not in the context, politely state that you don't have that information in the connected data\n\n\
                 Provide your answer:",
                context, prompt
            )
        };
        self.generate_content(&full_prompt).await
    }

    async fn generate_summary(&self, transcript: &str) -> Result<SummaryParts> {
        let prompt = format!(
            "Analyze this meeting transcript and extract:\n\
             - Summary\n\
             - Key discussion points\n\
             - Action items with assignees\n\
             - Decisions made\n\
             - Relevant tags\n\n\
             Return the output in JSON format with these keys: summary, key_points, action_items, decisions, tags\n\n\
             Transcript:\n{}",
            transcript
        );
        let text = self.generate_content(&prompt).await?;
        Ok(parse_summary_text(&text))
    }
}

// ============ Summary parsing ============

#[derive(Deserialize)]
struct RawSummary {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    action_items: Vec<serde_json::Value>,
    #[serde(default)]
    decisions: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Build [`SummaryParts`] from a parsed JSON object, tolerating
/// action items emitted as plain strings instead of objects.
pub fn parse_summary_value(value: &serde_json::Value) -> SummaryParts {
    let raw: RawSummary = match serde_json::from_value(value.clone()) {
        Ok(raw) => raw,
        Err(_) => {
            return SummaryParts {
                summary: value.to_string(),
                ..Default::default()
            }
        }
    };
    SummaryParts {
        summary: raw.summary,
        key_points: raw.key_points,
        action_items: raw.action_items.iter().filter_map(coerce_action_item).collect(),
        decisions: raw.decisions,
        tags: raw.tags,
    }
}

fn coerce_action_item(value: &serde_json::Value) -> Option<ActionItem> {
    match value {
        serde_json::Value::String(task) => Some(ActionItem {
            task: task.clone(),
            assignee: None,
            due_date: None,
        }),
        serde_json::Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

/// Parse summary parts from free text by extracting the outermost
/// `{...}` block. Falls back to treating the text itself as the summary
/// (truncated to 500 characters) when no JSON can be recovered.
pub fn parse_summary_text(text: &str) -> SummaryParts {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text[start..=end]) {
                return parse_summary_value(&value);
            }
        }
    }
    SummaryParts {
        summary: crate::context::truncate_chars(text, 500),
        ..Default::default()
    }
}

// ============ Registry ============

fn api_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// The set of providers that initialized successfully at startup.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Build the registry from config and environment. Providers with a
    /// missing key are skipped with a warning, matching the "available
    /// providers" semantics of request dispatch.
    pub fn from_env(config: &ProvidersConfig) -> Self {
        let mut providers: Vec<Box<dyn Provider>> = Vec::new();

        match OpenAiProvider::new(config) {
            Ok(p) => providers.push(Box::new(p)),
            Err(e) => warn!("OpenAI provider unavailable: {}", e),
        }
        match GeminiProvider::new(config) {
            Ok(p) => providers.push(Box::new(p)),
            Err(e) => warn!("Gemini provider unavailable: {}", e),
        }

        if providers.is_empty() {
            warn!(
                "No AI providers available. Set OPENAI_API_KEY or GEMINI_API_KEY to enable chat."
            );
        }

        Self { providers }
    }

    pub fn with_providers(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn available(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve the requested provider: exact name match, falling back to
    /// the first available provider when the requested one is missing.
    /// Errors only when zero providers are configured.
    pub fn resolve(&self, requested: &str) -> Result<&dyn Provider> {
        if let Some(p) = self.providers.iter().find(|p| p.name() == requested) {
            return Ok(p.as_ref());
        }
        match self.providers.first() {
            Some(p) => Ok(p.as_ref()),
            None => bail!(
                "No AI providers available. Set OPENAI_API_KEY or GEMINI_API_KEY."
            ),
        }
    }
}
