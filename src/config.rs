use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum number of documents included in the assembled context.
    #[serde(default = "default_max_context_documents")]
    pub max_context_documents: usize,
    /// Maximum number of meetings included in the assembled context.
    #[serde(default = "default_max_context_meetings")]
    pub max_context_meetings: usize,
    /// Per-keyword limit for the store's text search.
    #[serde(default = "default_keyword_search_limit")]
    pub keyword_search_limit: i64,
    /// Default lookback window (days) when a query does not specify one.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Number of recent meetings fetched as scoring candidates.
    #[serde(default = "default_recent_meetings_limit")]
    pub recent_meetings_limit: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_context_documents: default_max_context_documents(),
            max_context_meetings: default_max_context_meetings(),
            keyword_search_limit: default_keyword_search_limit(),
            lookback_days: default_lookback_days(),
            recent_meetings_limit: default_recent_meetings_limit(),
        }
    }
}

fn default_max_context_documents() -> usize {
    10
}
fn default_max_context_meetings() -> usize {
    10
}
fn default_keyword_search_limit() -> i64 {
    10
}
fn default_lookback_days() -> i64 {
    30
}
fn default_recent_meetings_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    /// Provider used when a request does not name one.
    #[serde(default = "default_provider")]
    pub default: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Completion token cap for answer generation.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default: default_provider(),
            openai_model: default_openai_model(),
            gemini_model: default_gemini_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.max_context_documents == 0 {
        anyhow::bail!("retrieval.max_context_documents must be > 0");
    }
    if config.retrieval.lookback_days < 1 {
        anyhow::bail!("retrieval.lookback_days must be >= 1");
    }

    match config.providers.default.as_str() {
        "openai" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown default provider: '{}'. Must be openai or gemini.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let f = write_config(
            r#"
[db]
path = "/tmp/mw.sqlite"

[server]
bind = "127.0.0.1:8300"
"#,
        );
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.retrieval.max_context_documents, 10);
        assert_eq!(cfg.retrieval.lookback_days, 30);
        assert_eq!(cfg.providers.default, "gemini");
        assert_eq!(cfg.providers.max_tokens, 1000);
    }

    #[test]
    fn test_rejects_unknown_default_provider() {
        let f = write_config(
            r#"
[db]
path = "/tmp/mw.sqlite"

[providers]
default = "claude"

[server]
bind = "127.0.0.1:8300"
"#,
        );
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_rejects_zero_context_documents() {
        let f = write_config(
            r#"
[db]
path = "/tmp/mw.sqlite"

[retrieval]
max_context_documents = 0

[server]
bind = "127.0.0.1:8300"
"#,
        );
        assert!(load_config(f.path()).is_err());
    }
}
