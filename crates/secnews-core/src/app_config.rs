use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which upstream endpoint shape is used to retrieve news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Structured search endpoint returning a `results` array.
    Search,
    /// Chat completion whose text content embeds a JSON array of items.
    Chat,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Search => write!(f, "search"),
            FetchMode::Chat => write!(f, "chat"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub perplexity_api_key: String,
    pub slack_webhook_url: String,
    pub max_items: usize,
    pub perplexity_base_url: String,
    pub perplexity_model: String,
    pub fetch_mode: FetchMode,
    pub summarize: bool,
    pub summary_concurrency: usize,
    pub http_timeout_secs: Option<u64>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub cron: String,
    pub trigger_tokens: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("perplexity_api_key", &"[redacted]")
            .field("slack_webhook_url", &"[redacted]")
            .field("max_items", &self.max_items)
            .field("perplexity_base_url", &self.perplexity_base_url)
            .field("perplexity_model", &self.perplexity_model)
            .field("fetch_mode", &self.fetch_mode)
            .field("summarize", &self.summarize)
            .field("summary_concurrency", &self.summary_concurrency)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("cron", &self.cron)
            .field(
                "trigger_tokens",
                &format_args!("[{} redacted]", self.trigger_tokens.len()),
            )
            .finish()
    }
}
