//! Command-line configuration.
//!
//! Every flag can also be set through an environment variable.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ESQ_URL` | http://localhost:9200 | Cluster endpoint |
//! | `ESQ_INDEX` | (all) | Comma-separated indices |
//! | `ESQ_SIZE` | 100 | Hits per page |
//! | `ESQ_SCROLL_MINUTES` | 1 | Scroll keep-alive |
//! | `ESQ_DEFAULT_TYPE` | match | Leaf type for single words |
//! | `ESQ_KEEP_SCROLLS` | false | Skip cursor cleanup |
//! | `ESQ_USERNAME` / `ESQ_PASSWORD` | | Basic auth |
//! | `ESQ_API_KEY_ID` / `ESQ_API_KEY` | | API key auth |
//! | `ESQ_BEARER_TOKEN` | | Bearer auth |
//! | `ESQ_LOG_LEVEL` | warn | Log level |

use clap::{Parser, ValueEnum};

use esq::query::{BoolClauses, ClauseSpec, LeafType};
use esq::{ClientConfig, EsAuth, ScrollOptions};

/// How hits are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One compact JSON document per line.
    Ndjson,
    /// A single pretty-printed JSON array.
    Json,
}

/// Run an Elasticsearch bool query and print every hit.
#[derive(Debug, Clone, Parser)]
#[command(name = "esq")]
#[command(about = "Run a bool query against Elasticsearch and scroll through every hit")]
pub struct CliConfig {
    /// `must` clause as a JSON object, e.g. '{"status":"error"}'. Repeatable.
    #[arg(long, value_name = "JSON")]
    pub must: Vec<ClauseSpec>,

    /// `must_not` clause as a JSON object. Repeatable.
    #[arg(long, value_name = "JSON")]
    pub must_not: Vec<ClauseSpec>,

    /// `should` clause as a JSON object. Repeatable.
    #[arg(long, value_name = "JSON")]
    pub should: Vec<ClauseSpec>,

    /// `filter` clause as a JSON object. Repeatable.
    #[arg(long, value_name = "JSON")]
    pub filter: Vec<ClauseSpec>,

    /// Indices or patterns to search (comma-separated). Empty searches all.
    #[arg(short, long, env = "ESQ_INDEX", value_delimiter = ',')]
    pub index: Vec<String>,

    /// Cluster endpoint.
    #[arg(long, env = "ESQ_URL", default_value = "http://localhost:9200")]
    pub url: String,

    /// Hits per page.
    #[arg(long, env = "ESQ_SIZE", default_value = "100")]
    pub size: usize,

    /// Scroll keep-alive in minutes.
    #[arg(long, env = "ESQ_SCROLL_MINUTES", default_value = "1")]
    pub scroll_minutes: u32,

    /// Leaf query type for single whitespace-free values.
    #[arg(long, env = "ESQ_DEFAULT_TYPE", default_value = "match")]
    pub default_type: LeafType,

    /// Leave scroll cursors on the server instead of clearing them.
    #[arg(long, env = "ESQ_KEEP_SCROLLS", default_value = "false")]
    pub keep_scrolls: bool,

    /// Clear these scroll ids (comma-separated) and exit without searching.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub clear_scrolls: Vec<String>,

    /// Username for basic auth.
    #[arg(long, env = "ESQ_USERNAME")]
    pub username: Option<String>,

    /// Password for basic auth.
    #[arg(long, env = "ESQ_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// API key id.
    #[arg(long, env = "ESQ_API_KEY_ID")]
    pub api_key_id: Option<String>,

    /// API key secret.
    #[arg(long, env = "ESQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token.
    #[arg(long, env = "ESQ_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long, env = "ESQ_TIMEOUT_MS", default_value = "30000")]
    pub timeout_ms: u64,

    /// Skip TLS certificate validation.
    #[arg(long, env = "ESQ_INSECURE", default_value = "false")]
    pub insecure: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "ndjson")]
    pub format: OutputFormat,

    /// Print only each hit's `_source`.
    #[arg(long)]
    pub source_only: bool,

    /// Print the compiled request body and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ESQ_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl CliConfig {
    /// Collects the clause flags.
    pub fn clauses(&self) -> BoolClauses {
        BoolClauses {
            must: self.must.clone(),
            must_not: self.must_not.clone(),
            should: self.should.clone(),
            filter: self.filter.clone(),
        }
    }

    /// Returns the scroll options.
    pub fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            indices: self
                .index
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            page_size: self.size,
            scroll_ttl_minutes: self.scroll_minutes,
            default_leaf: self.default_type,
            keep_scrolls: self.keep_scrolls,
        }
    }

    /// Returns the client configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            node: self.url.clone(),
            auth: self.auth(),
            request_timeout_ms: self.timeout_ms,
            disable_certificate_validation: self.insecure,
        }
    }

    fn auth(&self) -> Option<EsAuth> {
        if let (Some(id), Some(key)) = (&self.api_key_id, &self.api_key) {
            return Some(EsAuth::ApiKey {
                id: id.clone(),
                key: key.clone(),
            });
        }
        if let Some(token) = &self.bearer_token {
            return Some(EsAuth::Bearer {
                token: token.clone(),
            });
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(EsAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self
            .scroll_options()
            .validate()
            .err()
            .unwrap_or_default();

        if self.username.is_some() != self.password.is_some() {
            errors.push("--username and --password must be given together".to_string());
        }

        if self.api_key_id.is_some() != self.api_key.is_some() {
            errors.push("--api-key-id and --api-key must be given together".to_string());
        }

        let auth_methods = [
            self.username.is_some(),
            self.api_key_id.is_some(),
            self.bearer_token.is_some(),
        ];
        if auth_methods.iter().filter(|set| **set).count() > 1 {
            errors.push("Only one authentication method may be used".to_string());
        }

        if self.timeout_ms == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
