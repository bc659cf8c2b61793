//! Client and scroll configuration.
//!
//! Both structs are plain values passed to constructors; nothing is read from
//! ambient state. Missing fields fall back to the defaults below when
//! deserialized.
//!
//! | Setting | Default |
//! |---------|---------|
//! | `node` | `http://localhost:9200` |
//! | `request_timeout_ms` | 30000 |
//! | `page_size` | 100 |
//! | `scroll_ttl_minutes` | 1 |
//! | `default_leaf` | `match` |
//! | `keep_scrolls` | false |

use serde::{Deserialize, Serialize};

use crate::query::{DEFAULT_PAGE_SIZE, LeafType};

/// Authentication for the Elasticsearch cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EsAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
    /// API key authentication.
    ApiKey {
        /// The API key id.
        id: String,
        /// The API key secret.
        key: String,
    },
}

/// Connection settings for the Elasticsearch transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base endpoint of the cluster (e.g., `http://localhost:9200`).
    #[serde(default = "default_node")]
    pub node: String,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<EsAuth>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_node() -> String {
    "http://localhost:9200".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: default_node(),
            auth: None,
            request_timeout_ms: default_request_timeout_ms(),
            disable_certificate_validation: false,
        }
    }
}

/// Settings for one scroll search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollOptions {
    /// Index names or patterns. Empty searches all indices.
    #[serde(default)]
    pub indices: Vec<String>,

    /// Hits per page (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Scroll keep-alive in minutes (default: 1).
    #[serde(default = "default_scroll_ttl_minutes")]
    pub scroll_ttl_minutes: u32,

    /// Leaf type for single whitespace-free values (default: `match`).
    #[serde(default)]
    pub default_leaf: LeafType,

    /// Leave scroll cursors on the server instead of clearing them.
    #[serde(default)]
    pub keep_scrolls: bool,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_scroll_ttl_minutes() -> u32 {
    1
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            page_size: default_page_size(),
            scroll_ttl_minutes: default_scroll_ttl_minutes(),
            default_leaf: LeafType::default(),
            keep_scrolls: false,
        }
    }
}

impl ScrollOptions {
    /// Sets the target indices.
    pub fn with_indices<I, S>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indices = indices.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the scroll keep-alive in Elasticsearch time units (e.g., `1m`).
    pub fn keep_alive(&self) -> String {
        format!("{}m", self.scroll_ttl_minutes)
    }

    /// Returns the comma-joined index list, or `_all` when none is set.
    pub fn index_expression(&self) -> String {
        if self.indices.is_empty() {
            "_all".to_string()
        } else {
            self.indices.join(",")
        }
    }

    /// Validates the options and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.page_size == 0 {
            errors.push("Page size cannot be 0".to_string());
        }

        if self.scroll_ttl_minutes == 0 {
            errors.push("Scroll time-to-live cannot be 0 minutes".to_string());
        }

        if self.indices.iter().any(|index| index.trim().is_empty()) {
            errors.push("Index names cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
