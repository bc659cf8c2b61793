//! [`ScrollTransport`] backed by the official Elasticsearch client.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::{ClearScrollParts, Elasticsearch, ScrollParts, SearchParts};
use tracing::debug;

use crate::config::{ClientConfig, EsAuth};
use crate::error::{EsqError, Result};
use crate::query::SearchRequest;

use super::{ClearScrollRequest, ScrollRequest, ScrollTransport, SearchResponse};

/// Scroll transport talking to a single Elasticsearch node.
pub struct ElasticsearchTransport {
    client: Elasticsearch,
    node: String,
}

impl Debug for ElasticsearchTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchTransport")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchTransport {
    /// Builds a transport from configuration. Does not connect.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let url: elasticsearch::http::Url = config
            .node
            .parse()
            .map_err(|e| EsqError::Config(format!("Invalid URL '{}': {}", config.node, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                EsAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                EsAuth::Bearer { token } => builder.auth(Credentials::Bearer(token.clone())),
                EsAuth::ApiKey { id, key } => {
                    builder.auth(Credentials::ApiKey(id.clone(), key.clone()))
                }
            };
        }

        let transport = builder
            .build()
            .map_err(|e| EsqError::Config(format!("Failed to build transport: {}", e)))?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            node: config.node.clone(),
        })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Elasticsearch) -> Self {
        Self {
            client,
            node: String::from("<custom>"),
        }
    }

    /// Returns the configured node URL.
    pub fn node(&self) -> &str {
        &self.node
    }
}

/// Fails with [`EsqError::Status`] unless the response is a 2xx.
async fn ensure_success(response: Response, operation: &'static str) -> Result<Response> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EsqError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

async fn parse_page(response: Response, operation: &'static str) -> Result<SearchResponse> {
    let response = ensure_success(response, operation).await?;
    Ok(response.json::<SearchResponse>().await?)
}

#[async_trait]
impl ScrollTransport for ElasticsearchTransport {
    async fn open_scroll(
        &self,
        indices: &[String],
        keep_alive: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse> {
        let index_refs: Vec<&str> = indices.iter().map(String::as_str).collect();
        let parts = if index_refs.is_empty() {
            SearchParts::None
        } else {
            SearchParts::Index(&index_refs)
        };

        debug!(indices = ?indices, keep_alive = %keep_alive, size = request.size, "Opening scroll");

        let response = self
            .client
            .search(parts)
            .scroll(keep_alive)
            .body(request)
            .send()
            .await?;

        parse_page(response, "search").await
    }

    async fn continue_scroll(&self, request: &ScrollRequest) -> Result<SearchResponse> {
        let response = self
            .client
            .scroll(ScrollParts::None)
            .body(request)
            .send()
            .await?;

        parse_page(response, "scroll").await
    }

    async fn clear_scroll(&self, request: &ClearScrollRequest) -> Result<()> {
        let response = self
            .client
            .clear_scroll(ClearScrollParts::None)
            .body(request)
            .send()
            .await?;

        // 404 means every id had already expired
        if response.status_code().as_u16() == 404 {
            debug!(ids = request.scroll_id.len(), "Scroll ids already released");
            return Ok(());
        }

        ensure_success(response, "clear scroll").await?;
        Ok(())
    }
}
