//! A minimal HTTP/1.1 node standing in for an Elasticsearch cluster.
//!
//! [`FakeNode`] answers each request with the next scripted reply and records
//! method, path, query string and JSON body.

use std::collections::VecDeque;
use std::sync::Arc;

use elasticsearch::Elasticsearch;
use elasticsearch::http::Url;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use esq::ElasticsearchTransport;

/// A request received by the fake node.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Value,
}

impl RecordedRequest {
    /// Returns the value of query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

type Replies = Arc<Mutex<VecDeque<(u16, Value)>>>;
type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

pub struct FakeNode {
    url: String,
    requests: Requests,
    server: JoinHandle<()>,
}

impl FakeNode {
    /// Binds to an ephemeral port and serves `replies` in order.
    pub async fn start(replies: impl IntoIterator<Item = (u16, Value)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let replies: Replies = Arc::new(Mutex::new(replies.into_iter().collect()));
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));

        let server = {
            let requests = requests.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, replies.clone(), requests.clone()));
                }
            })
        };

        Self {
            url,
            requests,
            server,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// A transport pointed at this node, bypassing any system proxy.
    pub fn transport(&self) -> ElasticsearchTransport {
        let url = Url::parse(&self.url).unwrap();
        let transport = TransportBuilder::new(SingleNodeConnectionPool::new(url))
            .disable_proxy()
            .build()
            .unwrap();
        ElasticsearchTransport::from_client(Elasticsearch::new(transport))
    }
}

impl Drop for FakeNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Serves requests on one keep-alive connection until the client hangs up.
async fn serve(stream: TcpStream, replies: Replies, requests: Requests) {
    let mut reader = BufReader::new(stream);

    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
            return;
        }
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let target = parts.next().unwrap_or_default().to_string();

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await.unwrap_or(0) == 0 {
                return;
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }

        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (target.clone(), String::new()),
        };
        requests.lock().push(RecordedRequest {
            method,
            path: path.replace("%2C", ","),
            query,
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });

        let (status, reply) = replies
            .lock()
            .pop_front()
            .unwrap_or((500, json!({ "error": "no scripted reply" })));
        let payload = reply.to_string();
        let head = format!(
            "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nx-elastic-product: Elasticsearch\r\n\r\n",
            status,
            reason(status),
            payload.len()
        );

        let stream = reader.get_mut();
        if stream.write_all(head.as_bytes()).await.is_err()
            || stream.write_all(payload.as_bytes()).await.is_err()
        {
            return;
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// A search or scroll response body with `count` hits.
pub fn page_body(scroll_id: &str, count: usize) -> Value {
    let hits: Vec<Value> = (0..count)
        .map(|i| json!({ "_id": format!("{}-{}", scroll_id, i), "_source": { "n": i } }))
        .collect();
    json!({
        "_scroll_id": scroll_id,
        "took": 1,
        "timed_out": false,
        "hits": { "total": { "value": count, "relation": "eq" }, "hits": hits }
    })
}
