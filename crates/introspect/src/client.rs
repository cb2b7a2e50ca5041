//! HTTP client for the introspection query.

use crate::{IntrospectionError, IntrospectionResponse, IntrospectionSchema, Result, INTROSPECTION_QUERY};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends [`INTROSPECTION_QUERY`] to an endpoint.
///
/// Failed attempts are retried with exponential backoff (1s, 2s, 4s, ...)
/// when the error is [retryable](IntrospectionError::is_retryable).
///
/// ```no_run
/// use graphql_introspect::IntrospectionClient;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = IntrospectionClient::new()
///     .with_header("Authorization", "Bearer my-token")
///     .with_timeout(Duration::from_secs(60))
///     .with_retries(2)
///     .execute("https://api.example.com/graphql")
///     .await?;
/// println!("{} types", schema.types.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IntrospectionClient {
    headers: Vec<(String, String)>,
    timeout: Duration,
    connect_timeout: Duration,
    retries: u32,
}

impl Default for IntrospectionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IntrospectionClient {
    /// 30 second request timeout, 10 second connect timeout, no retries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retries: 0,
        }
    }

    /// Adds a header. A later header with the same name (ignoring case)
    /// replaces an earlier one.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |client, (name, value)| client.with_header(name, value))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Number of attempts after the first.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Runs the introspection query against `url`.
    ///
    /// # Errors
    ///
    /// The last attempt's error once retries are exhausted, or the first
    /// error that is not retryable.
    #[tracing::instrument(skip(self), fields(retries = self.retries))]
    pub async fn execute(&self, url: &str) -> Result<IntrospectionSchema> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| IntrospectionError::Network(format!("failed to create HTTP client: {e}")))?;

        let mut attempt = 0;
        loop {
            match self.execute_once(&client, url).await {
                Ok(schema) => return Ok(schema),
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    let delay = backoff(attempt);
                    attempt += 1;
                    tracing::warn!(attempt, delay_secs = delay.as_secs(), error = %err, "Retrying introspection");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn execute_once(&self, client: &reqwest::Client, url: &str) -> Result<IntrospectionSchema> {
        let body = serde_json::json!({ "query": INTROSPECTION_QUERY });
        let mut request = client.post(url).json(&body);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        tracing::debug!("Sending introspection query");
        let response = request
            .send()
            .await
            .map_err(|e| IntrospectionError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IntrospectionError::Network(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "Received response");

        if !status.is_success() {
            return Err(IntrospectionError::Http(status.as_u16(), text));
        }

        let response: IntrospectionResponse =
            serde_json::from_str(&text).map_err(|e| IntrospectionError::Parse(e.to_string()))?;
        let schema = response.into_schema()?;
        tracing::info!(types = schema.types.len(), "Introspection successful");
        Ok(schema)
    }
}

/// Delay before retry number `attempt + 1`.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1_u64 << attempt.min(16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns the URL and the raw
    /// request the client sent.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/graphql", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return text;
                }
            }
            if n == 0 {
                return text;
            }
        }
    }

    #[test]
    fn test_client_defaults() {
        let client = IntrospectionClient::new();
        assert!(client.headers.is_empty());
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(client.connect_timeout, Duration::from_secs(10));
        assert_eq!(client.retries, 0);
    }

    #[test]
    fn test_headers_replace_case_insensitively() {
        let client = IntrospectionClient::new()
            .with_headers([("Authorization", "Bearer a"), ("X-Api-Key", "k")])
            .with_header("authorization", "Bearer b");

        assert_eq!(
            client.headers,
            vec![
                ("X-Api-Key".to_string(), "k".to_string()),
                ("authorization".to_string(), "Bearer b".to_string()),
            ]
        );
    }

    #[test]
    fn test_backoff() {
        assert_eq!(backoff(0), Duration::from_secs(1));
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_execute_success() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"data": {"__schema": {"queryType": {"name": "Query"}, "mutationType": null,
                "subscriptionType": null, "types": []}}}"#,
        )
        .await;

        let schema = IntrospectionClient::new()
            .with_header("Authorization", "Bearer secret")
            .execute(&url)
            .await
            .unwrap();
        assert_eq!(schema.query_type.unwrap().name, "Query");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /graphql"));
        assert!(request.contains("authorization: bearer secret"));
        assert!(request.contains("introspectionquery"));
    }

    #[tokio::test]
    async fn test_execute_http_error() {
        let (url, server) = serve_once("503 Service Unavailable", r#"{"error": "down"}"#).await;

        let err = IntrospectionClient::new().execute(&url).await.unwrap_err();
        assert!(matches!(err, IntrospectionError::Http(503, ref body) if body.contains("down")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_errors_without_data() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"data": null, "errors": [{"message": "introspection is disabled"}]}"#,
        )
        .await;

        let err = IntrospectionClient::new().execute(&url).await.unwrap_err();
        assert!(matches!(err, IntrospectionError::Invalid(ref m) if m.contains("disabled")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/graphql", listener.local_addr().unwrap());
        drop(listener);

        let err = IntrospectionClient::new().execute(&url).await.unwrap_err();
        assert!(matches!(err, IntrospectionError::Network(_)));
    }
}
