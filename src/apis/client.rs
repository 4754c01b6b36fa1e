/// Base HTTP client shared by the oracle and backend clients
///
/// One `reqwest::Client` (connection pool) is built per run and cloned into
/// each component; every request carries its component's timeout.
use crate::errors::{KeeperError, KeeperResult};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const JSON: &str = "application/json";

/// Status and raw body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body parses as `null`
    pub fn json(&self) -> KeeperResult<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Short body excerpt for error messages
    pub fn body_excerpt(&self) -> String {
        const MAX: usize = 200;
        if self.body.chars().count() <= MAX {
            self.body.clone()
        } else {
            let cut: String = self.body.chars().take(MAX).collect();
            format!("{}...", cut)
        }
    }
}

/// HTTP client wrapper with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> KeeperResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| KeeperError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Same connection pool, different timeout
    pub fn with_timeout(&self, timeout_secs: u64) -> Self {
        Self {
            client: self.client.clone(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// GET with JSON headers. Non-2xx statuses are returned, not raised.
    pub async fn get_json(&self, url: &str) -> KeeperResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .timeout(self.timeout)
            .send()
            .await?;

        Self::collect(response).await
    }

    /// POST a JSON body. Non-2xx statuses are returned, not raised.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> KeeperResult<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header(ACCEPT, JSON)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await?;

        Self::collect(response).await
    }

    async fn collect(response: reqwest::Response) -> KeeperResult<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.json().unwrap(), Value::Null);

        let err = HttpResponse {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(!err.is_success());
        assert!(err.json().is_err());
    }

    #[test]
    fn test_body_excerpt_truncates() {
        let response = HttpResponse {
            status: 500,
            body: "x".repeat(500),
        };
        let excerpt = response.body_excerpt();
        assert_eq!(excerpt.len(), 203);
        assert!(excerpt.ends_with("..."));
    }
}
