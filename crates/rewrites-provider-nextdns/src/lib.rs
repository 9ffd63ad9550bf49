// # NextDNS Rewrites Client
//
// `RewritesApi` implementation against the NextDNS REST API.
//
// ## Behavior
//
// - One HTTP request per trait method, full error propagation to the engine
// - HTTP timeout configured (30 seconds)
// - Specific error handling per HTTP status (401/403, 404, 429, 5xx)
// - NO retry or backoff (the run is one-shot and fail-fast)
// - NO caching (remote state is re-fetched every run)
//
// ## Security Requirements
//
// - The API key NEVER appears in logs or Debug output
// - The API key is provided via environment variable only (by the caller)
// - The client fails fast on an empty key
//
// ## API Reference
//
// - NextDNS API: https://nextdns.github.io/api/
// - List profiles: GET `/profiles`
// - List rewrites: GET `/profiles/:profile/rewrites`
// - Create rewrite: POST `/profiles/:profile/rewrites`
// - Delete rewrite: DELETE `/profiles/:profile/rewrites/:id`
//
// Responses wrap their payload in a `data` envelope. A successful DELETE
// answers `204 No Content` with an empty body; the client compares the
// structured status code, never the error-message text.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use rewrites_core::config::RewriteSpec;
use rewrites_core::traits::{Profile, Rewrite, RewritesApi};
use rewrites_core::{Error, Result};

/// NextDNS API base URL
const NEXTDNS_API_BASE: &str = "https://api.nextdns.io";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Payload envelope used by every NextDNS JSON response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// NextDNS rewrites API client
///
/// One authenticated `reqwest::Client` is built at construction and reused
/// for every call in the run.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct NextDnsClient {
    /// NextDNS API key, sent as the `X-Api-Key` header
    api_key: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for NextDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextDnsClient")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NextDnsClient {
    /// Create a new client against the production NextDNS API
    ///
    /// Fails with a configuration error if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, NEXTDNS_API_BASE)
    }

    /// Create a client against a custom base URL
    ///
    /// Used by tests to point the client at a mock server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("NextDNS API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to a typed error
    ///
    /// Consumes the response to include the body text in the message.
    async fn error_for(&self, context: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API key or insufficient permissions. Status: {status}"
            )),
            404 => Error::not_found(format!("{context}: {error_text}")),
            429 => Error::rate_limited(format!(
                "Rate limit exceeded. Please retry later. Status: {status}"
            )),
            500..=599 => Error::provider(
                "nextdns",
                format!("NextDNS server error (transient): {status} - {error_text}"),
            ),
            _ => Error::provider("nextdns", format!("{context}: {status} - {error_text}")),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self.error_for(context, response).await);
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| Error::provider("nextdns", format!("Failed to parse response: {e}")))?;

        Ok(envelope.data)
    }
}

#[async_trait]
impl RewritesApi for NextDnsClient {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        tracing::debug!("Listing NextDNS profiles");
        self.get_json("/profiles", "Profile list failed").await
    }

    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>> {
        tracing::debug!("Listing rewrites for profile {}", profile_id);
        self.get_json(
            &format!("/profiles/{profile_id}/rewrites"),
            "Rewrite list failed",
        )
        .await
    }

    async fn create_rewrite(&self, profile_id: &str, rewrite: &RewriteSpec) -> Result<Rewrite> {
        tracing::debug!(
            "Creating rewrite {} -> {} in profile {}",
            rewrite.name,
            rewrite.content,
            profile_id
        );

        let response = self
            .client
            .post(self.url(&format!("/profiles/{profile_id}/rewrites")))
            .header("X-Api-Key", &self.api_key)
            .json(&json!({
                "name": rewrite.name,
                "content": rewrite.content,
            }))
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(self.error_for("Rewrite create failed", response).await);
        }

        let envelope: Envelope<Rewrite> = response
            .json()
            .await
            .map_err(|e| Error::provider("nextdns", format!("Failed to parse response: {e}")))?;

        Ok(envelope.data)
    }

    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()> {
        tracing::debug!("Deleting rewrite {} from profile {}", rewrite_id, profile_id);

        let response = self
            .client
            .delete(self.url(&format!("/profiles/{profile_id}/rewrites/{rewrite_id}")))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        // A successful delete is 204 No Content with an empty body. Older
        // clients that insisted on a JSON body surfaced this as an error;
        // here the structured status code decides and the body is never
        // parsed.
        if response.status().is_success() {
            return Ok(());
        }

        Err(self.error_for("Rewrite delete failed", response).await)
    }
}
