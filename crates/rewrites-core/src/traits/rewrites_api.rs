// # Rewrites API Trait
//
// Defines the interface for managing DNS rewrites via a provider's HTTP API.
//
// ## Implementations
//
// - NextDNS: `rewrites-provider-nextdns` crate
// - Test double: `MockRewritesApi` in the integration tests
//
// ## Contract
//
// Implementations make exactly one HTTP call per method and propagate every
// failure to the caller. There is no retry, backoff, or caching here: the
// run is one-shot and the first error aborts it.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::RewriteSpec;
use crate::error::Result;

/// A provider-side profile: a named container of DNS configuration
///
/// Extra provider fields are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Opaque provider identifier
    pub id: String,
    /// Human-chosen profile name (looked up by exact match)
    pub name: String,
}

/// A provider-side rewrite entry belonging to exactly one profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rewrite {
    /// Opaque provider identifier
    pub id: String,
    /// The hostname pattern being rewritten
    pub name: String,
    /// The target/answer value
    #[serde(default)]
    pub content: String,
}

/// Trait for rewrite-management API implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Replace semantics
///
/// The provider offers no update verb for rewrites. Changing an existing
/// entry is always a delete of the old id followed by a create; the engine
/// owns that sequencing, implementations only expose the raw verbs.
#[async_trait]
pub trait RewritesApi: Send + Sync {
    /// List all profiles visible to the credential
    ///
    /// `GET /profiles`
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// List all rewrites belonging to a profile
    ///
    /// `GET /profiles/{profile_id}/rewrites`
    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>>;

    /// Create a rewrite and return the created entity (with its new id)
    ///
    /// `POST /profiles/{profile_id}/rewrites`
    async fn create_rewrite(&self, profile_id: &str, rewrite: &RewriteSpec) -> Result<Rewrite>;

    /// Delete a rewrite by id
    ///
    /// `DELETE /profiles/{profile_id}/rewrites/{rewrite_id}`
    ///
    /// The provider answers a successful delete with `204 No Content` and an
    /// empty body; implementations must report that as success, not as a
    /// parse or status error.
    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()>;
}
