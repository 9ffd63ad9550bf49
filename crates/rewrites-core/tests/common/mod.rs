//! Test doubles and common utilities for the engine contract tests
//!
//! `MockRewritesApi` records the exact sequence of API calls the engine
//! makes, so tests can assert on operation order, not just counts.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use rewrites_core::config::{RewriteSpec, SyncConfig};
use rewrites_core::error::{Error, Result};
use rewrites_core::traits::{Profile, Rewrite, RewritesApi};

/// One recorded API call, in the order the engine issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListProfiles,
    ListRewrites {
        profile_id: String,
    },
    CreateRewrite {
        profile_id: String,
        name: String,
        content: String,
    },
    DeleteRewrite {
        profile_id: String,
        rewrite_id: String,
    },
}

/// A RewritesApi double serving fixed fixtures and recording every call
pub struct MockRewritesApi {
    /// Profiles returned by list_profiles()
    profiles: Vec<Profile>,
    /// Rewrites returned by list_rewrites()
    rewrites: Vec<Rewrite>,
    /// Every call, in order
    calls: Arc<Mutex<Vec<ApiCall>>>,
    /// Counter used to mint ids for created rewrites
    next_id: AtomicUsize,
    /// When set, delete_rewrite() fails
    fail_deletes: bool,
    /// When set, create_rewrite() fails for this rewrite name
    fail_create_for: Option<String>,
}

impl MockRewritesApi {
    pub fn new(profiles: Vec<Profile>, rewrites: Vec<Rewrite>) -> Self {
        Self {
            profiles,
            rewrites,
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicUsize::new(1),
            fail_deletes: false,
            fail_create_for: None,
        }
    }

    /// Make every delete_rewrite() call fail
    pub fn with_failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Make create_rewrite() fail for the given rewrite name
    pub fn with_failing_create(mut self, name: &str) -> Self {
        self.fail_create_for = Some(name.to_string());
        self
    }

    /// Snapshot of the recorded call sequence
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::CreateRewrite { .. }))
    }

    pub fn delete_count(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::DeleteRewrite { .. }))
    }

    fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl RewritesApi for MockRewritesApi {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.record(ApiCall::ListProfiles);
        Ok(self.profiles.clone())
    }

    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>> {
        self.record(ApiCall::ListRewrites {
            profile_id: profile_id.to_string(),
        });
        Ok(self.rewrites.clone())
    }

    async fn create_rewrite(&self, profile_id: &str, rewrite: &RewriteSpec) -> Result<Rewrite> {
        self.record(ApiCall::CreateRewrite {
            profile_id: profile_id.to_string(),
            name: rewrite.name.clone(),
            content: rewrite.content.clone(),
        });

        if self.fail_create_for.as_deref() == Some(rewrite.name.as_str()) {
            return Err(Error::provider(
                "mock",
                format!("create failed for {}", rewrite.name),
            ));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Rewrite {
            id: format!("gen-{n}"),
            name: rewrite.name.clone(),
            content: rewrite.content.clone(),
        })
    }

    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()> {
        self.record(ApiCall::DeleteRewrite {
            profile_id: profile_id.to_string(),
            rewrite_id: rewrite_id.to_string(),
        });

        if self.fail_deletes {
            return Err(Error::provider("mock", "delete failed"));
        }

        Ok(())
    }
}

/// Newtype handing a shared mock to the engine
///
/// Engines take ownership of a boxed api; tests keep an `Arc` to the mock
/// so they can inspect the call log after the run.
pub struct SharedApi(pub Arc<MockRewritesApi>);

#[async_trait::async_trait]
impl RewritesApi for SharedApi {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.0.list_profiles().await
    }

    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>> {
        self.0.list_rewrites(profile_id).await
    }

    async fn create_rewrite(&self, profile_id: &str, rewrite: &RewriteSpec) -> Result<Rewrite> {
        self.0.create_rewrite(profile_id, rewrite).await
    }

    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()> {
        self.0.delete_rewrite(profile_id, rewrite_id).await
    }
}

/// A profile fixture
pub fn profile(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// A remote rewrite fixture
pub fn remote(id: &str, name: &str, content: &str) -> Rewrite {
    Rewrite {
        id: id.to_string(),
        name: name.to_string(),
        content: content.to_string(),
    }
}

/// A desired rewrite fixture
pub fn spec(name: &str, content: &str) -> RewriteSpec {
    RewriteSpec {
        name: name.to_string(),
        content: content.to_string(),
    }
}

/// A minimal configuration targeting the "home" profile
pub fn config(rewrites: Vec<RewriteSpec>) -> SyncConfig {
    SyncConfig {
        profile_name: "home".to_string(),
        rewrites,
    }
}
