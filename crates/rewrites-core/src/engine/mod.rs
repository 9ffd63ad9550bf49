//! Core synchronization engine
//!
//! The SyncEngine is responsible for:
//! - Resolving the configured profile name to a profile id
//! - Fetching the profile's existing rewrites
//! - Converging the remote rewrite set to the desired set
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐    GET /profiles             ┌──────────────┐
//! │ SyncConfig │──────────────────────────────▶ RewritesApi  │
//! └────────────┘    GET  .../rewrites         └──────────────┘
//!       │           DELETE .../rewrites/{id}         ▲
//!       ▼           POST .../rewrites                │
//! ┌────────────┐                               ┌──────────────┐
//! │ SyncEngine │───────────────────────────────▶  SyncEvent   │
//! └────────────┘        (observability)        └──────────────┘
//! ```
//!
//! For each desired rewrite, in configuration order: first-match lookup over
//! the remaining existing entries by name. A match is replaced by deleting
//! the old id and creating a fresh entry (the provider has no update verb);
//! no match means a plain create. Equality is tested by name only, so a
//! matched entry is replaced even when its content is already correct.
//!
//! The first API error aborts the whole run. There is no retry and no
//! rollback: a delete that succeeded before a failed create leaves the
//! entry missing, and rewrites later in the configuration stay untouched.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{RewriteSpec, SyncConfig};
use crate::error::{Error, Result};
use crate::traits::{Profile, Rewrite, RewritesApi};

/// Capacity of the event channel handed out by [`SyncEngine::new`]
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the SyncEngine
///
/// Events are delivered best-effort: a one-shot CLI caller may drop the
/// receiver and rely on tracing output alone, while tests capture the
/// stream to assert on the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Run started
    Started {
        profile_name: String,
        desired_count: usize,
    },

    /// Profile name resolved to an id
    ProfileResolved { name: String, id: String },

    /// A rewrite with no remote match was created
    RewriteCreated { name: String, id: String },

    /// An existing remote rewrite was deleted and recreated
    RewriteReplaced {
        name: String,
        previous_id: String,
        new_id: String,
    },

    /// Run finished successfully
    Finished { created: usize, replaced: usize },
}

/// Counts of the mutations performed by one successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Rewrites created with no prior remote match
    pub created: usize,
    /// Rewrites replaced (delete + recreate)
    pub replaced: usize,
}

/// Resolve a profile name against the provider's profile list
///
/// Returns the first profile whose name equals `name` exactly: the match is
/// case-sensitive with no normalization. Zero matches is fatal and must
/// abort the run before any mutation.
pub fn resolve_profile<'a>(profiles: &'a [Profile], name: &str) -> Result<&'a Profile> {
    profiles
        .iter()
        .find(|profile| profile.name == name)
        .ok_or_else(|| Error::not_found(format!("Profile {name} not found in list of profiles")))
}

/// One-shot reconciliation engine
///
/// Converges the remote rewrite set of a single profile to the desired set
/// from configuration, then returns. No state survives the run.
pub struct SyncEngine {
    /// API client for the managed provider
    api: Box<dyn RewritesApi>,

    /// Desired state
    config: SyncConfig,

    /// Event sender for external observation
    event_tx: mpsc::Sender<SyncEvent>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("event_tx", &self.event_tx)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// Validates the configuration and returns the engine together with the
    /// receiving end of its event channel.
    pub fn new(
        api: Box<dyn RewritesApi>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Ok((
            Self {
                api,
                config,
                event_tx,
            },
            event_rx,
        ))
    }

    /// Run the full synchronization once
    ///
    /// Resolves the profile, fetches its existing rewrites, and reconciles.
    /// The first API failure aborts the run; partial convergence (earlier
    /// rewrites applied, later ones not) is an accepted, visible outcome.
    pub async fn run(&self) -> Result<SyncSummary> {
        self.emit(SyncEvent::Started {
            profile_name: self.config.profile_name.clone(),
            desired_count: self.config.rewrites.len(),
        });

        let profiles = self.api.list_profiles().await?;
        let profile = resolve_profile(&profiles, &self.config.profile_name)?;
        info!(
            "Profile found with name {} and id {}",
            profile.name, profile.id
        );
        self.emit(SyncEvent::ProfileResolved {
            name: profile.name.clone(),
            id: profile.id.clone(),
        });

        let existing = self.api.list_rewrites(&profile.id).await?;
        debug!(
            "Fetched {} existing rewrite(s) for profile {}",
            existing.len(),
            profile.id
        );

        let summary = self
            .reconcile(&profile.id, &self.config.rewrites, existing)
            .await?;

        self.emit(SyncEvent::Finished {
            created: summary.created,
            replaced: summary.replaced,
        });

        Ok(summary)
    }

    /// Converge the remote rewrite set to the desired set
    ///
    /// `existing` is consumed as a working list: a matched entry is removed
    /// before it is deleted remotely, so a remote rewrite is replaced at
    /// most once per run. When multiple remote entries share a name, only
    /// the first (in provider list order) is replaced; the rest are left
    /// untouched. A duplicate desired name that finds its match already
    /// consumed falls through to a plain create.
    async fn reconcile(
        &self,
        profile_id: &str,
        desired: &[RewriteSpec],
        mut existing: Vec<Rewrite>,
    ) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();

        for spec in desired {
            let matched = existing.iter().position(|remote| remote.name == spec.name);

            match matched {
                Some(index) => {
                    let stale = existing.remove(index);
                    info!("Rewrite {} already exists, replacing", spec.name);

                    // No update verb: replace is delete + recreate. The new
                    // id need not equal the deleted one.
                    self.api.delete_rewrite(profile_id, &stale.id).await?;
                    info!("Rewrite {} deleted", spec.name);

                    let created = self.create(profile_id, spec).await?;
                    summary.replaced += 1;
                    self.emit(SyncEvent::RewriteReplaced {
                        name: spec.name.clone(),
                        previous_id: stale.id,
                        new_id: created.id,
                    });
                }
                None => {
                    info!("Rewrite {} does not exist, creating", spec.name);
                    let created = self.create(profile_id, spec).await?;
                    summary.created += 1;
                    self.emit(SyncEvent::RewriteCreated {
                        name: spec.name.clone(),
                        id: created.id,
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Create one rewrite and log the resulting id
    async fn create(&self, profile_id: &str, spec: &RewriteSpec) -> Result<Rewrite> {
        let created = self.api.create_rewrite(profile_id, spec).await?;
        info!("Rewrite {} created with id {}", created.name, created.id);
        Ok(created)
    }

    /// Best-effort event delivery
    ///
    /// A dropped receiver is normal for one-shot CLI callers; a full channel
    /// only drops observation, never the synchronization itself.
    fn emit(&self, event: SyncEvent) {
        if let Err(mpsc::error::TrySendError::Full(event)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event: {:?}", event);
        }
    }
}
