// # rewrites-core
//
// Core library for the one-shot NextDNS rewrite synchronizer.
//
// ## Architecture Overview
//
// - **RewritesApi**: Trait for the provider's rewrite endpoints
// - **SyncEngine**: Reconciler that converges the remote rewrite set for one
//   profile to the desired set from configuration
// - **SyncConfig**: Declarative configuration (profile name + rewrites)
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from the
//    HTTP implementation behind the `RewritesApi` seam
// 2. **Fail-Fast**: The first API error aborts the whole run; partial
//    convergence is an accepted, visible outcome
// 3. **Stateless**: Nothing is cached across runs; convergence is re-derived
//    from remote state on every invocation

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{RewriteSpec, SyncConfig};
pub use engine::{SyncEngine, SyncEvent, SyncSummary, resolve_profile};
pub use error::{Error, Result};
pub use traits::{Profile, Rewrite, RewritesApi};
