//! Trait definitions for the rewrite synchronizer

mod rewrites_api;

pub use rewrites_api::{Profile, Rewrite, RewritesApi};
