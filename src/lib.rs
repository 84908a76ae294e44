//! featgate - optional-dependency feature gating
//!
//! A library for declaring named "features" backed by groups of optional
//! dependencies in a project manifest (`featgate.toml`), and gating functions
//! so they run a primary implementation when the feature's dependencies are
//! installed at satisfying versions, or fall back to an alternate
//! implementation (or fail with a typed error) otherwise.
//!
//! # Architecture Overview
//!
//! featgate follows a manifest/resolver model where:
//! - `featgate.toml` declares features and their dependency requirements
//! - An [`InstalledRegistry`](registry::InstalledRegistry) answers "what
//!   version of package X is installed?"
//! - A [`FeatureResolver`](resolver::FeatureResolver) caches the parsed
//!   feature table and answers availability queries
//! - A [`GatekeptFn`](gatekeep::GatekeptFn) routes each call to the primary
//!   or fallback implementation based on the live availability answer
//!
//! # Core Modules
//!
//! - [`manifest`] - Feature table parsing and manifest discovery (`featgate.toml`)
//! - [`registry`] - Installed-package inspection behind the [`registry::InstalledRegistry`] trait
//! - [`resolver`] - Cached availability resolution with explicit invalidation
//! - [`gatekeep`] - Feature handles and primary/fallback dispatch
//! - [`core`] - Error types shared across the crate
//!
//! # Manifest Format (featgate.toml)
//!
//! ```toml
//! [project]
//! name = "my-app"
//!
//! [project.optional-dependencies]
//! charts = ["plotters>=0.3", "image>=0.24, <0.26"]
//! fast-math = ["simd-accel"]
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use featgate::registry::InMemoryRegistry;
//! use featgate::resolver::FeatureResolver;
//! use std::sync::Arc;
//!
//! # fn main() -> featgate::Result<()> {
//! let mut registry = InMemoryRegistry::new();
//! registry.insert_str("plotters", "0.3.5")?;
//!
//! let resolver = Arc::new(FeatureResolver::new("featgate.toml", registry));
//! let charts = resolver.get_feature("charts")?;
//!
//! let mut render = charts.gatekeep("render", |data: Vec<f64>| format!("chart of {data:?}"));
//! render.set_fallback(|data: Vec<f64>| format!("{data:?}"));
//!
//! let output = render.call(vec![1.0, 2.0])?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```
//!
//! Only the manifest-derived table is cached; per-requirement version checks
//! re-run on every call, so availability always reflects the latest registry
//! answers. Use [`resolver::FeatureResolver::force_refetch`] to make manifest
//! edits visible to existing handles.

pub mod constants;
pub mod core;
pub mod gatekeep;
pub mod manifest;
pub mod registry;
pub mod resolver;

pub use crate::core::{Error, Result};
pub use crate::gatekeep::{Dispatch, Feature, GatekeptFn};
pub use crate::manifest::{FeatureTable, Requirement, find_manifest, find_manifest_from};
pub use crate::registry::{DistInfoRegistry, InMemoryRegistry, InstalledRegistry};
pub use crate::resolver::FeatureResolver;
