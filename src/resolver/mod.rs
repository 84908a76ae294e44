//! Feature availability resolution.
//!
//! [`FeatureResolver`] owns the parsed optional-dependency table and answers
//! "is feature X available?" against a live [`InstalledRegistry`]. The table
//! is loaded lazily on first use and cached for the resolver's lifetime;
//! [`FeatureResolver::force_refetch`] drops the cache so the next access
//! reloads from the manifest. Only the manifest-derived structure is cached -
//! per-requirement version checks re-run on every call, so availability
//! always reflects the registry's latest answers.
//!
//! The resolver is an explicit object: construct it with a manifest path (or
//! discovery strategy) and a registry, and share it via [`Arc`]. Feature
//! handles created by [`FeatureResolver::get_feature`] keep a reference back
//! to the live resolver, so a forced refetch is visible to every handle.
//!
//! Cache access and invalidation run under a mutex, so concurrent callers
//! cannot race a refetch against a read or trigger redundant loads.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::core::{Error, Result};
use crate::gatekeep::Feature;
use crate::manifest::{FeatureTable, Requirement, find_manifest_with_optional};
use crate::registry::InstalledRegistry;

/// Cached resolver for optional-dependency features.
///
/// # Examples
///
/// ```rust,no_run
/// use featgate::registry::DistInfoRegistry;
/// use featgate::resolver::FeatureResolver;
/// use std::sync::Arc;
///
/// # fn main() -> featgate::Result<()> {
/// let registry = DistInfoRegistry::new("/opt/app/site-packages");
/// let resolver = Arc::new(FeatureResolver::new("featgate.toml", registry));
///
/// if resolver.is_feature_detected("charts")? {
///     println!("charts feature is available");
/// }
/// # Ok(())
/// # }
/// ```
pub struct FeatureResolver {
    manifest_path: Option<PathBuf>,
    registry: Box<dyn InstalledRegistry>,
    cached: Mutex<Option<FeatureTable>>,
}

impl std::fmt::Debug for FeatureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureResolver")
            .field("manifest_path", &self.manifest_path)
            .finish_non_exhaustive()
    }
}

impl FeatureResolver {
    /// Create a resolver reading the manifest at an explicit path.
    pub fn new(manifest_path: impl Into<PathBuf>, registry: impl InstalledRegistry + 'static) -> Self {
        Self {
            manifest_path: Some(manifest_path.into()),
            registry: Box::new(registry),
            cached: Mutex::new(None),
        }
    }

    /// Create a resolver that discovers the manifest by walking up from the
    /// current working directory (see [`crate::manifest::find_manifest`]).
    pub fn discover(registry: impl InstalledRegistry + 'static) -> Self {
        Self {
            manifest_path: None,
            registry: Box::new(registry),
            cached: Mutex::new(None),
        }
    }

    // The guarded state is just an Option; recovering from a poisoned lock
    // cannot observe a half-built table.
    fn lock_cache(&self) -> MutexGuard<'_, Option<FeatureTable>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the cached table, loading it first if necessary.
    ///
    /// A failed load propagates to the caller and leaves the cache empty, so
    /// the next access retries the full load.
    fn with_table<T>(&self, f: impl FnOnce(&FeatureTable) -> T) -> Result<T> {
        let mut cached = self.lock_cache();
        if cached.is_none() {
            let path = find_manifest_with_optional(self.manifest_path.clone())?;
            let table = FeatureTable::load(&path)?;
            debug!(
                path = %path.display(),
                features = table.len(),
                "loaded optional-dependency table"
            );
            *cached = Some(table);
        }
        let table = cached.as_ref().expect("cache populated above");
        Ok(f(table))
    }

    /// Whether the manifest declares a feature with this name.
    ///
    /// # Errors
    ///
    /// Propagates manifest load failures if the table is not yet cached.
    pub fn contains(&self, feature: &str) -> Result<bool> {
        self.with_table(|table| table.contains(feature))
    }

    /// The requirements declared for a feature, in declaration order.
    ///
    /// # Errors
    ///
    /// [`Error::FeatureNotFound`] for unknown names, plus manifest load
    /// failures if the table is not yet cached.
    pub fn requirements(&self, feature: &str) -> Result<Vec<Requirement>> {
        self.with_table(|table| table.get(feature).map(<[Requirement]>::to_vec))?
            .ok_or_else(|| Error::FeatureNotFound {
                name: feature.to_string(),
            })
    }

    /// Whether every requirement of `feature` is satisfied by the installed
    /// packages right now.
    ///
    /// Unknown feature names return `false` rather than an error; unknown-ness
    /// is surfaced earlier, at [`Self::get_feature`]. Requirements are checked
    /// in declaration order and the check short-circuits on the first one that
    /// is missing or at an unsatisfying version.
    ///
    /// # Errors
    ///
    /// Propagates manifest load failures if the table is not yet cached.
    pub fn is_feature_detected(&self, feature: &str) -> Result<bool> {
        self.with_table(|table| {
            let Some(requirements) = table.get(feature) else {
                return false;
            };
            requirements.iter().all(|requirement| {
                match self.registry.installed_version(requirement.name()) {
                    Some(installed) => requirement.satisfied_by(&installed),
                    None => false,
                }
            })
        })
    }

    /// Discard the cached table unconditionally.
    ///
    /// The next access reloads from the manifest, so edits made since the
    /// first load become visible to every existing [`Feature`] handle.
    pub fn force_refetch(&self) {
        let mut cached = self.lock_cache();
        if cached.take().is_some() {
            debug!("dropped cached optional-dependency table");
        }
    }

    /// Eagerly load (or refresh) the optional-dependency table.
    ///
    /// Equivalent to [`Self::force_refetch`] followed by a load; useful at
    /// startup to surface manifest problems before the first gatekept call.
    ///
    /// # Errors
    ///
    /// Propagates any manifest load failure; the cache stays empty on error.
    pub fn cache_optional_dependencies(&self) -> Result<()> {
        self.force_refetch();
        self.with_table(|_| ())
    }

    /// Look up a feature by name, returning a handle for gatekeeping.
    ///
    /// Takes the resolver by `Arc` so the handle can keep a reference to the
    /// live table; call as `resolver.clone().get_feature(..)` when the
    /// resolver is reused afterwards (an `Arc` clone is cheap).
    ///
    /// # Errors
    ///
    /// [`Error::FeatureNotFound`] if the manifest does not declare the name,
    /// plus manifest load failures if the table is not yet cached.
    pub fn get_feature(self: Arc<Self>, name: &str) -> Result<Feature> {
        if !self.contains(name)? {
            return Err(Error::FeatureNotFound {
                name: name.to_string(),
            });
        }
        Ok(Feature::new(name, self))
    }
}
