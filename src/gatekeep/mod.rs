//! Feature handles and gatekept dispatch.
//!
//! A [`Feature`] is a lightweight handle naming one entry of the manifest's
//! optional-dependency table; [`Feature::gatekeep`] wraps a function in a
//! [`GatekeptFn`] that routes every call to the primary implementation when
//! the feature is detected, to a registered fallback when it is not, or to a
//! typed [`Error::FeatureUnavailable`] when there is no fallback.
//!
//! The routing decision is a plain value ([`Dispatch`], computed by the pure
//! [`route`] function) separated from the side-effecting call, so the
//! decision logic is testable without invoking anything. No per-call caching:
//! every invocation re-asks the resolver.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::warn;

use crate::core::{Error, Result};
use crate::resolver::FeatureResolver;

/// A handle to one named feature in the manifest's optional-dependency table.
///
/// Handles are cheap to clone and compare equal by name; they hold a shared
/// reference to the live resolver rather than a private copy of requirement
/// data, so [`FeatureResolver::force_refetch`] is visible to every handle.
/// Created by [`FeatureResolver::get_feature`], which validates the name.
#[derive(Clone)]
pub struct Feature {
    name: String,
    resolver: Arc<FeatureResolver>,
}

impl Feature {
    pub(crate) fn new(name: &str, resolver: Arc<FeatureResolver>) -> Self {
        Self {
            name: name.to_string(),
            resolver,
        }
    }

    /// The feature's manifest-declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether every requirement of this feature is currently satisfied.
    ///
    /// Re-resolves against the live table and registry on every call.
    ///
    /// # Errors
    ///
    /// Propagates manifest load failures from the resolver.
    pub fn is_available(&self) -> Result<bool> {
        self.resolver.is_feature_detected(&self.name)
    }

    /// Gatekeep a function behind this feature.
    ///
    /// `function_name` is used in [`Error::FeatureUnavailable`] messages;
    /// pass the name of `primary` as it would appear to users.
    pub fn gatekeep<A, R>(
        &self,
        function_name: impl Into<String>,
        primary: impl Fn(A) -> R + Send + Sync + 'static,
    ) -> GatekeptFn<A, R> {
        GatekeptFn {
            feature: self.clone(),
            function_name: function_name.into(),
            primary: Box::new(primary),
            fallback: None,
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Which implementation a gatekept call routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The feature is detected; call the primary implementation.
    Primary,
    /// The feature is not detected but a fallback is registered.
    Fallback,
}

/// The pure routing rule: given the availability answer and whether a
/// fallback exists, decide which implementation to call. `None` means the
/// call cannot proceed (unavailable, no fallback).
#[must_use]
pub fn route(available: bool, has_fallback: bool) -> Option<Dispatch> {
    match (available, has_fallback) {
        (true, _) => Some(Dispatch::Primary),
        (false, true) => Some(Dispatch::Fallback),
        (false, false) => None,
    }
}

type Callable<A, R> = Box<dyn Fn(A) -> R + Send + Sync>;

/// A function gatekept behind a feature.
///
/// Owns the primary callable (set at construction, never replaced) and at
/// most one fallback. Registering a second fallback replaces the first (last
/// write wins, matching the decorator-style API this models).
///
/// # Examples
///
/// ```rust,no_run
/// # use featgate::registry::InMemoryRegistry;
/// # use featgate::resolver::FeatureResolver;
/// # use std::sync::Arc;
/// # fn main() -> featgate::Result<()> {
/// # let resolver = Arc::new(FeatureResolver::new("featgate.toml", InMemoryRegistry::new()));
/// let charts = resolver.clone().get_feature("charts")?;
///
/// let mut render = charts.gatekeep("render", |points: usize| format!("chart({points})"));
/// render.set_fallback(|points: usize| format!("table({points})"));
///
/// // routes to the primary or the fallback depending on installed packages
/// let output = render.call(12)?;
/// # let _ = output;
/// # Ok(())
/// # }
/// ```
pub struct GatekeptFn<A, R> {
    feature: Feature,
    function_name: String,
    primary: Callable<A, R>,
    fallback: Option<Callable<A, R>>,
}

impl<A, R> GatekeptFn<A, R> {
    /// The gatekept function's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function_name
    }

    /// The feature this function is gatekept behind.
    #[must_use]
    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Whether a fallback is registered.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Register a fallback implementation, replacing any previous one.
    ///
    /// Returns `&mut Self` so registration can be chained.
    pub fn set_fallback(
        &mut self,
        fallback: impl Fn(A) -> R + Send + Sync + 'static,
    ) -> &mut Self {
        if self.fallback.is_some() {
            warn!(function = %self.function_name, "replacing previously registered fallback");
        }
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Decide which implementation a call would route to right now.
    ///
    /// Asks the resolver for the feature's availability, then applies the
    /// pure [`route`] rule.
    ///
    /// # Errors
    ///
    /// [`Error::FeatureUnavailable`] if the feature is not detected and no
    /// fallback is registered; manifest load failures propagate unchanged.
    pub fn resolve(&self) -> Result<Dispatch> {
        let available = self.feature.is_available()?;
        route(available, self.fallback.is_some()).ok_or_else(|| self.unavailable())
    }

    /// Invoke the gatekept function.
    ///
    /// Re-resolves availability on every call, then runs the chosen
    /// implementation and returns its result unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`]; the chosen implementation's own result is
    /// passed through untouched.
    pub fn call(&self, args: A) -> Result<R> {
        let chosen = match self.resolve()? {
            Dispatch::Primary => &self.primary,
            Dispatch::Fallback => self.fallback.as_ref().ok_or_else(|| self.unavailable())?,
        };
        Ok(chosen(args))
    }

    fn unavailable(&self) -> Error {
        Error::FeatureUnavailable {
            function: self.function_name.clone(),
            feature: self.feature.name.clone(),
        }
    }
}

impl<A, R> fmt::Debug for GatekeptFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatekeptFn")
            .field("function_name", &self.function_name)
            .field("feature", &self.feature.name)
            .field("has_fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}
