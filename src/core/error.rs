//! Error handling for featgate.
//!
//! All failure modes in the crate are represented by the [`Error`] enum.
//! Errors surface to the immediate caller as typed values; nothing is retried
//! or silently recovered internally, and load failures are never cached (a
//! failed manifest load leaves the resolver cache empty so the next access
//! retries from scratch).

use thiserror::Error;

use crate::constants::MANIFEST_FILE_NAME;

/// The main error type for featgate operations.
///
/// Each variant represents a specific failure mode with enough context for a
/// caller to report it without wrapping:
///
/// - Manifest problems: [`ManifestNotFound`](Self::ManifestNotFound),
///   [`ManifestParse`](Self::ManifestParse), [`ManifestShape`](Self::ManifestShape)
/// - Requirement problems: [`RequirementParse`](Self::RequirementParse)
/// - Lookup problems: [`FeatureNotFound`](Self::FeatureNotFound)
/// - Dispatch problems: [`FeatureUnavailable`](Self::FeatureUnavailable)
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest file not found at the given path, or discovery walked up to
    /// the filesystem root without finding one.
    #[error("Manifest file {MANIFEST_FILE_NAME} not found in current directory or any parent directory")]
    ManifestNotFound,

    /// Manifest text is not valid TOML, or a section has the wrong type.
    #[error("Invalid manifest syntax: {0}")]
    ManifestParse(#[from] toml::de::Error),

    /// Manifest parsed but is missing a required section.
    #[error("Malformed manifest: {reason}")]
    ManifestShape {
        /// What is wrong with the manifest's structure
        reason: String,
    },

    /// A dependency requirement string could not be parsed.
    ///
    /// Carries the offending text so table-build failures name the exact
    /// requirement that broke the load.
    #[error("Invalid requirement '{input}': {reason}")]
    RequirementParse {
        /// The requirement string that failed to parse
        input: String,
        /// Why it failed
        reason: String,
    },

    /// A feature name was requested that the manifest does not declare.
    #[error("Feature '{name}' is not declared in the manifest")]
    FeatureNotFound {
        /// The unknown feature name
        name: String,
    },

    /// A gatekept function was called while its feature is unavailable and no
    /// fallback is registered. Names both the function and the feature.
    #[error("Failed to call function '{function}': it is gatekept behind feature '{feature}' which is not detected")]
    FeatureUnavailable {
        /// Name of the gatekept function
        function: String,
        /// Name of the undetected feature
        feature: String,
    },

    /// Version string parsing error from [`semver::Error`].
    #[error("Invalid version: {0}")]
    Version(#[from] semver::Error),

    /// I/O error reading the manifest file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
