//! Installed-package inspection.
//!
//! The resolver only ever asks one question of the host environment: "what
//! version of package X is installed?". That question is the
//! [`InstalledRegistry`] trait; everything behind it is an external
//! collaborator. Absence (unregistered package, or registered without a
//! usable version) is `None`, never an error, and nothing is cached at this
//! layer - caching the expensive manifest table is the resolver's job, while
//! version lookups re-run on every availability check.
//!
//! Two implementations ship with the crate:
//!
//! - [`InMemoryRegistry`] - an explicit name→version map, for tests and for
//!   embedders that already know what is installed
//! - [`DistInfoRegistry`] - scans a directory of `*.dist-info` metadata
//!   entries, the on-disk layout used by Python-style installed-package
//!   indexes

use std::collections::HashMap;
use std::path::PathBuf;

use semver::Version;
use tracing::debug;

use crate::core::Result;

/// Query service over the host environment's installed-package metadata.
///
/// Implementations must be cheap to call repeatedly: the resolver re-queries
/// on every availability check so that package installs and removals are
/// visible mid-process without invalidating the manifest cache.
pub trait InstalledRegistry: Send + Sync {
    /// The installed version of `package`, or `None` if the package is not
    /// registered or exposes no parseable version.
    fn installed_version(&self, package: &str) -> Option<Version>;
}

/// Normalize a package name for comparison: lowercase, with runs of `-`, `_`,
/// and `.` collapsed to a single `-`.
#[must_use]
pub fn normalize_package_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut previous_was_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !previous_was_separator {
                normalized.push('-');
                previous_was_separator = true;
            }
        } else {
            normalized.extend(c.to_lowercase());
            previous_was_separator = false;
        }
    }
    normalized
}

/// Parse an installed version string leniently.
///
/// Strips a leading `v` and pads bare `MAJOR` or `MAJOR.MINOR` forms (e.g.
/// `"1.5"`) to full semver before parsing. Returns `None` for anything that
/// still does not parse - an unparseable installed version is treated as
/// absent, not as an error.
#[must_use]
pub fn parse_version_lenient(raw: &str) -> Option<Version> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);

    if let Ok(version) = Version::parse(cleaned) {
        return Some(version);
    }

    let parts: Vec<&str> = cleaned.split('.').collect();
    let all_numeric =
        parts.iter().all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if parts.len() < 3 && all_numeric {
        let mut padded = parts;
        while padded.len() < 3 {
            padded.push("0");
        }
        return Version::parse(&padded.join(".")).ok();
    }

    None
}

/// An explicit in-memory package index.
///
/// Names are normalized on insert and lookup, so `Foo_Bar` and `foo-bar`
/// refer to the same package.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    packages: HashMap<String, Version>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an installed package version.
    pub fn insert(&mut self, name: &str, version: Version) {
        self.packages.insert(normalize_package_name(name), version);
    }

    /// Register an installed package from a version string, parsed leniently
    /// (`"1.5"` is accepted as `1.5.0`).
    ///
    /// # Errors
    ///
    /// [`crate::Error::Version`] if the string is not a version at all.
    pub fn insert_str(&mut self, name: &str, version: &str) -> Result<()> {
        let version = match parse_version_lenient(version) {
            Some(version) => version,
            None => Version::parse(version)?,
        };
        self.insert(name, version);
        Ok(())
    }

    /// Remove a package, as if it had been uninstalled.
    pub fn remove(&mut self, name: &str) {
        self.packages.remove(&normalize_package_name(name));
    }
}

impl InstalledRegistry for InMemoryRegistry {
    fn installed_version(&self, package: &str) -> Option<Version> {
        self.packages.get(&normalize_package_name(package)).cloned()
    }
}

/// A package index backed by a directory of `*.dist-info` entries.
///
/// Each installed package is a `<name>-<version>.dist-info` directory whose
/// `METADATA` file carries RFC-822-style headers; the `Name:` and `Version:`
/// headers are what this registry reads. Entries that cannot be read or that
/// lack a usable version are skipped (the package is simply absent).
#[derive(Debug, Clone)]
pub struct DistInfoRegistry {
    root: PathBuf,
}

impl DistInfoRegistry {
    /// Create a registry scanning `root` for `*.dist-info` directories.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl InstalledRegistry for DistInfoRegistry {
    fn installed_version(&self, package: &str) -> Option<Version> {
        let wanted = normalize_package_name(package);
        let entries = std::fs::read_dir(&self.root).ok()?;

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(dir_name) = file_name.to_str() else {
                continue;
            };
            if !dir_name.ends_with(".dist-info") {
                continue;
            }

            let metadata_path = entry.path().join("METADATA");
            let Ok(text) = std::fs::read_to_string(&metadata_path) else {
                debug!(entry = dir_name, "skipping dist-info entry without readable METADATA");
                continue;
            };

            let mut name = None;
            let mut version = None;
            for line in text.lines() {
                // headers end at the first blank line
                if line.is_empty() {
                    break;
                }
                if let Some(value) = line.strip_prefix("Name:") {
                    name = Some(value.trim().to_string());
                } else if let Some(value) = line.strip_prefix("Version:") {
                    version = Some(value.trim().to_string());
                }
            }

            let Some(name) = name else {
                continue;
            };
            if normalize_package_name(&name) != wanted {
                continue;
            }

            return version.as_deref().and_then(parse_version_lenient);
        }

        None
    }
}
