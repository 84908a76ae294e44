//! Manifest parsing for featgate projects.
//!
//! This module turns a `featgate.toml` manifest into a [`FeatureTable`]: the
//! mapping from feature name to the ordered list of [`Requirement`]s that must
//! all be installed for the feature to be considered available.
//!
//! # Manifest Structure
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
//! The `[project]` section is required; `optional-dependencies` is not — a
//! manifest that declares no optional features parses to an empty table.
//!
//! # Failure Modes
//!
//! - Unreadable file → [`Error::Io`] / [`Error::ManifestNotFound`]
//! - Malformed TOML → [`Error::ManifestParse`]
//! - Missing `[project]` → [`Error::ManifestShape`]
//! - Any malformed requirement string → [`Error::RequirementParse`] naming
//!   the offending string; the whole table build fails (no partial tables)

pub mod helpers;
pub mod requirement;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::{Error, Result};

pub use helpers::{find_manifest, find_manifest_from, find_manifest_with_optional};
pub use requirement::Requirement;

/// Serde view of the manifest document. Only the parts featgate consumes are
/// modeled; unrelated sections are ignored.
#[derive(Debug, Deserialize)]
struct ManifestDocument {
    project: Option<ProjectSection>,
}

#[derive(Debug, Deserialize)]
struct ProjectSection {
    #[serde(rename = "optional-dependencies", default)]
    optional_dependencies: BTreeMap<String, Vec<String>>,
}

/// The parsed optional-dependency table: feature name → requirements.
///
/// Built once per manifest load and immutable afterwards. Requirement order
/// within a feature preserves manifest declaration order, which is the order
/// availability checks short-circuit in. Feature names iterate in sorted
/// order (deterministic, used for reporting only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTable {
    features: BTreeMap<String, Vec<Requirement>>,
}

impl FeatureTable {
    /// Load and parse a manifest file.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestNotFound`] if `path` does not exist, [`Error::Io`] if
    /// it cannot be read, plus every failure mode of [`Self::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ManifestNotFound);
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestParse`] on malformed TOML, plus every failure mode of
    /// [`Self::from_document`].
    pub fn parse(text: &str) -> Result<Self> {
        let document: ManifestDocument = toml::from_str(text)?;
        Self::from_parts(document)
    }

    /// Build the table from an already-parsed TOML document.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestShape`] if the `project` section is missing,
    /// [`Error::ManifestParse`] if a section has the wrong type, and
    /// [`Error::RequirementParse`] if any requirement string is malformed.
    pub fn from_document(document: toml::Table) -> Result<Self> {
        let document: ManifestDocument = toml::Value::Table(document).try_into()?;
        Self::from_parts(document)
    }

    fn from_parts(document: ManifestDocument) -> Result<Self> {
        let Some(project) = document.project else {
            return Err(Error::ManifestShape {
                reason: "no `project` section".to_string(),
            });
        };

        let mut features = BTreeMap::new();
        for (feature, raw_requirements) in project.optional_dependencies {
            let requirements = raw_requirements
                .iter()
                .map(|raw| Requirement::parse(raw))
                .collect::<Result<Vec<_>>>()?;
            features.insert(feature, requirements);
        }

        Ok(Self { features })
    }

    /// Whether the table declares a feature with this name.
    #[must_use]
    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    /// The requirements declared for a feature, in declaration order.
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&[Requirement]> {
        self.features.get(feature).map(Vec::as_slice)
    }

    /// Declared feature names, in sorted order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Number of declared features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the manifest declares no optional features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[project]
name = "demo"

[project.optional-dependencies]
charts = ["plotters>=0.3", "image>=0.24, <0.26"]
fast-math = ["simd-accel"]
"#;

    #[test]
    fn test_parse_feature_table() {
        let table = FeatureTable::parse(MANIFEST).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("charts"));
        assert!(table.contains("fast-math"));
        assert!(!table.contains("unknown"));

        let charts = table.get("charts").unwrap();
        assert_eq!(charts.len(), 2);
        // declaration order is preserved within a feature
        assert_eq!(charts[0].name(), "plotters");
        assert_eq!(charts[1].name(), "image");
    }

    #[test]
    fn test_missing_project_section_is_shape_error() {
        let err = FeatureTable::parse("[tool]\nx = 1\n").unwrap_err();
        assert!(matches!(err, Error::ManifestShape { .. }));
        assert!(err.to_string().contains("project"));
    }

    #[test]
    fn test_missing_optional_dependencies_is_empty_table() {
        let table = FeatureTable::parse("[project]\nname = \"demo\"\n").unwrap();
        assert!(table.is_empty());
        assert!(!table.contains("anything"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = FeatureTable::parse("not = = toml").unwrap_err();
        assert!(matches!(err, Error::ManifestParse(_)));
    }

    #[test]
    fn test_bad_requirement_fails_whole_table() {
        let text = r#"
[project]
name = "demo"

[project.optional-dependencies]
good = ["serde>=1.0"]
bad = ["serde>=1.0", "not a requirement!!"]
"#;
        let err = FeatureTable::parse(text).unwrap_err();
        match err {
            Error::RequirementParse { input, .. } => {
                assert_eq!(input, "not a requirement!!");
            }
            other => panic!("expected RequirementParse, got {other:?}"),
        }
    }

    #[test]
    fn test_from_document() {
        let document: toml::Table = toml::from_str(MANIFEST).unwrap();
        let table = FeatureTable::from_document(document).unwrap();
        assert!(table.contains("charts"));

        let empty: toml::Table = toml::from_str("").unwrap();
        assert!(matches!(
            FeatureTable::from_document(empty),
            Err(Error::ManifestShape { .. })
        ));
    }

    #[test]
    fn test_feature_names_sorted() {
        let table = FeatureTable::parse(MANIFEST).unwrap();
        let names: Vec<_> = table.feature_names().collect();
        assert_eq!(names, vec!["charts", "fast-math"]);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FeatureTable::load(dir.path().join("featgate.toml")).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("featgate.toml");
        std::fs::write(&path, MANIFEST).unwrap();
        let table = FeatureTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
    }
}
