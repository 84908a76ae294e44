//! Dependency requirement parsing and matching.
//!
//! A [`Requirement`] is one entry of a feature's optional-dependency list: a
//! package name with an attached version specifier, parsed once from a string
//! such as `"plotters>=0.3, <0.4"`. Specifier matching is delegated to
//! [`semver::VersionReq`].

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

use crate::core::{Error, Result};

/// A named dependency with an attached version specifier.
///
/// Immutable once parsed. A bare package name (no specifier) means any
/// installed version satisfies the requirement.
///
/// # Examples
///
/// ```rust
/// use featgate::manifest::Requirement;
/// use semver::Version;
///
/// let req = Requirement::parse("plotters>=0.3, <0.4")?;
/// assert_eq!(req.name(), "plotters");
/// assert!(req.satisfied_by(&Version::parse("0.3.5")?));
/// assert!(!req.satisfied_by(&Version::parse("0.4.0")?));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    specifier: VersionReq,
}

impl Requirement {
    /// Parse a requirement string of the form `<package-name><specifier>`.
    ///
    /// The package name is the leading run of alphanumerics plus `-`, `_`,
    /// and `.`; everything after it is handed to [`VersionReq::parse`]. An
    /// empty specifier becomes [`VersionReq::STAR`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequirementParse`] carrying the offending input when
    /// the name is missing or the specifier is not valid comparator syntax.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let name_end = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(trimmed.len());
        let (name, specifier) = trimmed.split_at(name_end);

        if name.is_empty() {
            return Err(Error::RequirementParse {
                input: input.to_string(),
                reason: "missing package name".to_string(),
            });
        }

        let specifier = specifier.trim();
        let specifier = if specifier.is_empty() {
            VersionReq::STAR
        } else {
            VersionReq::parse(specifier).map_err(|err| Error::RequirementParse {
                input: input.to_string(),
                reason: err.to_string(),
            })?
        };

        Ok(Self {
            name: name.to_string(),
            specifier,
        })
    }

    /// The package name this requirement refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version specifier attached to the package name.
    #[must_use]
    pub fn specifier(&self) -> &VersionReq {
        &self.specifier
    }

    /// Check whether an installed version satisfies this requirement.
    #[must_use]
    pub fn satisfied_by(&self, installed: &Version) -> bool {
        self.specifier.matches(installed)
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.specifier == VersionReq::STAR {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, self.specifier)
        }
    }
}
