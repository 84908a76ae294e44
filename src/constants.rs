//! Global constants used throughout the featgate codebase.

/// Fixed name of the project manifest file that declares optional-dependency
/// features. Discovery (see [`crate::manifest::find_manifest`]) looks for this
/// name in the current directory and every parent up to the filesystem root.
pub const MANIFEST_FILE_NAME: &str = "featgate.toml";
