//! End-to-end tests: manifest on disk, registry fakes, resolver, and
//! gatekept dispatch working together.

use std::sync::Arc;

use featgate::registry::{DistInfoRegistry, InMemoryRegistry};
use featgate::resolver::FeatureResolver;
use featgate::{Dispatch, Error};

const MANIFEST: &str = r#"
[project]
name = "demo-app"

[project.optional-dependencies]
extra = ["pkg>=2.0"]
charts = ["plotters>=0.3", "image>=0.24, <0.26"]
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_manifest(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("featgate.toml");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn detection_follows_installed_version() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);

    // installed at 1.5: requirement pkg>=2.0 is not satisfied
    let mut registry = InMemoryRegistry::new();
    registry.insert_str("pkg", "1.5").unwrap();
    let resolver = FeatureResolver::new(&path, registry);
    assert!(!resolver.is_feature_detected("extra").unwrap());

    // installed at 2.3: satisfied
    let mut registry = InMemoryRegistry::new();
    registry.insert_str("pkg", "2.3").unwrap();
    let resolver = FeatureResolver::new(&path, registry);
    assert!(resolver.is_feature_detected("extra").unwrap());
}

#[test]
fn gatekept_dispatch_end_to_end() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);

    let mut registry = InMemoryRegistry::new();
    registry.insert_str("pkg", "2.3").unwrap();
    let resolver = Arc::new(FeatureResolver::new(&path, registry));

    let extra = resolver.clone().get_feature("extra").unwrap();
    let mut greet = extra.gatekeep("greet", |name: String| format!("fancy hello, {name}"));
    greet.set_fallback(|name: String| format!("hello, {name}"));

    assert_eq!(greet.resolve().unwrap(), Dispatch::Primary);
    assert_eq!(greet.call("ada".to_string()).unwrap(), "fancy hello, ada");

    // charts has no packages installed and no fallback registered
    let charts = resolver.clone().get_feature("charts").unwrap();
    let render = charts.gatekeep("render", |_: ()| "chart");
    let err = render.call(()).unwrap_err();
    assert!(matches!(
        err,
        Error::FeatureUnavailable { ref function, ref feature }
            if function == "render" && feature == "charts"
    ));
}

#[test]
fn refetch_makes_manifest_edits_visible_to_existing_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);

    let mut registry = InMemoryRegistry::new();
    registry.insert_str("pkg", "2.3").unwrap();
    let resolver = Arc::new(FeatureResolver::new(&path, registry));

    let extra = resolver.clone().get_feature("extra").unwrap();
    assert!(extra.is_available().unwrap());

    // tighten the requirement on disk; cached table still answers true
    write_manifest(
        &dir,
        "[project]\nname = \"demo-app\"\n\n[project.optional-dependencies]\nextra = [\"pkg>=3.0\"]\n",
    );
    assert!(extra.is_available().unwrap());

    // the existing handle sees the reload, no new lookup needed
    resolver.force_refetch();
    assert!(!extra.is_available().unwrap());
}

#[test]
fn eager_cache_surfaces_manifest_problems_up_front() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(&dir, "[tool]\nx = 1\n");
    let path = dir.path().join("featgate.toml");

    let resolver = FeatureResolver::new(&path, InMemoryRegistry::new());
    assert!(matches!(
        resolver.cache_optional_dependencies(),
        Err(Error::ManifestShape { .. })
    ));

    // a fixed manifest loads on the next attempt; failures are never cached
    write_manifest(&dir, MANIFEST);
    resolver.cache_optional_dependencies().unwrap();
    assert!(resolver.contains("extra").unwrap());
}

#[test]
fn dist_info_registry_backs_detection() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);

    let site = dir.path().join("site-packages");
    let info = site.join("pkg-2.3.dist-info");
    std::fs::create_dir_all(&info).unwrap();
    std::fs::write(info.join("METADATA"), "Name: pkg\nVersion: 2.3\n").unwrap();

    let resolver = FeatureResolver::new(&path, DistInfoRegistry::new(&site));
    assert!(resolver.is_feature_detected("extra").unwrap());
    assert!(!resolver.is_feature_detected("charts").unwrap());
}

#[test]
fn empty_optional_dependencies_means_nothing_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "[project]\nname = \"demo-app\"\n");

    let resolver = FeatureResolver::new(&path, InMemoryRegistry::new());
    assert!(!resolver.contains("anything").unwrap());
    assert!(!resolver.is_feature_detected("anything").unwrap());
}
