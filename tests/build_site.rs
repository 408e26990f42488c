//! End-to-end CLI tests. Runs the built binary against `fixtures/content`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_archfolio"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run archfolio")
}

fn build_into(out: &Path) -> Output {
    run(&[
        "build",
        "--source",
        fixtures().to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ])
}

#[test]
fn build_writes_page_and_manifest() {
    let out = TempDir::new().unwrap();
    let result = build_into(out.path());
    assert!(
        result.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let html = std::fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(html.contains("<title>Lin Mei · Portfolio</title>"));
    assert!(html.contains("data-reveal"));
    assert!(html.contains(r#"data-media="idle""#));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("site.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["projects"].as_array().unwrap().len(), 4);
    let copied = manifest["assets"]["projects/timber-house.png"]
        .as_str()
        .unwrap();
    assert!(out.path().join(copied).is_file());
    assert!(html.contains(copied));
}

#[test]
fn build_prints_inventory_and_summary() {
    let out = TempDir::new().unwrap();
    let result = build_into(out.path());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("==> Loading"));
    assert!(stdout.contains("001 Gallery on the Hill [Public]"));
    assert!(stdout.contains("Generated 5 sections, 4 projects (3 eager), 1 asset"));
    assert!(stdout.contains("==> Build complete"));
}

#[test]
fn build_is_deterministic() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    assert!(build_into(a.path()).status.success());
    assert!(build_into(b.path()).status.success());
    let page_a = std::fs::read(a.path().join("index.html")).unwrap();
    let page_b = std::fs::read(b.path().join("index.html")).unwrap();
    assert_eq!(page_a, page_b);
}

#[test]
fn check_validates_without_output() {
    let result = run(&["check", "--source", fixtures().to_str().unwrap()]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("==> Content is valid"));
}

#[test]
fn check_fails_without_site_toml() {
    let empty = TempDir::new().unwrap();
    let result = run(&["check", "--source", empty.path().to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("site.toml"));
}

#[test]
fn invalid_reveal_config_is_rejected() {
    let src = TempDir::new().unwrap();
    for name in ["site.toml", "projects.toml"] {
        std::fs::copy(fixtures().join(name), src.path().join(name)).unwrap();
    }
    std::fs::create_dir_all(src.path().join("assets/projects")).unwrap();
    std::fs::copy(
        fixtures().join("assets/projects/timber-house.png"),
        src.path().join("assets/projects/timber-house.png"),
    )
    .unwrap();
    std::fs::write(src.path().join("config.toml"), "[reveal]\nthreshold = 1.5\n").unwrap();

    let result = run(&["check", "--source", src.path().to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("reveal"));
}

#[test]
fn gen_config_is_valid_toml() {
    let result = run(&["gen-config"]);
    assert!(result.status.success());
    let text = String::from_utf8(result.stdout).unwrap();
    let value: toml::Value = toml::from_str(&text).unwrap();
    assert!(value.get("reveal").is_some());
    assert!(value.get("lazy_images").is_some());
}
