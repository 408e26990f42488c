//! Shared test utilities for the archfolio test suite.
//!
//! Provides fixture setup and lookup helpers over loaded content.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! let site = content::load(tmp.path()).unwrap();
//!
//! let project = find_project(&site, "Timber House");
//! assert_eq!(project.category, "Residential");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::content::Site;
use crate::types::Project;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Append text to a fixture file.
pub fn append(path: &Path, text: &str) {
    let mut content = std::fs::read_to_string(path).unwrap();
    content.push_str(text);
    std::fs::write(path, content).unwrap();
}

/// The fixture gallery, parsed without touching the filesystem.
pub fn sample_projects() -> Vec<Project> {
    #[derive(serde::Deserialize)]
    struct File {
        projects: Vec<Project>,
    }
    let text = include_str!("../fixtures/content/projects.toml");
    toml::from_str::<File>(text).unwrap().projects
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a project by title. Panics if not found.
pub fn find_project<'a>(site: &'a Site, title: &str) -> &'a Project {
    site.projects
        .iter()
        .find(|p| p.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = site.projects.iter().map(|p| p.title.as_str()).collect();
            panic!("project '{title}' not found. Available: {titles:?}")
        })
}
