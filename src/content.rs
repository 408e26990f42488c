//! Content loading.
//!
//! Reads the hand-authored data files from the content directory into a
//! [`Site`]. Everything the page shows comes from here; nothing is fetched at
//! build time.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml       # Site configuration (optional)
//! ├── site.toml         # [person], [contact], [[skills]], [[stats]] (required)
//! ├── projects.toml     # [[projects]] gallery entries (optional)
//! ├── experience.toml   # [[experience]] timeline entries (optional)
//! ├── about.md          # Bio as markdown (optional, overrides person.bio)
//! └── assets/           # Local images and files, copied to the output
//!     └── projects/
//!         └── gallery.jpg
//! ```
//!
//! ## Validation
//!
//! - Project ids are unique and titles non-empty
//! - Every project has an image; local images must exist under `assets/`
//! - No category is named `all` (the show-all filter key)
//! - Skill levels are 0-100
//!
//! Local image dimensions are read from the file headers so the page can
//! reserve the right placeholder box before the image loads.

use crate::config::{self, SiteConfig};
use crate::types::{Contact, Experience, Person, Project, Skill, Stat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Required file missing: {0}")]
    MissingFile(PathBuf),
    #[error("Duplicate project id {0}")]
    DuplicateProject(u32),
    #[error("Invalid content: {0}")]
    Validation(String),
    #[error("Cannot read image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Everything needed to render the page.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub config: SiteConfig,
    pub person: Person,
    pub contact: Contact,
    pub skills: Vec<Skill>,
    pub stats: Vec<Stat>,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    /// Raw markdown of `about.md`, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    /// Files under `assets/`, relative to that directory, sorted.
    pub assets: Vec<String>,
}

impl Site {
    /// Unique project categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        categories(&self.projects)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteFile {
    person: Person,
    contact: Contact,
    #[serde(default)]
    skills: Vec<Skill>,
    #[serde(default)]
    stats: Vec<Stat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectsFile {
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExperienceFile {
    #[serde(default)]
    experience: Vec<Experience>,
}

pub const ASSETS_DIR: &str = "assets";

/// Load and validate the content directory.
pub fn load(root: &Path) -> Result<Site, ContentError> {
    let config = config::load_config(root)?;

    let site_path = root.join("site.toml");
    if !site_path.exists() {
        return Err(ContentError::MissingFile(site_path));
    }
    let site_file: SiteFile = read_toml(&site_path)?;
    let projects_file: ProjectsFile = read_optional_toml(&root.join("projects.toml"))?;
    let experience_file: ExperienceFile = read_optional_toml(&root.join("experience.toml"))?;

    let about_path = root.join("about.md");
    let about = if about_path.exists() {
        Some(fs::read_to_string(&about_path)?)
    } else {
        None
    };

    let assets_root = root.join(ASSETS_DIR);
    let assets = list_assets(&assets_root)?;

    let mut projects = projects_file.projects;
    validate_projects(&projects)?;
    for project in &mut projects {
        resolve_image(project, &assets_root)?;
    }
    validate_skills(&site_file.skills)?;

    info!(
        projects = projects.len(),
        experience = experience_file.experience.len(),
        assets = assets.len(),
        "loaded content from {}",
        root.display()
    );

    Ok(Site {
        config,
        person: site_file.person,
        contact: site_file.contact,
        skills: site_file.skills,
        stats: site_file.stats,
        projects,
        experience: experience_file.experience,
        about,
        assets,
    })
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ContentError> {
    let text = fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|source| ContentError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional_toml<T: for<'de> Deserialize<'de> + Default>(
    path: &Path,
) -> Result<T, ContentError> {
    if path.exists() {
        read_toml(path)
    } else {
        debug!("{} not found, using empty list", path.display());
        Ok(T::default())
    }
}

fn list_assets(assets_root: &Path) -> Result<Vec<String>, ContentError> {
    if !assets_root.is_dir() {
        return Ok(Vec::new());
    }
    let mut assets = Vec::new();
    for entry in WalkDir::new(assets_root).follow_links(true) {
        let entry = entry.map_err(|e| ContentError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(assets_root) {
            assets.push(to_url_path(rel));
        }
    }
    assets.sort();
    Ok(assets)
}

/// Forward-slash form of a relative path, for use in URLs.
fn to_url_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn validate_projects(projects: &[Project]) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for project in projects {
        if !seen.insert(project.id) {
            return Err(ContentError::DuplicateProject(project.id));
        }
        if project.title.trim().is_empty() {
            return Err(ContentError::Validation(format!(
                "project {} has an empty title",
                project.id
            )));
        }
        if project.category.eq_ignore_ascii_case(CategoryFilter::All.key()) {
            return Err(ContentError::Validation(format!(
                "project {} ({}) uses the reserved category name '{}'",
                project.id,
                project.title,
                project.category
            )));
        }
        if project.image.trim().is_empty() {
            return Err(ContentError::Validation(format!(
                "project {} ({}) has no image",
                project.id, project.title
            )));
        }
    }
    Ok(())
}

fn validate_skills(skills: &[Skill]) -> Result<(), ContentError> {
    match skills.iter().find(|s| s.level > 100) {
        Some(skill) => Err(ContentError::Validation(format!(
            "skill '{}' level {} is above 100",
            skill.name, skill.level
        ))),
        None => Ok(()),
    }
}

/// Fill in dimensions of a local project image, normalizing its path.
fn resolve_image(project: &mut Project, assets_root: &Path) -> Result<(), ContentError> {
    if project.is_remote_image() {
        return Ok(());
    }
    let rel = project
        .image
        .trim_start_matches('/')
        .trim_start_matches("assets/")
        .to_string();
    let path = assets_root.join(&rel);
    if !path.is_file() {
        return Err(ContentError::Validation(format!(
            "project {} image not found: {}",
            project.id,
            path.display()
        )));
    }
    if project.dimensions.is_none() {
        let dims = image::image_dimensions(&path).map_err(|source| ContentError::Image {
            path: path.clone(),
            source,
        })?;
        project.dimensions = Some(dims);
    }
    project.image = rel;
    Ok(())
}

/// Unique categories in first-seen order.
pub fn categories(projects: &[Project]) -> Vec<&str> {
    let mut seen = HashSet::new();
    projects
        .iter()
        .map(|p| p.category.as_str())
        .filter(|c| seen.insert(*c))
        .collect()
}

/// Gallery filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn matches(&self, project: &Project) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(c) => project.category == *c,
        }
    }

    /// Value written to `data-filter` on the filter buttons.
    pub fn key(&self) -> &str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Category(c) => c,
        }
    }
}

/// Projects matching `filter`, in their original order.
pub fn filter_projects<'a>(projects: &'a [Project], filter: &CategoryFilter) -> Vec<&'a Project> {
    projects.iter().filter(|p| filter.matches(p)).collect()
}
