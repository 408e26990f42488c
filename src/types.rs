//! Portfolio data records.
//!
//! These are read from the content directory once per build and are immutable
//! afterwards. Serialized back out as part of the `site.json` build manifest.

use serde::{Deserialize, Serialize};

/// Page sections, in document order.
///
/// A closed set: the navigation, the section ids in the generated HTML, and
/// the active-section spy all key on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Home,
    Portfolio,
    About,
    Experience,
    Contact,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::Portfolio,
        Section::About,
        Section::Experience,
        Section::Contact,
    ];

    /// HTML id / fragment.
    pub fn id(self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Portfolio => "portfolio",
            Section::About => "about",
            Section::Experience => "experience",
            Section::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::Portfolio => "Work",
            Section::About => "About",
            Section::Experience => "Experience",
            Section::Contact => "Contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Completed,
    Ongoing,
    Planned,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Ongoing => "Ongoing",
            ProjectStatus::Planned => "Planned",
        }
    }
}

/// A project in the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub category: String,
    /// Remote URL, or a path relative to the content `assets/` directory.
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub featured: bool,
    /// Pixel dimensions. Read from the file for local images; optional
    /// for remote ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,
}

impl Project {
    pub fn is_remote_image(&self) -> bool {
        is_remote(&self.image)
    }

    /// `width / height` for placeholder sizing, when known.
    pub fn aspect_ratio(&self) -> Option<f64> {
        match self.dimensions {
            Some((w, h)) if h > 0 => Some(w as f64 / h as f64),
            _ => None,
        }
    }

    /// Fragment id of the project's detail dialog.
    pub fn dialog_id(&self) -> String {
        format!("project-{}", self.id)
    }
}

/// `http(s)://` and protocol-relative URLs are left untouched.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//")
}

/// One entry in the experience timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Experience {
    pub role: String,
    pub company: String,
    /// Free-form period label, e.g. `"2019 - 2022"`.
    pub period: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    /// Paragraphs used when there is no `about.md`.
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub resume: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Social {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub website: Option<String>,
}

impl Social {
    /// `(label, url)` pairs for the links that are set.
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("GitHub", &self.github),
            ("LinkedIn", &self.linkedin),
            ("Instagram", &self.instagram),
            ("Website", &self.website),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.as_deref().map(|u| (label, u)))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub social: Social,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Skill {
    pub name: String,
    /// Proficiency, 0-100.
    pub level: u8,
    #[serde(default)]
    pub category: Option<String>,
}

/// Headline figures shown in the hero and about sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_ids_are_unique() {
        let mut ids: Vec<_> = Section::ALL.iter().map(|s| s.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), Section::ALL.len());
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://images.example.com/a.jpg"));
        assert!(is_remote("//cdn.example.com/a.jpg"));
        assert!(!is_remote("projects/a.jpg"));
    }

    #[test]
    fn project_status_defaults_to_completed() {
        let project: Project = toml::from_str(
            r#"
id = 1
title = "Gallery on the Hill"
category = "Public"
image = "https://example.com/a.jpg"
description = "A hilltop arts centre."
"#,
        )
        .unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert!(project.tags.is_empty());
        assert_eq!(project.aspect_ratio(), None);
        assert_eq!(project.dialog_id(), "project-1");
    }

    #[test]
    fn aspect_ratio_from_dimensions() {
        let mut project: Project = toml::from_str(
            r#"
id = 2
title = "T"
category = "C"
image = "a.png"
description = "D"
status = "ongoing"
"#,
        )
        .unwrap();
        project.dimensions = Some((1600, 1200));
        assert_eq!(project.status, ProjectStatus::Ongoing);
        assert!((project.aspect_ratio().unwrap() - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn social_links_skip_missing() {
        let social = Social {
            github: Some("https://github.com/x".into()),
            website: Some("https://x.dev".into()),
            ..Default::default()
        };
        assert_eq!(
            social.links(),
            vec![("GitHub", "https://github.com/x"), ("Website", "https://x.dev")]
        );
    }
}
