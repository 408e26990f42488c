//! CLI output formatting for `check` and `build`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (project,
//! timeline entry, asset) leads with its positional index and title; file
//! paths and build decisions follow as indented context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Projects
//! 001 Gallery on the Hill [Public]
//!     Image: https://images.example.com/gallery-on-the-hill.jpg (remote)
//! 002 Timber House [Residential]
//!     Image: projects/timber-house.png (16x12)
//!
//! Categories
//!     Public, Residential, Renewal
//!
//! Experience
//! 001 Senior Architect, A+ Architects (2022 - Present)
//!
//! About
//!     about.md: I work where sustainable strategy meets contemporary form...
//!
//! Assets
//!     1 file
//! ```
//!
//! ## Build
//!
//! ```text
//! Sections → index.html
//!     #home #portfolio #about #experience #contact
//! 001 Gallery on the Hill → #project-1 (eager)
//! 004 Courtyard Homes → #project-4 (lazy)
//!
//! Assets
//!     projects/timber-house.png → assets/projects/timber-house.3f9a1c2e.png
//!
//! Generated 5 sections, 4 projects (3 eager), 1 asset
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::content::Site;
use crate::generate::GenerateSummary;
use crate::types::is_remote;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Plain text of the first markdown paragraph, headings skipped.
fn first_paragraph(markdown: &str) -> String {
    let mut text = String::new();
    let mut in_paragraph = false;
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => break,
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }
    text
}

// ============================================================================
// check
// ============================================================================

/// Format the content inventory shown by `check` and before `build`.
pub fn format_content_output(site: &Site) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Projects".to_string());
    if site.projects.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, project) in site.projects.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            project.title,
            project.category
        ));
        let detail = match project.dimensions {
            _ if is_remote(&project.image) => "remote".to_string(),
            Some((w, h)) => format!("{w}x{h}"),
            None => "local".to_string(),
        };
        lines.push(format!("{}Image: {} ({})", indent(1), project.image, detail));
    }

    let categories = site.categories();
    if !categories.is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        lines.push(format!("{}{}", indent(1), categories.join(", ")));
    }

    if !site.experience.is_empty() {
        lines.push(String::new());
        lines.push("Experience".to_string());
        for (i, entry) in site.experience.iter().enumerate() {
            lines.push(format!(
                "{} {}, {} ({})",
                format_index(i + 1),
                entry.role,
                entry.company,
                entry.period
            ));
        }
    }

    lines.push(String::new());
    lines.push("About".to_string());
    match &site.about {
        Some(markdown) => lines.push(format!(
            "{}about.md: {}",
            indent(1),
            truncate_desc(&first_paragraph(markdown), 60)
        )),
        None => lines.push(format!(
            "{}site.toml: {}",
            indent(1),
            plural(site.person.bio.len(), "bio paragraph")
        )),
    }

    lines.push(String::new());
    lines.push("Assets".to_string());
    lines.push(format!("{}{}", indent(1), plural(site.assets.len(), "file")));

    lines
}

pub fn print_content_output(site: &Site) {
    for line in format_content_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the result of generation: sections, per-project load priority and
/// asset fingerprints.
pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Sections \u{2192} index.html".to_string());
    let anchors: Vec<String> = summary
        .sections
        .iter()
        .map(|s| format!("#{}", s.id()))
        .collect();
    lines.push(format!("{}{}", indent(1), anchors.join(" ")));

    for (i, project) in summary.projects.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} #project-{} ({})",
            format_index(i + 1),
            project.title,
            project.id,
            if project.eager { "eager" } else { "lazy" }
        ));
    }

    if !summary.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for (src, dst) in &summary.assets {
            lines.push(format!("{}{} \u{2192} {}", indent(1), src, dst));
        }
    }

    let eager = summary.projects.iter().filter(|p| p.eager).count();
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {} ({} eager), {}",
        plural(summary.sections.len(), "section"),
        plural(summary.projects.len(), "project"),
        eager,
        plural(summary.assets.len(), "asset")
    ));

    lines
}

pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content;
    use crate::generate::ProjectEntry;
    use crate::test_helpers::*;
    use crate::types::Section;
    use std::collections::BTreeMap;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("m²m²m²", 2), "m²...");
    }

    #[test]
    fn first_paragraph_skips_heading_and_markup() {
        let md = "# About\n\nI work where **strategy**\nmeets form.\n\nSecond.";
        assert_eq!(first_paragraph(md), "I work where strategy meets form.");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(0, "file"), "0 files");
    }

    // =========================================================================
    // check
    // =========================================================================

    #[test]
    fn content_output_lists_projects() {
        let tmp = setup_content();
        let site = content::load(tmp.path()).unwrap();
        let lines = format_content_output(&site);

        assert_eq!(lines[0], "Projects");
        assert_eq!(lines[1], "001 Gallery on the Hill [Public]");
        assert!(lines[2].ends_with("(remote)"));
        assert!(lines.contains(&"002 Timber House [Residential]".to_string()));
        assert!(lines.contains(&"    Image: projects/timber-house.png (16x12)".to_string()));
        assert!(lines.contains(&"    Public, Residential, Renewal".to_string()));
        assert!(lines.contains(&"001 Senior Architect, A+ Architects (2022 - Present)".to_string()));
        assert!(lines.contains(&"    1 file".to_string()));
    }

    #[test]
    fn content_output_about_preview() {
        let tmp = setup_content();
        let site = content::load(tmp.path()).unwrap();
        let lines = format_content_output(&site);
        let about = lines.iter().find(|l| l.contains("about.md:")).unwrap();
        assert!(about.contains("I work where sustainable strategy"));
        assert!(about.ends_with("..."));
    }

    #[test]
    fn content_output_without_about_counts_bio() {
        let tmp = setup_content();
        let mut site = content::load(tmp.path()).unwrap();
        site.about = None;
        let lines = format_content_output(&site);
        assert!(lines.contains(&"    site.toml: 2 bio paragraphs".to_string()));
    }

    #[test]
    fn content_output_no_projects() {
        let tmp = setup_content();
        let mut site = content::load(tmp.path()).unwrap();
        site.projects.clear();
        let lines = format_content_output(&site);
        assert_eq!(lines[1], "    (none)");
        assert!(!lines.contains(&"Categories".to_string()));
    }

    // =========================================================================
    // build
    // =========================================================================

    fn summary() -> GenerateSummary {
        let mut assets = BTreeMap::new();
        assets.insert(
            "projects/timber-house.png".to_string(),
            "assets/projects/timber-house.3f9a1c2e.png".to_string(),
        );
        GenerateSummary {
            title: "Lin Mei · Portfolio".to_string(),
            sections: Section::ALL.to_vec(),
            categories: vec!["Public".into(), "Residential".into()],
            projects: vec![
                ProjectEntry {
                    id: 1,
                    title: "Gallery on the Hill".into(),
                    category: "Public".into(),
                    eager: true,
                },
                ProjectEntry {
                    id: 4,
                    title: "Courtyard Homes".into(),
                    category: "Residential".into(),
                    eager: false,
                },
            ],
            experience: 2,
            assets,
        }
    }

    #[test]
    fn generate_output_sections_line() {
        let lines = format_generate_output(&summary());
        assert_eq!(lines[0], "Sections \u{2192} index.html");
        assert_eq!(lines[1], "    #home #portfolio #about #experience #contact");
    }

    #[test]
    fn generate_output_marks_priority() {
        let lines = format_generate_output(&summary());
        assert_eq!(lines[2], "001 Gallery on the Hill \u{2192} #project-1 (eager)");
        assert_eq!(lines[3], "002 Courtyard Homes \u{2192} #project-4 (lazy)");
    }

    #[test]
    fn generate_output_assets_and_totals() {
        let lines = format_generate_output(&summary());
        assert!(lines.contains(
            &"    projects/timber-house.png \u{2192} assets/projects/timber-house.3f9a1c2e.png"
                .to_string()
        ));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 5 sections, 2 projects (1 eager), 1 asset"
        );
    }

    #[test]
    fn generate_output_without_assets() {
        let mut s = summary();
        s.assets.clear();
        let lines = format_generate_output(&s);
        assert!(!lines.contains(&"Assets".to_string()));
        assert!(lines.last().unwrap().ends_with("0 assets"));
    }
}
