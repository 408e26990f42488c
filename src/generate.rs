//! HTML site generation.
//!
//! Renders the loaded [`Site`] into a single `index.html`, copies local assets
//! under fingerprinted names, and writes a `site.json` build manifest.
//!
//! ## Page Layout
//!
//! ```text
//! nav        fixed header, section links, active-section highlight
//! #home      hero: name, title, tagline, calls to action, stats
//! #portfolio category filter, project cards, detail dialogs
//! #about     bio (markdown), quote, skills, portrait
//! #experience timeline
//! #contact   details, social links, mailto form
//! footer
//! ```
//!
//! ## Scroll Behavior
//!
//! The page script realizes the [`visibility`](crate::visibility) contract in
//! the browser. The Rust side decides everything that can be decided at build
//! time and hands it over as data attributes:
//!
//! - **Reveal blocks** (`data-reveal`) carry threshold, root margin and the
//!   one-shot flag from `[reveal]`; they start in their untriggered
//!   [`RevealState`], children carry a `--reveal-delay` from [`Stagger`].
//! - **Media** (`data-media`) carry the `[lazy_images]` observer options and
//!   their initial [`MediaLoadState`]. Gallery images within `eager_images`
//!   are [`Priority::Eager`] and get a real `src`; the rest get `data-src` and
//!   a placeholder until the observer fires.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── site.json                       # Build manifest
//! └── assets/
//!     └── projects/
//!         └── timber-house.3f9a1c2e.png   # Fingerprinted copy
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors and theme injected from config)
//! - `static/page.js`: Reveal, lazy loading, filter, dialogs, section spy

use crate::config::{self, SiteConfig};
use crate::content::{self, ASSETS_DIR, CategoryFilter, Site};
use crate::types::{Experience, Project, Section, Skill, Stat, is_remote};
use crate::visibility::spy::DEFAULT_PROBE_OFFSET;
use crate::visibility::{
    MediaLoadState, Priority, RevealState, Stagger, VisibilityConfig, VisibilityError,
    VisibilityState, reveal_state, should_begin_load,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Visibility config error: {0}")]
    Visibility(#[from] VisibilityError),
}

/// Build manifest written to `site.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSummary {
    pub title: String,
    pub sections: Vec<Section>,
    pub categories: Vec<String>,
    pub projects: Vec<ProjectEntry>,
    pub experience: usize,
    /// Source path (relative to `assets/`) → output path.
    pub assets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub eager: bool,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/page.js");

pub fn generate(
    site: &Site,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<GenerateSummary, GenerateError> {
    fs::create_dir_all(output_dir)?;

    let assets = copy_assets(&source_dir.join(ASSETS_DIR), &site.assets, output_dir)?;
    debug!(count = assets.len(), "copied assets");

    let ctx = PageContext::new(site, &assets)?;
    let page = render_page(&ctx);
    fs::write(output_dir.join("index.html"), page.into_string())?;
    info!("generated index.html");

    let summary = GenerateSummary {
        title: page_title(site),
        sections: Section::ALL.to_vec(),
        categories: site.categories().into_iter().map(String::from).collect(),
        projects: site
            .projects
            .iter()
            .enumerate()
            .map(|(idx, p)| ProjectEntry {
                id: p.id,
                title: p.title.clone(),
                category: p.category.clone(),
                eager: ctx.gallery_priority(idx) == Priority::Eager,
            })
            .collect(),
        experience: site.experience.len(),
        assets,
    };
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(output_dir.join("site.json"), json)?;

    info!("site generated at {}", output_dir.display());
    Ok(summary)
}

// ============================================================================
// Assets
// ============================================================================

/// Copy assets into `output/assets/` in parallel, fingerprinting each name
/// with a content hash so browsers can cache them indefinitely.
fn copy_assets(
    assets_root: &Path,
    files: &[String],
    output_dir: &Path,
) -> Result<BTreeMap<String, String>, GenerateError> {
    let copied: Vec<std::io::Result<(String, String)>> = files
        .par_iter()
        .map(|rel| {
            let bytes = fs::read(assets_root.join(rel))?;
            let hashed = fingerprinted_name(rel, &bytes);
            let dst = output_dir.join(ASSETS_DIR).join(&hashed);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dst, &bytes)?;
            Ok((rel.clone(), format!("{ASSETS_DIR}/{hashed}")))
        })
        .collect();
    Ok(copied.into_iter().collect::<std::io::Result<_>>()?)
}

/// `projects/house.png` → `projects/house.<8 hex>.png`.
pub fn fingerprinted_name(rel: &str, bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    let short = &digest[..8];
    let (dir, file) = match rel.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, rel),
    };
    let named = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}.{short}.{ext}"),
        _ => format!("{file}.{short}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{named}"),
        None => named,
    }
}

// ============================================================================
// Page context
// ============================================================================

/// Everything a renderer needs, resolved once.
struct PageContext<'a> {
    site: &'a Site,
    assets: &'a BTreeMap<String, String>,
    css: String,
    reveal: VisibilityConfig,
    media: VisibilityConfig,
    stagger: Stagger,
}

impl<'a> PageContext<'a> {
    fn new(site: &'a Site, assets: &'a BTreeMap<String, String>) -> Result<Self, GenerateError> {
        let config = &site.config;
        let css = format!(
            "{}\n\n{}\n\n{}",
            config::generate_color_css(&config.colors),
            config::generate_theme_css(&config.theme),
            CSS_STATIC
        );
        Ok(Self {
            site,
            assets,
            css,
            reveal: config.reveal.visibility_config()?,
            media: config.lazy_images.visibility_config()?,
            stagger: Stagger::from_millis(config.reveal.stagger_ms),
        })
    }

    fn config(&self) -> &SiteConfig {
        &self.site.config
    }

    /// Output URL of an image source: remote URLs pass through, local paths
    /// map to their fingerprinted copy.
    fn asset_url(&self, src: &str) -> String {
        if is_remote(src) {
            return src.to_string();
        }
        let rel = src.trim_start_matches('/').trim_start_matches("assets/");
        self.assets
            .get(rel)
            .cloned()
            .unwrap_or_else(|| src.to_string())
    }

    fn gallery_priority(&self, index: usize) -> Priority {
        if index < self.config().lazy_images.eager_images {
            Priority::Eager
        } else {
            Priority::Lazy
        }
    }
}

fn page_title(site: &Site) -> String {
    format!("{} · {}", site.person.name, site.config.site_title)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Closed set of button styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Outline,
    Ghost,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSize {
    Sm,
    Md,
    Lg,
}

impl ButtonVariant {
    fn class(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "btn-primary",
            ButtonVariant::Secondary => "btn-secondary",
            ButtonVariant::Outline => "btn-outline",
            ButtonVariant::Ghost => "btn-ghost",
            ButtonVariant::Link => "btn-link",
        }
    }
}

impl ButtonSize {
    fn class(self) -> &'static str {
        match self {
            ButtonSize::Sm => "btn-sm",
            ButtonSize::Md => "btn-md",
            ButtonSize::Lg => "btn-lg",
        }
    }
}

pub fn button_class(variant: ButtonVariant, size: ButtonSize) -> String {
    format!("btn {} {}", variant.class(), size.class())
}

/// Renders the base HTML document structure
fn base_document(ctx: &PageContext, content: Markup) -> Markup {
    let config = ctx.config();
    let title = page_title(ctx.site);
    let description = ctx
        .site
        .person
        .tagline
        .clone()
        .unwrap_or_else(|| ctx.site.person.title.clone());
    html! {
        (DOCTYPE)
        html lang=(config.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(description);
                meta property="og:title" content=(title);
                meta property="og:description" content=(description);
                meta property="og:type" content="website";
                @if let Some(base) = &config.base_url {
                    link rel="canonical" href=(base);
                    meta property="og:url" content=(base);
                }
                style { (PreEscaped(&ctx.css)) }
                noscript {
                    style { (PreEscaped(".reveal{opacity:1;transform:none}")) }
                }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Attributes shared by every reveal block.
fn reveal_block(ctx: &PageContext, tag_class: &str, id: Option<&str>, content: Markup) -> Markup {
    let initial = reveal_state(VisibilityState::default());
    html! {
        section id=[id] class={ (tag_class) " " (initial.css_class()) }
            data-reveal
            data-threshold=(ctx.reveal.threshold.to_attr())
            data-root-margin=(ctx.reveal.root_margin.to_string())
            data-once=(ctx.reveal.trigger_once) {
            (content)
        }
    }
}

/// Renders the fixed navigation header
fn render_nav(ctx: &PageContext, current: Section) -> Markup {
    html! {
        header.site-header {
            a.brand href="#home" { (ctx.site.person.name) }
            input.nav-toggle type="checkbox" id="nav-toggle";
            label.nav-hamburger for="nav-toggle" aria-label="Menu" {
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            nav.site-nav data-probe-offset=(DEFAULT_PROBE_OFFSET) {
                ul {
                    @for section in Section::ALL {
                        li {
                            a href={ "#" (section.id()) }
                                data-section=(section.id())
                                class=[(section == current).then_some("current")] {
                                (section.label())
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A deferred media element.
fn render_media(
    ctx: &PageContext,
    src: &str,
    alt: &str,
    aspect_ratio: Option<f64>,
    priority: Priority,
) -> Markup {
    let url = ctx.asset_url(src);
    let load_now = should_begin_load(VisibilityState::default(), priority);
    let state = if load_now {
        MediaLoadState::Loading
    } else {
        MediaLoadState::Idle
    };
    let style = aspect_ratio.map(|r| format!("aspect-ratio: {r:.4}"));
    html! {
        div.media data-media=(state.as_str())
            data-threshold=(ctx.media.threshold.to_attr())
            data-root-margin=(ctx.media.root_margin.to_string())
            style=[style] {
            @if load_now {
                img src=(url) alt=(alt) loading=(priority.loading_attr()) decoding="async";
            } @else {
                img data-src=(url) alt=(alt) loading=(priority.loading_attr()) decoding="async";
            }
            div.media-placeholder aria-hidden="true" {}
            div.media-fallback hidden {
                span { "Image failed to load" }
                button type="button" class={ "media-retry " (button_class(ButtonVariant::Outline, ButtonSize::Sm)) } {
                    "Retry"
                }
            }
        }
    }
}

fn render_hero(ctx: &PageContext) -> Markup {
    let person = &ctx.site.person;
    html! {
        section id="home" class={ "hero " (RevealState::Revealed.css_class()) } {
            div.hero-inner {
                p.hero-eyebrow { (person.title) }
                h1.hero-name { (person.name) }
                @if let Some(tagline) = &person.tagline {
                    p.hero-tagline { (tagline) }
                }
                div.hero-actions {
                    a href="#portfolio" class=(button_class(ButtonVariant::Primary, ButtonSize::Lg)) { "View work" }
                    a href="#contact" class=(button_class(ButtonVariant::Outline, ButtonSize::Lg)) { "Get in touch" }
                }
                @if !ctx.site.stats.is_empty() {
                    (render_stats(&ctx.site.stats))
                }
            }
            a.scroll-cue href="#portfolio" aria-label="Scroll to work" {}
        }
    }
}

fn render_stats(stats: &[Stat]) -> Markup {
    html! {
        dl.stats {
            @for stat in stats {
                div.stat {
                    dt { (stat.label) }
                    dd { (stat.value) }
                }
            }
        }
    }
}

fn render_portfolio(ctx: &PageContext) -> Markup {
    let categories = ctx.site.categories();
    let filters: Vec<CategoryFilter> = std::iter::once(CategoryFilter::All)
        .chain(categories.iter().map(|c| CategoryFilter::Category(c.to_string())))
        .collect();
    let active = CategoryFilter::default();

    let content = html! {
        header.section-header {
            h2 { "Selected Work" }
            p.section-lede { "Each project is a reading of its site, its light, and the life it will hold." }
        }
        div.filters role="toolbar" aria-label="Filter projects" {
            @for filter in &filters {
                @let is_active = *filter == active;
                @let variant = if is_active { ButtonVariant::Primary } else { ButtonVariant::Ghost };
                button type="button" class=(button_class(variant, ButtonSize::Sm))
                    data-filter=(filter.key()) aria-pressed=(is_active) {
                    @match filter {
                        CategoryFilter::All => { "All" }
                        CategoryFilter::Category(c) => { (c) }
                    }
                }
            }
        }
        div.project-grid data-stagger-ms=(ctx.config().reveal.stagger_ms) {
            @for (idx, project) in content::filter_projects(&ctx.site.projects, &active).into_iter().enumerate() {
                (render_project_card(ctx, project, idx))
            }
        }
        @for project in &ctx.site.projects {
            (render_project_dialog(ctx, project))
        }
    };
    reveal_block(ctx, "portfolio", Some(Section::Portfolio.id()), content)
}

fn render_project_card(ctx: &PageContext, project: &Project, index: usize) -> Markup {
    html! {
        article.project-card data-category=(project.category) style=(ctx.stagger.style(index)) {
            (render_media(ctx, &project.image, &project.title, project.aspect_ratio().or(Some(4.0 / 3.0)), ctx.gallery_priority(index)))
            div.project-body {
                @if project.featured {
                    span.badge { "Featured" }
                }
                p.project-category { (project.category) }
                h3.project-title { (project.title) }
                p.project-meta {
                    @if let Some(year) = &project.year { span { (year) } }
                    @if let Some(location) = &project.location { span { (location) } }
                }
                button type="button" class=(button_class(ButtonVariant::Link, ButtonSize::Sm))
                    data-dialog=(project.dialog_id()) {
                    "View details"
                }
            }
        }
    }
}

/// Declarative detail overlay built from project data.
pub fn render_project_dialog_markup(project: &Project, media: Markup) -> Markup {
    html! {
        dialog.project-dialog id=(project.dialog_id()) aria-labelledby={ (project.dialog_id()) "-title" } {
            form method="dialog" {
                button.dialog-close type="submit" aria-label="Close" { "×" }
            }
            (media)
            div.dialog-body {
                p.project-category { (project.category) }
                h3 id={ (project.dialog_id()) "-title" } { (project.title) }
                p { (project.description) }
                dl.project-facts {
                    @if let Some(year) = &project.year {
                        dt { "Year" } dd { (year) }
                    }
                    @if let Some(location) = &project.location {
                        dt { "Location" } dd { (location) }
                    }
                    @if let Some(area) = &project.area {
                        dt { "Area" } dd { (area) }
                    }
                    dt { "Status" } dd { (project.status.label()) }
                }
                @if !project.tags.is_empty() {
                    ul.tags {
                        @for tag in &project.tags { li { (tag) } }
                    }
                }
            }
        }
    }
}

fn render_project_dialog(ctx: &PageContext, project: &Project) -> Markup {
    // Dialog images wait for the dialog to open, whatever the gallery priority.
    let media = render_media(ctx, &project.image, &project.title, project.aspect_ratio(), Priority::Lazy);
    render_project_dialog_markup(project, media)
}

fn render_about(ctx: &PageContext) -> Markup {
    let person = &ctx.site.person;
    let bio_html = ctx.site.about.as_deref().map(markdown_to_html);
    let content = html! {
        div.about-grid {
            div.about-text {
                h2 { "About" }
                @if let Some(body) = &bio_html {
                    div.prose { (PreEscaped(body)) }
                } @else {
                    @for paragraph in &person.bio {
                        p { (paragraph) }
                    }
                }
                @if let Some(quote) = &person.quote {
                    blockquote.quote { (quote) }
                }
                @if let Some(resume) = &person.resume {
                    a href=(ctx.asset_url(resume)) class=(button_class(ButtonVariant::Secondary, ButtonSize::Md)) download {
                        "Download résumé"
                    }
                }
            }
            @if let Some(avatar) = &person.avatar {
                div.about-portrait {
                    (render_media(ctx, avatar, &person.name, Some(4.0 / 5.0), Priority::Lazy))
                }
            }
        }
        @if !ctx.site.skills.is_empty() {
            (render_skills(ctx, &ctx.site.skills))
        }
    };
    reveal_block(ctx, "about", Some(Section::About.id()), content)
}

fn render_skills(ctx: &PageContext, skills: &[Skill]) -> Markup {
    html! {
        ul.skills {
            @for (idx, skill) in skills.iter().enumerate() {
                li.skill style={ (ctx.stagger.style(idx)) "; --level: " (skill.level) "%" } {
                    span.skill-name { (skill.name) }
                    @if let Some(category) = &skill.category {
                        span.skill-category { (category) }
                    }
                    span.skill-bar role="meter" aria-valuenow=(skill.level) aria-valuemin="0" aria-valuemax="100" {}
                }
            }
        }
    }
}

fn render_experience(ctx: &PageContext) -> Markup {
    let content = html! {
        header.section-header {
            h2 { "Experience" }
        }
        ol.timeline {
            @for (idx, entry) in ctx.site.experience.iter().enumerate() {
                (render_timeline_entry(ctx, entry, idx))
            }
        }
    };
    reveal_block(ctx, "experience", Some(Section::Experience.id()), content)
}

fn render_timeline_entry(ctx: &PageContext, entry: &Experience, index: usize) -> Markup {
    html! {
        li.timeline-entry style=(ctx.stagger.style(index)) {
            p.timeline-period { (entry.period) }
            h3.timeline-role { (entry.role) }
            p.timeline-company {
                @if let Some(url) = &entry.url {
                    a href=(url) target="_blank" rel="noopener" { (entry.company) }
                } @else {
                    (entry.company)
                }
                @if let Some(location) = &entry.location {
                    " · " (location)
                }
            }
            p { (entry.description) }
            @if !entry.achievements.is_empty() {
                ul.achievements {
                    @for item in &entry.achievements { li { (item) } }
                }
            }
            @if !entry.technologies.is_empty() {
                ul.tags {
                    @for tech in &entry.technologies { li { (tech) } }
                }
            }
        }
    }
}

fn render_contact(ctx: &PageContext) -> Markup {
    let contact = &ctx.site.contact;
    let content = html! {
        header.section-header {
            h2 { "Contact" }
            @if let Some(availability) = &contact.availability {
                p.section-lede { (availability) }
            }
        }
        div.contact-grid {
            dl.contact-details {
                dt { "Email" }
                dd { a href={ "mailto:" (contact.email) } { (contact.email) } }
                @if let Some(phone) = &contact.phone {
                    dt { "Phone" }
                    dd { a href={ "tel:" (phone.replace(' ', "")) } { (phone) } }
                }
                @if let Some(address) = &contact.address {
                    dt { "Studio" }
                    dd { (address) }
                }
            }
            // No backend: the form hands off to the visitor's mail client.
            form.contact-form action={ "mailto:" (contact.email) } method="post" enctype="text/plain" {
                label { "Name" input type="text" name="name" required; }
                label { "Email" input type="email" name="email" required; }
                label { "Subject" input type="text" name="subject"; }
                label { "Message" textarea name="message" rows="5" required {} }
                button type="submit" class=(button_class(ButtonVariant::Primary, ButtonSize::Lg)) { "Send" }
            }
        }
        @let links = contact.social.links();
        @if !links.is_empty() {
            ul.social {
                @for (label, url) in links {
                    li { a href=(url) target="_blank" rel="noopener" { (label) } }
                }
            }
        }
    };
    reveal_block(ctx, "contact", Some(Section::Contact.id()), content)
}

fn render_footer(ctx: &PageContext) -> Markup {
    html! {
        footer.site-footer {
            p { "© " (ctx.site.person.name) " · " (ctx.config().site_title) }
        }
    }
}

fn render_page(ctx: &PageContext) -> Markup {
    let content = html! {
        (render_nav(ctx, Section::Home))
        main {
            (render_hero(ctx))
            (render_portfolio(ctx))
            (render_about(ctx))
            (render_experience(ctx))
            (render_contact(ctx))
        }
        (render_footer(ctx))
    };
    base_document(ctx, content)
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

// ============================================================================
// Tests
// ============================================================================
