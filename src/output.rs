//! CLI output formatting for all pipeline stages.
//!
//! Every entity (post, person, page) is shown by its identity first, with
//! paths and details as indented context lines:
//!
//! ## Scan
//!
//! ```text
//! Posts
//! 001 XSS basics (2024-01-05)
//!     Source: xss.md
//!     Author: Jane Doe
//!     Contributor: John Roe
//!
//! Authors
//! 001 Jane Doe (4 posts, expert)
//!     Slug: jane-doe
//!     Academies: wsa, fta
//!
//! Config
//!     site/config.toml
//! Snapshot: 3f2a…
//! ```
//!
//! ## Generate
//!
//! ```text
//! index → index.html
//! author → authors/jane-doe/index.html
//! Failed: authors/max/index.html (Not a directory)
//!
//! Generated 7 pages, 1 failed
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::config::SiteConfig;
use crate::directory::{Authors, Contributors, Kind, PersonDirectory};
use crate::fragments::Academy;
use crate::generate::GenerateReport;
use crate::helpers::{Helpers, LookupError};
use crate::people::{Academies, Registry};
use crate::posts::PostCorpus;
use crate::scan::Manifest;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 Jane Doe (4 posts, expert)
/// 001 XSS basics
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn academy_codes(academies: Academies) -> Vec<&'static str> {
    Academy::ALL
        .into_iter()
        .filter(|a| a.is_member(academies))
        .map(|a| a.code())
        .collect()
}

/// One section per person kind: header, then each person with post count,
/// level, slug and memberships.
fn people_section<K: Kind>(config: &SiteConfig, corpus: &PostCorpus) -> Vec<String> {
    let directory = PersonDirectory::<K>::from_config(config, corpus);
    let registry: &Registry = directory.registry();
    if registry.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!("{}s", K::TITLE)];
    for (i, profile) in registry.iter().enumerate() {
        let record = directory.leveled(profile);
        let detail = format!("{}, {}", plural(record.posts_count, "post"), record.level);
        lines.push(entity_header(i + 1, &profile.name, Some(&detail)));
        lines.push(format!("{}Slug: {}", indent(1), profile.slug.trim()));
        let codes = academy_codes(profile.academies);
        if !codes.is_empty() {
            lines.push(format!("{}Academies: {}", indent(1), codes.join(", ")));
        }
        if record.is_founder {
            lines.push(format!("{}Founder", indent(1)));
        }
    }
    lines.push(String::new());
    lines
}

// ============================================================================
// Scan output
// ============================================================================

pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !manifest.posts.is_empty() {
        lines.push("Posts".to_string());
        for (i, post) in manifest.posts.iter().enumerate() {
            let date = post.date.format("%Y-%m-%d").to_string();
            lines.push(entity_header(i + 1, &post.title, Some(&date)));
            lines.push(format!("{}Source: {}", indent(1), post.source_path));
            if let Some(author) = &post.author {
                lines.push(format!("{}Author: {}", indent(1), author));
            }
            if let Some(contributor) = &post.contributor {
                lines.push(format!("{}Contributor: {}", indent(1), contributor));
            }
        }
        lines.push(String::new());
    }

    lines.extend(people_section::<Authors>(&manifest.config, &manifest.posts));
    lines.extend(people_section::<Contributors>(&manifest.config, &manifest.posts));

    lines.push("Config".to_string());
    lines.push(format!(
        "{}{}",
        indent(1),
        source_root.join("config.toml").display()
    ));
    lines.push(format!("Snapshot: {}", manifest.snapshot));
    lines
}

pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate output
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .written
        .iter()
        .map(|route| format!("{} → {}", route.layout, route.path))
        .collect();
    for (path, error) in &report.failed {
        lines.push(format!("Failed: {} ({})", path, error));
    }

    lines.push(String::new());
    let mut summary = format!("Generated {}", plural(report.written.len(), "page"));
    if !report.failed.is_empty() {
        summary.push_str(&format!(", {} failed", report.failed.len()));
    }
    lines.push(summary);
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

fn integrity_section<K: Kind>(config: &SiteConfig, corpus: &PostCorpus) -> Vec<String> {
    let directory = PersonDirectory::<K>::from_config(config, corpus);
    let mut lines = Vec::new();
    for (slug, names) in directory.registry().duplicate_slugs() {
        lines.push(format!(
            "Duplicate {} slug '{}': {}",
            K::SINGULAR,
            slug,
            names.join(", ")
        ));
    }
    for name in directory.unregistered_names() {
        lines.push(format!("Unregistered {}: {}", K::SINGULAR, name));
    }
    lines
}

/// Registry integrity report. Duplicate slugs are errors (two people would
/// share one page); unregistered names are informational.
pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = integrity_section::<Authors>(&manifest.config, &manifest.posts);
    lines.extend(integrity_section::<Contributors>(
        &manifest.config,
        &manifest.posts,
    ));
    if lines.is_empty() {
        lines.push("No registry problems found".to_string());
    }
    lines
}

pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Lookup output
// ============================================================================

/// Run the render-time helpers for one name, as a template would.
pub fn format_lookup_output<K: Kind>(
    helpers: &Helpers<'_, K>,
    name: &str,
) -> Result<Vec<String>, LookupError> {
    let url = helpers.url_for(name)?;
    let level = helpers
        .level_for(name)?
        .map(|l| l.to_string())
        .unwrap_or_else(|| "-".to_string());
    let badges = helpers.badges_for(name, None)?.into_string();

    Ok(vec![
        format!("{} ({})", name, K::SINGULAR),
        format!("{}URL: {}", indent(1), url),
        format!("{}Level: {}", indent(1), level),
        format!(
            "{}Badges: {}",
            indent(1),
            if badges.is_empty() { "-" } else { &badges }
        ),
    ])
}

pub fn print_lookup_output<K: Kind>(helpers: &Helpers<'_, K>, name: &str) -> Result<(), LookupError> {
    for line in format_lookup_output(helpers, name)? {
        println!("{}", line);
    }
    Ok(())
}
