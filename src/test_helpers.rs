//! Shared test utilities for the byline test suite.
//!
//! Builders for registry and corpus data, plus a fixture writer that lays out
//! a small site on disk for scan/generate tests.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let registry = Registry::new(vec![profile("Alice", "alice")]);
//! let corpus = PostCorpus::new(vec![post("hello", "2024-01-01", Some("Alice"), None)]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::people::Profile;
use crate::posts::Post;
use crate::scan::parse_date;

// =========================================================================
// Builders
// =========================================================================

pub fn profile(name: &str, slug: &str) -> Profile {
    Profile::new(name, slug)
}

/// A post with the given slug and `YYYY-MM-DD` date. Panics on a bad date.
pub fn post(slug: &str, date: &str, author: Option<&str>, contributor: Option<&str>) -> Post {
    Post {
        title: format!("Post {slug}"),
        slug: slug.to_string(),
        date: parse_date(date).unwrap_or_else(|| panic!("bad test date '{date}'")),
        author: author.map(str::to_string),
        contributor: contributor.map(str::to_string),
        categories: Vec::new(),
        excerpt: String::new(),
        url: format!("/{slug}/"),
        source_path: format!("{slug}.md"),
    }
}

// =========================================================================
// Fixture site
// =========================================================================

pub const FIXTURE_CONFIG: &str = r#"
title = "Fixture Academy"

[founder]
name = "Jane Doe"

[index]
per_page = 2

[authors."Jane Doe"]
slug = "jane-doe"
image = "/img/jane.jpg"
academies = { wsa = true, fta = true }
specialties = ["security"]

[authors."Max Mustermann"]
slug = "max"

[contributors."John Roe"]
slug = "john-roe"
academies = { fta = true }

[contributors."Ann Lee"]
slug = "ann-lee"
"#;

/// Write a fixture site: config plus five posts (one podcast).
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    tmp
}

pub fn write_site(root: &Path) {
    fs::write(root.join("config.toml"), FIXTURE_CONFIG).unwrap();
    let posts = [
        ("xss.md", "XSS basics", "2024-01-05", "Jane Doe", Some("John Roe"), "Security"),
        ("csrf.md", "CSRF explained", "2024-02-10", "Jane Doe", Some("John Roe"), "Security"),
        ("e2e.md", "E2E testing", "2024-03-15", "Jane Doe", Some("Ann Lee"), "Testing"),
        ("unit.md", "Unit tests", "2024-04-01", "Max Mustermann", None, "Testing"),
        ("ep1.md", "Episode 1", "2024-05-01", "Jane Doe", None, "Podcast"),
    ];
    let dir = root.join("posts");
    fs::create_dir_all(&dir).unwrap();
    for (file, title, date, author, contributor, category) in posts {
        let contributor_line = contributor
            .map(|c| format!("contributor = \"{c}\"\n"))
            .unwrap_or_default();
        let content = format!(
            "+++\ntitle = \"{title}\"\ndate = {date}\nauthor = \"{author}\"\n{contributor_line}categories = [\"{category}\"]\n+++\n\nAbout {title}.\n"
        );
        fs::write(dir.join(file), content).unwrap();
    }
}
