//! Site scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads the site configuration and every post
//! under `posts/`, producing a [`Manifest`] that the generate stage consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! site/
//! ├── config.toml                  # Site config + author/contributor registries
//! └── posts/
//!     ├── hello-world.md
//!     └── 2024/
//!         └── csrf-explained.md    # Subdirectories are fine
//! ```
//!
//! ## Post Format
//!
//! Each post starts with TOML front matter between `+++` fences:
//!
//! ```text
//! +++
//! title = "CSRF explained"
//! date = 2024-03-09
//! author = "Jane Doe"
//! contributor = "John Roe"
//! categories = ["Security"]
//! +++
//!
//! Intro paragraph, shown on the index.
//!
//! <!-- more -->
//!
//! The rest of the post.
//! ```
//!
//! `slug` defaults to the file stem. Posts with `draft = true` are skipped.
//! The excerpt is everything before `<!-- more -->`, or the first paragraph
//! when there is no marker.
//!
//! The corpus is ordered by date, then slug, so repeated scans of the same
//! content produce identical manifests.

use crate::config::{self, SiteConfig};
use crate::posts::{Post, PostCorpus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulldown_cmark::{Parser, html as md_html};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}: missing +++ front matter")]
    MissingFrontMatter(PathBuf),
    #[error("{path}: invalid front matter: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{path}: unrecognized date '{value}'")]
    InvalidDate { path: PathBuf, value: String },
}

/// Manifest output from the scan stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub config: SiteConfig,
    pub posts: PostCorpus,
    /// [`PostCorpus::snapshot_id`] at scan time
    pub snapshot: String,
}

const MORE_MARKER: &str = "<!-- more -->";

#[derive(Deserialize)]
struct FrontMatter {
    title: String,
    date: FrontDate,
    slug: Option<String>,
    author: Option<String>,
    contributor: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    draft: bool,
}

/// A bare TOML date (`date = 2024-03-09`) or a quoted string.
#[derive(Deserialize)]
#[serde(untagged)]
enum FrontDate {
    Datetime(toml::value::Datetime),
    Text(String),
}

impl FrontDate {
    fn text(&self) -> String {
        match self {
            FrontDate::Datetime(dt) => dt.to_string(),
            FrontDate::Text(s) => s.clone(),
        }
    }
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    // Load site config (uses defaults if config.toml doesn't exist)
    let config = config::load_config(root)?;
    let posts = PostCorpus::new(scan_posts(&root.join("posts"))?);
    let snapshot = posts.snapshot_id();
    debug!(posts = posts.len(), %snapshot, "scan complete");
    Ok(Manifest {
        config,
        posts,
        snapshot,
    })
}

/// Parse every `.md` file under `posts_dir`. A missing directory is an
/// empty corpus.
pub fn scan_posts(posts_dir: &Path) -> Result<Vec<Post>, ScanError> {
    if !posts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut posts = Vec::new();
    // Hidden directories are pruned whole, not just hidden files
    let walker = WalkDir::new(posts_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_markdown(path) {
            continue;
        }
        let rel = path
            .strip_prefix(posts_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        let content = fs::read_to_string(path)?;
        if let Some(post) = parse_post(path, &rel, &content)? {
            posts.push(post);
        } else {
            debug!(path = %rel, "skipping draft");
        }
    }

    posts.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.slug.cmp(&b.slug)));
    Ok(posts)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Parse one post. `Ok(None)` for drafts.
pub fn parse_post(path: &Path, rel_path: &str, content: &str) -> Result<Option<Post>, ScanError> {
    let (front, body) =
        split_front_matter(content).ok_or_else(|| ScanError::MissingFrontMatter(path.into()))?;
    let meta: FrontMatter = toml::from_str(front).map_err(|source| ScanError::FrontMatter {
        path: path.into(),
        source,
    })?;
    if meta.draft {
        return Ok(None);
    }

    let date_text = meta.date.text();
    let date = parse_date(&date_text).ok_or_else(|| ScanError::InvalidDate {
        path: path.into(),
        value: date_text.clone(),
    })?;

    let slug = meta
        .slug
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            Path::new(rel_path)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        });

    Ok(Some(Post {
        title: meta.title,
        url: format!("/{slug}/"),
        slug,
        date,
        author: meta.author,
        contributor: meta.contributor,
        categories: meta.categories,
        excerpt: render_excerpt(body),
        source_path: rel_path.to_string(),
    }))
}

/// Split `+++` fenced front matter from the body.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content
        .strip_prefix("+++\r\n")
        .or_else(|| content.strip_prefix("+++\n"))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "+++" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, and
/// RFC 3339 (converted to UTC).
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn render_excerpt(body: &str) -> String {
    let body = body.replace("\r\n", "\n");
    let source = match body.find(MORE_MARKER) {
        Some(pos) => &body[..pos],
        None => body
            .trim_start()
            .split("\n\n")
            .next()
            .unwrap_or_default(),
    };
    let mut html = String::new();
    md_html::push_html(&mut html, Parser::new(source.trim()));
    html
}
