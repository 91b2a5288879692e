//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scan manifest, builds every route,
//! renders each with its layout, and writes the result.
//!
//! ## Generated Pages
//!
//! - **Post index** (`/index.html`, `/page/N/index.html`): newest posts first
//! - **Author directory** (`/authors/index.html`) and one page per author
//! - **Contributor directory** (`/contributors/index.html`) and one page per
//!   contributor
//! - **Route manifest** (`/routes.json`): every written path and its layout,
//!   plus the corpus snapshot id
//!
//! Directories with an empty registry produce no pages at all.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── page/2/index.html
//! ├── authors/
//! │   ├── index.html
//! │   └── jane-doe/index.html
//! ├── contributors/
//! │   ├── index.html
//! │   └── john-roe/index.html
//! └── routes.json
//! ```
//!
//! ## Failure Handling
//!
//! Pages are rendered and written in parallel. A page that fails to write is
//! logged and listed in [`GenerateReport::failed`]; the remaining pages are
//! still written.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Interpolated names, titles, and URLs are escaped automatically. Excerpts
//! are already HTML (rendered from markdown at scan time) and are inserted
//! as-is.

use crate::config::SiteConfig;
use crate::directory::{Authors, Contributors, Kind, LeveledProfile, PersonDirectory};
use crate::fragments;
use crate::helpers::Helpers;
use crate::paginate::{self, PostPage};
use crate::posts::{Post, PostCorpus};
use crate::routes::{Route, RouteData, RouteSummary};
use crate::scan::Manifest;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS: &str = include_str!("../static/style.css");

/// `data-ph` tracking prefixes per page type.
const DIRECTORY_PREFIX: &str = "directory";
const PROFILE_PREFIX: &str = "profile";
const INDEX_PREFIX: &str = "index";

/// A rendered route, ready to write.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub path: String,
    pub layout: &'static str,
    pub html: String,
}

impl From<&RenderedPage> for RouteSummary {
    fn from(page: &RenderedPage) -> Self {
        Self {
            path: page.path.clone(),
            layout: page.layout.to_string(),
        }
    }
}

/// Contents of `routes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteManifest {
    pub snapshot: String,
    pub routes: Vec<RouteSummary>,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub snapshot: String,
    pub written: Vec<RouteSummary>,
    /// `(path, error)` for every page that could not be written
    pub failed: Vec<(String, String)>,
}

pub fn generate(manifest_path: &Path, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_site(&manifest, output_dir)
}

pub fn generate_site(manifest: &Manifest, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let snapshot = manifest.posts.snapshot_id();
    if snapshot != manifest.snapshot {
        warn!(
            recorded = %manifest.snapshot,
            actual = %snapshot,
            "manifest snapshot does not match its posts; using the recomputed id"
        );
    }

    let pages = dedupe_paths(render_site(&manifest.config, &manifest.posts));
    fs::create_dir_all(output_dir)?;

    let results: Vec<Result<RouteSummary, (String, std::io::Error)>> = pages
        .par_iter()
        .map(|page| {
            write_page(output_dir, page)
                .map(|()| RouteSummary::from(page))
                .map_err(|e| (page.path.clone(), e))
        })
        .collect();

    let mut report = GenerateReport {
        snapshot: snapshot.clone(),
        ..Default::default()
    };
    for result in results {
        match result {
            Ok(summary) => {
                debug!(path = %summary.path, "wrote page");
                report.written.push(summary);
            }
            Err((path, e)) => {
                warn!(%path, error = %e, "failed to write page");
                report.failed.push((path, e.to_string()));
            }
        }
    }

    let route_manifest = RouteManifest {
        snapshot,
        routes: report.written.clone(),
    };
    fs::write(
        output_dir.join("routes.json"),
        serde_json::to_string_pretty(&route_manifest)?,
    )?;

    info!(
        written = report.written.len(),
        failed = report.failed.len(),
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

/// Keep only the last page rendered for each path. Two profiles sharing a
/// slug would otherwise race to write the same file.
fn dedupe_paths(pages: Vec<RenderedPage>) -> Vec<RenderedPage> {
    let mut seen = HashSet::new();
    let mut kept: Vec<RenderedPage> = Vec::with_capacity(pages.len());
    for page in pages.into_iter().rev() {
        if seen.insert(page.path.clone()) {
            kept.push(page);
        } else {
            warn!(path = %page.path, "duplicate route; the later profile's page wins");
        }
    }
    kept.reverse();
    kept
}

fn write_page(output_dir: &Path, page: &RenderedPage) -> std::io::Result<()> {
    let target = output_dir.join(&page.path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, &page.html)
}

// ============================================================================
// Routes
// ============================================================================

/// Index route (if any) followed by detail routes for one kind.
pub fn person_routes<'a, K: Kind>(directory: &PersonDirectory<'a, K>) -> Vec<Route<'a>> {
    directory
        .generate_index()
        .into_iter()
        .chain(directory.generate_detail_routes())
        .collect()
}

/// Every route of the site, in output order.
pub fn site_routes<'a>(config: &'a SiteConfig, corpus: &'a PostCorpus) -> Vec<Route<'a>> {
    let mut routes = paginate::paginate(
        paginate::index_posts(corpus, &config.index.exclude_categories),
        &config.index,
    );
    routes.extend(person_routes(&PersonDirectory::<Authors>::from_config(config, corpus)));
    routes.extend(person_routes(&PersonDirectory::<Contributors>::from_config(config, corpus)));
    routes
}

// ============================================================================
// Rendering
// ============================================================================

/// Shared per-build rendering inputs.
struct PageContext<'a> {
    config: &'a SiteConfig,
    corpus: &'a PostCorpus,
    authors: PersonDirectory<'a, Authors>,
    contributors: PersonDirectory<'a, Contributors>,
}

/// Render every route of [`site_routes`]. Pure: the same inputs give the
/// same pages.
pub fn render_site(config: &SiteConfig, corpus: &PostCorpus) -> Vec<RenderedPage> {
    let ctx = PageContext {
        config,
        corpus,
        authors: PersonDirectory::from_config(config, corpus),
        contributors: PersonDirectory::from_config(config, corpus),
    };
    site_routes(config, corpus)
        .par_iter()
        .map(|route| RenderedPage {
            path: route.path.clone(),
            layout: route.layout,
            html: render_route(route, &ctx).into_string(),
        })
        .collect()
}

fn render_route(route: &Route<'_>, ctx: &PageContext<'_>) -> Markup {
    match &route.data {
        RouteData::Posts(page) => render_post_page(page, ctx),
        RouteData::Directory { kind, records } if *kind == Authors::PLURAL => {
            render_directory_page(records, &ctx.authors, ctx)
        }
        RouteData::Directory { records, .. } => {
            render_directory_page(records, &ctx.contributors, ctx)
        }
        RouteData::Person { kind, record } if *kind == Authors::PLURAL => {
            render_person_page(record, &ctx.authors, ctx)
        }
        RouteData::Person { record, .. } => render_person_page(record, &ctx.contributors, ctx),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, body_class: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=(body_class) {
                (content)
            }
        }
    }
}

/// Renders the site header: site title and section links.
fn site_header(config: &SiteConfig, current: &str) -> Markup {
    let sections: Vec<(&str, String, &str)> = [
        ("", "Articles", true),
        (Authors::PLURAL, "Authors", !config.authors.is_empty()),
        (Contributors::PLURAL, "Contributors", !config.contributors.is_empty()),
    ]
    .into_iter()
    .filter(|(_, _, shown)| *shown)
    .map(|(section, label, _)| {
        let href = if section.is_empty() {
            "/".to_string()
        } else {
            format!("/{section}/")
        };
        (section, href, label)
    })
    .collect();

    html! {
        header.site-header {
            a.site-title href="/" { (config.title) }
            nav.site-nav {
                ul {
                    @for (section, href, label) in &sections {
                        li class=[(*section == current).then_some("current")] {
                            a href=(href) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn person_url<K: Kind>(record: &LeveledProfile<'_>) -> Option<String> {
    record
        .profile
        .route_segment()
        .ok()
        .map(PersonDirectory::<K>::url)
}

fn post_list(posts: &[&Post], date_format: &str) -> Markup {
    html! {
        ul.post-list {
            @for post in posts {
                li {
                    a href=(post.url) { (post.title) }
                    " "
                    time datetime=(post.date.format("%Y-%m-%d").to_string()) {
                        (post.date.format(date_format).to_string())
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_directory_page<K: Kind>(
    records: &[LeveledProfile<'_>],
    directory: &PersonDirectory<'_, K>,
    ctx: &PageContext<'_>,
) -> Markup {
    let s = K::SINGULAR;
    let heading = format!("{}s", K::TITLE);

    let content = html! {
        (site_header(ctx.config, K::PLURAL))
        main.directory-page {
            h1 { (heading) }
            ul class={ (s) "-list" } {
                @for record in records {
                    @let url = person_url::<K>(record);
                    li class={ (s) "-card" } {
                        a href=[url.as_deref()] {
                            img src=(record.profile.image) alt=(record.profile.name) loading="lazy";
                            h2 { (record.profile.name) }
                        }
                        (fragments::level_meter::<K>(record.level, false))
                        p class={ (s) "-posts-count" } {
                            (record.posts_count) " "
                            @if record.posts_count == 1 { "post" } @else { "posts" }
                        }
                        (fragments::specialty_badges(&record.profile.specialties))
                        (directory.badges(record.profile, Some(DIRECTORY_PREFIX)))
                    }
                }
            }
        }
    };

    let title = format!("{} | {}", heading, ctx.config.title);
    base_document(&title, "directory-view", content)
}

fn render_person_page<K: Kind>(
    record: &LeveledProfile<'_>,
    directory: &PersonDirectory<'_, K>,
    ctx: &PageContext<'_>,
) -> Markup {
    let s = K::SINGULAR;
    let profile = record.profile;
    let profession = if record.is_founder { "Founder" } else { K::TITLE };

    let content = html! {
        (site_header(ctx.config, K::PLURAL))
        main.person-page {
            article class={ (s) "-profile" } {
                img src=(profile.image) alt=(profile.name);
                h1 { (profile.name) }
                div class={ (s) "-profession" } { (profession) }
                (fragments::level_meter::<K>(record.level, true))
                @if record.completed_courses > 0 {
                    p class={ (s) "-courses" } {
                        "Completed courses: " (record.completed_courses)
                    }
                }
                (fragments::specialty_badges(&profile.specialties))
                (directory.badges(profile, Some(PROFILE_PREFIX)))
            }
            section class={ (s) "-posts" } {
                h2 { "Posts (" (record.posts_count) ")" }
                @if record.posts.is_empty() {
                    p.empty { "No posts yet." }
                } @else {
                    (post_list(&record.posts, &ctx.config.date_format))
                }
            }
        }
    };

    let title = format!("{} | {} {}", profile.name, ctx.config.title, K::SINGULAR);
    base_document(&title, "person-view", content)
}

fn render_post_page(page: &PostPage<'_>, ctx: &PageContext<'_>) -> Markup {
    let authors = Helpers::<Authors>::from_config(ctx.config, ctx.corpus);
    let contributors = Helpers::<Contributors>::from_config(ctx.config, ctx.corpus);
    let date_format = &ctx.config.date_format;

    let content = html! {
        (site_header(ctx.config, ""))
        main.index-page {
            @for post in &page.posts {
                article.post-summary {
                    h2 {
                        a href=(post.url) data-ph=(fragments::post_ph_value(&post.url, INDEX_PREFIX)) {
                            (post.title)
                        }
                    }
                    p.post-meta {
                        time datetime=(post.date.format("%Y-%m-%d").to_string()) {
                            (post.date.format(date_format).to_string())
                        }
                        @if let Some(name) = &post.author {
                            " by " (byline(name, authors.url_for(name).ok()))
                        }
                        @if let Some(name) = &post.contributor {
                            " with " (byline(name, contributors.url_for(name).ok()))
                        }
                    }
                    div.excerpt { (PreEscaped(&post.excerpt)) }
                }
            }
            @if page.posts.is_empty() {
                p.empty { "Nothing published yet." }
            }
            @if page.total > 1 {
                nav.pagination {
                    @if let Some(prev) = &page.prev_link {
                        a.prev href=(prev) rel="prev" { "Newer" }
                    }
                    span.page-number { "Page " (page.current) " of " (page.total) }
                    @if let Some(next) = &page.next_link {
                        a.next href=(next) rel="next" { "Older" }
                    }
                }
            }
        }
    };

    let title = if page.current == 1 {
        ctx.config.title.clone()
    } else {
        format!("{} | Page {}", ctx.config.title, page.current)
    };
    base_document(&title, "index-view", content)
}

/// A person's name, linked when they have a page. Unregistered names are
/// printed plain.
fn byline(name: &str, url: Option<String>) -> Markup {
    html! {
        @match url.filter(|u| u != "/") {
            Some(url) => {
                a href=(url) { (name) }
            }
            None => {
                span { (name) }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::{Academies, Registry};
    use crate::scan::scan;
    use crate::test_helpers::{post, profile, setup_site};
    use tempfile::TempDir;

    fn config_with_people() -> SiteConfig {
        let mut jane = profile("Jane Doe", "jane-doe");
        jane.academies = Academies {
            wsa: true,
            fta: false,
        };
        SiteConfig {
            authors: Registry::new(vec![jane]),
            contributors: Registry::new(vec![profile("John Roe", "john-roe")]),
            ..SiteConfig::default()
        }
    }

    fn corpus() -> PostCorpus {
        PostCorpus::new(vec![
            post("one", "2024-01-01", Some("Jane Doe"), Some("John Roe")),
            post("two", "2024-01-02", Some("Jane Doe"), None),
            post("three", "2024-01-03", Some("Ghost Writer"), None),
        ])
    }

    fn find<'p>(pages: &'p [RenderedPage], path: &str) -> &'p RenderedPage {
        pages.iter().find(|p| p.path == path).unwrap_or_else(|| {
            let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
            panic!("page '{path}' not found. Available: {paths:?}")
        })
    }

    #[test]
    fn site_routes_cover_every_section() {
        let config = config_with_people();
        let corpus = corpus();
        let paths: Vec<String> = site_routes(&config, &corpus)
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "index.html",
                "authors/index.html",
                "authors/jane-doe/index.html",
                "contributors/index.html",
                "contributors/john-roe/index.html",
            ]
        );
    }

    #[test]
    fn empty_registries_produce_only_the_index() {
        let config = SiteConfig::default();
        let corpus = corpus();
        let pages = render_site(&config, &corpus);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].path, "index.html");
        assert!(!pages[0].html.contains("/authors/"));
    }

    #[test]
    fn render_site_matches_site_routes() {
        let config = config_with_people();
        let corpus = corpus();
        let rendered: Vec<(String, &str)> = render_site(&config, &corpus)
            .into_iter()
            .map(|p| (p.path, p.layout))
            .collect();
        let routed: Vec<(String, &str)> = site_routes(&config, &corpus)
            .into_iter()
            .map(|r| (r.path, r.layout))
            .collect();
        assert_eq!(rendered, routed);
    }

    #[test]
    fn each_route_renders_with_its_own_kind() {
        let config = config_with_people();
        let corpus = corpus();
        let pages = render_site(&config, &corpus);
        assert!(pages.iter().all(|p| !p.html.is_empty()));
        let authors = find(&pages, "authors/index.html");
        assert!(authors.html.contains("author-card"));
        assert!(!authors.html.contains("contributor-card"));
        let john = find(&pages, "contributors/john-roe/index.html");
        assert!(john.html.contains("contributor-profile"));
        assert!(!john.html.contains("author-profile"));
    }

    #[test]
    fn person_page_contents() {
        let config = config_with_people();
        let corpus = corpus();
        let pages = render_site(&config, &corpus);
        let jane = find(&pages, "authors/jane-doe/index.html");
        assert_eq!(jane.layout, "author");
        assert!(jane.html.starts_with("<!DOCTYPE html>"));
        assert!(jane.html.contains("<title>Jane Doe | Dev Academy author</title>"));
        assert!(jane.html.contains("author-contribution-level-beginner"));
        assert!(jane.html.contains("author-contribution-level-highlighted"));
        assert!(jane.html.contains("Posts (2)"));
        assert!(jane.html.contains(r#"href="/one/""#));
        assert!(jane.html.contains("profile-author-academies__link_wsa"));
        assert!(jane.html.contains("Completed courses: 1"));
    }

    #[test]
    fn person_without_posts_page() {
        let config = config_with_people();
        let corpus = PostCorpus::default();
        let pages = render_site(&config, &corpus);
        let john = find(&pages, "contributors/john-roe/index.html");
        assert!(john.html.contains("No posts yet."));
        assert!(john.html.contains("contributor-contribution-level-beginner"));
    }

    #[test]
    fn directory_page_lists_everyone() {
        let config = config_with_people();
        let corpus = corpus();
        let pages = render_site(&config, &corpus);
        let index = find(&pages, "authors/index.html");
        assert_eq!(index.layout, "authors");
        assert!(index.html.contains(r#"href="/authors/jane-doe/""#));
        assert!(index.html.contains("2 posts"));
        assert!(index.html.contains("directory-author-academies__link_wsa"));
    }

    #[test]
    fn post_index_links_registered_people_only() {
        let config = config_with_people();
        let corpus = corpus();
        let pages = render_site(&config, &corpus);
        let home = find(&pages, "index.html");
        assert!(home.html.contains(r#"<a href="/authors/jane-doe/">Jane Doe</a>"#));
        assert!(home.html.contains(r#"<a href="/contributors/john-roe/">John Roe</a>"#));
        assert!(home.html.contains("<span>Ghost Writer</span>"));
        assert!(home.html.contains(r#"data-ph="index__link_one""#));
    }

    #[test]
    fn names_are_escaped() {
        let mut config = config_with_people();
        config.authors = Registry::new(vec![profile("<script>x</script>", "x")]);
        let corpus = PostCorpus::default();
        let pages = render_site(&config, &corpus);
        let page = find(&pages, "authors/x/index.html");
        assert!(!page.html.contains("<script>x"));
        assert!(page.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let config = config_with_people();
        let corpus = corpus();
        assert_eq!(render_site(&config, &corpus), render_site(&config, &corpus));
    }

    #[test]
    fn generate_writes_pages_and_route_manifest() {
        let site = setup_site();
        let out = TempDir::new().unwrap();
        let manifest = scan(site.path()).unwrap();
        let report = generate_site(&manifest, out.path()).unwrap();

        assert!(report.failed.is_empty());
        assert!(out.path().join("index.html").exists());
        assert!(out.path().join("page/2/index.html").exists());
        assert!(out.path().join("authors/jane-doe/index.html").exists());
        assert!(out.path().join("contributors/ann-lee/index.html").exists());

        let routes: RouteManifest =
            serde_json::from_str(&fs::read_to_string(out.path().join("routes.json")).unwrap())
                .unwrap();
        assert_eq!(routes.snapshot, manifest.snapshot);
        assert_eq!(routes.routes.len(), report.written.len());
    }

    #[test]
    fn generate_reads_manifest_file() {
        let site = setup_site();
        let out = TempDir::new().unwrap();
        let manifest = scan(site.path()).unwrap();
        let manifest_path = site.path().join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();

        let report = generate(&manifest_path, out.path()).unwrap();
        assert!(!report.written.is_empty());
    }

    #[test]
    fn duplicate_slug_keeps_later_profile() {
        let pages = vec![
            RenderedPage {
                path: "authors/x/index.html".to_string(),
                layout: "author",
                html: "first".to_string(),
            },
            RenderedPage {
                path: "index.html".to_string(),
                layout: "index",
                html: "home".to_string(),
            },
            RenderedPage {
                path: "authors/x/index.html".to_string(),
                layout: "author",
                html: "second".to_string(),
            },
        ];
        let kept = dedupe_paths(pages);
        let html: Vec<&str> = kept.iter().map(|p| p.html.as_str()).collect();
        assert_eq!(html, vec!["home", "second"]);
    }

    #[test]
    fn write_failure_is_isolated() {
        let site = setup_site();
        let out = TempDir::new().unwrap();
        // A file where a directory is needed blocks exactly one page
        fs::create_dir_all(out.path().join("authors")).unwrap();
        fs::write(out.path().join("authors/max"), "in the way").unwrap();

        let manifest = scan(site.path()).unwrap();
        let report = generate_site(&manifest, out.path()).unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "authors/max/index.html");
        assert!(out.path().join("authors/jane-doe/index.html").exists());
    }
}
