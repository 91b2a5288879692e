//! Paginated post index (the home page).
//!
//! Posts are listed newest first, minus any excluded categories, `per_page`
//! to a page:
//!
//! ```text
//! <path>index.html                    # page 1
//! <path><pagination_dir>/2/index.html # page 2
//! <path><pagination_dir>/3/index.html # ...
//! ```
//!
//! `per_page = 0` puts every post on page 1. An empty corpus still produces
//! page 1 so the site has a home page.

use crate::config::IndexConfig;
use crate::posts::{Post, PostCorpus};
use crate::routes::{LAYOUT_INDEX, Route, RouteData};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPage<'a> {
    /// Site-absolute URL of page 1
    pub base: String,
    /// 1-based page number
    pub current: usize,
    pub total: usize,
    pub current_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
    pub posts: Vec<&'a Post>,
}

/// Posts eligible for the index, newest first. Equal dates keep corpus order.
pub fn index_posts<'a>(corpus: &'a PostCorpus, exclude_categories: &[String]) -> Vec<&'a Post> {
    let mut posts: Vec<&Post> = corpus
        .iter()
        .filter(|post| !exclude_categories.iter().any(|c| post.in_category(c)))
        .collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

/// Normalize the configured base path to `""` or `"some/dir/"`.
fn normalize_base(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Relative directory of page `n` (empty string or ending in `/`).
fn page_dir(base: &str, pagination_dir: &str, n: usize) -> String {
    if n == 1 {
        base.to_string()
    } else {
        format!("{base}{pagination_dir}/{n}/")
    }
}

pub fn paginate<'a>(posts: Vec<&'a Post>, settings: &IndexConfig) -> Vec<Route<'a>> {
    let base = normalize_base(&settings.path);
    let pagination_dir = settings.pagination_dir.trim_matches('/');

    let chunks: Vec<Vec<&Post>> = if settings.per_page == 0 || posts.is_empty() {
        vec![posts]
    } else {
        posts.chunks(settings.per_page).map(|c| c.to_vec()).collect()
    };
    let total = chunks.len();
    let link = |n: usize| format!("/{}", page_dir(&base, pagination_dir, n));

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, posts)| {
            let current = i + 1;
            let prev = (current > 1).then(|| current - 1);
            let next = (current < total).then(|| current + 1);
            Route {
                path: format!("{}index.html", page_dir(&base, pagination_dir, current)),
                layout: LAYOUT_INDEX,
                data: RouteData::Posts(PostPage {
                    base: link(1),
                    current,
                    total,
                    current_url: link(current),
                    prev,
                    prev_link: prev.map(link),
                    next,
                    next_link: next.map(link),
                    posts,
                }),
            }
        })
        .collect()
}
