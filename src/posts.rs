//! The post corpus: every published post of the current build.
//!
//! Posts are owned by the scan stage and read-only everywhere else. Each post
//! names at most one author and at most one contributor by display name; a
//! name with no registry entry is simply not attributed to anyone.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    /// URL slug (front matter `slug`, or the file stem)
    pub slug: String,
    pub date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Excerpt rendered to HTML
    #[serde(default)]
    pub excerpt: String,
    /// Site-absolute URL, `/<slug>/`
    pub url: String,
    /// Path relative to the posts directory
    pub source_path: String,
}

impl Post {
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// All posts of one build, in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostCorpus {
    posts: Vec<Post>,
}

impl PostCorpus {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// SHA-256 over the attribution-relevant fields of every post, as hex.
    ///
    /// Anything caching derived per-person data must key on this together
    /// with the person's name.
    pub fn snapshot_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"corpus\0");
        for post in &self.posts {
            hasher.update(post.slug.as_bytes());
            hasher.update(b"\0");
            hasher.update(post.title.as_bytes());
            hasher.update(b"\0");
            hasher.update(post.date.to_string().as_bytes());
            hasher.update(b"\0");
            hasher.update(post.author.as_deref().unwrap_or_default().as_bytes());
            hasher.update(b"\0");
            hasher.update(post.contributor.as_deref().unwrap_or_default().as_bytes());
            hasher.update(b"\0");
            for category in &post.categories {
                hasher.update(category.as_bytes());
                hasher.update(b"\x1f");
            }
            hasher.update(b"\x1e");
        }
        format!("{:x}", hasher.finalize())
    }
}

impl<'a> IntoIterator for &'a PostCorpus {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}
