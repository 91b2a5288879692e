//! Person directories: classification, leveling, and route generation.
//!
//! Authors and contributors share every rule here and differ only in labels
//! and in which post field attributes a post to them. [`PersonDirectory`] is
//! generic over a [`Kind`] that supplies those differences.
//!
//! ## Levels
//!
//! A person's level is a pure function of how many posts are attributed to
//! them:
//!
//! ```text
//! posts_count <= beginner_max                  → beginner
//! beginner_max < posts_count <= advanced_max   → advanced
//! posts_count > advanced_max                   → expert
//! ```
//!
//! [`LevelThresholds::classify`] is the only implementation of this rule.
//! Directory pages and the render-time helpers in [`crate::helpers`] both go
//! through it, so a person's level on their own page and in an article footer
//! cannot disagree for the same corpus.
//!
//! ## Generated routes
//!
//! ```text
//! <kind>/index.html          # every person, registry order (or by post count)
//! <kind>/<slug>/index.html   # one per person
//! ```

use crate::config::{DirectoryConfig, SiteConfig};
use crate::fragments;
use crate::people::{Profile, Registry};
use crate::posts::{Post, PostCorpus};
use crate::routes::{Route, RouteData};
use maud::Markup;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Highest post count still classified as beginner.
pub const BEGINNER_MAX: u32 = 2;
/// Highest post count still classified as advanced.
pub const ADVANCED_MAX: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Advanced,
    Expert,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Advanced, Level::Expert];

    /// Lowercase identifier used in CSS classes and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Advanced => "advanced",
            Level::Expert => "expert",
        }
    }

    /// Capitalized display label.
    pub fn label(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Advanced => "Advanced",
            Level::Expert => "Expert",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelThresholds {
    pub beginner_max: u32,
    pub advanced_max: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            beginner_max: BEGINNER_MAX,
            advanced_max: ADVANCED_MAX,
        }
    }
}

impl LevelThresholds {
    pub fn classify(&self, posts_count: usize) -> Level {
        if posts_count > self.advanced_max as usize {
            Level::Expert
        } else if posts_count > self.beginner_max as usize {
            Level::Advanced
        } else {
            Level::Beginner
        }
    }
}

/// Per-directory thresholds. A field left unset inherits the site-wide
/// `[levels]` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beginner_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_max: Option<u32>,
}

impl LevelsOverride {
    pub fn is_empty(&self) -> bool {
        self.beginner_max.is_none() && self.advanced_max.is_none()
    }

    pub fn resolve(&self, base: LevelThresholds) -> LevelThresholds {
        LevelThresholds {
            beginner_max: self.beginner_max.unwrap_or(base.beginner_max),
            advanced_max: self.advanced_max.unwrap_or(base.advanced_max),
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(posts_count: usize) -> Level {
    LevelThresholds::default().classify(posts_count)
}

// ============================================================================
// Kinds
// ============================================================================

/// What distinguishes one kind of person from another.
pub trait Kind: Send + Sync + 'static {
    /// Route prefix and index layout, e.g. `authors`
    const PLURAL: &'static str;
    /// Detail layout and CSS class prefix, e.g. `author`
    const SINGULAR: &'static str;
    /// Display label, e.g. `Author`
    const TITLE: &'static str;

    /// Name of the person of this kind the post is attributed to.
    fn attributed(post: &Post) -> Option<&str>;
    fn registry(config: &SiteConfig) -> &Registry;
    fn settings(config: &SiteConfig) -> &DirectoryConfig;
}

#[derive(Debug, Clone, Copy)]
pub struct Authors;

#[derive(Debug, Clone, Copy)]
pub struct Contributors;

impl Kind for Authors {
    const PLURAL: &'static str = "authors";
    const SINGULAR: &'static str = "author";
    const TITLE: &'static str = "Author";

    fn attributed(post: &Post) -> Option<&str> {
        post.author.as_deref()
    }

    fn registry(config: &SiteConfig) -> &Registry {
        &config.authors
    }

    fn settings(config: &SiteConfig) -> &DirectoryConfig {
        &config.authors_directory
    }
}

impl Kind for Contributors {
    const PLURAL: &'static str = "contributors";
    const SINGULAR: &'static str = "contributor";
    const TITLE: &'static str = "Contributor";

    fn attributed(post: &Post) -> Option<&str> {
        post.contributor.as_deref()
    }

    fn registry(config: &SiteConfig) -> &Registry {
        &config.contributors
    }

    fn settings(config: &SiteConfig) -> &DirectoryConfig {
        &config.contributors_directory
    }
}

// ============================================================================
// Policy and derived records
// ============================================================================

/// Per-directory rules resolved from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryPolicy {
    pub thresholds: LevelThresholds,
    /// Designated founder by display name.
    pub founder: Option<String>,
    /// List the index by post count, most first, instead of registry order.
    pub sort_by_posts: bool,
}

impl DirectoryPolicy {
    pub fn from_config<K: Kind>(config: &SiteConfig) -> Self {
        let settings = K::settings(config);
        Self {
            thresholds: settings.thresholds(config.levels),
            founder: config.founder.name.clone(),
            sort_by_posts: settings.sort_by_posts,
        }
    }

    /// Founder if the profile says so or it is the designated founder.
    pub fn is_founder(&self, profile: &Profile) -> bool {
        profile.founder || self.founder.as_deref() == Some(profile.name.as_str())
    }
}

/// A profile joined with its posts and derived level.
///
/// Rebuilt on every call; two records built from the same registry entry and
/// the same corpus are equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeveledProfile<'a> {
    #[serde(flatten)]
    pub profile: &'a Profile,
    /// Attributed posts, corpus order
    pub posts: Vec<&'a Post>,
    pub posts_count: usize,
    pub level: Level,
    pub completed_courses: u32,
    pub is_founder: bool,
}

// ============================================================================
// Directory
// ============================================================================

pub struct PersonDirectory<'a, K: Kind> {
    registry: &'a Registry,
    corpus: &'a PostCorpus,
    policy: DirectoryPolicy,
    kind: PhantomData<K>,
}

impl<'a, K: Kind> PersonDirectory<'a, K> {
    pub fn new(registry: &'a Registry, corpus: &'a PostCorpus, policy: DirectoryPolicy) -> Self {
        Self {
            registry,
            corpus,
            policy,
            kind: PhantomData,
        }
    }

    pub fn from_config(config: &'a SiteConfig, corpus: &'a PostCorpus) -> Self {
        Self::new(
            K::registry(config),
            corpus,
            DirectoryPolicy::from_config::<K>(config),
        )
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn index_path() -> String {
        format!("{}/index.html", K::PLURAL)
    }

    pub fn detail_path(slug: &str) -> String {
        format!("{}/{}/index.html", K::PLURAL, slug)
    }

    /// Site-absolute URL of a person's page.
    pub fn url(slug: &str) -> String {
        format!("/{}/{}/", K::PLURAL, slug)
    }

    /// Posts attributed to `name`, corpus order.
    pub fn posts_by(&self, name: &str) -> Vec<&'a Post> {
        self.corpus
            .iter()
            .filter(|post| K::attributed(post) == Some(name))
            .collect()
    }

    pub fn leveled(&self, profile: &'a Profile) -> LeveledProfile<'a> {
        let posts = self.posts_by(&profile.name);
        let posts_count = posts.len();
        LeveledProfile {
            profile,
            posts,
            posts_count,
            level: self.policy.thresholds.classify(posts_count),
            completed_courses: profile.academies.count(),
            is_founder: self.policy.is_founder(profile),
        }
    }

    /// Academy badges for a profile. Every page and helper embedding badges
    /// goes through here.
    pub fn badges(&self, profile: &Profile, link_prefix: Option<&str>) -> Markup {
        fragments::compose_badges::<K>(
            profile.academies,
            self.policy.is_founder(profile),
            link_prefix,
        )
    }

    /// Names attributed in the corpus that have no registry entry, sorted and
    /// deduplicated. Empty when the registry is empty.
    pub fn unregistered_names(&self) -> Vec<&'a str> {
        if self.registry.is_empty() {
            return Vec::new();
        }
        let mut names: Vec<&'a str> = self
            .corpus
            .iter()
            .filter_map(K::attributed)
            .filter(|name| self.registry.find(name).is_none())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// The index route, or `None` when the registry is empty.
    pub fn generate_index(&self) -> Option<Route<'a>> {
        if self.registry.is_empty() {
            debug!(kind = K::PLURAL, "registry empty, no index route");
            return None;
        }

        let mut records: Vec<LeveledProfile<'a>> =
            self.registry.iter().map(|p| self.leveled(p)).collect();
        if self.policy.sort_by_posts {
            // Stable: ties keep registry order
            records.sort_by(|a, b| b.posts_count.cmp(&a.posts_count));
        }

        Some(Route {
            path: Self::index_path(),
            layout: K::PLURAL,
            data: RouteData::Directory {
                kind: K::PLURAL,
                records,
            },
        })
    }

    /// One route per registry entry, registry order.
    ///
    /// A profile whose slug cannot form a path segment is skipped and logged;
    /// the others are still generated.
    pub fn generate_detail_routes(&self) -> Vec<Route<'a>> {
        let mut routes = Vec::with_capacity(self.registry.len());
        for profile in self.registry {
            let slug = match profile.route_segment() {
                Ok(slug) => slug,
                Err(e) => {
                    warn!(kind = K::PLURAL, name = %profile.name, error = %e, "skipping profile");
                    continue;
                }
            };
            routes.push(Route {
                path: Self::detail_path(slug),
                layout: K::SINGULAR,
                data: RouteData::Person {
                    kind: K::PLURAL,
                    record: self.leveled(profile),
                },
            });
        }
        routes
    }
}
