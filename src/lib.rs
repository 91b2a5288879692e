//! # Byline
//!
//! Author and contributor directories for a markdown blog. Posts name their
//! author and contributor by display name; a registry in the site config maps
//! each name to a slug, an image, academy memberships, and specialties. Byline
//! joins the two into directory pages, per-person pages, and the render-time
//! helpers page templates use for bylines and article footers.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      site/     →  manifest.json    (config + posts → structured data)
//! 2. Generate  manifest  →  dist/            (final HTML site + routes.json)
//! ```
//!
//! The manifest is human-readable JSON, so a scan can be inspected before
//! anything is rendered. Generation is a pure function of the manifest: the
//! same manifest always produces byte-identical pages.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: loads config, walks `posts/`, parses front matter |
//! | [`generate`] | Stage 2: renders every route with Maud and writes the site |
//! | [`config`] | Layered `config.toml` loading, validation, and stock defaults |
//! | [`people`] | Profiles and the ordered name → profile registry |
//! | [`posts`] | The post corpus and its snapshot id |
//! | [`directory`] | Level classification and person-directory route generation |
//! | [`fragments`] | Badge, level meter, and specialty HTML fragments |
//! | [`helpers`] | Render-time lookups by display name |
//! | [`paginate`] | Paginated post index routes |
//! | [`routes`] | Route and route-summary types shared by the generators |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## One Classifier, Recomputed
//!
//! A person's level is derived from the corpus every time it is asked for.
//! Directory pages and template helpers share
//! [`directory::LevelThresholds::classify`], and nothing caches a level
//! across builds. Anything that does cache must key on the person's name
//! together with [`posts::PostCorpus::snapshot_id`].
//!
//! ## Kinds as Types
//!
//! Authors and contributors follow identical rules. Their differences (URL
//! segment, class prefix, which post field attributes a post) live in the
//! [`directory::Kind`] trait, and every directory, fragment, and helper is
//! generic over it.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Malformed markup is
//! a build error and all interpolation is escaped, which matters here because
//! display names come straight from user config.

pub mod config;
pub mod directory;
pub mod fragments;
pub mod generate;
pub mod helpers;
pub mod output;
pub mod paginate;
pub mod people;
pub mod posts;
pub mod routes;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
