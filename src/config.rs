//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML value, the user's file is merged on top, and the
//! result is deserialized and validated. Unknown keys are rejected to catch
//! typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! title = "Dev Academy"
//! date_format = "%B %-d, %Y"   # chrono strftime syntax
//!
//! [levels]                     # post-count thresholds
//! beginner_max = 2
//! advanced_max = 4
//!
//! [founder]
//! name = "Jane Doe"            # optional designated founder
//!
//! [authors_directory]
//! sort_by_posts = false
//! # levels = { beginner_max = 1 }   # unset fields inherit [levels]
//!
//! [contributors_directory]
//! sort_by_posts = false
//!
//! [index]
//! per_page = 10
//! pagination_dir = "page"
//! path = ""
//! exclude_categories = ["Podcast"]
//!
//! [processing]
//! max_processes = 4            # omit for auto = CPU cores
//!
//! [authors."Jane Doe"]
//! slug = "jane-doe"
//! image = "/img/authors/jane.jpg"
//! academies = { wsa = true, fta = false }
//! specialties = ["security"]
//! founder = true
//!
//! [contributors."John Roe"]
//! slug = "john-roe"
//! ```
//!
//! Registries keep the order their entries are written in.

use crate::directory::{LevelThresholds, LevelsOverride};
use crate::people::{Registry, SlugError};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("{kind} '{name}': {source}")]
    Profile {
        kind: &'static str,
        name: String,
        #[source]
        source: SlugError,
    },
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used in page titles.
    pub title: String,
    /// strftime-style format for displayed post dates.
    pub date_format: String,
    /// Default level thresholds for every directory.
    pub levels: LevelThresholds,
    pub founder: FounderConfig,
    pub authors_directory: DirectoryConfig,
    pub contributors_directory: DirectoryConfig,
    /// Paginated post index settings.
    pub index: IndexConfig,
    pub processing: ProcessingConfig,
    pub authors: Registry,
    pub contributors: Registry,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Dev Academy".to_string(),
            date_format: "%B %-d, %Y".to_string(),
            levels: LevelThresholds::default(),
            founder: FounderConfig::default(),
            authors_directory: DirectoryConfig::default(),
            contributors_directory: DirectoryConfig::default(),
            index: IndexConfig::default(),
            processing: ProcessingConfig::default(),
            authors: Registry::default(),
            contributors: Registry::default(),
        }
    }
}

impl SiteConfig {
    /// Validate values that deserialization alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_thresholds("levels", &self.levels)?;
        check_thresholds(
            "authors_directory.levels",
            &self.authors_directory.thresholds(self.levels),
        )?;
        check_thresholds(
            "contributors_directory.levels",
            &self.contributors_directory.thresholds(self.levels),
        )?;
        if self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(ConfigError::Validation(format!(
                "date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }
        if self.index.pagination_dir.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "index.pagination_dir must not be empty".into(),
            ));
        }
        for (kind, registry) in [("author", &self.authors), ("contributor", &self.contributors)] {
            for profile in registry {
                profile
                    .route_segment()
                    .map_err(|source| ConfigError::Profile {
                        kind,
                        name: profile.name.clone(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

fn check_thresholds(key: &str, levels: &LevelThresholds) -> Result<(), ConfigError> {
    if levels.beginner_max > levels.advanced_max {
        return Err(ConfigError::Validation(format!(
            "{key}.beginner_max ({}) must not exceed {key}.advanced_max ({})",
            levels.beginner_max, levels.advanced_max
        )));
    }
    Ok(())
}

/// Founder designation by name. Profiles can also set `founder = true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FounderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Per-directory settings for authors or contributors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// List the index by post count (most first) instead of registry order.
    pub sort_by_posts: bool,
    /// Overrides the top-level `[levels]` for this directory, field by field.
    #[serde(skip_serializing_if = "LevelsOverride::is_empty")]
    pub levels: LevelsOverride,
}

impl DirectoryConfig {
    /// Thresholds for this directory on top of the site-wide `base`.
    pub fn thresholds(&self, base: LevelThresholds) -> LevelThresholds {
        self.levels.resolve(base)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Posts per page; 0 puts every post on one page.
    pub per_page: usize,
    pub pagination_dir: String,
    /// Directory of the index relative to the site root.
    pub path: String,
    /// Posts in any of these categories are left off the index.
    pub exclude_categories: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            per_page: 10,
            pagination_dir: "page".to_string(),
            path: String::new(),
            exclude_categories: vec!["Podcast".to_string()],
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel page writers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved, in place; new keys
///   are appended in overlay order.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(slot) => {
                        let base_val = std::mem::replace(slot, toml::Value::Boolean(false));
                        *slot = merge_toml(base_val, overlay_val);
                    }
                    None => {
                        base_table.insert(key, overlay_val);
                    }
                }
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Byline Configuration
# ====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Site title, used in page titles ("Jane Doe | Dev Academy author").
title = "Dev Academy"

# Format for displayed post dates (chrono strftime syntax).
date_format = "%B %-d, %Y"

# ---------------------------------------------------------------------------
# Experience levels
# ---------------------------------------------------------------------------
# A person with at most beginner_max posts is a beginner, with at most
# advanced_max posts advanced, and with more an expert.
[levels]
beginner_max = 2
advanced_max = 4

# ---------------------------------------------------------------------------
# Founder
# ---------------------------------------------------------------------------
# The designated founder gets founder badges and the "Founder" label.
# A profile can also set `founder = true`.
[founder]
# name = "Jane Doe"

# ---------------------------------------------------------------------------
# Directories
# ---------------------------------------------------------------------------
[authors_directory]
# List the index by post count, most first, instead of config order.
sort_by_posts = false
# Override [levels] for this directory only; unset fields inherit [levels].
# levels = { beginner_max = 1 }

[contributors_directory]
sort_by_posts = false

# ---------------------------------------------------------------------------
# Post index (home page)
# ---------------------------------------------------------------------------
[index]
# Posts per page; 0 puts every post on one page.
per_page = 10
pagination_dir = "page"
# Directory of the index relative to the site root ("" = site root).
path = ""
# Posts in these categories are left off the index.
exclude_categories = ["Podcast"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel page writers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Registries
# ---------------------------------------------------------------------------
# One table per person, keyed by the display name posts use in their
# `author` / `contributor` front matter. Listed in the order written here.
#
# [authors."Jane Doe"]
# slug = "jane-doe"                          # required, one URL segment
# image = "/img/authors/jane.jpg"
# academies = { wsa = true, fta = false }
# specialties = ["security", "testing"]
#
# [contributors."John Roe"]
# slug = "john-roe"
"##
}
