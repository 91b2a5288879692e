//! Registry of known authors and contributors.
//!
//! A registry is written in `config.toml` as a table keyed by display name:
//!
//! ```toml
//! [contributors."Jane Doe"]
//! slug = "jane-doe"
//! image = "/img/contributors/jane.jpg"
//! academies = { wsa = true, fta = false }
//! specialties = ["security", "angular"]
//! ```
//!
//! The display name is the primary key and the foreign key posts use in
//! their `author` / `contributor` front matter. Table order is significant:
//! [`Registry`] keeps profiles in the order they were written, which is the
//! order the directory index lists them in.
//!
//! Profiles are validated where they enter the program (see
//! [`Profile::route_segment`] and [`crate::config::SiteConfig::validate`]), so
//! nothing downstream has to guess whether a field exists.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Academy memberships. Unknown keys are rejected at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Academies {
    /// Web Security Academy
    pub wsa: bool,
    /// Fullstack Testing Academy
    pub fta: bool,
}

impl Academies {
    /// Number of academies this person has completed.
    pub fn count(&self) -> u32 {
        u32::from(self.wsa) + u32::from(self.fta)
    }

    pub fn is_empty(&self) -> bool {
        !self.wsa && !self.fta
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    /// Display name, unique within a registry.
    pub name: String,
    /// URL path segment. Stored as written; use [`Profile::route_segment`].
    pub slug: String,
    pub image: String,
    pub academies: Academies,
    /// Ordered specialty tags, may be empty.
    pub specialties: Vec<String>,
    /// Explicit founder flag. See [`crate::directory::DirectoryPolicy::is_founder`].
    pub founder: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug '{0}' must be a single path segment")]
    NotASegment(String),
}

impl Profile {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            image: String::new(),
            academies: Academies::default(),
            specialties: Vec::new(),
            founder: false,
        }
    }

    /// The trimmed slug, checked to be usable as one URL path segment.
    pub fn route_segment(&self) -> Result<&str, SlugError> {
        let slug = self.slug.trim();
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        if slug.contains('/') || slug.contains('\\') || slug == "." || slug.contains("..") {
            return Err(SlugError::NotASegment(slug.to_string()));
        }
        Ok(slug)
    }
}

/// Ordered collection of profiles for one kind of person.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    profiles: Vec<Profile>,
}

impl Registry {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    /// Exact-match lookup by display name.
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Slugs claimed by more than one profile, with the names claiming them.
    ///
    /// Generation does not reject these (the later profile's page overwrites
    /// the earlier one); `byline check` reports them.
    pub fn duplicate_slugs(&self) -> Vec<(String, Vec<String>)> {
        let mut by_slug: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for profile in &self.profiles {
            by_slug
                .entry(profile.slug.trim())
                .or_default()
                .push(profile.name.clone());
        }
        by_slug
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(slug, names)| (slug.to_string(), names))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Profile;
    type IntoIter = std::slice::Iter<'a, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

// ============================================================================
// Table encoding: `name -> fields`, order preserved
// ============================================================================

/// Profile fields as written under a registry key. `slug` is required.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFields {
    slug: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    academies: Academies,
    #[serde(default)]
    specialties: Vec<String>,
    #[serde(default)]
    founder: bool,
}

#[derive(Serialize)]
struct ProfileFieldsRef<'a> {
    slug: &'a str,
    image: &'a str,
    academies: Academies,
    specialties: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    founder: bool,
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.profiles.len()))?;
        for p in &self.profiles {
            map.serialize_entry(
                &p.name,
                &ProfileFieldsRef {
                    slug: &p.slug,
                    image: &p.image,
                    academies: p.academies,
                    specialties: &p.specialties,
                    founder: p.founder,
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = Registry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of display name to profile")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Registry, A::Error> {
                let mut profiles = Vec::new();
                while let Some((name, fields)) = map.next_entry::<String, ProfileFields>()? {
                    profiles.push(Profile {
                        name,
                        slug: fields.slug,
                        image: fields.image,
                        academies: fields.academies,
                        specialties: fields.specialties,
                        founder: fields.founder,
                    });
                }
                Ok(Registry { profiles })
            }
        }

        deserializer.deserialize_map(RegistryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keeps_table_order() {
        let toml = r#"
["Zed Last"]
slug = "zed"

["Amy First"]
slug = "amy"

["Mo Middle"]
slug = "mo"
"#;
        let registry: Registry = toml::from_str(toml).unwrap();
        let names: Vec<&str> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zed Last", "Amy First", "Mo Middle"]);
    }

    #[test]
    fn registry_fields_default_when_absent() {
        let registry: Registry = toml::from_str("[\"Alice\"]\nslug = \"alice\"\n").unwrap();
        let alice = registry.find("Alice").unwrap();
        assert_eq!(alice.image, "");
        assert!(alice.academies.is_empty());
        assert!(alice.specialties.is_empty());
        assert!(!alice.founder);
    }

    #[test]
    fn missing_slug_is_rejected() {
        let result: Result<Registry, _> = toml::from_str("[\"Alice\"]\nimage = \"a.jpg\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("slug"), "unexpected error: {err}");
    }

    #[test]
    fn malformed_academy_flags_are_rejected() {
        let unknown: Result<Registry, _> =
            toml::from_str("[\"Alice\"]\nslug = \"a\"\nacademies = { xyz = true }\n");
        assert!(unknown.is_err());

        let not_bool: Result<Registry, _> =
            toml::from_str("[\"Alice\"]\nslug = \"a\"\nacademies = { wsa = \"yes\" }\n");
        assert!(not_bool.is_err());
    }

    #[test]
    fn registry_json_roundtrip_keeps_order() {
        let registry = Registry::new(vec![Profile::new("B", "b"), Profile::new("A", "a")]);
        let json = serde_json::to_string(&registry).unwrap();
        let back: Registry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }

    #[test]
    fn find_is_exact_match() {
        let registry = Registry::new(vec![Profile::new("Alice", "alice")]);
        assert!(registry.find("Alice").is_some());
        assert!(registry.find("alice").is_none());
        assert!(registry.find("Alice ").is_none());
    }

    #[test]
    fn route_segment_trims_and_validates() {
        assert_eq!(Profile::new("A", "  alice \n").route_segment(), Ok("alice"));
        assert_eq!(Profile::new("A", "   ").route_segment(), Err(SlugError::Empty));
        assert!(matches!(
            Profile::new("A", "a/b").route_segment(),
            Err(SlugError::NotASegment(_))
        ));
        assert!(matches!(
            Profile::new("A", "..").route_segment(),
            Err(SlugError::NotASegment(_))
        ));
    }

    #[test]
    fn duplicate_slugs_reports_all_claimants() {
        let registry = Registry::new(vec![
            Profile::new("Alice", "same"),
            Profile::new("Bob", "bob"),
            Profile::new("Carol", " same "),
        ]);
        assert_eq!(
            registry.duplicate_slugs(),
            vec![("same".to_string(), vec!["Alice".to_string(), "Carol".to_string()])]
        );
    }

    #[test]
    fn academies_count() {
        assert_eq!(Academies::default().count(), 0);
        assert_eq!(Academies { wsa: true, fta: true }.count(), 2);
        assert_eq!(Academies { wsa: false, fta: true }.count(), 1);
    }
}
