//! Render-time lookups for page templates.
//!
//! Templates call these per page, by display name, long after (or
//! independently of) directory generation. Each call re-resolves the profile
//! and recomputes from the corpus it was given; nothing is cached between
//! calls. Badges and levels go through the same [`PersonDirectory`] code the
//! directory pages use.
//!
//! Lookup outcomes:
//!
//! | Registry | Name | Result |
//! |----------|------|--------|
//! | empty | any | fallback (`/` for URLs, empty markup, no level) |
//! | non-empty | known | the value |
//! | non-empty | unknown | [`LookupError::NotFound`] |

use crate::config::SiteConfig;
use crate::directory::{Kind, Level, PersonDirectory};
use crate::fragments;
use crate::people::Profile;
use crate::posts::PostCorpus;
use chrono::NaiveDateTime;
use maud::{Markup, html};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no {kind} named '{name}'")]
    NotFound { kind: &'static str, name: String },
}

/// Tracking prefix used by the article footer card.
pub const ARTICLE_FOOTER_PREFIX: &str = "article-footer";

pub struct Helpers<'a, K: Kind> {
    directory: PersonDirectory<'a, K>,
    date_format: &'a str,
}

impl<'a, K: Kind> Helpers<'a, K> {
    pub fn new(directory: PersonDirectory<'a, K>, date_format: &'a str) -> Self {
        Self {
            directory,
            date_format,
        }
    }

    pub fn from_config(config: &'a SiteConfig, corpus: &'a PostCorpus) -> Self {
        Self::new(
            PersonDirectory::from_config(config, corpus),
            &config.date_format,
        )
    }

    /// `Ok(None)` when the registry is empty.
    fn resolve(&self, name: &str) -> Result<Option<&'a Profile>, LookupError> {
        let registry = self.directory.registry();
        if registry.is_empty() {
            return Ok(None);
        }
        registry
            .find(name)
            .map(Some)
            .ok_or_else(|| LookupError::NotFound {
                kind: K::SINGULAR,
                name: name.to_string(),
            })
    }

    pub fn url_for(&self, name: &str) -> Result<String, LookupError> {
        Ok(match self.resolve(name)? {
            Some(profile) => PersonDirectory::<K>::url(profile.slug.trim()),
            None => "/".to_string(),
        })
    }

    pub fn badges_for(&self, name: &str, link_prefix: Option<&str>) -> Result<Markup, LookupError> {
        Ok(match self.resolve(name)? {
            Some(profile) => self.directory.badges(profile, link_prefix),
            None => html! {},
        })
    }

    pub fn level_for(&self, name: &str) -> Result<Option<Level>, LookupError> {
        Ok(self
            .resolve(name)?
            .map(|profile| self.directory.leveled(profile).level))
    }

    /// Highlighted level meter, as shown next to a byline.
    pub fn level_meter_for(&self, name: &str) -> Result<Markup, LookupError> {
        Ok(match self.level_for(name)? {
            Some(level) => fragments::level_meter::<K>(level, true),
            None => html! {},
        })
    }

    /// Article-footer card: image, role, name, post date, level meter,
    /// specialties, academy badges, and a link to the person's page.
    pub fn short_info_card(
        &self,
        name: &str,
        post_date: Option<NaiveDateTime>,
    ) -> Result<Markup, LookupError> {
        let Some(profile) = self.resolve(name)? else {
            return Ok(html! {});
        };
        let record = self.directory.leveled(profile);
        let url = self.url_for(name)?;
        let s = K::SINGULAR;
        let profession = if record.is_founder { "Founder" } else { K::TITLE };

        Ok(html! {
            div class={ (s) "-short-info" } {
                img src=(profile.image) alt=(profile.name);
                div class={ (s) "-short-info-desc" } {
                    div class={ (s) "-short-info-header" } {
                        div class={ (s) "-profession" } { (profession) }
                        h4 {
                            a href=(url) data-ph={ "item-" (s) "__link_fullname" } { (profile.name) }
                        }
                        @if let Some(date) = post_date {
                            time class={ (s) "-post-date" } datetime=(date.format("%Y-%m-%d").to_string()) {
                                (date.format(self.date_format).to_string())
                            }
                        }
                    }
                    (fragments::level_meter::<K>(record.level, false))
                    (fragments::specialty_badges(&profile.specialties))
                    (self.directory.badges(profile, Some(ARTICLE_FOOTER_PREFIX)))
                    a class={ (s) "-visit" } href=(url) data-ph={ (ARTICLE_FOOTER_PREFIX) "-" (s) "__link_discover" } {
                        "Get to know me better"
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Contributors, DirectoryPolicy};
    use crate::people::{Academies, Registry};
    use crate::routes::RouteData;
    use crate::test_helpers::{post, profile};

    fn registry() -> Registry {
        let mut jane = profile("Jane Doe", " jane-doe ");
        jane.image = "/img/jane.jpg".to_string();
        jane.academies = Academies {
            wsa: true,
            fta: true,
        };
        jane.specialties = vec!["security".to_string()];
        Registry::new(vec![jane, profile("John Roe", "john")])
    }

    fn corpus() -> PostCorpus {
        PostCorpus::new(
            (1..=5)
                .map(|n| post(&format!("p{n}"), "2024-03-01", None, Some("Jane Doe")))
                .collect(),
        )
    }

    fn helpers<'a>(registry: &'a Registry, corpus: &'a PostCorpus) -> Helpers<'a, Contributors> {
        Helpers::new(
            PersonDirectory::new(registry, corpus, DirectoryPolicy::default()),
            "%B %-d, %Y",
        )
    }

    #[test]
    fn url_for_known_name() {
        let (r, c) = (registry(), corpus());
        assert_eq!(helpers(&r, &c).url_for("Jane Doe").unwrap(), "/contributors/jane-doe/");
    }

    #[test]
    fn url_for_empty_registry_falls_back_to_root() {
        let (r, c) = (Registry::default(), corpus());
        assert_eq!(helpers(&r, &c).url_for("Anyone").unwrap(), "/");
    }

    #[test]
    fn unknown_name_is_not_found() {
        let (r, c) = (registry(), corpus());
        let h = helpers(&r, &c);
        let expected = LookupError::NotFound {
            kind: "contributor",
            name: "Nobody".to_string(),
        };
        assert_eq!(h.url_for("Nobody"), Err(expected.clone()));
        assert_eq!(h.level_for("Nobody"), Err(expected.clone()));
        assert_eq!(h.short_info_card("Nobody", None).map(|m| m.into_string()), Err(expected));
    }

    #[test]
    fn empty_registry_yields_empty_fragments() {
        let (r, c) = (Registry::default(), corpus());
        let h = helpers(&r, &c);
        assert_eq!(h.badges_for("X", None).unwrap().into_string(), "");
        assert_eq!(h.level_for("X").unwrap(), None);
        assert_eq!(h.level_meter_for("X").unwrap().into_string(), "");
        assert_eq!(h.short_info_card("X", None).unwrap().into_string(), "");
    }

    #[test]
    fn level_for_uses_current_corpus() {
        let r = registry();
        let c = corpus();
        assert_eq!(helpers(&r, &c).level_for("Jane Doe").unwrap(), Some(Level::Expert));
        let smaller = PostCorpus::new(vec![post("p1", "2024-03-01", None, Some("Jane Doe"))]);
        assert_eq!(
            helpers(&r, &smaller).level_for("Jane Doe").unwrap(),
            Some(Level::Beginner)
        );
    }

    #[test]
    fn badges_match_what_the_directory_embeds() {
        let (r, c) = (registry(), corpus());
        let directory = PersonDirectory::<Contributors>::new(&r, &c, DirectoryPolicy::default());
        let routes = directory.generate_detail_routes();
        let RouteData::Person { record, .. } = &routes[0].data else {
            panic!("expected person data");
        };
        let embedded = directory.badges(record.profile, Some("profile")).into_string();
        let helper = helpers(&r, &c)
            .badges_for("Jane Doe", Some("profile"))
            .unwrap()
            .into_string();
        assert_eq!(embedded, helper);
    }

    #[test]
    fn level_meter_for_is_highlighted() {
        let (r, c) = (registry(), corpus());
        let html = helpers(&r, &c).level_meter_for("Jane Doe").unwrap().into_string();
        assert!(html.contains("contributor-contribution-level-expert"));
        assert!(html.contains("contributor-contribution-level-highlighted"));
    }

    #[test]
    fn short_info_card_contents() {
        let (r, c) = (registry(), corpus());
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let html = helpers(&r, &c)
            .short_info_card("Jane Doe", Some(date))
            .unwrap()
            .into_string();
        assert!(html.contains(r#"<div class="contributor-short-info">"#));
        assert!(html.contains(r#"src="/img/jane.jpg""#));
        assert!(html.contains(r#"<div class="contributor-profession">Contributor</div>"#));
        assert!(html.contains(r#"data-ph="item-contributor__link_fullname""#));
        assert!(html.contains(r#"datetime="2024-03-09""#));
        assert!(html.contains("March 9, 2024"));
        assert!(html.contains("contributor-contribution-level-expert"));
        assert!(html.contains("security"));
        assert!(html.contains("article-footer-contributor-academies__link_wsa"));
        assert!(html.contains(r#"data-ph="article-footer-contributor__link_discover""#));
        assert_eq!(html.matches(r#"href="/contributors/jane-doe/""#).count(), 2);
    }

    #[test]
    fn short_info_card_without_date() {
        let (r, c) = (registry(), corpus());
        let html = helpers(&r, &c).short_info_card("John Roe", None).unwrap().into_string();
        assert!(!html.contains("<time"));
        assert!(html.contains("contributor-contribution-level-beginner"));
        assert!(!html.contains("contributor-academies"));
    }

    #[test]
    fn founder_card_says_founder() {
        let (r, c) = (registry(), corpus());
        let policy = DirectoryPolicy {
            founder: Some("John Roe".to_string()),
            ..Default::default()
        };
        let h = Helpers::<Contributors>::new(PersonDirectory::new(&r, &c, policy), "%Y");
        let html = h.short_info_card("John Roe", None).unwrap().into_string();
        assert!(html.contains(">Founder</div>"));
    }
}
