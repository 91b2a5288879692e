//! Inline HTML fragments shared by directory pages and template helpers.
//!
//! Class names and `data-ph` attribute keys are consumed by the site's CSS and
//! analytics scripts; they are part of the output contract. Class prefixes
//! come from [`Kind::SINGULAR`], so the contributor badge list is
//! `contributor-academies` and the author one `author-academies`.

use crate::directory::{Kind, Level};
use crate::people::Academies;
use maud::{Markup, html};

const FOUNDER_ICON: &str = "🎖️";
const MEMBER_ICON: &str = "🏅";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Academy {
    WebSecurity,
    FullstackTesting,
}

impl Academy {
    pub const ALL: [Academy; 2] = [Academy::WebSecurity, Academy::FullstackTesting];

    /// Short code used in tracking attributes.
    pub fn code(&self) -> &'static str {
        match self {
            Academy::WebSecurity => "wsa",
            Academy::FullstackTesting => "fta",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Academy::WebSecurity => "Web Security Academy",
            Academy::FullstackTesting => "Fullstack Testing Academy",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Academy::WebSecurity => "https://websecurity-academy.com/",
            Academy::FullstackTesting => "https://fullstack-testing.com/",
        }
    }

    pub fn is_member(&self, academies: Academies) -> bool {
        match self {
            Academy::WebSecurity => academies.wsa,
            Academy::FullstackTesting => academies.fta,
        }
    }
}

/// Academy membership list: one `<li>` per academy the person belongs to.
///
/// Empty markup (no `<ul>`) when they belong to none, founder or not. With a
/// `link_prefix`, each link gets
/// `data-ph="<prefix>-<singular>-academies__link_<code>"`.
pub fn compose_badges<K: Kind>(
    academies: Academies,
    is_founder: bool,
    link_prefix: Option<&str>,
) -> Markup {
    let memberships: Vec<Academy> = Academy::ALL
        .into_iter()
        .filter(|a| a.is_member(academies))
        .collect();
    if memberships.is_empty() {
        return html! {};
    }

    let (icon, role) = if is_founder {
        (FOUNDER_ICON, "founder")
    } else {
        (MEMBER_ICON, "member")
    };

    html! {
        ul class={ (K::SINGULAR) "-academies" } {
            @for academy in &memberships {
                @let tracking = link_prefix
                    .map(|p| format!("{}-{}-academies__link_{}", p, K::SINGULAR, academy.code()));
                li {
                    (icon) " "
                    a href=(academy.url()) data-ph=[tracking] rel="nofollow noopener" target="_blank" {
                        (academy.name())
                    }
                    " "
                    span { (role) }
                }
            }
        }
    }
}

/// Three-step level meter; the current level is selected by CSS via the
/// `<singular>-contribution-level-<level>` class.
pub fn level_meter<K: Kind>(level: Level, highlighted: bool) -> Markup {
    let base = format!("{}-contribution-level", K::SINGULAR);
    let mut class = format!("{base} {base}-{level}");
    if highlighted {
        class.push_str(&format!(" {base}-highlighted"));
    }
    html! {
        div class=(class) {
            @for step in Level::ALL {
                span { (step.label()) }
            }
        }
    }
}

pub fn specialty_badges(specialties: &[String]) -> Markup {
    html! {
        @if !specialties.is_empty() {
            ul.specialties {
                @for specialty in specialties {
                    li.specialty { (specialty) }
                }
            }
        }
    }
}

/// Tracking key for a post link: `<prefix>__link_<url without slashes>`.
/// Unescaped; maud escapes it when spliced as `data-ph=(..)`.
pub fn post_ph_value(post_url: &str, prefix: &str) -> String {
    format!("{}__link_{}", prefix, post_url.trim().replace('/', ""))
}
