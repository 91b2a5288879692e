//! Route descriptors: what the generators hand to the renderer.
//!
//! A route is a target path (relative to the output directory), the layout
//! that renders it, and the data the layout needs. Routes borrow from the
//! registry and post corpus they were built from and live only as long as
//! one generation pass.

use crate::directory::LeveledProfile;
use crate::paginate::PostPage;
use serde::{Deserialize, Serialize};

pub const LAYOUT_INDEX: &str = "index";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route<'a> {
    pub path: String,
    pub layout: &'static str,
    pub data: RouteData<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteData<'a> {
    /// Listing of every person of one kind
    Directory {
        kind: &'static str,
        records: Vec<LeveledProfile<'a>>,
    },
    /// One person's page
    Person {
        kind: &'static str,
        record: LeveledProfile<'a>,
    },
    /// One page of the post index
    Posts(PostPage<'a>),
}

/// Path and layout only, as recorded in `routes.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub path: String,
    pub layout: String,
}
