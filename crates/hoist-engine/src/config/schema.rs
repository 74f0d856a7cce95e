use crate::executor::ProjectView;
use crate::query::{Filter, FilterPlacement};
use crate::serialize::OutputEncoding;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HoistConfig {
    pub bookmarks: BookmarkSettings,
    pub projects: ProjectSettings,
    pub jxa: JxaSettings,
    pub output: OutputEncoding,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookmarkSettings {
    /// Scripting name of the bookmarking application ("Hook" for older releases).
    pub application: String,
}

impl Default for BookmarkSettings {
    fn default() -> Self {
        Self {
            application: "Hookmark".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub application: String,
    /// Status shorthand, see `Filter::from_str`.
    #[serde(deserialize_with = "filter_from_shorthand")]
    pub filter: Filter,
    pub filter_placement: FilterPlacement,
    pub view: ProjectView,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            application: "OmniFocus".into(),
            filter: Filter::None,
            filter_placement: FilterPlacement::Remote,
            view: ProjectView::Ranked,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JxaSettings {
    pub osascript: PathBuf,
    pub osacompile: PathBuf,
    pub compile_timeout_secs: u64,
}

impl Default for JxaSettings {
    fn default() -> Self {
        Self {
            osascript: PathBuf::from("/usr/bin/osascript"),
            osacompile: PathBuf::from("/usr/bin/osacompile"),
            compile_timeout_secs: 5,
        }
    }
}

/// Reads a filter written as status shorthand, e.g. `open` or `active, on-hold`.
fn filter_from_shorthand<'de, D>(deserializer: D) -> Result<Filter, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) => s.parse().map_err(serde::de::Error::custom),
        None => Ok(Filter::None),
    }
}
