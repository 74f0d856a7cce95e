//! Query construction.
//!
//! Building a query never talks to the bridge and never fails. A container that does not exist
//! only shows up once the bridge evaluates the selector.

use hoist_common::specifier::{Predicate, Specifier};
use hoist_common::status::{ProjectStatus, UnknownStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which elements of a container to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// The container's full collection.
    #[default]
    None,
    /// Elements whose `field` equals `value`.
    SingleMatch { field: String, value: String },
    /// Elements whose `field` equals any of `values`.
    OrMatch { field: String, values: Vec<String> },
}

/// Where a filter predicate is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPlacement {
    /// In the application, as part of the selector.
    #[default]
    Remote,
    /// After the columns are fetched. For applications whose filtering is unreliable.
    Local,
}

impl Filter {
    pub fn single(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::SingleMatch {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn any_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::OrMatch {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Projects with the given status.
    pub fn status(status: ProjectStatus) -> Self {
        Self::single("status", status.token())
    }

    /// Projects that are active or on hold.
    pub fn open_projects() -> Self {
        Self::any_of(
            "status",
            [ProjectStatus::Active.token(), ProjectStatus::OnHold.token()],
        )
    }

    pub fn predicate(&self) -> Option<Predicate> {
        match self {
            Filter::None => None,
            Filter::SingleMatch { field, value } => Some(Predicate::Match {
                field: field.clone(),
                value: value.clone(),
            }),
            Filter::OrMatch { field, values } if values.len() == 1 => Some(Predicate::Match {
                field: field.clone(),
                value: values[0].clone(),
            }),
            Filter::OrMatch { field, values } => Some(Predicate::Any {
                field: field.clone(),
                values: values.clone(),
            }),
        }
    }
}

impl FromStr for Filter {
    type Err = UnknownStatus;

    /// Parses project status shorthand: `none`, `open`, a single status (`active`,
    /// `on-hold`, `done status`), or a comma separated list of statuses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" | "all" => Ok(Filter::None),
            "open" => Ok(Filter::open_projects()),
            list if list.contains(',') => {
                let statuses = list
                    .split(',')
                    .map(|part| part.trim().parse::<ProjectStatus>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Filter::any_of("status", statuses.into_iter().map(|s| s.token())))
            }
            single => Ok(Filter::status(single.parse()?)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::None => write!(f, "none"),
            Filter::SingleMatch { field, value } => write!(f, "{} == {:?}", field, value),
            Filter::OrMatch { field, values } => write!(f, "{} in {:?}", field, values),
        }
    }
}

/// What to fetch: a container plus an optional filter.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub container: Specifier,
    pub filter: Filter,
    pub placement: FilterPlacement,
}

impl QuerySpec {
    pub fn unfiltered(container: Specifier) -> Self {
        Self {
            container,
            filter: Filter::None,
            placement: FilterPlacement::Remote,
        }
    }

    /// The selector handed to the bridge.
    pub fn selector(&self) -> Specifier {
        match (self.placement, self.filter.predicate()) {
            (FilterPlacement::Remote, Some(predicate)) => self.container.clone().whose(predicate),
            _ => self.container.clone(),
        }
    }

    /// The predicate to apply after fetching, if filtering happens locally.
    pub fn local_filter(&self) -> Option<Predicate> {
        match self.placement {
            FilterPlacement::Local => self.filter.predicate(),
            FilterPlacement::Remote => None,
        }
    }
}

pub struct QueryBuilder;

impl QueryBuilder {
    /// The bookmarks hooked to the document at `address`.
    pub fn hooked_bookmarks(application: &str, address: &str) -> QuerySpec {
        QuerySpec::unfiltered(
            Specifier::application(application)
                .make("Bookmark", [("address", address)])
                .call("hookedBookmarks"),
        )
    }

    /// All projects under the folder named `folder`, including nested folders.
    pub fn folder_projects(
        application: &str,
        folder: &str,
        filter: Filter,
        placement: FilterPlacement,
    ) -> QuerySpec {
        QuerySpec {
            container: Specifier::application(application)
                .call("defaultDocument")
                .property("folders")
                .by_name(folder)
                .property("flattenedProjects"),
            filter,
            placement,
        }
    }
}
