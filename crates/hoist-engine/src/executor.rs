//! Shared query pipeline for every bridge.
//!
//! invocation → query → (resolve) → extract → serialize
//!
//! Per-item faults are absorbed inside the resolver and the per-object extractor. Anything that
//! reaches `ExecutorError` is fatal for the invocation and no output is produced.

use crate::backend::{Bridge, BridgeError};
use crate::config::HoistConfig;
use crate::extract::{ExtractError, extract_columns, extract_each};
use crate::query::{Filter, QueryBuilder, QuerySpec};
use crate::resolver::Resolver;
use crate::serialize::encode;
use hoist_common::record::{BookmarkRecord, ProjectSummary, RankedProject, Record};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Field set of a project listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectView {
    /// `{id, name}`
    Summary,
    /// `{id, name, status, priority}`
    #[default]
    Ranked,
}

impl FromStr for ProjectView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(ProjectView::Summary),
            "ranked" => Ok(ProjectView::Ranked),
            other => Err(format!("Unknown project view: {} (expected summary or ranked)", other)),
        }
    }
}

/// One request from the calling process.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Bookmarks hooked to the document at `address`.
    Bookmarks { address: String },
    /// Projects in `folder`. Unset options fall back to configuration.
    Projects {
        folder: String,
        filter: Option<Filter>,
        view: Option<ProjectView>,
    },
}

pub struct QueryExecutor {
    config: HoistConfig,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(HoistConfig::default())
    }
}

impl QueryExecutor {
    pub fn new(config: HoistConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HoistConfig {
        &self.config
    }

    pub fn build_query(&self, invocation: &Invocation) -> QuerySpec {
        match invocation {
            Invocation::Bookmarks { address } => {
                QueryBuilder::hooked_bookmarks(&self.config.bookmarks.application, address)
            }
            Invocation::Projects { folder, filter, .. } => {
                let projects = &self.config.projects;
                QueryBuilder::folder_projects(
                    &projects.application,
                    folder,
                    filter.clone().unwrap_or_else(|| projects.filter.clone()),
                    projects.filter_placement,
                )
            }
        }
    }

    /// Run one invocation and return the encoded result set.
    pub async fn run<B: Bridge + ?Sized>(
        &self,
        bridge: &mut B,
        invocation: &Invocation,
    ) -> Result<String, ExecutorError> {
        let query = self.build_query(invocation);
        info!("Querying {}", query.selector());

        let output = match invocation {
            Invocation::Bookmarks { .. } => {
                let records: Vec<BookmarkRecord> = self.fetch_each(bridge, &query).await?;
                encode(&records, self.config.output)?
            }
            Invocation::Projects { view, .. } => {
                match view.unwrap_or(self.config.projects.view) {
                    ProjectView::Summary => {
                        let records: Vec<ProjectSummary> =
                            self.fetch_columns(bridge, &query).await?;
                        encode(&records, self.config.output)?
                    }
                    ProjectView::Ranked => {
                        let records: Vec<RankedProject> =
                            self.fetch_columns(bridge, &query).await?;
                        encode(&records, self.config.output)?
                    }
                }
            }
        };

        Ok(output)
    }

    /// Per-object mode: enumerate handles, then evaluate each one once, reading its attributes in
    /// the same round trip.
    pub async fn fetch_each<R: Record, B: Bridge + ?Sized>(
        &self,
        bridge: &mut B,
        query: &QuerySpec,
    ) -> Result<Vec<R>, ExecutorError> {
        let handles = bridge.elements(&query.selector()).await?;
        let resolved = Resolver::resolve_all(bridge, &handles, R::ATTRIBUTES).await?;
        let records: Vec<R> = extract_each(resolved.objects);
        debug!(
            "{} handles, {} dropped on resolve, {} records",
            handles.len(),
            resolved.dropped,
            records.len()
        );
        Ok(records)
    }

    /// Columnar mode: one bulk read per attribute, zipped positionally.
    pub async fn fetch_columns<R: Record, B: Bridge + ?Sized>(
        &self,
        bridge: &mut B,
        query: &QuerySpec,
    ) -> Result<Vec<R>, ExecutorError> {
        let local_filter = query.local_filter();
        let records = extract_columns(bridge, &query.selector(), local_filter.as_ref()).await?;
        debug!("{} records", records.len());
        Ok(records)
    }
}
