//! Field extraction: turning live remote objects or attribute columns into records.

use crate::backend::{Bridge, BridgeError};
use crate::handle::RemoteObject;
use hoist_common::record::{FieldError, Record};
use hoist_common::specifier::{Predicate, Specifier};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Column '{attribute}' has {found} values, expected {expected}")]
    MisalignedColumns {
        attribute: String,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: {source}")]
    Field {
        row: usize,
        #[source]
        source: FieldError,
    },
}

/// Build one record per live object from the values read during its resolution.
///
/// The objects must have been resolved with `R::ATTRIBUTES`. An object whose values do not form a
/// valid record (missing or ill-typed fields) is dropped whole.
pub fn extract_each<R: Record>(objects: Vec<RemoteObject>) -> Vec<R> {
    let mut records = Vec::with_capacity(objects.len());
    for object in objects {
        let origin = object.origin().clone();
        match R::from_row(records.len(), object.into_values()) {
            Ok(record) => records.push(record),
            Err(e) => debug!("Dropping {}: {}", origin, e),
        }
    }
    records
}

/// Fetch `R::ATTRIBUTES` as columns over a whole collection and zip them.
///
/// With `local_filter`, the predicate's field is fetched as one more column and rows that do not
/// pass are removed before zipping. Any fault fails the whole extraction.
pub async fn extract_columns<R: Record, B: Bridge + ?Sized>(
    bridge: &mut B,
    collection: &Specifier,
    local_filter: Option<&Predicate>,
) -> Result<Vec<R>, ExtractError> {
    let mut columns = Vec::with_capacity(R::ATTRIBUTES.len());
    for attribute in R::ATTRIBUTES {
        debug!("Fetching column '{}' of {}", attribute, collection);
        columns.push(bridge.column(collection, attribute).await?);
    }

    if let Some(predicate) = local_filter {
        let field = predicate.field();
        let keys = match R::ATTRIBUTES.iter().position(|a| *a == field) {
            Some(i) => columns[i].clone(),
            None => bridge.column(collection, field).await?,
        };
        check_aligned(R::ATTRIBUTES, &columns, keys.len())?;
        let keep: Vec<bool> = keys
            .iter()
            .map(|k| k.as_str().is_some_and(|s| predicate.accepts(s)))
            .collect();
        for column in &mut columns {
            let mut flags = keep.iter();
            column.retain(|_| flags.next().copied().unwrap_or(false));
        }
    }

    zip_columns(R::ATTRIBUTES, columns)
}

fn check_aligned(
    attributes: &[&str],
    columns: &[Vec<Value>],
    rows: usize,
) -> Result<(), ExtractError> {
    for (attribute, column) in attributes.iter().zip(columns) {
        if column.len() != rows {
            return Err(ExtractError::MisalignedColumns {
                attribute: attribute.to_string(),
                expected: rows,
                found: column.len(),
            });
        }
    }
    Ok(())
}

/// Zip attribute columns positionally into records.
///
/// Every column must have the same length; row `i` takes element `i` of every column.
pub fn zip_columns<R: Record>(
    attributes: &[&str],
    columns: Vec<Vec<Value>>,
) -> Result<Vec<R>, ExtractError> {
    let rows = columns.first().map_or(0, Vec::len);
    check_aligned(attributes, &columns, rows)?;

    let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    let mut records = Vec::with_capacity(rows);
    for row in 0..rows {
        let values: Vec<Value> = iters.iter_mut().filter_map(Iterator::next).collect();
        let record =
            R::from_row(row, values).map_err(|source| ExtractError::Field { row, source })?;
        records.push(record);
    }
    Ok(records)
}
