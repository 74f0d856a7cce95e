//! Normalized record schemas.
//!
//! Each record type names the remote attributes it is built from and knows how to build itself
//! from one positional row of attribute values. A record is either complete or not built at all.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// A flat field value: text or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
}

impl Scalar {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::Text(s)),
            Value::Number(n) => Some(Scalar::Number(n)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Number(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("Field '{field}' is missing")]
    Missing { field: &'static str },

    #[error("Field '{field}' must be text, got {found}")]
    NotText { field: &'static str, found: &'static str },

    #[error("Field '{field}' must be a string or number, got {found}")]
    NotScalar { field: &'static str, found: &'static str },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A flat record assembled from remote attributes.
pub trait Record: Serialize + Sized {
    /// Remote attributes read for each record, in the order `from_row` consumes them.
    const ATTRIBUTES: &'static [&'static str];

    /// Build a record from one row of attribute values aligned with `ATTRIBUTES`.
    ///
    /// `position` is the zero-based index of the row in the result set.
    fn from_row(position: usize, values: Vec<Value>) -> Result<Self, FieldError>;
}

/// Sequential reader over one row of attribute values.
pub struct Row {
    fields: &'static [&'static str],
    values: std::vec::IntoIter<Value>,
    cursor: usize,
}

impl Row {
    pub fn new(fields: &'static [&'static str], values: Vec<Value>) -> Self {
        Self {
            fields,
            values: values.into_iter(),
            cursor: 0,
        }
    }

    fn next(&mut self) -> Result<(&'static str, Value), FieldError> {
        let field = self.fields.get(self.cursor).copied().unwrap_or("?");
        self.cursor += 1;
        match self.values.next() {
            Some(value) => Ok((field, value)),
            None => Err(FieldError::Missing { field }),
        }
    }

    pub fn text(&mut self) -> Result<String, FieldError> {
        match self.next()? {
            (_, Value::String(s)) => Ok(s),
            (field, other) => Err(FieldError::NotText {
                field,
                found: kind_of(&other),
            }),
        }
    }

    pub fn scalar(&mut self) -> Result<Scalar, FieldError> {
        let (field, value) = self.next()?;
        let found = kind_of(&value);
        Scalar::from_value(value).ok_or(FieldError::NotScalar { field, found })
    }
}

/// A bookmark hooked to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub name: String,
    pub address: String,
}

impl Record for BookmarkRecord {
    const ATTRIBUTES: &'static [&'static str] = &["name", "address"];

    fn from_row(_position: usize, values: Vec<Value>) -> Result<Self, FieldError> {
        let mut row = Row::new(Self::ATTRIBUTES, values);
        Ok(Self {
            name: row.text()?,
            address: row.text()?,
        })
    }
}

/// A project reduced to its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Scalar,
    pub name: String,
}

impl Record for ProjectSummary {
    const ATTRIBUTES: &'static [&'static str] = &["id", "name"];

    fn from_row(_position: usize, values: Vec<Value>) -> Result<Self, FieldError> {
        let mut row = Row::new(Self::ATTRIBUTES, values);
        Ok(Self {
            id: row.scalar()?,
            name: row.text()?,
        })
    }
}

/// A project with its status token and its rank in the listing.
///
/// `priority` is not a remote attribute: it is the record's position in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProject {
    pub id: Scalar,
    pub name: String,
    pub status: String,
    pub priority: usize,
}

impl Record for RankedProject {
    const ATTRIBUTES: &'static [&'static str] = &["id", "name", "status"];

    fn from_row(position: usize, values: Vec<Value>) -> Result<Self, FieldError> {
        let mut row = Row::new(Self::ATTRIBUTES, values);
        Ok(Self {
            id: row.scalar()?,
            name: row.text()?,
            status: row.text()?,
            priority: position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bookmark_from_row() {
        let rec = BookmarkRecord::from_row(0, vec![json!("Spec"), json!("file:///spec.md")])
            .unwrap();
        assert_eq!(rec.name, "Spec");
        assert_eq!(rec.address, "file:///spec.md");
    }

    #[test]
    fn test_bookmark_rejects_null_address() {
        let err = BookmarkRecord::from_row(0, vec![json!("Spec"), Value::Null]).unwrap_err();
        assert_eq!(
            err,
            FieldError::NotText {
                field: "address",
                found: "null"
            }
        );
    }

    #[test]
    fn test_short_row_is_missing_field() {
        let err = ProjectSummary::from_row(0, vec![json!(1)]).unwrap_err();
        assert_eq!(err, FieldError::Missing { field: "name" });
    }

    #[test]
    fn test_ranked_project_field_order() {
        let rec =
            RankedProject::from_row(3, vec![json!("kX2"), json!("Garden"), json!("done status")])
                .unwrap();
        assert_eq!(rec.priority, 3);
        let out = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            out,
            r#"{"id":"kX2","name":"Garden","status":"done status","priority":3}"#
        );
    }

    #[test]
    fn test_numeric_id_stays_numeric() {
        let rec = ProjectSummary::from_row(0, vec![json!(7), json!("A")]).unwrap();
        assert_eq!(serde_json::to_string(&rec).unwrap(), r#"{"id":7,"name":"A"}"#);
    }

    #[test]
    fn test_scalar_rejects_structures() {
        assert_eq!(Scalar::from_value(json!([1, 2])), None);
        assert_eq!(Scalar::from_value(json!(true)), None);
        assert_eq!(Scalar::from_value(json!("x")), Some(Scalar::from("x")));
    }
}
