//! In-process bridge over a YAML object graph.
//!
//! The fixture mirrors the applications' scripting dictionaries: keys are the names the bridge
//! script would use (`defaultDocument`, `folders`, `flattenedProjects`, `Bookmark`,
//! `hookedBookmarks`). Two extra keys simulate faults:
//!
//! - `broken: true` on an element makes evaluating its reference fail, like a hook whose file
//!   was moved.
//! - `faulty: [attr, ...]` makes reading those attributes fail.
//!
//! ```yaml
//! Hookmark:
//!   Bookmark:
//!     - address: /docs/a.txt
//!       hookedBookmarks:
//!         - { name: Spec, address: "file:///spec.md" }
//!         - { broken: true }
//! OmniFocus:
//!   defaultDocument:
//!     folders:
//!       - name: Work
//!         flattenedProjects:
//!           - { id: 1, name: A, status: active status }
//! ```

use crate::backend::{Bridge, BridgeError};
use async_trait::async_trait;
use hoist_common::protocol::{BridgeRequest, BridgeResponse};
use hoist_common::specifier::{Specifier, Step};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct FixtureBridge {
    source: Option<PathBuf>,
    root: Value,
    ready: bool,
    requests: Vec<BridgeRequest>,
}

impl FixtureBridge {
    pub fn from_value(root: Value) -> Self {
        Self {
            source: None,
            root,
            ready: false,
            requests: Vec::new(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, BridgeError> {
        let root: Value = serde_yaml::from_str(yaml)
            .map_err(|e| BridgeError::Serialization(format!("Invalid fixture: {}", e)))?;
        Ok(Self::from_value(root))
    }

    /// A bridge that reads its object graph from `path` on launch.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            root: Value::Null,
            ready: false,
            requests: Vec::new(),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> &[BridgeRequest] {
        &self.requests
    }

    async fn load(path: &Path) -> Result<Value, BridgeError> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| {
            BridgeError::Serialization(format!("Invalid fixture {}: {}", path.display(), e))
        })
    }

    fn dispatch(&self, request: &BridgeRequest) -> Result<Value, BridgeError> {
        match request {
            BridgeRequest::Elements(req) => match self.evaluate(&req.collection)? {
                Value::Array(items) => Ok(json!({ "count": items.len() })),
                _ => Err(BridgeError::InvalidRequest(format!(
                    "{} is not a collection",
                    req.collection
                ))),
            },
            BridgeRequest::Read(req) => {
                let object = self.evaluate(&req.handle.clone().invoke())?;
                req.attributes
                    .iter()
                    .map(|attribute| read_attribute(&object, attribute))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            BridgeRequest::Column(req) => match self.evaluate(&req.collection)? {
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        if is_broken(item) {
                            return Err(BridgeError::ScriptError(format!(
                                "Can't get {} of a missing object",
                                req.attribute
                            )));
                        }
                        read_attribute(item, &req.attribute)
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(BridgeError::InvalidRequest(format!(
                    "{} is not a collection",
                    req.collection
                ))),
            },
        }
    }

    fn evaluate(&self, spec: &Specifier) -> Result<Value, BridgeError> {
        let not_found = || BridgeError::NotFound {
            target: spec.to_string(),
        };

        let mut current = self
            .root
            .get(&spec.application)
            .cloned()
            .ok_or_else(|| BridgeError::ApplicationUnavailable(spec.application.clone()))?;

        for step in &spec.steps {
            current = match step {
                Step::Property { name } | Step::Call { name } => match current.get(name) {
                    Some(next) => next.clone(),
                    None if current.get(MADE).is_some() => Value::Array(Vec::new()),
                    None => return Err(not_found()),
                },
                Step::ByName { name } => elements(&current)
                    .ok_or_else(not_found)?
                    .iter()
                    .find(|e| e.get("name").and_then(Value::as_str) == Some(name.as_str()))
                    .cloned()
                    .ok_or_else(not_found)?,
                Step::Make { class, properties } => {
                    let existing = current.get(class).and_then(Value::as_array).and_then(|all| {
                        all.iter().find(|e| {
                            properties
                                .iter()
                                .all(|(k, v)| e.get(k).and_then(Value::as_str) == Some(v.as_str()))
                        })
                    });
                    match existing {
                        Some(found) => found.clone(),
                        None => {
                            let mut made: Map<String, Value> = properties
                                .iter()
                                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                                .collect();
                            made.insert(MADE.to_string(), Value::Bool(true));
                            Value::Object(made)
                        }
                    }
                }
                Step::Whose { predicate } => Value::Array(
                    elements(&current)
                        .ok_or_else(not_found)?
                        .iter()
                        .filter(|e| {
                            e.get(predicate.field())
                                .and_then(Value::as_str)
                                .is_some_and(|v| predicate.accepts(v))
                        })
                        .cloned()
                        .collect(),
                ),
                Step::Index { index } => elements(&current)
                    .and_then(|items| items.get(*index))
                    .cloned()
                    .ok_or_else(not_found)?,
                Step::Invoke => {
                    if is_broken(&current) {
                        return Err(BridgeError::StaleReference {
                            target: spec.to_string(),
                        });
                    }
                    current
                }
            };
        }

        Ok(current)
    }
}

/// Marks an object created by a `Make` step. Its collections are empty.
const MADE: &str = "__made";

fn elements(node: &Value) -> Option<&Vec<Value>> {
    node.as_array()
}

fn is_broken(node: &Value) -> bool {
    node.get("broken").and_then(Value::as_bool) == Some(true)
}

fn read_attribute(object: &Value, attribute: &str) -> Result<Value, BridgeError> {
    let faulty = object
        .get("faulty")
        .and_then(Value::as_array)
        .is_some_and(|list| list.iter().any(|a| a.as_str() == Some(attribute)));
    if faulty {
        return Err(BridgeError::AttributeUnavailable {
            attribute: attribute.to_string(),
            reason: format!("Can't get {}.", attribute),
        });
    }
    object
        .get(attribute)
        .cloned()
        .ok_or_else(|| BridgeError::AttributeUnavailable {
            attribute: attribute.to_string(),
            reason: format!("Object has no {}.", attribute),
        })
}

#[async_trait]
impl Bridge for FixtureBridge {
    async fn launch(&mut self) -> Result<(), BridgeError> {
        if let Some(path) = &self.source {
            info!("Loading fixture from {}", path.display());
            self.root = Self::load(path).await?;
        }
        self.ready = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BridgeError> {
        self.ready = false;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn execute(&mut self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        if !self.ready {
            return Err(BridgeError::NotReady);
        }
        debug!("Fixture {} request", request.op());
        let response = match self.dispatch(&request) {
            Ok(data) => BridgeResponse::ok(data),
            Err(e) => BridgeResponse::error(&e),
        };
        self.requests.push(request);
        Ok(response)
    }
}
