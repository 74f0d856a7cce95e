//! Object specifiers: paths into a scriptable application's object model.
//!
//! A specifier is inert data. It is built on this side of the bridge, shipped to the bridge
//! script, and evaluated there step by step. Nothing is fetched until a bridge operation runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specifier {
    pub application: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Lazy property access, e.g. `.folders`.
    Property { name: String },
    /// Method call without arguments, e.g. `.defaultDocument()`.
    Call { name: String },
    /// Element lookup by name, e.g. `.byName("Work")`.
    ByName { name: String },
    /// Make-or-get an object of a class, e.g. `.Bookmark({address: "..."}).make()`.
    Make {
        class: String,
        #[serde(default)]
        properties: BTreeMap<String, String>,
    },
    /// Filter a collection, e.g. `.whose({...})`.
    Whose { predicate: Predicate },
    /// Positional element access, e.g. `[2]`.
    Index { index: usize },
    /// Evaluate a lazy reference, e.g. `()`.
    Invoke,
}

/// A filter over a single field of a collection's elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// `field == value`
    Match { field: String, value: String },
    /// `field == v1 || field == v2 || ...`
    Any { field: String, values: Vec<String> },
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Match { field, .. } | Predicate::Any { field, .. } => field,
        }
    }

    /// Whether an element whose `field` reads as `value` passes this predicate.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Predicate::Match { value: expected, .. } => expected == value,
            Predicate::Any { values, .. } => values.iter().any(|v| v == value),
        }
    }
}

impl Specifier {
    pub fn application(name: impl Into<String>) -> Self {
        Self {
            application: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn property(self, name: impl Into<String>) -> Self {
        self.step(Step::Property { name: name.into() })
    }

    pub fn call(self, name: impl Into<String>) -> Self {
        self.step(Step::Call { name: name.into() })
    }

    pub fn by_name(self, name: impl Into<String>) -> Self {
        self.step(Step::ByName { name: name.into() })
    }

    pub fn make<I, K, V>(self, class: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.step(Step::Make {
            class: class.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    pub fn whose(self, predicate: Predicate) -> Self {
        self.step(Step::Whose { predicate })
    }

    pub fn index(self, index: usize) -> Self {
        self.step(Step::Index { index })
    }

    pub fn invoke(self) -> Self {
        self.step(Step::Invoke)
    }

    fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Application({})", quote(&self.application))?;
        for step in &self.steps {
            match step {
                Step::Property { name } => write!(f, ".{}", name)?,
                Step::Call { name } => write!(f, ".{}()", name)?,
                Step::ByName { name } => write!(f, ".byName({})", quote(name))?,
                Step::Make { class, properties } => {
                    let props: Vec<String> = properties
                        .iter()
                        .map(|(k, v)| format!("{}: {}", k, quote(v)))
                        .collect();
                    write!(f, ".{}({{{}}}).make()", class, props.join(", "))?
                }
                Step::Whose { predicate } => match predicate {
                    Predicate::Match { field, value } => {
                        write!(f, ".whose({{{}: {}}})", field, quote(value))?
                    }
                    Predicate::Any { field, values } => {
                        let alternatives: Vec<String> = values
                            .iter()
                            .map(|v| format!("{{{}: {}}}", field, quote(v)))
                            .collect();
                        write!(f, ".whose({{_or: [{}]}})", alternatives.join(", "))?
                    }
                },
                Step::Index { index } => write!(f, "[{}]", index)?,
                Step::Invoke => write!(f, "()")?,
            }
        }
        Ok(())
    }
}
