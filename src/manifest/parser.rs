//! Manifest parser: `composer.json` bytes to scripts and dependencies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

/// File name of the manifest inside each workspace root
pub const MANIFEST_FILE: &str = "composer.json";

const SCRIPTS_KEY: &str = "scripts";
const REQUIRE_KEY: &str = "require";
const REQUIRE_DEV_KEY: &str = "require-dev";

/// Manifest could not be parsed
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("top-level value must be an object, found {0}")]
    NotAnObject(&'static str),
}

/// A declared package dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name, e.g. `vendor/package`
    pub name: String,
    /// Version constraint as written in the manifest
    pub constraint: String,
    /// Declared under `require-dev`
    pub is_dev: bool,
}

impl Dependency {
    /// Section this dependency was declared in
    pub fn section(&self) -> &'static str {
        if self.is_dev {
            REQUIRE_DEV_KEY
        } else {
            REQUIRE_KEY
        }
    }
}

/// Parsed manifest contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Script names (keys of the `scripts` table)
    pub scripts: BTreeSet<String>,
    /// Runtime dependencies followed by dev dependencies, unique by name
    pub dependencies: Vec<Dependency>,
}

/// Parse raw manifest bytes.
///
/// Sections that are absent or not JSON objects are treated as empty. A
/// package listed in both `require` and `require-dev` keeps a single
/// record, the dev one, at the position of the runtime entry.
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest, ParseError> {
    let doc: Value = serde_json::from_slice(bytes)?;
    let root = match &doc {
        Value::Object(map) => map,
        other => return Err(ParseError::NotAnObject(kind_of(other))),
    };

    let scripts = section(root, SCRIPTS_KEY)
        .map(|table| table.keys().cloned().collect())
        .unwrap_or_default();

    let mut dependencies: Vec<Dependency> = Vec::new();
    for (key, is_dev) in [(REQUIRE_KEY, false), (REQUIRE_DEV_KEY, true)] {
        let Some(table) = section(root, key) else {
            continue;
        };
        for (name, constraint) in table {
            let dep = Dependency {
                name: name.clone(),
                constraint: constraint_text(constraint),
                is_dev,
            };
            match dependencies.iter_mut().find(|d| d.name == dep.name) {
                Some(existing) => *existing = dep,
                None => dependencies.push(dep),
            }
        }
    }

    Ok(Manifest {
        scripts,
        dependencies,
    })
}

fn section<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    root.get(key).and_then(Value::as_object)
}

fn constraint_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
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
