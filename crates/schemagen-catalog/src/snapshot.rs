//! Schema snapshot connection
//!
//! Serves catalog queries from a JSON export instead of a live server:
//!
//! ```json
//! {
//!   "version": "3.0",
//!   "types": [ { "id": "...", "name": "default::User", "pointers": [...] } ],
//!   "scalars": [...], "casts": [...], "functions": [...],
//!   "operators": [...], "globals": [...]
//! }
//! ```
//!
//! Missing categories are treated as empty.

use crate::connection::{CatalogCategory, CatalogQuery, ConnectionError, SchemaConnection};
use schemagen_core::{SchemaCatalog, ServerVersion};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Connection backed by an exported schema snapshot
#[derive(Debug, Clone)]
pub struct SnapshotConnection {
    version: ServerVersion,
    categories: Map<String, Value>,
}

impl SnapshotConnection {
    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConnectionError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConnectionError::Connect(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConnectionError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ConnectionError::Config(format!("Invalid snapshot: {}", e)))?;

        let Value::Object(mut categories) = value else {
            return Err(ConnectionError::Config("Snapshot must be a JSON object".to_string()));
        };

        let version = match categories.remove("version") {
            Some(Value::String(v)) => v
                .parse()
                .map_err(|e: schemagen_core::VersionParseError| ConnectionError::Config(e.to_string()))?,
            Some(other) => {
                return Err(ConnectionError::Config(format!(
                    "Snapshot version must be a string, got {}",
                    other
                )))
            }
            None => return Err(ConnectionError::Config("Snapshot is missing \"version\"".to_string())),
        };

        Ok(Self { version, categories })
    }

    /// Build a snapshot document for a catalog
    pub fn document(catalog: &SchemaCatalog, version: ServerVersion) -> Value {
        let mut document = Map::new();
        document.insert("version".to_string(), Value::String(version.to_string()));
        for (category, payload) in catalog_payloads(catalog) {
            document.insert(category.as_str().to_string(), payload);
        }
        Value::Object(document)
    }

    /// Whether the snapshot carries a category
    pub fn has_category(&self, category: CatalogCategory) -> bool {
        self.categories.contains_key(category.as_str())
    }
}

/// Serialize each catalog category into the payload its query would return
pub(crate) fn catalog_payloads(catalog: &SchemaCatalog) -> HashMap<CatalogCategory, Value> {
    HashMap::from([
        (CatalogCategory::Types, to_array(catalog.object_types.values())),
        (CatalogCategory::Scalars, to_array(catalog.scalars.values())),
        (CatalogCategory::Casts, to_array(catalog.casts.values())),
        (CatalogCategory::Functions, to_array(catalog.functions.values().flatten())),
        (CatalogCategory::Operators, to_array(catalog.operators.values().flatten())),
        (CatalogCategory::Globals, to_array(catalog.globals.values())),
    ])
}

fn to_array<'a, T: Serialize + 'a>(items: impl Iterator<Item = &'a T>) -> Value {
    Value::Array(
        items
            .map(|item| serde_json::to_value(item).unwrap_or(Value::Null))
            .collect(),
    )
}

#[async_trait::async_trait]
impl SchemaConnection for SnapshotConnection {
    fn name(&self) -> &'static str {
        "Snapshot"
    }

    async fn server_version(&self) -> Result<ServerVersion, ConnectionError> {
        Ok(self.version)
    }

    async fn query_single(&self, query: &CatalogQuery) -> Result<Value, ConnectionError> {
        Ok(self
            .categories
            .get(query.category.as_str())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn close(&self) {}
}
