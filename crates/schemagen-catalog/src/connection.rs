//! Schema connection trait and catalog queries

use schemagen_core::ServerVersion;
use serde_json::Value;
use std::fmt;

/// One category of schema metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogCategory {
    Types,
    Scalars,
    Casts,
    Functions,
    Operators,
    Globals,
}

impl CatalogCategory {
    pub const ALL: [CatalogCategory; 6] = [
        CatalogCategory::Types,
        CatalogCategory::Scalars,
        CatalogCategory::Casts,
        CatalogCategory::Functions,
        CatalogCategory::Operators,
        CatalogCategory::Globals,
    ];

    /// Stable key, also used as the field name in schema snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Types => "types",
            Self::Scalars => "scalars",
            Self::Casts => "casts",
            Self::Functions => "functions",
            Self::Operators => "operators",
            Self::Globals => "globals",
        }
    }
}

impl fmt::Display for CatalogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single-result catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: CatalogCategory,
    pub text: String,
}

impl CatalogQuery {
    /// Pick the query variant for a category on the given server
    ///
    /// Returns `None` when the server has no such category (globals before 2.0).
    pub fn for_category(category: CatalogCategory, version: ServerVersion) -> Option<Self> {
        let text = match category {
            CatalogCategory::Types => TYPES_QUERY.to_string(),
            CatalogCategory::Scalars => SCALARS_QUERY.to_string(),
            CatalogCategory::Casts => CASTS_QUERY.to_string(),
            CatalogCategory::Functions => {
                let optionality = if version.major >= 2 {
                    "preserves_optionality,"
                } else {
                    "preserves_optionality := false,"
                };
                FUNCTIONS_QUERY.replace("{optionality}", optionality)
            }
            CatalogCategory::Operators => OPERATORS_QUERY.to_string(),
            CatalogCategory::Globals => {
                if !version.supports_globals() {
                    return None;
                }
                GLOBALS_QUERY.to_string()
            }
        };

        Some(Self { category, text })
    }
}

const TYPES_QUERY: &str = r#"
WITH MODULE schema
SELECT ObjectType {
  id, name, is_abstract,
  bases := .ancestors.name,
  pointers := (SELECT .pointers {
    name,
    kind := 'link' IF Link IN .__type__ ELSE 'property',
    target := .target.name,
    cardinality := 'Many' IF .cardinality = Cardinality.Many ELSE
                   ('One' IF .required ELSE 'AtMostOne'),
    is_exclusive := EXISTS (SELECT .constraints FILTER .name = 'std::exclusive'),
    is_computed := len(.computed_fields) != 0,
    is_readonly := .readonly,
    has_default := EXISTS .default,
  } FILTER .name != '__type__')
} FILTER NOT .from_alias
ORDER BY .name"#;

const SCALARS_QUERY: &str = r#"
WITH MODULE schema
SELECT ScalarType {
  id, name, is_abstract,
  bases := .ancestors.name,
  enum_values,
  material := [IS ScalarType].bases.name,
}
ORDER BY .name"#;

const CASTS_QUERY: &str = r#"
WITH MODULE schema
SELECT Cast {
  id,
  source := .from_type.name,
  target := .to_type.name,
  allow_implicit,
  allow_assignment,
}"#;

const FUNCTIONS_QUERY: &str = r#"
WITH MODULE schema
SELECT Function {
  id, name,
  params: { name, type_name := .type.name, kind, typemod, has_default := EXISTS .default },
  return_type := .return_type.name,
  return_typemod,
  {optionality}
} FILTER .internal = false
ORDER BY .name"#;

const OPERATORS_QUERY: &str = r#"
WITH MODULE schema
SELECT Operator {
  id, name, operator_kind,
  params: { name, type_name := .type.name, kind, typemod, has_default := false },
  return_type := .return_type.name,
  return_typemod,
} FILTER NOT .abstract AND .internal = false
ORDER BY .name"#;

const GLOBALS_QUERY: &str = r#"
WITH MODULE schema
SELECT Global {
  id, name,
  target := .target.name,
  cardinality := 'Many' IF .cardinality = Cardinality.Many ELSE
                 ('One' IF .required ELSE 'AtMostOne'),
  has_default := EXISTS .default,
}
ORDER BY .name"#;

/// Errors reported by a schema connection
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Connection is closed")]
    Closed,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A catalog query that failed or returned an unexpected payload
#[derive(Debug, Clone, thiserror::Error)]
#[error("Introspection of {category} failed: {message}")]
pub struct IntrospectionError {
    pub category: CatalogCategory,
    pub message: String,
}

/// Connection to a database that can answer catalog queries
///
/// Retry and reconnect policy belong to implementations; the generator treats
/// every error as fatal.
#[async_trait::async_trait]
pub trait SchemaConnection: Send + Sync {
    /// Connection name for logs (e.g. "Snapshot")
    fn name(&self) -> &'static str;

    /// Version of the connected server
    async fn server_version(&self) -> Result<ServerVersion, ConnectionError>;

    /// Run a query expected to return exactly one JSON value
    async fn query_single(&self, query: &CatalogQuery) -> Result<Value, ConnectionError>;

    /// Release the connection
    async fn close(&self);
}
