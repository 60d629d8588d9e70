//! schemagen core
//!
//! Catalog data model shared by the introspector and the code generators.

pub mod schema;
pub mod index;
pub mod version;
pub mod config;

pub use schema::{
    split_name, is_placeholder_type, Cardinality, CastDesc, FunctionDesc, GlobalDesc,
    ObjectTypeDesc, OperatorDesc, OperatorKind, ParamDesc, ParamKind, PointerDesc, PointerKind,
    ScalarDesc, SchemaCatalog, TypeModifier,
};
pub use index::{TypeDescriptor, TypeIndex};
pub use version::{ServerVersion, VersionParseError};
pub use config::{Config, ConfigError, ConnectionConfig, Target};
