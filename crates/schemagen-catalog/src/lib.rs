//! Schema catalog introspection
//!
//! This crate defines the connection seam used to read schema metadata and the
//! introspector that turns catalog query results into a [`SchemaCatalog`].
//!
//! ## Connections
//!
//! - [`SnapshotConnection`] - reads an exported JSON schema snapshot
//! - [`MockConnection`] - canned payloads for tests
//!
//! The wire protocol itself lives outside this crate; any client that can run a
//! single-result query implements [`SchemaConnection`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemagen_catalog::{SchemaConnection, SnapshotConnection, introspect};
//!
//! let conn = SnapshotConnection::from_file("schema.json".as_ref())?;
//! let version = conn.server_version().await?;
//! let catalog = introspect(&conn, version).await?;
//! ```
//!
//! [`SchemaCatalog`]: schemagen_core::SchemaCatalog

pub mod connection;
pub mod introspect;
pub mod mock;
pub mod snapshot;

pub use connection::{CatalogCategory, CatalogQuery, ConnectionError, IntrospectionError, SchemaConnection};
pub use introspect::{introspect, CatalogError, Introspector, MAX_CONCURRENT_QUERIES};
pub use mock::MockConnection;
pub use snapshot::SnapshotConnection;
