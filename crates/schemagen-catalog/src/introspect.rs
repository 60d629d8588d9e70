//! Concurrent catalog introspection
//!
//! Every category query is independent, so all of them are issued at once and
//! throttled by a semaphore. The first failure aborts the whole pass; there
//! is no partial catalog.

use crate::connection::{
    CatalogCategory, CatalogQuery, ConnectionError, IntrospectionError, SchemaConnection,
};
use schemagen_core::{
    CastDesc, FunctionDesc, GlobalDesc, ObjectTypeDesc, OperatorDesc, ScalarDesc, SchemaCatalog,
    ServerVersion,
};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Maximum number of catalog queries in flight on one connection
pub const MAX_CONCURRENT_QUERIES: usize = 5;

/// Errors that abort introspection
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
}

/// Reads every catalog category from a schema connection
pub struct Introspector<'a, C: SchemaConnection + ?Sized> {
    connection: &'a C,
    version: ServerVersion,
    permits: Semaphore,
}

impl<'a, C: SchemaConnection + ?Sized> Introspector<'a, C> {
    /// Create an introspector with the default concurrency ceiling
    pub fn new(connection: &'a C, version: ServerVersion) -> Self {
        Self::with_concurrency_limit(connection, version, MAX_CONCURRENT_QUERIES)
    }

    /// Create an introspector with a custom concurrency ceiling (at least 1)
    pub fn with_concurrency_limit(connection: &'a C, version: ServerVersion, limit: usize) -> Self {
        Self {
            connection,
            version,
            permits: Semaphore::new(limit.max(1)),
        }
    }

    /// Fetch all categories and assemble the catalog
    pub async fn introspect(&self) -> Result<SchemaCatalog, CatalogError> {
        info!(
            connection = self.connection.name(),
            version = %self.version,
            "Introspecting schema"
        );

        let (types, scalars, casts, functions, operators, globals) = tokio::try_join!(
            self.fetch::<ObjectTypeDesc>(CatalogCategory::Types),
            self.fetch::<ScalarDesc>(CatalogCategory::Scalars),
            self.fetch::<CastDesc>(CatalogCategory::Casts),
            self.fetch::<FunctionDesc>(CatalogCategory::Functions),
            self.fetch::<OperatorDesc>(CatalogCategory::Operators),
            self.fetch::<GlobalDesc>(CatalogCategory::Globals),
        )?;

        let catalog = SchemaCatalog::from_parts(types, scalars, casts, functions, operators, globals);

        info!(
            object_types = catalog.object_types.len(),
            scalars = catalog.scalars.len(),
            casts = catalog.casts.len(),
            functions = catalog.function_count(),
            operators = catalog.operator_count(),
            globals = catalog.globals.len(),
            "Introspection complete"
        );

        Ok(catalog)
    }

    async fn fetch<T: DeserializeOwned>(&self, category: CatalogCategory) -> Result<Vec<T>, CatalogError> {
        let Some(query) = CatalogQuery::for_category(category, self.version) else {
            debug!(%category, version = %self.version, "Category not supported by server, skipping");
            return Ok(Vec::new());
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ConnectionError::Closed)?;

        debug!(%category, "Running catalog query");

        let payload = self
            .connection
            .query_single(&query)
            .await
            .map_err(|e| match e {
                ConnectionError::Query(message) => CatalogError::Introspection(IntrospectionError {
                    category,
                    message,
                }),
                other => CatalogError::Connection(other),
            })?;

        serde_json::from_value(payload).map_err(|e| {
            CatalogError::Introspection(IntrospectionError {
                category,
                message: format!("unexpected payload: {}", e),
            })
        })
    }
}

/// Introspect with the default concurrency ceiling
pub async fn introspect<C: SchemaConnection + ?Sized>(
    connection: &C,
    version: ServerVersion,
) -> Result<SchemaCatalog, CatalogError> {
    Introspector::new(connection, version).introspect().await
}
