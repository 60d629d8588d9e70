//! Mock schema connection for testing
//!
//! Returns canned catalog payloads without talking to any server. It's useful for:
//! - Unit testing introspection and generation
//! - Simulating failures of individual catalog queries
//! - Observing how many queries run at once
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemagen_catalog::{MockConnection, CatalogCategory};
//!
//! let conn = MockConnection::new()
//!     .with_payload(CatalogCategory::Types, serde_json::json!([]))
//!     .with_latency(20);
//!
//! let catalog = schemagen_catalog::introspect(&conn, conn.version()).await?;
//! assert_eq!(conn.peak_in_flight(), 5);
//! ```
//!
//! Categories without a payload answer with an empty list.

use crate::connection::{CatalogCategory, CatalogQuery, ConnectionError, SchemaConnection};
use crate::snapshot::catalog_payloads;
use schemagen_core::{SchemaCatalog, ServerVersion};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock schema connection for testing
///
/// State is shared between clones, so a test can keep a handle and inspect
/// query counters after handing a clone to the generator.
#[derive(Clone)]
pub struct MockConnection {
    /// Canned payload per category
    payloads: Arc<Mutex<HashMap<CatalogCategory, Value>>>,

    /// Errors to return for specific categories
    errors: Arc<Mutex<HashMap<CatalogCategory, ConnectionError>>>,

    /// Simulated server version
    version: ServerVersion,

    /// Fail `server_version` with a connect error
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    queries: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl MockConnection {
    /// Create a mock connection for an empty schema on a 3.0 server
    pub fn new() -> Self {
        Self {
            payloads: Arc::new(Mutex::new(HashMap::new())),
            errors: Arc::new(Mutex::new(HashMap::new())),
            version: ServerVersion::new(3, 0),
            fail_connection: false,
            latency_ms: 0,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock connection that serves an existing catalog
    pub fn from_catalog(catalog: &SchemaCatalog) -> Self {
        let conn = Self::new();
        conn.set_catalog(catalog);
        conn
    }

    /// Set the payload for a category
    pub fn with_payload(self, category: CatalogCategory, payload: Value) -> Self {
        lock(&self.payloads).insert(category, payload);
        self
    }

    /// Fail the query for a category
    pub fn with_error(self, category: CatalogCategory, error: ConnectionError) -> Self {
        lock(&self.errors).insert(category, error);
        self
    }

    /// Report a different server version
    pub fn with_version(mut self, version: ServerVersion) -> Self {
        self.version = version;
        self
    }

    /// Fail the initial handshake
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Delay every query by `latency_ms`
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Replace the payloads with a new catalog
    pub fn set_catalog(&self, catalog: &SchemaCatalog) {
        *lock(&self.payloads) = catalog_payloads(catalog);
    }

    /// Simulated server version
    pub fn version(&self) -> ServerVersion {
        self.version
    }

    /// Highest number of queries observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Number of queries issued so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a map, ignoring poisoning from a panicked test thread
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Decrements the in-flight counter when a query finishes or is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl SchemaConnection for MockConnection {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn server_version(&self) -> Result<ServerVersion, ConnectionError> {
        if self.fail_connection {
            return Err(ConnectionError::Connect("Simulated connection failure".to_string()));
        }
        Ok(self.version)
    }

    async fn query_single(&self, query: &CatalogQuery) -> Result<Value, ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        self.queries.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        self.simulate_latency().await;

        if let Some(error) = lock(&self.errors).get(&query.category) {
            return Err(error.clone());
        }

        Ok(lock(&self.payloads)
            .get(&query.category)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
