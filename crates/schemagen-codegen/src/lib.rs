//! Query builder generation
//!
//! Turns an introspected [`SchemaCatalog`] into a tree of TypeScript or
//! JavaScript modules:
//!
//! 1. domain generators fill an in-memory [`ModuleGraph`];
//! 2. the [`SurfaceMerger`] builds the index module's default export;
//! 3. the [`Emitter`] renders the graph for a [`TargetProfile`];
//! 4. [`sync_output`] writes the files and removes stale ones.
//!
//! [`generate`] runs all of it against a [`SchemaConnection`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemagen_catalog::SnapshotConnection;
//! use schemagen_codegen::{generate, GenerateOptions};
//! use schemagen_core::Target;
//!
//! let conn = SnapshotConnection::from_file("schema.json".as_ref())?;
//! let summary = generate(&conn, &GenerateOptions::new("dbschema/qb", Target::Ts)).await?;
//! println!("{} files written", summary.sync.written);
//! ```
//!
//! [`SchemaCatalog`]: schemagen_core::SchemaCatalog
//! [`SchemaConnection`]: schemagen_catalog::SchemaConnection

pub mod compat;
pub mod emit;
pub mod error;
pub mod generators;
pub mod graph;
pub mod merge;
pub mod pipeline;
pub mod support;
pub mod sync;
pub mod target;

pub use compat::{VersionGuard, GENERATOR_VERSION};
pub use emit::{Emitter, RenderedFile, GENERATED_HEADER};
pub use error::GenerateError;
pub use generators::{default_generators, DomainGenerator, GenerateContext};
pub use graph::{GeneratedModule, ImportSource, Mode, ModuleGraph, ModulePath, Tags};
pub use merge::{KeySource, MergePlan, SpreadNamespace, SurfaceMerger};
pub use pipeline::{build_graph, generate, GenerateOptions, GenerateSummary};
pub use support::{Flavor, SupportFile, SupportFiles};
pub use sync::{sync_output, DirectorySync, SyncStats, METADATA_FILE};
pub use target::{ModuleKind, RenderPass, TargetProfile};
