//! End-to-end generation run

use crate::compat::{VersionGuard, GENERATOR_VERSION};
use crate::emit::Emitter;
use crate::error::GenerateError;
use crate::generators::{default_generators, run_generators, GenerateContext};
use crate::graph::ModuleGraph;
use crate::merge::{MergePlan, SurfaceMerger};
use crate::support::SupportFiles;
use crate::sync::{sync_output, SyncStats};
use crate::target::TargetProfile;
use schemagen_catalog::{introspect, SchemaConnection};
use schemagen_core::{Config, SchemaCatalog, ServerVersion, Target, TypeIndex};
use std::path::PathBuf;
use std::time::Instant;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub target: Target,
    pub runtime_package: String,
    pub support: SupportFiles,
    pub generator_version: String,
}

impl GenerateOptions {
    pub fn new(output_dir: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            output_dir: output_dir.into(),
            target,
            runtime_package: crate::support::DEFAULT_RUNTIME_PACKAGE.to_string(),
            support: SupportFiles::embedded(),
            generator_version: GENERATOR_VERSION.to_string(),
        }
    }

    /// Options from a loaded config; relative paths resolve against the
    /// project root
    pub fn from_config(config: &Config) -> Result<Self, GenerateError> {
        let support = match &config.support_dir {
            Some(dir) => SupportFiles::from_dir(&config.resolve(dir))?,
            None => SupportFiles::embedded(),
        };

        Ok(Self {
            output_dir: config.resolve(&config.output_dir),
            target: config.target,
            runtime_package: config.runtime_package.clone(),
            support,
            generator_version: GENERATOR_VERSION.to_string(),
        })
    }

    pub fn with_runtime_package(mut self, package: impl Into<String>) -> Self {
        self.runtime_package = package.into();
        self
    }

    pub fn with_support(mut self, support: SupportFiles) -> Self {
        self.support = support;
        self
    }

    pub fn with_generator_version(mut self, version: impl Into<String>) -> Self {
        self.generator_version = version.into();
        self
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub target: Target,
    pub server_version: ServerVersion,
    pub object_types: usize,
    pub scalars: usize,
    pub casts: usize,
    pub functions: usize,
    pub operators: usize,
    pub globals: usize,
    /// Generated and support files rendered
    pub files: usize,
    pub sync: SyncStats,
}

/// Introspect a schema and write the query builder for one target
///
/// The connection is closed whether or not the run succeeds.
pub async fn generate<C>(conn: &C, options: &GenerateOptions) -> Result<GenerateSummary, GenerateError>
where
    C: SchemaConnection + ?Sized,
{
    let result = run(conn, options).await;
    conn.close().await;
    result
}

async fn run<C>(conn: &C, options: &GenerateOptions) -> Result<GenerateSummary, GenerateError>
where
    C: SchemaConnection + ?Sized,
{
    let start = Instant::now();
    tracing::info!(connection = conn.name(), target = %options.target, "Starting generation");

    let server_version = conn.server_version().await?;
    tracing::info!(version = %server_version, "Connected");

    let catalog = introspect(conn, server_version).await?;
    let (graph, _plan) = build_graph(&catalog, server_version, options)?;

    let profile = TargetProfile::for_target(options.target);
    let files = Emitter::new(&profile, &options.runtime_package).emit(&graph);
    let support = options.support.render(&profile, &options.runtime_package)?;
    tracing::info!(files = files.len(), support = support.len(), "Rendered output");

    let sync = sync_output(&options.output_dir, &files, &support, options.target)?;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        output = %options.output_dir.display(),
        "Generation complete"
    );

    Ok(GenerateSummary {
        target: options.target,
        server_version,
        object_types: catalog.object_types.len(),
        scalars: catalog.scalars.len(),
        casts: catalog.casts.len(),
        functions: catalog.function_count(),
        operators: catalog.operator_count(),
        globals: catalog.globals.len(),
        files: files.len() + support.len(),
        sync,
    })
}

/// Run every generator and merge the surface
///
/// This is the target-independent part of a run.
pub fn build_graph(
    catalog: &SchemaCatalog,
    version: ServerVersion,
    options: &GenerateOptions,
) -> Result<(ModuleGraph, MergePlan), GenerateError> {
    let types = TypeIndex::build(catalog);
    tracing::debug!(types = types.len(), placeholders = types.placeholders().count(), "Built type index");

    let mut graph = ModuleGraph::new();
    {
        let mut ctx = GenerateContext::new(catalog, &types, version, &options.runtime_package, &mut graph);
        run_generators(&default_generators(), &mut ctx)?;
    }

    let guard = VersionGuard::new(options.generator_version.clone());
    let plan = SurfaceMerger::for_catalog(catalog).apply(&mut graph, &options.runtime_package, &guard)?;

    tracing::info!(modules = graph.len(), "Built module graph");
    Ok((graph, plan))
}
