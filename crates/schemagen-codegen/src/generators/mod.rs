//! Domain generators
//!
//! Each generator contributes one family of declarations to the shared
//! [`ModuleGraph`]. They run sequentially, in the order returned by
//! [`default_generators`], so later generators may rely on modules created by
//! earlier ones.

mod casts;
mod functions;
mod globals;
mod object_types;
mod operators;
mod reflection;
mod runtime_spec;
mod scalars;
mod set;
pub mod ts_types;

pub use casts::CastsGenerator;
pub use functions::FunctionsGenerator;
pub use globals::GlobalsGenerator;
pub use object_types::ObjectTypesGenerator;
pub use operators::OperatorsGenerator;
pub use reflection::ReflectionGenerator;
pub use runtime_spec::RuntimeSpecGenerator;
pub use scalars::ScalarsGenerator;
pub use set::SetGenerator;

use crate::error::GenerateError;
use crate::graph::{GeneratedModule, ModuleGraph, ModulePath, Tags};
use schemagen_core::{SchemaCatalog, ServerVersion, TypeIndex};

/// Paths of the shared modules
pub mod paths {
    use crate::graph::ModulePath;

    pub fn reflection() -> ModulePath {
        ModulePath::new(["reflection"])
    }

    pub fn cast_maps() -> ModulePath {
        ModulePath::new(["castMaps"])
    }

    pub fn operators() -> ModulePath {
        ModulePath::new(["operators"])
    }

    pub fn set() -> ModulePath {
        ModulePath::new(["set"])
    }

    pub fn spec() -> ModulePath {
        ModulePath::new(["__spec__"])
    }

    /// Entry point of the support directory
    pub fn syntax() -> ModulePath {
        ModulePath::new([crate::support::SUPPORT_DIR, "syntax"])
    }
}

/// Everything a generator may read, plus the graph it writes into
pub struct GenerateContext<'a> {
    pub catalog: &'a SchemaCatalog,
    pub types: &'a TypeIndex,
    pub version: ServerVersion,
    pub runtime_package: &'a str,
    pub graph: &'a mut ModuleGraph,
}

impl<'a> GenerateContext<'a> {
    pub fn new(
        catalog: &'a SchemaCatalog,
        types: &'a TypeIndex,
        version: ServerVersion,
        runtime_package: &'a str,
        graph: &'a mut ModuleGraph,
    ) -> Self {
        Self {
            catalog,
            types,
            version,
            runtime_package,
            graph,
        }
    }

    /// The file of a schema module, created on first use
    ///
    /// New module files import the reflection and shared-imports modules, and
    /// a nested module such as `std::math` is re-exported by its parent as
    /// `math`.
    pub fn schema_module(&mut self, module: &str) -> &mut GeneratedModule {
        let segments: Vec<&str> = module.split("::").collect();

        for depth in 1..=segments.len() {
            let name = segments[..depth].join("::");
            let path = ModulePath::schema_module(&name);
            if self.graph.contains(&path) {
                continue;
            }

            let created = self.graph.module_mut(&path);
            created.import_star(paths::reflection(), "$", Tags::ALL);
            created.import_star(ModuleGraph::imports_path(), "_", Tags::ALL);

            if depth > 1 {
                let parent = ModulePath::schema_module(&segments[..depth - 1].join("::"));
                let alias = ts_types::ident(segments[depth - 1]);
                self.graph
                    .module_mut(&parent)
                    .add_export_star(path, Some(&alias), Tags::ALL);
            }
        }

        self.graph.module_mut(&ModulePath::schema_module(module))
    }
}

/// One family of generated declarations
pub trait DomainGenerator {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError>;
}

/// Generators in execution order
pub fn default_generators() -> Vec<Box<dyn DomainGenerator>> {
    vec![
        Box::new(ReflectionGenerator),
        Box::new(CastsGenerator),
        Box::new(ScalarsGenerator),
        Box::new(ObjectTypesGenerator),
        Box::new(FunctionsGenerator),
        Box::new(OperatorsGenerator),
        Box::new(GlobalsGenerator),
        Box::new(SetGenerator),
        Box::new(RuntimeSpecGenerator),
    ]
}

/// Run generators in order against one context
pub fn run_generators(generators: &[Box<dyn DomainGenerator>], ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
    for generator in generators {
        let before = ctx.graph.len();
        generator.generate(ctx)?;
        tracing::debug!(
            generator = generator.name(),
            new_modules = ctx.graph.len() - before,
            "Generator finished"
        );
    }
    Ok(())
}
