//! Shared `reflection` and `imports` modules.

use super::{paths, DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::{ImportSource, ModuleGraph, Tags};

pub struct ReflectionGenerator;

impl DomainGenerator for ReflectionGenerator {
    fn name(&self) -> &'static str {
        "reflection"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let runtime = ctx.runtime_package;

        let reflection = ctx.graph.module_mut(&paths::reflection());
        reflection.add_export_star(
            ImportSource::External(format!("{}/dist/reflection/index", runtime)),
            None,
            Tags::ALL,
        );

        let imports = ctx.graph.module_mut(&ModuleGraph::imports_path());
        imports.add_export_star(ImportSource::External(runtime.to_string()), Some(&super::ts_types::ident(runtime)), Tags::ALL);
        imports.add_export_from(paths::spec(), "spec", None, false, Tags::ALL);
        imports.add_export_star(paths::syntax(), Some("syntax"), Tags::ALL);
        imports.add_export_star(paths::cast_maps(), Some("castMaps"), Tags::ALL);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagen_core::{SchemaCatalog, ServerVersion, TypeIndex};

    #[test]
    fn shared_modules() {
        let catalog = SchemaCatalog::new();
        let types = TypeIndex::default();
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(3, 0), "edgedb", &mut graph);

        ReflectionGenerator.generate(&mut ctx).unwrap();

        let imports = graph.get(&ModuleGraph::imports_path()).unwrap();
        assert_eq!(imports.top_level_export_names(), vec!["edgedb", "spec", "syntax", "castMaps"]);
        assert!(graph.contains(&paths::reflection()));
    }
}
