//! Globals: one `$<module>__globals` object per schema module.

use super::ts_types::{cardinality, quote, type_id, type_ref};
use super::{DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::Tags;
use schemagen_core::{split_name, GlobalDesc};
use std::collections::BTreeMap;

pub struct GlobalsGenerator;

impl DomainGenerator for GlobalsGenerator {
    fn name(&self) -> &'static str {
        "globals"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let catalog = ctx.catalog;
        let types = ctx.types;

        if catalog.globals.is_empty() {
            tracing::debug!(version = %ctx.version, "No globals in catalog");
            return Ok(());
        }

        let mut by_module: BTreeMap<&str, Vec<&GlobalDesc>> = BTreeMap::new();
        for global in catalog.globals.values() {
            let (module_name, _) = split_name(&global.name);
            if !module_name.is_empty() {
                by_module.entry(module_name).or_default().push(global);
            }
        }

        for (module_name, globals) in by_module {
            let object_name = format!("${}__globals", module_name.replace("::", "_"));
            let type_name = format!("{}Type", object_name);
            let module = ctx.schema_module(module_name);

            module.write_types(format!("type {} = {{", type_name));
            module.indented(|m| {
                for global in &globals {
                    let target = type_ref(m, Some(module_name), types, &global.target);
                    m.write_types(format!(
                        "{}: _.syntax.$expr_Global<{}, {}, {}>;",
                        quote(split_name(&global.name).1),
                        quote(&global.name),
                        target,
                        cardinality(global.cardinality)
                    ));
                }
            });
            module.write_types("};");

            module.write_ts(format!("const {}: {} = {{", object_name, type_name));
            module.write_js(format!("const {} = {{", object_name));
            module.indented(|m| {
                for global in &globals {
                    let id = type_id(types, &global.target).unwrap_or_else(|| global.target.clone());
                    m.write_runtime(format!(
                        "{}: _.syntax.makeGlobal({}, $.makeType(_.spec, {}, _.syntax.literal), {}),",
                        quote(split_name(&global.name).1),
                        quote(&global.name),
                        quote(&id),
                        cardinality(global.cardinality)
                    ));
                }
            });
            module.write_runtime("};");
            module.write_dts(format!("declare const {}: {};", object_name, type_name));
            module.blank_line();

            module.add_local_export(object_name, false, Tags::ALL);
        }

        tracing::debug!(globals = catalog.globals.len(), "Generated globals");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Mode, ModuleGraph, ModulePath};
    use schemagen_core::{Cardinality, ScalarDesc, SchemaCatalog, ServerVersion, TypeIndex};

    #[test]
    fn globals_grouped_per_module() {
        let catalog = SchemaCatalog::from_parts(
            vec![],
            vec![ScalarDesc::new("s", "std::str")],
            vec![],
            vec![],
            vec![],
            vec![GlobalDesc {
                id: "g".to_string(),
                name: "default::current_user".to_string(),
                target: "std::str".to_string(),
                cardinality: Cardinality::AtMostOne,
                has_default: false,
            }],
        );
        let types = TypeIndex::build(&catalog);
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(3, 0), "edgedb", &mut graph);

        GlobalsGenerator.generate(&mut ctx).unwrap();

        let default = graph.get(&ModulePath::schema_module("default")).unwrap();
        assert_eq!(default.top_level_export_names(), vec!["$default__globals"]);

        let js: Vec<&str> = default.fragments(Mode::Js).map(|f| f.text.as_str()).collect();
        assert!(js.contains(
            &"\"current_user\": _.syntax.makeGlobal(\"default::current_user\", $.makeType(_.spec, \"s\", _.syntax.literal), $.Cardinality.AtMostOne),"
        ));
    }

    #[test]
    fn no_globals_creates_nothing() {
        let catalog = SchemaCatalog::new();
        let types = TypeIndex::default();
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(1, 4), "edgedb", &mut graph);

        GlobalsGenerator.generate(&mut ctx).unwrap();

        assert_eq!(graph.len(), 2);
    }
}
