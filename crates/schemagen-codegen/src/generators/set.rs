//! `set` module: builds set literals, resolving element types through the
//! cast maps.

use super::{paths, DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::{ModuleGraph, Tags};

pub struct SetGenerator;

impl DomainGenerator for SetGenerator {
    fn name(&self) -> &'static str {
        "set"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let module = ctx.graph.module_mut(&paths::set());

        module.import_star(paths::reflection(), "$", Tags::ALL);
        module.import_star(ModuleGraph::imports_path(), "_", Tags::RUNTIME);
        module.import_named(paths::cast_maps(), "getSharedParentScalar", None, Tags::RUNTIME);

        let signature = "set<Expr extends $.TypeSet>(...exprs: Expr[]): $.$expr_Set<Expr>;";
        module.write_ts(format!("function {}", signature));
        module.write_ts("function set(...exprs: any[]): any {");
        module.write_js("function set(...exprs) {");
        module.indented(|m| m.write_runtime("return _.syntax.$set(getSharedParentScalar, exprs);"));
        module.write_runtime("}");
        module.write_dts(format!("declare function {}", signature));

        module.add_local_export("set", false, Tags::ALL);
        Ok(())
    }
}
