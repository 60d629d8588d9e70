//! `castMaps` module: implicit and assignment casts between scalars.

use super::ts_types::{quote, type_ref};
use super::{paths, DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::{GeneratedModule, Tags};
use schemagen_core::{CastDesc, TypeIndex};
use std::collections::BTreeMap;

pub struct CastsGenerator;

impl DomainGenerator for CastsGenerator {
    fn name(&self) -> &'static str {
        "casts"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let types = ctx.types;
        let casts: Vec<&CastDesc> = ctx
            .catalog
            .casts
            .values()
            .filter(|c| types.contains(&c.source) && types.contains(&c.target))
            .collect();

        // target -> sources
        let mut assignable: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut castable: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        // source -> targets
        let mut implicit: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for cast in &casts {
            if cast.allow_implicit || cast.allow_assignment {
                assignable.entry(&cast.target).or_default().push(&cast.source);
            }
            if cast.allow_implicit {
                castable.entry(&cast.target).or_default().push(&cast.source);
                implicit.entry(&cast.source).or_default().push(&cast.target);
            }
        }

        let module = ctx.graph.module_mut(&paths::cast_maps());
        module.import_star(paths::reflection(), "$", Tags::ALL);

        write_conditional_type(module, types, "scalarAssignableBy", &assignable);
        module.blank_line();
        write_conditional_type(module, types, "scalarCastableFrom", &castable);
        module.blank_line();

        module.write_ts("const implicitCastMap = new Map<string, Set<string>>([");
        module.write_js("const implicitCastMap = new Map([");
        module.indented(|m| {
            for (source, targets) in &implicit {
                let targets = targets.iter().map(|t| quote(t)).collect::<Vec<_>>().join(", ");
                m.write_runtime(format!("[{}, new Set([{}])],", quote(source), targets));
            }
        });
        module.write_runtime("]);");
        module.write_dts("declare const implicitCastMap: Map<string, Set<string>>;");
        module.blank_line();

        module.write_ts("function isImplicitlyCastableTo(from: string, to: string): boolean {");
        module.write_js("function isImplicitlyCastableTo(from, to) {");
        module.indented(|m| {
            m.write_runtime("const targets = implicitCastMap.get(from);");
            m.write_runtime("return from === to || (targets != null && targets.has(to));");
        });
        module.write_runtime("}");
        module.write_dts("declare function isImplicitlyCastableTo(from: string, to: string): boolean;");
        module.blank_line();

        module.write_ts("function getSharedParentScalar(a: $.ScalarType, b: $.ScalarType): $.ScalarType {");
        module.write_js("function getSharedParentScalar(a, b) {");
        module.indented(|m| {
            m.write_runtime("if (isImplicitlyCastableTo(a.__name__, b.__name__)) {");
            m.indented(|m| m.write_runtime("return b;"));
            m.write_runtime("}");
            m.write_runtime("if (isImplicitlyCastableTo(b.__name__, a.__name__)) {");
            m.indented(|m| m.write_runtime("return a;"));
            m.write_runtime("}");
            m.write_runtime("throw new Error(`Types are not castable: ${a.__name__}, ${b.__name__}`);");
        });
        module.write_runtime("}");
        module.write_dts("declare function getSharedParentScalar(a: $.ScalarType, b: $.ScalarType): $.ScalarType;");

        module.add_local_export("scalarAssignableBy", true, Tags::TYPES);
        module.add_local_export("scalarCastableFrom", true, Tags::TYPES);
        module.add_local_export("implicitCastMap", false, Tags::ALL);
        module.add_local_export("isImplicitlyCastableTo", false, Tags::ALL);
        module.add_local_export("getSharedParentScalar", false, Tags::ALL);

        tracing::debug!(casts = casts.len(), implicit = implicit.len(), "Generated cast maps");
        Ok(())
    }
}

/// `T extends A ? A | ... : T extends B ? ... : T`
fn write_conditional_type(module: &mut GeneratedModule, types: &TypeIndex, name: &str, map: &BTreeMap<&str, Vec<&str>>) {
    module.write_types(format!("type {}<T extends $.BaseType> =", name));
    module.indented(|m| {
        for (target, sources) in map {
            let target_ref = type_ref(m, None, types, target);
            let mut members = vec![target_ref.clone()];
            members.extend(sources.iter().map(|s| type_ref(m, None, types, s)));
            m.write_types(format!("T extends {} ? {} :", target_ref, members.join(" | ")));
        }
        m.write_types("T;");
    });
}
