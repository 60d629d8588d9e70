//! `operators` module: the `op` function and its overload table.

use super::functions::signature_params;
use super::ts_types::{cardinality, cardinality_for, quote, type_id, type_ref};
use super::{paths, DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::{GeneratedModule, ModuleGraph, Tags};
use schemagen_core::{OperatorDesc, OperatorKind, ParamDesc, TypeIndex, TypeModifier};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const KINDS: [OperatorKind; 4] = [
    OperatorKind::Infix,
    OperatorKind::Prefix,
    OperatorKind::Postfix,
    OperatorKind::Ternary,
];

pub struct OperatorsGenerator;

impl DomainGenerator for OperatorsGenerator {
    fn name(&self) -> &'static str {
        "operators"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let catalog = ctx.catalog;
        let types = ctx.types;

        // The module always exists so the surface can tell it is empty
        let module = ctx.graph.module_mut(&paths::operators());
        let overloads: Vec<&OperatorDesc> = catalog.operators.values().flatten().collect();
        if overloads.is_empty() {
            return Ok(());
        }

        module.import_star(paths::reflection(), "$", Tags::ALL);
        module.import_star(ModuleGraph::imports_path(), "_", Tags::ALL);

        write_overload_table(module, types, &overloads);
        module.blank_line();

        for overload in &overloads {
            let signature = operator_signature(module, types, overload);
            module.write_ts(format!("function op({}", signature));
            module.write_dts(format!("declare function op({}", signature));
        }
        module.write_ts("function op(...args: any[]): any {");
        module.write_js("function op(...args) {");
        module.indented(|m| m.write_runtime("return _.syntax.$resolveOperator(overloadDefs, args, _.spec);"));
        module.write_runtime("}");

        module.add_local_export("op", false, Tags::ALL);

        tracing::debug!(overloads = overloads.len(), "Generated operators");
        Ok(())
    }
}

fn write_overload_table(module: &mut GeneratedModule, types: &TypeIndex, overloads: &[&OperatorDesc]) {
    let mut table: BTreeMap<&str, BTreeMap<&str, Vec<Value>>> = BTreeMap::new();
    for overload in overloads {
        table
            .entry(overload.operator_kind.as_str())
            .or_default()
            .entry(overload.symbol())
            .or_default()
            .push(overload_def(types, overload));
    }

    module.write_ts("const overloadDefs: Record<string, Record<string, any[]>> = {");
    module.write_js("const overloadDefs = {");
    module.indented(|m| {
        for kind in KINDS {
            let Some(symbols) = table.get(kind.as_str()) else {
                m.write_runtime(format!("{}: {{}},", kind.as_str()));
                continue;
            };
            m.write_runtime(format!("{}: {{", kind.as_str()));
            m.indented(|m| {
                for (symbol, defs) in symbols {
                    m.write_runtime(format!("{}: [", quote(symbol)));
                    m.indented(|m| {
                        for def in defs {
                            m.write_runtime(format!("{},", def));
                        }
                    });
                    m.write_runtime("],");
                }
            });
            m.write_runtime("},");
        }
    });
    module.write_runtime("};");
}

fn overload_def(types: &TypeIndex, overload: &OperatorDesc) -> Value {
    let args: Vec<Value> = overload
        .params
        .iter()
        .map(|p| {
            json!({
                "typeId": type_id(types, &p.type_name).unwrap_or_else(|| p.type_name.clone()),
                "optional": p.typemod == TypeModifier::Optional,
                "setoftype": p.typemod == TypeModifier::SetOf,
                "variadic": false,
            })
        })
        .collect();

    json!({
        "kind": overload.operator_kind.as_str(),
        "args": args,
        "returnTypeId": type_id(types, &overload.return_type).unwrap_or_else(|| overload.return_type.clone()),
        "returnTypemod": overload.return_typemod.as_str(),
    })
}

/// Signature after `op(`, including the return type
fn operator_signature(module: &mut GeneratedModule, types: &TypeIndex, overload: &OperatorDesc) -> String {
    let symbol = quote(&overload.symbol().to_lowercase());
    let param = |module: &mut GeneratedModule, p: Option<&ParamDesc>| -> String {
        match p {
            Some(p) => signature_params(module, None, types, std::slice::from_ref(p)),
            None => "operand: $.TypeSet<$.BaseType>".to_string(),
        }
    };

    let params = &overload.params;
    let args = match overload.operator_kind {
        OperatorKind::Prefix => format!("op: {}, {}", symbol, param(module, params.first())),
        OperatorKind::Postfix => format!("{}, op: {}", param(module, params.first()), symbol),
        OperatorKind::Infix => format!(
            "{}, op: {}, {}",
            param(module, params.first()),
            symbol,
            param(module, params.get(1))
        ),
        OperatorKind::Ternary => format!(
            "{}, op: {}, {}, op2: \"else\", {}",
            param(module, params.first()),
            symbol,
            param(module, params.get(1)),
            param(module, params.get(2))
        ),
    };

    let ret = type_ref(module, None, types, &overload.return_type);
    format!(
        "{}): $.$expr_Operator<{}, {}>;",
        args,
        ret,
        cardinality(cardinality_for(overload.return_typemod))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Mode;
    use schemagen_core::{ScalarDesc, SchemaCatalog, ServerVersion};

    fn operator(name: &str, kind: OperatorKind, params: Vec<ParamDesc>, ret: &str) -> OperatorDesc {
        OperatorDesc {
            id: name.to_string(),
            name: name.to_string(),
            operator_kind: kind,
            params,
            return_type: ret.to_string(),
            return_typemod: TypeModifier::Singleton,
        }
    }

    #[test]
    fn operator_table_and_signatures() {
        let catalog = SchemaCatalog::from_parts(
            vec![],
            vec![ScalarDesc::new("s", "std::str"), ScalarDesc::new("b", "std::bool")],
            vec![],
            vec![],
            vec![
                operator(
                    "std::++",
                    OperatorKind::Infix,
                    vec![ParamDesc::positional("l", "std::str"), ParamDesc::positional("r", "std::str")],
                    "std::str",
                ),
                operator("std::NOT", OperatorKind::Prefix, vec![ParamDesc::positional("v", "std::bool")], "std::bool"),
            ],
            vec![],
        );
        let types = TypeIndex::build(&catalog);
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(3, 0), "edgedb", &mut graph);

        OperatorsGenerator.generate(&mut ctx).unwrap();

        let module = graph.get(&paths::operators()).unwrap();
        let ts: Vec<&str> = module.fragments(Mode::Ts).map(|f| f.text.as_str()).collect();
        assert!(ts.contains(&"function op(l: $.TypeSet<_std.$str>, op: \"++\", r: $.TypeSet<_std.$str>): $.$expr_Operator<_std.$str, $.Cardinality.One>;"));
        assert!(ts.contains(&"function op(op: \"not\", v: $.TypeSet<_std.$bool>): $.$expr_Operator<_std.$bool, $.Cardinality.One>;"));
        assert!(ts.contains(&"Postfix: {},"));
        assert_eq!(module.top_level_export_names(), vec!["op"]);
    }

    #[test]
    fn no_operators_leaves_empty_module() {
        let catalog = SchemaCatalog::new();
        let types = TypeIndex::default();
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(3, 0), "edgedb", &mut graph);

        OperatorsGenerator.generate(&mut ctx).unwrap();

        assert!(graph.contains(&paths::operators()));
        assert!(graph.is_module_blank(&paths::operators()));
    }
}
