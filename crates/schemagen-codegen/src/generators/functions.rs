//! Functions: typed overload signatures plus one runtime implementation per
//! overload group.

use super::ts_types::{cardinality, cardinality_for, ident, quote, type_id, type_ref};
use super::{DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::{GeneratedModule, Tags};
use schemagen_core::{split_name, FunctionDesc, ParamDesc, ParamKind, TypeIndex, TypeModifier};
use serde_json::{json, Map, Value};

pub struct FunctionsGenerator;

impl DomainGenerator for FunctionsGenerator {
    fn name(&self) -> &'static str {
        "functions"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let catalog = ctx.catalog;
        let types = ctx.types;

        for (name, overloads) in &catalog.functions {
            let (module_name, local) = split_name(name);
            if module_name.is_empty() || overloads.is_empty() {
                continue;
            }

            let module = ctx.schema_module(module_name);
            write_function(module, module_name, types, name, &ident(local), overloads);
        }

        tracing::debug!(
            groups = catalog.functions.len(),
            overloads = catalog.function_count(),
            "Generated functions"
        );
        Ok(())
    }
}

fn write_function(
    module: &mut GeneratedModule,
    module_name: &str,
    types: &TypeIndex,
    name: &str,
    fn_name: &str,
    overloads: &[FunctionDesc],
) {
    for overload in overloads {
        let params = signature_params(module, Some(module_name), types, &overload.params);
        let ret = type_ref(module, Some(module_name), types, &overload.return_type);
        let signature = format!(
            "{}({}): $.$expr_Function<{}, {}>;",
            fn_name,
            params,
            ret,
            cardinality(cardinality_for(overload.return_typemod))
        );
        module.write_ts(format!("function {}", signature));
        module.write_dts(format!("declare function {}", signature));
    }

    module.write_ts(format!("function {}(...args: any[]): any {{", fn_name));
    module.write_js(format!("function {}(...args) {{", fn_name));
    module.indented(|m| {
        m.write_runtime(format!(
            "const {{ returnType, cardinality, args: positionalArgs, namedArgs }} = _.syntax.$resolveOverload({}, args, _.spec, [",
            quote(name)
        ));
        m.indented(|m| {
            for overload in overloads {
                m.write_runtime(format!("{},", overload_def(types, overload)));
            }
        });
        m.write_runtime("]);");
        m.write_runtime("return _.syntax.$expressionify({");
        m.indented(|m| {
            m.write_runtime("__kind__: $.ExpressionKind.Function,");
            m.write_runtime("__element__: returnType,");
            m.write_runtime("__cardinality__: cardinality,");
            m.write_runtime(format!("__name__: {},", quote(name)));
            m.write_runtime("__args__: positionalArgs,");
            m.write_runtime("__namedargs__: namedArgs,");
        });
        m.write_runtime("});");
    });
    module.write_runtime("}");
    module.blank_line();

    module.add_local_export(fn_name, false, Tags::ALL);
}

/// Parameter list of a typed signature
///
/// Named parameters are collected into a leading `namedArgs` object.
pub(crate) fn signature_params(module: &mut GeneratedModule, from: Option<&str>, types: &TypeIndex, params: &[ParamDesc]) -> String {
    let mut rendered = Vec::new();

    let named: Vec<String> = params
        .iter()
        .filter(|p| p.kind == ParamKind::Named)
        .map(|p| {
            let ty = type_ref(module, from, types, &p.type_name);
            format!("{}{}: $.TypeSet<{}>", quote(&p.name), optional_marker(p), ty)
        })
        .collect();
    if !named.is_empty() {
        let all_optional = params.iter().filter(|p| p.kind == ParamKind::Named).all(is_optional);
        rendered.push(format!(
            "namedArgs{}: {{ {} }}",
            if all_optional { "?" } else { "" },
            named.join(", ")
        ));
    }

    for param in params.iter().filter(|p| p.kind != ParamKind::Named) {
        let ty = type_ref(module, from, types, &param.type_name);
        let name = ident(&param.name);
        if param.kind == ParamKind::Variadic {
            rendered.push(format!("...{}: $.TypeSet<{}>[]", name, ty));
        } else {
            rendered.push(format!("{}{}: $.TypeSet<{}>", name, optional_marker(param), ty));
        }
    }

    rendered.join(", ")
}

fn is_optional(param: &ParamDesc) -> bool {
    param.typemod == TypeModifier::Optional || param.has_default
}

fn optional_marker(param: &ParamDesc) -> &'static str {
    if is_optional(param) {
        "?"
    } else {
        ""
    }
}

fn param_def(types: &TypeIndex, param: &ParamDesc) -> Value {
    json!({
        "typeId": type_id(types, &param.type_name).unwrap_or_else(|| param.type_name.clone()),
        "optional": is_optional(param),
        "setoftype": param.typemod == TypeModifier::SetOf,
        "variadic": param.kind == ParamKind::Variadic,
    })
}

/// Runtime overload descriptor as a JSON object literal
pub(crate) fn overload_def(types: &TypeIndex, overload: &FunctionDesc) -> String {
    let args: Vec<Value> = overload
        .params
        .iter()
        .filter(|p| p.kind != ParamKind::Named)
        .map(|p| param_def(types, p))
        .collect();

    let named: Map<String, Value> = overload
        .params
        .iter()
        .filter(|p| p.kind == ParamKind::Named)
        .map(|p| (p.name.clone(), param_def(types, p)))
        .collect();

    json!({
        "args": args,
        "namedArgs": named,
        "returnTypeId": type_id(types, &overload.return_type).unwrap_or_else(|| overload.return_type.clone()),
        "returnTypemod": overload.return_typemod.as_str(),
        "preservesOptionality": overload.preserves_optionality,
    })
    .to_string()
}
