//! Object types: shape, type object and root path node per type.

use super::ts_types::{cardinality, ident, quote, type_ref};
use super::{DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::{GeneratedModule, Tags};
use schemagen_core::{split_name, ObjectTypeDesc, PointerDesc, PointerKind, TypeIndex};

pub struct ObjectTypesGenerator;

impl DomainGenerator for ObjectTypesGenerator {
    fn name(&self) -> &'static str {
        "object_types"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let catalog = ctx.catalog;
        let types = ctx.types;
        let mut count = 0;

        for object in catalog.object_types.values() {
            let (module_name, _) = split_name(&object.name);
            if module_name.is_empty() || !types.contains(&object.name) {
                continue;
            }

            let module = ctx.schema_module(module_name);
            write_object_type(module, module_name, types, object);
            count += 1;
        }

        tracing::debug!(object_types = count, "Generated object types");
        Ok(())
    }
}

fn write_object_type(module: &mut GeneratedModule, module_name: &str, types: &TypeIndex, object: &ObjectTypeDesc) {
    let local = split_name(&object.name).1;
    let type_name = format!("${}", local);
    let shape_name = format!("{}λShape", type_name);
    let root_name = ident(local);

    let bases: Vec<String> = object
        .bases
        .iter()
        .filter(|b| types.contains(b))
        .map(|b| format!("{}λShape", type_ref(module, Some(module_name), types, b)))
        .collect();

    if bases.is_empty() {
        module.write_types(format!("type {} = {{", shape_name));
    } else {
        module.write_types(format!("type {} = $.typeutil.flatten<{} & {{", shape_name, bases.join(" & ")));
    }
    module.indented(|m| {
        for pointer in &object.pointers {
            let desc = pointer_desc(m, module_name, types, pointer);
            m.write_types(format!("{}: {};", quote(&pointer.name), desc));
        }
    });
    module.write_types(if bases.is_empty() { "};" } else { "}>;" });

    module.write_types(format!(
        "type {} = $.ObjectType<{}, {}, null>;",
        type_name,
        quote(&object.name),
        shape_name
    ));
    module.write_ts(format!(
        "const {} = $.makeType<{}>(_.spec, {}, _.syntax.literal);",
        type_name,
        type_name,
        quote(&object.id)
    ));
    module.write_js(format!(
        "const {} = $.makeType(_.spec, {}, _.syntax.literal);",
        type_name,
        quote(&object.id)
    ));
    module.write_dts(format!("declare const {}: {};", type_name, type_name));
    module.blank_line();

    let root_type = format!("$.$expr_PathNode<$.TypeSet<{}, $.Cardinality.Many>, null>", type_name);
    let root_value = format!("_.syntax.$PathNode($.$toSet({}, $.Cardinality.Many), null)", type_name);
    module.write_ts(format!("const {}: {} = {};", root_name, root_type, root_value));
    module.write_js(format!("const {} = {};", root_name, root_value));
    module.write_dts(format!("declare const {}: {};", root_name, root_type));
    module.blank_line();

    module.add_local_export(shape_name, true, Tags::TYPES);
    module.add_local_export(type_name, false, Tags::ALL);
    module.add_local_export(root_name, false, Tags::ALL);
}

fn pointer_desc(module: &mut GeneratedModule, module_name: &str, types: &TypeIndex, pointer: &PointerDesc) -> String {
    let target = type_ref(module, Some(module_name), types, &pointer.target);
    let flags = format!(
        "{}, {}, {}, {}",
        pointer.is_exclusive, pointer.is_computed, pointer.is_readonly, pointer.has_default
    );

    match pointer.kind {
        PointerKind::Property => format!(
            "$.PropertyDesc<{}, {}, {}>",
            target,
            cardinality(pointer.cardinality),
            flags
        ),
        PointerKind::Link => format!(
            "$.LinkDesc<{}, {}, {{}}, {}>",
            target,
            cardinality(pointer.cardinality),
            flags
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Mode, ModuleGraph, ModulePath};
    use pretty_assertions::assert_eq;
    use schemagen_core::{Cardinality, ScalarDesc, SchemaCatalog, ServerVersion};

    fn catalog() -> SchemaCatalog {
        let mut user = ObjectTypeDesc::new("u", "default::User")
            .with_pointer(PointerDesc::property("name", "std::str", Cardinality::One))
            .with_pointer(PointerDesc::link("friends", "default::User", Cardinality::Many));
        user.bases.push("std::BaseObject".to_string());

        SchemaCatalog::from_parts(
            vec![user, ObjectTypeDesc::new("b", "std::BaseObject")],
            vec![ScalarDesc::new("s", "std::str")],
            vec![],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn user_shape_and_values() {
        let catalog = catalog();
        let types = TypeIndex::build(&catalog);
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(3, 0), "edgedb", &mut graph);

        ObjectTypesGenerator.generate(&mut ctx).unwrap();

        let default = graph.get(&ModulePath::schema_module("default")).unwrap();
        let ts: Vec<&str> = default.fragments(Mode::Ts).map(|f| f.text.as_str()).collect();

        assert_eq!(
            &ts[..5],
            &[
                "type $UserλShape = $.typeutil.flatten<_std.$BaseObjectλShape & {",
                "\"name\": $.PropertyDesc<_std.$str, $.Cardinality.One, false, false, false, false>;",
                "\"friends\": $.LinkDesc<$User, $.Cardinality.Many, {}, false, false, false, false>;",
                "}>;",
                "type $User = $.ObjectType<\"default::User\", $UserλShape, null>;",
            ]
        );
        assert_eq!(default.top_level_export_names(), vec!["$User", "User"]);

        let js: Vec<&str> = default.fragments(Mode::Js).map(|f| f.text.as_str()).collect();
        assert!(js.contains(&"const User = _.syntax.$PathNode($.$toSet($User, $.Cardinality.Many), null);"));
        assert!(!js.iter().any(|l| l.contains("PropertyDesc")));
    }

    #[test]
    fn base_without_bases_is_plain_object() {
        let catalog = catalog();
        let types = TypeIndex::build(&catalog);
        let mut graph = ModuleGraph::new();
        let mut ctx = GenerateContext::new(&catalog, &types, ServerVersion::new(3, 0), "edgedb", &mut graph);

        ObjectTypesGenerator.generate(&mut ctx).unwrap();

        let std = graph.get(&ModulePath::schema_module("std")).unwrap();
        let ts: Vec<&str> = std.fragments(Mode::Ts).map(|f| f.text.as_str()).collect();
        assert_eq!(&ts[..2], &["type $BaseObjectλShape = {", "};"]);
    }
}
