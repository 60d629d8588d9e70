//! Test fixtures for end-to-end generation tests

#![allow(dead_code)]

use schemagen_catalog::MockConnection;
use schemagen_core::{
    Cardinality, FunctionDesc, GlobalDesc, ObjectTypeDesc, OperatorDesc, OperatorKind, ParamDesc,
    PointerDesc, ScalarDesc, SchemaCatalog, TypeModifier,
};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// `default::User { name: std::str }` and the `std::str` scalar
pub fn user_catalog() -> SchemaCatalog {
    SchemaCatalog::from_parts(
        vec![ObjectTypeDesc::new("00000000-0000-0000-0000-000000000201", "default::User")
            .with_pointer(PointerDesc::property("name", "std::str", Cardinality::One))],
        vec![ScalarDesc::new("00000000-0000-0000-0000-000000000101", "std::str")],
        vec![],
        vec![],
        vec![],
        vec![],
    )
}

/// User catalog plus a `blog` module, functions, an operator and a global
pub fn blog_catalog() -> SchemaCatalog {
    let mut catalog = user_catalog();

    let post = ObjectTypeDesc::new("00000000-0000-0000-0000-000000000202", "blog::Post")
        .with_pointer(PointerDesc::property("title", "std::str", Cardinality::One))
        .with_pointer(PointerDesc::link("author", "default::User", Cardinality::One));
    catalog.object_types.insert(post.name.clone(), post);

    let int64 = ScalarDesc::new("00000000-0000-0000-0000-000000000105", "std::int64");
    catalog.scalars.insert(int64.name.clone(), int64);

    for (id, name) in [("f1", "std::len"), ("f2", "default::len")] {
        catalog.functions.entry(name.to_string()).or_default().push(FunctionDesc {
            id: id.to_string(),
            name: name.to_string(),
            params: vec![ParamDesc::positional("s", "std::str")],
            return_type: "std::int64".to_string(),
            return_typemod: TypeModifier::Singleton,
            preserves_optionality: false,
        });
    }

    catalog.operators.insert(
        "std::++".to_string(),
        vec![OperatorDesc {
            id: "o1".to_string(),
            name: "std::++".to_string(),
            operator_kind: OperatorKind::Infix,
            params: vec![ParamDesc::positional("l", "std::str"), ParamDesc::positional("r", "std::str")],
            return_type: "std::str".to_string(),
            return_typemod: TypeModifier::Singleton,
        }],
    );

    catalog.globals.insert(
        "default::current_user".to_string(),
        GlobalDesc {
            id: "g1".to_string(),
            name: "default::current_user".to_string(),
            target: "std::str".to_string(),
            cardinality: Cardinality::AtMostOne,
            has_default: false,
        },
    );

    catalog
}

/// Blog catalog plus `extra::Base`, an abstract scalar whose module has
/// type-level content only
pub fn blog_catalog_with_type_only_module() -> SchemaCatalog {
    let mut catalog = blog_catalog();

    let mut base = ScalarDesc::new("00000000-0000-0000-0000-000000000301", "extra::Base");
    base.is_abstract = true;
    catalog.scalars.insert(base.name.clone(), base);

    catalog
}

pub fn connection(catalog: &SchemaCatalog) -> MockConnection {
    MockConnection::from_catalog(catalog)
}

/// Relative path -> contents of every file under `root`
pub fn read_tree(root: &Path) -> BTreeMap<String, String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            let contents = std::fs::read_to_string(e.path()).unwrap();
            (relative, contents)
        })
        .collect()
}
