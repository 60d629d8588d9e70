//! Test fixtures for introspection tests
//!
//! Catalog payloads shaped like the JSON the catalog queries return.

use serde_json::{json, Value};

/// Object types: `default::User` and `default::Post`
pub fn types_payload() -> Value {
    json!([
        {
            "id": "00000000-0000-0000-0000-000000000201",
            "name": "default::User",
            "pointers": [
                {"name": "name", "kind": "property", "target": "std::str", "cardinality": "One"},
                {"name": "email", "kind": "property", "target": "std::str", "cardinality": "AtMostOne",
                 "is_exclusive": true}
            ]
        },
        {
            "id": "00000000-0000-0000-0000-000000000202",
            "name": "default::Post",
            "pointers": [
                {"name": "title", "kind": "property", "target": "std::str", "cardinality": "One"},
                {"name": "author", "kind": "link", "target": "default::User", "cardinality": "One"}
            ]
        }
    ])
}

/// Scalars, including one placeholder
pub fn scalars_payload() -> Value {
    json!([
        {"id": "00000000-0000-0000-0000-000000000101", "name": "std::str"},
        {"id": "00000000-0000-0000-0000-000000000105", "name": "std::int64"},
        {"id": "00000000-0000-0000-0000-000000000001", "name": "std::anyscalar", "is_abstract": true}
    ])
}

pub fn casts_payload() -> Value {
    json!([
        {"id": "c1", "source": "std::int64", "target": "std::str", "allow_assignment": false},
        {"id": "c2", "source": "std::int16", "target": "std::int64", "allow_implicit": true}
    ])
}

pub fn functions_payload() -> Value {
    json!([
        {
            "id": "f1",
            "name": "std::len",
            "params": [{"name": "str", "type_name": "std::str", "kind": "positional"}],
            "return_type": "std::int64"
        },
        {
            "id": "f2",
            "name": "std::count",
            "params": [{"name": "s", "type_name": "anytype", "kind": "positional", "typemod": "setof"}],
            "return_type": "std::int64"
        }
    ])
}

pub fn operators_payload() -> Value {
    json!([
        {
            "id": "o1",
            "name": "std::++",
            "operator_kind": "infix",
            "params": [
                {"name": "l", "type_name": "std::str", "kind": "positional"},
                {"name": "r", "type_name": "std::str", "kind": "positional"}
            ],
            "return_type": "std::str"
        }
    ])
}

pub fn globals_payload() -> Value {
    json!([
        {"id": "g1", "name": "default::current_user", "target": "std::str", "cardinality": "AtMostOne"}
    ])
}
