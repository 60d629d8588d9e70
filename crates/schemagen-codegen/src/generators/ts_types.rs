//! TypeScript naming and type-expression helpers shared by the generators.

use crate::graph::{GeneratedModule, ModulePath, Tags};
use schemagen_core::{split_name, Cardinality, ScalarDesc, TypeDescriptor, TypeIndex, TypeModifier};

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do", "else",
    "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in", "instanceof",
    "new", "null", "return", "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void",
    "while", "with", "yield", "let", "static", "implements", "interface", "package", "private",
    "protected", "public", "await",
];

/// Make a schema name usable as a JavaScript identifier
///
/// Reserved words get a leading underscore; characters outside
/// `[A-Za-z0-9_$]` become underscores.
pub fn ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) || RESERVED.contains(&out.as_str()) {
        out.insert(0, '_');
    }
    out
}

/// Import alias of a schema module, e.g. `std::math` -> `_std_math`
pub fn module_alias(module: &str) -> String {
    format!("_{}", module.replace("::", "_"))
}

/// JSON-quoted string literal
pub fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Runtime `Cardinality` member
pub fn cardinality(card: Cardinality) -> String {
    format!("$.Cardinality.{}", card.as_str())
}

/// Result cardinality implied by a type modifier
pub fn cardinality_for(typemod: TypeModifier) -> Cardinality {
    match typemod {
        TypeModifier::SetOf => Cardinality::Many,
        TypeModifier::Optional => Cardinality::AtMostOne,
        TypeModifier::Singleton => Cardinality::One,
    }
}

/// TypeScript type of a scalar's values
pub fn scalar_ts_type(scalar: &ScalarDesc) -> String {
    if let Some(values) = &scalar.enum_values {
        if values.is_empty() {
            return "never".to_string();
        }
        return values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(" | ");
    }

    let material = scalar.material.as_deref().unwrap_or(&scalar.name);
    match split_name(material).1 {
        "str" | "uuid" | "decimal" => "string",
        "int16" | "int32" | "int64" | "float32" | "float64" => "number",
        "bigint" => "bigint",
        "bool" => "boolean",
        "bytes" => "Uint8Array",
        "datetime" => "Date",
        _ => "unknown",
    }
    .to_string()
}

/// Type expression for a named type, as seen from a module
///
/// `from` is the schema module being written (`None` for shared modules). A
/// type living in another schema module adds a namespace import of that
/// module. Placeholders and unknown names resolve to `$.BaseType`.
pub fn type_ref(module: &mut GeneratedModule, from: Option<&str>, types: &TypeIndex, name: &str) -> String {
    let Some(descriptor) = types.get(name) else {
        return "$.BaseType".to_string();
    };

    let (owner, local) = split_name(descriptor.name());
    if from == Some(owner) {
        return format!("${}", local);
    }

    let alias = module_alias(owner);
    module.import_star(ModulePath::schema_module(owner), alias.clone(), Tags::ALL);
    format!("{}.${}", alias, local)
}

/// Runtime type id of a named type; placeholders have none
pub fn type_id(types: &TypeIndex, name: &str) -> Option<String> {
    types.get(name).map(TypeDescriptor::id).map(str::to_string)
}
