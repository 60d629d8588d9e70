//! Schema catalog types
//!
//! Descriptors are deserialized straight from the introspection payloads, so
//! field names follow the JSON shape returned by the catalog queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Set cardinality of a pointer, global or function result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// Always empty
    Empty,

    /// Zero or one element
    AtMostOne,

    /// Exactly one element
    One,

    /// Any number of elements
    Many,

    /// One or more elements
    AtLeastOne,
}

impl Cardinality {
    /// Whether at least one element is guaranteed
    pub fn is_required(&self) -> bool {
        matches!(self, Self::One | Self::AtLeastOne)
    }

    /// Whether more than one element is allowed
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Many | Self::AtLeastOne)
    }

    /// Member name of the runtime `Cardinality` enum
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::AtMostOne => "AtMostOne",
            Self::One => "One",
            Self::Many => "Many",
            Self::AtLeastOne => "AtLeastOne",
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Split a fully-qualified name into `(module, local name)`
///
/// `std::math::abs` splits into `("std::math", "abs")`. Unqualified names
/// belong to the empty module.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind("::") {
        Some(pos) => (&name[..pos], &name[pos + 2..]),
        None => ("", name),
    }
}

/// Whether a type name is a synthetic placeholder such as `anytype`
///
/// Placeholders appear in function and cast signatures but never name a
/// concrete type.
pub fn is_placeholder_type(name: &str) -> bool {
    let (module, local) = split_name(name);
    (module.is_empty() || module == "std") && local.starts_with("any")
}

/// Property or link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Property,
    Link,
}

/// A property or link on an object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerDesc {
    /// Pointer name
    pub name: String,

    /// Property or link
    pub kind: PointerKind,

    /// Fully-qualified target type name
    pub target: String,

    /// Declared cardinality
    pub cardinality: Cardinality,

    #[serde(default)]
    pub is_exclusive: bool,

    #[serde(default)]
    pub is_computed: bool,

    #[serde(default)]
    pub is_readonly: bool,

    #[serde(default)]
    pub has_default: bool,
}

impl PointerDesc {
    /// Create a property pointer with default flags
    pub fn property(name: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            kind: PointerKind::Property,
            target: target.into(),
            cardinality,
            is_exclusive: false,
            is_computed: false,
            is_readonly: false,
            has_default: false,
        }
    }

    /// Create a link pointer with default flags
    pub fn link(name: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            kind: PointerKind::Link,
            ..Self::property(name, target, cardinality)
        }
    }
}

/// An object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeDesc {
    pub id: String,

    /// Fully-qualified name
    pub name: String,

    #[serde(default)]
    pub is_abstract: bool,

    /// Fully-qualified names of base types
    #[serde(default)]
    pub bases: Vec<String>,

    /// Pointers in declaration order
    #[serde(default)]
    pub pointers: Vec<PointerDesc>,
}

impl ObjectTypeDesc {
    /// Create an object type without pointers
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_abstract: false,
            bases: Vec::new(),
            pointers: Vec::new(),
        }
    }

    /// Add a pointer
    pub fn with_pointer(mut self, pointer: PointerDesc) -> Self {
        self.pointers.push(pointer);
        self
    }

    /// Find a pointer by name
    pub fn find_pointer(&self, name: &str) -> Option<&PointerDesc> {
        self.pointers.iter().find(|p| p.name == name)
    }
}

/// A scalar type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarDesc {
    pub id: String,

    /// Fully-qualified name
    pub name: String,

    #[serde(default)]
    pub is_abstract: bool,

    #[serde(default)]
    pub bases: Vec<String>,

    /// Members, for enum scalars
    #[serde(default)]
    pub enum_values: Option<Vec<String>>,

    /// Name of the built-in scalar this one is derived from
    #[serde(default)]
    pub material: Option<String>,
}

impl ScalarDesc {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_abstract: false,
            bases: Vec::new(),
            enum_values: None,
            material: None,
        }
    }

    pub fn with_enum_values(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

/// A cast between two types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastDesc {
    pub id: String,
    pub source: String,
    pub target: String,

    #[serde(default)]
    pub allow_implicit: bool,

    #[serde(default)]
    pub allow_assignment: bool,
}

impl CastDesc {
    /// Catalog key of this cast
    pub fn key(&self) -> String {
        format!("{} -> {}", self.source, self.target)
    }
}

/// How an argument binds to a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Positional,
    Named,
    Variadic,
}

/// Set type modifier of a parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeModifier {
    SetOf,
    Optional,
    #[default]
    Singleton,
}

impl TypeModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetOf => "SetOfType",
            Self::Optional => "OptionalType",
            Self::Singleton => "SingletonType",
        }
    }
}

/// A function or operator parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDesc {
    pub name: String,

    /// Fully-qualified type name (may be a placeholder)
    pub type_name: String,

    pub kind: ParamKind,

    #[serde(default)]
    pub typemod: TypeModifier,

    #[serde(default)]
    pub has_default: bool,
}

impl ParamDesc {
    pub fn positional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: ParamKind::Positional,
            typemod: TypeModifier::Singleton,
            has_default: false,
        }
    }
}

/// One function overload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDesc {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub params: Vec<ParamDesc>,

    pub return_type: String,

    #[serde(default)]
    pub return_typemod: TypeModifier,

    #[serde(default)]
    pub preserves_optionality: bool,
}

/// Operator position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Infix,
    Prefix,
    Postfix,
    Ternary,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infix => "Infix",
            Self::Prefix => "Prefix",
            Self::Postfix => "Postfix",
            Self::Ternary => "Ternary",
        }
    }
}

/// One operator overload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDesc {
    pub id: String,

    /// Fully-qualified name, e.g. `std::+`
    pub name: String,

    pub operator_kind: OperatorKind,

    #[serde(default)]
    pub params: Vec<ParamDesc>,

    pub return_type: String,

    #[serde(default)]
    pub return_typemod: TypeModifier,
}

impl OperatorDesc {
    /// Operator symbol without its module, e.g. `+`
    pub fn symbol(&self) -> &str {
        split_name(&self.name).1
    }
}

/// A global variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalDesc {
    pub id: String,
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,

    #[serde(default)]
    pub has_default: bool,
}

/// Immutable snapshot of the introspected schema
///
/// Ordered maps keep every traversal (and so every generated file)
/// deterministic between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    pub object_types: BTreeMap<String, ObjectTypeDesc>,
    pub scalars: BTreeMap<String, ScalarDesc>,

    /// Keyed by `source -> target`
    pub casts: BTreeMap<String, CastDesc>,

    /// Overloads grouped by fully-qualified name
    pub functions: BTreeMap<String, Vec<FunctionDesc>>,

    /// Overloads grouped by fully-qualified name
    pub operators: BTreeMap<String, Vec<OperatorDesc>>,

    pub globals: BTreeMap<String, GlobalDesc>,
}

impl SchemaCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from flat descriptor lists
    pub fn from_parts(
        object_types: Vec<ObjectTypeDesc>,
        scalars: Vec<ScalarDesc>,
        casts: Vec<CastDesc>,
        functions: Vec<FunctionDesc>,
        operators: Vec<OperatorDesc>,
        globals: Vec<GlobalDesc>,
    ) -> Self {
        let mut catalog = Self::new();
        for ty in object_types {
            catalog.object_types.insert(ty.name.clone(), ty);
        }
        for scalar in scalars {
            catalog.scalars.insert(scalar.name.clone(), scalar);
        }
        for cast in casts {
            catalog.casts.insert(cast.key(), cast);
        }
        for func in functions {
            catalog.functions.entry(func.name.clone()).or_default().push(func);
        }
        for op in operators {
            catalog.operators.entry(op.name.clone()).or_default().push(op);
        }
        for global in globals {
            catalog.globals.insert(global.name.clone(), global);
        }
        catalog
    }

    /// Every schema module that declares at least one type, function or global
    ///
    /// Returned sorted, without duplicates.
    pub fn modules(&self) -> Vec<String> {
        let names = self
            .object_types
            .keys()
            .chain(self.scalars.keys())
            .chain(self.functions.keys())
            .chain(self.globals.keys());

        let mut modules: Vec<String> = names
            .filter(|name| !is_placeholder_type(name))
            .map(|name| split_name(name).0.to_string())
            .filter(|module| !module.is_empty())
            .collect();
        modules.sort();
        modules.dedup();
        modules
    }

    /// Total number of function overloads
    pub fn function_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    /// Total number of operator overloads
    pub fn operator_count(&self) -> usize {
        self.operators.values().map(Vec::len).sum()
    }
}
