//! Name lookup over an introspected catalog

use crate::schema::{is_placeholder_type, ObjectTypeDesc, ScalarDesc, SchemaCatalog};
use std::collections::{BTreeSet, HashMap};

/// A concrete type found in the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Object(ObjectTypeDesc),
    Scalar(ScalarDesc),
}

impl TypeDescriptor {
    pub fn id(&self) -> &str {
        match self {
            Self::Object(ty) => &ty.id,
            Self::Scalar(ty) => &ty.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Object(ty) => &ty.name,
            Self::Scalar(ty) => &ty.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Scalar(_) => "scalar",
        }
    }
}

/// Fully-qualified type name -> descriptor
///
/// Placeholder names (`anytype` and friends) referenced anywhere in the
/// catalog are kept in a separate set and never resolve through [`get`].
///
/// [`get`]: TypeIndex::get
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    types: HashMap<String, TypeDescriptor>,
    placeholders: BTreeSet<String>,
}

impl TypeIndex {
    /// Index every object and scalar type in the catalog
    pub fn build(catalog: &SchemaCatalog) -> Self {
        let mut index = Self::default();

        for ty in catalog.object_types.values() {
            index.insert(&ty.name, || TypeDescriptor::Object(ty.clone()));
        }
        for scalar in catalog.scalars.values() {
            index.insert(&scalar.name, || TypeDescriptor::Scalar(scalar.clone()));
        }

        let referenced = catalog
            .functions
            .values()
            .flatten()
            .flat_map(|f| f.params.iter().map(|p| p.type_name.as_str()).chain([f.return_type.as_str()]))
            .chain(
                catalog
                    .operators
                    .values()
                    .flatten()
                    .flat_map(|o| o.params.iter().map(|p| p.type_name.as_str()).chain([o.return_type.as_str()])),
            )
            .chain(catalog.casts.values().flat_map(|c| [c.source.as_str(), c.target.as_str()]));

        for name in referenced {
            if is_placeholder_type(name) {
                index.placeholders.insert(name.to_string());
            }
        }

        index
    }

    fn insert(&mut self, name: &str, descriptor: impl FnOnce() -> TypeDescriptor) {
        if is_placeholder_type(name) {
            self.placeholders.insert(name.to_string());
        } else {
            self.types.insert(name.to_string(), descriptor());
        }
    }

    /// Look up a concrete type by fully-qualified name
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Whether the name was seen as a placeholder
    pub fn is_placeholder(&self, name: &str) -> bool {
        self.placeholders.contains(name)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Indexed types sorted by name
    pub fn sorted(&self) -> Vec<&TypeDescriptor> {
        let mut types: Vec<&TypeDescriptor> = self.types.values().collect();
        types.sort_by(|a, b| a.name().cmp(b.name()));
        types
    }
}
