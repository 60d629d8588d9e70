//! Surface merger
//!
//! Builds the default export of the index module by spreading several
//! namespaces into one object. Namespaces are listed in precedence order:
//! when two export the same key, the earlier one wins and the later one's
//! type omits the key.

use crate::compat::VersionGuard;
use crate::error::GenerateError;
use crate::generators::paths;
use crate::generators::ts_types::{module_alias, quote};
use crate::graph::{GeneratedModule, ModuleGraph, ModulePath, Tags};
use schemagen_core::SchemaCatalog;
use std::collections::HashSet;

/// Keys the syntax support module contributes to the surface
pub const SYNTAX_KEYS: &[&str] = &[
    "literal",
    "select",
    "insert",
    "update",
    "group",
    "params",
    "detached",
    "alias",
    "cast",
    "is",
    "ASC",
    "DESC",
    "EMPTY_FIRST",
    "EMPTY_LAST",
];

const SURFACE_NAME: &str = "__defaultExports";

/// Where a namespace's keys come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// A fixed list
    Explicit(Vec<String>),

    /// The value exports of the backing module
    FromModule,
}

/// One namespace spread into the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadNamespace {
    /// Local alias in the index module
    pub name: String,

    /// Generated module backing the namespace; `None` for support files
    pub module: Option<ModulePath>,

    /// Path the index imports the namespace from
    pub import: ModulePath,

    pub keys: KeySource,

    /// Key of an explicit `"key": namespace` entry on the surface
    pub entry: Option<String>,
}

impl SpreadNamespace {
    /// Namespace not backed by a generated module
    pub fn explicit(name: &str, import: ModulePath, keys: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            module: None,
            import,
            keys: KeySource::Explicit(keys.iter().map(|k| k.to_string()).collect()),
            entry: None,
        }
    }

    /// Namespace backed by a generated module
    pub fn module(name: &str, path: ModulePath, keys: KeySource) -> Self {
        Self {
            name: name.to_string(),
            module: Some(path.clone()),
            import: path,
            keys,
            entry: None,
        }
    }

    /// Namespace of a top-level schema module, also exposed under its name
    pub fn schema(module: &str) -> Self {
        let path = ModulePath::schema_module(module);
        Self {
            name: module_alias(module),
            module: Some(path.clone()),
            import: path,
            keys: KeySource::FromModule,
            entry: Some(module.to_string()),
        }
    }
}

/// A namespace that made it onto the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNamespace {
    pub name: String,
    pub import: ModulePath,
    pub keys: Vec<String>,
    /// Own keys already claimed by earlier namespaces, in key order
    pub omit: Vec<String>,
    pub entry: Option<String>,
}

/// Resolved surface, in precedence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub namespaces: Vec<PlannedNamespace>,
}

impl MergePlan {
    /// Namespace a key resolves to
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|ns| ns.keys.iter().any(|k| k == key))
            .map(|ns| ns.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&PlannedNamespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }
}

/// Plans and writes the index module's default export
#[derive(Debug, Clone)]
pub struct SurfaceMerger {
    namespaces: Vec<SpreadNamespace>,
}

impl SurfaceMerger {
    pub fn new(namespaces: Vec<SpreadNamespace>) -> Self {
        Self { namespaces }
    }

    /// Built-in namespaces followed by one per top-level schema module
    ///
    /// Schema modules are ordered `default`, `std`, then alphabetically.
    pub fn for_catalog(catalog: &SchemaCatalog) -> Self {
        let mut namespaces = vec![
            SpreadNamespace::explicit("$syntax", paths::syntax(), SYNTAX_KEYS),
            SpreadNamespace::module("_op", paths::operators(), KeySource::Explicit(vec!["op".to_string()])),
            SpreadNamespace::module("_set", paths::set(), KeySource::Explicit(vec!["set".to_string()])),
        ];

        let mut top_level: Vec<String> = Vec::new();
        for module in catalog.modules() {
            let root = module.split("::").next().unwrap_or(&module).to_string();
            if !top_level.contains(&root) {
                top_level.push(root);
            }
        }
        top_level.sort_by_key(|m| match m.as_str() {
            "default" => (0, String::new()),
            "std" => (1, String::new()),
            other => (2, other.to_string()),
        });

        namespaces.extend(top_level.iter().map(|m| SpreadNamespace::schema(m)));
        Self { namespaces }
    }

    pub fn namespaces(&self) -> &[SpreadNamespace] {
        &self.namespaces
    }

    /// Resolve keys and omit lists against the graph
    ///
    /// Backing modules that declare nothing in any mode are skipped and
    /// claim no keys.
    pub fn plan(&self, graph: &ModuleGraph) -> Result<MergePlan, GenerateError> {
        let mut claimed: HashSet<String> = HashSet::new();
        let mut plan = MergePlan::default();

        for namespace in &self.namespaces {
            let violation = || GenerateError::MergeConflictInvariantViolation {
                namespace: namespace.name.clone(),
            };

            if let Some(module) = &namespace.module {
                if !graph.contains(module) {
                    return Err(violation());
                }
                if graph.is_module_blank(module) {
                    tracing::debug!(namespace = %namespace.name, "Skipping empty namespace");
                    continue;
                }
            }

            let keys = match (&namespace.keys, &namespace.module) {
                (KeySource::Explicit(keys), _) => keys.clone(),
                (KeySource::FromModule, Some(module)) => graph.export_names(module).ok_or_else(violation)?,
                (KeySource::FromModule, None) => return Err(violation()),
            };

            let omit: Vec<String> = keys.iter().filter(|k| claimed.contains(*k)).cloned().collect();
            claimed.extend(keys.iter().cloned());

            plan.namespaces.push(PlannedNamespace {
                name: namespace.name.clone(),
                import: namespace.import.clone(),
                keys,
                omit,
                entry: namespace.entry.clone(),
            });
        }

        Ok(plan)
    }

    /// Plan the surface and write it, with the version guard and auxiliary
    /// exports, into the index module
    pub fn apply(&self, graph: &mut ModuleGraph, runtime_package: &str, guard: &VersionGuard) -> Result<MergePlan, GenerateError> {
        let plan = self.plan(graph)?;
        let index = graph.index_mut();

        index.import_star(paths::reflection(), "$", Tags::TYPES);
        for namespace in &plan.namespaces {
            index.import_star(namespace.import.clone(), namespace.name.clone(), Tags::ALL);
        }

        guard.write(index, runtime_package);
        index.blank_line();

        index.write_types("type Set<Type extends $.BaseType, Card extends $.Cardinality = $.Cardinality.Many> = $.TypeSet<Type, Card>;");
        index.add_local_export("Set", true, Tags::TYPES);
        index.add_export_from(paths::reflection(), "Cardinality", None, false, Tags::ALL);
        index.blank_line();

        write_surface(index, &plan);

        tracing::info!(
            namespaces = plan.namespaces.len(),
            keys = plan.namespaces.iter().map(|ns| ns.keys.len()).sum::<usize>(),
            "Merged surface"
        );
        Ok(plan)
    }
}

fn write_surface(index: &mut GeneratedModule, plan: &MergePlan) {
    let entries: Vec<(&str, &str)> = plan
        .namespaces
        .iter()
        .filter_map(|ns| ns.entry.as_deref().map(|key| (key, ns.name.as_str())))
        .collect();

    let mut parts: Vec<String> = plan
        .namespaces
        .iter()
        .rev()
        .map(|ns| {
            if ns.omit.is_empty() {
                format!("typeof {}", ns.name)
            } else {
                let omit = ns.omit.iter().map(|k| quote(k)).collect::<Vec<_>>().join(" | ");
                format!("Omit<typeof {}, {}>", ns.name, omit)
            }
        })
        .collect();
    parts.push("{".to_string());

    index.write_types(format!("type {} = {}", SURFACE_NAME, parts.join(" & ")));
    index.indented(|m| {
        for (key, name) in &entries {
            m.write_types(format!("{}: typeof {};", quote(key), name));
        }
    });
    index.write_types("};");

    index.write_ts(format!("const {}: {} = {{", SURFACE_NAME, SURFACE_NAME));
    index.write_js(format!("const {} = {{", SURFACE_NAME));
    index.indented(|m| {
        for namespace in plan.namespaces.iter().rev() {
            m.write_runtime(format!("...{},", namespace.name));
        }
        for (key, name) in &entries {
            m.write_runtime(format!("{}: {},", quote(key), name));
        }
    });
    index.write_runtime("};");
    index.write_dts(format!("declare const {}: {};", SURFACE_NAME, SURFACE_NAME));

    index.add_export_default(SURFACE_NAME, Tags::ALL);
}
