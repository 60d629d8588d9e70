//! In-memory module graph
//!
//! Every output file is a [`GeneratedModule`] addressed by a [`ModulePath`].
//! Modules record imports, exports and body fragments structurally; nothing
//! is rendered to text until the emitter projects the graph for a target.

use crate::error::GenerateError;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// One rendering mode of the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// TypeScript source (types and runtime code)
    Ts,

    /// JavaScript runtime code
    Js,

    /// Declaration-only output
    Dts,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Ts, Mode::Js, Mode::Dts];

    fn bit(self) -> u8 {
        match self {
            Self::Ts => 0b001,
            Self::Js => 0b010,
            Self::Dts => 0b100,
        }
    }
}

/// Set of modes a fragment, import or export is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tags(u8);

impl Tags {
    pub const TS_ONLY: Tags = Tags(0b001);
    pub const JS_ONLY: Tags = Tags(0b010);
    pub const DTS_ONLY: Tags = Tags(0b100);
    /// Executable code: TypeScript and JavaScript
    pub const RUNTIME: Tags = Tags(0b011);
    /// Type-level code: TypeScript and declarations
    pub const TYPES: Tags = Tags(0b101);
    pub const ALL: Tags = Tags(0b111);

    pub fn contains(self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn union(self, other: Tags) -> Tags {
        Tags(self.0 | other.0)
    }

    pub fn intersects(self, other: Tags) -> bool {
        self.0 & other.0 != 0
    }
}

impl From<Mode> for Tags {
    fn from(mode: Mode) -> Self {
        Tags(mode.bit())
    }
}

/// Logical address of a module, e.g. `modules/std/math`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a `/`-separated path
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Path of the file holding a schema module (`std::math` -> `modules/std/math`)
    pub fn schema_module(module: &str) -> Self {
        Self::new(std::iter::once("modules").chain(module.split("::")))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// Path used as the file stem, without extension
    pub fn file_stem(&self) -> String {
        self.0.join("/")
    }

    /// Relative specifier from the module `from` to this one, without suffix
    ///
    /// Always starts with `./` or `../`.
    pub fn relative_to(&self, from: &ModulePath) -> String {
        let from_dir = &from.0[..from.0.len().saturating_sub(1)];
        let common = from_dir
            .iter()
            .zip(self.0.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let ups = from_dir.len() - common;
        let rest = self.0[common..].join("/");

        if ups == 0 {
            format!("./{}", rest)
        } else {
            format!("{}{}", "../".repeat(ups), rest)
        }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

/// Where an import or re-export points
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportSource {
    /// Another generated (or support) file, rendered as a relative path
    Module(ModulePath),

    /// A package specifier, rendered verbatim
    External(String),
}

impl From<ModulePath> for ImportSource {
    fn from(path: ModulePath) -> Self {
        Self::Module(path)
    }
}

/// What an import binds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    /// `import * as alias`
    Star { alias: String },

    /// `import { name as alias }`
    Named { name: String, alias: Option<String> },
}

/// A single imported symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub source: ImportSource,
    pub binding: Binding,
    pub type_only: bool,
    pub tags: Tags,
}

/// A single export
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Export {
    /// Export of a declaration in this module's body
    Local { name: String, type_only: bool },

    /// `export { name as alias } from source`
    From {
        source: ImportSource,
        name: String,
        alias: Option<String>,
        type_only: bool,
    },

    /// `export * from source` or `export * as alias from source`
    Star { source: ImportSource, alias: Option<String> },

    /// `export default expr`
    Default { expr: String },
}

impl Export {
    /// Name under which a value is visible to importers, if any
    fn value_name(&self) -> Option<&str> {
        match self {
            Self::Local { name, type_only: false } => Some(name),
            Self::From { name, alias, type_only: false, .. } => Some(alias.as_deref().unwrap_or(name)),
            Self::Star { alias: Some(alias), .. } => Some(alias),
            _ => None,
        }
    }
}

/// An export tagged with the modes it is rendered in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedExport {
    pub export: Export,
    pub tags: Tags,
}

/// One line of body source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub tags: Tags,
    pub indent: usize,
    pub text: String,
}

/// One output file under construction
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    path: ModulePath,
    imports: Vec<Import>,
    exports: Vec<TaggedExport>,
    body: Vec<Fragment>,
    indent: usize,
}

impl GeneratedModule {
    pub fn new(path: ModulePath) -> Self {
        Self {
            path,
            imports: Vec::new(),
            exports: Vec::new(),
            body: Vec::new(),
            indent: 0,
        }
    }

    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    // ------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------

    /// Append source at the current indentation
    ///
    /// Multi-line text is split so that every line is indented.
    pub fn write(&mut self, text: impl AsRef<str>, tags: Tags) {
        for line in text.as_ref().lines() {
            self.body.push(Fragment {
                tags,
                indent: if line.is_empty() { 0 } else { self.indent },
                text: line.to_string(),
            });
        }
    }

    pub fn write_all(&mut self, text: impl AsRef<str>) {
        self.write(text, Tags::ALL);
    }

    pub fn write_runtime(&mut self, text: impl AsRef<str>) {
        self.write(text, Tags::RUNTIME);
    }

    pub fn write_types(&mut self, text: impl AsRef<str>) {
        self.write(text, Tags::TYPES);
    }

    pub fn write_ts(&mut self, text: impl AsRef<str>) {
        self.write(text, Tags::TS_ONLY);
    }

    pub fn write_js(&mut self, text: impl AsRef<str>) {
        self.write(text, Tags::JS_ONLY);
    }

    pub fn write_dts(&mut self, text: impl AsRef<str>) {
        self.write(text, Tags::DTS_ONLY);
    }

    /// Blank separator line in every mode
    pub fn blank_line(&mut self) {
        self.body.push(Fragment {
            tags: Tags::ALL,
            indent: 0,
            text: String::new(),
        });
    }

    /// Run `body` one indentation level deeper
    ///
    /// The level is restored before returning, whatever `body` returns.
    pub fn indented<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.indent += 1;
        let result = body(self);
        self.indent -= 1;
        result
    }

    /// Current indentation level
    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Body lines rendered in `mode`
    pub fn fragments(&self, mode: Mode) -> impl Iterator<Item = &Fragment> {
        self.body.iter().filter(move |f| f.tags.contains(mode))
    }

    // ------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------

    /// Record an import, merging tags with an identical earlier one
    pub fn add_import(&mut self, import: Import) {
        if let Some(existing) = self.imports.iter_mut().find(|i| {
            i.source == import.source && i.binding == import.binding && i.type_only == import.type_only
        }) {
            existing.tags = existing.tags.union(import.tags);
        } else {
            self.imports.push(import);
        }
    }

    /// `import * as alias from source`
    pub fn import_star(&mut self, source: impl Into<ImportSource>, alias: impl Into<String>, tags: Tags) {
        self.add_import(Import {
            source: source.into(),
            binding: Binding::Star { alias: alias.into() },
            type_only: false,
            tags,
        });
    }

    /// `import { name } from source`
    pub fn import_named(&mut self, source: impl Into<ImportSource>, name: impl Into<String>, alias: Option<&str>, tags: Tags) {
        self.add_import(Import {
            source: source.into(),
            binding: Binding::Named {
                name: name.into(),
                alias: alias.map(str::to_string),
            },
            type_only: false,
            tags,
        });
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    fn push_export(&mut self, export: Export, tags: Tags) {
        if let Some(existing) = self.exports.iter_mut().find(|e| e.export == export) {
            existing.tags = existing.tags.union(tags);
        } else {
            self.exports.push(TaggedExport { export, tags });
        }
    }

    /// Export a name declared in this module's body
    pub fn add_local_export(&mut self, name: impl Into<String>, type_only: bool, tags: Tags) {
        self.push_export(Export::Local { name: name.into(), type_only }, tags);
    }

    /// `export { name as alias } from source`
    pub fn add_export_from(
        &mut self,
        source: impl Into<ImportSource>,
        name: impl Into<String>,
        alias: Option<&str>,
        type_only: bool,
        tags: Tags,
    ) {
        self.push_export(
            Export::From {
                source: source.into(),
                name: name.into(),
                alias: alias.map(str::to_string),
                type_only,
            },
            tags,
        );
    }

    /// `export * from source`, or `export * as alias from source`
    pub fn add_export_star(&mut self, source: impl Into<ImportSource>, alias: Option<&str>, tags: Tags) {
        self.push_export(
            Export::Star {
                source: source.into(),
                alias: alias.map(str::to_string),
            },
            tags,
        );
    }

    /// `export default expr`
    pub fn add_export_default(&mut self, expr: impl Into<String>, tags: Tags) {
        self.push_export(Export::Default { expr: expr.into() }, tags);
    }

    pub fn exports(&self) -> &[TaggedExport] {
        &self.exports
    }

    /// Exports rendered in `mode`
    pub fn exports_for(&self, mode: Mode) -> impl Iterator<Item = &TaggedExport> {
        self.exports.iter().filter(move |e| e.tags.contains(mode))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether the module declares nothing in `mode`
    ///
    /// Imports alone do not count as declarations.
    pub fn is_empty(&self, mode: Mode) -> bool {
        self.fragments(mode).all(|f| f.text.trim().is_empty()) && self.exports_for(mode).next().is_none()
    }

    /// Whether the module declares nothing in any mode
    pub fn is_blank(&self) -> bool {
        Mode::ALL.into_iter().all(|mode| self.is_empty(mode))
    }

    /// Generated modules this one imports or re-exports from
    pub fn module_references(&self) -> impl Iterator<Item = &ModulePath> {
        let imports = self.imports.iter().map(|i| &i.source);
        let exports = self.exports.iter().filter_map(|e| match &e.export {
            Export::From { source, .. } | Export::Star { source, .. } => Some(source),
            _ => None,
        });

        imports.chain(exports).filter_map(|source| match source {
            ImportSource::Module(path) => Some(path),
            ImportSource::External(_) => None,
        })
    }

    /// Names of the values this module exports directly, in declaration order
    ///
    /// Type-only exports, the default export and unaliased `export *` are not
    /// included; see [`ModuleGraph::export_names`] for the latter.
    pub fn top_level_export_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.exports
            .iter()
            .filter(|e| e.tags.intersects(Tags::RUNTIME))
            .filter_map(|e| e.export.value_name())
            .filter(|name| seen.insert(name.to_string()))
            .map(str::to_string)
            .collect()
    }
}

/// Addressable collection of generated modules
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    modules: Vec<GeneratedModule>,
    positions: HashMap<ModulePath, usize>,
}

impl ModuleGraph {
    /// Create a graph holding the default (`index`) and shared-imports
    /// (`imports`) modules
    pub fn new() -> Self {
        let mut graph = Self {
            modules: Vec::new(),
            positions: HashMap::new(),
        };
        graph.module_mut(&Self::index_path());
        graph.module_mut(&Self::imports_path());
        graph
    }

    pub fn index_path() -> ModulePath {
        ModulePath::new(["index"])
    }

    pub fn imports_path() -> ModulePath {
        ModulePath::new(["imports"])
    }

    /// Get a module, creating it if needed
    pub fn module_mut(&mut self, path: &ModulePath) -> &mut GeneratedModule {
        let position = match self.positions.get(path) {
            Some(&position) => position,
            None => {
                self.modules.push(GeneratedModule::new(path.clone()));
                self.positions.insert(path.clone(), self.modules.len() - 1);
                self.modules.len() - 1
            }
        };
        &mut self.modules[position]
    }

    /// Add a module built elsewhere; fails if the path is taken
    pub fn register(&mut self, module: GeneratedModule) -> Result<(), GenerateError> {
        if self.positions.contains_key(module.path()) {
            return Err(GenerateError::DuplicateModule {
                path: module.path().to_string(),
            });
        }
        self.positions.insert(module.path().clone(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    pub fn index_mut(&mut self) -> &mut GeneratedModule {
        self.module_mut(&Self::index_path())
    }

    pub fn imports_mut(&mut self) -> &mut GeneratedModule {
        self.module_mut(&Self::imports_path())
    }

    pub fn get(&self, path: &ModulePath) -> Option<&GeneratedModule> {
        self.positions.get(path).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, path: &ModulePath) -> bool {
        self.positions.contains_key(path)
    }

    /// Modules in creation order
    pub fn modules(&self) -> impl Iterator<Item = &GeneratedModule> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Whether a module is missing or declares nothing in any mode
    pub fn is_module_blank(&self, path: &ModulePath) -> bool {
        self.get(path).map_or(true, GeneratedModule::is_blank)
    }

    /// Modules written for every pass of a target
    ///
    /// `index`, `imports` and every non-blank module, plus any module of the
    /// graph one of those references. The set does not depend on the pass, so
    /// a file imported in one dialect exists in all of them.
    pub fn emitted_paths(&self) -> BTreeSet<ModulePath> {
        let mut emitted = BTreeSet::new();
        let mut pending: Vec<&ModulePath> = self
            .modules
            .iter()
            .filter(|m| !m.is_blank() || *m.path() == Self::index_path() || *m.path() == Self::imports_path())
            .map(GeneratedModule::path)
            .collect();

        while let Some(path) = pending.pop() {
            if !emitted.insert(path.clone()) {
                continue;
            }
            if let Some(module) = self.get(path) {
                pending.extend(module.module_references().filter(|target| self.contains(target)));
            }
        }

        emitted
    }

    /// Value export names of a module, following `export *` into other
    /// modules of the graph
    ///
    /// Returns `None` when the module is not in the graph.
    pub fn export_names(&self, path: &ModulePath) -> Option<Vec<String>> {
        let mut names = Vec::new();
        let mut seen = BTreeSet::new();
        let mut visited = HashSet::new();
        self.collect_export_names(path, &mut names, &mut seen, &mut visited)?;
        Some(names)
    }

    fn collect_export_names(
        &self,
        path: &ModulePath,
        names: &mut Vec<String>,
        seen: &mut BTreeSet<String>,
        visited: &mut HashSet<ModulePath>,
    ) -> Option<()> {
        let module = self.get(path)?;
        if !visited.insert(path.clone()) {
            return Some(());
        }

        for name in module.top_level_export_names() {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }

        for export in module.exports() {
            if let Export::Star {
                source: ImportSource::Module(target),
                alias: None,
            } = &export.export
            {
                // Stars into files outside the graph contribute nothing known
                let _ = self.collect_export_names(target, names, seen, visited);
            }
        }

        Some(())
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_membership() {
        assert!(Tags::ALL.contains(Mode::Dts));
        assert!(Tags::RUNTIME.contains(Mode::Js));
        assert!(!Tags::RUNTIME.contains(Mode::Dts));
        assert!(Tags::TYPES.contains(Mode::Ts));
        assert!(!Tags::TYPES.contains(Mode::Js));
        assert_eq!(Tags::TS_ONLY.union(Tags::JS_ONLY), Tags::RUNTIME);
    }

    #[test]
    fn relative_paths_between_modules() {
        let index = ModulePath::parse("index");
        let imports = ModulePath::parse("imports");
        let default = ModulePath::schema_module("default");
        let math = ModulePath::schema_module("std::math");
        let std = ModulePath::schema_module("std");

        assert_eq!(default.file_stem(), "modules/default");
        assert_eq!(math.file_stem(), "modules/std/math");
        assert_eq!(imports.relative_to(&index), "./imports");
        assert_eq!(default.relative_to(&index), "./modules/default");
        assert_eq!(imports.relative_to(&default), "../imports");
        assert_eq!(imports.relative_to(&math), "../../imports");
        assert_eq!(math.relative_to(&std), "./std/math");
        assert_eq!(std.relative_to(&math), "../std");
    }

    #[test]
    fn create_or_get_is_idempotent() {
        let mut graph = ModuleGraph::new();
        let path = ModulePath::schema_module("default");

        graph.module_mut(&path).write_all("const a = 1;");
        graph.module_mut(&path).write_all("const b = 2;");

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.get(&path).unwrap().fragments(Mode::Ts).count(), 2);
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut graph = ModuleGraph::new();
        let path = ModulePath::parse("castMaps");

        graph.register(GeneratedModule::new(path.clone())).unwrap();
        let err = graph.register(GeneratedModule::new(path)).unwrap_err();

        assert!(matches!(err, GenerateError::DuplicateModule { .. }));
        assert!(graph.register(GeneratedModule::new(ModuleGraph::index_path())).is_err());
    }

    #[test]
    fn imports_deduplicated_by_source_and_symbol() {
        let mut module = GeneratedModule::new(ModulePath::parse("modules/default"));
        let reflection = ModulePath::parse("reflection");

        module.import_star(reflection.clone(), "$", Tags::TYPES);
        module.import_star(reflection.clone(), "$", Tags::JS_ONLY);
        module.import_named(reflection.clone(), "Cardinality", None, Tags::ALL);
        module.import_named(reflection, "Cardinality", None, Tags::ALL);

        assert_eq!(module.imports().len(), 2);
        assert_eq!(module.imports()[0].tags, Tags::ALL);
    }

    #[test]
    fn exports_deduplicated() {
        let mut module = GeneratedModule::new(ModulePath::parse("set"));
        module.add_local_export("set", false, Tags::RUNTIME);
        module.add_local_export("set", false, Tags::DTS_ONLY);
        module.add_export_default("set", Tags::ALL);
        module.add_export_default("set", Tags::ALL);

        assert_eq!(module.exports().len(), 2);
        assert_eq!(module.exports()[0].tags, Tags::ALL);
    }

    #[test]
    fn indentation_restored_after_error() {
        let mut module = GeneratedModule::new(ModulePath::parse("index"));

        let result: Result<(), &str> = module.indented(|m| {
            m.write_all("inner();");
            m.indented(|m| m.write_all("deeper();"));
            Err("failed")
        });

        assert!(result.is_err());
        assert_eq!(module.indent_level(), 0);
        let indents: Vec<usize> = module.fragments(Mode::Ts).map(|f| f.indent).collect();
        assert_eq!(indents, vec![1, 2]);
    }

    #[test]
    fn emptiness_respects_mode() {
        let mut module = GeneratedModule::new(ModulePath::parse("modules/default"));
        module.import_star(ModulePath::parse("reflection"), "$", Tags::ALL);
        assert!(module.is_empty(Mode::Ts));

        module.write_dts("declare const x: number;");
        assert!(module.is_empty(Mode::Js));
        assert!(module.is_empty(Mode::Ts));
        assert!(!module.is_empty(Mode::Dts));

        module.add_local_export("y", true, Tags::TYPES);
        assert!(!module.is_empty(Mode::Ts));
        assert!(module.is_empty(Mode::Js));
        assert!(!module.is_blank());
    }

    #[test]
    fn emitted_paths_include_referenced_modules() {
        let mut graph = ModuleGraph::new();
        let types_only = ModulePath::schema_module("extra");
        let helpers = ModulePath::parse("helpers");
        let unused = ModulePath::parse("unused");

        graph.module_mut(&types_only).write_types("type $Base = $.BaseType;");
        graph.module_mut(&helpers);
        graph.module_mut(&unused);
        graph.index_mut().import_star(types_only.clone(), "_extra", Tags::ALL);
        graph.module_mut(&types_only).import_star(helpers.clone(), "_", Tags::RUNTIME);
        graph.index_mut().import_star(ModulePath::parse("syntax/syntax"), "$syntax", Tags::ALL);

        let emitted = graph.emitted_paths();

        assert!(emitted.contains(&ModuleGraph::index_path()));
        assert!(emitted.contains(&ModuleGraph::imports_path()));
        assert!(emitted.contains(&types_only));
        assert!(emitted.contains(&helpers));
        assert!(!emitted.contains(&unused));
        assert!(!emitted.contains(&ModulePath::parse("syntax/syntax")));
        assert!(graph.is_module_blank(&helpers));
    }

    #[test]
    fn export_names_are_structural() {
        let mut graph = ModuleGraph::new();
        let std = ModulePath::schema_module("std");
        let math = ModulePath::schema_module("std::math");

        {
            let m = graph.module_mut(&math);
            m.add_local_export("abs", false, Tags::ALL);
        }
        {
            let m = graph.module_mut(&std);
            m.add_local_export("str", false, Tags::ALL);
            m.add_local_export("$str", true, Tags::TYPES);
            m.add_export_from(ModulePath::parse("set"), "set", Some("union"), false, Tags::ALL);
            m.add_export_star(math.clone(), Some("math"), Tags::ALL);
            m.add_export_star(math.clone(), None, Tags::ALL);
            m.add_export_default("__defaultExports", Tags::ALL);
        }

        let module = graph.get(&std).unwrap();
        assert_eq!(module.top_level_export_names(), vec!["str", "union", "math"]);
        assert_eq!(graph.export_names(&std).unwrap(), vec!["str", "union", "math", "abs"]);
        assert!(graph.export_names(&ModulePath::parse("missing")).is_none());
    }
}
