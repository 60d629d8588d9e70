//! Multi-target emitter
//!
//! Projects a [`ModuleGraph`] into source text for every pass of a
//! [`TargetProfile`]. Emission reads the graph and never changes it.

use crate::graph::{Binding, Export, GeneratedModule, ImportSource, Mode, ModuleGraph, TaggedExport};
use crate::target::{ModuleKind, RenderPass, TargetProfile};
use std::path::PathBuf;

/// First line of every generated file
pub const GENERATED_HEADER: &str = "// GENERATED by schemagen - do not modify";

const INDENT: &str = "  ";

/// One file ready to be written, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Renders generated modules for one target profile
pub struct Emitter<'a> {
    profile: &'a TargetProfile,
    runtime_package: &'a str,
}

impl<'a> Emitter<'a> {
    pub fn new(profile: &'a TargetProfile, runtime_package: &'a str) -> Self {
        Self {
            profile,
            runtime_package,
        }
    }

    /// Render every module for every pass of the profile
    pub fn emit(&self, graph: &ModuleGraph) -> Vec<RenderedFile> {
        let mut files = Vec::new();
        let emitted = graph.emitted_paths();

        for pass in &self.profile.passes {
            for module in graph.modules() {
                if !emitted.contains(module.path()) {
                    tracing::debug!(module = %module.path(), "Skipping blank module");
                    continue;
                }

                files.push(RenderedFile {
                    path: PathBuf::from(format!("{}{}", module.path().file_stem(), pass.extension)),
                    contents: self.render(module, pass),
                });
            }
        }

        files
    }

    /// Render one module for one pass
    pub fn render(&self, module: &GeneratedModule, pass: &RenderPass) -> String {
        let mode = pass.mode;
        let kind = pass.module_kind(self.profile);
        let mut sections: Vec<Vec<String>> = Vec::new();

        let mut preamble = vec![GENERATED_HEADER.to_string()];
        if mode == Mode::Js && kind == ModuleKind::Cjs {
            preamble.push("\"use strict\";".to_string());
            preamble.push("Object.defineProperty(exports, \"__esModule\", { value: true });".to_string());
        }
        sections.push(preamble);
        sections.push(self.render_imports(module, mode, kind));

        let body: Vec<String> = module
            .fragments(mode)
            .map(|f| {
                if f.text.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", INDENT.repeat(f.indent), f.text)
                }
            })
            .collect();
        sections.push(trim_blank_edges(body));

        let exports: Vec<&TaggedExport> = module
            .exports_for(mode)
            .filter(|e| mode != Mode::Js || !is_type_only(&e.export))
            .collect();
        sections.push(self.render_exports(module, &exports, kind));

        let mut out = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push('\n');
        out
    }

    fn specifier(&self, module: &GeneratedModule, source: &ImportSource) -> String {
        match source {
            ImportSource::Module(path) => self.profile.relative_specifier(&path.relative_to(module.path())),
            ImportSource::External(spec) => self.profile.external_specifier(spec, self.runtime_package),
        }
    }

    fn render_imports(&self, module: &GeneratedModule, mode: Mode, kind: ModuleKind) -> Vec<String> {
        let mut lines = Vec::new();
        // (source, type_only, names) groups in first-seen order
        let mut groups: Vec<(&ImportSource, bool, Vec<(&str, Option<&str>)>)> = Vec::new();

        for import in module.imports() {
            if !import.tags.contains(mode) || (mode == Mode::Js && import.type_only) {
                continue;
            }

            match &import.binding {
                Binding::Star { alias } => {
                    let spec = self.specifier(module, &import.source);
                    lines.push(match kind {
                        ModuleKind::Esm => format!("import * as {} from \"{}\";", alias, spec),
                        ModuleKind::Cjs => format!("const {} = require(\"{}\");", alias, spec),
                    });
                }
                Binding::Named { name, alias } => {
                    let entry = (name.as_str(), alias.as_deref());
                    match groups
                        .iter_mut()
                        .find(|(source, type_only, _)| *source == &import.source && *type_only == import.type_only)
                    {
                        Some(group) => group.2.push(entry),
                        None => groups.push((&import.source, import.type_only, vec![entry])),
                    }
                }
            }
        }

        for (source, type_only, names) in groups {
            let spec = self.specifier(module, source);
            lines.push(match kind {
                ModuleKind::Esm => {
                    let list = names
                        .iter()
                        .map(|(name, alias)| match alias {
                            Some(alias) => format!("{} as {}", name, alias),
                            None => name.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    let keyword = if type_only { "import type" } else { "import" };
                    format!("{} {{ {} }} from \"{}\";", keyword, list, spec)
                }
                ModuleKind::Cjs => {
                    let list = names
                        .iter()
                        .map(|(name, alias)| match alias {
                            Some(alias) => format!("{}: {}", name, alias),
                            None => name.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("const {{ {} }} = require(\"{}\");", list, spec)
                }
            });
        }

        lines
    }

    fn render_exports(&self, module: &GeneratedModule, exports: &[&TaggedExport], kind: ModuleKind) -> Vec<String> {
        let mut lines = Vec::new();
        let mut local_values = Vec::new();
        let mut local_types = Vec::new();
        let mut default = None;
        let mut from_groups: Vec<(&ImportSource, bool, Vec<(&str, Option<&str>)>)> = Vec::new();

        for export in exports {
            match &export.export {
                Export::Local { name, type_only: false } => local_values.push(name.as_str()),
                Export::Local { name, type_only: true } => local_types.push(name.as_str()),
                Export::Default { expr } => default = Some(expr.as_str()),
                Export::Star { source, alias } => {
                    let spec = self.specifier(module, source);
                    lines.push(match (kind, alias) {
                        (ModuleKind::Esm, None) => format!("export * from \"{}\";", spec),
                        (ModuleKind::Esm, Some(alias)) => format!("export * as {} from \"{}\";", alias, spec),
                        (ModuleKind::Cjs, None) => format!("Object.assign(exports, require(\"{}\"));", spec),
                        (ModuleKind::Cjs, Some(alias)) => format!("exports.{} = require(\"{}\");", alias, spec),
                    });
                }
                Export::From {
                    source,
                    name,
                    alias,
                    type_only,
                } => {
                    let entry = (name.as_str(), alias.as_deref());
                    match from_groups
                        .iter_mut()
                        .find(|(s, t, _)| *s == source && *t == *type_only)
                    {
                        Some(group) => group.2.push(entry),
                        None => from_groups.push((source, *type_only, vec![entry])),
                    }
                }
            }
        }

        for (source, type_only, names) in from_groups {
            let spec = self.specifier(module, source);
            match kind {
                ModuleKind::Esm => {
                    let list = names
                        .iter()
                        .map(|(name, alias)| match alias {
                            Some(alias) => format!("{} as {}", name, alias),
                            None => name.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    let keyword = if type_only { "export type" } else { "export" };
                    lines.push(format!("{} {{ {} }} from \"{}\";", keyword, list, spec));
                }
                ModuleKind::Cjs => {
                    for (name, alias) in names {
                        lines.push(format!(
                            "exports.{} = require(\"{}\").{};",
                            alias.unwrap_or(name),
                            spec,
                            name
                        ));
                    }
                }
            }
        }

        match kind {
            ModuleKind::Esm => {
                if !local_values.is_empty() {
                    lines.push(format!("export {{ {} }};", local_values.join(", ")));
                }
                if !local_types.is_empty() {
                    lines.push(format!("export type {{ {} }};", local_types.join(", ")));
                }
                if let Some(expr) = default {
                    lines.push(format!("export default {};", expr));
                }
            }
            ModuleKind::Cjs => {
                for name in local_values {
                    lines.push(format!("exports.{} = {};", name, name));
                }
                if let Some(expr) = default {
                    lines.push(format!("exports.default = {};", expr));
                }
            }
        }

        lines
    }
}

fn is_type_only(export: &Export) -> bool {
    matches!(
        export,
        Export::Local { type_only: true, .. } | Export::From { type_only: true, .. }
    )
}

fn trim_blank_edges(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines.drain(..leading);
    lines
}
