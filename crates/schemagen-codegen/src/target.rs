//! Target profiles
//!
//! A profile decides which render passes run for a target, which file
//! extension each pass produces, and how imports are spelled.

use crate::graph::Mode;
use schemagen_core::Target;

/// Module syntax used for runtime imports and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Esm,
    Cjs,
}

/// One output flavor produced for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPass {
    pub mode: Mode,
    pub extension: &'static str,
}

impl RenderPass {
    const fn new(mode: Mode, extension: &'static str) -> Self {
        Self { mode, extension }
    }

    /// Module kind used for this pass
    ///
    /// Only Js passes honor the profile; Ts and declaration output is ESM.
    pub fn module_kind(&self, profile: &TargetProfile) -> ModuleKind {
        match self.mode {
            Mode::Js => profile.module_kind,
            Mode::Ts | Mode::Dts => ModuleKind::Esm,
        }
    }
}

/// Rendering rules for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProfile {
    pub target: Target,
    pub module_kind: ModuleKind,
    /// Appended to every relative import specifier
    pub import_suffix: &'static str,
    pub passes: Vec<RenderPass>,
    /// Rewrite `<pkg>/dist/` references to `<pkg>/_src/`
    pub rewrite_runtime_sources: bool,
}

impl TargetProfile {
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Ts => Self {
                target,
                module_kind: ModuleKind::Esm,
                import_suffix: "",
                passes: vec![RenderPass::new(Mode::Ts, ".ts")],
                rewrite_runtime_sources: false,
            },
            Target::Mts => Self {
                target,
                module_kind: ModuleKind::Esm,
                import_suffix: ".mjs",
                passes: vec![RenderPass::new(Mode::Ts, ".mts")],
                rewrite_runtime_sources: false,
            },
            Target::Deno => Self {
                target,
                module_kind: ModuleKind::Esm,
                import_suffix: ".ts",
                passes: vec![RenderPass::new(Mode::Ts, ".ts")],
                rewrite_runtime_sources: true,
            },
            Target::Esm => Self {
                target,
                module_kind: ModuleKind::Esm,
                import_suffix: ".mjs",
                passes: vec![RenderPass::new(Mode::Js, ".mjs"), RenderPass::new(Mode::Dts, ".d.mts")],
                rewrite_runtime_sources: false,
            },
            Target::Cjs => Self {
                target,
                module_kind: ModuleKind::Cjs,
                import_suffix: "",
                passes: vec![RenderPass::new(Mode::Js, ".js"), RenderPass::new(Mode::Dts, ".d.ts")],
                rewrite_runtime_sources: false,
            },
        }
    }

    /// Every profile, in [`Target::ALL`] order
    pub fn all() -> Vec<Self> {
        Target::ALL.iter().copied().map(Self::for_target).collect()
    }

    /// Spell a relative specifier for this profile
    pub fn relative_specifier(&self, relative: &str) -> String {
        format!("{}{}", relative, self.import_suffix)
    }

    /// Spell a package specifier for this profile
    pub fn external_specifier(&self, specifier: &str, runtime_package: &str) -> String {
        if self.rewrite_runtime_sources {
            let dist = format!("{}/dist/", runtime_package);
            if let Some(rest) = specifier.strip_prefix(&dist) {
                return format!("{}/_src/{}", runtime_package, rest);
            }
        }
        specifier.to_string()
    }
}
