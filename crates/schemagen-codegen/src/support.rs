//! Static support files
//!
//! The `syntax/` directory ships hand-written code in one flavor per render
//! pass. Files are copied next to the generated modules after their relative
//! references are adjusted for the target.

use crate::emit::RenderedFile;
use crate::error::GenerateError;
use crate::graph::Mode;
use crate::target::{ModuleKind, RenderPass, TargetProfile};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Package name the embedded files import from
pub const DEFAULT_RUNTIME_PACKAGE: &str = "edgedb";

/// Directory the support files are written to, relative to the output root
pub const SUPPORT_DIR: &str = "syntax";

/// Source dialect of a support file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// `.ts`
    Ts,
    /// `.mjs`
    Esm,
    /// `.js`
    Cjs,
    /// `.d.ts`
    Dts,
}

impl Flavor {
    /// Split a file name into its stem and flavor
    pub fn from_file_name(name: &str) -> Option<(&str, Flavor)> {
        // `.d.ts` first: it also ends in `.ts`
        [(".d.ts", Flavor::Dts), (".ts", Flavor::Ts), (".mjs", Flavor::Esm), (".js", Flavor::Cjs)]
            .into_iter()
            .find_map(|(ext, flavor)| name.strip_suffix(ext).map(|stem| (stem, flavor)))
    }

    /// Flavor copied for a render pass of a profile
    pub fn for_pass(pass: &RenderPass, profile: &TargetProfile) -> Flavor {
        match pass.mode {
            Mode::Ts => Flavor::Ts,
            Mode::Dts => Flavor::Dts,
            Mode::Js => match profile.module_kind {
                ModuleKind::Esm => Flavor::Esm,
                ModuleKind::Cjs => Flavor::Cjs,
            },
        }
    }
}

/// One support file in one flavor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    /// Output path without extension, e.g. `syntax/literal`
    pub stem: String,
    pub flavor: Flavor,
    pub contents: String,
}

/// The full set of support files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFiles {
    files: Vec<SupportFile>,
}

macro_rules! embedded {
    ($($name:literal => $flavor:expr),* $(,)?) => {
        vec![$(SupportFile {
            stem: format!("{}/{}", SUPPORT_DIR, $name.split('.').next().unwrap_or($name)),
            flavor: $flavor,
            contents: include_str!(concat!("../support/syntax/", $name)).to_string(),
        }),*]
    };
}

impl SupportFiles {
    /// Files bundled with the generator
    pub fn embedded() -> Self {
        Self {
            files: embedded![
                "syntax.ts" => Flavor::Ts,
                "syntax.mjs" => Flavor::Esm,
                "syntax.js" => Flavor::Cjs,
                "syntax.d.ts" => Flavor::Dts,
                "literal.ts" => Flavor::Ts,
                "literal.mjs" => Flavor::Esm,
                "literal.js" => Flavor::Cjs,
                "literal.d.ts" => Flavor::Dts,
            ],
        }
    }

    /// Load support files from a directory
    ///
    /// Files whose extension has no flavor are ignored.
    pub fn from_dir(dir: &Path) -> Result<Self, GenerateError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| GenerateError::io(dir, e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| GenerateError::io(entry.path(), e))?;
            let relative = relative.to_string_lossy().replace('\\', "/");

            let Some((stem, flavor)) = Flavor::from_file_name(&relative) else {
                tracing::debug!(file = %relative, "Ignoring support file without a known flavor");
                continue;
            };

            let contents = std::fs::read_to_string(entry.path()).map_err(|e| GenerateError::io(entry.path(), e))?;
            files.push(SupportFile {
                stem: format!("{}/{}", SUPPORT_DIR, stem),
                flavor,
                contents,
            });
        }

        tracing::debug!(dir = %dir.display(), count = files.len(), "Loaded support files");
        Ok(Self { files })
    }

    pub fn from_files(files: Vec<SupportFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[SupportFile] {
        &self.files
    }

    /// Reject any file that reaches outside the support directory
    pub fn validate(&self) -> Result<(), GenerateError> {
        for file in &self.files {
            if let Some(reference) = reference_pattern()
                .captures_iter(&file.contents)
                .map(|c| c["spec"].to_string())
                .find(|spec| escapes_directory(spec))
            {
                return Err(GenerateError::InvalidTargetFile {
                    path: file.stem.clone(),
                    reference,
                });
            }
        }
        Ok(())
    }

    /// Validate, then render the files for every pass of the profile
    pub fn render(&self, profile: &TargetProfile, runtime_package: &str) -> Result<Vec<RenderedFile>, GenerateError> {
        self.validate()?;

        let mut rendered = Vec::new();
        for pass in &profile.passes {
            let flavor = Flavor::for_pass(pass, profile);
            for file in self.files.iter().filter(|f| f.flavor == flavor) {
                rendered.push(RenderedFile {
                    path: PathBuf::from(format!("{}{}", file.stem, pass.extension)),
                    contents: rewrite_references(&file.contents, profile, runtime_package),
                });
            }
        }
        Ok(rendered)
    }
}

impl Default for SupportFiles {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Whether a specifier climbs out of the directory it is resolved from
fn escapes_directory(spec: &str) -> bool {
    spec.split('/').any(|segment| segment == "..")
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?P<lead>\bfrom\s*|\bimport\s*|\brequire\(\s*)(?P<quote>["'])(?P<spec>[^"'\n]+)["']"#)
            .expect("reference pattern is valid")
    })
}

/// Adjust import specifiers in a support file for a profile
fn rewrite_references(contents: &str, profile: &TargetProfile, runtime_package: &str) -> String {
    let default_prefix = format!("{}/", DEFAULT_RUNTIME_PACKAGE);

    reference_pattern()
        .replace_all(contents, |caps: &Captures| {
            let spec = &caps["spec"];
            let spec = if spec.starts_with("./") {
                profile.relative_specifier(spec)
            } else {
                let spec = match spec.strip_prefix(&default_prefix) {
                    Some(rest) => format!("{}/{}", runtime_package, rest),
                    None => spec.to_string(),
                };
                profile.external_specifier(&spec, runtime_package)
            };
            format!("{}{}{}{}", &caps["lead"], &caps["quote"], spec, &caps["quote"])
        })
        .into_owned()
}
