//! Runtime version guard
//!
//! Generated code is only valid against the runtime library version it was
//! generated for. The index module checks this when it is first imported.

use crate::error::GenerateError;
use crate::graph::{GeneratedModule, ImportSource, Tags};

/// Version of this generator, embedded in every index module
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Message raised when generator and runtime versions differ
pub fn mismatch_message(generated: &str, installed: &str) -> String {
    format!(
        "The query builder was generated by version {}, but the runtime library is version {}. Regenerate the query builder.",
        generated, installed
    )
}

/// Compares the generator version against an installed runtime version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGuard {
    generated: String,
}

impl VersionGuard {
    pub fn new(generated: impl Into<String>) -> Self {
        Self {
            generated: generated.into(),
        }
    }

    pub fn generated(&self) -> &str {
        &self.generated
    }

    pub fn check(&self, installed: &str) -> Result<(), GenerateError> {
        if installed == self.generated {
            Ok(())
        } else {
            Err(GenerateError::VersionMismatch {
                generated: self.generated.clone(),
                installed: installed.to_string(),
            })
        }
    }

    /// Emit the import-time check into a module
    pub fn write(&self, module: &mut GeneratedModule, runtime_package: &str) {
        module.import_named(
            ImportSource::External(format!("{}/dist/version", runtime_package)),
            "version",
            Some("runtimeVersion"),
            Tags::RUNTIME,
        );

        module.write_runtime(format!(
            "const generatorVersion = {};",
            serde_json::Value::String(self.generated.clone())
        ));
        module.write_runtime("if (runtimeVersion !== generatorVersion) {");
        module.indented(|m| {
            m.write_runtime("throw new Error(");
            m.indented(|m| {
                m.write_runtime(format!(
                    "`{}`",
                    mismatch_message("${generatorVersion}", "${runtimeVersion}")
                ));
            });
            m.write_runtime(");");
        });
        module.write_runtime("}");
    }
}

impl Default for VersionGuard {
    fn default() -> Self {
        Self::new(GENERATOR_VERSION)
    }
}
