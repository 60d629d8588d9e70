//! `__spec__` module: the runtime type table, one entry per indexed type.

use super::ts_types::quote;
use super::{paths, DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::Tags;
use schemagen_core::TypeDescriptor;
use serde_json::Value;

pub struct RuntimeSpecGenerator;

impl DomainGenerator for RuntimeSpecGenerator {
    fn name(&self) -> &'static str {
        "runtime_spec"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let types = ctx.types;
        let module = ctx.graph.module_mut(&paths::spec());

        module.import_star(paths::reflection(), "$", Tags::ALL);
        module.write_ts("const spec: $.introspect.Types = new $.StrictMap();");
        module.write_js("const spec = new $.StrictMap();");
        module.write_dts("declare const spec: $.introspect.Types;");
        module.blank_line();

        let sorted = types.sorted();
        for descriptor in &sorted {
            module.write_runtime(format!("spec.set({}, {});", quote(descriptor.id()), descriptor_json(descriptor)));
        }

        module.add_local_export("spec", false, Tags::ALL);

        tracing::debug!(types = sorted.len(), "Generated runtime spec");
        Ok(())
    }
}

/// Descriptor with its kind, as a JSON object literal
fn descriptor_json(descriptor: &TypeDescriptor) -> String {
    let value = match descriptor {
        TypeDescriptor::Object(ty) => serde_json::to_value(ty),
        TypeDescriptor::Scalar(ty) => serde_json::to_value(ty),
    };

    match value {
        Ok(Value::Object(mut fields)) => {
            fields.insert("kind".to_string(), Value::String(descriptor.kind().to_string()));
            Value::Object(fields).to_string()
        }
        // Descriptors are plain structs and always serialize to objects
        _ => format!("{{\"kind\":{},\"name\":{}}}", quote(descriptor.kind()), quote(descriptor.name())),
    }
}
