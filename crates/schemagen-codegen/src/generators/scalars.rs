//! Scalar types: one type alias and one runtime constructor per scalar.

use super::ts_types::{ident, quote, scalar_ts_type};
use super::{DomainGenerator, GenerateContext};
use crate::error::GenerateError;
use crate::graph::Tags;
use schemagen_core::split_name;

pub struct ScalarsGenerator;

impl DomainGenerator for ScalarsGenerator {
    fn name(&self) -> &'static str {
        "scalars"
    }

    fn generate(&self, ctx: &mut GenerateContext<'_>) -> Result<(), GenerateError> {
        let catalog = ctx.catalog;
        let mut count = 0;

        for scalar in catalog.scalars.values() {
            let (module_name, local) = split_name(&scalar.name);
            if module_name.is_empty() || !ctx.types.contains(&scalar.name) {
                continue;
            }

            let type_name = format!("${}", local);
            let value_name = ident(local);
            let module = ctx.schema_module(module_name);

            match &scalar.enum_values {
                Some(values) => {
                    let members = values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ");
                    module.write_types(format!(
                        "type {} = $.EnumType<{}, [{}]>;",
                        type_name,
                        quote(&scalar.name),
                        members
                    ));
                }
                None => {
                    module.write_types(format!(
                        "type {} = $.ScalarType<{}, {}>;",
                        type_name,
                        quote(&scalar.name),
                        scalar_ts_type(scalar)
                    ));
                }
            }
            module.add_local_export(type_name.clone(), true, Tags::TYPES);

            if !scalar.is_abstract {
                let value_type = format!("$.scalarTypeWithConstructor<{}, never>", type_name);
                module.write_ts(format!(
                    "const {}: {} = $.makeType<{}>(_.spec, {}, _.syntax.literal);",
                    value_name,
                    value_type,
                    value_type,
                    quote(&scalar.id)
                ));
                module.write_js(format!(
                    "const {} = $.makeType(_.spec, {}, _.syntax.literal);",
                    value_name,
                    quote(&scalar.id)
                ));
                module.write_dts(format!("declare const {}: {};", value_name, value_type));
                module.add_local_export(value_name, false, Tags::ALL);
            }

            module.blank_line();
            count += 1;
        }

        tracing::debug!(scalars = count, "Generated scalar types");
        Ok(())
    }
}
