use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, CompileContext, KeywordValidator},
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
enum Dependency {
    Properties(Vec<String>),
    Schema,
}

/// Property dependencies list the names that must be present along with the property. Schema
/// dependencies apply the subschema to the whole object.
#[derive(Debug)]
pub(crate) struct DependenciesValidator {
    dependencies: Vec<(String, Dependency)>,
}

impl DependenciesValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Object(item) = frame.instance else {
            return Ok(());
        };
        for (property, dependency) in &self.dependencies {
            if !item.contains_key(property) {
                continue;
            }
            match dependency {
                Dependency::Properties(required) => {
                    let missing: Vec<String> = required
                        .iter()
                        .filter(|name| !item.contains_key(name.as_str()))
                        .cloned()
                        .collect();
                    if !missing.is_empty() {
                        report.log(frame.error(
                            "dependencies",
                            MessageKind::Dependencies {
                                property: property.clone(),
                                missing,
                            },
                        ))?;
                    }
                }
                Dependency::Schema => {
                    let relative = JsonPointer::new().join("dependencies").join(property);
                    let sub = pipeline.validate_subschema(frame, &relative, report.thresholds())?;
                    report.merge(sub)?;
                }
            }
            if pipeline.should_stop(report) {
                break;
            }
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(ctx: &CompileContext<'_>, schema: &Value) -> Option<KeywordValidator> {
    let dependencies = schema
        .as_object()?
        .iter()
        .filter_map(|(property, dependency)| {
            let dependency = match dependency {
                Value::Array(names) => Dependency::Properties(
                    names
                        .iter()
                        .filter_map(|name| name.as_str().map(String::from))
                        .collect(),
                ),
                // Draft 3 allows a single property name.
                Value::String(name) => Dependency::Properties(vec![name.clone()]),
                _ if helpers::is_schema(ctx.draft, dependency) => Dependency::Schema,
                _ => return None,
            };
            Some((property.clone(), dependency))
        })
        .collect();
    Some(KeywordValidator::Dependencies(DependenciesValidator {
        dependencies,
    }))
}
