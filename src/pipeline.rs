//! The per-fragment validation state machine.
//!
//! Every schema fragment applied to an instance goes through the same stages: its `$ref` chain
//! is resolved, the fragment is syntax checked, its keyword validators run, and finally the
//! instance's children are validated against the subschemas that address them. Each call returns
//! its own [`Report`]; callers merge it into theirs.
use crate::{
    dispatcher::KeywordDispatcher,
    error::{MessageKind, ProcessingError, SchemaError},
    paths::JsonPointer,
    primitive_type::PrimitiveType,
    registry::SchemaRegistry,
    report::{LogLevel, Message, Report, Thresholds},
    resolver::ReferenceResolver,
    syntax::SyntaxChecker,
    tree::{SchemaLocation, SchemaTree},
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
enum Stage {
    ResolvingRef,
    SyntaxChecked,
    KeywordChecking,
    ChildrenChecking,
    Done,
}

/// Schema locations entered for the current instance location, innermost first.
///
/// Descending into a child instance starts a new stack.
pub(crate) struct Visited<'a> {
    location: SchemaLocation,
    parent: Option<&'a Visited<'a>>,
}

impl Visited<'_> {
    fn contains(&self, location: &SchemaLocation) -> bool {
        let mut current = Some(self);
        while let Some(visited) = current {
            if &visited.location == location {
                return true;
            }
            current = visited.parent;
        }
        false
    }
}

/// A resolved schema fragment applied to one instance node.
pub(crate) struct Frame<'a> {
    pub(crate) tree: &'a SchemaTree,
    pub(crate) instance: &'a Value,
    pub(crate) instance_path: &'a JsonPointer,
    visited: Option<&'a Visited<'a>>,
}

impl Frame<'_> {
    /// An `error` level message for `keyword` at this frame.
    pub(crate) fn error(&self, keyword: &'static str, kind: MessageKind) -> Message {
        self.message(LogLevel::Error, keyword, kind)
    }

    pub(crate) fn message(
        &self,
        level: LogLevel,
        keyword: &'static str,
        kind: MessageKind,
    ) -> Message {
        Message::new(
            level,
            Some(keyword),
            self.tree.location(),
            self.instance_path.clone(),
            kind,
        )
    }
}

/// Runs the stages for a fragment and recurses into subschemas.
pub(crate) struct Pipeline<'v> {
    registry: &'v SchemaRegistry,
    dispatcher: &'v KeywordDispatcher,
    syntax: &'v SyntaxChecker,
    deep_check: bool,
    fail_fast: bool,
}

impl<'v> Pipeline<'v> {
    pub(crate) fn new(
        registry: &'v SchemaRegistry,
        dispatcher: &'v KeywordDispatcher,
        syntax: &'v SyntaxChecker,
        deep_check: bool,
        fail_fast: bool,
    ) -> Self {
        Pipeline {
            registry,
            dispatcher,
            syntax,
            deep_check,
            fail_fast,
        }
    }

    /// Validate `instance` against the fragment `tree` points at.
    pub(crate) fn run(
        &self,
        tree: &SchemaTree,
        instance: &Value,
        thresholds: Thresholds,
    ) -> Result<Report, ProcessingError> {
        self.process(tree, instance, &JsonPointer::new(), None, thresholds)
    }

    /// Validate the frame's instance against a subschema of the frame's fragment.
    pub(crate) fn validate_subschema(
        &self,
        frame: &Frame<'_>,
        relative: &JsonPointer,
        thresholds: Thresholds,
    ) -> Result<Report, ProcessingError> {
        let tree = frame.tree.append(relative);
        self.process(
            &tree,
            frame.instance,
            frame.instance_path,
            frame.visited,
            thresholds,
        )
    }

    /// Validate another instance node against a subschema of the frame's fragment.
    pub(crate) fn validate_child(
        &self,
        frame: &Frame<'_>,
        relative: &JsonPointer,
        instance: &Value,
        instance_path: &JsonPointer,
        thresholds: Thresholds,
    ) -> Result<Report, ProcessingError> {
        let tree = frame.tree.append(relative);
        self.process(&tree, instance, instance_path, None, thresholds)
    }

    /// Whether `failFast` asks to stop after what `report` already holds.
    pub(crate) fn should_stop(&self, report: &Report) -> bool {
        self.fail_fast && !report.is_success()
    }

    fn process(
        &self,
        tree: &SchemaTree,
        instance: &Value,
        instance_path: &JsonPointer,
        visited: Option<&Visited<'_>>,
        thresholds: Thresholds,
    ) -> Result<Report, ProcessingError> {
        let mut report = Report::with_thresholds(thresholds);
        trace_stage(Stage::ResolvingRef, tree, instance_path);
        let tree = match ReferenceResolver::new(self.registry).resolve(tree.clone()) {
            Ok(resolved) => resolved,
            Err(error) => {
                report.log(Message::fatal(
                    Some("$ref"),
                    tree.location(),
                    instance_path.clone(),
                    error,
                ))?;
                return Ok(report);
            }
        };
        let location = tree.location();
        if visited.map_or(false, |visited| visited.contains(&location)) {
            let error = SchemaError::ValidationLoop {
                location: location.to_string(),
            };
            report.log(Message::fatal(None, location, instance_path.clone(), error))?;
            return Ok(report);
        }
        let visited = Visited { location, parent: visited };
        let Some(node) = tree.node() else {
            let error = SchemaError::DanglingReference {
                reference: visited.location.to_string(),
            };
            report.log(Message::fatal(
                None,
                visited.location.clone(),
                instance_path.clone(),
                error,
            ))?;
            return Ok(report);
        };

        trace_stage(Stage::SyntaxChecked, &tree, instance_path);
        let problems = self.syntax.check(&tree);
        if !problems.is_empty() {
            let error = SchemaError::MalformedSchema {
                problems: problems.to_vec(),
            };
            report.log(Message::fatal(
                None,
                tree.location(),
                instance_path.clone(),
                error,
            ))?;
            return Ok(report);
        }
        let schema = match node {
            Value::Object(schema) => schema,
            Value::Bool(false) => {
                report.log(Message::new(
                    LogLevel::Error,
                    None,
                    tree.location(),
                    instance_path.clone(),
                    MessageKind::FalseSchema,
                ))?;
                return Ok(report);
            }
            // `true`; anything else was rejected by the syntax check
            _ => return Ok(report),
        };

        let frame = Frame {
            tree: &tree,
            instance,
            instance_path,
            visited: Some(&visited),
        };
        trace_stage(Stage::KeywordChecking, &tree, instance_path);
        let validators = self
            .dispatcher
            .validators(&tree, PrimitiveType::from(instance));
        for validator in validators.iter() {
            validator.validate(self, &frame, &mut report)?;
            if report.has_fatal() || self.should_stop(&report) {
                break;
            }
        }
        if report.has_fatal() || (!report.is_success() && (!self.deep_check || self.fail_fast)) {
            trace_stage(Stage::Done, &tree, instance_path);
            return Ok(report);
        }

        trace_stage(Stage::ChildrenChecking, &tree, instance_path);
        match instance {
            Value::Array(items) => self.check_items(&frame, schema, items, &mut report)?,
            Value::Object(object) => self.check_members(&frame, schema, object, &mut report)?,
            _ => {}
        }
        trace_stage(Stage::Done, &tree, instance_path);
        Ok(report)
    }

    /// `items` as a schema applies to every element; as an array it applies positionally and
    /// `additionalItems` covers the rest.
    fn check_items(
        &self,
        frame: &Frame<'_>,
        schema: &Map<String, Value>,
        items: &[Value],
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        for (idx, item) in items.iter().enumerate() {
            let relative = match schema.get("items") {
                Some(Value::Array(positional)) if idx < positional.len() => {
                    JsonPointer::new().join("items").join(idx)
                }
                // `"additionalItems": false` is checked as a keyword
                Some(Value::Array(_)) => match schema.get("additionalItems") {
                    Some(Value::Object(_)) => JsonPointer::new().join("additionalItems"),
                    _ => break,
                },
                Some(_) => JsonPointer::new().join("items"),
                None => break,
            };
            let path = frame.instance_path.join(idx);
            let sub = self.validate_child(frame, &relative, item, &path, report.thresholds())?;
            report.merge(sub)?;
            if self.should_stop(report) {
                break;
            }
        }
        Ok(())
    }

    /// A member is validated against `properties[name]` and every matching
    /// `patternProperties` entry, or against `additionalProperties` when none of them applies.
    /// Both addressing rules can apply to the same member: a named property whose name also
    /// matches a pattern is checked against both subschemas.
    fn check_members(
        &self,
        frame: &Frame<'_>,
        schema: &Map<String, Value>,
        object: &Map<String, Value>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let properties = schema.get("properties").and_then(Value::as_object);
        let patterns = schema.get("patternProperties").and_then(Value::as_object);
        let additional = matches!(schema.get("additionalProperties"), Some(Value::Object(_)));
        for (name, value) in object {
            let mut targets = Vec::new();
            if properties.map_or(false, |properties| properties.contains_key(name)) {
                targets.push(JsonPointer::new().join("properties").join(name));
            }
            for pattern in patterns.into_iter().flat_map(Map::keys) {
                let matched = self
                    .dispatcher
                    .regexes()
                    .get_or_compile(pattern)
                    .map_or(false, |regex| regex.is_match(name).unwrap_or(false));
                if matched {
                    targets.push(JsonPointer::new().join("patternProperties").join(pattern));
                }
            }
            if targets.is_empty() && additional {
                targets.push(JsonPointer::new().join("additionalProperties"));
            }
            let path = frame.instance_path.join(name);
            for relative in &targets {
                let sub = self.validate_child(frame, relative, value, &path, report.thresholds())?;
                report.merge(sub)?;
                if self.should_stop(report) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

fn trace_stage(stage: Stage, tree: &SchemaTree, instance_path: &JsonPointer) {
    tracing::trace!(
        stage = ?stage,
        schema = %tree.location(),
        instance = %instance_path,
        "validation stage"
    );
}
