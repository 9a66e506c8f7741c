use schemata::{
    Draft, LogLevel, MessageKind, ProcessingError, Report, SchemaError, ValidationConfig,
    ValidationOptions, Validator,
};
use serde_json::{json, Value};
use test_case::test_case;

fn report_with(options: &ValidationOptions, schema: &Value, instance: &Value) -> Report {
    options
        .build(schema)
        .expect("Valid schema")
        .validate(instance)
        .expect("Not escalated")
}

#[test_case(LogLevel::Debug, 2)]
#[test_case(LogLevel::Info, 2)]
#[test_case(LogLevel::Warning, 1)]
#[test_case(LogLevel::Error, 1)]
#[test_case(LogLevel::Fatal, 0)]
#[test_case(LogLevel::None, 0)]
fn log_threshold_filters_messages(level: LogLevel, expected: usize) {
    let schema = json!({"format": "no-such-format", "maxLength": 1});
    let mut options = schemata::options();
    options.with_log_threshold(level);
    let report = report_with(&options, &schema, &json!("ab"));
    assert_eq!(report.messages().len(), expected);
    // Dropped messages still decide the outcome
    assert!(!report.is_success());
    assert_eq!(report.current_level(), LogLevel::Error);
}

#[test]
fn info_messages_do_not_fail() {
    let report = report_with(
        &schemata::options(),
        &json!({"format": "no-such-format"}),
        &json!("a"),
    );
    assert!(report.is_success());
    assert_eq!(report.current_level(), LogLevel::Info);
    assert!(matches!(
        report.messages()[0].kind,
        MessageKind::UnknownFormat { .. }
    ));
}

#[test]
fn error_threshold_escalates_first_violation() {
    let validator = schemata::options()
        .with_exception_threshold(LogLevel::Error)
        .build(&json!({"properties": {"a": {"type": "string"}, "b": {"type": "string"}}}))
        .expect("Valid schema");
    let error = validator
        .validate(&json!({"a": 1, "b": 2}))
        .expect_err("Should escalate");
    let message = error.message().expect("Escalated message");
    assert_eq!(message.keyword, Some("type"));
    assert_eq!(message.instance_path.to_string(), "/a");
    assert!(error.to_string().contains("instance type"));
    assert!(validator.validate(&json!({"a": "x", "b": "y"})).is_ok());
}

#[test]
fn combinator_branches_never_escalate_on_errors() {
    let validator = schemata::options()
        .with_exception_threshold(LogLevel::Error)
        .build(&json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}))
        .expect("Valid schema");
    assert!(validator.validate(&json!(1)).is_ok());
    let error = validator.validate(&json!(null)).expect_err("Should escalate");
    assert_eq!(error.message().and_then(|m| m.keyword), Some("anyOf"));
}

#[test]
fn fatal_threshold_escalates_schema_problems() {
    let validator = schemata::options()
        .with_exception_threshold(LogLevel::Fatal)
        .build(&json!({"not": {"$ref": "#/definitions/missing"}}))
        .expect("Valid schema");
    match validator.validate(&json!(1)) {
        Err(ProcessingError::Escalated(message)) => {
            assert_eq!(message.level, LogLevel::Fatal);
            assert!(matches!(
                message.kind,
                MessageKind::Schema(SchemaError::DanglingReference { .. })
            ));
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn fatal_messages_surface_from_negated_branches() {
    let report = report_with(
        &schemata::options(),
        &json!({"not": {"$ref": "#/definitions/missing"}}),
        &json!(1),
    );
    assert!(!report.is_success());
    assert_eq!(report.messages()[0].level, LogLevel::Fatal);
}

#[test_case(&json!({"type": 12}), "type")]
#[test_case(&json!({"required": "name"}), "required")]
#[test_case(&json!({"properties": {"a": {"minimum": "zero"}}}), "minimum")]
#[test_case(&json!({"pattern": "(unclosed"}), "pattern")]
fn malformed_schemas_are_fatal(schema: &Value, keyword: &str) {
    let report = report_with(&schemata::options(), schema, &json!({"a": 1}));
    let message = &report.messages()[0];
    assert_eq!(message.level, LogLevel::Fatal);
    match &message.kind {
        MessageKind::Schema(SchemaError::MalformedSchema { problems }) => {
            assert!(problems
                .iter()
                .any(|problem| problem.keyword.as_deref() == Some(keyword)));
        }
        other => panic!("Unexpected message: {other:?}"),
    }
}

#[test]
fn deep_check_validates_children_of_failing_containers() {
    let schema = json!({
        "required": ["id"],
        "properties": {"name": {"type": "string"}}
    });
    let instance = json!({"name": 1});
    let shallow = report_with(&schemata::options(), &schema, &instance);
    assert_eq!(shallow.errors().count(), 1);
    let mut options = schemata::options();
    options.with_deep_check(true);
    let deep = report_with(&options, &schema, &instance);
    let keywords: Vec<_> = deep.errors().map(|message| message.keyword).collect();
    assert_eq!(keywords, [Some("required"), Some("type")]);
}

#[test]
fn fail_fast_reports_one_violation() {
    let schema = json!({"items": {"type": "string", "minLength": 3}});
    let instance = json!([1, 2, "a"]);
    let full = report_with(&schemata::options(), &schema, &instance);
    assert_eq!(full.errors().count(), 3);
    let mut options = schemata::options();
    options.with_fail_fast(true);
    let fast = report_with(&options, &schema, &instance);
    assert_eq!(fast.errors().count(), 1);
    assert!(!fast.is_success());
}

#[test]
fn messages_serialize_as_structured_data() {
    let report = report_with(
        &schemata::options(),
        &json!({"properties": {"size": {"maximum": 10}}}),
        &json!({"size": 11}),
    );
    let value = serde_json::to_value(&report).expect("Serializable");
    assert_eq!(
        value,
        json!({
            "success": false,
            "messages": [{
                "level": "error",
                "keyword": "maximum",
                "message": report.messages()[0].text(),
                "schema": {"loadingURI": "json-schema:///", "pointer": "/properties/size"},
                "instance": {"pointer": "/size"},
                "limit": 10,
                "found": 11
            }]
        })
    );
}

#[test]
fn fatal_messages_serialize_their_cause() {
    let report = report_with(&schemata::options(), &json!({"$ref": "#"}), &json!(1));
    let value = serde_json::to_value(&report.messages()[0]).expect("Serializable");
    assert_eq!(value["level"], "fatal");
    assert_eq!(value["keyword"], "$ref");
    assert_eq!(value["error"], "referenceLoop");
    assert!(value["path"].is_array());
}

#[test]
fn configuration_from_json() {
    let config: ValidationConfig = serde_json::from_value(json!({
        "draft": "draft3",
        "logThreshold": "error",
        "exceptionThreshold": "fatal",
        "validatorCache": false
    }))
    .expect("Valid configuration");
    let report = schemata::validate(
        &json!({"properties": {"a": {"required": true}}, "format": "no-such-format"}),
        &json!({}),
        &config,
    )
    .expect("Not escalated");
    assert!(!report.is_success());
    assert_eq!(report.messages().len(), 1);
    assert_eq!(report.messages()[0].keyword, Some("properties"));

    let validator = ValidationOptions::from_config(config)
        .build(&json!({}))
        .expect("Valid schema");
    assert_eq!(validator.draft(), Draft::Draft3);
    assert!(!validator.config().validator_cache);
}

#[test]
fn boolean_schemas_depend_on_the_draft() {
    let schema = json!({"properties": {"a": false}});
    let validator = Validator::new(&schema).expect("Valid schema");
    assert!(validator.is_valid(&json!({"b": 1})));
    let report = validator.validate(&json!({"a": 1})).expect("Not escalated");
    assert!(matches!(report.messages()[0].kind, MessageKind::FalseSchema));
    assert_eq!(report.messages()[0].keyword, None);

    let draft4 = schemata::options()
        .with_draft(Draft::Draft4)
        .build(&schema)
        .expect("Valid schema");
    let report = draft4.validate(&json!({"a": 1})).expect("Not escalated");
    assert_eq!(report.messages()[0].level, LogLevel::Fatal);
}
