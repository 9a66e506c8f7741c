use schemata::{LogLevel, MessageKind, SchemaError, SchemaFetchError, Validator};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use test_case::test_case;
use url::Url;

fn fatal_error(validator: &Validator, instance: &Value) -> SchemaError {
    let report = validator.validate(instance).expect("Not escalated");
    assert!(!report.is_success());
    let message = report
        .into_messages()
        .into_iter()
        .find(|message| message.level == LogLevel::Fatal)
        .expect("Has a fatal message");
    match message.kind {
        MessageKind::Schema(error) => error,
        other => panic!("Unexpected message: {other:?}"),
    }
}

#[test]
fn remote_documents_are_fetched_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let validator = schemata::options()
        .with_retriever(move |uri: &Url| -> Result<Value, SchemaFetchError> {
            counter.fetch_add(1, Ordering::SeqCst);
            match uri.as_str() {
                "http://example.com/item.json" => Ok(json!({"type": "integer"})),
                _ => Err(anyhow::anyhow!("not found")),
            }
        })
        .build(&json!({"items": {"$ref": "http://example.com/item.json"}}))
        .expect("Valid schema");
    assert!(validator.is_valid(&json!([1, 2, 3])));
    assert!(!validator.is_valid(&json!([1, "2"])));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(validator
        .registry()
        .contains(&Url::parse("http://example.com/item.json").expect("Valid URI")));
}

#[test]
fn relative_references_resolve_against_the_fetched_document() {
    let validator = schemata::options()
        .with_document(
            "http://example.com/schemas/person.json",
            json!({
                "properties": {"address": {"$ref": "address.json#/definitions/street"}}
            }),
        )
        .with_document(
            "http://example.com/schemas/address.json",
            json!({"definitions": {"street": {"type": "string"}}}),
        )
        .build(&json!({"$ref": "http://example.com/schemas/person.json"}))
        .expect("Valid schema");
    assert!(validator.is_valid(&json!({"address": "Main St"})));
    let report = validator
        .validate(&json!({"address": 12}))
        .expect("Not escalated");
    let message = report.errors().next().expect("Has an error");
    assert_eq!(message.instance_path.to_string(), "/address");
    assert_eq!(
        message.schema.uri().as_str(),
        "http://example.com/schemas/address.json"
    );
    assert_eq!(message.schema.pointer().to_string(), "/definitions/street");
}

#[test_case(json!({"$ref": "#item", "definitions": {"a": {"$id": "#item", "type": "integer"}}}); "plain name")]
#[test_case(json!({
    "$ref": "http://example.com/item.json",
    "definitions": {"a": {"$id": "http://example.com/item.json", "type": "integer"}}
}); "absolute identifier")]
#[test_case(json!({
    "$id": "http://example.com/root.json",
    "$ref": "nested/item.json",
    "definitions": {"a": {"$id": "nested/item.json", "type": "integer"}}
}); "relative identifier")]
fn embedded_identifiers_are_found_without_fetching(schema: Value) {
    let validator = schemata::options()
        .with_retriever(|uri: &Url| -> Result<Value, SchemaFetchError> {
            Err(anyhow::anyhow!("unexpected fetch of {uri}"))
        })
        .build(&schema)
        .expect("Valid schema");
    assert!(validator.is_valid(&json!(1)));
    assert!(!validator.is_valid(&json!("1")));
}

#[test]
fn draft_4_uses_id() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "$ref": "#item",
        "definitions": {"a": {"id": "#item", "type": "integer"}}
    });
    let validator = Validator::new(&schema).expect("Valid schema");
    assert!(validator.is_valid(&json!(1)));
    assert!(!validator.is_valid(&json!(1.5)));
}

#[test]
fn scopes_change_the_resolution_base() {
    let schema = json!({
        "$id": "http://example.com/root.json",
        "properties": {
            "a": {
                "$id": "folder/",
                "properties": {"b": {"$ref": "leaf.json"}}
            }
        }
    });
    let validator = schemata::options()
        .with_document(
            "http://example.com/folder/leaf.json",
            json!({"type": "boolean"}),
        )
        .build(&schema)
        .expect("Valid schema");
    assert!(validator.is_valid(&json!({"a": {"b": true}})));
    assert!(!validator.is_valid(&json!({"a": {"b": 1}})));
}

#[test]
fn dangling_pointer_is_fatal() {
    let validator =
        Validator::new(&json!({"properties": {"a": {"$ref": "#/definitions/missing"}}}))
            .expect("Valid schema");
    assert!(validator.is_valid(&json!({"b": 1})));
    assert!(matches!(
        fatal_error(&validator, &json!({"a": 1})),
        SchemaError::DanglingReference { .. }
    ));
}

#[test]
fn unsupported_scheme_is_fatal() {
    let validator =
        Validator::new(&json!({"$ref": "ftp://example.com/schema.json"})).expect("Valid schema");
    match fatal_error(&validator, &json!(1)) {
        SchemaError::UnsupportedScheme { scheme, .. } => assert_eq!(scheme, "ftp"),
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[test]
fn scheme_retrievers_take_precedence() {
    let validator = schemata::options()
        .with_scheme_retriever("urn", |uri: &Url| -> Result<Value, SchemaFetchError> {
            match uri.as_str() {
                "urn:example:positive" => Ok(json!({"minimum": 0})),
                _ => Err(anyhow::anyhow!("unknown urn")),
            }
        })
        .build(&json!({"$ref": "urn:example:positive"}))
        .expect("Valid schema");
    assert!(validator.is_valid(&json!(1)));
    assert!(!validator.is_valid(&json!(-1)));
}

#[test]
fn failing_retriever_is_fatal() {
    let validator = schemata::options()
        .with_retriever(|_: &Url| -> Result<Value, SchemaFetchError> {
            Err(anyhow::anyhow!("connection refused"))
        })
        .build(&json!({"$ref": "http://example.com/schema.json"}))
        .expect("Valid schema");
    match fatal_error(&validator, &json!(1)) {
        SchemaError::Unretrievable { uri, source } => {
            assert_eq!(uri, "http://example.com/schema.json");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[test]
fn validate_at_registered_documents() {
    let validator = schemata::options()
        .with_document(
            "http://example.com/defs.json",
            json!({"definitions": {"name": {"type": "string", "minLength": 1}}}),
        )
        .build(&json!({}))
        .expect("Valid schema");
    let target = "http://example.com/defs.json#/definitions/name";
    assert!(validator
        .validate_at(target, &json!("Ann"))
        .expect("Not escalated")
        .is_success());
    let report = validator.validate_at(target, &json!("")).expect("Not escalated");
    let keywords: Vec<_> = report.errors().map(|message| message.keyword).collect();
    assert_eq!(keywords, [Some("minLength")]);
}

#[cfg(feature = "resolve-file")]
#[test]
fn file_references() {
    use std::io::Write;

    let dir = tempfile::tempdir().expect("Temporary directory");
    let path = dir.path().join("positive.json");
    let mut file = std::fs::File::create(&path).expect("Created");
    file.write_all(br#"{"type": "integer", "minimum": 0}"#)
        .expect("Written");
    let uri = Url::from_file_path(&path).expect("Absolute path");
    let validator = Validator::new(&json!({"items": {"$ref": uri.as_str()}})).expect("Valid");
    assert!(validator.is_valid(&json!([0, 1])));
    assert!(!validator.is_valid(&json!([0, -1])));

    let missing = Url::from_file_path(dir.path().join("missing.json")).expect("Absolute path");
    let validator = Validator::new(&json!({"$ref": missing.as_str()})).expect("Valid");
    assert!(matches!(
        fatal_error(&validator, &json!(1)),
        SchemaError::Unretrievable { .. }
    ));
}

#[cfg(feature = "resolve-http")]
#[test]
fn http_references() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/string.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"type": "string"}"#)
        .expect(1)
        .create();
    let missing = server.mock("GET", "/missing.json").with_status(404).create();

    let uri = format!("{}/string.json", server.url());
    let validator = Validator::new(&json!({"$ref": uri})).expect("Valid schema");
    assert!(validator.is_valid(&json!("a")));
    assert!(!validator.is_valid(&json!(1)));
    mock.assert();

    let uri = format!("{}/missing.json", server.url());
    let validator = Validator::new(&json!({"$ref": uri})).expect("Valid schema");
    assert!(matches!(
        fatal_error(&validator, &json!(1)),
        SchemaError::Unretrievable { .. }
    ));
    missing.assert();
}
