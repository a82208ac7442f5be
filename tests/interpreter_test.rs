//! Integration tests for request validation and query interpretation

use mercator::core::interpreter::{DefaultFieldSets, QueryInterpreter};
use mercator::domain::{EntityKind, ExportRequest, MercatorError, PlaceholderStyle, SqlValue};
use serde_json::json;
use test_case::test_case;

fn question_interpreter() -> QueryInterpreter {
    QueryInterpreter::new(DefaultFieldSets::canonical(), PlaceholderStyle::Question)
}

#[test_case("market" ; "market")]
#[test_case("client" ; "client")]
#[test_case("competitor" ; "competitor")]
#[test_case("lead" ; "lead")]
#[test_case("product" ; "product")]
fn test_placeholder_count_matches_parameters(entity: &str) {
    let interpreter = question_interpreter();

    let minimal = interpreter.interpret(&ExportRequest::new(entity)).unwrap();
    assert_eq!(minimal.query_text.matches('?').count(), minimal.parameters.len());

    let scoped = interpreter
        .interpret(
            &ExportRequest::new(entity)
                .with_project(4)
                .with_research(11)
                .with_filter("nome", "O'Brien \"quoted\""),
        )
        .unwrap();
    assert_eq!(scoped.query_text.matches('?').count(), 3);
    assert_eq!(scoped.parameters.len(), 3);
    assert!(!scoped.query_text.contains("O'Brien"));
}

#[test_case("market" ; "market")]
#[test_case("client" ; "client")]
#[test_case("competitor" ; "competitor")]
#[test_case("lead" ; "lead")]
#[test_case("product" ; "product")]
fn test_validate_accepts_supported_entities(entity: &str) {
    let report = QueryInterpreter::default().validate(&ExportRequest::new(entity));
    assert!(report.valid);
    assert!(report.errors.is_empty());
}

#[test_case(None ; "missing")]
#[test_case(Some("") ; "empty")]
#[test_case(Some("invoice") ; "unknown")]
fn test_validate_rejects_bad_entity(entity: Option<&str>) {
    let request = ExportRequest {
        entity: entity.map(str::to_string),
        ..ExportRequest::default()
    };
    let report = QueryInterpreter::default().validate(&request);
    assert!(!report.valid);
    assert!(!report.errors.is_empty());
}

#[test]
fn test_interpret_rejects_invalid_request_before_building() {
    let err = QueryInterpreter::default()
        .interpret(&ExportRequest::new("market").with_filter("senha", "x"))
        .unwrap_err();
    assert!(matches!(err, MercatorError::Validation(_)));
}

#[test]
fn test_request_json_to_query() {
    let request = ExportRequest::from_json_str(
        r#"{
            "entity": "lead",
            "projectId": 7,
            "filters": {"status": "novo", "score": 80},
            "fields": ["nome", "email"],
            "orderBy": "nome DESC",
            "limit": 25
        }"#,
    )
    .unwrap();

    let query = QueryInterpreter::default().interpret(&request).unwrap();
    assert_eq!(query.entity, EntityKind::Lead);
    assert_eq!(
        query.query_text,
        r#"SELECT "nome", "email" FROM "leads" WHERE "projeto_id" = $1 AND "status" = $2 AND "score" = $3 ORDER BY nome DESC LIMIT 25"#
    );
    assert_eq!(
        query.parameters,
        vec![
            SqlValue::Integer(7),
            SqlValue::Text("novo".to_string()),
            SqlValue::Integer(80)
        ]
    );
    assert_eq!(
        query.count_text(),
        r#"SELECT COUNT(*) FROM "leads" WHERE "projeto_id" = $1 AND "status" = $2 AND "score" = $3"#
    );
}

#[test]
fn test_non_positive_limit_is_ignored() {
    let query = QueryInterpreter::default()
        .interpret(&ExportRequest::new("product").with_limit(0))
        .unwrap();
    assert!(!query.query_text.contains("LIMIT"));
}

#[test]
fn test_injected_default_fields() {
    let fields = DefaultFieldSets::canonical()
        .with_override(EntityKind::Market, ["nome", "regiao"])
        .unwrap();
    let interpreter = QueryInterpreter::new(fields, PlaceholderStyle::Numbered);

    let query = interpreter.interpret(&ExportRequest::new("market")).unwrap();
    assert_eq!(query.fields, vec!["nome".to_string(), "regiao".to_string()]);

    let other = interpreter.interpret(&ExportRequest::new("client")).unwrap();
    assert_eq!(other.fields, EntityKind::Client.canonical_fields());
}

#[test]
fn test_structured_filter_value_rejected() {
    let request = ExportRequest::new("client").with_filter("estado", json!(["SP", "RJ"]));
    let report = QueryInterpreter::default().validate(&request);
    assert!(!report.valid);
}
