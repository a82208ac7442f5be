//! Integration tests for the output renderers

use mercator::config::RenderConfig;
use mercator::core::interpreter::QueryInterpreter;
use mercator::core::render::{
    CsvRenderer, PdfRenderer, Renderer, RendererRegistry, XlsxRenderer,
};
use mercator::domain::{EntityKind, EntityRow, ExportRequest};
use serde_json::{json, Value};
use std::io::Read;
use test_case::test_case;

fn row(kind: EntityKind, value: Value) -> EntityRow {
    match value {
        Value::Object(map) => EntityRow::from_json(kind, map).unwrap(),
        other => panic!("expected object, got {other}"),
    }
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn market_rows() -> Vec<EntityRow> {
    vec![
        row(
            EntityKind::Market,
            json!({"id": 1, "nome": "Mercado A", "segmento": "Tech"}),
        ),
        row(
            EntityKind::Market,
            json!({"id": 2, "nome": "Mercado B", "segmento": "Saúde"}),
        ),
    ]
}

#[test]
fn test_csv_quotes_embedded_comma() {
    let rows = vec![row(EntityKind::Client, json!({"nome": "Empresa A, Inc."}))];
    let output = CsvRenderer::new().render(&rows, &fields(&["nome"])).unwrap();
    let text = String::from_utf8(output.bytes).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("nome"));
    assert_eq!(lines.next(), Some("\"Empresa A, Inc.\""));
}

#[test_case(&[] ; "no fields")]
#[test_case(&["id"] ; "one field")]
#[test_case(&["id", "nome", "segmento"] ; "several fields")]
fn test_csv_empty_input_is_empty(names: &[&str]) {
    let output = CsvRenderer::new().render(&[], &fields(names)).unwrap();
    assert!(output.bytes.is_empty());
}

#[test]
fn test_xlsx_empty_input_is_valid_archive() {
    let output = XlsxRenderer::new()
        .render(&[], &fields(&["id", "nome"]))
        .unwrap();
    assert!(!output.bytes.is_empty());
    assert!(output.bytes.starts_with(b"PK"));

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(output.bytes)).unwrap();
    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut sheet)
        .unwrap();
    assert!(sheet.contains("nome"));
}

#[test]
fn test_pdf_empty_input_is_valid_document() {
    let output = PdfRenderer::new().render(&[], &fields(&["id", "nome"])).unwrap();
    assert!(output.bytes.starts_with(b"%PDF"));

    let doc = lopdf::Document::load_mem(&output.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_end_to_end_market_csv() {
    let request = ExportRequest::from_json_str(
        r#"{"entity": "market", "fields": ["id", "nome", "segmento"]}"#,
    )
    .unwrap();
    let query = QueryInterpreter::default().interpret(&request).unwrap();

    let registry = RendererRegistry::with_defaults(&RenderConfig::default()).unwrap();
    let output = registry
        .get("csv")
        .unwrap()
        .render(&market_rows(), &query.fields)
        .unwrap();
    let text = String::from_utf8(output.bytes).unwrap();

    assert_eq!(text, "id,nome,segmento\n1,Mercado A,Tech\n2,Mercado B,Saúde\n");
}

#[test_case("csv", "text/csv", "csv" ; "csv")]
#[test_case("excel", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", "xlsx" ; "excel")]
#[test_case("pdf", "application/pdf", "pdf" ; "pdf")]
fn test_registry_formats_render_market_rows(name: &str, mime: &str, extension: &str) {
    let registry = RendererRegistry::with_defaults(&RenderConfig::default()).unwrap();
    let output = registry
        .get(name)
        .unwrap()
        .render(&market_rows(), &fields(&["id", "nome", "segmento"]))
        .unwrap();

    assert!(!output.bytes.is_empty());
    assert_eq!(output.mime_type, mime);
    assert_eq!(output.file_extension, extension);
    assert!(output
        .suggested_filename(EntityKind::Market)
        .starts_with("market_"));
}

#[test]
fn test_formats_agree_on_dates() {
    let rows = vec![row(
        EntityKind::Lead,
        json!({"nome": "Ana", "created_at": "2024-05-06T13:45:00Z"}),
    )];
    let output = CsvRenderer::new()
        .render(&rows, &fields(&["nome", "created_at"]))
        .unwrap();
    assert_eq!(
        String::from_utf8(output.bytes).unwrap(),
        "nome,created_at\nAna,2024-05-06\n"
    );

    let layout = PdfRenderer::new().layout(
        &rows,
        &fields(&["nome", "created_at"]),
        chrono::Utc::now(),
    );
    let last = layout[0].lines.last().unwrap();
    assert!(last.text.contains("2024-05-06"));
    assert!(!last.text.contains("13:45"));
}
