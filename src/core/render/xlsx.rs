//! Spreadsheet renderer
//!
//! Writes a minimal SpreadsheetML package (one worksheet, inline strings, one
//! bold style for the header) into a zip archive.

use super::value::format_cell;
use super::{RenderedOutput, Renderer};
use crate::config::ExcelConfig;
use crate::core::estimate::ExportFormat;
use crate::domain::{CellValue, EntityRow, MercatorError, Result};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAX_SHEET_NAME_CHARS: usize = 31;
const MIN_COLUMN_WIDTH: usize = 8;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 0 is the default, style 1 the bold header.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs></styleSheet>"#;

/// Renders rows as a single-sheet `.xlsx` workbook
#[derive(Debug, Clone)]
pub struct XlsxRenderer {
    sheet_name: String,
    include_header: bool,
    max_column_width: usize,
}

impl XlsxRenderer {
    pub fn new() -> Self {
        Self::from_config(&ExcelConfig::default())
    }

    pub fn from_config(config: &ExcelConfig) -> Self {
        Self {
            sheet_name: sanitize_sheet_name(&config.sheet_name),
            include_header: config.include_header,
            max_column_width: config.max_column_width.max(1),
        }
    }

    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = sanitize_sheet_name(name);
        self
    }

    pub fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    /// Sheet name after sanitization
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn workbook_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            escape_xml(&self.sheet_name)
        )
    }

    /// Column widths: longest formatted cell or header, plus padding, capped
    fn column_widths(&self, rows: &[Vec<CellValue>], fields: &[String]) -> Vec<usize> {
        fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let header = if self.include_header {
                    field.chars().count()
                } else {
                    0
                };
                let longest = rows
                    .iter()
                    .map(|cells| format_cell(&cells[i]).chars().count())
                    .fold(header, usize::max);
                (longest + 2).max(MIN_COLUMN_WIDTH).min(self.max_column_width)
            })
            .collect()
    }

    fn sheet_xml(&self, rows: &[EntityRow], fields: &[String]) -> String {
        let cells: Vec<Vec<CellValue>> = rows
            .iter()
            .map(|row| fields.iter().map(|f| row.value(f)).collect())
            .collect();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !fields.is_empty() {
            xml.push_str("<cols>");
            for (i, width) in self.column_widths(&cells, fields).into_iter().enumerate() {
                let _ = write!(
                    xml,
                    r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
                    n = i + 1
                );
            }
            xml.push_str("</cols>");
        }

        xml.push_str("<sheetData>");
        let mut row_number = 0usize;

        if self.include_header && !fields.is_empty() {
            row_number += 1;
            let _ = write!(xml, r#"<row r="{row_number}">"#);
            for (col, field) in fields.iter().enumerate() {
                push_inline_string(&mut xml, &cell_ref(col, row_number), field, Some(1));
            }
            xml.push_str("</row>");
        }

        for row in &cells {
            row_number += 1;
            let _ = write!(xml, r#"<row r="{row_number}">"#);
            for (col, value) in row.iter().enumerate() {
                push_cell(&mut xml, &cell_ref(col, row_number), value);
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

impl Default for XlsxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for XlsxRenderer {
    fn name(&self) -> &str {
        "excel"
    }

    fn render(&self, rows: &[EntityRow], fields: &[String]) -> Result<RenderedOutput> {
        let workbook = self.workbook_xml();
        let sheet = self.sheet_xml(rows, fields);

        let parts: [(&str, &str); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", &workbook),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/styles.xml", STYLES),
            ("xl/worksheets/sheet1.xml", &sheet),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (path, content) in parts {
            zip.start_file(path, options)?;
            zip.write_all(content.as_bytes()).map_err(|e| {
                MercatorError::Render(format!("Failed to write spreadsheet part {path}: {e}"))
            })?;
        }

        let bytes = zip.finish()?.into_inner();
        Ok(RenderedOutput::from_renderer(bytes, self))
    }

    fn mime_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn file_extension(&self) -> &'static str {
        "xlsx"
    }

    fn size_class(&self) -> ExportFormat {
        ExportFormat::Excel
    }
}

fn push_inline_string(xml: &mut String, reference: &str, text: &str, style: Option<u8>) {
    let style = style.map(|s| format!(r#" s="{s}""#)).unwrap_or_default();
    let _ = write!(
        xml,
        r#"<c r="{reference}" t="inlineStr"{style}><is><t xml:space="preserve">{}</t></is></c>"#,
        escape_xml(text)
    );
}

fn push_cell(xml: &mut String, reference: &str, value: &CellValue) {
    match value {
        CellValue::Null => {}
        CellValue::Integer(i) => {
            let _ = write!(xml, r#"<c r="{reference}"><v>{i}</v></c>"#);
        }
        CellValue::Float(f) if f.is_finite() => {
            let _ = write!(xml, r#"<c r="{reference}"><v>{f}</v></c>"#);
        }
        CellValue::Bool(b) => {
            let _ = write!(xml, r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*b));
        }
        other => push_inline_string(xml, reference, &format_cell(other), None),
    }
}

/// Spreadsheet column letters for a 0-based index (0 → A, 26 → AA)
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn cell_ref(col: usize, row: usize) -> String {
    format!("{}{row}", column_name(col))
}

/// Apply worksheet naming rules: no `[]:*?/\`, no surrounding apostrophes,
/// at most 31 characters, never empty
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') && !c.is_control())
        .collect();
    let trimmed: String = cleaned
        .trim()
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    if trimmed.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        trimmed
    }
}

/// Escape text for XML content and attributes, dropping characters XML 1.0 forbids
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductRecord;
    use std::io::Read;

    fn product(nome: &str, preco: f64) -> EntityRow {
        EntityRow::Product(ProductRecord {
            id: Some(10),
            nome: Some(nome.to_string()),
            preco: Some(preco),
            disponivel: Some(true),
            ..Default::default()
        })
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Leads [2024]/Q1"), "Leads 2024Q1");
        assert_eq!(sanitize_sheet_name("'quoted'"), "quoted");
        assert_eq!(sanitize_sheet_name("???"), "Sheet1");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("A & B <C>"), "A &amp; B &lt;C&gt;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }

    #[test]
    fn test_typed_cells_and_header_style() {
        let output = XlsxRenderer::new()
            .render(&[product("Plano <Pro>", 99.9)], &fields(&["id", "nome", "preco", "disponivel"]))
            .unwrap();
        let sheet = read_part(&output.bytes, "xl/worksheets/sheet1.xml");

        assert!(sheet.contains(r#"<c r="A1" t="inlineStr" s="1">"#));
        assert!(sheet.contains(r#"<c r="A2"><v>10</v></c>"#));
        assert!(sheet.contains("Plano &lt;Pro&gt;"));
        assert!(sheet.contains(r#"<c r="C2"><v>99.9</v></c>"#));
        assert!(sheet.contains(r#"<c r="D2" t="b"><v>1</v></c>"#));
    }

    #[test]
    fn test_column_width_capped() {
        let long = "x".repeat(200);
        let output = XlsxRenderer::new()
            .render(&[product(&long, 1.0)], &fields(&["nome"]))
            .unwrap();
        let sheet = read_part(&output.bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"width="50""#));
    }

    #[test]
    fn test_empty_input_is_valid_archive() {
        let output = XlsxRenderer::new().render(&[], &fields(&["id"])).unwrap();
        assert!(output.bytes.starts_with(b"PK"));
        let workbook = read_part(&output.bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Export""#));
        let sheet = read_part(&output.bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<row r="1">"#));
        assert!(!sheet.contains(r#"<row r="2">"#));
    }
}
