//! Paginated-document renderer
//!
//! Rendering runs in two passes. [`PdfRenderer::layout`] places every line on
//! a page (title block, metadata, a table header repeated on each page and one
//! monospaced line per row). Once the page count is known the second pass
//! stamps "Page X of Y" footers and serializes the document with lopdf.

use super::value::{format_cell, truncate_chars};
use super::{RenderedOutput, Renderer};
use crate::config::schema::PageOrientation;
use crate::config::PdfConfig;
use crate::core::estimate::ExportFormat;
use crate::domain::{EntityRow, Result};
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const A4_SHORT: i64 = 595;
const A4_LONG: i64 = 842;
const MARGIN: i64 = 40;
const FOOTER_Y: i64 = 20;
const COLUMN_GAP: usize = 1;
const MIN_COLUMN_CHARS: usize = 4;
const DEFAULT_TITLE: &str = "Export";

/// Font resource names in the page resources dictionary
const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// One positioned text line
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: i64,
    pub y: i64,
    pub size: i64,
    pub bold: bool,
}

/// Content of a single page after the layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

impl PageLayout {
    /// Text of every line, top to bottom
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }
}

/// Renders rows as an A4 PDF table
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    title: Option<String>,
    orientation: PageOrientation,
    font_size: i64,
    max_cell_chars: usize,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            title: config.title.clone(),
            orientation: config.orientation,
            font_size: i64::from(config.font_size),
            max_cell_chars: config.max_cell_chars.max(MIN_COLUMN_CHARS),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_orientation(mut self, orientation: PageOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    fn page_size(&self) -> (i64, i64) {
        match self.orientation {
            PageOrientation::Portrait => (A4_SHORT, A4_LONG),
            PageOrientation::Landscape => (A4_LONG, A4_SHORT),
        }
    }

    fn line_height(&self) -> i64 {
        self.font_size + 4
    }

    /// Characters per column so the table fits the printable width when possible
    fn column_chars(&self, columns: usize) -> usize {
        let (width, _) = self.page_size();
        // Courier glyphs are 0.6 em wide
        let chars_per_line = ((width - 2 * MARGIN) * 10 / (self.font_size * 6)).max(1) as usize;
        let per_column = chars_per_line / columns.max(1);
        per_column
            .saturating_sub(COLUMN_GAP)
            .clamp(MIN_COLUMN_CHARS, self.max_cell_chars)
    }

    fn table_line(cells: impl Iterator<Item = String>, width: usize) -> String {
        cells
            .map(|cell| format!("{:<width$}", truncate_chars(&cell, width)))
            .collect::<Vec<_>>()
            .join(&" ".repeat(COLUMN_GAP))
            .trim_end()
            .to_string()
    }

    /// First pass: distribute title, metadata, header and rows over pages
    ///
    /// Footers are not part of the layout; they are stamped in the second pass.
    pub fn layout(
        &self,
        rows: &[EntityRow],
        fields: &[String],
        generated_at: DateTime<Utc>,
    ) -> Vec<PageLayout> {
        let (_, height) = self.page_size();
        let line_height = self.line_height();
        let title_size = self.font_size + 6;
        let top = height - MARGIN;
        let bottom = MARGIN;

        let width = self.column_chars(fields.len());
        let header = Self::table_line(fields.iter().cloned(), width);
        let rule = "-".repeat(header.chars().count().max(1));

        let mut pages = Vec::new();
        let mut page = PageLayout::default();
        let mut y = top;

        let place = |page: &mut PageLayout, y: &mut i64, text: String, size: i64, bold: bool| {
            *y -= size.max(line_height);
            page.lines.push(PlacedLine {
                text,
                x: MARGIN,
                y: *y,
                size,
                bold,
            });
        };

        let title = self.title.as_deref().unwrap_or(DEFAULT_TITLE).to_string();
        place(&mut page, &mut y, title, title_size, true);
        place(
            &mut page,
            &mut y,
            format!("Generated at: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
            self.font_size,
            false,
        );
        place(
            &mut page,
            &mut y,
            format!("Records: {}", rows.len()),
            self.font_size,
            false,
        );
        y -= line_height;

        if !fields.is_empty() {
            place(&mut page, &mut y, header.clone(), self.font_size, true);
            place(&mut page, &mut y, rule.clone(), self.font_size, false);
        }

        for row in rows {
            if y - line_height < bottom {
                pages.push(std::mem::take(&mut page));
                y = top;
                place(&mut page, &mut y, header.clone(), self.font_size, true);
                place(&mut page, &mut y, rule.clone(), self.font_size, false);
            }
            let line = Self::table_line(fields.iter().map(|f| format_cell(&row.value(f))), width);
            place(&mut page, &mut y, line, self.font_size, false);
        }

        pages.push(page);
        pages
    }

    fn footer(&self, page: usize, total: usize) -> PlacedLine {
        let (width, _) = self.page_size();
        let text = format!("Page {page} of {total}");
        let text_width = text.chars().count() as i64 * self.font_size * 6 / 10;
        PlacedLine {
            text,
            x: (width - text_width) / 2,
            y: FOOTER_Y,
            size: self.font_size,
            bold: false,
        }
    }

    /// Second pass: stamp footers and serialize
    fn assemble(&self, mut pages: Vec<PageLayout>) -> Result<Vec<u8>> {
        let total = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            page.lines.push(self.footer(index + 1, total));
        }

        let (width, height) = self.page_size();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => Object::Reference(regular_id),
                BOLD_FONT => Object::Reference(bold_id),
            },
        });

        let mut kids = Vec::with_capacity(total);
        for page in &pages {
            let content: Content<Vec<Operation>> = Content {
                operations: page.lines.iter().flat_map(text_operations).collect(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
            });
            kids.push(Object::Reference(page_id));
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(total as i64),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PdfRenderer {
    fn name(&self) -> &str {
        "pdf"
    }

    fn render(&self, rows: &[EntityRow], fields: &[String]) -> Result<RenderedOutput> {
        let pages = self.layout(rows, fields, Utc::now());
        tracing::debug!(pages = pages.len(), rows = rows.len(), "Laid out PDF pages");
        let bytes = self.assemble(pages)?;
        Ok(RenderedOutput::from_renderer(bytes, self))
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn size_class(&self) -> ExportFormat {
        ExportFormat::Pdf
    }
}

fn text_operations(line: &PlacedLine) -> Vec<Operation> {
    let font = if line.bold { BOLD_FONT } else { REGULAR_FONT };
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), Object::Integer(line.size)]),
        Operation::new("Td", vec![Object::Integer(line.x), Object::Integer(line.y)]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(&line.text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Encode for the standard fonts; characters WinAnsiEncoding lacks become '?'
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketRecord;
    use chrono::TimeZone;

    fn market(id: i64, nome: &str) -> EntityRow {
        EntityRow::Market(MarketRecord {
            id: Some(id),
            nome: Some(nome.to_string()),
            segmento: Some("Tech".to_string()),
            ..Default::default()
        })
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_single_page_layout() {
        let renderer = PdfRenderer::new().with_title("Mercados");
        let pages = renderer.layout(
            &[market(1, "Mercado A"), market(2, "Mercado B")],
            &fields(&["id", "nome", "segmento"]),
            generated_at(),
        );

        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].texts().collect();
        assert_eq!(texts[0], "Mercados");
        assert_eq!(texts[1], "Generated at: 2025-03-14 09:30:00 UTC");
        assert_eq!(texts[2], "Records: 2");
        assert!(texts[3].starts_with("id"));
        assert!(texts[3].contains("segmento"));
        assert!(texts[5].contains("Mercado A"));
    }

    #[test]
    fn test_header_repeats_on_every_page() {
        let rows: Vec<EntityRow> = (0..300).map(|i| market(i, "Mercado")).collect();
        let renderer = PdfRenderer::new();
        let pages = renderer.layout(&rows, &fields(&["id", "nome"]), generated_at());

        assert!(pages.len() > 1);
        let header = pages[0].lines[3].text.clone();
        for page in &pages[1..] {
            assert_eq!(page.lines[0].text, header);
            assert!(page.lines.iter().all(|l| l.y >= MARGIN));
        }
        let data_lines: usize = pages.iter().map(|p| p.lines.len()).sum::<usize>()
            - 5
            - 2 * (pages.len() - 1);
        assert_eq!(data_lines, 300);
    }

    #[test]
    fn test_cells_truncated_with_ellipsis() {
        let renderer = PdfRenderer::from_config(&PdfConfig {
            max_cell_chars: 10,
            ..PdfConfig::default()
        });
        let pages = renderer.layout(
            &[market(1, "Mercado de Tecnologia Avançada")],
            &fields(&["nome"]),
            generated_at(),
        );
        let row_line = pages[0].lines.last().unwrap();
        assert_eq!(row_line.text, "Mercado...");
    }

    #[test]
    fn test_footers_stamped_and_document_loads() {
        let rows: Vec<EntityRow> = (0..200).map(|i| market(i, "Saúde")).collect();
        let renderer = PdfRenderer::new();
        let expected_pages = renderer
            .layout(&rows, &fields(&["id", "nome"]), generated_at())
            .len();
        let output = renderer.render(&rows, &fields(&["id", "nome"])).unwrap();

        assert!(output.bytes.starts_with(b"%PDF"));
        let doc = Document::load_mem(&output.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), expected_pages);

        let footer = renderer.footer(2, expected_pages);
        assert_eq!(footer.text, format!("Page 2 of {expected_pages}"));

        for (number, page_id) in doc.get_pages().into_values().enumerate() {
            let content = doc.get_page_content(page_id).unwrap();
            let stamp = format!("Page {} of {}", number + 1, expected_pages);
            assert!(
                content.windows(stamp.len()).any(|w| w == stamp.as_bytes()),
                "missing '{stamp}'"
            );
        }
    }

    #[test]
    fn test_empty_input_renders_header_only_document() {
        let output = PdfRenderer::new().render(&[], &fields(&["id"])).unwrap();
        assert!(output.bytes.starts_with(b"%PDF"));
        assert_eq!(output.mime_type, "application/pdf");
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(win_ansi("Saúde"), vec![b'S', b'a', 0xFA, b'd', b'e']);
        assert_eq!(
            win_ansi("€\u{2013}\u{201C}ok\u{201D}"),
            vec![0x80, 0x96, 0x93, b'o', b'k', 0x94]
        );
        assert_eq!(win_ansi("\u{0085}日"), vec![b'?', b'?']);
    }
}
