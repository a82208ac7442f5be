//! Delimited-text renderer

use super::value::format_cell;
use super::{RenderedOutput, Renderer};
use crate::config::CsvConfig;
use crate::domain::{EntityRow, MercatorError, Result};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Renders rows as delimited text
///
/// Values containing the delimiter, a quote or a line break are quoted with
/// doubled-quote escaping. An empty row set renders to zero bytes.
///
/// Null cells are empty fields. The one exception is a single-column row
/// whose only value is null: it is written as `""`, since a bare blank line
/// would read back as no record at all.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    delimiter: u8,
    include_header: bool,
    utf8_bom: bool,
}

impl CsvRenderer {
    /// Comma-delimited, with header, without BOM
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
            utf8_bom: false,
        }
    }

    /// Build from the `[render.csv]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid delimiter.
    pub fn from_config(config: &CsvConfig) -> Result<Self> {
        Ok(Self {
            delimiter: config.delimiter_byte().map_err(MercatorError::Configuration)?,
            include_header: config.include_header,
            utf8_bom: config.utf8_bom,
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    pub fn with_bom(mut self, utf8_bom: bool) -> Self {
        self.utf8_bom = utf8_bom;
        self
    }
}

impl Default for CsvRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CsvRenderer {
    fn name(&self) -> &str {
        "csv"
    }

    fn render(&self, rows: &[EntityRow], fields: &[String]) -> Result<RenderedOutput> {
        if rows.is_empty() || fields.is_empty() {
            return Ok(RenderedOutput::from_renderer(Vec::new(), self));
        }

        let mut buffer = Vec::new();
        if self.utf8_bom {
            buffer.extend_from_slice(UTF8_BOM);
        }

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(buffer);

        if self.include_header {
            writer.write_record(fields)?;
        }
        for row in rows {
            writer.write_record(fields.iter().map(|field| format_cell(&row.value(field))))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| MercatorError::Render(format!("CSV writer failed to flush: {e}")))?;

        Ok(RenderedOutput::from_renderer(bytes, self))
    }

    fn mime_type(&self) -> &'static str {
        "text/csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }
}
