//! Output renderers
//!
//! Every format implements [`Renderer`]: typed rows plus an ordered field list
//! in, bytes plus MIME type and file extension out. Renderers carry only
//! immutable configuration and can be shared across concurrent exports.
//!
//! Formats are looked up by name in a [`RendererRegistry`]. Adding a format
//! means implementing the trait and registering the instance; the interpreter
//! and executor are not involved.
//!
//! ```rust
//! use mercator::config::RenderConfig;
//! use mercator::core::render::RendererRegistry;
//!
//! # fn example() -> mercator::domain::Result<()> {
//! let registry = RendererRegistry::with_defaults(&RenderConfig::default())?;
//! let renderer = registry.get("xlsx")?;
//! assert_eq!(renderer.file_extension(), "xlsx");
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod pdf;
pub mod value;
pub mod xlsx;

pub use self::csv::CsvRenderer;
pub use self::pdf::PdfRenderer;
pub use self::value::format_cell;
pub use self::xlsx::XlsxRenderer;

use crate::config::RenderConfig;
use crate::core::estimate::ExportFormat;
use crate::domain::{EntityKind, EntityRow, MercatorError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared contract of every output format
pub trait Renderer: Send + Sync {
    /// Registry name of the format
    fn name(&self) -> &str;

    /// Render `rows`, one column per entry of `fields`, in order
    ///
    /// Empty `rows` never fail.
    fn render(&self, rows: &[EntityRow], fields: &[String]) -> Result<RenderedOutput>;

    fn mime_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;

    /// Estimator row describing this format's output size
    ///
    /// Plain delimited text unless a renderer says otherwise.
    fn size_class(&self) -> ExportFormat {
        ExportFormat::Csv
    }
}

/// Rendered payload with delivery metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_extension: String,
}

impl RenderedOutput {
    /// Wrap `bytes` with the MIME type and extension of `renderer`
    pub fn from_renderer<R: Renderer + ?Sized>(bytes: Vec<u8>, renderer: &R) -> Self {
        Self {
            bytes,
            mime_type: renderer.mime_type().to_string(),
            file_extension: renderer.file_extension().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `<entity>_<YYYYMMDD_HHMMSS>.<ext>` for the current time
    pub fn suggested_filename(&self, entity: EntityKind) -> String {
        self.suggested_filename_at(entity, Utc::now())
    }

    pub fn suggested_filename_at(&self, entity: EntityKind, at: DateTime<Utc>) -> String {
        format!(
            "{}_{}.{}",
            entity,
            at.format("%Y%m%d_%H%M%S"),
            self.file_extension
        )
    }
}

/// Format name → renderer mapping
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn Renderer>>,
}

impl RendererRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `csv`, `excel` (also `xlsx`) and `pdf`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a renderer section is invalid.
    pub fn with_defaults(config: &RenderConfig) -> Result<Self> {
        let mut registry = Self::new();

        registry.register("csv", Arc::new(CsvRenderer::from_config(&config.csv)?));

        let excel: Arc<dyn Renderer> = Arc::new(XlsxRenderer::from_config(&config.excel));
        registry.register("excel", excel.clone());
        registry.register("xlsx", excel);

        registry.register("pdf", Arc::new(PdfRenderer::from_config(&config.pdf)));

        tracing::debug!(formats = ?registry.names(), "Renderer registry initialized");
        Ok(registry)
    }

    /// Add or replace the renderer for `name`
    pub fn register(&mut self, name: impl Into<String>, renderer: Arc<dyn Renderer>) {
        self.renderers
            .insert(name.into().trim().to_ascii_lowercase(), renderer);
    }

    /// Renderer for `name`, case-insensitive
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown format.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Renderer>> {
        self.renderers
            .get(&name.trim().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                MercatorError::validation(format!(
                    "unsupported format '{}', expected one of: {}",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct UpperRenderer;

    impl Renderer for UpperRenderer {
        fn name(&self) -> &str {
            "upper"
        }

        fn render(&self, rows: &[EntityRow], fields: &[String]) -> Result<RenderedOutput> {
            let text: Vec<String> = rows
                .iter()
                .flat_map(|row| fields.iter().map(move |f| format_cell(&row.value(f))))
                .map(|cell| cell.to_uppercase())
                .collect();
            Ok(RenderedOutput::from_renderer(text.join("|").into_bytes(), self))
        }

        fn mime_type(&self) -> &'static str {
            "text/plain"
        }

        fn file_extension(&self) -> &'static str {
            "txt"
        }
    }

    #[test]
    fn test_defaults_and_alias() {
        let registry = RendererRegistry::with_defaults(&RenderConfig::default()).unwrap();
        assert_eq!(registry.names(), vec!["csv", "excel", "pdf", "xlsx"]);

        assert_eq!(registry.get("CSV").unwrap().mime_type(), "text/csv");
        assert_eq!(registry.get("xlsx").unwrap().name(), "excel");
        assert_eq!(
            registry.get("excel").unwrap().mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(registry.get(" pdf ").unwrap().file_extension(), "pdf");
        assert_eq!(registry.get("xlsx").unwrap().size_class(), ExportFormat::Excel);
        assert_eq!(registry.get("pdf").unwrap().size_class(), ExportFormat::Pdf);
    }

    #[test]
    fn test_unknown_format_is_validation_error() {
        let registry = RendererRegistry::with_defaults(&RenderConfig::default()).unwrap();
        let err = registry.get("docx").err().unwrap();
        assert!(matches!(err, MercatorError::Validation(_)));
        assert!(err.to_string().contains("docx"));
    }

    #[test]
    fn test_register_new_format() {
        let mut registry = RendererRegistry::new();
        registry.register("Upper", Arc::new(UpperRenderer));

        let renderer = registry.get("upper").unwrap();
        let row = EntityRow::from_json(
            EntityKind::Lead,
            serde_json::json!({"nome": "ana"}).as_object().unwrap().clone(),
        )
        .unwrap();
        let output = renderer.render(&[row], &["nome".to_string()]).unwrap();
        assert_eq!(output.bytes, b"ANA");
        assert_eq!(output.file_extension, "txt");
        assert_eq!(renderer.size_class(), ExportFormat::Csv);
    }

    #[test]
    fn test_suggested_filename() {
        let output = RenderedOutput {
            bytes: vec![1, 2, 3],
            mime_type: "application/pdf".to_string(),
            file_extension: "pdf".to_string(),
        };
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            output.suggested_filename_at(EntityKind::Competitor, at),
            "competitor_20250102_030405.pdf"
        );
        assert_eq!(output.len(), 3);
        assert!(!output.is_empty());
    }
}
