/*!
 * PDF to text extraction.
 *
 * Extraction reads the PDF text layer first and only falls back to OCR when
 * the whole document yields no text, which is the signature of a scanned
 * PDF. The result is cleaned and additionally reshaped for display.
 *
 * Both sources sit behind traits so the pipeline can be tested without
 * poppler or tesseract installed:
 * - `TextLayer`: per-page text from the PDF structure (default: lopdf)
 * - `OcrEngine`: per-page text from rasterized pages (default: tesseract)
 */

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::ExtractionConfig;
use crate::errors::ExtractionError;
use crate::text::{clean, reshape_arabic};

pub mod ocr;
pub mod pdf;

pub use ocr::TesseractOcr;
pub use pdf::LopdfTextLayer;

/// Source of per-page text embedded in a PDF
#[async_trait]
pub trait TextLayer: Send + Sync + Debug {
    /// Text of every page in page order; image-only pages yield empty strings
    async fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Optical character recognition over rendered pages
#[async_trait]
pub trait OcrEngine: Send + Sync + Debug {
    /// Recognized text of every page in page order
    async fn recognize(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Where the extracted text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer
    TextLayer,
    /// OCR of rasterized pages
    Ocr,
    /// Neither source produced text
    Empty,
}

/// Normalized text of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Cleaned, shaped and in visual order, ready for direct rendering
    pub display: String,
    /// Cleaned, in reading order, unshaped; what the models consume
    pub logical: String,
    /// Which source produced the text
    pub method: ExtractionMethod,
    /// Number of pages seen by the source that produced the text
    pub page_count: usize,
}

impl ExtractedText {
    /// Build from raw text, cleaning and reshaping it
    pub fn from_raw(raw: &str, method: ExtractionMethod, page_count: usize) -> Self {
        let logical = clean(raw);
        let display = reshape_arabic(&logical);
        Self { display, logical, method, page_count }
    }

    /// Whether no readable text was recovered
    pub fn is_empty(&self) -> bool {
        self.logical.trim().is_empty()
    }
}

/// Join non-empty pages with a paragraph break
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// PDF text extractor with OCR fallback
#[derive(Debug, Clone)]
pub struct Extractor {
    text_layer: Arc<dyn TextLayer>,
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl Extractor {
    /// Create an extractor from explicit sources; `None` disables OCR
    pub fn new(text_layer: Arc<dyn TextLayer>, ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self { text_layer, ocr }
    }

    /// Create the default lopdf + tesseract extractor from configuration
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let ocr: Option<Arc<dyn OcrEngine>> = if config.ocr_enabled {
            Some(Arc::new(TesseractOcr::from_config(config)))
        } else {
            None
        };
        Self::new(Arc::new(LopdfTextLayer), ocr)
    }

    /// Extract normalized text from PDF bytes
    pub async fn extract(&self, pdf: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let pages = self.text_layer.page_texts(pdf).await?;
        let raw = join_pages(&pages);

        if !raw.trim().is_empty() {
            debug!("Text layer produced {} characters from {} pages", raw.chars().count(), pages.len());
            return Ok(ExtractedText::from_raw(&raw, ExtractionMethod::TextLayer, pages.len()));
        }

        let Some(ocr) = &self.ocr else {
            warn!("PDF has no text layer and OCR is disabled");
            return Ok(ExtractedText::from_raw("", ExtractionMethod::Empty, pages.len()));
        };

        info!("No text layer found in {} pages, falling back to OCR", pages.len());
        let ocr_pages = ocr.recognize(pdf).await?;
        let raw = join_pages(&ocr_pages);
        let method = if raw.trim().is_empty() { ExtractionMethod::Empty } else { ExtractionMethod::Ocr };

        Ok(ExtractedText::from_raw(&raw, method, ocr_pages.len()))
    }
}
