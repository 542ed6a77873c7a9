use async_trait::async_trait;
use log::{debug, warn};
use lopdf::Document;

use crate::errors::ExtractionError;
use crate::extraction::TextLayer;

/// Text layer reader backed by lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextLayer;

impl LopdfTextLayer {
    /// Parse the document and read every page synchronously
    pub fn read_pages(pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let document = Document::load_mem(pdf)?;
        let pages = document.get_pages();
        debug!("PDF has {} pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            // A page with an unsupported font encoding is treated as image-only
            match document.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("Could not read text of page {}: {}", page_number, e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }
}

#[async_trait]
impl TextLayer for LopdfTextLayer {
    async fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let bytes = pdf.to_vec();
        tokio::task::spawn_blocking(move || Self::read_pages(&bytes))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))?
    }
}
