use async_trait::async_trait;
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::ExtractionConfig;
use crate::errors::ExtractionError;
use crate::extraction::OcrEngine;

/// OCR through poppler's `pdftoppm` and the `tesseract` CLI
///
/// Pages are rendered to PNG in a temporary directory, then recognized one
/// by one with the configured language set (`ara+eng` by default).
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    pdftoppm_path: String,
    tesseract_path: String,
    dpi: u32,
    languages: String,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            pdftoppm_path: config.pdftoppm_path.clone(),
            tesseract_path: config.tesseract_path.clone(),
            dpi: config.dpi,
            languages: config.ocr_languages.clone(),
            timeout: Duration::from_secs(config.tool_timeout_secs),
        }
    }

    /// Run an external tool, racing it against the configured timeout
    async fn run_tool(&self, program: &str, args: &[&str]) -> Result<Output, ExtractionError> {
        let tool_future = Command::new(program).args(args).kill_on_drop(true).output();

        let output = tokio::select! {
            result = tool_future => {
                result.map_err(|e| ExtractionError::ToolUnavailable {
                    tool: program.to_string(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ExtractionError::ToolTimeout {
                    tool: program.to_string(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{} failed: {}", program, stderr);
            return Err(ExtractionError::ToolFailed {
                tool: program.to_string(),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(output)
    }

    /// Render every page of a PDF to PNG files, returned in page order
    async fn rasterize(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        let dpi = self.dpi.to_string();
        let prefix = out_dir.join("page");
        let pdf_arg = pdf_path.to_string_lossy();
        let prefix_arg = prefix.to_string_lossy();

        self.run_tool(&self.pdftoppm_path, &["-r", &dpi, "-png", &pdf_arg, &prefix_arg]).await?;

        let mut images: Vec<(u32, PathBuf)> = Vec::new();
        let mut entries = tokio::fs::read_dir(out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(image) = page_image(entry.path()) {
                images.push(image);
            }
        }

        images.sort();
        Ok(images.into_iter().map(|(_, path)| path).collect())
    }
}

/// A rendered PNG page keyed by its page number; unnumbered pages sort last
fn page_image(path: PathBuf) -> Option<(u32, PathBuf)> {
    let is_png = path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if !is_png {
        return None;
    }

    let index = path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(page_index_from_stem)
        .unwrap_or(u32::MAX);
    Some((index, path))
}

/// Page number from a pdftoppm file stem such as "page-07"
fn page_index_from_stem(stem: &str) -> Option<u32> {
    stem.rsplit('-').next()?.parse().ok()
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("input.pdf");
        tokio::fs::write(&pdf_path, pdf).await?;

        let images = self.rasterize(&pdf_path, workdir.path()).await?;
        debug!("Rendered {} pages at {} dpi for OCR", images.len(), self.dpi);

        let mut pages = Vec::with_capacity(images.len());
        for image in &images {
            let image_arg = image.to_string_lossy();
            let output = self.run_tool(&self.tesseract_path, &[&image_arg, "stdout", "-l", &self.languages]).await?;
            pages.push(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        Ok(pages)
    }
}
