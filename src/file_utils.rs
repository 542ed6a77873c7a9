use anyhow::{Context, Result, bail};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::PipelineError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Read a document, refusing files larger than `limit` bytes
    ///
    /// The size is checked from metadata before the bytes are read.
    pub fn read_document<P: AsRef<Path>>(path: P, limit: usize) -> Result<Vec<u8>> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            bail!("Input file not found: {}", path.display());
        }
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read document metadata: {}", path.display()))?;

        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > limit {
            return Err(PipelineError::DocumentTooLarge { size, limit }.into());
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read document: {}", path.display()))?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }

    // @writes: String content to file, creating parent directories
    pub fn write_output<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }
        fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))?;
        Ok(())
    }

    // @generates: Default output path next to the input, e.g. `contract.en.json`
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, suffix: &str, extension: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let file_name = format!("{}.{}.{}", stem, suffix, extension);
        match input_file.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}
