/*!
 * Tests for file and directory utilities
 */

use lexdoc::errors::PipelineError;
use lexdoc::file_utils::FileManager;

use crate::common;

#[test]
fn test_readDocument_withinLimit_shouldReturnBytes() {
    let dir = common::create_temp_dir().unwrap();
    let pdf = common::text_pdf(&["Hello"]);
    let path = common::create_test_file(dir.path(), "doc.pdf", &pdf).unwrap();

    let bytes = FileManager::read_document(&path, pdf.len()).unwrap();
    assert_eq!(bytes, pdf);
}

#[test]
fn test_readDocument_overLimit_shouldReportSizes() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "doc.pdf", &[0u8; 10]).unwrap();

    let error = FileManager::read_document(&path, 9).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<PipelineError>(),
        Some(PipelineError::DocumentTooLarge { size: 10, limit: 9 })
    ));
}

#[test]
fn test_readDocument_withMissingFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(FileManager::read_document(dir.path().join("missing.pdf"), 100).is_err());
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("a/b/c");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(nested.is_dir());
    // Existing directories are fine
    FileManager::ensure_dir(&nested).unwrap();
}
