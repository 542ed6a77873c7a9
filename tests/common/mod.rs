/*!
 * Common test utilities for the lexdoc test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use lopdf::dictionary;
use lopdf::{Document, Object, Stream};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use lexdoc::agents::LegalAgent;
use lexdoc::app_config::{InterfaceLanguage, SummarizationConfig, TranslationConfig};
use lexdoc::errors::{ExtractionError, ProviderError};
use lexdoc::extraction::{Extractor, OcrEngine, TextLayer};
use lexdoc::pipeline::{DocumentPipeline, ProgressEvent};
use lexdoc::providers::Provider;
use lexdoc::summarization::Summarizer;
use lexdoc::translation::Translator;

/// Install a test logger once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes bytes to a file in the given directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Three pages of a searchable Arabic contract, as a text layer would return them
pub fn arabic_contract_pages() -> Vec<String> {
    vec![
        "عقد إيجار سكني\n\nتم الاتفاق بين المؤجر والمستأجر على تأجير الشقة الواقعة في دبي لمدة سنة واحدة.".to_string(),
        "يلتزم المستأجر بدفع الإيجار في بداية كل شهر. ويحق للمؤجر فسخ العقد عند التأخر في السداد لأكثر من شهرين.".to_string(),
        "يخضع هذا العقد لقوانين دولة الإمارات العربية المتحدة. وتختص محاكم دبي بالنظر في أي نزاع ينشأ عنه.".to_string(),
    ]
}

fn finish_document(mut doc: Document, page_ids: Vec<lopdf::ObjectId>) -> Vec<u8> {
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => page_ids.len() as i64,
    });

    for page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
            dict.set("Parent", pages_id);
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A searchable PDF with one line of Latin text per page
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let page_ids = pages
        .iter()
        .map(|text| {
            let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            })
        })
        .collect();

    finish_document(doc, page_ids)
}

/// A PDF whose pages carry only vector graphics, standing in for a scan
pub fn image_only_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let page_ids = (0..page_count)
        .map(|_| {
            let content = b"q 0.5 g 72 72 468 648 re f Q".to_vec();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {},
            })
        })
        .collect();

    finish_document(doc, page_ids)
}

/// Text layer returning fixed pages
#[derive(Debug, Clone)]
pub struct FixedTextLayer(pub Vec<String>);

#[async_trait]
impl TextLayer for FixedTextLayer {
    async fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        Ok(self.0.clone())
    }
}

/// OCR engine returning fixed pages and counting calls
#[derive(Debug, Clone)]
pub struct FixedOcr {
    pages: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl FixedOcr {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, _pdf: &[u8]) -> Result<Vec<String>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

/// Legal agent with canned answers
#[derive(Debug, Clone, Default)]
pub struct CannedAgent {
    pub fail: bool,
}

#[async_trait]
impl LegalAgent for CannedAgent {
    async fn analyze_legal_issues(&self, text: &str) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::ConnectionError("agent offline".to_string()));
        }
        Ok(format!("تحليل: {} حرفاً", text.chars().count()))
    }

    async fn map_to_legislation(&self, _text: &str) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::ConnectionError("agent offline".to_string()));
        }
        Ok("القانون الاتحادي رقم 26 لسنة 2007".to_string())
    }
}

/// Build a pipeline around explicit sources and one provider
pub fn build_pipeline(
    provider: Arc<dyn Provider>,
    text_layer: Arc<dyn TextLayer>,
    ocr: Option<Arc<dyn OcrEngine>>,
    agent: CannedAgent,
) -> DocumentPipeline {
    DocumentPipeline::new(
        Extractor::new(text_layer, ocr),
        Summarizer::new(provider.clone(), SummarizationConfig::default()),
        Arc::new(agent),
        Arc::new(Translator::new(provider, TranslationConfig::default())),
    )
    .interface_language(InterfaceLanguage::English)
}

/// Collects progress events
#[derive(Debug, Default, Clone)]
pub struct ProgressLog(Arc<Mutex<Vec<ProgressEvent>>>);

impl ProgressLog {
    pub fn sink(&self) -> impl Fn(&str, f32) + Send + Sync + 'static {
        let events = self.0.clone();
        move |message: &str, fraction: f32| events.lock().push(ProgressEvent::new(message, fraction))
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.0.lock().clone()
    }

    pub fn fractions(&self) -> Vec<f32> {
        self.0.lock().iter().map(|e| e.fraction).collect()
    }
}
