/*!
 * Error types for the lexdoc pipeline.
 *
 * Each stage has its own error enum so callers can tell a fatal stage
 * failure apart from the degraded-but-successful outcomes reported in
 * `Summary::method` and `Translation::degraded`.
 */

use thiserror::Error;

use crate::language_utils::Language;

/// Errors that can occur when talking to a model backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend does not know the requested model
    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

/// Errors raised while turning PDF bytes into text
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The bytes could not be parsed as a PDF document
    #[error("Invalid PDF document: {0}")]
    InvalidPdf(#[from] lopdf::Error),

    /// Filesystem error while staging files for external tools
    #[error("I/O error during extraction: {0}")]
    Io(#[from] std::io::Error),

    /// An external tool could not be started
    #[error("{tool} is not available: {message}")]
    ToolUnavailable {
        /// Tool binary name
        tool: String,
        /// Underlying spawn error
        message: String,
    },

    /// An external tool exited with a failure status
    #[error("{tool} failed (exit code {status:?}): {stderr}")]
    ToolFailed {
        /// Tool binary name
        tool: String,
        /// Process exit code, if any
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// An external tool did not finish in time
    #[error("{tool} timed out after {seconds}s")]
    ToolTimeout {
        /// Tool binary name
        tool: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// A blocking extraction task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Errors that make a translation request fail outright
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Language outside the supported set
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// No model could be loaded for the ordered pair
    #[error("Translation model not available for {from} to {to}")]
    ModelUnavailable {
        /// Source language
        from: Language,
        /// Target language
        to: Language,
    },
}

/// Stage-fatal errors of a document pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No text could be recovered from the document
    #[error("Error processing PDF: {0}")]
    Extraction(#[from] ExtractionError),

    /// Extraction produced only whitespace
    #[error("No readable text was found in the document")]
    EmptyDocument,

    /// Translation could not be started
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Source and target language are identical
    #[error("Source and target language are both {0}")]
    SameLanguage(Language),

    /// Input exceeds the configured size limit
    #[error("Document is {size} bytes, the limit is {limit} bytes")]
    DocumentTooLarge {
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The legal-agent collaborator failed
    #[error("Legal agent error: {0}")]
    Agent(#[source] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the document pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
