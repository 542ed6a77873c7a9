/*!
 * Legal annotation collaborator.
 *
 * The document pipeline asks two opaque questions of a legal agent: which
 * legal issues a document raises, and which legislation it maps to. The
 * answers are plain text. `LlmLegalAgent` sends an Arabic task prompt to the
 * configured model; tests substitute their own `LegalAgent`.
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::AgentConfig;
use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// External legal-annotation service
#[async_trait]
pub trait LegalAgent: Send + Sync + Debug {
    /// Identify potential legal issues in a document
    async fn analyze_legal_issues(&self, text: &str) -> Result<String, ProviderError>;

    /// Map a document to relevant legislation
    async fn map_to_legislation(&self, text: &str) -> Result<String, ProviderError>;
}

const JUDGE_ROLE: &str = "أنت قاضٍ متمرس في النظام القانوني الإماراتي. \
قدّم تحليلاً قانونياً دقيقاً ومسبباً بناءً على القانون الإماراتي.";

const ADVOCATE_ROLE: &str = "أنت محامٍ ماهر في الإمارات العربية المتحدة. \
اربط الوقائع بالقوانين والتشريعات الإماراتية ذات الصلة بدقة.";

fn analysis_task(text: &str) -> String {
    format!(
        "تحليل المستند التالي وتحديد المخالفات القانونية المحتملة وفقاً للقوانين الإماراتية:\n\
         {}\n\n\
         يجب أن يتضمن التحليل:\n\
         1. المخالفات القانونية المحتملة\n\
         2. المواد القانونية ذات الصلة\n\
         3. التوصيات للتصحيح",
        text
    )
}

fn legislation_task(text: &str) -> String {
    format!(
        "تحليل المستند التالي وربطه بالقوانين والتشريعات الإماراتية ذات الصلة:\n\
         {}\n\n\
         يجب أن يتضمن التحليل:\n\
         1. القوانين الإماراتية ذات الصلة\n\
         2. المواد القانونية المحددة\n\
         3. التفسير القانوني للعلاقة",
        text
    )
}

/// Legal agent answering through a model backend
#[derive(Debug, Clone)]
pub struct LlmLegalAgent {
    provider: Arc<dyn Provider>,
    config: AgentConfig,
}

impl LlmLegalAgent {
    pub fn new(provider: Arc<dyn Provider>, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    async fn ask(&self, role: &str, task: String) -> Result<String, ProviderError> {
        let request = CompletionRequest::new(self.config.model.clone(), task)
            .system(role)
            .length_bounds(None, self.config.max_tokens)
            .temperature(self.config.temperature);

        let response = self.provider.complete(request).await?;
        debug!("Legal agent answered with {} characters", response.text.chars().count());
        Ok(response.text)
    }
}

#[async_trait]
impl LegalAgent for LlmLegalAgent {
    async fn analyze_legal_issues(&self, text: &str) -> Result<String, ProviderError> {
        self.ask(JUDGE_ROLE, analysis_task(text)).await
    }

    async fn map_to_legislation(&self, text: &str) -> Result<String, ProviderError> {
        self.ask(ADVOCATE_ROLE, legislation_task(text)).await
    }
}
