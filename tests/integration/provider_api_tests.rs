/*!
 * Integration tests against a live Ollama server
 *
 * These need `ollama serve` on the default endpoint and are ignored by default.
 */

use lexdoc::providers::ollama::Ollama;
use lexdoc::providers::{CompletionRequest, Provider};

#[tokio::test]
async fn test_ollama_withUnreachableEndpoint_shouldFailConnectionTest() {
    let ollama = Ollama::new_with_config("http://127.0.0.1:9", 2, 0, 10, false).unwrap();
    assert!(ollama.test_connection().await.is_err());
}

#[tokio::test]
#[ignore]
async fn test_ollama_liveServer_shouldListModelsAndGenerate() {
    let ollama = Ollama::new("http://localhost:11434", 120).unwrap();
    ollama.test_connection().await.unwrap();

    let models = ollama.list_models().await.unwrap();
    let Some(model) = models.first() else {
        return;
    };

    let response = ollama
        .complete(CompletionRequest::new(model.name.clone(), "Reply with one word: hello").length_bounds(None, 8))
        .await
        .unwrap();
    assert!(!response.text.trim().is_empty());
}
