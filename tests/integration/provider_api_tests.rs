/*!
 * Provider API tests against a local HTTP stub
 */

use anyhow::Result;

use docxlate::errors::ProviderError;
use docxlate::providers::google::Google;
use docxlate::providers::ollama::Ollama;
use docxlate::providers::Provider;
use crate::common::http_stub::StubServer;

fn batch(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_google_withSuccessResponse_shouldReturnTranslationsInOrder() -> Result<()> {
    let stub = StubServer::start(
        200,
        r#"{"data":{"translations":[{"translatedText":"Hello","detectedSourceLanguage":"es"},{"translatedText":"world"}]}}"#,
    )
    .await?;
    let google = Google::new("secret", &stub.base_url)?;

    let result = google.translate(&batch(&["Hola", "mundo"]), "en").await?;
    assert_eq!(result, vec!["Hello", "world"]);

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("POST /language/translate/v2?key=secret "));
    assert_eq!(
        requests[0].json(),
        serde_json::json!({"q": ["Hola", "mundo"], "target": "en", "format": "text"})
    );
    Ok(())
}

#[tokio::test]
async fn test_google_withModel_shouldSendModelField() -> Result<()> {
    let stub = StubServer::start(200, r#"{"data":{"translations":[{"translatedText":"Hi"}]}}"#).await?;
    let google = Google::new("secret", &stub.base_url)?.with_model("nmt");

    google.translate(&batch(&["Hola"]), "en").await?;
    assert_eq!(stub.requests()[0].json()["model"], "nmt");
    Ok(())
}

#[tokio::test]
async fn test_google_withForbidden_shouldReturnAuthenticationError() -> Result<()> {
    let stub = StubServer::start(403, r#"{"error":{"code":403,"message":"API key not valid"}}"#).await?;
    let google = Google::new("wrong", &stub.base_url)?;

    match google.translate(&batch(&["Hola"]), "en").await {
        Err(ProviderError::AuthenticationError(message)) => assert_eq!(message, "API key not valid"),
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_google_withRateLimit_shouldReturnRateLimitExceeded() -> Result<()> {
    let stub = StubServer::start(429, r#"{"error":{"code":429,"message":"Quota exceeded"}}"#).await?;
    let google = Google::new("secret", &stub.base_url)?;

    let result = google.translate(&batch(&["Hola"]), "en").await;
    assert!(matches!(result, Err(ProviderError::RateLimitExceeded(_))));
    Ok(())
}

#[tokio::test]
async fn test_google_withMalformedBody_shouldReturnParseError() -> Result<()> {
    let stub = StubServer::start(200, "not json").await?;
    let google = Google::new("secret", &stub.base_url)?;

    let result = google.translate(&batch(&["Hola"]), "en").await;
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
    Ok(())
}

#[tokio::test]
async fn test_google_withUnreachableServer_shouldReturnConnectionError() -> Result<()> {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;
    drop(listener);

    let google = Google::new("s3cr3t-api-key", format!("http://{}", address))?;
    match google.translate(&batch(&["Hola"]), "en").await {
        Err(ProviderError::ConnectionError(message)) => assert!(!message.contains("s3cr3t-api-key")),
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_ollama_withMarkedResponse_shouldSplitEntries() -> Result<()> {
    let body = serde_json::json!({
        "model": "llama3",
        "response": "<<ENTRY_0>>\nHello\n<<ENTRY_1>>\nworld\n<<END>>",
        "done": true
    });
    let stub = StubServer::start(200, body.to_string()).await?;
    let ollama = Ollama::new(&stub.base_url, "llama3")?;

    let result = ollama.translate(&batch(&["Hola", "mundo"]), "en").await?;
    assert_eq!(result, vec!["Hello", "world"]);

    let request = &stub.requests()[0];
    assert!(request.request_line.starts_with("POST /api/generate "));
    let json = request.json();
    assert_eq!(json["model"], "llama3");
    assert_eq!(json["stream"], false);
    assert!(json["system"].as_str().unwrap_or_default().contains("English"));
    Ok(())
}

#[tokio::test]
async fn test_ollama_withServerError_shouldReturnApiError() -> Result<()> {
    let stub = StubServer::start(500, r#"{"error":"model not loaded"}"#).await?;
    let ollama = Ollama::new(&stub.base_url, "llama3")?;

    let result = ollama.translate(&batch(&["Hola"]), "en").await;
    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
    Ok(())
}
