use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use article_prompt::config::{ChunkingConfig, CompletionConfig, FetchConfig};
use article_prompt::document::ArticleFetcher;
use article_prompt::models::{CannedPrompt, PromptSpec};
use article_prompt::services::{
    ChunkPipeline, CompletionProvider, CompletionRequest, LlmService, CHUNK_DELIMITER,
};
use article_prompt::ui::{present_result, Presenter, SpinnerKind};
use article_prompt::utils::AppError;

/// Answers chunk `n` after `(total - n) * step`, so later chunks finish first
struct LatencyProvider {
    total: u64,
    step: Duration,
    arrivals: Mutex<Vec<u64>>,
    combined_prompt: Mutex<Option<String>>,
}

impl LatencyProvider {
    fn new(total: u64) -> Self {
        Self {
            total,
            step: Duration::from_millis(25),
            arrivals: Mutex::new(Vec::new()),
            combined_prompt: Mutex::new(None),
        }
    }
}

fn sentence_number(prompt: &str) -> Option<u64> {
    let rest = prompt.split("###Sentence ").nth(1)?;
    rest.split('.').next()?.parse().ok()
}

#[async_trait]
impl CompletionProvider for LatencyProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        match sentence_number(&request.prompt) {
            Some(n) => {
                tokio::time::sleep(self.step * (self.total - n) as u32).await;
                self.arrivals.lock().push(n);
                Ok(format!("answer {}", n))
            }
            None => {
                *self.combined_prompt.lock() = Some(request.prompt);
                Ok("combined".to_string())
            }
        }
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl Presenter for EventLog {
    fn info(&self, message: &str) {
        self.push(format!("info: {}", message));
    }
    fn warn(&self, message: &str) {
        self.push(format!("warn: {}", message));
    }
    fn success(&self, message: &str) {
        self.push(format!("success: {}", message));
    }
    fn error(&self, message: &str) {
        self.push(format!("error: {}", message));
    }
    fn log(&self, message: &str) {
        self.push(format!("log: {}", message));
    }
    fn begin_stage(&self, label: &str, _kind: SpinnerKind, total: usize) {
        self.push(format!("begin: {} ({})", label, total));
    }
    fn advance_stage(&self) {}
    fn finish_stage(&self) {
        self.push("finish".to_string());
    }
}

fn summarize() -> PromptSpec {
    CannedPrompt::by_choice(1).map(CannedPrompt::to_spec).unwrap()
}

#[tokio::test]
async fn test_results_keep_document_order_despite_arrival_order() {
    let content: String = (0..5).map(|i| format!("Sentence {}. ", i)).collect();
    let provider = Arc::new(LatencyProvider::new(5));
    let presenter = Arc::new(EventLog::default());

    // 3 tokens = 12 chars, one "Sentence n. " per chunk
    let chunking = ChunkingConfig {
        max_chunk_tokens: 3,
        max_chunks: 40,
    };
    let pipeline = ChunkPipeline::new(provider.clone(), presenter.clone(), &chunking);

    assert_eq!(pipeline.plan(&content).chunks.len(), 5);

    let answer = pipeline.run(&content, &summarize()).await.unwrap();
    assert_eq!(answer, "combined");

    // the slowest chunk is the first one
    assert_eq!(provider.arrivals.lock().first(), Some(&4));

    let expected_joined = (0..5)
        .map(|i| format!("answer {}", i))
        .collect::<Vec<_>>()
        .join(CHUNK_DELIMITER);
    let combined_prompt = provider.combined_prompt.lock().clone().unwrap();
    assert_eq!(
        combined_prompt,
        format!(
            "Combine these summaries into an overall summary:\n\n###{}\n\n###",
            expected_joined
        )
    );

    let events = presenter.events();
    assert_eq!(events[0], "begin: Generating response... (5)");
    assert!(events.contains(&format!("log: {}", expected_joined)));
    assert!(events.contains(&"begin: Combining responses... (0)".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("finish"));
}

#[tokio::test]
async fn test_fetch_chunk_and_combine_against_http_services() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Three Sentences</title></head>
               <body><nav>Home</nav><article><p>A. B.</p>
               <p>C.</p></article></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_string_contains("Summarize this:"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "choices": [{ "text": "part" }] })),
        )
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_string_contains("Combine these summaries"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "text": "\n\nall three" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ArticleFetcher::new(&FetchConfig::default()).unwrap();
    let article = fetcher
        .fetch(&format!("{}/post", server.uri()))
        .await
        .unwrap();
    assert_eq!(article.title, "Three Sentences");
    assert_eq!(article.text_content, "A. B. C.");

    let llm = Arc::new(
        LlmService::new(CompletionConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            model: "gpt-3.5-turbo-instruct".to_string(),
            temperature: 0.1,
            max_tokens: 500,
            timeout_seconds: 5,
        })
        .unwrap(),
    );
    let presenter = Arc::new(EventLog::default());
    let chunking = ChunkingConfig {
        max_chunk_tokens: 1,
        max_chunks: 40,
    };

    let answer = ChunkPipeline::new(llm, presenter.clone(), &chunking)
        .run(&article.text_content, &summarize())
        .await
        .unwrap();
    assert_eq!(answer, "\n\nall three");

    present_result(presenter.as_ref(), &article.title, &answer);
    let events = presenter.events();
    assert!(events.contains(&"success: Response for \"Three Sentences\" ⤵️ ".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("log: \n\nall three"));
}

#[tokio::test]
async fn test_upstream_failure_surfaces_chunk_index() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("###B."))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "choices": [{ "text": "ok" }] })),
        )
        .mount(&server)
        .await;

    let llm = Arc::new(
        LlmService::new(CompletionConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            model: "gpt-3.5-turbo-instruct".to_string(),
            temperature: 0.1,
            max_tokens: 500,
            timeout_seconds: 5,
        })
        .unwrap(),
    );
    let chunking = ChunkingConfig {
        max_chunk_tokens: 1,
        max_chunks: 40,
    };

    let err = ChunkPipeline::new(llm, Arc::new(EventLog::default()), &chunking)
        .run("A. B. C.", &summarize())
        .await
        .unwrap_err();

    match err {
        AppError::ChunkCompletionFailed { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(*source, AppError::Upstream { status: Some(429), .. }));
        }
        other => panic!("Expected ChunkCompletionFailed, got {:?}", other),
    }
}
