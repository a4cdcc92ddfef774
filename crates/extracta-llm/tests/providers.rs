//! Integration tests for the HTTP providers against in-process fake APIs

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use extracta_domain::{Message, Schema, Usage};
use extracta_llm::{GeminiProvider, LlmError, LlmProvider, MistralProvider, OpenAiProvider};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// What the fake API saw, and what it answers with
#[derive(Clone)]
struct FakeApi {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(HeaderMap, Option<String>, Value)>>>,
}

impl FakeApi {
    fn new(status: StatusCode, reply: Value) -> Self {
        Self {
            status,
            reply,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn last(&self) -> (HeaderMap, Option<String>, Value) {
        self.seen.lock().unwrap().last().cloned().expect("no request received")
    }

    fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

async fn chat_handler(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    api.seen.lock().unwrap().push((headers, None, body));
    (api.status, Json(api.reply.clone()))
}

async fn gemini_handler(
    State(api): State<FakeApi>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    api.seen.lock().unwrap().push((headers, Some(action), body));
    (api.status, Json(api.reply.clone()))
}

/// Serve `api` on an ephemeral port and return its base URL
async fn spawn(api: FakeApi) -> String {
    let router = Router::new()
        .route("/v1/chat/completions", post(chat_handler))
        .route("/v1beta/models/:action", post(gemini_handler))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn chat_reply(content: Value) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 21, "completion_tokens": 6, "total_tokens": 27 }
    })
}

fn person() -> Schema {
    Schema::from_value(&json!({
        "type": "object",
        "properties": { "name": { "type": "string" } },
        "required": ["name"]
    }))
    .unwrap()
}

fn conversation() -> Vec<Message> {
    vec![
        Message::system("You are an expert at extracting data from documents."),
        Message::user("John Smith signed the lease."),
    ]
}

#[tokio::test]
async fn test_openai_structured_request_and_decode() {
    let api = FakeApi::new(StatusCode::OK, chat_reply(json!("{\"name\":\"John\"}")));
    let base = spawn(api.clone()).await;
    let provider = OpenAiProvider::new("test-key", "gpt-4o").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();

    assert_eq!(parsed.data, Some(json!({ "name": "John" })));
    assert_eq!(parsed.usage, Usage::new(21, 6, 27));
    assert_eq!(parsed.schema, person().to_value());

    let (headers, _, body) = api.last();
    assert_eq!(headers["authorization"], "Bearer test-key");
    assert_eq!(body["model"], json!("gpt-4o"));
    assert_eq!(body["response_format"]["type"], json!("json_schema"));
    assert_eq!(body["response_format"]["json_schema"]["name"], json!("response"));
    assert_eq!(body["response_format"]["json_schema"]["strict"], json!(true));
    assert_eq!(body["response_format"]["json_schema"]["schema"], person().to_value());
    assert_eq!(body["messages"][0]["role"], json!("system"));
    assert_eq!(body["messages"][1]["content"], json!("John Smith signed the lease."));
}

#[tokio::test]
async fn test_openai_sentinel_usage_passes_through() {
    let api = FakeApi::new(
        StatusCode::OK,
        json!({
            "choices": [{ "message": { "content": "{\"name\":\"John\"}" } }],
            "usage": { "prompt_tokens": -1, "completion_tokens": 4, "total_tokens": -1 }
        }),
    );
    let base = spawn(api).await;
    let provider = OpenAiProvider::new("k", "gpt-4o").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();

    assert_eq!(parsed.data, Some(json!({ "name": "John" })));
    assert_eq!(parsed.usage, Usage::new(-1, 4, -1));
}

#[tokio::test]
async fn test_openai_nonconforming_reply_is_null() {
    let api = FakeApi::new(StatusCode::OK, chat_reply(json!("{\"age\":\"18\"}")));
    let base = spawn(api).await;
    let provider = OpenAiProvider::new("k", "gpt-4o-mini").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();
    assert_eq!(parsed.data, None);
}

#[tokio::test]
async fn test_openai_string_root_uses_raw_text() {
    let api = FakeApi::new(StatusCode::OK, chat_reply(json!("Hello, world!")));
    let base = spawn(api).await;
    let provider = OpenAiProvider::new("k", "gpt-4o").unwrap().with_endpoint(base);
    let schema = Schema::from_value(&json!({ "type": "string" })).unwrap();

    let parsed = provider.parse(&schema, &conversation()).await.unwrap();
    assert_eq!(parsed.data, Some(json!("Hello, world!")));
}

#[tokio::test]
async fn test_openai_refusal_is_null() {
    let api = FakeApi::new(
        StatusCode::OK,
        json!({ "choices": [{ "message": { "content": null, "refusal": "No." } }] }),
    );
    let base = spawn(api).await;
    let provider = OpenAiProvider::new("k", "gpt-4o").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();
    assert_eq!(parsed.data, None);
    assert_eq!(parsed.usage, Usage::unreported());
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (StatusCode::NOT_FOUND, "model"),
        (StatusCode::TOO_MANY_REQUESTS, "rate"),
        (StatusCode::INTERNAL_SERVER_ERROR, "communication"),
    ];

    for (status, expected) in cases {
        let api = FakeApi::new(status, json!({ "error": "boom" }));
        let base = spawn(api.clone()).await;
        let provider = OpenAiProvider::new("k", "gpt-4o").unwrap().with_endpoint(base);

        let err = provider.parse(&person(), &conversation()).await.unwrap_err();
        match (expected, &err) {
            ("model", LlmError::ModelNotAvailable(model)) => assert_eq!(model, "gpt-4o"),
            ("rate", LlmError::RateLimitExceeded) => {}
            ("communication", LlmError::Communication(message)) => {
                assert!(message.contains("500"));
                assert!(message.contains("boom"));
            }
            _ => panic!("unexpected error for {}: {:?}", status, err),
        }
        // No retries
        assert_eq!(api.count(), 1);
    }
}

#[tokio::test]
async fn test_unparseable_envelope_is_invalid_response() {
    let api = FakeApi::new(StatusCode::OK, json!({ "choices": "not a list" }));
    let base = spawn(api).await;
    let provider = OpenAiProvider::new("k", "gpt-4o").unwrap().with_endpoint(base);

    let err = provider.parse(&person(), &conversation()).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_mistral_uses_latest_alias() {
    let api = FakeApi::new(StatusCode::OK, chat_reply(json!("{\"name\":\"John\"}")));
    let base = spawn(api.clone()).await;
    let provider = MistralProvider::new("m-key", "mistral-large").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();
    assert_eq!(parsed.data, Some(json!({ "name": "John" })));
    assert_eq!(provider.model(), "mistral-large");

    let (headers, _, body) = api.last();
    assert_eq!(headers["authorization"], "Bearer m-key");
    assert_eq!(body["model"], json!("mistral-large-latest"));
}

#[tokio::test]
async fn test_mistral_chunked_content_is_null() {
    let api = FakeApi::new(
        StatusCode::OK,
        chat_reply(json!([{ "type": "text", "text": "{\"name\":\"John\"}" }])),
    );
    let base = spawn(api).await;
    let provider = MistralProvider::new("k", "pixtral-large").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();
    assert_eq!(parsed.data, None);
    assert_eq!(parsed.usage, Usage::new(21, 6, 27));
}

#[tokio::test]
async fn test_gemini_request_and_decode() {
    let api = FakeApi::new(
        StatusCode::OK,
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "{\"name\":" }, { "text": "\"John\"}" }] } }],
            "usageMetadata": { "promptTokenCount": 30, "totalTokenCount": 38 }
        }),
    );
    let base = spawn(api.clone()).await;
    let provider = GeminiProvider::new("g-key", "gemini-2.0-flash").unwrap().with_endpoint(base);

    let parsed = provider.parse(&person(), &conversation()).await.unwrap();

    assert_eq!(parsed.data, Some(json!({ "name": "John" })));
    assert_eq!(parsed.usage, Usage::new(30, -1, 38));
    assert_eq!(
        parsed.schema,
        json!({
            "type": "OBJECT",
            "properties": { "name": { "type": "STRING" } },
            "required": ["name"]
        })
    );

    let (headers, action, body) = api.last();
    assert_eq!(headers["x-goog-api-key"], "g-key");
    assert_eq!(action.as_deref(), Some("gemini-2.0-flash:generateContent"));
    assert_eq!(body["generationConfig"]["responseMimeType"], json!("application/json"));
    assert_eq!(body["generationConfig"]["responseSchema"], parsed.schema);
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        json!("You are an expert at extracting data from documents.")
    );
    assert_eq!(body["contents"][0]["role"], json!("user"));
}

#[tokio::test]
async fn test_gemini_nullable_union_compiled() {
    let api = FakeApi::new(
        StatusCode::OK,
        json!({ "candidates": [{ "content": { "parts": [{ "text": "null" }] } }] }),
    );
    let base = spawn(api).await;
    let provider = GeminiProvider::new("k", "gemini-2.0-flash-lite").unwrap().with_endpoint(base);
    let schema = Schema::from_value(&json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] })).unwrap();

    let parsed = provider.parse(&schema, &conversation()).await.unwrap();

    assert_eq!(parsed.schema, json!({ "type": "STRING", "nullable": true }));
    assert_eq!(parsed.data, Some(Value::Null));
}

#[tokio::test]
async fn test_compile_error_before_network() {
    let api = FakeApi::new(StatusCode::OK, json!({}));
    let base = spawn(api.clone()).await;
    let provider = GeminiProvider::new("k", "gemini-2.0-flash").unwrap().with_endpoint(base);
    let schema = Schema::from_value(&json!({ "type": "array" })).unwrap();

    let err = provider.parse(&schema, &conversation()).await.unwrap_err();
    assert!(matches!(err, LlmError::Compile(_)));
    assert_eq!(api.count(), 0);
}
