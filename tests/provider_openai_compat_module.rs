use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use taskrails::config::ModelSettings;
use taskrails::context::{ContextLimits, ContextStore};
use taskrails::conversation::{
    CompletionOptions, ConversationEngine, ConversationHistory, StreamedResponse, TurnFragment,
};
use taskrails::flow::FlowGraphReader;
use taskrails::prompt::PromptComposer;
use taskrails::provider::{
    ChatMessage, ChatRequest, CompletionClient, OpenAiCompatClient, ProviderError,
};
use tempfile::tempdir;

struct CapturedRequest {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

fn spawn_stub_server(
    status_line: &str,
    content_type: &str,
    response_body: String,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let status_line = status_line.to_string();
    let content_type = content_type.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");

        let mut headers = Vec::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
            let header = line.trim_end().to_string();
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("content length");
                }
            }
            headers.push(header);
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");
        tx.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).expect("utf8 body"),
        })
        .expect("send captured request");

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n{response_body}"
        );
        stream
            .write_all(response.as_bytes())
            .expect("write response");
        stream.flush().expect("flush response");
    });

    (format!("http://{addr}/v1"), rx)
}

fn settings_for(endpoint: &str) -> ModelSettings {
    ModelSettings {
        endpoint: endpoint.to_string(),
        api_key: "secret-key".to_string(),
        ..ModelSettings::default()
    }
}

fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::from(": keep-alive\n\n");
    for delta in deltas {
        let chunk = serde_json::json!({"choices": [{"delta": {"content": delta}}]});
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

fn request() -> ChatRequest {
    ChatRequest {
        model: "qwen2.5-coder-7b-instruct".to_string(),
        messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
        temperature: 0.7,
        stream: true,
    }
}

#[test]
fn streamed_deltas_arrive_in_order_and_stop_at_done() {
    let mut body = sse_body(&["Hel", "lo", "", " world"]);
    body.push_str("data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n");
    let (endpoint, requests) = spawn_stub_server("200 OK", "text/event-stream", body);

    let client = OpenAiCompatClient::new(&settings_for(&endpoint)).expect("client");
    let deltas = client
        .stream_chat(&request())
        .expect("stream")
        .collect::<Result<Vec<_>, _>>()
        .expect("deltas");
    assert_eq!(deltas, vec!["Hel", "lo", " world"]);

    let captured = requests.recv().expect("captured request");
    assert_eq!(captured.request_line, "POST /v1/chat/completions HTTP/1.1");
    assert!(captured
        .headers
        .iter()
        .any(|h| h.eq_ignore_ascii_case("authorization: Bearer secret-key")));
    let payload: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(payload["stream"], true);
    assert_eq!(payload["model"], "qwen2.5-coder-7b-instruct");
    assert_eq!(payload["messages"][0]["role"], "system");
    assert_eq!(payload["messages"][1]["content"], "hi");
}

#[test]
fn non_success_status_is_reported_with_body() {
    let (endpoint, _requests) = spawn_stub_server(
        "500 Internal Server Error",
        "application/json",
        "{\"error\":\"model not loaded\"}".to_string(),
    );
    let client = OpenAiCompatClient::new(&settings_for(&endpoint)).expect("client");

    match client.stream_chat(&request()) {
        Err(ProviderError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("model not loaded"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a status error"),
    }
}

#[test]
fn engine_turns_failed_status_into_single_failed_fragment() {
    let (endpoint, _requests) = spawn_stub_server(
        "503 Service Unavailable",
        "text/plain",
        "busy".to_string(),
    );
    let dir = tempdir().expect("tempdir");
    let client = OpenAiCompatClient::new(&settings_for(&endpoint)).expect("client");
    let engine = ConversationEngine::new(
        FlowGraphReader::new(dir.path().join("project_flow.mmd")),
        PromptComposer::new(ContextStore::new(dir.path(), ContextLimits::default()))
            .expect("composer"),
        Arc::new(client),
        CompletionOptions::from(&ModelSettings::default()),
    );

    let fragments = engine
        .submit_turn("hello", &ConversationHistory::new())
        .collect::<Vec<_>>();
    assert_eq!(fragments.len(), 1);
    match &fragments[0] {
        TurnFragment::Failed(message) => assert!(message.contains("503")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn engine_concatenates_streamed_turn() {
    let (endpoint, requests) = spawn_stub_server(
        "200 OK",
        "text/event-stream",
        sse_body(&["Which ", "database?"]),
    );
    let dir = tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("project_flow.mmd"),
        "db[\"Pick storage\"]:::active\n",
    )
    .expect("diagram");
    let client = OpenAiCompatClient::new(&settings_for(&endpoint)).expect("client");
    let engine = ConversationEngine::new(
        FlowGraphReader::new(dir.path().join("project_flow.mmd")),
        PromptComposer::new(ContextStore::new(dir.path(), ContextLimits::default()))
            .expect("composer"),
        Arc::new(client),
        CompletionOptions::from(&ModelSettings::default()),
    );

    let response: StreamedResponse = engine
        .submit_turn("store users", &ConversationHistory::new())
        .collect();
    assert_eq!(response.text, "Which database?");
    assert!(!response.is_failed());

    let captured = requests.recv().expect("captured request");
    let payload: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    let system = payload["messages"][0]["content"]
        .as_str()
        .expect("system prompt");
    assert!(system.contains("Pick storage"));
}

#[test]
fn connection_check_lists_served_models() {
    let (endpoint, requests) = spawn_stub_server(
        "200 OK",
        "application/json",
        "{\"object\":\"list\",\"data\":[{\"id\":\"qwen2.5-coder-7b-instruct\"},{\"id\":\"llama\"}]}"
            .to_string(),
    );
    let client = OpenAiCompatClient::new(&settings_for(&endpoint)).expect("client");
    let models = client.check_connection().expect("models");
    assert_eq!(models, vec!["qwen2.5-coder-7b-instruct", "llama"]);
    let captured = requests.recv().expect("captured request");
    assert_eq!(captured.request_line, "GET /v1/models HTTP/1.1");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = OpenAiCompatClient::new(&settings_for(&format!("http://{addr}/v1"))).expect("client");
    assert!(matches!(
        client.stream_chat(&request()),
        Err(ProviderError::Transport(_))
    ));
}
