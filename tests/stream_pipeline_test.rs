//! End-to-end streaming pipeline tests.
//!
//! These use the in-process mock HTTP client so chunk boundaries, pacing,
//! and mid-stream failures can be controlled exactly.

use std::sync::Arc;
use std::time::Duration;

use chairside::adapters::mock::{InMemoryCredentials, MockHttpClient, MockResponse, RecordingNotifier};
use chairside::auth::AuthToken;
use chairside::chat::{ChatRequest, ChatService, ChatType, APOLOGY_MESSAGE};
use chairside::config::ClientConfig;
use chairside::error::{ChatError, ErrorCategory, StreamError};
use chairside::session::{ChatSession, MessageRole};
use chairside::traits::HttpError;
use tokio_util::sync::CancellationToken;

struct Pipeline {
    http: MockHttpClient,
    notifier: RecordingNotifier,
    service: ChatService,
}

fn pipeline(config: ClientConfig) -> Pipeline {
    let http = MockHttpClient::new();
    let notifier = RecordingNotifier::new();
    let service = ChatService::new(
        Arc::new(http.clone()),
        Arc::new(InMemoryCredentials::with_token(AuthToken::bearer("tok"))),
        Arc::new(notifier.clone()),
        config,
    );
    Pipeline {
        http,
        notifier,
        service,
    }
}

fn default_pipeline() -> Pipeline {
    pipeline(ClientConfig::default())
}

#[tokio::test]
async fn test_chunks_split_mid_event() {
    let p = default_pipeline();
    p.http.set_default_response(MockResponse::sse([
        "data: Your next",
        " check-up\r\n\r\nda",
        "ta: is due\n\ndata: in March.\n",
        "\ndata: [DONE]\n\n",
    ]));

    let mut seen = Vec::new();
    let text = p
        .service
        .send(ChatRequest::new(ChatType::Help, "When?"), |token, full| {
            seen.push((token.to_string(), full.to_string()))
        })
        .await
        .unwrap();

    assert_eq!(text, "Your next check-up is due in March.");
    assert_eq!(seen[0], ("Your next check-up".to_string(), "Your next check-up".to_string()));
    assert_eq!(seen[1].1, "Your next check-up is due");
    assert_eq!(seen.last().unwrap().0, "");
}

#[tokio::test]
async fn test_openai_deltas_keep_their_own_spacing() {
    let p = default_pipeline();
    p.http.set_default_response(MockResponse::sse([
        "data: {\"choices\":[{\"delta\":{\"content\":\"Floss\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" daily\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\".\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: never read\n\n",
    ]));

    let text = p
        .service
        .send(ChatRequest::new(ChatType::Triage, "Tips?"), |_, _| {})
        .await
        .unwrap();

    assert_eq!(text, "Floss daily.");
}

#[tokio::test]
async fn test_error_events_are_skipped() {
    let p = default_pipeline();
    p.http.set_default_response(MockResponse::sse([
        "data: Before\n\nevent: error\ndata: upstream hiccup\n\ndata: after\n\ndata: [DONE]\n\n",
    ]));

    let text = p
        .service
        .send(ChatRequest::new(ChatType::Help, "Hi"), |_, _| {})
        .await
        .unwrap();

    assert_eq!(text, "Before after");
    assert_eq!(p.notifier.count(), 0);
}

#[tokio::test]
async fn test_unterminated_final_event_is_flushed() {
    let p = default_pipeline();
    p.http
        .set_default_response(MockResponse::sse(["data: Hello\n\ndata: there"]));

    let text = p
        .service
        .send(ChatRequest::new(ChatType::Help, "Hi"), |_, _| {})
        .await
        .unwrap();

    assert_eq!(text, "Hello there");
}

#[tokio::test]
async fn test_cancel_from_callback_stops_further_tokens() {
    let p = default_pipeline();
    p.http.set_default_response(
        MockResponse::sse(["data: one\n\n", "data: two\n\n", "data: three\n\n"])
            .with_chunk_delay(Duration::from_millis(20)),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let mut calls = 0;
    let err = p
        .service
        .send(
            ChatRequest::new(ChatType::Help, "Hi").with_cancellation(cancel),
            |_, _| {
                calls += 1;
                trigger.cancel();
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, ChatError::Stream(StreamError::Aborted));
    assert_eq!(calls, 1);
    assert_eq!(p.notifier.count(), 0);
}

#[tokio::test]
async fn test_cancel_while_waiting_for_chunk() {
    let p = default_pipeline();
    p.http.set_default_response(
        MockResponse::sse(["data: late\n\n"]).with_chunk_delay(Duration::from_secs(30)),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let mut calls = 0;
    let err = p
        .service
        .send(
            ChatRequest::new(ChatType::Help, "Hi").with_cancellation(cancel),
            |_, _| calls += 1,
        )
        .await
        .unwrap_err();

    assert!(err.is_aborted());
    assert_eq!(calls, 0);
    assert_eq!(p.notifier.count(), 0);
}

#[tokio::test]
async fn test_idle_timeout_apologizes() {
    let p = pipeline(ClientConfig::default().with_idle_timeout(Duration::from_millis(50)));
    p.http.set_default_response(
        MockResponse::sse(["data: slow\n\n"]).with_chunk_delay(Duration::from_secs(5)),
    );

    let mut calls = Vec::new();
    let err = p
        .service
        .send(ChatRequest::new(ChatType::Help, "Hi"), |token, _| {
            calls.push(token.to_string())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Stream(StreamError::IdleTimeout { .. })));
    assert!(err.is_retryable());
    assert_eq!(calls, vec![APOLOGY_MESSAGE]);
    assert_eq!(p.notifier.count(), 1);
}

#[tokio::test]
async fn test_connection_lost_mid_stream() {
    let p = default_pipeline();
    p.http.set_default_response(
        MockResponse::sse(["data: Partial\n\n"])
            .then_error(HttpError::Io("connection reset by peer".to_string())),
    );

    let mut last_full = String::new();
    let err = p
        .service
        .send(ChatRequest::new(ChatType::Help, "Hi"), |_, full| {
            last_full = full.to_string()
        })
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Network);
    assert_eq!(last_full, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn test_rate_limit_error_mid_stream() {
    let p = default_pipeline();
    p.http.set_default_response(
        MockResponse::sse(["data: Hi\n\n"])
            .then_error(HttpError::Other("Rate limit exceeded for clinic".to_string())),
    );

    let mut calls = Vec::new();
    let err = p
        .service
        .send(ChatRequest::new(ChatType::Help, "Hi"), |token, _| {
            calls.push(token.to_string())
        })
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(calls.last().map(String::as_str), err.rate_limit_message().as_deref());
}

#[tokio::test]
async fn test_concurrent_requests_do_not_share_text() {
    let p = default_pipeline();
    p.http.set_response(
        "http://localhost:8080/genai/chatbot/help",
        MockResponse::sse(["data: alpha\n\n", "data: beta\n\n", "data: [DONE]\n\n"])
            .with_chunk_delay(Duration::from_millis(5)),
    );
    p.http.set_response(
        "http://localhost:8080/genai/chatbot/triage",
        MockResponse::sse(["data: one\n\n", "data: two\n\n", "data: [DONE]\n\n"])
            .with_chunk_delay(Duration::from_millis(5)),
    );

    let help = p
        .service
        .send(ChatRequest::new(ChatType::Help, "a"), |_, _| {});
    let triage = p
        .service
        .send(ChatRequest::new(ChatType::Triage, "b"), |_, _| {});
    let (help, triage) = tokio::join!(help, triage);

    assert_eq!(help.unwrap(), "alpha beta");
    assert_eq!(triage.unwrap(), "one two");
    assert_eq!(p.http.request_count(), 2);
}

#[tokio::test]
async fn test_session_transcript_with_reasoning() {
    let p = default_pipeline();
    p.http.set_default_response(MockResponse::sse([
        "data: <think>Patient mentions swelling</think>\n\n",
        "data: Please\n\ndata: call the clinic today.\n\ndata: [DONE]\n\n",
    ]));

    let mut session = ChatSession::new(ChatType::Aidentist);
    let mut thinking_seen = false;
    session_send(&p, &mut session, "My jaw is swollen", &mut thinking_seen).await;

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content, "Please call the clinic today.");
    assert_eq!(messages[1].reasoning_content, "Patient mentions swelling");
    assert!(thinking_seen);

    let request = &p.http.get_requests()[0];
    assert_eq!(
        request.header("x-session-id"),
        Some(session.id().to_string().as_str())
    );
}

async fn session_send(
    p: &Pipeline,
    session: &mut ChatSession,
    message: &str,
    thinking_seen: &mut bool,
) {
    p.service
        .send_in_session(session, message, CancellationToken::new(), |_, full| {
            if full.trim_end().ends_with("</think>") {
                *thinking_seen = true;
            }
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_session_id_is_stable_across_messages() {
    let p = default_pipeline();
    p.http
        .set_default_response(MockResponse::sse(["data: ok\n\ndata: [DONE]\n\n"]));

    let mut session = ChatSession::new(ChatType::Aidentist);
    let mut unused = false;
    session_send(&p, &mut session, "first", &mut unused).await;
    session_send(&p, &mut session, "second", &mut unused).await;

    let requests = p.http.get_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("x-session-id"), requests[1].header("x-session-id"));
    assert_eq!(session.messages().len(), 4);
}
