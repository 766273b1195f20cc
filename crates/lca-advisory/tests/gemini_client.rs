//! GeminiClient against a local fake `generateContent` endpoint

use lca_advisory::{
    AdvisoryError, AdvisoryRequest, Advisor, GeminiClient, GenerationSettings, TextGenerator,
    TipsRequest,
};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;

/// Serve `reply` for every generateContent call, returning the base URL
fn spawn_fake(status: StatusCode, reply: serde_json::Value) -> String {
    let route = warp::post()
        .and(warp::path!("v1beta" / "models" / String))
        .and(warp::query::<std::collections::HashMap<String, String>>())
        .and(warp::body::json::<serde_json::Value>())
        .map(move |model: String, query: std::collections::HashMap<String, String>, body: serde_json::Value| {
            let well_formed = model.ends_with(":generateContent")
                && query.get("key").map(String::as_str) == Some("test-key")
                && body["contents"][0]["parts"][0]["text"].is_string()
                && body["generationConfig"]["maxOutputTokens"].is_u64();
            if well_formed {
                warp::reply::with_status(warp::reply::json(&reply), status)
            } else {
                warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({"error": "bad request shape"})),
                    StatusCode::BAD_REQUEST,
                )
            }
        });

    let (addr, server): (SocketAddr, _) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{addr}")
}

fn text_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

fn client(base: &str) -> GeminiClient {
    GeminiClient::new(base, Some("test-key".to_string()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn generates_text_from_candidates() {
    let base = spawn_fake(StatusCode::OK, text_reply("Environmental Assessment: solid."));
    let text = client(&base)
        .generate("prompt", &GenerationSettings::insights("gemini-2.0-flash"))
        .await
        .unwrap();
    assert_eq!(text, "Environmental Assessment: solid.");
}

#[tokio::test]
async fn upstream_status_is_reported() {
    let base = spawn_fake(
        StatusCode::SERVICE_UNAVAILABLE,
        serde_json::json!({"error": {"message": "overloaded"}}),
    );
    let err = client(&base)
        .generate("prompt", &GenerationSettings::tips("gemini-1.5-flash"))
        .await
        .unwrap_err();
    match err {
        AdvisoryError::Upstream { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_candidates_is_malformed() {
    let base = spawn_fake(StatusCode::OK, serde_json::json!({"candidates": []}));
    let err = client(&base)
        .generate("prompt", &GenerationSettings::tips("gemini-1.5-flash"))
        .await
        .unwrap_err();
    assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let client = GeminiClient::new(
        "http://127.0.0.1:1",
        Some("test-key".to_string()),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = client
        .generate("prompt", &GenerationSettings::tips("m"))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_ne!(err, AdvisoryError::MissingCredential);
}

#[tokio::test]
async fn advisor_end_to_end() {
    let base = spawn_fake(
        StatusCode::OK,
        text_reply("1. Raise scrap share\n2. Contract wind power\n3. Move freight to rail"),
    );
    let advisor = Advisor::new(Arc::new(client(&base)));

    let tips = advisor
        .quick_tips(&TipsRequest {
            project_data: lca_test_utils::sample_input(),
        })
        .await
        .unwrap();
    assert_eq!(tips.tips().len(), 3);

    let insights = advisor
        .insights(&AdvisoryRequest::from_result(&lca_test_utils::sample_result(3)))
        .await
        .unwrap();
    assert!(insights.text.starts_with("1. Raise scrap share"));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let route = warp::post().then(|| async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        warp::reply::json(&text_reply("too late"))
    });
    let (addr, server): (SocketAddr, _) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let client = GeminiClient::new(
        format!("http://{addr}"),
        Some("test-key".to_string()),
        Duration::from_millis(200),
    )
    .unwrap();
    let err = client
        .generate("prompt", &GenerationSettings::tips("gemini-1.5-flash"))
        .await
        .unwrap_err();
    assert_eq!(err, AdvisoryError::Timeout);
    assert!(err.is_retryable());
}
