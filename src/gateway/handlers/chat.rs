// Chat gateway handler

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::mappers::{gemini, groq, ChatRequest, Provider};
use crate::gateway::server::AppState;
use crate::gateway::streaming::relay_stream;

/// Buffered mode: the full upstream response is awaited before replying.
pub async fn handle_chat(State(state): State<AppState>, body: String) -> GatewayResult<Response> {
    dispatch(state, &body, false).await
}

/// Streamed mode: upstream bytes are forwarded as they arrive.
pub async fn handle_chat_stream(
    State(state): State<AppState>,
    body: String,
) -> GatewayResult<Response> {
    dispatch(state, &body, true).await
}

async fn dispatch(state: AppState, raw_body: &str, stream: bool) -> GatewayResult<Response> {
    let body: Value = serde_json::from_str(raw_body)
        .map_err(|_| GatewayError::InvalidRequest("Invalid JSON body".to_string()))?;
    let request = ChatRequest::from_value(&body, stream)?;

    let request_id = Uuid::new_v4();
    info!(
        "[{}] Chat request: provider={} turns={} stream={}",
        request_id,
        request.provider.name(),
        request.turns.len(),
        request.stream
    );

    // Credential resolution must precede any network activity
    let api_key = state.config.credential(request.provider)?;

    let (url, bearer_token, upstream_body) = match request.provider {
        Provider::Groq => (
            state.config.groq_endpoint.clone(),
            Some(api_key),
            groq::build_request(&request.turns, stream),
        ),
        Provider::Gemini => (
            gemini::endpoint(&state.config.gemini_endpoint, api_key, stream),
            None,
            gemini::build_request(&request.turns),
        ),
    };

    let response = state
        .upstream
        .post_json(&url, bearer_token, &upstream_body)
        .await?;

    let status = response.status();
    if !status.is_success() {
        let details = response.text().await.unwrap_or_default();
        return Err(GatewayError::Upstream { status, details });
    }

    if stream {
        return Ok(Response::builder()
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::CONNECTION, "keep-alive")
            .body(Body::from_stream(relay_stream(response.bytes_stream())))
            .unwrap());
    }

    let payload: Value = response.json().await.map_err(|e| {
        GatewayError::Internal(format!("Failed to parse upstream response: {}", e))
    })?;

    let reply = match request.provider {
        Provider::Groq => groq::extract_text(&payload),
        Provider::Gemini => gemini::extract_text(&payload),
    };

    if reply.blocked {
        warn!(
            "[{}] Upstream blocked content: {}",
            request_id,
            reply.block_reason.as_deref().unwrap_or("Unknown")
        );
    }

    Ok(Json(json!({ "response": reply.text })).into_response())
}
