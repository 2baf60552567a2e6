// Gemini wire mapping

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::models::{ChatReply, ChatTurn, Role};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Fixed content-filtering thresholds, attached to every request
static SAFETY_SETTINGS: Lazy<Value> = Lazy::new(|| {
    json!([
        { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
        { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
        { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
        { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" }
    ])
});

/// Build the request URL. Streaming uses a distinct upstream method;
/// the credential travels as a query parameter, not a header.
pub fn endpoint(base: &str, api_key: &str, stream: bool) -> String {
    let method = if stream {
        "streamGenerateContent"
    } else {
        "generateContent"
    };
    format!(
        "{}/models/{}:{}?key={}",
        base.trim_end_matches('/'),
        DEFAULT_MODEL,
        method,
        api_key
    )
}

/// Build the generateContent body. System turns become the single
/// system instruction (last one wins) and are excluded from `contents`;
/// assistant turns take the `model` role, everything else `user`.
pub fn build_request(turns: &[ChatTurn]) -> Value {
    let mut system_instruction: Option<&str> = None;
    let mut contents = Vec::new();

    for turn in turns {
        match turn.role {
            Role::System => system_instruction = Some(&turn.content),
            role => contents.push(json!({
                "role": if role == Role::Assistant { "model" } else { "user" },
                "parts": [{ "text": turn.content }],
            })),
        }
    }

    let mut body = json!({
        "contents": contents,
        "safetySettings": SAFETY_SETTINGS.clone(),
        "generationConfig": {
            "temperature": 0.7,
            "topK": 1,
            "topP": 1,
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
        },
    });

    // Omitted entirely when no system turn was present
    if let Some(text) = system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": text }] });
    }

    body
}

/// Extract the reply text from a buffered response. A filtered response
/// (no candidates) is a content outcome, not a failure: the reply
/// carries an explanatory message embedding the upstream block reason.
pub fn extract_text(body: &Value) -> ChatReply {
    let parts = body
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array());

    if let Some(parts) = parts {
        let text = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        return ChatReply::text(text);
    }

    let reason = body
        .get("promptFeedback")
        .and_then(|feedback| feedback.get("blockReason"))
        .and_then(|reason| reason.as_str())
        .unwrap_or("Unknown")
        .to_string();

    ChatReply {
        text: format!("I am unable to provide a response. Reason: {}", reason),
        blocked: true,
        block_reason: Some(reason),
    }
}
