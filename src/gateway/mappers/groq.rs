// Groq wire mapping (OpenAI-compatible chat completions)

use serde_json::{json, Value};

use super::models::{ChatReply, ChatTurn};

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Fallback reply for an upstream success without usable content
const NO_RESPONSE: &str = "No response";

/// Build the chat-completions body. The normalized role vocabulary
/// matches the wire vocabulary, so roles pass through verbatim.
pub fn build_request(turns: &[ChatTurn], stream: bool) -> Value {
    let messages: Vec<Value> = turns
        .iter()
        .map(|turn| json!({ "role": turn.role, "content": turn.content }))
        .collect();

    json!({
        "model": DEFAULT_MODEL,
        "messages": messages,
        "stream": stream,
    })
}

/// Extract the reply text from a buffered response. A response without
/// a usable first choice is not an error.
pub fn extract_text(body: &Value) -> ChatReply {
    let text = body
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_RESPONSE);

    ChatReply::text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mappers::models::Role;

    fn turn(role: Role, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn builds_chat_completions_body() {
        let turns = vec![
            turn(Role::System, "be terse"),
            turn(Role::User, "hi"),
            turn(Role::Assistant, "hello"),
        ];

        let body = build_request(&turns, false);
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], false);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], serde_json::json!({ "role": "system", "content": "be terse" }));
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
    }

    #[test]
    fn stream_flag_is_carried_in_the_body() {
        let body = build_request(&[turn(Role::User, "hi")], true);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn extracts_first_choice_content() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "hello" } }]
        });
        assert_eq!(extract_text(&body), ChatReply::text("hello"));
    }

    #[test]
    fn empty_choices_yield_the_fallback_text() {
        let body = serde_json::json!({ "choices": [] });
        assert_eq!(extract_text(&body).text, "No response");
    }

    #[test]
    fn empty_content_yields_the_fallback_text() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "" } }]
        });
        assert_eq!(extract_text(&body).text, "No response");
    }

    #[test]
    fn missing_choices_field_yields_the_fallback_text() {
        assert_eq!(extract_text(&serde_json::json!({})).text, "No response");
    }

    #[test]
    fn extraction_is_never_a_blocked_outcome() {
        let reply = extract_text(&serde_json::json!({ "choices": [] }));
        assert!(!reply.blocked);
        assert!(reply.block_reason.is_none());
    }
}
