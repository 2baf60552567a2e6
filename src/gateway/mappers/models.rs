// Normalized chat data models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};

/// Upstream chat-completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    Gemini,
}

impl Provider {
    /// Parse the wire selector. "grok" is the legacy spelling some
    /// clients still send for the Groq provider.
    pub fn parse(selector: &str) -> Option<Self> {
        match selector {
            "groq" | "grok" => Some(Provider::Groq),
            "gemini" => Some(Provider::Gemini),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::Gemini => "gemini",
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Boundary shape of a single turn. Clients send either the current
/// `{role, content}` form or the legacy `{sender, text}` form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTurn {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl RawTurn {
    /// Normalize to a ChatTurn. An explicit role wins; otherwise the
    /// legacy `sender == "ai"` marker maps to assistant, anything else
    /// to user. `content` wins over the legacy `text` field. Empty
    /// system turns collapse to None; empty user/assistant content is
    /// passed through as empty text.
    pub fn normalize(&self) -> Option<ChatTurn> {
        let role = match self.role.as_deref() {
            Some("system") => Role::System,
            Some("assistant") => Role::Assistant,
            Some(_) => Role::User,
            None => {
                if self.sender.as_deref() == Some("ai") {
                    Role::Assistant
                } else {
                    Role::User
                }
            }
        };

        let content = self
            .content
            .clone()
            .or_else(|| self.text.clone())
            .unwrap_or_default();

        if role == Role::System && content.is_empty() {
            return None;
        }

        Some(ChatTurn { role, content })
    }
}

/// Normalized gateway input
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub provider: Provider,
    pub turns: Vec<ChatTurn>,
    pub stream: bool,
}

impl ChatRequest {
    /// Validate and normalize a raw JSON body. The history may arrive
    /// under `history` or `messages`; the first present and array-typed
    /// key wins.
    pub fn from_value(body: &Value, stream: bool) -> GatewayResult<Self> {
        let selector = body.get("ai").and_then(|v| v.as_str()).ok_or_else(|| {
            GatewayError::InvalidRequest("Missing 'ai' field (groq or gemini)".to_string())
        })?;

        let provider = Provider::parse(selector)
            .ok_or_else(|| GatewayError::InvalidRequest("Unknown AI selected".to_string()))?;

        let history = [body.get("history"), body.get("messages")]
            .into_iter()
            .flatten()
            .find(|v| v.is_array())
            .ok_or_else(|| {
                GatewayError::InvalidRequest("Invalid chat history provided".to_string())
            })?;

        let raw_turns: Vec<RawTurn> = serde_json::from_value(history.clone()).map_err(|_| {
            GatewayError::InvalidRequest("Invalid chat history provided".to_string())
        })?;

        let turns: Vec<ChatTurn> = raw_turns.iter().filter_map(RawTurn::normalize).collect();
        if turns.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "Invalid chat history provided".to_string(),
            ));
        }

        Ok(Self {
            provider,
            turns,
            stream,
        })
    }
}

/// Normalized buffered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub blocked: bool,
    pub block_reason: Option<String>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocked: false,
            block_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_providers_and_legacy_spelling() {
        assert_eq!(Provider::parse("groq"), Some(Provider::Groq));
        assert_eq!(Provider::parse("grok"), Some(Provider::Groq));
        assert_eq!(Provider::parse("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::parse("claude"), None);
        assert_eq!(Provider::parse(""), None);
    }

    #[test]
    fn normalization_is_idempotent_on_normalized_turns() {
        let raw = RawTurn {
            role: Some("assistant".to_string()),
            content: Some("already normalized".to_string()),
            ..RawTurn::default()
        };
        let first = raw.normalize().unwrap();

        let again = RawTurn {
            role: Some("assistant".to_string()),
            content: Some(first.content.clone()),
            ..RawTurn::default()
        };
        assert_eq!(again.normalize().unwrap(), first);
    }

    #[test]
    fn legacy_sender_marker_maps_to_assistant() {
        let raw = RawTurn {
            sender: Some("ai".to_string()),
            text: Some("hi there".to_string()),
            ..RawTurn::default()
        };
        let turn = raw.normalize().unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "hi there");

        let raw = RawTurn {
            sender: Some("human".to_string()),
            text: Some("hello".to_string()),
            ..RawTurn::default()
        };
        assert_eq!(raw.normalize().unwrap().role, Role::User);
    }

    #[test]
    fn explicit_role_wins_over_sender() {
        let raw = RawTurn {
            role: Some("system".to_string()),
            sender: Some("ai".to_string()),
            content: Some("be terse".to_string()),
            ..RawTurn::default()
        };
        assert_eq!(raw.normalize().unwrap().role, Role::System);
    }

    #[test]
    fn content_wins_over_legacy_text() {
        let raw = RawTurn {
            role: Some("user".to_string()),
            content: Some("current".to_string()),
            text: Some("legacy".to_string()),
            ..RawTurn::default()
        };
        assert_eq!(raw.normalize().unwrap().content, "current");
    }

    #[test]
    fn empty_system_turn_is_dropped() {
        let raw = RawTurn {
            role: Some("system".to_string()),
            ..RawTurn::default()
        };
        assert!(raw.normalize().is_none());
    }

    #[test]
    fn empty_user_turn_passes_through_as_empty_text() {
        let raw = RawTurn {
            role: Some("user".to_string()),
            ..RawTurn::default()
        };
        let turn = raw.normalize().unwrap();
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "");
    }

    #[test]
    fn unknown_role_defaults_to_user() {
        let raw = RawTurn {
            role: Some("tool".to_string()),
            content: Some("output".to_string()),
            ..RawTurn::default()
        };
        assert_eq!(raw.normalize().unwrap().role, Role::User);
    }

    #[test]
    fn missing_provider_selector_is_rejected() {
        let body = json!({ "history": [{ "role": "user", "content": "hi" }] });
        let err = ChatRequest::from_value(&body, false).unwrap_err();
        assert!(err.to_string().contains("Missing 'ai' field"));
    }

    #[test]
    fn unknown_provider_selector_is_rejected() {
        let body = json!({ "ai": "claude", "history": [{ "role": "user", "content": "hi" }] });
        let err = ChatRequest::from_value(&body, false).unwrap_err();
        assert_eq!(err.to_string(), "Unknown AI selected");
    }

    #[test]
    fn messages_key_is_accepted_when_history_is_absent() {
        let body = json!({ "ai": "groq", "messages": [{ "role": "user", "content": "hi" }] });
        let request = ChatRequest::from_value(&body, false).unwrap();
        assert_eq!(request.turns.len(), 1);
    }

    #[test]
    fn first_array_typed_history_key_wins() {
        let body = json!({
            "ai": "groq",
            "history": "not an array",
            "messages": [{ "role": "user", "content": "hi" }]
        });
        let request = ChatRequest::from_value(&body, false).unwrap();
        assert_eq!(request.turns[0].content, "hi");
    }

    #[test]
    fn non_array_history_is_rejected() {
        let body = json!({ "ai": "groq", "history": "nope" });
        let err = ChatRequest::from_value(&body, false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid chat history provided");
    }

    #[test]
    fn empty_history_is_rejected() {
        let body = json!({ "ai": "groq", "history": [] });
        assert!(ChatRequest::from_value(&body, false).is_err());
    }

    #[test]
    fn history_of_only_empty_system_turns_is_rejected() {
        let body = json!({ "ai": "gemini", "history": [{ "role": "system" }] });
        assert!(ChatRequest::from_value(&body, true).is_err());
    }
}
