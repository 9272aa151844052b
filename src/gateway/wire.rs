//! Wire format of the chat-completions endpoint.
//!
//! The response side is the part that deserves care: providers return
//! `message.content` either as a plain string or as an array of typed
//! parts, depending on model and gateway. The shapes are modelled as an
//! untagged union and normalized by [`first_text`] — never assume a single
//! shape. Error bodies are just as inconsistent (`{error:{message}}` vs
//! `{message}`), so [`error_message`] tries both before falling back to the
//! raw body.

use super::Message;
use serde::{Deserialize, Serialize};

// ── Request body ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub(crate) fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

// ── Response body ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

/// String-or-parts union on the response side.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResponseContent {
    Text(String),
    Parts(Vec<ResponsePart>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Extract the first text content from a response, whatever its shape.
///
/// Returns `None` when there is no choice, no content, or no text-typed
/// part — callers treat that the same as an empty body.
pub(crate) fn first_text(response: ChatResponse) -> Option<String> {
    let content = response.choices.into_iter().next()?.message.content?;
    match content {
        ResponseContent::Text(text) => Some(text),
        ResponseContent::Parts(parts) => parts
            .into_iter()
            .find(|part| part.kind == "text")
            .and_then(|part| part.text),
    }
}

// ── Error bodies ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull a human-readable message out of an error response body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(detail) = parsed.error {
            return detail.message;
        }
        if let Some(message) = parsed.message {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn string_content_is_extracted() {
        let r = parse(r#"{"choices":[{"message":{"content":"hello"}}]}"#);
        assert_eq!(first_text(r), Some("hello".to_string()));
    }

    #[test]
    fn parts_content_takes_first_text_part() {
        let r = parse(
            r#"{"choices":[{"message":{"content":[
                {"type":"thinking"},
                {"type":"text","text":"the answer"},
                {"type":"text","text":"ignored"}
            ]}}]}"#,
        );
        assert_eq!(first_text(r), Some("the answer".to_string()));
    }

    #[test]
    fn missing_content_yields_none() {
        assert_eq!(first_text(parse(r#"{"choices":[{"message":{}}]}"#)), None);
        assert_eq!(first_text(parse(r#"{"choices":[]}"#)), None);
        assert_eq!(first_text(parse(r#"{}"#)), None);
    }

    #[test]
    fn error_message_handles_both_shapes() {
        assert_eq!(
            error_message(r#"{"error":{"message":"bad key"}}"#),
            "bad key"
        );
        assert_eq!(error_message(r#"{"message":"over quota"}"#), "over quota");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "no response body");
    }

    #[test]
    fn request_body_shape() {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let body = ChatRequest {
            model: "gpt-4.1-nano",
            messages: &messages,
            stream: false,
            temperature: 0.2,
            max_tokens: Some(4096),
            response_format: Some(ResponseFormat::json_object()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4.1-nano");
        assert_eq!(json["stream"], false);
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn request_body_omits_unset_options() {
        let messages = vec![Message::user("hi")];
        let body = ChatRequest {
            model: "m",
            messages: &messages,
            stream: false,
            temperature: 0.0,
            max_tokens: None,
            response_format: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("response_format").is_none());
    }
}
