use serde::Serialize;

use crate::backend::Backend;

/// The literal prefix that turns a submission into an image request.
pub const IMAGE_COMMAND: &str = "@image";

/// Which relay endpoint a send goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Gpt,
    Gemini,
    Unified,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Gpt => "/messages",
            Endpoint::Gemini => "/gemini",
            Endpoint::Unified => "/unified",
        }
    }
}

/// Request body for a send. Text sends carry no model field - endpoint
/// identity alone conveys the backend choice. The unified image
/// endpoint is shared by both backends, so there the selection rides
/// along in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Text { message: String },
    Image { message: String, model: String },
}

/// A classified send: where it goes and what travels in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub endpoint: Endpoint,
    pub payload: Payload,
}

/// Classify one submission. `None` means the input was blank and the
/// caller must leave the network, the history, and the compose buffer
/// alone. The untrimmed input is what travels in the payload; trimming
/// applies only to the emptiness check.
pub fn route(input: &str, selection: Backend) -> Option<SendRequest> {
    if input.trim().is_empty() {
        return None;
    }

    if input.starts_with(IMAGE_COMMAND) {
        return Some(SendRequest {
            endpoint: Endpoint::Unified,
            payload: Payload::Image {
                message: input.to_string(),
                model: selection.as_str().to_string(),
            },
        });
    }

    let endpoint = match selection {
        Backend::Gpt => Endpoint::Gpt,
        Backend::Gemini => Endpoint::Gemini,
    };
    Some(SendRequest {
        endpoint,
        payload: Payload::Text {
            message: input.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_routes_to_selected_backend() {
        let gpt = route("hello", Backend::Gpt).unwrap();
        assert_eq!(gpt.endpoint, Endpoint::Gpt);
        assert_eq!(
            serde_json::to_value(&gpt.payload).unwrap(),
            json!({"message": "hello"})
        );

        let gemini = route("hello", Backend::Gemini).unwrap();
        assert_eq!(gemini.endpoint, Endpoint::Gemini);
        assert_eq!(
            serde_json::to_value(&gemini.payload).unwrap(),
            json!({"message": "hello"})
        );
    }

    #[test]
    fn test_image_prefix_overrides_selection() {
        for selection in Backend::all() {
            let request = route("@image a cat", selection).unwrap();
            assert_eq!(request.endpoint, Endpoint::Unified);
            assert_eq!(
                serde_json::to_value(&request.payload).unwrap(),
                json!({"message": "@image a cat", "model": selection.as_str()})
            );
        }
    }

    #[test]
    fn test_blank_input_is_a_no_op() {
        assert!(route("", Backend::Gpt).is_none());
        assert!(route("   ", Backend::Gemini).is_none());
        assert!(route("\n\t", Backend::Gpt).is_none());
    }

    #[test]
    fn test_input_is_sent_untrimmed() {
        let request = route("  padded  ", Backend::Gpt).unwrap();
        assert_eq!(
            request.payload,
            Payload::Text {
                message: "  padded  ".to_string()
            }
        );
    }

    #[test]
    fn test_leading_whitespace_defeats_image_prefix() {
        // The prefix check is literal: " @image" is a text send.
        let request = route(" @image a cat", Backend::Gpt).unwrap();
        assert_eq!(request.endpoint, Endpoint::Gpt);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Gpt.path(), "/messages");
        assert_eq!(Endpoint::Gemini.path(), "/gemini");
        assert_eq!(Endpoint::Unified.path(), "/unified");
    }
}
