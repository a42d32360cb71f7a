use nightschool_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming chat message.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/chat-request.ts"
)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Parses a raw request body, requiring a JSON object with a string `message`.
    pub fn from_json_body(body: &[u8]) -> AppResult<Self> {
        let value = serde_json::from_slice::<Value>(body)
            .map_err(|error| AppError::Validation(format!("request body is not JSON: {error}")))?;

        if !value.is_object() {
            return Err(AppError::Validation(
                "request body must be a JSON object".to_owned(),
            ));
        }

        serde_json::from_value::<Self>(value)
            .map_err(|error| AppError::Validation(format!("message must be a string: {error}")))
    }
}

/// Generated assistant reply.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/chat-response.ts"
)]
pub struct ChatResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::ChatRequest;

    #[test]
    fn parses_string_message() {
        let request = ChatRequest::from_json_body(br#"{"message":"What is a specific object?"}"#);
        assert_eq!(
            request.ok().map(|request| request.message).as_deref(),
            Some("What is a specific object?")
        );
    }

    #[test]
    fn rejects_missing_or_non_string_message() {
        let bodies: [&[u8]; 6] = [
            br#"{}"#,
            br#"{"message":null}"#,
            br#"{"message":42}"#,
            br#"{"message":["a"]}"#,
            br#"["message"]"#,
            b"not json",
        ];

        for body in bodies {
            assert!(ChatRequest::from_json_body(body).is_err());
        }
    }
}
