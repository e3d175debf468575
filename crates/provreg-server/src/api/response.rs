//! Uniform response envelope returned by every endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub error_message: String,
}

/// Wire envelope: `count` covers items and errors together, so a
/// failure with one error entry still reports `count = 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub items: Vec<T>,
    pub errors: Vec<ErrorEntry>,
    pub count: usize,
}

impl<T> ApiResponse<T> {
    pub fn ok(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            success: true,
            message: "OK".into(),
            items,
            errors: Vec::new(),
            count,
        }
    }

    pub fn item(item: T) -> Self {
        Self::ok(vec![item])
    }

    pub fn empty() -> Self {
        Self::ok(Vec::new())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: message.clone(),
            items: Vec::new(),
            errors: vec![ErrorEntry {
                error_message: message,
            }],
            count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ok_envelope_counts_items() {
        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2, 3])).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "OK",
                "items": [1, 2, 3],
                "errors": [],
                "count": 3
            })
        );
    }

    #[test]
    fn failure_envelope_counts_the_error() {
        let body =
            serde_json::to_value(ApiResponse::<i32>::failure("something broke")).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "something broke",
                "items": [],
                "errors": [{"errorMessage": "something broke"}],
                "count": 1
            })
        );
    }
}
