// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # OpenStack API error
//!
//! Non-success responses of the OpenStack APIs carry the HTTP status code and
//! a JSON body similar to `{"error": {"code": 401, "message": "...", "title":
//! "Unauthorized"}}`. The body shape differs between the services, therefore
//! all `message` and `type` values found anywhere in the document are
//! collected.
use serde_json::Value;
use std::fmt;

/// Error returned by an OpenStack API.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub code: u16,
    /// Messages extracted from the response body.
    pub messages: Vec<String>,
}

impl ApiError {
    /// Build the error from the status code and the raw response body.
    pub fn from_body<S: AsRef<str>>(code: u16, body: S) -> Self {
        let body = body.as_ref();
        let messages = match serde_json::from_str::<Value>(body) {
            Ok(data) => read_error_messages(&data),
            Err(_) if body.is_empty() => Vec::new(),
            Err(_) => vec![body.to_string()],
        };
        Self { code, messages }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            write!(f, "request failed with status {}", self.code)
        } else {
            write!(f, "{}", self.messages.join(", "))
        }
    }
}

impl std::error::Error for ApiError {}

/// Collect the `message` and `type` values of the document.
///
/// Nested objects are searched recursively, arrays only when their items are
/// objects. A document that is not an object yields its own string form.
fn read_error_messages(data: &Value) -> Vec<String> {
    let mut messages = Vec::new();
    match data {
        Value::Object(_) => collect_messages(data, &mut messages),
        Value::String(val) => messages.push(val.clone()),
        other => messages.push(other.to_string()),
    }
    messages
}

fn collect_messages(data: &Value, messages: &mut Vec<String>) {
    let Value::Object(map) = data else {
        return;
    };
    for (key, val) in map {
        if key == "message" || key == "type" {
            match val {
                Value::String(s) => messages.push(s.clone()),
                Value::Null => {}
                other => messages.push(other.to_string()),
            }
        }
        match val {
            Value::Object(_) => collect_messages(val, messages),
            Value::Array(items) => items
                .iter()
                .filter(|item| item.is_object())
                .for_each(|item| collect_messages(item, messages)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystone_error_body() {
        let err = ApiError::from_body(
            401,
            r#"{"error": {"code": 401, "message": "The request you have made requires authentication.", "title": "Unauthorized"}}"#,
        );
        assert_eq!(401, err.code);
        assert_eq!(
            vec!["The request you have made requires authentication.".to_string()],
            err.messages
        );
        assert_eq!(
            "The request you have made requires authentication.",
            err.to_string()
        );
    }

    #[test]
    fn test_nested_messages() {
        let err = ApiError::from_body(
            400,
            r#"{"errors": [{"message": "first"}, "ignored", {"detail": {"message": "second"}}]}"#,
        );
        assert_eq!(vec!["first", "second"], err.messages);
        assert_eq!("first, second", err.to_string());

        let err = ApiError::from_body(400, r#"{"badRequest": {"type": "BadRequest"}}"#);
        assert_eq!(vec!["BadRequest"], err.messages);
    }

    #[test]
    fn test_plain_body() {
        let err = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(vec!["Bad Gateway".to_string()], err.messages);

        let err = ApiError::from_body(500, "");
        assert!(err.messages.is_empty());
        assert_eq!("request failed with status 500", err.to_string());
    }
}
