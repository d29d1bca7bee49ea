//! Wire shapes of the remote API.
//!
//! Every non-login call answers `{ code, msg, data? }` on HTTP 2xx, or a
//! non-2xx status with an optional `{ detail?, msg? }` body. Only the
//! request pipeline parses these shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Business status code meaning success
pub const SUCCESS_CODE: i64 = 200;

/// Business status code for a rejected or expired credential
pub const UNAUTHORIZED_CODE: i64 = 401;

/// Business status code for a missing resource
pub const NOT_FOUND_CODE: i64 = 404;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    /// Only meaningful when `code` is 200.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Interpret a 2xx body. Returns `None` when the body carries no numeric
    /// `code` and therefore is not an envelope at all.
    pub fn from_value(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        let code = object.get("code")?.as_i64()?;
        let msg = object
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self {
            code,
            msg,
            data: object.get("data").cloned(),
        })
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// One entry of a FastAPI validation `detail` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted location, e.g. `body.name`
    pub field: String,
    pub message: String,
}

/// Body of a non-2xx reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// `detail` when it is a plain string.
    pub fn detail_text(&self) -> Option<String> {
        self.detail
            .as_ref()?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Most specific remote message: `detail`, then `msg`, then the first
    /// field error.
    pub fn message(&self) -> Option<String> {
        self.detail_text()
            .or_else(|| self.msg.clone().filter(|m| !m.is_empty()))
            .or_else(|| {
                self.field_errors()
                    .into_iter()
                    .next()
                    .map(|e| format!("{}: {}", e.field, e.message))
            })
    }

    /// Field errors from a `detail: [{ loc, msg }]` array.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let Some(entries) = self.detail.as_ref().and_then(Value::as_array) else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let message = entry.get("msg")?.as_str()?.to_string();
                let field = entry
                    .get("loc")
                    .and_then(Value::as_array)
                    .map(|loc| {
                        loc.iter()
                            .map(|part| match part {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".")
                    })
                    .unwrap_or_default();
                Some(FieldError { field, message })
            })
            .collect()
    }
}
