//! Wire bodies exchanged with the submission endpoint

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schema::FieldError;

/// Path of the submission endpoint
pub const SUBMISSION_PATH: &str = "/api/mars-visitor-form";

/// 200 response: the application was accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Acknowledgment {
    pub fn ok(reference: impl Into<String>) -> Self {
        Self {
            message: "ok".to_string(),
            reference: Some(reference.into()),
        }
    }
}

/// 400 response: server-side validation failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_errors")]
    pub errors: Vec<FieldError>,
}

impl Rejection {
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            message: "Invalid data".to_string(),
            errors,
        }
    }
}

/// Body of any other error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Deserialize)]
struct WireError {
    path: WirePath,
    #[serde(default)]
    message: String,
}

/// Paths arrive either as `"email"` or as segment arrays like `["email"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePath {
    Flat(String),
    Segments(Vec<Value>),
}

impl WirePath {
    fn into_path(self) -> String {
        match self {
            WirePath::Flat(path) => path,
            WirePath::Segments(segments) => segments
                .iter()
                .map(|s| match s {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("."),
        }
    }
}

fn lenient_errors<'de, D>(deserializer: D) -> Result<Vec<FieldError>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Vec::<WireError>::deserialize(deserializer)?;
    Ok(wire
        .into_iter()
        .map(|e| FieldError {
            path: e.path.into_path(),
            message: e.message,
        })
        .collect())
}
