use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNTITLED_JOB: &str = "Untitled job";
pub const UNKNOWN_STAGE: &str = "Unknown stage";

/// Display data extracted from a single-job document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub title: String,
    pub stage: String,
    pub participants: Vec<String>,
}

/// Extract title, stage and participants from a job document.
///
/// Accepts the document itself or a wrapper whose `content` field holds the document as a JSON
/// string. Missing fields fall back to placeholders instead of failing.
pub fn parse_job_document(raw: &Value) -> JobSummary {
    let inner;
    let doc = match raw.get("content").and_then(Value::as_str) {
        Some(content) => match serde_json::from_str::<Value>(content) {
            Ok(v) => {
                inner = v;
                &inner
            }
            Err(err) => {
                tracing::debug!(
                    target: "maactl.reference",
                    stage = "reference.document.content_decode",
                    error = %err
                );
                raw
            }
        },
        None => raw,
    };

    let title = doc
        .pointer("/doc/title")
        .or_else(|| doc.get("title"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNTITLED_JOB)
        .to_string();

    let stage = ["stage_name", "stage"]
        .iter()
        .find_map(|k| doc.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_STAGE)
        .to_string();

    let mut participants = Vec::new();
    if let Some(list) = doc.get("participants").and_then(Value::as_array) {
        participants.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
    }
    for key in ["opers", "groups"] {
        if let Some(list) = doc.get(key).and_then(Value::as_array) {
            participants.extend(
                list.iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(str::to_string),
            );
        }
    }

    JobSummary {
        title,
        stage,
        participants,
    }
}
