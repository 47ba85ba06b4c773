use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request sent to the execution backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    pub arguments: String,
}

/// Response of the execution backend. `success: false` is a backend-reported failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok(data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Remote execution collaborator. `Err` means the call itself failed (transport).
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, request: CommandRequest) -> anyhow::Result<CommandResponse>;
}
