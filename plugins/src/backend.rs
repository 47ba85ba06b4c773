use anyhow::Result;
use async_trait::async_trait;
use maactl_core::api::{CommandRequest, CommandResponse, ExecutionBackend};

use crate::http_client::HttpClient;

/// Executes commands through the control server.
pub struct HttpExecutionBackend {
    client: HttpClient,
}

impl HttpExecutionBackend {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExecutionBackend for HttpExecutionBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn execute(&self, request: CommandRequest) -> Result<CommandResponse> {
        self.client.execute_command(&request).await
    }
}
