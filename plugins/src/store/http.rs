use anyhow::Result;
use async_trait::async_trait;
use maactl_core::api::ConfigStore;
use serde_json::Value;

use crate::http_client::HttpClient;

/// Keyed configuration endpoint on the control server.
pub struct HttpConfigStore {
    client: HttpClient,
}

impl HttpConfigStore {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigStore for HttpConfigStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        self.client.load_config(key).await
    }

    async fn save(&self, key: &str, data: &Value) -> Result<()> {
        self.client.save_config(key, data).await
    }
}
