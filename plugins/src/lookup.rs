use anyhow::Result;
use async_trait::async_trait;
use maactl_core::api::{JobLookup, JobLookupOutcome};

use crate::http_client::HttpClient;

pub struct HttpJobLookup {
    client: HttpClient,
}

impl HttpJobLookup {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobLookup for HttpJobLookup {
    fn name(&self) -> &str {
        "http"
    }

    async fn lookup(&self, job_id: u64) -> Result<JobLookupOutcome> {
        let outcome = self.client.lookup_job(job_id).await?;
        tracing::debug!(
            target: "maactl.lookup",
            stage = "lookup.plugin.out",
            job_id,
            found = matches!(outcome, JobLookupOutcome::Found(_))
        );
        Ok(outcome)
    }
}
