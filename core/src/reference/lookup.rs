use async_trait::async_trait;
use serde_json::Value;

/// What the job-lookup service said about a job id.
#[derive(Debug, Clone, PartialEq)]
pub enum JobLookupOutcome {
    /// The id names a single job; carries the raw document.
    Found(Value),
    /// No single job with this id.
    NotFound,
}

/// Remote job-lookup collaborator.
///
/// `Err` covers both transport failures and a service that answered `success: false`.
#[async_trait]
pub trait JobLookup: Send + Sync {
    fn name(&self) -> &str;
    async fn lookup(&self, job_id: u64) -> anyhow::Result<JobLookupOutcome>;
}
