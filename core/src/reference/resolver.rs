use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::document::{parse_job_document, JobSummary};
use super::lookup::{JobLookup, JobLookupOutcome};
use super::parse::JobReference;
use crate::error::ResolveError;

/// Note attached to every collection outcome.
pub const COLLECTION_NOTE: &str =
    "No single job matches this id; it will be treated as a job set and run every job in it.";

/// What to do when the lookup service cannot be reached or reports an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LookupFailurePolicy {
    /// Treat the reference as a job set.
    #[default]
    #[serde(rename = "open")]
    FailOpen,
    /// Surface the failure as [`ResolveError::Lookup`].
    #[serde(rename = "closed")]
    FailClosed,
}

pub const DEFAULT_LOOKUP_FAILURE_POLICY: LookupFailurePolicy = LookupFailurePolicy::FailOpen;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Single {
        summary: JobSummary,
    },
    Collection {
        note: String,
        /// The original reference lacked the suffix; the composer must add it.
        auto_add_suffix: bool,
    },
}

/// Result of resolving one reference. Only valid for the exact input it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceResolution {
    pub source: String,
    pub job_id: u64,
    pub outcome: ResolutionOutcome,
}

impl ReferenceResolution {
    pub fn collection(source: &str, reference: JobReference) -> Self {
        Self {
            source: source.to_string(),
            job_id: reference.job_id,
            outcome: ResolutionOutcome::Collection {
                note: COLLECTION_NOTE.to_string(),
                auto_add_suffix: !reference.has_suffix,
            },
        }
    }

    pub fn is_bound_to(&self, input: &str) -> bool {
        self.source == input
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Collection { .. })
    }

    pub fn auto_add_suffix(&self) -> bool {
        matches!(
            self.outcome,
            ResolutionOutcome::Collection {
                auto_add_suffix: true,
                ..
            }
        )
    }

    /// Title for a single job, the explanatory note for a collection.
    pub fn headline(&self) -> &str {
        match &self.outcome {
            ResolutionOutcome::Single { summary } => &summary.title,
            ResolutionOutcome::Collection { note, .. } => note,
        }
    }
}

/// Decides whether a reference names one job or a job set.
///
/// Single-flight: while one lookup is pending, further calls fail with [`ResolveError::Busy`].
pub struct ReferenceResolver {
    lookup: Arc<dyn JobLookup>,
    policy: LookupFailurePolicy,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ReferenceResolver {
    pub fn new(lookup: Arc<dyn JobLookup>, policy: LookupFailurePolicy) -> Self {
        Self {
            lookup,
            policy,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validate `input` and ask the lookup service about it.
    ///
    /// Malformed input fails before any network call.
    pub async fn resolve(&self, input: &str) -> Result<ReferenceResolution, ResolveError> {
        let reference = JobReference::parse(input)?;
        let _guard = BusyGuard::acquire(&self.busy).ok_or(ResolveError::Busy)?;

        tracing::debug!(
            target: "maactl.reference",
            stage = "reference.resolve.in",
            lookup = %self.lookup.name(),
            job_id = reference.job_id,
            has_suffix = reference.has_suffix
        );

        let resolution = match self.lookup.lookup(reference.job_id).await {
            Ok(JobLookupOutcome::Found(doc)) => ReferenceResolution {
                source: input.to_string(),
                job_id: reference.job_id,
                outcome: ResolutionOutcome::Single {
                    summary: parse_job_document(&doc),
                },
            },
            Ok(JobLookupOutcome::NotFound) => ReferenceResolution::collection(input, reference),
            Err(err) => match self.policy {
                LookupFailurePolicy::FailOpen => {
                    tracing::warn!(
                        target: "maactl.reference",
                        stage = "reference.resolve.fail_open",
                        job_id = reference.job_id,
                        error = %err,
                        "lookup failed, assuming job set"
                    );
                    ReferenceResolution::collection(input, reference)
                }
                LookupFailurePolicy::FailClosed => {
                    return Err(ResolveError::Lookup(err.to_string()));
                }
            },
        };

        tracing::debug!(
            target: "maactl.reference",
            stage = "reference.resolve.out",
            job_id = resolution.job_id,
            collection = resolution.is_collection(),
            auto_add_suffix = resolution.auto_add_suffix()
        );
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::UNTITLED_JOB;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    enum Reply {
        Found(serde_json::Value),
        NotFound,
        Fail,
    }

    struct StubLookup {
        reply: Reply,
        calls: AtomicUsize,
        gate: Option<Notify>,
    }

    impl StubLookup {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                gate: Some(Notify::new()),
            })
        }
    }

    #[async_trait]
    impl JobLookup for StubLookup {
        fn name(&self) -> &str {
            "stub"
        }

        async fn lookup(&self, _job_id: u64) -> anyhow::Result<JobLookupOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Reply::Found(doc) => Ok(JobLookupOutcome::Found(doc.clone())),
                Reply::NotFound => Ok(JobLookupOutcome::NotFound),
                Reply::Fail => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    #[tokio::test]
    async fn test_not_found_without_suffix_adds_suffix() {
        let resolver =
            ReferenceResolver::new(StubLookup::new(Reply::NotFound), DEFAULT_LOOKUP_FAILURE_POLICY);
        let r = resolver.resolve("maa://26766").await.unwrap();
        assert!(r.is_collection());
        assert!(r.auto_add_suffix());
        assert_eq!(r.job_id, 26766);
        assert_eq!(r.headline(), COLLECTION_NOTE);
    }

    #[tokio::test]
    async fn test_not_found_with_suffix_keeps_input() {
        let resolver =
            ReferenceResolver::new(StubLookup::new(Reply::NotFound), DEFAULT_LOOKUP_FAILURE_POLICY);
        let r = resolver.resolve("maa://26766s").await.unwrap();
        assert!(r.is_collection());
        assert!(!r.auto_add_suffix());
    }

    #[tokio::test]
    async fn test_found_yields_single() {
        let lookup = StubLookup::new(Reply::Found(json!({ "stage": "1-7" })));
        let resolver = ReferenceResolver::new(lookup, DEFAULT_LOOKUP_FAILURE_POLICY);
        let r = resolver.resolve("maa://42").await.unwrap();
        match &r.outcome {
            ResolutionOutcome::Single { summary } => {
                assert_eq!(summary.title, UNTITLED_JOB);
                assert_eq!(summary.stage, "1-7");
            }
            other => panic!("expected single, got {other:?}"),
        }
        assert!(!r.auto_add_suffix());
        assert!(r.is_bound_to("maa://42"));
        assert!(!r.is_bound_to("maa://42 "));
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_open() {
        let resolver =
            ReferenceResolver::new(StubLookup::new(Reply::Fail), LookupFailurePolicy::FailOpen);
        let r = resolver.resolve("maa://999").await.unwrap();
        assert!(r.is_collection());
        assert!(r.auto_add_suffix());
        assert!(!resolver.is_busy());

        let r = resolver.resolve("maa://999s").await.unwrap();
        assert!(!r.auto_add_suffix());
    }

    #[tokio::test]
    async fn test_lookup_failure_fail_closed_surfaces_error() {
        let resolver =
            ReferenceResolver::new(StubLookup::new(Reply::Fail), LookupFailurePolicy::FailClosed);
        let err = resolver.resolve("maa://999").await.unwrap_err();
        assert!(matches!(err, ResolveError::Lookup(msg) if msg.contains("connection refused")));
        assert!(!resolver.is_busy());
    }

    #[tokio::test]
    async fn test_invalid_reference_skips_lookup() {
        let lookup = StubLookup::new(Reply::NotFound);
        let resolver = ReferenceResolver::new(lookup.clone(), DEFAULT_LOOKUP_FAILURE_POLICY);
        let err = resolver.resolve("https://example.com/1").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_resolve_while_pending_is_rejected() {
        let lookup = StubLookup::gated(Reply::NotFound);
        let resolver = Arc::new(ReferenceResolver::new(
            lookup.clone(),
            DEFAULT_LOOKUP_FAILURE_POLICY,
        ));

        let first = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("maa://1").await })
        };
        while !resolver.is_busy() {
            tokio::task::yield_now().await;
        }

        let err = resolver.resolve("maa://2").await.unwrap_err();
        assert!(matches!(err, ResolveError::Busy));

        if let Some(gate) = &lookup.gate {
            gate.notify_one();
        }
        let r = first.await.unwrap().unwrap();
        assert_eq!(r.job_id, 1);
        assert!(!resolver.is_busy());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_serde_names() {
        let p: LookupFailurePolicy = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(p, LookupFailurePolicy::FailClosed);
        assert_eq!(
            serde_json::to_string(&LookupFailurePolicy::FailOpen).unwrap(),
            "\"open\""
        );
    }
}
