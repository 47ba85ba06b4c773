//! Job reference handling: parsing `maa://` references, looking them up, and deciding whether a
//! reference names one job or a job set.

mod document;
mod lookup;
mod parse;
mod resolver;

pub use document::{parse_job_document, JobSummary, UNKNOWN_STAGE, UNTITLED_JOB};
pub use lookup::{JobLookup, JobLookupOutcome};
pub use parse::{inject_collection_suffix, JobReference, COLLECTION_SUFFIX, REFERENCE_SCHEME};
pub use resolver::{
    LookupFailurePolicy, ReferenceResolution, ReferenceResolver, ResolutionOutcome,
    COLLECTION_NOTE, DEFAULT_LOOKUP_FAILURE_POLICY,
};
