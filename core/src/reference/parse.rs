use std::sync::OnceLock;

use regex::Regex;

use crate::error::ResolveError;

pub const REFERENCE_SCHEME: &str = "maa";

/// Trailing letter that marks a reference as a job set.
pub const COLLECTION_SUFFIX: char = 's';

static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static EMBEDDED_REGEX: OnceLock<Regex> = OnceLock::new();

fn reference_regex() -> &'static Regex {
    REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"^maa://(\d+)(s?)$").expect("REFERENCE_REGEX is valid")
    })
}

fn embedded_regex() -> &'static Regex {
    EMBEDDED_REGEX
        .get_or_init(|| Regex::new(r"maa://(\d+)(s?)").expect("EMBEDDED_REGEX is valid"))
}

/// A syntactically valid job reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReference {
    pub job_id: u64,
    pub has_suffix: bool,
}

impl JobReference {
    /// Parse a whole string as `maa://<digits>[s]`. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let invalid = || ResolveError::Validation {
            input: input.to_string(),
        };
        let caps = reference_regex().captures(input.trim()).ok_or_else(invalid)?;
        let job_id = caps[1].parse::<u64>().map_err(|_| invalid())?;
        Ok(Self {
            job_id,
            has_suffix: !caps[2].is_empty(),
        })
    }
}

impl std::fmt::Display for JobReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{REFERENCE_SCHEME}://{}", self.job_id)?;
        if self.has_suffix {
            write!(f, "{COLLECTION_SUFFIX}")?;
        }
        Ok(())
    }
}

/// Make every `maa://<digits>` occurrence end in the collection suffix. Idempotent.
pub fn inject_collection_suffix(input: &str) -> String {
    embedded_regex()
        .replace_all(input, |caps: &regex::Captures<'_>| {
            format!("{REFERENCE_SCHEME}://{}{COLLECTION_SUFFIX}", &caps[1])
        })
        .into_owned()
}
