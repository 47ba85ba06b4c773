use thiserror::Error;

/// Failures surfaced by the reference resolver.
///
/// A lookup that reports "not found" is not an error: it maps to a collection resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid job reference '{input}': expected maa://<digits> with an optional 's' suffix")]
    Validation { input: String },

    #[error("a reference lookup is already in progress")]
    Busy,

    #[error("job lookup failed: {0}")]
    Lookup(String),
}

impl ResolveError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
