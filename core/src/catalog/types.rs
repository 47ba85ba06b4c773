use serde::{Deserialize, Serialize};

use super::options::OptionSpec;

/// What kind of text a task accepts as its raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Free text, passed through trimmed.
    #[default]
    Text,
    /// Newline-delimited job references.
    JobReferences,
    /// Newline-delimited job references that may also be previewed by the reference resolver.
    ResolvableJobReferences,
}

impl InputMode {
    pub fn accepts_job_references(self) -> bool {
        matches!(self, Self::JobReferences | Self::ResolvableJobReferences)
    }

    pub fn is_resolvable(self) -> bool {
        matches!(self, Self::ResolvableJobReferences)
    }
}

/// One invocable unit of automation.
///
/// Created when the catalog is loaded and never mutated afterwards; `command` is the only string
/// that tells the backend what to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    pub command: String,

    #[serde(default)]
    pub placeholder: String,

    #[serde(default)]
    pub supports_dry_run: bool,

    #[serde(default)]
    pub has_advanced: bool,

    #[serde(default)]
    pub input: InputMode,

    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl TaskDefinition {
    pub fn option(&self, key: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCategory {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}
