//! Task catalog: the static, validated registry of invocable tasks and their advanced options.
//!
//! The built-in table ships as TOML inside the crate; a user file with the same layout can replace
//! it. Every table goes through [`Catalog::from_categories`], so identifiers are unique and each
//! task's `has_advanced` flag agrees with its option schema before anything is composed.

mod options;
mod registry;
mod types;

pub use options::{AdvancedValues, OptionKind, OptionSpec, OptionValue, SelectChoice, TaskValues};
pub use registry::Catalog;
pub use types::{InputMode, TaskCategory, TaskDefinition};

/// Built-in catalog document.
pub const BUILTIN_CATALOG: &str = include_str!("builtin.toml");
