#[allow(clippy::module_inception)]
pub mod error;
pub mod catalog;
pub mod execute;
pub mod resolve;

pub use catalog::CatalogError;
pub use error::{CliError, StateError};
pub use execute::ExecuteError;
pub use resolve::ResolveError;
