pub mod file;
pub mod http;

pub use file::FileConfigStore;
pub use http::HttpConfigStore;
