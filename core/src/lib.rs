pub mod api;
pub mod backend;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod reference;
pub mod state;
