pub mod cli;
pub mod compose;
pub mod config;
pub mod resolve;
pub mod run;
pub mod tasks;
