pub mod backend;
pub mod factory;
pub mod http_client;
pub mod lookup;
pub mod services;
pub mod store;
