pub mod auth;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod inference;
pub mod prompts;
pub mod server;
pub mod store;
