pub mod app;
pub mod config;
pub mod context;
pub mod conversation;
pub mod extract;
pub mod flow;
pub mod prompt;
pub mod provider;
pub mod remote;
pub mod session;
pub mod shared;
