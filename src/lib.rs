pub mod access;
pub mod admin;
pub mod app;
pub mod auth;
pub mod candidates;
pub mod companies;
pub mod config;
pub mod error;
pub mod extract;
pub mod interviews;
pub mod notify;
pub mod state;
pub mod storage;
pub mod store;
