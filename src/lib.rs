pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod plan;
pub mod profile;
pub mod shopping;
pub mod state;
