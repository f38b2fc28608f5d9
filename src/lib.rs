// src/lib.rs

pub mod backend;
pub mod config;
pub mod parser;
pub mod structs;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
pub mod controller;
#[cfg(feature = "gui")]
pub mod fetcher;
#[cfg(feature = "gui")]
pub mod scanner;

// Re-export commonly used items for convenience
pub use backend::{find, Backend, Notifier};
pub use config::AppConfig;
pub use structs::*;
