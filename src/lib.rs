pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod identity;
pub mod notice;
pub mod notifier;
pub mod registry;
pub mod router;
pub mod schedule;
pub mod service;
pub mod types;
pub mod utils;
