//! Core domain + application logic for the support ticket bot.
//!
//! This crate is intentionally platform-agnostic. The chat platform (channel
//! management, member lookup, message delivery) lives behind ports (traits)
//! implemented in adapter crates.

pub mod admin;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod lifecycle;
pub mod logging;
pub mod notify;
pub mod ports;
pub mod registry;
pub mod store;

pub use errors::{Error, Result};
