//! Middleware modules.

pub mod client;
pub mod error;
