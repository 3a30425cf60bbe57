//! # Chatgate Core
//!
//! The domain layer of the chat completion gateway.
//! This crate contains the message model, prompt augmentation and the ports
//! that infrastructure adapters implement. It has zero infrastructure
//! dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
