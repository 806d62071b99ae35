//! parley-client: HTTP client for the chat endpoint
//!
//! This crate provides the wire types and the request/response handling for
//! talking to a parley-compatible chat service.

pub mod client;
pub mod error;
pub mod types;

pub use client::ChatClient;
pub use error::{Error, Result};
pub use types::*;
