//! helix-api: HTTP client for the helix outreach backend
//!
//! Typed wrappers around the chat and sequence endpoints. The client is
//! cheap to clone; clones share one connection pool.

mod client;
mod error;

pub use client::{BackendClient, Health};
pub use error::{Error, Result};
