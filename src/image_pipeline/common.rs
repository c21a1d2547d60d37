//! Common utilities module
//!
//! Shared error type used across the decode, edit and encode stages.

pub mod error;

pub use error::{EditError, Result};
