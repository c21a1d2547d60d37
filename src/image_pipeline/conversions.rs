//! Pipeline conversions module
//!
//! Orchestrates decode, edit and encode for in-memory data, single files
//! and whole directories.

mod photo_editor;


pub use photo_editor::{BatchSummary, PhotoEditor};
