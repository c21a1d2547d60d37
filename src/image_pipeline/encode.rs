//! Image encoding module
//!
//! Writes edited RGB images back out as JPEG or PNG.

mod writer;
mod standard_writer;
pub mod types;

pub use writer::PhotoWriter;
pub use standard_writer::StandardPhotoWriter;
pub use types::{OutputFormat, OutputConfig, OutputConfigBuilder};
