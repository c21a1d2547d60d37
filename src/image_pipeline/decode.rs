//! Image decoding module
//!
//! Turns encoded bytes in any format the `image` crate understands into a
//! decoded raster the edit pipeline can work on.

mod reader;
mod standard_reader;

pub use reader::PhotoReader;
pub use standard_reader::StandardPhotoReader;
