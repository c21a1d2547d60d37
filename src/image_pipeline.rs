//! Image processing pipeline module
//!
//! Decoding, the single-image edit pipeline, encoding, and the orchestration
//! that ties them together for files and directories.

pub mod common;
pub mod decode;
pub mod edit;
pub mod encode;
pub mod conversions;

pub use common::{
    EditError,
    Result,
};

pub use decode::{
    PhotoReader,
    StandardPhotoReader,
};

pub use edit::{
    Anchor,
    ColorToken,
    CropMargins,
    EditParameters,
    EditParametersBuilder,
    EditPipeline,
    EditReport,
    Filter,
    FontProvider,
    FontSource,
    FontStyle,
    Preset,
    SystemFontProvider,
    Watermark,
};

pub use encode::{
    OutputConfig,
    OutputConfigBuilder,
    OutputFormat,
    PhotoWriter,
    StandardPhotoWriter,
};

pub use conversions::{
    BatchSummary,
    PhotoEditor,
};
