use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info, instrument, warn};

use crate::image_pipeline::{
    common::error::{EditError, Result},
    decode::{PhotoReader, StandardPhotoReader},
    edit::{EditParameters, EditPipeline, FontProvider, SystemFontProvider},
    encode::{OutputConfig, PhotoWriter, StandardPhotoWriter},
};

/// Outcome of [`PhotoEditor::convert_dir`].
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output files written
    pub converted: Vec<PathBuf>,
    /// Input files that could not be edited, with the reason
    pub failed: Vec<(PathBuf, EditError)>,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct PhotoEditor<R: PhotoReader, W: PhotoWriter, F: FontProvider> {
    reader: R,
    writer: W,
    pipeline: EditPipeline<F>,
    config: OutputConfig,
}

impl PhotoEditor<StandardPhotoReader, StandardPhotoWriter, SystemFontProvider> {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            reader: StandardPhotoReader,
            writer: StandardPhotoWriter,
            pipeline: EditPipeline::new(),
            config,
        }
    }
}

impl<R: PhotoReader, W: PhotoWriter, F: FontProvider> PhotoEditor<R, W, F> {
    pub fn with_custom(reader: R, writer: W, fonts: F, config: OutputConfig) -> Self {
        Self {
            reader,
            writer,
            pipeline: EditPipeline::with_font_provider(fonts),
            config,
        }
    }

    fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(EditError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    #[instrument(skip_all, fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write, params: &EditParameters) -> Result<()> {
        let decoded = {
            let _span = tracing::info_span!("decode").entered();
            self.reader.read_image(input_data)?
        };

        self.validate_dimensions(decoded.width(), decoded.height())?;

        let report = self.pipeline.apply_with_report(&decoded, params)?;
        if let Some(reason) = &report.font_fallback {
            warn!(%reason, "Watermark drawn with the built-in font");
        }

        {
            let _span = tracing::info_span!("encode", format = ?self.config.format).entered();
            self.writer.write_image(&report.image, output, &self.config)?;
        }

        Ok(())
    }

    #[instrument(skip(self, input_path, output_path, params))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        params: &EditParameters,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Editing file"
        );

        let input_data = std::fs::read(input_path).map_err(|e| {
            EditError::InputReadError(format!("{}: {}", input_path.display(), e))
        })?;

        // Output is only created once encoding has succeeded.
        let mut encoded = Vec::new();
        self.convert(&input_data, &mut encoded, params)?;

        std::fs::write(output_path, &encoded).map_err(|e| {
            EditError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;

        Ok(())
    }

    /// `<dir>/<stem>_edited.<ext>` for the configured output format.
    pub fn output_path_for(&self, input_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        output_dir.join(format!("{}_edited.{}", stem, self.config.format.extension()))
    }

    /// Edits every regular, non-hidden file in `input_dir`, one pipeline
    /// call per file, in parallel. A file that fails is recorded in the
    /// summary and does not stop the batch.
    #[instrument(skip(self, input_dir, output_dir, params))]
    pub fn convert_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
        params: &EditParameters,
    ) -> Result<BatchSummary>
    where
        R: Sync,
        W: Sync,
        F: Sync,
    {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        let entries = std::fs::read_dir(input_dir).map_err(|e| {
            EditError::InputReadError(format!("{}: {}", input_dir.display(), e))
        })?;

        let mut inputs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'));
            if path.is_file() && !hidden {
                inputs.push(path);
            }
        }
        inputs.sort();

        std::fs::create_dir_all(output_dir).map_err(|e| {
            EditError::OutputWriteError(format!("{}: {}", output_dir.display(), e))
        })?;

        info!(
            count = inputs.len(),
            input = %input_dir.display(),
            output = %output_dir.display(),
            "Editing directory"
        );

        // Inputs sharing a stem (a.png, a.jpg) map to the same output; the
        // first in sorted order wins, the rest are reported as failed.
        let mut summary = BatchSummary::default();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut jobs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let output = self.output_path_for(&input, output_dir);
            match claimed.get(&output) {
                Some(owner) => {
                    let e = EditError::OutputWriteError(format!(
                        "{}: already written for {}",
                        output.display(),
                        owner.display()
                    ));
                    warn!(input = %input.display(), error = %e, "Skipping duplicate output name");
                    summary.failed.push((input, e));
                }
                None => {
                    claimed.insert(output.clone(), input.clone());
                    jobs.push((input, output));
                }
            }
        }

        let results: Vec<_> = jobs
            .into_par_iter()
            .map(|(input, output)| {
                let result = self.convert_file(&input, &output, params);
                (input, output, result)
            })
            .collect();

        for (input, output, result) in results {
            match result {
                Ok(()) => summary.converted.push(output),
                Err(e) => {
                    error!(input = %input.display(), error = %e, "Edit failed");
                    summary.failed.push((input, e));
                }
            }
        }

        info!(
            converted = summary.converted.len(),
            failed = summary.failed.len(),
            "Directory complete"
        );
        Ok(summary)
    }

    pub fn pipeline(&self) -> &EditPipeline<F> {
        &self.pipeline
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: OutputConfig) {
        self.config = config;
    }
}
