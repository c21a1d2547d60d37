use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use photo_retouch::image_pipeline::{
    Anchor, ColorToken, CropMargins, EditParameters, Filter, FontSource, FontStyle, OutputConfig,
    OutputFormat, PhotoEditor, Preset, Watermark,
};
use photo_retouch::logger;

use tracing::{error, info};

/// Applies the same edits to every image in a directory.
#[derive(Parser, Debug)]
#[command(name = "photo-retouch", version)]
struct Args {
    /// Directory holding the images to edit
    #[arg(default_value = "./unedited_images")]
    input_dir: PathBuf,

    /// Directory the edited images are written to
    #[arg(default_value = "./edited_images")]
    output_dir: PathBuf,

    /// Filters to apply, comma separated
    #[arg(long = "filter", value_delimiter = ',', default_value = "sharpen")]
    filters: Vec<Filter>,

    /// Ignore --filter and apply no filters
    #[arg(long)]
    no_filters: bool,

    /// Brightness factor (0.5 - 2.0)
    #[arg(long, default_value_t = 1.2, value_parser = parse_brightness)]
    brightness: f32,

    #[arg(long, default_value = "none")]
    preset: Preset,

    /// Pixels to keep from the left/top, margins to drop from the right/bottom
    #[arg(long, num_args = 4, value_names = ["LEFT", "TOP", "RIGHT", "BOTTOM"])]
    crop: Option<Vec<u32>>,

    /// Watermark text; empty disables the watermark
    #[arg(long, default_value = "Isha")]
    text: String,

    /// Named colour, #hex, or rgba(r,g,b,a)
    #[arg(long, default_value = "red")]
    color: String,

    #[arg(long, default_value = "top-left")]
    anchor: Anchor,

    #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u32).range(10..=150))]
    font_size: u32,

    /// TrueType/OpenType file for the watermark
    #[arg(long, conflicts_with = "font_style")]
    font_file: Option<PathBuf>,

    /// Installed font family: sans, sans-bold, serif or mono
    #[arg(long)]
    font_style: Option<FontStyle>,

    #[arg(long, default_value = "jpeg")]
    format: OutputFormat,

    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
}

fn parse_brightness(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if !(0.5..=2.0).contains(&value) {
        return Err(format!("{value} is outside 0.5..=2.0"));
    }
    Ok(value)
}

impl Args {
    fn edit_parameters(&self) -> EditParameters {
        let font = match (&self.font_file, self.font_style) {
            (Some(path), _) => FontSource::File(path.clone()),
            (None, Some(style)) => FontSource::Builtin(style),
            (None, None) => FontSource::Default,
        };

        let crop = self.crop.as_deref().map(|margins| {
            CropMargins::new(margins[0], margins[1], margins[2], margins[3])
        });

        let filters = if self.no_filters { Vec::new() } else { self.filters.clone() };

        EditParameters::builder()
            .filters(filters)
            .brightness(self.brightness)
            .preset(self.preset)
            .crop(crop)
            .watermark(
                Watermark::new(self.text.clone())
                    .with_color(ColorToken::parse(&self.color))
                    .with_anchor(self.anchor)
                    .with_font(font)
                    .with_size(self.font_size),
            )
            .build()
    }
}

fn main() -> anyhow::Result<()> {
    logger::init("info");

    let args = Args::parse();
    let params = args.edit_parameters();
    let config = OutputConfig::builder()
        .format(args.format)
        .jpeg_quality(args.quality)
        .build();

    info!(
        filters = ?params.filters,
        brightness = params.brightness,
        preset = %params.preset,
        "Starting photo-retouch"
    );

    let editor = PhotoEditor::new(config);
    let summary = editor
        .convert_dir(&args.input_dir, &args.output_dir, &params)
        .with_context(|| format!("editing {}", args.input_dir.display()))?;

    info!("Wrote {} image(s) to {}", summary.converted.len(), args.output_dir.display());

    if !summary.is_clean() {
        for (path, reason) in &summary.failed {
            error!("{}: {}", path.display(), reason);
        }
        bail!("{} image(s) could not be edited", summary.failed.len());
    }

    Ok(())
}
