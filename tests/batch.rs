use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use photo_retouch::image_pipeline::{
    Anchor, EditError, EditParameters, Filter, OutputConfig, OutputFormat, PhotoEditor, Preset,
    Watermark,
};

fn write_photo(dir: &Path, name: &str, image: DynamicImage, format: ImageFormat) {
    image.save_with_format(dir.join(name), format).unwrap();
}

fn default_params() -> EditParameters {
    EditParameters::builder()
        .filter(Filter::Sharpen)
        .brightness(1.2)
        .watermark(
            Watermark::new("Isha")
                .with_color("red")
                .with_anchor(Anchor::TopLeft)
                .with_size(20),
        )
        .build()
}

#[test]
fn edits_every_image_in_directory() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_photo(
        input.path(),
        "beach.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, Rgb([40, 90, 160]))),
        ImageFormat::Png,
    );
    write_photo(
        input.path(),
        "logo.png",
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([200, 10, 10, 128]))),
        ImageFormat::Png,
    );
    write_photo(
        input.path(),
        "forest.jpg",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(90, 60, Rgb([20, 120, 30]))),
        ImageFormat::Jpeg,
    );

    let editor = PhotoEditor::new(OutputConfig::default());
    let summary = editor
        .convert_dir(input.path(), output.path(), &default_params())
        .unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.converted.len(), 3);

    for (name, size) in [
        ("beach_edited.jpg", (120, 80)),
        ("logo_edited.jpg", (64, 64)),
        ("forest_edited.jpg", (90, 60)),
    ] {
        let path = output.path().join(name);
        assert!(path.exists(), "missing {name}");
        let edited = image::open(&path).unwrap();
        assert_eq!((edited.width(), edited.height()), size);
    }
}

#[test]
fn bad_file_does_not_stop_batch() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_photo(
        input.path(),
        "good.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([100, 100, 100]))),
        ImageFormat::Png,
    );
    fs::write(input.path().join("notes.txt"), b"not an image").unwrap();
    fs::write(input.path().join(".hidden.png"), b"skipped").unwrap();

    let editor = PhotoEditor::new(OutputConfig::default());
    let summary = editor
        .convert_dir(input.path(), output.path(), &default_params())
        .unwrap();

    assert_eq!(summary.converted.len(), 1);
    assert_eq!(summary.failed.len(), 1);
    let (failed_path, reason) = &summary.failed[0];
    assert!(failed_path.ends_with("notes.txt"));
    assert!(matches!(reason, EditError::DecodeError(_)));
    assert!(!output.path().join("notes_edited.jpg").exists());
}

#[test]
fn png_output_keeps_untouched_pixels() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_photo(
        input.path(),
        "flat.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([128, 128, 128]))),
        ImageFormat::Png,
    );

    let config = OutputConfig::builder().format(OutputFormat::Png).build();
    let editor = PhotoEditor::new(config);
    editor
        .convert_file(
            input.path().join("flat.png"),
            output.path().join("flat_edited.png"),
            &EditParameters::default(),
        )
        .unwrap();

    let edited = image::open(output.path().join("flat_edited.png")).unwrap().to_rgb8();
    assert!(edited.pixels().all(|px| *px == Rgb([128, 128, 128])));
}

#[test]
fn preset_and_crop_applied_to_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_photo(
        input.path(),
        "wide.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([60, 60, 100]))),
        ImageFormat::Png,
    );

    let params = EditParameters::builder()
        .preset(Preset::CoolTones)
        .crop(Some(photo_retouch::image_pipeline::CropMargins::new(10, 0, 90, 0)))
        .build();
    let config = OutputConfig::builder().format(OutputFormat::Png).build();
    let editor = PhotoEditor::new(config);
    let summary = editor.convert_dir(input.path(), output.path(), &params).unwrap();

    assert!(summary.is_clean());
    let edited = image::open(output.path().join("wide_edited.png")).unwrap().to_rgb8();
    assert_eq!(edited.dimensions(), (100, 100));
    assert_eq!(*edited.get_pixel(50, 50), Rgb([60, 60, 130]));
}

#[test]
fn missing_input_directory_is_an_error() {
    let output = tempfile::tempdir().unwrap();
    let editor = PhotoEditor::new(OutputConfig::default());
    let result = editor.convert_dir(
        output.path().join("does-not-exist"),
        output.path(),
        &EditParameters::default(),
    );
    assert!(matches!(result, Err(EditError::InputReadError(_))));
}

#[test]
fn shared_stem_is_not_written_twice() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_photo(
        input.path(),
        "a.png",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 20, Rgb([10, 200, 10]))),
        ImageFormat::Png,
    );
    write_photo(
        input.path(),
        "a.jpg",
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 10, Rgb([200, 10, 10]))),
        ImageFormat::Jpeg,
    );

    let editor = PhotoEditor::new(OutputConfig::default());
    let summary = editor
        .convert_dir(input.path(), output.path(), &EditParameters::default())
        .unwrap();

    assert_eq!(summary.converted, vec![output.path().join("a_edited.jpg")]);
    assert_eq!(summary.failed.len(), 1);
    let (skipped, reason) = &summary.failed[0];
    assert!(skipped.ends_with("a.png"));
    assert!(matches!(reason, EditError::OutputWriteError(_)));
    assert!(!summary.is_clean());

    // a.jpg sorts first and owns the output name.
    let edited = image::open(output.path().join("a_edited.jpg")).unwrap();
    assert_eq!((edited.width(), edited.height()), (40, 10));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 1);
}
