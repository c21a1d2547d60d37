#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use ab_glyph::FontVec;
    use font8x8::{BASIC_FONTS, UnicodeFonts};
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    use crate::image_pipeline::common::error::{EditError, Result};
    use crate::image_pipeline::edit::{
        Anchor, CropMargins, EditParameters, EditPipeline, Filter, FontProvider, FontSource,
        FontStyle, Preset, Watermark, WatermarkFont,
    };

    const DEJAVU_SANS: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf"));

    struct MockFontProvider {
        calls: Arc<Mutex<usize>>,
    }

    impl FontProvider for MockFontProvider {
        fn load(&self, _source: &FontSource) -> Result<FontVec> {
            *self.calls.lock().unwrap() += 1;
            Err(EditError::FontError("Mock font error".to_string()))
        }
    }

    fn mock_pipeline() -> (EditPipeline<MockFontProvider>, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        let pipeline = EditPipeline::with_font_provider(MockFontProvider { calls: calls.clone() });
        (pipeline, calls)
    }

    fn gray_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
    }

    fn gradient_rgba(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8, (x % 256) as u8])
        }))
    }

    #[test]
    fn test_no_edits_returns_normalized_input() {
        let input = gradient_rgba(64, 48);
        let output = EditPipeline::new().apply(&input, &EditParameters::default()).unwrap();
        assert_eq!(output, input.to_rgb8());
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = gradient_rgba(32, 32);
        let before = input.clone();
        let params = EditParameters::builder()
            .filters([Filter::Sharpen, Filter::Emboss])
            .brightness(1.7)
            .preset(Preset::Vintage)
            .crop(Some(CropMargins::new(2, 2, 2, 2)))
            .watermark(Watermark::new("hi").with_size(8))
            .build();

        EditPipeline::new().apply(&input, &params).unwrap();

        assert_eq!(input.as_bytes(), before.as_bytes());
    }

    #[test]
    fn test_sharpen_and_centered_watermark() {
        let input = gray_image(400, 300);
        let params = EditParameters::builder()
            .filter(Filter::Sharpen)
            .brightness(1.0)
            .watermark(
                Watermark::new("X")
                    .with_anchor(Anchor::Center)
                    .with_font(FontSource::Default)
                    .with_size(16)
                    .with_color("rgba(255,0,0,0.5)"),
            )
            .build();

        let report = EditPipeline::new().apply_with_report(&input, &params).unwrap();
        let output = report.image;

        assert_eq!(output.dimensions(), (400, 300));
        assert_eq!(report.watermark_origin, Some((192, 142)));
        assert!(report.font_fallback.is_none());

        let glyph = BASIC_FONTS.get('X').unwrap();
        for (x, y, pixel) in output.enumerate_pixels() {
            let inside = (192..208).contains(&x) && (142..158).contains(&y);
            let expected = if inside {
                let (col, row) = ((x - 192) / 2, (y - 142) / 2);
                if glyph[row as usize] & (1u8 << col) != 0 {
                    Rgb([255, 0, 0])
                } else {
                    Rgb([128, 128, 128])
                }
            } else {
                Rgb([128, 128, 128])
            };
            assert_eq!(*pixel, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_outline_font_em_square_matches_size() {
        let font = WatermarkFont::outline(FontVec::try_from_vec(DEJAVU_SANS.to_vec()).unwrap(), 32);
        assert!(!font.is_bitmap());

        // Cap height of this face is 1493/2048 em.
        let (width, height) = font.text_size("H");
        assert!((22..=25).contains(&height), "cap height {height}");
        assert!(width > 15 && width < 32, "advance {width}");

        let (double_width, _) = font.text_size("HH");
        assert!(double_width >= 2 * width - 1 && double_width <= 2 * width + 1);
    }

    #[test]
    fn test_uploaded_font_watermark() {
        let background = Rgb([128, 128, 128]);
        let params = EditParameters::builder()
            .watermark(
                Watermark::new("HH")
                    .with_font(FontSource::Bytes(Arc::from(DEJAVU_SANS)))
                    .with_anchor(Anchor::BottomRight)
                    .with_color("blue")
                    .with_size(32),
            )
            .build();

        let report = EditPipeline::new().apply_with_report(&gray_image(200, 120), &params).unwrap();
        assert!(report.font_fallback.is_none());

        let font = WatermarkFont::outline(FontVec::try_from_vec(DEJAVU_SANS.to_vec()).unwrap(), 32);
        let text_size = font.text_size("HH");
        let origin = Anchor::BottomRight.origin((200, 120), text_size);
        assert_eq!(report.watermark_origin, Some(origin));

        // Glyph boxes start at the ascent line, so ink sits below the origin
        // by at most the ascender gap.
        let (left, right) = (origin.0 - 1, origin.0 + text_size.0 as i32 + 1);
        let (top, bottom) = (origin.1, origin.1 + 32 + 1);
        let mut inked = 0;
        for (x, y, px) in report.image.enumerate_pixels() {
            if *px == background {
                continue;
            }
            inked += 1;
            let (x, y) = (x as i32, y as i32);
            assert!((left..right).contains(&x) && (top..bottom).contains(&y), "ink at ({x}, {y})");
        }
        assert!(inked > 0);
        assert!(report.image.pixels().any(|px| *px == Rgb([0, 0, 255])));
    }

    #[test]
    fn test_font_failure_falls_back() {
        let (pipeline, calls) = mock_pipeline();
        let params = EditParameters::builder()
            .watermark(
                Watermark::new("Isha")
                    .with_font(FontSource::Builtin(FontStyle::Sans))
                    .with_color("red")
                    .with_size(16),
            )
            .build();

        let report = pipeline.apply_with_report(&gray_image(200, 100), &params).unwrap();

        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(matches!(report.font_fallback, Some(EditError::FontError(_))));
        assert_eq!(report.watermark_origin, Some((10, 10)));
        assert!(report.image.pixels().any(|px| *px == Rgb([255, 0, 0])));
    }

    #[test]
    fn test_bogus_font_file_still_produces_output() {
        let params = EditParameters::builder()
            .watermark(
                Watermark::new("ok")
                    .with_font(FontSource::File(PathBuf::from("/no/such/font.ttf")))
                    .with_color("#00ff00")
                    .with_size(24),
            )
            .build();

        let report = EditPipeline::new()
            .apply_with_report(&gray_image(120, 80), &params)
            .unwrap();

        assert!(report.font_fallback.is_some());
        assert!(report.image.pixels().any(|px| *px == Rgb([0, 255, 0])));
    }

    #[test]
    fn test_grayscale_then_watermark_keeps_color() {
        let params = EditParameters::builder()
            .filter(Filter::Grayscale)
            .watermark(Watermark::new("W").with_color((0u8, 0u8, 255u8)).with_size(8))
            .build();

        let output = EditPipeline::new().apply(&gradient_rgba(50, 40), &params).unwrap();

        assert!(output.pixels().any(|px| *px == Rgb([0, 0, 255])));
        let corner = output.get_pixel(49, 39);
        assert_eq!(corner[0], corner[1]);
        assert_eq!(corner[1], corner[2]);
    }

    #[test]
    fn test_watermark_placed_on_cropped_image() {
        let params = EditParameters::builder()
            .crop(Some(CropMargins::new(0, 0, 100, 0)))
            .watermark(Watermark::new("A").with_anchor(Anchor::BottomRight).with_size(8))
            .build();

        let report = EditPipeline::new().apply_with_report(&gray_image(200, 100), &params).unwrap();

        assert_eq!(report.image.dimensions(), (100, 100));
        assert_eq!(report.watermark_origin, Some((82, 72)));
    }

    #[test]
    fn test_full_image_crop_is_skipped() {
        let params = EditParameters::builder()
            .crop(Some(CropMargins::default()))
            .build();

        let report = EditPipeline::new().apply_with_report(&gray_image(30, 20), &params).unwrap();

        assert_eq!(report.image.dimensions(), (30, 20));
        assert!(report.timings.get_stage("crop").is_none());
    }

    #[test]
    fn test_stage_order() {
        let params = EditParameters::builder()
            .filters([Filter::EdgeEnhance, Filter::Blur])
            .brightness(0.8)
            .preset(Preset::CoolTones)
            .crop(Some(CropMargins::new(1, 1, 1, 1)))
            .watermark(Watermark::new("t").with_size(8))
            .build();

        let report = EditPipeline::new().apply_with_report(&gray_image(40, 40), &params).unwrap();
        let stages: Vec<_> = report.timings.stages().iter().map(|s| s.name).collect();

        assert_eq!(
            stages,
            vec!["normalize", "crop", "filters", "brightness", "preset", "watermark"]
        );
    }

    #[test]
    fn test_grayscale_source_is_normalized() {
        let input = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 9, Luma([77])));
        let output = EditPipeline::new().apply(&input, &EditParameters::default()).unwrap();
        assert_eq!(output.dimensions(), (16, 9));
        assert!(output.pixels().all(|px| *px == Rgb([77, 77, 77])));
    }

    #[test]
    fn test_empty_image_rejected() {
        let result = EditPipeline::new().apply(&DynamicImage::new_rgb8(0, 10), &EditParameters::default());
        assert!(matches!(result, Err(EditError::InvalidDimensions(0, 10))));
    }

    #[test]
    fn test_unknown_color_fails_before_font_lookup() {
        let (pipeline, calls) = mock_pipeline();
        let params = EditParameters::builder()
            .watermark(
                Watermark::new("x")
                    .with_color("not-a-colour")
                    .with_font(FontSource::Builtin(FontStyle::Serif)),
            )
            .build();

        let result = pipeline.apply(&gray_image(20, 20), &params);

        assert!(matches!(result, Err(EditError::InvalidColor(_))));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_empty_text_skips_watermark() {
        let (pipeline, calls) = mock_pipeline();
        let params = EditParameters::builder()
            .watermark(Watermark::new("").with_color("not-a-colour"))
            .build();

        let report = pipeline.apply_with_report(&gray_image(20, 20), &params).unwrap();

        assert!(report.watermark_origin.is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_parallel_invocations_agree() {
        let pipeline = EditPipeline::new();
        let input = gradient_rgba(48, 48);
        let params = EditParameters::builder()
            .filters([Filter::Contour, Filter::Sharpen])
            .preset(Preset::Drama)
            .watermark(Watermark::new("par").with_anchor(Anchor::TopRight).with_size(8))
            .build();

        let expected = pipeline.apply(&input, &params).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| pipeline.apply(&input, &params).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
