#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use image::{ImageFormat, Rgb, RgbImage};
    use image_folder_batch::{
        list_image_paths, load_images_as_tensor, BatchError, Cpu, FolderLoader, ImageTransform,
        DEFAULT_EXTENSIONS,
    };
    use ndarray::{Array3, ArrayD, Axis};
    use std::fs;
    use std::path::Path;

    fn gradient(width: u32, height: u32, seed: u8) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x as u8).wrapping_mul(3).wrapping_add(seed),
                (y as u8).wrapping_mul(5),
                seed,
            ])
        })
    }

    fn write_image(dir: &Path, name: &str, img: &RgbImage, format: ImageFormat) -> Result<()> {
        img.save_with_format(dir.join(name), format)?;
        Ok(())
    }

    fn write_corrupt(dir: &Path, name: &str) -> Result<()> {
        fs::write(dir.join(name), b"\x00\x01 this is not an image \xff")?;
        Ok(())
    }

    /// Raw CHW values in [0, 1] with no resizing.
    fn to_chw(img: &RgbImage) -> ArrayD<f32> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        Array3::from_shape_fn((3, h, w), |(c, y, x)| {
            f32::from(img.get_pixel(x as u32, y as u32).0[c]) / 255.0
        })
        .into_dyn()
    }

    fn raw_chw(img: &RgbImage) -> anyhow::Result<ArrayD<f32>> {
        Ok(to_chw(img))
    }

    #[test]
    fn lister_returns_only_matching_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let img = gradient(8, 8, 1);
        write_image(dir.path(), "z.png", &img, ImageFormat::Png)?;
        write_image(dir.path(), "m.jpg", &img, ImageFormat::Jpeg)?;
        write_image(dir.path(), "a.bmp", &img, ImageFormat::Bmp)?;
        fs::write(dir.path().join("labels.csv"), "a,b")?;
        fs::write(dir.path().join("photo.tiff"), "x")?;

        let paths = list_image_paths(dir.path(), DEFAULT_EXTENSIONS);
        assert_eq!(
            paths,
            vec![
                dir.path().join("a.bmp"),
                dir.path().join("m.jpg"),
                dir.path().join("z.png"),
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_folder_lists_nothing_and_fails_to_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("does_not_exist");

        assert!(list_image_paths(&missing, DEFAULT_EXTENSIONS).is_empty());

        let err = load_images_as_tensor(&missing, &raw_chw, &Cpu).unwrap_err();
        assert!(matches!(err, BatchError::NoImagesFound { .. }));
        assert!(err.to_string().contains("does_not_exist"));
        Ok(())
    }

    #[test]
    fn corrupt_files_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let images: Vec<_> = (0..3).map(|i| gradient(6, 4, i * 40)).collect();
        write_image(dir.path(), "a.png", &images[0], ImageFormat::Png)?;
        write_corrupt(dir.path(), "b.jpg")?;
        write_image(dir.path(), "c.png", &images[1], ImageFormat::Png)?;
        write_corrupt(dir.path(), "d.png")?;
        write_image(dir.path(), "e.bmp", &images[2], ImageFormat::Bmp)?;

        let (batch, report) = FolderLoader::new(dir.path()).load_with_report(&raw_chw, &Cpu)?;

        assert_eq!(batch.shape(), &[3, 3, 4, 6]);
        for (i, img) in images.iter().enumerate() {
            assert_eq!(batch.index_axis(Axis(0), i), to_chw(img));
        }

        assert_eq!(report.attempted, 5);
        assert_eq!(report.loaded(), 3);
        let skipped: Vec<_> = report.failures.iter().map(|f| f.path.clone()).collect();
        assert_eq!(skipped, vec![dir.path().join("b.jpg"), dir.path().join("d.png")]);
        assert!(report.to_string().contains("2/5"));
        Ok(())
    }

    #[test]
    fn all_corrupt_reports_first_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["w.png", "x.jpg", "y.webp", "z.bmp"] {
            write_corrupt(dir.path(), name)?;
        }

        let err = load_images_as_tensor(dir.path(), &raw_chw, &Cpu).unwrap_err();
        let BatchError::AllImagesFailed { folder, path, .. } = &err else {
            panic!("expected AllImagesFailed, got {err:?}");
        };
        assert_eq!(folder, dir.path());
        assert_eq!(path, &dir.path().join("w.png"));

        let message = err.to_string();
        assert!(message.contains(&dir.path().display().to_string()));
        assert!(message.contains(&dir.path().join("w.png").display().to_string()));
        assert!(err.is_not_found());
        Ok(())
    }

    #[test]
    fn mismatched_sample_shapes_fail_to_stack() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_image(dir.path(), "big.png", &gradient(224, 224, 0), ImageFormat::Png)?;
        write_image(dir.path(), "small.png", &gradient(100, 100, 0), ImageFormat::Png)?;

        let err = load_images_as_tensor(dir.path(), &raw_chw, &Cpu).unwrap_err();
        assert!(matches!(err, BatchError::Shape(_)));
        assert!(!err.is_not_found());
        Ok(())
    }

    #[test]
    fn repeated_loads_are_identical() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_image(dir.path(), "1.jpg", &gradient(300, 200, 7), ImageFormat::Jpeg)?;
        write_image(dir.path(), "2.png", &gradient(180, 260, 90), ImageFormat::Png)?;
        write_corrupt(dir.path(), "3.png")?;

        let transform = ImageTransform::default();
        let first = load_images_as_tensor(dir.path(), &transform, &Cpu)?;
        let second = load_images_as_tensor(dir.path(), &transform, &Cpu)?;

        assert_eq!(first.shape(), &[2, 3, 224, 224]);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn truncated_files_follow_the_loader_setting() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_image(dir.path(), "a.png", &gradient(64, 64, 3), ImageFormat::Png)?;
        let full = dir.path().join("b.png");
        write_image(dir.path(), "b.png", &gradient(64, 64, 200), ImageFormat::Png)?;
        let bytes = fs::read(&full)?;
        fs::write(&full, &bytes[..bytes.len() * 2 / 3])?;

        let (tolerant, report) = FolderLoader::new(dir.path()).load_with_report(&raw_chw, &Cpu)?;
        assert_eq!(tolerant.shape()[0], 2);
        assert!(!report.has_failures());

        let (strict, report) = FolderLoader::new(dir.path())
            .tolerate_truncated(false)
            .load_with_report(&raw_chw, &Cpu)?;
        assert_eq!(strict.shape()[0], 1);
        assert_eq!(report.failures[0].path, full);
        Ok(())
    }
}
