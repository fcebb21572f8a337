//! Image conversion backed by the `image` crate

use crate::core::{Converter, ImageFormat, Job, JobError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Decodes `job.source` and re-encodes it to `job.destination`.
///
/// - PNG: lossless, quality ignored
/// - JPEG: encoded at `job.quality`, alpha dropped
/// - WebP: lossless, quality ignored
///
/// Missing destination directories are created. The returned duration covers
/// decode and encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageConverter;

impl ImageConverter {
    /// Create a converter
    pub fn new() -> Self {
        Self
    }

    fn encode(image: &DynamicImage, job: &Job) -> Result<(), JobError> {
        let file = File::create(&job.destination)
            .map_err(|e| JobError::io(format!("create {}", job.destination.display()), e))?;
        let mut writer = BufWriter::new(file);

        let encoded = match job.format {
            ImageFormat::Png => image.write_with_encoder(PngEncoder::new(&mut writer)),
            ImageFormat::Jpeg => image
                .to_rgb8()
                .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, job.quality.get())),
            ImageFormat::Webp => image
                .to_rgba8()
                .write_with_encoder(WebPEncoder::new_lossless(&mut writer)),
        };
        encoded.map_err(|e| JobError::image("save image", e))?;

        writer
            .flush()
            .map_err(|e| JobError::io(format!("write {}", job.destination.display()), e))
    }
}

impl Converter for ImageConverter {
    fn convert(&self, job: &Job) -> Result<Duration, JobError> {
        let start = Instant::now();

        let image = image::open(&job.source).map_err(|e| JobError::image("open image", e))?;

        if let Some(parent) = job.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        Self::encode(&image, job)?;

        Ok(start.elapsed())
    }

    fn name(&self) -> &str {
        "ImageConverter"
    }
}

fn create_dir(dir: &Path) -> Result<(), JobError> {
    fs::create_dir_all(dir).map_err(|e| JobError::io("create output dir", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JobId, Priority, Quality};
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn source_image(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("img_0001.jpg");
        let mut img = RgbImage::from_pixel(32, 24, Rgb([255, 255, 255]));
        img.put_pixel(4, 4, Rgb([10, 120, 200]));
        img.save(&path).expect("write test image");
        path
    }

    #[test]
    fn test_converts_to_every_format() {
        let dir = TempDir::new().unwrap();
        let source = source_image(dir.path());

        for (id, format) in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Webp]
            .into_iter()
            .enumerate()
        {
            let destination = dir
                .path()
                .join("out")
                .join(format!("img_0001.{}", format.extension()));
            let job = Job::new(JobId(id as u64), Priority::Low, &source, &destination)
                .with_format(format)
                .with_quality(Quality::new(90).unwrap());

            ImageConverter::new()
                .convert(&job)
                .unwrap_or_else(|e| panic!("{} conversion failed: {}", format, e));

            let decoded = image::open(&destination).expect("output decodes");
            assert_eq!((decoded.width(), decoded.height()), (32, 24));
        }
    }

    #[test]
    fn test_missing_source_is_a_job_error() {
        let dir = TempDir::new().unwrap();
        let job = Job::new(
            JobId(1),
            Priority::High,
            dir.path().join("nope.jpg"),
            dir.path().join("out.png"),
        );

        let err = ImageConverter::new().convert(&job).unwrap_err();
        assert!(matches!(err, JobError::Image { .. }));
        assert!(err.to_string().starts_with("open image"));
        assert!(!dir.path().join("out.png").exists());
    }

    #[test]
    fn test_garbage_source_is_a_job_error() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.jpg");
        fs::write(&source, b"not an image").unwrap();
        let job = Job::new(JobId(1), Priority::Mid, &source, dir.path().join("o.png"));

        assert!(ImageConverter::new().convert(&job).is_err());
    }
}
