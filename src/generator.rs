//! Synthetic test input: JPEGs with random shapes and backdated timestamps

use crate::core::{PoolError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Canvas sizes picked at random for each image
pub const SIZES: [(u32, u32); 5] = [
    (800, 600),
    (1024, 768),
    (640, 480),
    (1280, 720),
    (1920, 1080),
];

const RECTS_PER_IMAGE: usize = 3;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Writes `count` JPEGs named `img_0001.jpg`, `img_0002.jpg`, ... into `dir`.
///
/// Each is a white canvas of a random [`SIZES`] entry with three random
/// rectangles, encoded at quality 80..=99, and its modification time set 1 to
/// 730 days in the past so that every priority bucket gets populated.
pub fn generate_test_images(count: usize, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    generate_with_rng(count, dir.as_ref(), &mut fastrand::Rng::new())
}

/// Same as [`generate_test_images`] with a caller-supplied RNG, for
/// reproducible output.
pub fn generate_with_rng(count: usize, dir: &Path, rng: &mut fastrand::Rng) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| PoolError::io(dir, e))?;
    log::info!("Generating {} test images in {}", count, dir.display());

    let now = SystemTime::now();
    let mut paths = Vec::with_capacity(count);

    for i in 1..=count {
        let path = dir.join(format!("img_{:04}.jpg", i));
        let image = random_image(rng);
        let quality = rng.u8(80..100);
        write_jpeg(&image, &path, quality)?;

        let days_ago = rng.u32(1..=730);
        let modified = now - DAY * days_ago;
        File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(modified))
            .map_err(|e| PoolError::io(&path, e))?;

        if i % 100 == 0 {
            log::info!("Created {}/{} images", i, count);
        }
        paths.push(path);
    }

    log::info!("Generation completed");
    Ok(paths)
}

fn random_image(rng: &mut fastrand::Rng) -> RgbImage {
    let (width, height) = SIZES[rng.usize(..SIZES.len())];
    let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for _ in 0..RECTS_PER_IMAGE {
        let x = rng.u32(..width - 100);
        let y = rng.u32(..height - 100);
        let w = rng.u32(20..120);
        let h = rng.u32(20..120);
        let color = Rgb([rng.u8(..200), rng.u8(..200), rng.u8(..200)]);

        for py in y..(y + h).min(height) {
            for px in x..(x + w).min(width) {
                image.put_pixel(px, py, color);
            }
        }
    }
    image
}

fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path).map_err(|e| PoolError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    image
        .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))
        .map_err(|e| PoolError::image(path, e))?;
    writer.flush().map_err(|e| PoolError::io(path, e))
}
