//! Pixel buffer holding the carrier image.
//!
//! Samples are 8-bit and interleaved in raster order: row-major, then
//! channel. Grayscale and palette images are widened to RGB on load, and
//! images with alpha keep their fourth channel.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, Rgb, Rgba};

use crate::error::ImageError;

/// Format used when persisting a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg { quality: u8 },
}

impl SaveFormat {
    /// File extension written by this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// An 8-bit, 3- or 4-channel image owned by one operation at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    width: u32,
    height: u32,
    channels: usize,
    samples: Vec<u8>,
}

impl Carrier {
    /// Builds a carrier from raw interleaved samples.
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        samples: Vec<u8>,
    ) -> Result<Self, ImageError> {
        if channels != 3 && channels != 4 {
            return Err(ImageError::Unsupported(format!(
                "{channels} channels (expected 3 or 4)"
            )));
        }
        let expected = width as usize * height as usize * channels;
        if samples.len() != expected {
            return Err(ImageError::Unsupported(format!(
                "{} samples for a {width}x{height}x{channels} image (expected {expected})",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Loads a carrier from an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let image = image::open(path).map_err(|e| ImageError::Load(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Converts a decoded image, keeping alpha when present.
    pub fn from_image(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        if image.color().has_alpha() {
            Self {
                width,
                height,
                channels: 4,
                samples: image.to_rgba8().into_raw(),
            }
        } else {
            Self {
                width,
                height,
                channels: 3,
                samples: image.to_rgb8().into_raw(),
            }
        }
    }

    /// Converts back into an image.
    pub fn to_image(&self) -> Result<DynamicImage, ImageError> {
        let (width, height) = (self.width, self.height);
        let samples = self.samples.clone();
        let image = if self.channels == 4 {
            ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, samples)
                .map(DynamicImage::ImageRgba8)
        } else {
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, samples)
                .map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| {
            ImageError::Unsupported(format!(
                "{} samples do not fill a {width}x{height}x{} image",
                self.samples.len(),
                self.channels
            ))
        })
    }

    /// Writes the carrier to `path` in the given format.
    ///
    /// PNG output uses fast compression; JPEG drops any alpha channel.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: SaveFormat) -> Result<(), ImageError> {
        let file = File::create(path.as_ref()).map_err(|e| ImageError::Save(e.to_string()))?;
        let writer = BufWriter::new(file);

        let result = match format {
            SaveFormat::Png => {
                let color = if self.channels == 4 {
                    ExtendedColorType::Rgba8
                } else {
                    ExtendedColorType::Rgb8
                };
                PngEncoder::new_with_quality(writer, CompressionType::Fast, FilterType::Adaptive)
                    .write_image(&self.samples, self.width, self.height, color)
            }
            SaveFormat::Jpeg { quality } => {
                let rgb = self.to_image()?.to_rgb8();
                JpegEncoder::new_with_quality(writer, quality).write_image(
                    rgb.as_raw(),
                    self.width,
                    self.height,
                    ExtendedColorType::Rgb8,
                )
            }
        };

        result.map_err(|e| ImageError::Save(e.to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel rows.
    pub fn rows(&self) -> usize {
        self.height as usize
    }

    /// Pixel columns.
    pub fn cols(&self) -> usize {
        self.width as usize
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns one sample.
    pub fn sample(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.samples[self.index(row, col, channel)]
    }

    /// Overwrites one sample.
    pub fn set_sample(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        let idx = self.index(row, col, channel);
        self.samples[idx] = value;
    }

    /// All samples in raster order.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Mutable access to all samples in raster order.
    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    fn index(&self, row: usize, col: usize, channel: usize) -> usize {
        debug_assert!(row < self.rows() && col < self.cols() && channel < self.channels);
        (row * self.cols() + col) * self.channels + channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 3) as u8, (y * 5) as u8, ((x + y) * 7) as u8])
        }))
    }

    #[test]
    fn test_from_image_rgb() {
        let carrier = Carrier::from_image(gradient(10, 6));
        assert_eq!(carrier.cols(), 10);
        assert_eq!(carrier.rows(), 6);
        assert_eq!(carrier.channels(), 3);
        assert_eq!(carrier.samples().len(), 180);
        assert_eq!(carrier.sample(2, 4, 0), 12);
        assert_eq!(carrier.sample(2, 4, 1), 10);
    }

    #[test]
    fn test_grayscale_is_widened() {
        let gray = GrayImage::from_pixel(4, 4, Luma([77]));
        let carrier = Carrier::from_image(DynamicImage::ImageLuma8(gray));
        assert_eq!(carrier.channels(), 3);
        assert!(carrier.samples().iter().all(|&s| s == 77));
    }

    #[test]
    fn test_alpha_is_kept() {
        let img = ImageBuffer::from_pixel(3, 3, Rgba([1u8, 2, 3, 4]));
        let carrier = Carrier::from_image(DynamicImage::ImageRgba8(img));
        assert_eq!(carrier.channels(), 4);
        assert_eq!(carrier.sample(1, 1, 3), 4);
        assert_eq!(carrier.to_image().unwrap().get_pixel(1, 1), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        assert!(matches!(
            Carrier::new(2, 2, 2, vec![0; 8]),
            Err(ImageError::Unsupported(_))
        ));
        assert!(matches!(
            Carrier::new(2, 2, 3, vec![0; 11]),
            Err(ImageError::Unsupported(_))
        ));
        assert!(Carrier::new(2, 2, 3, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_set_sample() {
        let mut carrier = Carrier::new(2, 2, 3, vec![0; 12]).unwrap();
        carrier.set_sample(1, 0, 2, 200);
        assert_eq!(carrier.samples()[8], 200);
    }

    #[test]
    fn test_png_save_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrier.png");
        let carrier = Carrier::from_image(gradient(17, 9));

        carrier.save(&path, SaveFormat::Png).unwrap();
        let reloaded = Carrier::open(&path).unwrap();

        assert_eq!(reloaded, carrier);
    }

    #[test]
    fn test_jpeg_save_keeps_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrier.jpg");
        let carrier = Carrier::from_image(gradient(16, 16));

        carrier.save(&path, SaveFormat::Jpeg { quality: 90 }).unwrap();
        let reloaded = Carrier::open(&path).unwrap();

        assert_eq!(reloaded.cols(), 16);
        assert_eq!(reloaded.rows(), 16);
        assert_eq!(reloaded.channels(), 3);
    }

    #[test]
    fn test_jpeg_save_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.jpg");
        let img = ImageBuffer::from_pixel(16, 16, Rgba([90u8, 120, 150, 30]));
        let carrier = Carrier::from_image(DynamicImage::ImageRgba8(img));

        carrier.save(&path, SaveFormat::Jpeg { quality: 100 }).unwrap();
        let reloaded = Carrier::open(&path).unwrap();
        assert_eq!(reloaded.channels(), 3);
        assert!(reloaded.sample(8, 8, 2).abs_diff(150) <= 2);
    }

    #[test]
    fn test_to_image_matches_geometry() {
        let carrier = Carrier::from_image(gradient(5, 3));
        let image = carrier.to_image().unwrap();
        assert_eq!((image.width(), image.height()), (5, 3));
        assert_eq!(image.to_rgb8().into_raw(), carrier.samples());
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            Carrier::open("/nonexistent/carrier.png"),
            Err(ImageError::Load(_))
        ));
    }

    #[test]
    fn test_save_format_extension() {
        assert_eq!(SaveFormat::Png.extension(), "png");
        assert_eq!(SaveFormat::Jpeg { quality: 80 }.extension(), "jpg");
    }
}
