use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Longest edge handed to the recognizer; receipt photos from phones are
/// routinely 4000px+ tall.
pub const MAX_EDGE: u32 = 2400;
/// Anything smaller cannot hold a legible receipt line.
pub const MIN_EDGE: u32 = 32;
/// Share of darkest/brightest pixels ignored when stretching contrast, so
/// specks on thermal paper do not pin the range.
const CLIP_FRACTION: f32 = 0.01;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Image is too small to contain a receipt: {width}x{height}")]
    TooSmall { width: u32, height: u32 },
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Decode receipt photo bytes (JPEG / PNG / WEBP / …) and return normalized
/// grayscale PNG bytes for the recognizer.
pub fn prepare_for_recognition(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    if img.width() < MIN_EDGE || img.height() < MIN_EDGE {
        return Err(PreprocessError::TooSmall { width: img.width(), height: img.height() });
    }
    encode_as_png(normalize(img))
}

/// Downscale, grayscale, clipped contrast stretch.
fn normalize(img: DynamicImage) -> DynamicImage {
    let img = if img.width().max(img.height()) > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let gray: GrayImage = img.to_luma8();
    let (low, high) = clipped_range(&gray);
    if high <= low {
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (high - low) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0].clamp(low, high);
        Luma([((p - low) as u32 * 255 / range) as u8])
    });
    DynamicImage::ImageLuma8(stretched)
}

/// Luma bounds after discarding `CLIP_FRACTION` of pixels at each end.
fn clipped_range(gray: &GrayImage) -> (u8, u8) {
    let mut histogram = [0u64; 256];
    for p in gray.pixels() {
        histogram[p[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    let clip = (total as f32 * CLIP_FRACTION) as u64;

    let mut seen = 0u64;
    let low = histogram
        .iter()
        .position(|&n| {
            seen += n;
            seen > clip
        })
        .unwrap_or(0) as u8;

    let mut seen = 0u64;
    let high = 255
        - histogram
            .iter()
            .rev()
            .position(|&n| {
                seen += n;
                seen > clip
            })
            .unwrap_or(0) as u8;

    (low, high)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |_, _| Luma([value])))
    }

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn uniform_image_is_left_alone() {
        let result = normalize(solid_gray(40, 40, 128));
        assert_eq!(result.width(), 40);
        assert!(result.to_luma8().pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn faded_receipt_is_stretched_to_full_range() {
        // Thermal print: grey text on light grey paper.
        let img: GrayImage =
            ImageBuffer::from_fn(100, 100, |x, _| Luma([if x < 50 { 120 } else { 200 }]));
        let gray = normalize(DynamicImage::ImageLuma8(img)).to_luma8();
        assert_eq!(gray.pixels().map(|p| p[0]).min(), Some(0));
        assert_eq!(gray.pixels().map(|p| p[0]).max(), Some(255));
    }

    #[test]
    fn isolated_specks_do_not_pin_the_range() {
        let img: GrayImage = ImageBuffer::from_fn(100, 100, |x, y| {
            if x == 0 && y == 0 {
                Luma([0])
            } else if x < 50 {
                Luma([120])
            } else {
                Luma([200])
            }
        });
        let (low, high) = clipped_range(&img);
        assert_eq!((low, high), (120, 200));
    }

    #[test]
    fn tall_receipt_is_downscaled() {
        let result = normalize(solid_gray(800, 4000, 220));
        assert!(result.height() <= MAX_EDGE);
        assert!(result.width() < 800);
    }

    #[test]
    fn prepare_produces_png() {
        let result = prepare_for_recognition(&png_bytes(&solid_gray(64, 64, 100))).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn tiny_image_rejected() {
        let err = prepare_for_recognition(&png_bytes(&solid_gray(8, 8, 100))).unwrap_err();
        assert!(matches!(err, PreprocessError::TooSmall { width: 8, height: 8 }));
    }

    #[test]
    fn garbage_bytes_rejected() {
        assert!(matches!(prepare_for_recognition(b"not an image"), Err(PreprocessError::Load(_))));
    }
}
