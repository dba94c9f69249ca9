//! Logo rasterisation
//!
//! Turns an image file into a `GS v 0` raster block that can be appended
//! to an [`EscPosBuilder`](crate::EscPosBuilder) job.

use crate::error::{PrintError, PrintResult};
use image::GenericImageView;
use std::path::Path;
use tracing::{info, instrument};

/// Process an image file and return ESC/POS raster data
///
/// The image will be:
/// - Resized to `width` dots, keeping the aspect ratio
/// - Converted to 1-bit monochrome (transparent pixels are white)
/// - Encoded as GS v 0 raster graphics, centered, followed by a newline
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn process_logo(path: impl AsRef<Path>, width: u32) -> PrintResult<Vec<u8>> {
    if width == 0 || width > 0xFFFF {
        return Err(PrintError::InvalidConfig(format!(
            "logo width out of range: {}",
            width
        )));
    }

    // Format from the content: staged files carry no extension
    let img = image::ImageReader::open(path.as_ref())
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| PrintError::Image(e.to_string()))?
        .decode()
        .map_err(|e| PrintError::Image(e.to_string()))?;
    let (w, h) = img.dimensions();
    info!(dimensions = ?(w, h), "logo image opened");

    if w == 0 || h == 0 {
        return Err(PrintError::Image("image has no pixels".to_string()));
    }

    let new_w = width;
    let new_h = ((h as f64 * new_w as f64 / w as f64).round() as u32).clamp(1, 0xFFFF);

    let resized = img.resize_exact(new_w, new_h, image::imageops::FilterType::Triangle);
    let rgba = resized.to_rgba8();

    let x_bytes = new_w.div_ceil(8);
    let mut data = Vec::with_capacity(11 + (x_bytes * new_h) as usize);

    // Center align for image
    data.extend_from_slice(&[0x1B, 0x61, 0x01]);

    // GS v 0 m xL xH yL yH
    data.extend_from_slice(&[0x1D, 0x76, 0x30, 0x00]);
    data.push(x_bytes as u8);
    data.push((x_bytes >> 8) as u8);
    data.push(new_h as u8);
    data.push((new_h >> 8) as u8);

    for y in 0..new_h {
        for x_byte in 0..x_bytes {
            let mut byte = 0u8;
            for bit in 0..8 {
                let x = x_byte * 8 + bit;
                if x < new_w {
                    let pixel = rgba.get_pixel(x, y);
                    if pixel[3] >= 128 {
                        let luma = (0.299 * pixel[0] as f32
                            + 0.587 * pixel[1] as f32
                            + 0.114 * pixel[2] as f32) as u8;
                        if luma < 128 {
                            byte |= 1 << (7 - bit);
                        }
                    }
                }
            }
            data.push(byte);
        }
    }

    data.push(0x0A);

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, w: u32, h: u32, px: Rgba<u8>) -> std::path::PathBuf {
        let path = dir.join("logo.png");
        RgbaImage::from_pixel(w, h, px).save(&path).unwrap();
        path
    }

    #[test]
    fn test_resizes_to_width_keeping_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), 100, 50, Rgba([0, 0, 0, 255]));

        let data = process_logo(&path, 200).unwrap();
        // 200 dots = 25 bytes per row, height doubles to 100
        assert_eq!(&data[3..11], &[0x1D, 0x76, 0x30, 0x00, 25, 0, 100, 0]);
        assert_eq!(data.len(), 3 + 8 + 25 * 100 + 1);
        assert!(data[11..data.len() - 1].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_transparent_pixels_are_white() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), 16, 16, Rgba([0, 0, 0, 0]));

        let data = process_logo(&path, 16).unwrap();
        assert!(data[11..data.len() - 1].iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_extensionless_file() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_png(dir.path(), 8, 8, Rgba([0, 0, 0, 255]));
        let staged = dir.path().join("staged");
        std::fs::rename(&png, &staged).unwrap();

        let data = process_logo(&staged, 8).unwrap();
        assert_eq!(&data[3..11], &[0x1D, 0x76, 0x30, 0x00, 1, 0, 8, 0]);
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(process_logo(&path, 200), Err(PrintError::Image(_))));
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            process_logo("missing.png", 0),
            Err(PrintError::InvalidConfig(_))
        ));
    }
}
