//! Raster-to-PNG helpers running in-process on decoded images.

use super::{Annotation, PipelineError};
use image::{
    DynamicImage, GrayImage, ImageFormat, ImageReader, Rgba, RgbaImage, imageops::FilterType,
};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Edge length of flight thumbnails.
pub const THUMBNAIL_SIZE: u32 = 512;
const COLORBAR_WIDTH: u32 = 48;
const COLORBAR_HEIGHT: u32 = 512;

/// Opens an image by content, not extension; mask sidecars end in `.msk`.
pub fn open_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Temporary sibling used for atomic replacement of `path`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes `image` as PNG next to `path` and renames it into place, so readers
/// only ever see the previous or the complete new file.
pub fn save_png_atomically(image: &DynamicImage, path: &Path) -> Result<(), PipelineError> {
    let tmp = temp_sibling(path);
    image.save_with_format(&tmp, ImageFormat::Png)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Center-fits `source` into a square thumbnail. If a validity mask is given,
/// its first channel, fitted the same way, becomes the alpha channel.
pub fn fit_thumbnail(source: &DynamicImage, mask: Option<&DynamicImage>) -> RgbaImage {
    let mut thumbnail = source
        .resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
        .to_rgba8();
    if let Some(mask) = mask {
        let alpha: GrayImage = mask
            .resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Nearest)
            .to_luma8();
        for (pixel, a) in thumbnail.pixels_mut().zip(alpha.pixels()) {
            pixel[3] = a[0];
        }
    }
    thumbnail
}

/// Ordered color stops over the normalized elevation range `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f64, [u8; 3])>,
}

impl Default for ColorRamp {
    /// Low ground blue, through green and yellow, to red peaks.
    fn default() -> Self {
        Self {
            stops: vec![
                (0.0, [43, 131, 186]),
                (0.25, [171, 221, 164]),
                (0.5, [255, 255, 191]),
                (0.75, [253, 174, 97]),
                (1.0, [215, 25, 28]),
            ],
        }
    }
}

impl ColorRamp {
    /// Color-relief table with percentage stops and a transparent nodata entry.
    pub fn relief_table(&self) -> String {
        let mut table = String::new();
        for (at, [r, g, b]) in &self.stops {
            let _ = writeln!(table, "{}% {r} {g} {b}", at * 100.0);
        }
        table.push_str("nv 0 0 0 0\n");
        table
    }

    /// Linear interpolation between the surrounding stops.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn color_at(&self, at: f64) -> [u8; 3] {
        let at = at.clamp(0.0, 1.0);
        let upper = self.stops.iter().position(|(s, _)| *s >= at).unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return self.stops[0].1;
        }
        let (s0, c0) = self.stops[upper - 1];
        let (s1, c1) = self.stops[upper];
        let t = if s1 > s0 { (at - s0) / (s1 - s0) } else { 0.0 };
        let mix = |i: usize| (f64::from(c0[i]) + (f64::from(c1[i]) - f64::from(c0[i])) * t).round() as u8;
        [mix(0), mix(1), mix(2)]
    }

    /// Vertical legend, highest value on top.
    pub fn colorbar(&self) -> RgbaImage {
        let span = f64::from(COLORBAR_HEIGHT - 1);
        RgbaImage::from_fn(COLORBAR_WIDTH, COLORBAR_HEIGHT, |_, y| {
            let [r, g, b] = self.color_at(1.0 - f64::from(y) / span);
            Rgba([r, g, b, 255])
        })
    }
}

/// Draws every annotation as a filled dot with a white ring.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn draw_annotations(image: &mut RgbaImage, annotations: &[Annotation]) {
    let (width, height) = image.dimensions();
    let radius = (width.min(height) / 80).max(4) as i64;
    for annotation in annotations {
        let (cx, cy) = annotation.pixel(width, height);
        let [r, g, b] = annotation.rgb();
        for dy in -radius - 2..=radius + 2 {
            for dx in -radius - 2..=radius + 2 {
                let (x, y) = (i64::from(cx) + dx, i64::from(cy) + dy);
                if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                    continue;
                }
                let dist2 = dx * dx + dy * dy;
                let color = if dist2 <= radius * radius {
                    Rgba([r, g, b, 255])
                } else if dist2 <= (radius + 2) * (radius + 2) {
                    Rgba([255, 255, 255, 255])
                } else {
                    continue;
                };
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
