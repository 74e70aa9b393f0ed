//! Background normalizer
//!
//! Loads an arbitrarily-sized letterhead image and re-projects it onto a
//! fixed A4 reference canvas (1240×1754, ~150 DPI) using one of three fit
//! strategies. The async file read here is the engine's only suspension
//! point; callers treat a failure as "no background" rather than a fatal
//! render error.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference canvas width in pixels (A4 at ~150 DPI)
pub const A4_CANVAS_W: u32 = 1240;
/// Reference canvas height in pixels (A4 at ~150 DPI)
pub const A4_CANVAS_H: u32 = 1754;

/// How a source image of arbitrary aspect ratio maps onto the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Stretch to exactly cover the canvas, ignoring aspect ratio. This
    /// matches the full-bleed placement the page renderer uses.
    #[default]
    Fill,
    /// Uniform scale so the whole source fits, centered, letterboxed
    Contain,
    /// Uniform scale so the source fully covers the canvas, centered,
    /// cropping overflow
    Cover,
}

/// Destination rectangle for the projected source, in canvas pixels.
/// `x`/`y` can be negative for `Cover` (the overflow is cropped).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

/// Compute where a `src_w`×`src_h` source lands on a `dst_w`×`dst_h`
/// canvas under the given fit strategy.
pub fn compute_fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, mode: FitMode) -> FitRect {
    if mode == FitMode::Fill {
        return FitRect { x: 0, y: 0, w: dst_w, h: dst_h };
    }

    let rx = dst_w as f64 / src_w as f64;
    let ry = dst_h as f64 / src_h as f64;
    let scale = match mode {
        FitMode::Contain => rx.min(ry),
        FitMode::Cover => rx.max(ry),
        FitMode::Fill => unreachable!(),
    };

    let w = (src_w as f64 * scale).round() as u32;
    let h = (src_h as f64 * scale).round() as u32;
    FitRect {
        x: (dst_w as i64 - w as i64) / 2,
        y: (dst_h as i64 - h as i64) / 2,
        w,
        h,
    }
}

/// Load the letterhead from disk and normalize it onto the A4 canvas.
///
/// The returned image is always exactly [`A4_CANVAS_W`]×[`A4_CANVAS_H`];
/// areas the source does not reach stay transparent.
pub async fn load_normalized(path: &Path, fit: FitMode) -> Result<DynamicImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Letterhead(format!("{}: {e}", path.display())))?;
    let source = image::load_from_memory(&bytes)
        .map_err(|e| Error::Letterhead(format!("{}: {e}", path.display())))?;
    Ok(normalize(&source, fit))
}

/// Project an already-decoded source onto the reference canvas.
pub fn normalize(source: &DynamicImage, fit: FitMode) -> DynamicImage {
    let (sw, sh) = source.dimensions();
    let rect = compute_fit(sw, sh, A4_CANVAS_W, A4_CANVAS_H, fit);

    let mut canvas = RgbaImage::new(A4_CANVAS_W, A4_CANVAS_H);
    let resized = image::imageops::resize(source, rect.w, rect.h, FilterType::Lanczos3);
    image::imageops::overlay(&mut canvas, &resized, rect.x, rect.y);
    DynamicImage::ImageRgba8(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_always_matches_the_canvas_exactly() {
        // Regardless of source aspect ratio.
        for (sw, sh) in [(3000, 2000), (100, 4000), (1240, 1754)] {
            let r = compute_fit(sw, sh, A4_CANVAS_W, A4_CANVAS_H, FitMode::Fill);
            assert_eq!(r, FitRect { x: 0, y: 0, w: A4_CANVAS_W, h: A4_CANVAS_H });
        }
    }

    #[test]
    fn contain_letterboxes_a_wide_source_centered() {
        // 3000x2000 into 1240x1754: limited by width.
        let r = compute_fit(3000, 2000, A4_CANVAS_W, A4_CANVAS_H, FitMode::Contain);
        assert_eq!(r.w, A4_CANVAS_W);
        assert_eq!(r.h, 827); // 2000 * (1240/3000), rounded
        assert_eq!(r.x, 0);
        assert_eq!(r.y, (A4_CANVAS_H as i64 - 827) / 2);
    }

    #[test]
    fn cover_crops_a_wide_source_centered() {
        let r = compute_fit(3000, 2000, A4_CANVAS_W, A4_CANVAS_H, FitMode::Cover);
        assert_eq!(r.h, A4_CANVAS_H);
        assert_eq!(r.w, 2631); // 3000 * (1754/2000), rounded
        assert!(r.x < 0);
        assert_eq!(r.y, 0);
    }

    #[test]
    fn normalize_output_is_always_canvas_sized() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            64,
            48,
            image::Rgba([200, 10, 10, 255]),
        ));
        for mode in [FitMode::Fill, FitMode::Contain, FitMode::Cover] {
            let out = normalize(&source, mode);
            assert_eq!(out.dimensions(), (A4_CANVAS_W, A4_CANVAS_H));
        }
    }

    #[tokio::test]
    async fn load_normalized_reads_and_projects_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letterhead.png");
        let source = RgbaImage::from_pixel(320, 240, image::Rgba([0, 0, 255, 255]));
        source.save(&path).unwrap();

        let out = load_normalized(&path, FitMode::Fill).await.unwrap();
        assert_eq!(out.dimensions(), (A4_CANVAS_W, A4_CANVAS_H));
    }

    #[tokio::test]
    async fn load_normalized_missing_file_is_a_letterhead_error() {
        let err = load_normalized(Path::new("/nonexistent/letterhead.png"), FitMode::Fill)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Letterhead(_)));
    }
}
