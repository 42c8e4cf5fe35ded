//! Equirectangular environment images: Radiance HDR decode plus the
//! procedural gradient the stage renders against until (or instead of) a real
//! panorama arriving.

use std::path::Path;

use glam::Vec3;

use super::AssetError;

/// Row-major RGB float panorama; u wraps in longitude, v spans pole to pole.
pub struct EquirectImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

pub fn load_hdr(path: &Path) -> Result<EquirectImage, AssetError> {
    let image = image::open(path)?.into_rgb32f();
    let (width, height) = (image.width(), image.height());
    log::info!("environment map {}x{} loaded from {}", width, height, path.display());
    Ok(EquirectImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

const SKY_ZENITH: Vec3 = Vec3::new(0.10, 0.16, 0.34);
const SKY_HORIZON: Vec3 = Vec3::new(0.72, 0.60, 0.48);
const GROUND_FLOOR: Vec3 = Vec3::new(0.09, 0.08, 0.08);

/// Small vertical-gradient panorama used before any HDR has loaded.
pub fn gradient_fallback() -> EquirectImage {
    let width = 64u32;
    let height = 32u32;
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        // 0 at the zenith, 1 at the nadir.
        let t = (y as f32 + 0.5) / height as f32;
        let color = if t < 0.5 {
            SKY_ZENITH.lerp(SKY_HORIZON, t * 2.0)
        } else {
            SKY_HORIZON.lerp(GROUND_FLOOR, (t - 0.5) * 2.0)
        };
        for _ in 0..width {
            pixels.extend_from_slice(&[color.x, color.y, color.z]);
        }
    }
    EquirectImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_the_declared_extent() {
        let img = gradient_fallback();
        assert_eq!(img.pixels.len(), (img.width * img.height * 3) as usize);
    }

    #[test]
    fn fallback_is_brightest_at_the_horizon() {
        let img = gradient_fallback();
        let row_luma = |y: u32| {
            let start = (y * img.width * 3) as usize;
            img.pixels[start] + img.pixels[start + 1] + img.pixels[start + 2]
        };
        let horizon = row_luma(img.height / 2);
        assert!(horizon > row_luma(0));
        assert!(horizon > row_luma(img.height - 1));
    }
}
