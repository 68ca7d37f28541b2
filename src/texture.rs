use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FALLBACK_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureKind {
    #[default]
    Wood,
    Earth,
    Metal,
}

impl TextureKind {
    pub const ALL: [TextureKind; 3] = [TextureKind::Wood, TextureKind::Earth, TextureKind::Metal];

    pub fn label(self) -> &'static str {
        match self {
            TextureKind::Wood => "Wood",
            TextureKind::Earth => "Earth",
            TextureKind::Metal => "Metal",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TextureKind::Wood => "Wood.jpg",
            TextureKind::Earth => "Earth.jpg",
            TextureKind::Metal => "Metal.png",
        }
    }
}

/// Resolves texture selections to RGBA images, reading from an asset
/// directory and falling back to generated patterns.
#[derive(Debug, Clone)]
pub struct TextureLibrary {
    asset_dir: PathBuf,
}

impl TextureLibrary {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn path_for(&self, kind: TextureKind) -> PathBuf {
        self.asset_dir.join(kind.file_name())
    }

    pub fn try_load(&self, kind: TextureKind) -> Result<RgbaImage, TextureError> {
        let path = self.path_for(kind);
        let image = image::open(&path).map_err(|source| TextureError::Load { path, source })?;
        Ok(image.to_rgba8())
    }

    pub fn load(&self, kind: TextureKind) -> RgbaImage {
        match self.try_load(kind) {
            Ok(image) => {
                log::info!(
                    "[texture] loaded {} ({}x{})",
                    kind.label(),
                    image.width(),
                    image.height()
                );
                image
            }
            Err(err) => {
                log::warn!("[texture] {err}; using generated {} pattern", kind.label());
                generated(kind, FALLBACK_SIZE)
            }
        }
    }
}

impl Default for TextureLibrary {
    fn default() -> Self {
        Self::new("image")
    }
}

pub fn generated(kind: TextureKind, size: u32) -> RgbaImage {
    let size = size.max(1);
    let scale = 1.0 / size as f32;
    RgbaImage::from_fn(size, size, |x, y| {
        let u = x as f32 * scale;
        let v = y as f32 * scale;
        match kind {
            TextureKind::Wood => wood(u, v),
            TextureKind::Earth => earth(u, v),
            TextureKind::Metal => metal(x, y, v),
        }
    })
}

fn wood(u: f32, v: f32) -> Rgba<u8> {
    let du = u - 0.5;
    let dv = (v - 0.5) * 0.3;
    let rings = ((du * du + dv * dv).sqrt() * 48.0 + (v * 9.0).sin() * 1.5).sin();
    let t = rings * 0.5 + 0.5;
    shade([0.45, 0.27, 0.12], [0.72, 0.50, 0.28], t)
}

fn earth(u: f32, v: f32) -> Rgba<u8> {
    let tau = std::f32::consts::TAU;
    let land = (u * tau * 3.0).sin() * (v * tau * 2.0).cos()
        + (u * tau * 7.0 + v * 5.0).sin() * 0.4;
    if land > 0.35 {
        shade([0.16, 0.45, 0.16], [0.55, 0.48, 0.28], (land - 0.35).min(1.0))
    } else {
        shade([0.03, 0.12, 0.42], [0.10, 0.35, 0.70], (land + 1.4) / 1.75)
    }
}

fn metal(x: u32, y: u32, v: f32) -> Rgba<u8> {
    // brushed along x: noise varies per row only, with a faint per-pixel grain
    let streak = hash(y) as f32 / u32::MAX as f32;
    let grain = hash(x.wrapping_mul(31).wrapping_add(y)) as f32 / u32::MAX as f32;
    let t = 0.55 + streak * 0.3 + grain * 0.05 + (v * 6.0).sin() * 0.05;
    shade([0.35, 0.36, 0.38], [0.85, 0.86, 0.88], t)
}

fn shade(from: [f32; 3], to: [f32; 3], t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |i: usize| ((from[i] + (to[i] - from[i]) * t) * 255.0).round() as u8;
    Rgba([channel(0), channel(1), channel(2), 255])
}

fn hash(mut value: u32) -> u32 {
    value ^= value >> 16;
    value = value.wrapping_mul(0x7feb_352d);
    value ^= value >> 15;
    value = value.wrapping_mul(0x846c_a68b);
    value ^ (value >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_match_selector() {
        let names: Vec<_> = TextureKind::ALL.iter().map(|kind| kind.file_name()).collect();
        assert_eq!(names, vec!["Wood.jpg", "Earth.jpg", "Metal.png"]);
    }

    #[test]
    fn missing_file_falls_back_to_pattern() {
        let dir = tempfile::tempdir().expect("temp dir");
        let library = TextureLibrary::new(dir.path());

        assert!(library.try_load(TextureKind::Earth).is_err());
        let image = library.load(TextureKind::Earth);
        assert_eq!(image.dimensions(), (FALLBACK_SIZE, FALLBACK_SIZE));
    }

    #[test]
    fn loads_image_from_asset_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = RgbaImage::from_fn(4, 2, |x, _| Rgba([x as u8 * 60, 0, 0, 255]));
        source
            .save(dir.path().join("Metal.png"))
            .expect("write png fixture");

        let library = TextureLibrary::new(dir.path());
        let image = library.try_load(TextureKind::Metal).expect("png loads");
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(3, 1), &Rgba([180, 0, 0, 255]));
    }

    #[test]
    fn generated_patterns_are_opaque_and_distinct() {
        let wood = generated(TextureKind::Wood, 32);
        let earth = generated(TextureKind::Earth, 32);
        let metal = generated(TextureKind::Metal, 32);
        assert!(wood.pixels().all(|p| p.0[3] == 255));
        assert_ne!(wood, earth);
        assert_ne!(earth, metal);
    }
}
