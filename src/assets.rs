//! Embedded sprite assets
//!
//! The two sprites ship inside the binary; a decode failure is a fatal
//! startup error, there is no fallback art.

use anyhow::{Context, Result};
use glam::Vec2;

static BUCKET_PNG: &[u8] = include_bytes!("../assets/bucket.png");
static DROPLET_PNG: &[u8] = include_bytes!("../assets/droplet.png");

/// A decoded RGBA sprite
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteImage {
    /// Sprite size in world units (1 texel = 1 unit)
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn decode(bytes: &[u8], name: &str) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .with_context(|| format!("failed to decode sprite {name}"))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }
}

/// All sprites the game needs
pub struct Assets {
    pub bucket: SpriteImage,
    pub droplet: SpriteImage,
}

impl Assets {
    pub fn load() -> Result<Self> {
        let bucket = SpriteImage::decode(BUCKET_PNG, "bucket.png")?;
        let droplet = SpriteImage::decode(DROPLET_PNG, "droplet.png")?;
        log::info!(
            "loaded sprites: bucket {}x{}, droplet {}x{}",
            bucket.width,
            bucket.height,
            droplet.width,
            droplet.height
        );
        Ok(Self { bucket, droplet })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_sprites_decode() {
        let assets = Assets::load().expect("embedded sprites must decode");
        assert!(assets.bucket.width > 0 && assets.bucket.height > 0);
        assert!(assets.droplet.width > 0 && assets.droplet.height > 0);
        assert_eq!(
            assets.bucket.rgba.len(),
            (assets.bucket.width * assets.bucket.height * 4) as usize
        );
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(SpriteImage::decode(b"not a png", "garbage.png").is_err());
    }
}
