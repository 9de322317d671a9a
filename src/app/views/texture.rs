use egui::{ColorImage, TextureHandle, TextureOptions};
use tracing::warn;

/// Decodes an encoded image (JPEG, PNG, WebP, ...) into an egui image.
pub fn decode_color_image(bytes: &[u8]) -> Result<ColorImage, image::ImageError> {
    let image = image::load_from_memory(bytes)?.to_rgb8();
    Ok(ColorImage::from_rgb(
        [image.width() as usize, image.height() as usize],
        image.as_raw().as_slice(),
    ))
}

/// One texture, re-uploaded only when the revision it was built from changes.
pub struct TextureSlot {
    name: &'static str,
    revision: Option<u64>,
    texture: Option<TextureHandle>,
}

impl TextureSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            revision: None,
            texture: None,
        }
    }

    /// Returns the texture for `revision`, decoding `bytes` if the slot is stale.
    /// Undecodable images (e.g. HEIC) leave the slot empty.
    pub fn sync(
        &mut self,
        ctx: &egui::Context,
        revision: u64,
        bytes: Option<&[u8]>,
    ) -> Option<&TextureHandle> {
        if self.revision != Some(revision) {
            self.revision = Some(revision);
            self.texture = bytes.and_then(|bytes| match decode_color_image(bytes) {
                Ok(image) => Some(ctx.load_texture(self.name, image, TextureOptions::LINEAR)),
                Err(e) => {
                    warn!("Cannot preview {}: {}", self.name, e);
                    None
                }
            });
        }
        self.texture.as_ref()
    }
}
