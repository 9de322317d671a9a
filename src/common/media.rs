use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Returns the media type for a file name, based on its extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        // Not decodable by the image crate, but accepted by the depth service.
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        other => ImageFormat::from_extension(other).map(|format| format.to_mime_type()),
    }
}

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// The one image the user has picked, held in memory until it is replaced or cleared.
#[derive(Clone, Debug)]
pub struct SelectedImage {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl SelectedImage {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Builds a selection from a file on disk. The media type is guessed from the
    /// extension and falls back to `application/octet-stream`.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let media_type = media_type_for_path(path).unwrap_or("application/octet-stream");
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }

    pub fn size_mib(&self) -> f64 {
        self.bytes.len() as f64 / BYTES_PER_MIB
    }

    /// Label shown under the preview, e.g. `room.jpg (1.50 MB)`.
    pub fn info_label(&self) -> String {
        format!("{} ({:.2} MB)", self.name, self.size_mib())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_for_common_extensions() {
        assert_eq!(media_type_for_path(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(media_type_for_path(Path::new("a.png")), Some("image/png"));
        assert_eq!(media_type_for_path(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(media_type_for_path(Path::new("a.heic")), Some("image/heic"));
        assert_eq!(media_type_for_path(Path::new("notes.txt")), None);
        assert_eq!(media_type_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_info_label_reports_mib() {
        let image = SelectedImage::new("room.jpg", "image/jpeg", vec![0u8; 1024 * 1024 * 3 / 2]);
        assert_eq!(image.info_label(), "room.jpg (1.50 MB)");
    }

    #[test]
    fn test_non_image_media_type() {
        let file = SelectedImage::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(!file.is_image());
    }

    #[test]
    fn test_cloning_selection_shares_bytes() {
        let first = SelectedImage::new("a.png", "image/png", vec![1, 2, 3]);
        let second = first.clone();
        assert!(Arc::ptr_eq(first.bytes(), second.bytes()));
    }
}
