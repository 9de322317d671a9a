pub mod colormap;
pub mod media;

pub use colormap::Colormap;
pub use media::SelectedImage;
