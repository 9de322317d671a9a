pub mod api;
pub mod app;
pub mod common;
pub mod config;
pub mod error;
pub mod i18n;

pub use error::{ApiError, AppError};

pub use api::{DepthApi, HttpDepthApi};
pub use app::DepthStudioApp;
pub use config::Settings;
