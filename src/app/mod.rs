pub mod controller;
pub mod depth_studio_app;
pub mod poller;
pub mod preferences;
pub mod state;
pub mod views;

pub use depth_studio_app::DepthStudioApp;
