pub mod page_controller;
pub mod ui_update;

pub use page_controller::PageController;
pub use ui_update::UiUpdate;
