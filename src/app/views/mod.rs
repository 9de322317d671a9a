pub mod params_view;
pub mod results_view;
pub mod status_view;
pub mod texture;
pub mod upload_view;

pub use params_view::ParamsView;
pub use results_view::ResultsView;
pub use status_view::StatusView;
pub use upload_view::UploadView;

use crate::app::controller::PageController;

/// A panel of the page. Views read the controller's state and call its
/// handlers; they never mutate state directly.
pub trait View {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut PageController);
}
