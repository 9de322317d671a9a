use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::info;

use crate::api::HttpDepthApi;
use crate::app::controller::PageController;
use crate::app::preferences::{PreferenceStore, Preferences};
use crate::app::views::{ParamsView, ResultsView, StatusView, UploadView, View};
use crate::config::Settings;
use crate::error::{ApiError, AppError};

const WINDOW_TITLE: &str = "Depth Studio";
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct DepthStudioApp {
    controller: PageController,
    status: StatusView,
    params: ParamsView,
    upload: UploadView,
    results: ResultsView,
}

impl DepthStudioApp {
    pub fn new(controller: PageController) -> Self {
        Self {
            controller,
            status: StatusView::new(),
            params: ParamsView::new(),
            upload: UploadView::new(),
            results: ResultsView::new(),
        }
    }

    /// Builds the HTTP client and controller, starts GPU polling and blocks
    /// on the native window until it closes.
    pub fn start_gui(settings: &Settings) -> Result<(), AppError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(egui::vec2(
                    settings.ui.window_width,
                    settings.ui.window_height,
                ))
                .with_title(WINDOW_TITLE)
                .with_drag_and_drop(true),
            ..Default::default()
        };

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(ApiError::from)?;
        let api = Arc::new(HttpDepthApi::new(
            settings.server.base_url.clone(),
            http_client,
        ));
        info!("Depth service at {}", api.base_url());

        let store = PreferenceStore::new(
            settings
                .storage
                .preferences_path
                .clone()
                .unwrap_or_else(PreferenceStore::default_path),
        );
        let defaults = Preferences {
            locale: settings.ui.default_locale,
            colormap: settings.ui.default_colormap,
        };

        let mut controller = PageController::new(api, store, defaults, Handle::current());
        controller.check_health();
        controller.start_polling(settings.poll_interval());

        eframe::run_native(
            WINDOW_TITLE,
            options,
            Box::new(move |_cc| Ok(Box::new(DepthStudioApp::new(controller)))),
        )
        .map_err(|e| AppError::Ui(e.to_string()))
    }
}

impl eframe::App for DepthStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.pump();

        egui::TopBottomPanel::top("status_panel").show(ctx, |ui| {
            self.status.draw(ui, &mut self.controller);
        });

        egui::SidePanel::left("params_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.params.draw(ui, &mut self.controller);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.upload.draw(ui, &mut self.controller);
                self.results.draw(ui, &mut self.controller);
            });
        });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
