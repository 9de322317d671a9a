use egui::{Color32, RichText, Sense, vec2};

use crate::app::controller::PageController;
use crate::app::views::View;
use crate::i18n::{Locale, TextKey};

const ONLINE: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
const OFFLINE: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

/// Header: title, headline stats, GPU indicator and memory gauge, language.
#[derive(Default)]
pub struct StatusView;

impl StatusView {
    pub fn new() -> Self {
        Self
    }
}

impl View for StatusView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut PageController) {
        let state = controller.state();
        let gpu = state.gpu().clone();
        let mut locale = state.locale();
        let mut release = false;

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading(state.text(TextKey::Title));
                ui.label(state.text(TextKey::Subtitle));
            });

            ui.separator();
            stat(ui, "0.3s", state.text(TextKey::StatSpeed));
            stat(ui, "2.25MP", state.text(TextKey::StatRes));
            stat(ui, &gpu.stat_label, "GPU");
            ui.separator();

            let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
            let color = if gpu.online { ONLINE } else { OFFLINE };
            ui.painter().circle_filled(rect.center(), 5.0, color);
            ui.label(&gpu.name);

            if gpu.online {
                ui.add(
                    egui::ProgressBar::new(gpu.memory_fraction)
                        .desired_width(160.0)
                        .text(gpu.memory_label.clone()),
                );
            }

            ui.label(state.text(TextKey::ModelStatus));
            let badge = if gpu.model_loaded { ONLINE } else { Color32::GRAY };
            ui.label(RichText::new(state.model_status_label()).color(badge).strong());

            release = ui.button(state.text(TextKey::ReleaseGpu)).clicked();

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                egui::ComboBox::from_id_salt("language")
                    .selected_text(locale.display_name())
                    .show_ui(ui, |ui| {
                        for option in Locale::ALL {
                            ui.selectable_value(&mut locale, option, option.display_name());
                        }
                    });
                ui.label(state.text(TextKey::Language));
            });
        });

        controller.change_locale(locale);
        if release {
            controller.offload_gpu();
        }
    }
}

fn stat(ui: &mut egui::Ui, value: &str, caption: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(value).strong().size(18.0));
        ui.small(caption);
    });
}
