use std::path::Path;

use egui::{Color32, DroppedFile, RichText, Stroke, vec2};
use rfd::FileDialog;
use tracing::warn;

use crate::app::controller::PageController;
use crate::app::views::View;
use crate::app::views::texture::TextureSlot;
use crate::common::SelectedImage;
use crate::common::media::media_type_for_path;
use crate::i18n::TextKey;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff", "heic", "heif"];
const ERROR_TINT: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
const PREVIEW_HEIGHT: f32 = 260.0;

/// Builds a selection from a file dropped on the window. Drops that carry
/// neither bytes nor a path yield `None`.
pub fn selected_from_drop(file: &DroppedFile) -> Option<SelectedImage> {
    if let Some(bytes) = &file.bytes {
        let media_type = if file.mime.is_empty() {
            media_type_for_path(Path::new(&file.name))
                .unwrap_or("application/octet-stream")
                .to_string()
        } else {
            file.mime.clone()
        };
        return Some(SelectedImage::new(file.name.clone(), media_type, bytes.to_vec()));
    }

    let path = file.path.as_ref()?;
    match SelectedImage::from_path(path) {
        Ok(selected) => Some(selected),
        Err(e) => {
            warn!("Failed to read dropped file {}: {}", path.display(), e);
            None
        }
    }
}

/// Drop zone, preview, submit button and progress bar.
pub struct UploadView {
    preview: TextureSlot,
}

impl UploadView {
    pub fn new() -> Self {
        Self {
            preview: TextureSlot::new("preview"),
        }
    }
}

impl Default for UploadView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for UploadView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut PageController) {
        let (hovering, dropped) = ui.ctx().input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.first().cloned(),
            )
        });
        if let Some(selected) = dropped.as_ref().and_then(selected_from_drop) {
            controller.select_file(selected);
        }

        let state = controller.state();
        let stroke = if hovering {
            Stroke::new(2.0, ui.visuals().selection.bg_fill)
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke
        };

        let mut choose = false;
        let mut clear = false;

        let preview = self.preview.sync(
            ui.ctx(),
            state.preview_revision(),
            state.selected().map(|selected| &selected.bytes()[..]),
        );

        egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                match (state.selected(), preview) {
                    (Some(_), Some(texture)) => {
                        ui.add(egui::Image::new(texture).max_height(PREVIEW_HEIGHT));
                    }
                    (Some(_), None) => {
                        ui.add_space(PREVIEW_HEIGHT / 2.0);
                    }
                    (None, _) => {
                        ui.add_space(40.0);
                        ui.label(RichText::new(state.text(TextKey::DropHint)).size(16.0));
                        ui.add_space(8.0);
                        choose = ui.button(state.text(TextKey::ChooseFile)).clicked();
                        ui.add_space(40.0);
                    }
                }

                if state.selected().is_some() {
                    ui.label(state.file_info_label());
                    ui.horizontal(|ui| {
                        choose = ui.button(state.text(TextKey::ChooseFile)).clicked();
                        clear = ui.button(state.text(TextKey::Clear)).clicked();
                    });
                }
            });
        });

        ui.add_space(8.0);
        let label = if state.is_busy() {
            state.text(TextKey::Processing)
        } else {
            state.text(TextKey::Process)
        };
        let process = ui
            .add_enabled(
                state.can_submit(),
                egui::Button::new(RichText::new(label).size(16.0)).min_size(vec2(160.0, 32.0)),
            )
            .clicked();

        if let Some(text) = state.progress_text() {
            let mut bar = egui::ProgressBar::new(state.progress_fill()).text(text);
            if state.progress_tinted() {
                bar = bar.fill(ERROR_TINT);
            }
            ui.add(bar);
        }

        if choose {
            if let Some(path) = FileDialog::new()
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file()
            {
                controller.select_path(&path);
            }
        }
        if clear {
            controller.clear_image();
        }
        if process {
            controller.submit();
        }
    }
}
