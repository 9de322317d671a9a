use egui::{Color32, Pos2, Rect, Sense, Stroke, TextureHandle, pos2, vec2};
use rfd::FileDialog;

use crate::api::Artifact;
use crate::app::controller::PageController;
use crate::app::state::ViewMode;
use crate::app::views::View;
use crate::app::views::texture::TextureSlot;
use crate::i18n::TextKey;

const IMAGE_HEIGHT: f32 = 360.0;

/// Results section: original and depth images, depth metrics, downloads.
pub struct ResultsView {
    original: TextureSlot,
    depth: TextureSlot,
}

impl ResultsView {
    pub fn new() -> Self {
        Self {
            original: TextureSlot::new("original"),
            depth: TextureSlot::new("depth"),
        }
    }
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for ResultsView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut PageController) {
        let state = controller.state();
        let Some(result) = state.result() else {
            return;
        };

        let revision = state.result_revision();
        let original = self.original.sync(
            ui.ctx(),
            revision,
            state.result_source().map(|source| &source.bytes()[..]),
        );
        let depth = self.depth.sync(ui.ctx(), revision, Some(&result.depth_image[..]));

        let mut view_mode = state.view_mode();
        let mut split = state.slider_split();
        let mut save: Option<(Artifact, String)> = None;

        ui.separator();
        ui.horizontal(|ui| {
            ui.heading(state.text(TextKey::Results));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.selectable_value(&mut view_mode, ViewMode::DepthOnly, state.text(TextKey::ViewDepth));
                ui.selectable_value(&mut view_mode, ViewMode::Slider, state.text(TextKey::ViewSlider));
                ui.selectable_value(&mut view_mode, ViewMode::SideBySide, state.text(TextKey::ViewSide));
            });
        });

        match view_mode {
            ViewMode::SideBySide => {
                ui.columns(2, |columns| {
                    captioned(&mut columns[0], state.text(TextKey::Original), original);
                    captioned(&mut columns[1], state.text(TextKey::DepthMap), depth);
                });
            }
            ViewMode::Slider => {
                if let (Some(original), Some(depth)) = (original, depth) {
                    split = comparison_slider(ui, original, depth, split);
                } else {
                    captioned(ui, state.text(TextKey::DepthMap), depth);
                }
            }
            ViewMode::DepthOnly => captioned(ui, state.text(TextKey::DepthMap), depth),
        }

        ui.add_space(8.0);
        egui::Grid::new("depth_metrics")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                let rows = [
                    (TextKey::MinDepth, format!("{} m", result.min_depth_label())),
                    (TextKey::MaxDepth, format!("{} m", result.max_depth_label())),
                    (TextKey::MeanDepth, format!("{} m", result.mean_depth_label())),
                    (TextKey::Focal, result.focal_length_display()),
                    (TextKey::InferTime, format!("{} s", state.inference_time_label())),
                    (TextKey::ImgSize, result.image_size_label().to_string()),
                    (TextKey::Colormap, result.colormap.to_string()),
                ];
                for (key, value) in rows {
                    ui.label(state.text(key));
                    ui.strong(value);
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(state.text(TextKey::Downloads));
            for (artifact, link) in result.downloads() {
                if ui.button(artifact.label()).on_hover_text(link).clicked() {
                    save = Some((artifact, link.to_string()));
                }
            }
        });
        if let Some(notice) = state.notice() {
            ui.small(notice);
        }

        let suggested = save
            .as_ref()
            .map(|(artifact, _)| result.suggested_file_name(*artifact, chrono::Local::now()));

        controller.set_view_mode(view_mode);
        controller.set_slider_split(split);
        if let (Some((_, link)), Some(suggested)) = (save, suggested) {
            if let Some(target) = FileDialog::new().set_file_name(suggested).save_file() {
                controller.save_artifact(link, target);
            }
        }
    }
}

fn captioned(ui: &mut egui::Ui, caption: &str, texture: Option<&TextureHandle>) {
    ui.vertical_centered(|ui| {
        ui.label(caption);
        match texture {
            Some(texture) => {
                ui.add(egui::Image::new(texture).max_height(IMAGE_HEIGHT));
            }
            None => {
                ui.label("-");
            }
        }
    });
}

/// Original on the left of the split, depth map on the right. Dragging moves
/// the split. Returns the new split fraction.
fn comparison_slider(
    ui: &mut egui::Ui,
    original: &TextureHandle,
    depth: &TextureHandle,
    split: f32,
) -> f32 {
    let [width, height] = depth.size();
    let scale = (IMAGE_HEIGHT / height as f32).min(ui.available_width() / width as f32);
    let size = vec2(width as f32 * scale, height as f32 * scale);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

    let split = match response.interact_pointer_pos() {
        Some(pointer) => ((pointer.x - rect.left()) / rect.width()).clamp(0.0, 1.0),
        None => split,
    };
    let split_x = rect.left() + rect.width() * split;

    let painter = ui.painter_at(rect);
    let full_uv = Rect::from_min_max(Pos2::ZERO, pos2(1.0, 1.0));
    painter.image(depth.id(), rect, full_uv, Color32::WHITE);
    painter.image(
        original.id(),
        Rect::from_min_max(rect.min, pos2(split_x, rect.bottom())),
        Rect::from_min_max(Pos2::ZERO, pos2(split, 1.0)),
        Color32::WHITE,
    );
    painter.vline(split_x, rect.y_range(), Stroke::new(2.0, Color32::WHITE));
    split
}
