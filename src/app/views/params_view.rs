use egui::{Color32, Mesh, Pos2, Sense, Shape, vec2};

use crate::app::controller::PageController;
use crate::app::state::FocalMode;
use crate::app::views::View;
use crate::common::Colormap;
use crate::i18n::TextKey;

const LEGEND_HEIGHT: f32 = 14.0;

/// Side panel: colormap, focal length, output formats and tips.
#[derive(Default)]
pub struct ParamsView;

impl ParamsView {
    pub fn new() -> Self {
        Self
    }
}

impl View for ParamsView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut PageController) {
        let state = controller.state();
        let mut colormap = state.colormap();
        let mut focal_mode = state.focal_mode();
        let mut focal_input = state.focal_input().to_string();

        ui.heading(state.text(TextKey::Params));
        ui.separator();

        ui.label(state.text(TextKey::Colormap));
        ui.horizontal_wrapped(|ui| {
            for option in Colormap::ALL {
                ui.selectable_value(&mut colormap, option, option.as_str());
            }
        });
        ui.horizontal(|ui| {
            ui.small(state.text(TextKey::Near));
            draw_legend(ui, colormap);
            ui.small(state.text(TextKey::Far));
        });

        ui.add_space(8.0);
        ui.label(state.text(TextKey::FocalInput));
        ui.horizontal(|ui| {
            ui.selectable_value(&mut focal_mode, FocalMode::Auto, state.text(TextKey::FocalAuto));
            ui.selectable_value(
                &mut focal_mode,
                FocalMode::Manual,
                state.text(TextKey::FocalManual),
            );
        });
        if focal_mode == FocalMode::Manual {
            ui.add(
                egui::TextEdit::singleline(&mut focal_input)
                    .hint_text(state.text(TextKey::FocalHint))
                    .desired_width(140.0),
            );
        }

        ui.add_space(8.0);
        ui.label(state.text(TextKey::OutputFormat));
        ui.small("JPG · NPZ · 16-bit PNG");

        ui.add_space(8.0);
        ui.collapsing(state.text(TextKey::TipsTitle), |ui| {
            for tip in [TextKey::Tip1, TextKey::Tip2, TextKey::Tip3, TextKey::Tip4] {
                ui.small(state.text(tip));
            }
        });

        let focal_changed = focal_input != controller.state().focal_input();
        controller.set_colormap(colormap);
        controller.set_focal_mode(focal_mode);
        if focal_changed {
            controller.set_focal_input(focal_input);
        }
    }
}

/// Gradient bar for `colormap`, one mesh quad per pair of stops.
fn draw_legend(ui: &mut egui::Ui, colormap: Colormap) {
    let width = (ui.available_width() - 40.0).max(60.0);
    let (rect, _) = ui.allocate_exact_size(vec2(width, LEGEND_HEIGHT), Sense::hover());

    let stops = colormap.legend_stops();
    let mut mesh = Mesh::default();
    for (i, [r, g, b]) in stops.iter().enumerate() {
        let x = rect.left() + rect.width() * i as f32 / (stops.len() - 1) as f32;
        let color = Color32::from_rgb(*r, *g, *b);
        mesh.colored_vertex(Pos2::new(x, rect.top()), color);
        mesh.colored_vertex(Pos2::new(x, rect.bottom()), color);
        if i > 0 {
            let base = (i as u32 - 1) * 2;
            mesh.add_triangle(base, base + 1, base + 2);
            mesh.add_triangle(base + 1, base + 2, base + 3);
        }
    }
    ui.painter().add(Shape::mesh(mesh));
    ui.painter().rect_stroke(
        rect,
        2.0,
        ui.visuals().widgets.noninteractive.bg_stroke,
        egui::StrokeKind::Inside,
    );
}
