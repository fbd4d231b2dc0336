//! Interactive progress particle field built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the simulation [`Session`]
//! and a demo progress mapping, and implements [`eframe::App`] to feed
//! pointer/resize/progress input into the session and draw the result.

use eframe::App;
use field_core::builder::ProgressMap;
use field_core::config::SimConfig;
use field_core::palette::{Palette, Rgb};
use field_core::session::Session;
use glam::Vec2;

/// Fixed color for the edges between same-cluster particles.
const EDGE_COLOR: egui::Color32 = egui::Color32::from_rgb(240, 240, 240);

/// Main application state for the interactive field.
///
/// [`Viewer`] glues together:
/// - The simulation core: a [`Session`] owning the particle population.
/// - The progress mapping, editable through sliders (standing in for the
///   external progress data source, which the session polls every frame).
/// - eframe/egui callbacks for input capture and drawing.
///
/// The typical per-frame update is:
/// 1. Render the progress side panel (sliders may mutate the mapping).
/// 2. Capture pointer position, clicks, and the canvas size.
/// 3. Run one [`Session::frame`].
/// 4. Draw edges, then particle bodies, and request the next repaint.
pub struct Viewer {
    session: Session,
    progress: ProgressMap,
    palette: Palette,
}

impl Viewer {
    /// Creates a viewer with the built-in palette and demo progress values.
    pub fn new() -> Self {
        let palette = Palette::default();
        let progress: ProgressMap = [
            ("python1", 18),
            ("python2", 12),
            ("math101", 18),
            ("datascience", 20),
            ("webdev", 10),
            ("algorithms", 15),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            session: Session::new(palette.clone(), SimConfig::default()),
            progress,
            palette,
        }
    }

    fn rgb_to_color32(rgb: Rgb, opacity: f32) -> egui::Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, alpha)
    }

    /// Converts a surface-space position to screen-space.
    fn surface_to_screen(pos: Vec2, rect: egui::Rect) -> egui::Pos2 {
        egui::pos2(rect.min.x + pos.x, rect.min.y + pos.y)
    }

    /// Converts a screen-space position to surface-space.
    fn screen_to_surface(pos: egui::Pos2, rect: egui::Rect) -> Vec2 {
        Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y)
    }

    /// Builds the left-hand progress panel.
    fn ui_progress_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("progress_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Progress");
                ui.separator();
                for (item, value) in self.progress.iter_mut() {
                    ui.horizontal(|ui| {
                        if let Some(family) = self.palette.family_for_item(item) {
                            let tint = family.button;
                            ui.colored_label(
                                egui::Color32::from_rgb(tint.0, tint.1, tint.2),
                                "●",
                            );
                        }
                        ui.add(egui::Slider::new(value, 0..=100).text(item.as_str()));
                    });
                }
            });
    }

    /// Builds the bottom status bar (population size, density scale).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("scale = {:.2}", self.session.scale()));
                ui.separator();
                ui.label(format!("particles = {}", self.session.particles().len()));
            });
        });
    }

    /// Central canvas: input capture, one simulation frame, then drawing.
    fn ui_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::from_rgb(12, 12, 20)))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
                let rect = response.rect;
                let painter = ui.painter_at(rect);

                let pointer = response
                    .hover_pos()
                    .map(|p| Self::screen_to_surface(p, rect));
                let clicked = response.clicked();
                let now = ctx.input(|i| i.time);
                let dims = Vec2::new(rect.width(), rect.height());

                self.session
                    .frame(dims, &self.progress, pointer, clicked, now);

                // Edges first so bodies render on top.
                let particles = self.session.particles();
                for &(a, b) in self.session.edges() {
                    let pa = Self::surface_to_screen(particles.particles[a].pos, rect);
                    let pb = Self::surface_to_screen(particles.particles[b].pos, rect);
                    painter.line_segment([pa, pb], egui::Stroke::new(1.0, EDGE_COLOR));
                }

                for p in &particles.particles {
                    painter.circle_filled(
                        Self::surface_to_screen(p.pos, rect),
                        p.size,
                        Self::rgb_to_color32(p.color, p.opacity),
                    );
                }

                ctx.request_repaint();
            });
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_progress_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_canvas(ctx);
    }
}
