use crate::ops::presentation::{ControlAction, PresentationController};
use crate::playback::transport::Transport;
use crate::types::playback_state::SessionState;
use crate::ui::carousel::cover_uri;
use eframe::egui;
use std::path::Path;

const COVER_SIZE: f32 = 48.0;
const PROGRESS_HEIGHT: f32 = 6.0;

/// The control surface. Rendered either inline (docked) or in a floating area.
pub struct PlayerBar<'a, T: Transport> {
    controller: &'a PresentationController<T>,
    base_dir: &'a Path,
}

impl<'a, T: Transport> PlayerBar<'a, T> {
    pub fn new(controller: &'a PresentationController<T>, base_dir: &'a Path) -> Self {
        Self {
            controller,
            base_dir,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<ControlAction> {
        let mut actions = Vec::new();
        let state = self.controller.playback_state();
        let track = self.controller.current_track();
        let enabled = self.controller.controls_enabled();

        ui.horizontal(|ui| {
            if let Some(uri) = cover_uri(track, self.base_dir) {
                ui.add(egui::Image::new(uri).fit_to_exact_size(egui::vec2(COVER_SIZE, COVER_SIZE)));
            }

            ui.vertical(|ui| {
                ui.label(egui::RichText::new(&track.title).strong());
                ui.label(egui::RichText::new(&track.artist).weak());
            });

            ui.separator();

            if ui.button("⏮").clicked() {
                actions.push(ControlAction::Previous);
            }
            let play_label = if state.is_playing { "⏸" } else { "▶" };
            if ui.add_enabled(enabled, egui::Button::new(play_label)).clicked() {
                actions.push(ControlAction::TogglePlay);
            }
            if ui.button("⏭").clicked() {
                actions.push(ControlAction::Next);
            }

            ui.vertical(|ui| {
                if let Some(fraction) = progress_bar(ui, self.controller.progress_fraction(), enabled)
                {
                    actions.push(ControlAction::Seek(fraction));
                }
                ui.label(format!("{} / {}", state.elapsed_label(), state.duration_label()));
            });

            let mut volume = state.volume;
            let slider = egui::Slider::new(&mut volume, 0.0..=1.0)
                .show_value(false)
                .text("🔊");
            if ui.add(slider).changed() {
                actions.push(ControlAction::SetVolume(volume));
            }

            status_dot(ui, self.controller.session_state());
        });

        if let Some(error) = self.controller.track_error() {
            ui.colored_label(egui::Color32::LIGHT_RED, error);
        } else if self.controller.blocked() {
            ui.colored_label(egui::Color32::YELLOW, "Press play to start the audio");
        }
        actions
    }
}

/// Clickable progress bar. Returns the fraction the user clicked or dragged to.
fn progress_bar(ui: &mut egui::Ui, fraction: f64, enabled: bool) -> Option<f64> {
    let desired = egui::vec2(ui.available_width().clamp(120.0, 320.0), PROGRESS_HEIGHT);
    let sense = if enabled {
        egui::Sense::click_and_drag()
    } else {
        egui::Sense::hover()
    };
    let (rect, response) = ui.allocate_exact_size(desired, sense);
    let painter = ui.painter();
    painter.rect_filled(rect, 3.0, egui::Color32::from_gray(60));
    let filled = egui::Rect::from_min_size(
        rect.min,
        egui::vec2(rect.width() * fraction.clamp(0.0, 1.0) as f32, rect.height()),
    );
    painter.rect_filled(filled, 3.0, egui::Color32::from_rgb(100, 180, 255));

    if response.clicked() || response.dragged() {
        if let Some(pointer_pos) = response.interact_pointer_pos() {
            let local_x = (pointer_pos.x - rect.left()).clamp(0.0, rect.width());
            return Some((local_x / rect.width().max(1.0)) as f64);
        }
    }
    None
}

fn status_dot(ui: &mut egui::Ui, state: SessionState) {
    let color = match state {
        SessionState::Playing => egui::Color32::GREEN,
        SessionState::Loading | SessionState::Ready => egui::Color32::YELLOW,
        SessionState::Failed => egui::Color32::RED,
        _ => egui::Color32::GRAY,
    };
    let (rect, response) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, color);
    response.on_hover_text(state.to_string());
}
