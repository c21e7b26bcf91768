use crate::ops::presentation::ControlAction;
use crate::playback::resolver::path_to_file_uri;
use crate::types::track::Track;
use eframe::egui;
use std::path::Path;

const COVER_SIZE: f32 = 140.0;

/// Image URI for a cover reference. Local paths are made absolute against
/// the config directory so the image loaders can read them.
pub fn cover_uri(track: &Track, base_dir: &Path) -> Option<String> {
    let reference = track.cover_reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.contains("://") {
        return Some(reference.to_string());
    }
    path_to_file_uri(&base_dir.join(reference))
}

/// Cover-art selector. Clicking a cover or an arrow selects a track.
pub struct Carousel<'a> {
    tracks: &'a [Track],
    current: usize,
    base_dir: &'a Path,
}

impl<'a> Carousel<'a> {
    pub fn new(tracks: &'a [Track], current: usize, base_dir: &'a Path) -> Self {
        Self {
            tracks,
            current,
            base_dir,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<ControlAction> {
        let mut actions = Vec::new();
        let len = self.tracks.len();

        ui.horizontal(|ui| {
            if ui.add_enabled(len > 1, egui::Button::new("‹")).clicked() {
                actions.push(ControlAction::Select((self.current + len - 1) % len));
            }
            egui::ScrollArea::horizontal()
                .id_salt("cover_carousel")
                .max_width(ui.available_width() - 32.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for (idx, track) in self.tracks.iter().enumerate() {
                            let response = self.cover(ui, track);
                            if idx == self.current {
                                ui.painter().rect_stroke(
                                    response.rect,
                                    6.0,
                                    egui::Stroke::new(3.0, egui::Color32::WHITE),
                                    egui::StrokeKind::Outside,
                                );
                            }
                            if response.clicked() {
                                actions.push(ControlAction::Select(idx));
                            }
                        }
                    });
                });
            if ui.add_enabled(len > 1, egui::Button::new("›")).clicked() {
                actions.push(ControlAction::Select((self.current + 1) % len));
            }
        });

        if let Some(track) = self.tracks.get(self.current) {
            ui.vertical_centered(|ui| {
                let mut capsule = egui::Frame::popup(ui.style());
                capsule.fill = egui::Color32::from_black_alpha(160);
                capsule.show(ui, |ui| {
                    ui.label(egui::RichText::new(track.label()).strong());
                });
            });
        }
        actions
    }

    fn cover(&self, ui: &mut egui::Ui, track: &Track) -> egui::Response {
        let size = egui::vec2(COVER_SIZE, COVER_SIZE);
        match cover_uri(track, self.base_dir) {
            Some(uri) => ui.add(
                egui::Image::new(uri)
                    .fit_to_exact_size(size)
                    .sense(egui::Sense::click()),
            ),
            None => {
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
                ui.painter().rect_filled(rect, 6.0, egui::Color32::DARK_GRAY);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    &track.title,
                    egui::FontId::proportional(14.0),
                    egui::Color32::WHITE,
                );
                response
            }
        }
    }
}
