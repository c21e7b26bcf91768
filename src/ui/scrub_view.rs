use crate::renderer::frame_store::FrameStore;
use crate::renderer::scrub_renderer::DrawCommand;
use crate::types::experience::RendererConfig;
use eframe::egui;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Uploads scrub frames to the GPU on demand and keeps the most recently
/// shown ones resident.
pub struct ScrubView {
    textures: LruCache<usize, egui::TextureHandle>,
    opacity: f32,
}

impl ScrubView {
    pub fn new(config: &RendererConfig) -> Self {
        let capacity = NonZeroUsize::new(config.texture_cache).unwrap_or(NonZeroUsize::MIN);
        Self {
            textures: LruCache::new(capacity),
            opacity: config.opacity.clamp(0.0, 1.0),
        }
    }

    /// Forget uploaded textures, e.g. after a new store was attached.
    pub fn clear(&mut self) {
        self.textures.clear();
    }

    pub fn paint(
        &mut self,
        ui: &egui::Ui,
        store: &FrameStore,
        draw: DrawCommand,
        surface: egui::Rect,
    ) {
        let Some(texture) = self.texture(ui.ctx(), store, draw.frame_index) else {
            return;
        };
        let placement = draw.placement;
        let rect = egui::Rect::from_min_size(
            surface.min + egui::vec2(placement.x, placement.y),
            egui::vec2(placement.width, placement.height),
        );
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        ui.painter_at(surface).image(
            texture.id(),
            rect,
            uv,
            egui::Color32::WHITE.gamma_multiply(self.opacity),
        );
    }

    fn texture(
        &mut self,
        ctx: &egui::Context,
        store: &FrameStore,
        index: usize,
    ) -> Option<egui::TextureHandle> {
        if let Some(texture) = self.textures.get(&index) {
            return Some(texture.clone());
        }
        let frame = store.get(index)?;
        let color_img = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.rgba,
        );
        let texture = ctx.load_texture(
            format!("scrub_frame_{index}"),
            color_img,
            egui::TextureOptions::LINEAR,
        );
        self.textures.put(index, texture.clone());
        Some(texture)
    }
}
