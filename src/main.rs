mod ops;
mod playback;
mod renderer;
mod types;
mod ui;

use crate::ops::presentation::PresentationController;
use crate::playback::gst_transport::GstTransport;
use crate::renderer::frame_store::FrameStore;
use crate::types::experience::ExperienceConfig;
use crate::ui::app::ReelscrollApp;
use crate::ui::scrub_view::ScrubView;
use anyhow::{Context, anyhow};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ExperienceConfig::locate(std::env::args().nth(1).map(PathBuf::from))?;
    log::info!(
        "{} tracks, frames {}..={} from {}",
        config.playlist.len(),
        config.frames.start,
        config.frames.end,
        config.frames.pattern
    );

    let transport = GstTransport::new(config.playback.backend)
        .context("Failed to initialise the audio backend")?;
    let mut controller = PresentationController::new(&config, transport)?;
    controller.start();

    let frames = FrameStore::spawn_load(
        config.frame_pattern(),
        config.frames.start,
        config.frames.end,
    );
    let scrub = ScrubView::new(&config.renderer);
    let app = ReelscrollApp::new(controller, scrub, frames, config.base_dir.clone());

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Reelscroll",
        native_options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("UI terminated: {e}"))
}
