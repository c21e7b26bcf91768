use crate::ops::presentation::{ControlAction, PresentationController};
use crate::playback::transport::Transport;
use crate::renderer::frame_store::FrameStore;
use crate::types::docking::DockingMode;
use crate::ui::carousel::Carousel;
use crate::ui::player_bar::PlayerBar;
use crate::ui::scrub_view::ScrubView;
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STORY_SECTIONS: usize = 3;

pub struct ReelscrollApp<T: Transport> {
    controller: PresentationController<T>,
    scrub: ScrubView,
    frames: Option<Receiver<FrameStore>>,
    base_dir: PathBuf,
    entered: bool,
}

impl<T: Transport> ReelscrollApp<T> {
    pub fn new(
        controller: PresentationController<T>,
        scrub: ScrubView,
        frames: Receiver<FrameStore>,
        base_dir: PathBuf,
    ) -> Self {
        Self {
            controller,
            scrub,
            frames: Some(frames),
            base_dir,
            entered: false,
        }
    }

    fn poll_frames(&mut self) {
        let Some(rx) = &self.frames else {
            return;
        };
        match rx.try_recv() {
            Ok(store) => {
                if store.is_empty() {
                    log::warn!("no scrub frames could be loaded; background stays blank");
                }
                self.scrub.clear();
                self.controller.attach_frames(store);
                self.frames = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::warn!("frame loader exited without a result");
                self.frames = None;
            }
        }
    }
}

impl<T: Transport> eframe::App for ReelscrollApp<T> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_frames();
        self.controller.tick(Instant::now());

        let mut actions: Vec<ControlAction> = Vec::new();
        let mut enter_clicked = false;

        let mut panel_frame = egui::Frame::central_panel(&ctx.style());
        panel_frame.fill = egui::Color32::from_gray(10);
        panel_frame.inner_margin = egui::Margin::ZERO;

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                let surface = ui.max_rect();
                self.controller.on_resize(surface.width(), surface.height());

                // At most one new frame per display tick; otherwise repaint the last one.
                let draw = self
                    .controller
                    .renderer_mut()
                    .take_draw()
                    .or_else(|| self.controller.renderer().current());
                if let Some(draw) = draw {
                    self.scrub
                        .paint(ui, self.controller.renderer().store(), draw, surface);
                }

                let controller = &self.controller;
                let base_dir = self.base_dir.as_path();
                let entered = self.entered;
                let viewport_h = surface.height();

                let output = egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.set_min_height(viewport_h);
                            ui.add_space(viewport_h * 0.35);
                            ui.heading(egui::RichText::new(&controller.current_track().title).size(40.0));
                            ui.label(&controller.current_track().artist);
                            ui.add_space(24.0);
                            if !entered && ui.button(egui::RichText::new("Enter").size(22.0)).clicked()
                            {
                                enter_clicked = true;
                            }
                        });

                        for _ in 0..STORY_SECTIONS {
                            ui.add_space(viewport_h);
                        }

                        let anchor = ui
                            .vertical_centered(|ui| {
                                ui.set_min_height(viewport_h * 0.6);
                                ui.add_space(32.0);
                                ui.heading("Now playing");
                                actions.extend(
                                    Carousel::new(
                                        controller.tracks(),
                                        controller.current_index(),
                                        base_dir,
                                    )
                                    .show(ui),
                                );
                                ui.add_space(16.0);
                                if controller.docking_mode() == DockingMode::Docked {
                                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                                        actions.extend(PlayerBar::new(controller, base_dir).show(ui));
                                    });
                                }
                            })
                            .response
                            .rect;
                        ui.add_space(viewport_h * 0.5);
                        anchor
                    });

                if controller.docking_mode() == DockingMode::Floating {
                    egui::Area::new(egui::Id::new(("floating-player", controller.layout_generation())))
                        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
                        .order(egui::Order::Foreground)
                        .movable(false)
                        .show(ctx, |ui| {
                            egui::Frame::popup(ui.style()).show(ui, |ui| {
                                actions.extend(PlayerBar::new(controller, base_dir).show(ui));
                            });
                        });
                }

                let scrollable = (output.content_size.y - output.inner_rect.height()).max(1.0);
                let progress = output.state.offset.y / scrollable;
                let scrolled = progress != self.controller.renderer().last_progress();
                if scrolled && self.controller.on_scroll(progress) {
                    ctx.request_repaint();
                }
                if self.controller.on_viewport(output.inner, output.inner_rect) {
                    ctx.request_repaint();
                }
            });

        if enter_clicked {
            self.entered = true;
            self.controller.enter();
        }
        for action in actions {
            self.controller.handle(action);
        }
        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
