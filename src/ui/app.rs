use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use eframe::egui;

use crate::error::Result;
use crate::ops::transport::TransportController;
use crate::ops::visualizer::VisualizerState;
use crate::renderer::display::DisplayState;
use crate::types::config::PlayerConfig;
use crate::types::playback_state::TransportState;
use crate::ui::ticker::FixedTicker;
use crate::ui::visualizer_widget::visualizer_widget;

const VISUALIZER_AREA_HEIGHT: f32 = 160.0;

pub struct PlayerApp {
    pub transport: TransportController<DisplayState>,
    pub visualizer: VisualizerState,
    pub visualizer_ticker: FixedTicker,
    pub position_ticker: FixedTicker,
    pub config: PlayerConfig,
    /// Where "Reload settings" reads from, if a config file was given.
    pub config_path: Option<PathBuf>,
    /// Last reported error, shown under the controls.
    pub status: Option<String>,
    slider_held: bool,
    /// Answer from a file picker running off the UI thread.
    pending_pick: Option<Receiver<Option<PathBuf>>>,
}

impl PlayerApp {
    pub fn new(
        transport: TransportController<DisplayState>,
        config: PlayerConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            transport,
            visualizer: VisualizerState::new(config.visualizer.clone()),
            visualizer_ticker: FixedTicker::new(config.transport.visualizer_interval()),
            position_ticker: FixedTicker::new(config.transport.position_interval()),
            config,
            config_path,
            status: None,
            slider_held: false,
            pending_pick: None,
        }
    }

    pub fn on_open(&mut self, path: &Path) {
        let result = self.transport.open(path);
        if result.is_ok() {
            let now = Instant::now();
            self.visualizer_ticker.start(now);
            self.position_ticker.start(now);
            self.status = None;
        }
        self.report(result);
    }

    /// Show the file picker on its own thread so the frame loop (and both
    /// tickers) keep running while it is open.
    fn on_open_dialog(&mut self, ctx: &egui::Context) {
        if self.pending_pick.is_some() {
            return;
        }
        self.pending_pick = Some(spawn_file_picker(
            self.config.audio_extensions.clone(),
            ctx.clone(),
        ));
    }

    /// Open whatever the picker returned, once it has answered.
    fn poll_open_dialog(&mut self) {
        let Some(rx) = &self.pending_pick else {
            return;
        };
        match rx.try_recv() {
            Ok(Some(path)) => {
                self.pending_pick = None;
                self.on_open(&path);
            }
            Ok(None) => {
                tracing::debug!("file picker cancelled");
                self.pending_pick = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("file picker thread went away");
                self.pending_pick = None;
            }
        }
    }

    fn on_visualizer_tick(&mut self) {
        let playing = self.transport.is_playing();
        self.visualizer.tick(playing);
    }

    fn on_position_tick(&mut self) {
        let result = self.transport.position_tick();
        self.report(result);
    }

    fn reload_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        match PlayerConfig::load_or_default(&path) {
            Ok(config) => {
                tracing::info!(?path, "config reloaded");
                self.visualizer.reset(config.visualizer.clone());
                self.transport.set_config(config.transport.clone());
                self.visualizer_ticker
                    .set_interval(config.transport.visualizer_interval());
                self.position_ticker
                    .set_interval(config.transport.position_interval());
                self.config = config;
                self.status = None;
            }
            Err(err) => {
                tracing::warn!(?path, %err, "config reload failed");
                self.status = Some(err.to_string());
            }
        }
    }

    fn save_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        match self.config.save_to_file(&path) {
            Ok(()) => tracing::info!(?path, "config saved"),
            Err(err) => {
                tracing::warn!(?path, %err, "config save failed");
                self.status = Some(err.to_string());
            }
        }
    }

    fn report(&mut self, result: Result<()>) {
        if let Err(err) = result {
            tracing::warn!(%err, "transport request failed");
            self.status = Some(err.to_string());
        }
    }

    /// Translate pointer state on the seek slider into press/drag/release.
    fn handle_slider(&mut self, response: &egui::Response, value: f64) {
        let held = response.is_pointer_button_down_on();
        if held && !self.slider_held {
            self.transport.press_slider();
        }
        if response.changed() {
            if !held && !self.slider_held {
                // Keyboard step: a complete gesture in one frame.
                self.transport.press_slider();
                self.transport.drag_slider(value);
                let result = self.transport.release_slider();
                self.report(result);
            } else {
                self.transport.drag_slider(value);
            }
        }
        if !held && self.slider_held {
            let result = self.transport.release_slider();
            self.report(result);
        }
        self.slider_held = held;
    }

    pub fn shutdown(&mut self) {
        self.visualizer_ticker.stop();
        self.position_ticker.stop();
        if self.transport.shutdown() {
            tracing::info!("player shut down");
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_open_dialog();

        let now = Instant::now();
        if self.visualizer_ticker.poll(now) {
            self.on_visualizer_tick();
        }
        if self.position_ticker.poll(now) {
            self.on_position_tick();
        }

        egui::TopBottomPanel::top("controls_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let picking = self.pending_pick.is_some();
                if ui.add_enabled(!picking, egui::Button::new("Open")).clicked() {
                    self.on_open_dialog(ctx);
                }
                if ui.button("Play").clicked() {
                    let result = self.transport.play();
                    self.report(result);
                }
                let active = self.transport.state() != TransportState::Idle;
                if ui.add_enabled(active, egui::Button::new("Pause")).clicked() {
                    let result = self.transport.pause();
                    self.report(result);
                }
                if ui.button("Stop").clicked() {
                    self.transport.stop();
                }
                if self.config_path.is_some() {
                    if ui.button("Reload settings").clicked() {
                        self.reload_config();
                    }
                    if ui.button("Save settings").clicked() {
                        self.save_config();
                    }
                }
            });
            ui.heading(self.transport.sink().title.as_str());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let mut value = self.transport.sink().slider_value;
                    let slider = egui::Slider::new(&mut value, 0.0..=100.0).show_value(false);
                    let response = ui.add(slider);
                    self.handle_slider(&response, value);
                    ui.label(self.transport.sink().time_label.as_str());
                });
                if let Some(session) = self.transport.snapshot() {
                    if !session.is_seekable {
                        ui.label(
                            egui::RichText::new("This media is not seekable")
                                .color(egui::Color32::GRAY),
                        );
                    }
                }

                ui.add_space(8.0);
                visualizer_widget(ui, self.visualizer.bars(), VISUALIZER_AREA_HEIGHT);

                if !self.transport.has_engine() {
                    ui.colored_label(egui::Color32::YELLOW, "Media engine unavailable");
                }
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::LIGHT_RED, status.as_str());
                }
                if self.transport.drag_state().is_dragging {
                    ui.label(egui::RichText::new("Seeking…").color(egui::Color32::GRAY));
                }
            });
        });

        // Keep the tickers firing while nothing else triggers a repaint.
        let next = [
            self.visualizer_ticker.time_until_due(now),
            self.position_ticker.time_until_due(now),
        ]
        .into_iter()
        .flatten()
        .min();
        if let Some(wait) = next {
            ctx.request_repaint_after(wait);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown();
    }
}

fn spawn_file_picker(extensions: Vec<String>, ctx: egui::Context) -> Receiver<Option<PathBuf>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
        let picked = rfd::FileDialog::new()
            .set_title("Select audio file")
            .add_filter("Audio files", &extensions)
            .pick_file();
        // The app may have exited while the dialog was open.
        let _ = tx.send(picked);
        ctx.request_repaint();
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::TransportConfig;

    fn app_without_engine() -> PlayerApp {
        let transport =
            TransportController::new(None, DisplayState::new(), TransportConfig::default());
        PlayerApp::new(transport, PlayerConfig::new(), None)
    }

    #[test]
    fn test_picked_file_is_opened_on_next_frame() {
        let mut app = app_without_engine();
        let (tx, rx) = mpsc::channel();
        app.pending_pick = Some(rx);

        app.poll_open_dialog();
        assert!(app.pending_pick.is_some());
        assert!(app.status.is_none());

        tx.send(Some(PathBuf::from("/music/song.ogg"))).unwrap();
        app.poll_open_dialog();
        assert!(app.pending_pick.is_none());
        // The open reached the transport, which has no engine to play it.
        assert_eq!(app.status.as_deref(), Some("media engine is not initialized"));
    }

    #[test]
    fn test_cancelled_or_dropped_picker_clears_pending() {
        let mut app = app_without_engine();
        let (tx, rx) = mpsc::channel();
        app.pending_pick = Some(rx);
        tx.send(None).unwrap();
        app.poll_open_dialog();
        assert!(app.pending_pick.is_none());
        assert!(app.status.is_none());

        let (tx, rx) = mpsc::channel::<Option<PathBuf>>();
        app.pending_pick = Some(rx);
        drop(tx);
        app.poll_open_dialog();
        assert!(app.pending_pick.is_none());
    }

    #[test]
    fn test_save_settings_writes_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barplay.json");
        let mut app = app_without_engine();
        app.config.visualizer.bar_count = 12;
        app.config_path = Some(path.clone());

        app.save_config();
        assert!(app.status.is_none());
        let saved = PlayerConfig::load_from_file(&path).unwrap();
        assert_eq!(saved, app.config);

        // A directory cannot be written as a file.
        app.config_path = Some(dir.path().to_path_buf());
        app.save_config();
        assert!(app.status.is_some());
    }
}
