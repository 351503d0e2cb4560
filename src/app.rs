//! HighlightReader window: egui/eframe application.
//!
//! # Architecture
//!
//! [`ReaderApp`] is the top-level [`eframe::App`].  It owns the [`Session`],
//! the playback engine and two channel endpoints:
//!
//! * `command_tx`: sends [`SessionCommand`] to the session orchestrator.
//! * `result_rx`: receives [`SessionResult`] from the orchestrator.
//!
//! Every frame it drains `result_rx`, samples the playback position, feeds
//! it to the session's tracker and applies the resulting
//! [`TransitionEvent`]s to the highlighted segment.
//!
//! # Layout
//!
//! | Area          | Content                                          |
//! |---------------|--------------------------------------------------|
//! | Top           | Multi-line text input + "Generate audio" button  |
//! | Centre        | Original text, active word highlighted           |
//! | Below text    | Collapsible word timings as JSON                 |
//! | Bottom bar    | State, progress, display toggles, service status |

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::align::Segment;
use crate::config::AppConfig;
use crate::playback::{PlaybackEngine, TransitionEvent};
use crate::session::{
    Session, SessionCommand, SessionResult, SessionState, Submission, REQUEST_FAILED_MESSAGE,
};

const HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(255, 221, 87);

// ---------------------------------------------------------------------------
// ReaderApp
// ---------------------------------------------------------------------------

/// eframe application: text input, playback and live highlighting.
pub struct ReaderApp {
    // ── Session ──────────────────────────────────────────────────────────
    session: Session,
    /// Text being edited; kept across requests so a failed one can be resent.
    input: String,
    /// Input validation hint (e.g. blank submission).
    notice: Option<String>,
    /// Pretty-printed word timings of the current view.
    timestamps_json: Option<String>,
    /// Segment carrying the highlight, maintained from transition events.
    highlighted: Option<usize>,
    /// Segment to scroll into view on the next frame.
    scroll_to: Option<usize>,
    /// Last reported service status line.
    service_status: Option<String>,

    // ── Playback ─────────────────────────────────────────────────────────
    player: Box<dyn PlaybackEngine>,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<SessionCommand>,
    result_rx: mpsc::Receiver<SessionResult>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
    /// Where display toggles are persisted; `None` keeps them in memory.
    settings_file: Option<PathBuf>,
}

impl ReaderApp {
    /// Create a new [`ReaderApp`] and ask the orchestrator for the service
    /// status.
    pub fn new(
        command_tx: mpsc::Sender<SessionCommand>,
        result_rx: mpsc::Receiver<SessionResult>,
        player: Box<dyn PlaybackEngine>,
        config: AppConfig,
    ) -> Self {
        if command_tx.try_send(SessionCommand::CheckStatus).is_err() {
            log::warn!("ui: could not request service status");
        }
        Self {
            session: Session::new(),
            input: String::new(),
            notice: None,
            timestamps_json: None,
            highlighted: None,
            scroll_to: None,
            service_status: None,
            player,
            command_tx,
            result_rx,
            config,
            settings_file: None,
        }
    }

    /// Persist display toggles to `path` whenever they change.
    pub fn with_settings_file(mut self, path: PathBuf) -> Self {
        self.settings_file = Some(path);
        self
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Submit the current input for synthesis.
    fn submit(&mut self) {
        let submission = match self.session.begin(&self.input) {
            Ok(submission) => submission,
            Err(e) => {
                self.notice = Some(e.to_string());
                return;
            }
        };

        self.notice = None;
        self.timestamps_json = None;
        self.highlighted = None;
        self.scroll_to = None;
        self.player.stop();
        self.send_synthesize(submission);
    }

    fn send_synthesize(&mut self, submission: Submission) {
        if let Err(e) = self.command_tx.try_send(submission.into()) {
            log::error!("ui: failed to queue synthesis request: {e}");
            self.session.fail(REQUEST_FAILED_MESSAGE.to_string());
        }
    }

    /// Load `audio` for the current view and start playing it.
    fn start_audio(&mut self, audio: Vec<u8>) {
        let Some(view) = self.session.view() else {
            return;
        };
        let url = view.audio_url.clone();
        self.timestamps_json = serde_json::to_string_pretty(&view.words).ok();

        self.player.load(audio);
        match self.player.play() {
            Ok(()) => {
                log::info!("ui: playing {url}");
                self.session.start_playback();
            }
            Err(e) => {
                log::warn!("ui: playback failed: {e}");
                self.session.fail(format!("Playback failed: {e}"));
            }
        }
    }

    fn stop_audio(&mut self) {
        self.player.stop();
        self.session.on_playback_ended();
        self.clear_highlight();
    }

    fn clear_highlight(&mut self) {
        self.highlighted = None;
        self.scroll_to = None;
    }

    /// Move the highlight as described by `event`.
    fn apply_transition(&mut self, event: TransitionEvent) {
        if let Some(index) = event.deactivated() {
            if self.highlighted == Some(index) {
                self.highlighted = None;
            }
        }
        if let Some(index) = event.activated() {
            self.highlighted = Some(index);
            if self.config.ui.auto_scroll {
                self.scroll_to = Some(index);
            }
        }
    }

    /// Write the current configuration to the settings file, if any.
    fn persist_config(&self) {
        let Some(path) = &self.settings_file else {
            return;
        };
        match self.config.save_to(path) {
            Ok(()) => log::debug!("ui: saved settings to {}", path.display()),
            Err(e) => log::warn!("ui: failed to save settings: {e}"),
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending orchestrator results (non-blocking).
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                SessionResult::Completed { id, outcome } => {
                    let (outcome, audio) = match outcome {
                        Ok(speech) => (Ok(speech.response), Some(speech.audio)),
                        Err(e) => (Err(e), None),
                    };
                    if self.session.complete(id, outcome)
                        && self.session.state() == SessionState::Ready
                    {
                        if let Some(audio) = audio {
                            self.start_audio(audio);
                        }
                    }
                }
                SessionResult::Status(Ok(status)) => {
                    let version = status.version.as_deref().unwrap_or("?");
                    self.service_status =
                        Some(format!("{} {} ({})", status.service, version, status.status));
                }
                SessionResult::Status(Err(e)) => {
                    log::warn!("ui: service status unavailable: {e}");
                    self.service_status = Some("service unreachable".into());
                }
            }
        }
    }

    /// Sample the playback position and apply any highlight transition.
    fn track_playback(&mut self) {
        if self.session.state() != SessionState::Playing {
            return;
        }

        if let Some(position) = self.player.position_ms() {
            if let Some(event) = self.session.on_position(position) {
                self.apply_transition(event);
            }
        }

        if self.player.poll_ended() {
            log::debug!("ui: playback ended");
            self.session.on_playback_ended();
            self.clear_highlight();
        }
    }

    // ── Panel renderers ──────────────────────────────────────────────────

    /// Render the input box and the submit / stop buttons.
    fn draw_input(&mut self, ui: &mut egui::Ui) {
        ui.add(
            egui::TextEdit::multiline(&mut self.input)
                .hint_text("Enter text to synthesize")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            let busy = self.session.state().is_busy();
            let label = if busy { "Loading..." } else { "Generate audio" };
            if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                self.submit();
            }

            if self.session.state() == SessionState::Playing && ui.button("Stop").clicked() {
                self.stop_audio();
            }

            if let Some(notice) = &self.notice {
                ui.colored_label(egui::Color32::from_rgb(255, 136, 68), notice);
            }
        });
    }

    /// Render the aligned text with the active token highlighted.
    fn draw_text(&mut self, ui: &mut egui::Ui) {
        let Some(view) = self.session.view() else {
            return;
        };
        let active = self.highlighted;
        let scroll_to = self.scroll_to.take();

        egui::ScrollArea::vertical()
            .id_salt("reader-text")
            .auto_shrink([false, true])
            .max_height(ui.available_height() * 0.6)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for (index, segment) in view.segments.iter().enumerate() {
                        match segment {
                            Segment::Literal { text } => draw_literal(ui, text),
                            Segment::Token { text, interval } => {
                                let mut rich = egui::RichText::new(text.as_str()).size(16.0);
                                if active == Some(index) {
                                    rich = rich
                                        .background_color(HIGHLIGHT)
                                        .color(egui::Color32::BLACK);
                                }
                                let response = ui.label(rich);
                                if scroll_to == Some(index) {
                                    response.scroll_to_me(Some(egui::Align::Center));
                                }
                                if let Some(iv) = interval {
                                    response.on_hover_text(format!(
                                        "{}–{} ms",
                                        iv.start_ms, iv.end_ms
                                    ));
                                }
                            }
                        }
                    }
                });
            });

        if self.config.ui.show_timestamps {
            if let Some(json) = &self.timestamps_json {
                ui.add_space(6.0);
                egui::CollapsingHeader::new("Word timings")
                    .default_open(false)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .id_salt("reader-timings")
                            .show(ui, |ui| {
                                ui.label(egui::RichText::new(json.as_str()).monospace());
                            });
                    });
            }
        }
    }

    /// Render the bottom status bar.
    fn draw_status(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.session.state().label());
            if let (Some(view), Some(position)) = (self.session.view(), self.player.position_ms())
            {
                let duration = view.duration_ms().max(1);
                ui.add(
                    egui::ProgressBar::new((position as f32 / duration as f32).min(1.0))
                        .desired_width(120.0)
                        .text(format!("{:.1} s", position as f32 / 1000.0)),
                );
            }

            ui.separator();
            let mut changed = ui
                .checkbox(&mut self.config.ui.auto_scroll, "Auto-scroll")
                .changed();
            changed |= ui
                .checkbox(&mut self.config.ui.show_timestamps, "Timings")
                .changed();
            if changed {
                self.persist_config();
            }

            if let Some(status) = &self.service_status {
                ui.separator();
                ui.label(egui::RichText::new(status.as_str()).weak());
            }
            if let Some(message) = self.session.error_message() {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message);
            }
        });
    }
}

/// Literal text is laid out verbatim; newlines start a new row.
fn draw_literal(ui: &mut egui::Ui, text: &str) {
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            ui.end_row();
        }
        if !line.is_empty() {
            ui.label(egui::RichText::new(line).size(16.0));
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ReaderApp {
    /// Called every frame by eframe.  Polls channels, tracks playback, then
    /// renders the window.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();
        self.track_playback();

        // Keep sampling while something is in progress.
        let state = self.session.state();
        if state == SessionState::Playing || state.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(self.config.playback.poll_interval_ms));
        }

        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            self.draw_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_input(ui);
            ui.separator();
            self.draw_text(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.player.stop();
        log::info!("HighlightReader closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
