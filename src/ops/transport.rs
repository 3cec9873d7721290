use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::engine::{MediaEngine, MediaSession};
use crate::error::{PlayerError, Result};
use crate::renderer::display::{NO_FILE_TITLE, RenderSink, format_time_label, idle_time_label};
use crate::types::config::TransportConfig;
use crate::types::playback_state::{DragState, SessionSnapshot, TransportState};

struct ActiveSession {
    id: Uuid,
    path: PathBuf,
    media: Box<dyn MediaSession>,
}

/// Decides whether the engine or the user's hand owns the seek slider, and
/// turns slider gestures into seeks.
pub struct TransportController<S: RenderSink> {
    engine: Option<Box<dyn MediaEngine>>,
    session: Option<ActiveSession>,
    state: TransportState,
    drag: DragState,
    sink: S,
    config: TransportConfig,
    /// Seekability is checked on the first position tick after open rather
    /// than by waiting inside `open`.
    seekable_check_pending: bool,
    shut_down: bool,
}

impl<S: RenderSink> TransportController<S> {
    /// `engine` is `None` when the media engine failed to start; every open
    /// then reports [`PlayerError::EngineUninitialized`].
    pub fn new(engine: Option<Box<dyn MediaEngine>>, sink: S, config: TransportConfig) -> Self {
        let mut controller = Self {
            engine,
            session: None,
            state: TransportState::Idle,
            drag: DragState::new(),
            sink,
            config,
            seekable_check_pending: false,
            shut_down: false,
        };
        controller.reset_display();
        controller
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn set_config(&mut self, config: TransportConfig) {
        self.config = config;
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Whether the engine is currently producing sound.
    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.media.is_playing())
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|session| SessionSnapshot {
            id: session.id,
            media_path: session.path.clone(),
            is_playing: session.media.is_playing(),
            is_seekable: session.media.is_seekable(),
            position: session.media.position(),
            elapsed_ms: session.media.elapsed_ms(),
            total_ms: session.media.total_ms().unwrap_or(0),
        })
    }

    /// Tear down the current session (if any), open `path` and start it.
    /// On failure the controller is left `Idle` with no session.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        if self.shut_down || self.engine.is_none() {
            tracing::warn!(?path, "open requested without a media engine");
            return Err(PlayerError::EngineUninitialized);
        }

        self.release_session();
        self.state = TransportState::Idle;
        self.drag.end();
        self.reset_display();
        self.sink.set_title(NO_FILE_TITLE.to_string());

        let engine = self
            .engine
            .as_mut()
            .ok_or(PlayerError::EngineUninitialized)?;
        let mut media = match engine.open(path) {
            Ok(media) => media,
            Err(err) => {
                tracing::warn!(?path, %err, "failed to open media");
                return Err(err);
            }
        };
        media.play();

        let id = Uuid::new_v4();
        tracing::info!(%id, ?path, "session started");
        self.session = Some(ActiveSession {
            id,
            path: path.to_path_buf(),
            media,
        });
        self.state = TransportState::Playing;
        self.seekable_check_pending = true;

        let title = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.sink.set_title(title);
        Ok(())
    }

    /// Pull the engine position into the slider and time label. Does nothing
    /// unless the engine owns the slider and is actually playing.
    ///
    /// A session the engine has given up on (e.g. an undecodable file that
    /// only fails after `open` returned) is released here and reported as
    /// [`PlayerError::MediaOpenFailed`]; the controller goes back to `Idle`.
    pub fn position_tick(&mut self) -> Result<()> {
        if self.state != TransportState::Playing {
            return Ok(());
        }
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };

        if let Some(reason) = session.media.failure() {
            let path = session.path.clone();
            tracing::warn!(id = %session.id, ?path, %reason, "media failed after open");
            self.abandon_session();
            return Err(PlayerError::open_failed(path, reason));
        }
        if std::mem::take(&mut self.seekable_check_pending) && !session.media.is_seekable() {
            tracing::warn!(id = %session.id, "media is not seekable");
        }
        if !session.media.is_playing() {
            return Ok(());
        }

        let engine_value = session.media.position() * 100.0;
        if (self.sink.slider_value() - engine_value).abs() > self.config.hysteresis {
            self.sink.set_slider_value(engine_value);
        }
        let label = format_time_label(session.media.elapsed_ms(), session.media.total_ms());
        self.sink.set_time_label(label);
        Ok(())
    }

    pub fn press_slider(&mut self) {
        if self.state != TransportState::Playing {
            tracing::debug!(state = ?self.state, "slider press ignored");
            return;
        }
        self.state = TransportState::Dragging;
        self.drag.begin();
    }

    /// The slider follows `value` regardless; while dragging a seekable
    /// media the play-head follows it too.
    pub fn drag_slider(&mut self, value: f64) {
        let value = value.clamp(0.0, 100.0);
        self.sink.set_slider_value(value);

        if self.state != TransportState::Dragging || !self.config.live_seek_while_dragging {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.media.is_seekable() {
            session.media.seek_to_position(value / 100.0);
            tracing::trace!(position = value / 100.0, "live seek");
        } else {
            tracing::debug!(value, "media not seekable, drag only moves the slider");
        }
    }

    /// Finish a drag with one time-based seek to the slider value. The drag
    /// ends and the engine regains the slider even when the seek is refused.
    pub fn release_slider(&mut self) -> Result<()> {
        if self.state != TransportState::Dragging {
            return Ok(());
        }
        let result = self.seek_to_slider();
        self.state = TransportState::Playing;
        self.drag.end();
        result
    }

    fn seek_to_slider(&mut self) -> Result<()> {
        let value = self.sink.slider_value();
        let session = self.session.as_mut().ok_or(PlayerError::NoActiveSession)?;
        if !session.media.is_seekable() {
            return Err(PlayerError::SeekOnNonSeekableMedia);
        }
        let total = session
            .media
            .total_ms()
            .filter(|ms| *ms > 0)
            .ok_or(PlayerError::SeekWithUnknownDuration)?;

        let target = release_target_ms(value, total);
        session.media.seek_to_time(target);
        tracing::info!(id = %session.id, target_ms = target, total_ms = total, "seek");
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.media.stop();
            tracing::info!(id = %session.id, "stopped");
        }
        self.state = TransportState::Idle;
        self.drag.end();
        self.reset_display();
    }

    /// Resume (or restart after stop). A drag in progress stays in progress.
    pub fn play(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(PlayerError::NoActiveSession)?;
        session.media.play();
        if self.state == TransportState::Idle {
            self.state = TransportState::Playing;
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(PlayerError::NoActiveSession)?;
        session.media.pause();
        Ok(())
    }

    /// Release the session and the engine. Runs at most once; returns
    /// whether this call did the teardown.
    pub fn shutdown(&mut self) -> bool {
        if self.shut_down {
            return false;
        }
        self.shut_down = true;
        self.release_session();
        self.engine = None;
        self.state = TransportState::Idle;
        self.drag.end();
        tracing::info!("transport shut down");
        true
    }

    fn release_session(&mut self) {
        if let Some(mut old) = self.session.take() {
            old.media.stop();
            tracing::info!(id = %old.id, path = ?old.path, "session released");
        }
        self.seekable_check_pending = false;
    }

    fn abandon_session(&mut self) {
        self.release_session();
        self.state = TransportState::Idle;
        self.drag.end();
        self.reset_display();
        self.sink.set_title(NO_FILE_TITLE.to_string());
    }

    fn reset_display(&mut self) {
        self.sink.set_slider_value(0.0);
        self.sink.set_time_label(idle_time_label());
    }
}

impl<S: RenderSink> Drop for TransportController<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Absolute seek target for a slider value on the 0-100 scale.
pub fn release_target_ms(slider_value: f64, total_ms: i64) -> i64 {
    ((slider_value / 100.0) * total_ms as f64) as i64
}
