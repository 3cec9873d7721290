use std::cell::{Cell, RefCell};
use std::path::Path;

use gst::prelude::*;
use gstreamer as gst;

use crate::engine::{MediaEngine, MediaSession};
use crate::error::{PlayerError, Result};

/// Audio-only GStreamer backend. Each opened file gets its own `playbin`.
pub struct GstEngine {
    _private: (),
}

impl GstEngine {
    pub fn new() -> Result<Self> {
        gst::init().map_err(|err| {
            tracing::error!(%err, "failed to initialize GStreamer");
            PlayerError::EngineUninitialized
        })?;
        // Fail early if the playback plugins are missing.
        if gst::ElementFactory::find("playbin").is_none() {
            tracing::error!("GStreamer has no playbin element");
            return Err(PlayerError::EngineUninitialized);
        }
        tracing::info!(version = %gst::version_string(), "GStreamer ready");
        Ok(Self { _private: () })
    }
}

impl MediaEngine for GstEngine {
    fn open(&mut self, path: &Path) -> Result<Box<dyn MediaSession>> {
        if !path.is_file() {
            return Err(PlayerError::open_failed(path, "no such file"));
        }
        let abs_path = std::fs::canonicalize(path)?;
        let uri = gst::glib::filename_to_uri(&abs_path, None)
            .map_err(|err| PlayerError::open_failed(path, err))?;

        let playbin = gst::ElementFactory::make("playbin")
            .build()
            .map_err(|err| PlayerError::open_failed(path, err))?;
        // Audio only: any video stream is decoded into a fakesink.
        let fakesink = gst::ElementFactory::make("fakesink")
            .build()
            .map_err(|err| PlayerError::open_failed(path, err))?;
        playbin.set_property("video-sink", &fakesink);
        playbin.set_property("uri", uri.as_str());

        if let Err(err) = playbin.set_state(gst::State::Paused) {
            playbin.set_state(gst::State::Null).ok();
            return Err(PlayerError::open_failed(path, err));
        }
        tracing::debug!(%uri, "playbin created");

        Ok(Box::new(GstSession {
            playbin,
            ended: Cell::new(false),
            failure: RefCell::new(None),
        }))
    }
}

struct GstSession {
    playbin: gst::Element,
    /// Set once the bus reports end-of-stream or an error.
    ended: Cell<bool>,
    /// First error message the bus reported.
    failure: RefCell<Option<String>>,
}

impl GstSession {
    fn drain_bus(&self) {
        let Some(bus) = self.playbin.bus() else {
            return;
        };
        while let Some(msg) = bus.pop() {
            use gst::MessageView;
            match msg.view() {
                MessageView::Eos(..) => {
                    tracing::info!("end of stream");
                    self.ended.set(true);
                }
                MessageView::Error(err) => {
                    tracing::warn!(error = %err.error(), debug = ?err.debug(), "playback error");
                    self.ended.set(true);
                    let mut failure = self.failure.borrow_mut();
                    if failure.is_none() {
                        *failure = Some(err.error().to_string());
                    }
                }
                _ => (),
            }
        }
    }

    fn set_state(&self, state: gst::State) {
        if let Err(err) = self.playbin.set_state(state) {
            tracing::warn!(?state, %err, "state change failed");
        }
    }

    fn seek(&self, target: gst::ClockTime, flags: gst::SeekFlags) {
        if let Err(err) = self.playbin.seek_simple(flags, target) {
            tracing::warn!(%target, %err, "seek failed");
        }
    }
}

impl MediaSession for GstSession {
    fn play(&mut self) {
        self.drain_bus();
        if self.ended.replace(false) {
            // Restart from the top after end-of-stream.
            self.set_state(gst::State::Ready);
        }
        self.set_state(gst::State::Playing);
    }

    fn pause(&mut self) {
        self.set_state(gst::State::Paused);
    }

    fn stop(&mut self) {
        self.ended.set(false);
        self.set_state(gst::State::Ready);
    }

    fn is_playing(&self) -> bool {
        self.drain_bus();
        !self.ended.get() && self.playbin.current_state() == gst::State::Playing
    }

    fn is_seekable(&self) -> bool {
        let mut query = gst::query::Seeking::new(gst::Format::Time);
        if self.playbin.query(&mut query) {
            let (seekable, _start, _end) = query.result();
            seekable
        } else {
            false
        }
    }

    fn elapsed_ms(&self) -> i64 {
        self.playbin
            .query_position::<gst::ClockTime>()
            .map(|t| t.mseconds() as i64)
            .unwrap_or(0)
    }

    fn total_ms(&self) -> Option<i64> {
        self.playbin
            .query_duration::<gst::ClockTime>()
            .map(|t| t.mseconds() as i64)
            .filter(|ms| *ms > 0)
    }

    fn position(&self) -> f64 {
        match self.total_ms() {
            Some(total) => (self.elapsed_ms() as f64 / total as f64).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    fn failure(&self) -> Option<String> {
        self.drain_bus();
        self.failure.borrow().clone()
    }

    fn seek_to_time(&mut self, ms: i64) {
        let target = gst::ClockTime::from_mseconds(ms.max(0) as u64);
        self.seek(target, gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE);
    }

    fn seek_to_position(&mut self, position: f64) {
        let Some(total) = self.total_ms() else {
            tracing::debug!(position, "position seek before duration is known");
            return;
        };
        let ms = (position.clamp(0.0, 1.0) * total as f64) as u64;
        // Key-unit seeks are cheap enough to issue on every drag event.
        self.seek(
            gst::ClockTime::from_mseconds(ms),
            gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
        );
    }
}

impl Drop for GstSession {
    fn drop(&mut self) {
        if let Err(err) = self.playbin.set_state(gst::State::Null) {
            tracing::warn!(%err, "failed to release playbin");
        }
        tracing::debug!("playbin released");
    }
}
