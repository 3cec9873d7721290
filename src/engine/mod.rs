//! Capability interface over the media engine that does the real decoding
//! and audio output.
//!
//! An engine hands out [`MediaSession`]s; a session exclusively owns the
//! engine resources for one media file and releases them when dropped.

#[cfg(feature = "gst")]
pub mod gst_player;

use crate::error::Result;
use std::path::Path;

pub trait MediaEngine {
    /// Open `path` for playback. The returned session is stopped until
    /// [`MediaSession::play`] is called.
    fn open(&mut self, path: &Path) -> Result<Box<dyn MediaSession>>;
}

pub trait MediaSession {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    fn is_playing(&self) -> bool;
    fn is_seekable(&self) -> bool;

    fn elapsed_ms(&self) -> i64;
    /// `None` until the engine has worked out the duration, which may happen
    /// some time after open.
    fn total_ms(&self) -> Option<i64>;
    /// Play-head as a fraction of the total duration, in [0, 1].
    fn position(&self) -> f64;

    /// Why the engine gave up on this media, if it did. Engines may only
    /// find out that a file is undecodable some time after `open` returned.
    fn failure(&self) -> Option<String>;

    fn seek_to_time(&mut self, ms: i64);
    fn seek_to_position(&mut self, position: f64);
}

/// Builds the engine compiled into this binary, if any.
pub fn default_engine() -> Result<Box<dyn MediaEngine>> {
    #[cfg(feature = "gst")]
    {
        Ok(Box::new(gst_player::GstEngine::new()?))
    }
    #[cfg(not(feature = "gst"))]
    {
        Err(crate::error::PlayerError::EngineUninitialized)
    }
}
