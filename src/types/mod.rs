pub mod config;
pub mod playback_state;
