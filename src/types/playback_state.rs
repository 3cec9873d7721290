use std::path::PathBuf;
use uuid::Uuid;

/// Which side is authoritative for the displayed play-head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No playback running; the slider sits at zero.
    #[default]
    Idle,
    /// The engine drives the slider.
    Playing,
    /// The user's hand drives the slider until release.
    Dragging,
}

/// Pointer gesture state for the seek slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub suppress_auto_update: bool,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.is_dragging = true;
        self.suppress_auto_update = true;
    }

    pub fn end(&mut self) {
        self.is_dragging = false;
        self.suppress_auto_update = false;
    }
}

/// Point-in-time view of an open media session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub media_path: PathBuf,
    pub is_playing: bool,
    pub is_seekable: bool,
    /// Fraction of the total duration, in [0, 1].
    pub position: f64,
    pub elapsed_ms: i64,
    /// Zero until the engine reports a duration.
    pub total_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_state_flags_move_together() {
        let mut drag = DragState::new();
        assert!(!drag.is_dragging && !drag.suppress_auto_update);
        drag.begin();
        assert!(drag.is_dragging && drag.suppress_auto_update);
        drag.end();
        assert_eq!(drag, DragState::default());
    }
}
