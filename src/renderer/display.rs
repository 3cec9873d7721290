/// Placeholder shown for a time that the engine has not reported yet.
pub const UNKNOWN_TIME: &str = "--:--";

/// Title shown while no media is loaded.
pub const NO_FILE_TITLE: &str = "No file loaded";

/// Where the transport controller writes what the user should see.
pub trait RenderSink {
    /// Slider value on the 0-100 scale.
    fn slider_value(&self) -> f64;
    fn set_slider_value(&mut self, value: f64);
    fn set_time_label(&mut self, text: String);
    fn set_title(&mut self, title: String);
}

/// In-memory display model read by the egui shell each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub slider_value: f64,
    pub time_label: String,
    pub title: String,
}

impl DisplayState {
    pub fn new() -> Self {
        Self {
            slider_value: 0.0,
            time_label: idle_time_label(),
            title: NO_FILE_TITLE.to_string(),
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for DisplayState {
    fn slider_value(&self) -> f64 {
        self.slider_value
    }

    fn set_slider_value(&mut self, value: f64) {
        self.slider_value = value;
    }

    fn set_time_label(&mut self, text: String) {
        self.time_label = text;
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }
}

/// `mm:ss`, minutes are not wrapped at the hour.
pub fn format_mm_ss(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `elapsed / total`, with the total replaced by [`UNKNOWN_TIME`] until a
/// positive duration is available.
pub fn format_time_label(elapsed_ms: i64, total_ms: Option<i64>) -> String {
    let total = match total_ms {
        Some(ms) if ms > 0 => format_mm_ss(ms),
        _ => UNKNOWN_TIME.to_string(),
    };
    format!("{} / {}", format_mm_ss(elapsed_ms), total)
}

pub fn idle_time_label() -> String {
    format_time_label(0, None)
}
