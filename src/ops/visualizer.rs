use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::config::VisualizerConfig;

/// An RGB triple, independent of the GUI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb(128, 128, 128);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizerBar {
    pub current_height: f64,
    pub target_height: f64,
    pub color: Rgb,
}

/// Fake spectrum: bars chase random targets while playing and settle to an
/// idle height otherwise.
pub struct VisualizerState {
    bars: Vec<VisualizerBar>,
    config: VisualizerConfig,
    rng: StdRng,
}

impl VisualizerState {
    pub fn new(config: VisualizerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: VisualizerConfig, mut rng: StdRng) -> Self {
        let bars = idle_bars(&config, &mut rng);
        Self { bars, config, rng }
    }

    pub fn bars(&self) -> &[VisualizerBar] {
        &self.bars
    }

    /// Replace the config and rebuild the bars at idle height.
    pub fn reset(&mut self, config: VisualizerConfig) {
        self.bars = idle_bars(&config, &mut self.rng);
        self.config = config;
    }

    /// Advance every bar by one animation step.
    pub fn tick(&mut self, is_playing: bool) -> &[VisualizerBar] {
        let cfg = &self.config;
        if is_playing {
            for bar in &mut self.bars {
                // A new target every tick; nothing is held over.
                bar.target_height = self.rng.gen_range(cfg.min_height..=cfg.max_height);
                bar.current_height = smooth(bar.current_height, bar.target_height, cfg.playing_alpha);
                bar.color = color_for_height(bar.current_height, cfg.max_height);
            }
        } else {
            for bar in &mut self.bars {
                bar.target_height = cfg.idle_height;
                bar.current_height = smooth(bar.current_height, cfg.idle_height, cfg.idle_alpha);
                bar.color = Rgb::NEUTRAL;
            }
        }
        &self.bars
    }
}

/// Fresh bars at idle height, each with its own random muted colour until
/// the first tick recolours it.
fn idle_bars(config: &VisualizerConfig, rng: &mut StdRng) -> Vec<VisualizerBar> {
    (0..config.bar_count)
        .map(|_| VisualizerBar {
            current_height: config.idle_height,
            target_height: config.idle_height,
            color: Rgb(
                rng.gen_range(100..=255),
                rng.gen_range(100..=255),
                rng.gen_range(100..=255),
            ),
        })
        .collect()
}

/// One exponential-moving-average step from `current` toward `target`.
pub fn smooth(current: f64, target: f64, alpha: f64) -> f64 {
    current + alpha * (target - current)
}

/// Green at zero, yellow at half of `max_height`, red at the top.
pub fn color_for_height(height: f64, max_height: f64) -> Rgb {
    // The ramp works on whole pixels, like the painted bar.
    let ratio = if max_height > 0.0 {
        (height.trunc() / max_height).clamp(0.0, 1.0)
    } else {
        0.0
    };
    if ratio < 0.5 {
        Rgb((ratio * 2.0 * 255.0) as u8, 255, 0)
    } else {
        Rgb(255, ((1.0 - (ratio - 0.5) * 2.0) * 255.0) as u8, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(config: VisualizerConfig) -> VisualizerState {
        VisualizerState::with_rng(config, StdRng::seed_from_u64(7))
    }

    fn heights(state: &VisualizerState) -> Vec<f64> {
        state.bars().iter().map(|b| b.current_height).collect()
    }

    #[test]
    fn test_starts_with_configured_bar_count_at_idle() {
        let state = seeded(VisualizerConfig::default());
        assert_eq!(state.bars().len(), 30);
        assert!(state.bars().iter().all(|b| b.current_height == 10.0));
    }

    #[test]
    fn test_playing_targets_stay_in_range() {
        let cfg = VisualizerConfig::default();
        let mut state = seeded(cfg.clone());
        for _ in 0..500 {
            for bar in state.tick(true) {
                assert!(bar.target_height >= cfg.min_height);
                assert!(bar.target_height <= cfg.max_height);
                // Heights never escape the hull of idle height and max target.
                assert!(bar.current_height >= cfg.idle_height - 1e-9);
                assert!(bar.current_height <= cfg.max_height + 1e-9);
            }
        }
    }

    #[test]
    fn test_targets_redrawn_every_tick() {
        let mut state = seeded(VisualizerConfig::default());
        let first: Vec<f64> = state.tick(true).iter().map(|b| b.target_height).collect();
        let second: Vec<f64> = state.tick(true).iter().map(|b| b.target_height).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_idle_contracts_toward_idle_height() {
        let cfg = VisualizerConfig::default();
        let mut state = seeded(cfg.clone());
        for _ in 0..40 {
            state.tick(true);
        }
        let mut previous = heights(&state);
        for _ in 0..200 {
            state.tick(false);
            let now = heights(&state);
            for (before, after) in previous.iter().zip(&now) {
                let d_before = (before - cfg.idle_height).abs();
                let d_after = (after - cfg.idle_height).abs();
                assert!(d_after <= d_before);
                // Monotone: never overshoots the idle height.
                assert!(after <= before);
                assert!(*after >= cfg.idle_height);
            }
            previous = now;
        }
        assert!(previous.iter().all(|h| (h - cfg.idle_height).abs() < 0.01));
        assert!(state.bars().iter().all(|b| b.color == Rgb::NEUTRAL));
    }

    #[test]
    fn test_pause_and_resume_steps_are_bounded() {
        let cfg = VisualizerConfig::default();
        let mut state = seeded(cfg.clone());
        for _ in 0..20 {
            state.tick(true);
        }

        // Play -> pause: the very next step uses the idle rate from where the
        // bar actually was.
        let before = heights(&state);
        state.tick(false);
        for (prev, bar) in before.iter().zip(state.bars()) {
            let expected = prev + cfg.idle_alpha * (cfg.idle_height - prev);
            assert!((bar.current_height - expected).abs() < 1e-9);
        }

        // Pause -> resume: the playing rate applies immediately.
        let before = heights(&state);
        state.tick(true);
        for (prev, bar) in before.iter().zip(state.bars()) {
            let step = (bar.current_height - prev).abs();
            let bound = cfg.playing_alpha * (bar.target_height - prev).abs();
            assert!(step <= bound + 1e-9);
        }
    }

    #[test]
    fn test_converges_to_constant_target() {
        let mut h = 150.0;
        for _ in 0..300 {
            h = smooth(h, 42.0, 0.15);
        }
        assert!((h - 42.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_ramp() {
        assert_eq!(color_for_height(0.0, 150.0), Rgb(0, 255, 0));
        assert_eq!(color_for_height(37.5, 150.0), Rgb(125, 255, 0));
        assert_eq!(color_for_height(75.0, 150.0), Rgb(255, 255, 0));
        assert_eq!(color_for_height(150.0, 150.0), Rgb(255, 0, 0));
        assert_eq!(color_for_height(400.0, 150.0), Rgb(255, 0, 0));
        assert_eq!(color_for_height(10.0, 0.0), Rgb(0, 255, 0));
    }

    #[test]
    fn test_reset_rebuilds_bars() {
        let mut state = seeded(VisualizerConfig::default());
        state.tick(true);
        let cfg = VisualizerConfig {
            bar_count: 5,
            idle_height: 4.0,
            ..VisualizerConfig::default()
        };
        state.reset(cfg);
        assert_eq!(state.bars().len(), 5);
        assert!(state.bars().iter().all(|b| b.current_height == 4.0));
    }

    #[test]
    fn test_initial_colours_are_random_and_muted() {
        let state = seeded(VisualizerConfig::default());
        for bar in state.bars() {
            let Rgb(r, g, b) = bar.color;
            assert!(r >= 100 && g >= 100 && b >= 100);
        }
        let first = state.bars()[0].color;
        assert!(state.bars().iter().any(|b| b.color != first));
    }
}
