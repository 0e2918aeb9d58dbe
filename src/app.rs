//! Host glue
//!
//! Wires calculator keys to the animation: a division by zero starts the black
//! hole (and its sound), clear resets everything, resizes recenter the scene.
//! The host polls `is_active()` to fade its calculator chrome out and back in.

use crate::animation::{AnimationLoop, FrameOutcome, FrameScheduler};
use crate::audio::{AudioSink, SoundEffect};
use crate::calc::{CalcEvent, Calculator, Operator};
use crate::settings::Settings;

/// A calculator key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Operator(Operator),
    Equals,
    Clear,
}

impl Key {
    /// Map a keyboard key name (`KeyboardEvent.key`) or button label
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "=" | "Enter" => return Some(Key::Equals),
            "C" | "c" | "AC" | "Escape" | "Delete" => return Some(Key::Clear),
            _ => {}
        }
        let mut chars = name.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if c.is_ascii_digit() || c == '.' {
            Some(Key::Digit(c))
        } else {
            Operator::from_char(c).map(Key::Operator)
        }
    }
}

/// The calculator and its black hole
pub struct App<S: FrameScheduler, A: AudioSink> {
    calculator: Calculator,
    animation: AnimationLoop<S>,
    audio: A,
    auto_reset_ms: Option<f64>,
    reset_deadline: Option<f64>,
    black_holes: u64,
}

impl<S: FrameScheduler, A: AudioSink> App<S, A> {
    /// Build everything and start requesting frames
    pub fn new(settings: &Settings, width: u32, height: u32, scheduler: S, audio: A, seed: u64) -> Self {
        let mut animation = AnimationLoop::new(settings, width, height, scheduler, seed);
        animation.start();
        Self {
            calculator: Calculator::new(),
            animation,
            audio,
            auto_reset_ms: settings.auto_reset_ms,
            reset_deadline: None,
            black_holes: 0,
        }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn animation(&self) -> &AnimationLoop<S> {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationLoop<S> {
        &mut self.animation
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// How many times the black hole has been started
    pub fn black_holes(&self) -> u64 {
        self.black_holes
    }

    /// Whether the host should hide its calculator chrome
    pub fn is_active(&self) -> bool {
        self.animation.is_active()
    }

    /// Handle one key press at wall-clock `now_ms`
    pub fn press(&mut self, key: Key, now_ms: f64) {
        let event = match key {
            Key::Digit(c) => {
                self.calculator.input_digit(c);
                None
            }
            Key::Operator(op) => self.calculator.input_operator(op),
            Key::Equals => self.calculator.equals(),
            Key::Clear => {
                self.clear_requested();
                None
            }
        };

        if event == Some(CalcEvent::BlackHole) {
            self.on_black_hole_condition(now_ms);
        }
    }

    /// Division by zero happened. Returns whether the black hole started.
    pub fn on_black_hole_condition(&mut self, now_ms: f64) -> bool {
        if !self.animation.start_growth() {
            return false;
        }
        self.black_holes += 1;

        if let Err(e) = self.audio.play(SoundEffect::BlackHole) {
            log::warn!("Black hole sound failed: {e:#}");
        }

        self.reset_deadline = self.auto_reset_ms.map(|ms| now_ms + ms);
        true
    }

    /// User pressed clear: calculator and animation back to the start
    pub fn clear_requested(&mut self) {
        self.calculator.clear();
        self.animation.reset();
        self.reset_deadline = None;
    }

    pub fn on_surface_resize(&mut self, width: u32, height: u32) {
        self.animation.resize(width, height);
    }

    /// Display refresh callback
    pub fn on_frame(&mut self, now_ms: f64) -> FrameOutcome {
        self.animation.on_frame(now_ms)
    }

    /// Fire the auto-reset if its deadline has passed. Returns whether it fired.
    pub fn poll_timers(&mut self, now_ms: f64) -> bool {
        match self.reset_deadline {
            Some(deadline) if now_ms >= deadline => {
                log::info!("Auto-reset after black hole");
                self.clear_requested();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ManualScheduler;
    use crate::calc::Display;
    use crate::consts::IDLE_RADIUS;
    use crate::sim::GrowthState;

    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<SoundEffect>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, effect: SoundEffect) -> anyhow::Result<()> {
            self.played.push(effect);
            Ok(())
        }
    }

    struct BrokenAudio;

    impl AudioSink for BrokenAudio {
        fn play(&mut self, _effect: SoundEffect) -> anyhow::Result<()> {
            anyhow::bail!("no output device")
        }
    }

    fn settings() -> Settings {
        Settings {
            star_count: Some(60),
            ..Settings::default()
        }
    }

    fn app<A: AudioSink>(audio: A, settings: &Settings) -> App<ManualScheduler, A> {
        App::new(settings, 320, 240, ManualScheduler::new(), audio, 9)
    }

    fn type_keys<A: AudioSink>(app: &mut App<ManualScheduler, A>, keys: &[&str]) {
        for name in keys {
            app.press(Key::from_name(name).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("7"), Some(Key::Digit('7')));
        assert_eq!(Key::from_name("/"), Some(Key::Operator(Operator::Divide)));
        assert_eq!(Key::from_name("Enter"), Some(Key::Equals));
        assert_eq!(Key::from_name("Escape"), Some(Key::Clear));
        assert_eq!(Key::from_name("Shift"), None);
        assert_eq!(Key::from_name(""), None);
    }

    #[test]
    fn test_new_schedules_first_frame() {
        let app = app(RecordingAudio::default(), &settings());
        assert!(app.animation().is_scheduled());
        assert!(!app.is_active());
    }

    #[test]
    fn test_ten_over_zero_starts_exactly_once() {
        let mut app = app(RecordingAudio::default(), &settings());
        type_keys(&mut app, &["1", "0", "/", "0", "="]);

        assert_eq!(app.black_holes(), 1);
        assert_eq!(app.audio().played, vec![SoundEffect::BlackHole]);
        assert!(app.is_active());
        assert!(app.animation().growth().is_growing());
        assert_eq!(app.calculator().display(), Display::BlackHole);

        // More keys don't start it again
        type_keys(&mut app, &["=", "+", "5", "="]);
        assert_eq!(app.black_holes(), 1);
        assert_eq!(app.audio().played.len(), 1);
    }

    #[test]
    fn test_normal_division_leaves_animation_idle() {
        let mut app = app(RecordingAudio::default(), &settings());
        type_keys(&mut app, &["8", "/", "4", "="]);
        assert_eq!(app.calculator().display(), Display::Number(2.0));
        assert!(!app.is_active());
        assert!(app.audio().played.is_empty());
    }

    #[test]
    fn test_audio_failure_is_swallowed() {
        let mut app = app(BrokenAudio, &settings());
        type_keys(&mut app, &["3", "/", "0", "="]);
        assert!(app.is_active());
        assert_eq!(app.black_holes(), 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut app = app(RecordingAudio::default(), &settings());
        type_keys(&mut app, &["1", "/", "0", "="]);
        for _ in 0..30 {
            app.animation_mut().step(2.0);
        }
        app.press(Key::Clear, 500.0);

        assert!(!app.is_active());
        assert_eq!(app.animation().growth().state(), GrowthState::Idle);
        assert_eq!(app.animation().growth().radius(), IDLE_RADIUS);
        assert_eq!(app.animation().field().len(), 60);
        assert_eq!(app.calculator().display(), Display::Number(0.0));
        assert_eq!(app.animation().scheduler().pending().len(), 1);

        // Idempotent when already idle
        app.clear_requested();
        assert_eq!(app.animation().scheduler().pending().len(), 1);

        // And the calculator works again
        type_keys(&mut app, &["4", "/", "0", "="]);
        assert_eq!(app.black_holes(), 2);
    }

    #[test]
    fn test_auto_reset_deadline() {
        let settings = Settings {
            auto_reset_ms: Some(4500.0),
            ..settings()
        };
        let mut app = app(RecordingAudio::default(), &settings);
        app.press(Key::Digit('1'), 1000.0);
        app.press(Key::Operator(Operator::Divide), 1000.0);
        app.press(Key::Equals, 1000.0);
        assert!(app.is_active());

        assert!(!app.poll_timers(5000.0));
        assert!(app.is_active());
        assert!(app.poll_timers(5500.0));
        assert!(!app.is_active());
        // Only fires once
        assert!(!app.poll_timers(9000.0));
    }

    #[test]
    fn test_auto_reset_by_default_after_growth() {
        let mut app = app(RecordingAudio::default(), &settings());
        type_keys(&mut app, &["1", "/", "0", "="]);
        assert!(!app.poll_timers(4499.0));
        assert!(app.poll_timers(4500.0));
        assert!(!app.is_active());
        assert_eq!(app.calculator().display(), Display::Number(0.0));
    }

    #[test]
    fn test_auto_reset_opt_out() {
        let settings = Settings {
            auto_reset_ms: None,
            ..settings()
        };
        let mut app = app(RecordingAudio::default(), &settings);
        type_keys(&mut app, &["1", "/", "0", "="]);
        assert!(!app.poll_timers(1.0e9));
        assert!(app.is_active());
    }

    #[test]
    fn test_resize_keeps_growth() {
        let mut app = app(RecordingAudio::default(), &settings());
        type_keys(&mut app, &["1", "/", "0", "="]);
        app.animation_mut().step(1.0);
        let radius = app.animation().growth().radius();
        app.on_surface_resize(640, 480);
        assert_eq!(app.animation().growth().radius(), radius);
        assert_eq!(app.animation().center(), glam::Vec2::new(320.0, 240.0));
    }

    #[test]
    fn test_frames_flow_through() {
        let mut app = app(RecordingAudio::default(), &settings());
        app.animation_mut().scheduler_mut().fire();
        assert_eq!(app.on_frame(0.0), FrameOutcome::Continue);
        assert_eq!(app.animation().scheduler().pending().len(), 1);

        app.animation_mut().stop();
        assert_eq!(app.on_frame(16.0), FrameOutcome::Skipped);
    }
}
