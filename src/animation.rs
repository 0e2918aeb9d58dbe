//! Per-frame animation driver
//!
//! `AnimationLoop` owns every piece of animation state (stars, horizon growth,
//! surfaces, center, disk rotation) and runs the fixed tick pipeline:
//!
//! 1. stars move and the consumed ones are pruned
//! 2. background is painted from the stars
//! 3. foreground is cleared, then disk, lensing and horizon are painted
//! 4. the horizon radius advances and decides whether to keep scheduling
//!
//! Painting uses the radius from before this tick's advance.
//!
//! Frame requests go through a `FrameScheduler`, and at most one request is
//! outstanding at any time.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::DISK_SPIN_PER_TICK;
use crate::renderer::color::colors::SPACE;
use crate::renderer::{
    AccretionDiskRenderer, BackgroundRenderer, EventHorizon, LensingCompositor, RenderSurfacePair,
};
use crate::settings::Settings;
use crate::sim::{FrameClock, GrowthController, GrowthState, GrowthStep, ParticleField};

/// Handle for one pending frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Something that can call us back on the next display refresh
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Scheduler that only records requests; the caller fires frames by hand.
///
/// Used by tests and the headless native driver.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameRequest>,
    total_requests: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled
    pub fn pending(&self) -> &[FrameRequest] {
        &self.pending
    }

    /// Every request ever made
    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    /// Remove and return the oldest pending request, as a display refresh would
    pub fn fire(&mut self) -> Option<FrameRequest> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.total_requests += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|r| *r != request);
    }
}

/// What happened on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Painted; another frame has been requested
    Continue,
    /// The horizon consumed the screen; scheduling stopped
    Halted,
    /// Callback arrived with nothing pending (stopped or stale)
    Skipped,
}

/// Owns all animation state and drives the tick pipeline
pub struct AnimationLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameRequest>,
    clock: FrameClock,
    field: ParticleField,
    growth: GrowthController,
    surfaces: RenderSurfacePair,
    center: Vec2,
    disk_rotation: f32,
    star_count: usize,
    rng: Pcg32,
    frames: u64,
}

impl<S: FrameScheduler> AnimationLoop<S> {
    /// Build the scene and paint the first background. Call `start()` to schedule.
    pub fn new(settings: &Settings, width: u32, height: u32, scheduler: S, seed: u64) -> Self {
        let surfaces = RenderSurfacePair::new(width, height);
        let center = surfaces.size() / 2.0;
        let mut anim = Self {
            scheduler,
            pending: None,
            clock: FrameClock::new(settings.tick_unit_ms, settings.max_delta_ticks),
            field: ParticleField::new(),
            growth: GrowthController::new(settings.growth_duration_ms, settings.tick_unit_ms),
            surfaces,
            center,
            disk_rotation: 0.0,
            star_count: settings.star_count(),
            rng: Pcg32::seed_from_u64(seed),
            frames: 0,
        };
        anim.populate();
        log::info!(
            "Animation ready: {}x{}, {} stars, seed {}",
            width,
            height,
            anim.star_count,
            seed
        );
        anim
    }

    pub fn growth(&self) -> &GrowthController {
        &self.growth
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn surfaces(&self) -> &RenderSurfacePair {
        &self.surfaces
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn disk_rotation(&self) -> f32 {
        self.disk_rotation
    }

    pub fn star_count(&self) -> usize {
        self.star_count
    }

    /// Frames painted since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Whether a frame callback is outstanding
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// True while the black hole is growing or has consumed the screen
    pub fn is_active(&self) -> bool {
        self.growth.is_active()
    }

    /// Begin (or keep) requesting frames
    pub fn start(&mut self) {
        if self.pending.is_none() && self.growth.state() != GrowthState::Exhausted {
            self.clock.reset();
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    /// Cancel the outstanding frame request, if any
    pub fn stop(&mut self) {
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
    }

    /// Start the horizon growing. Returns whether growth actually began.
    pub fn start_growth(&mut self) -> bool {
        self.growth.start(self.surfaces.size())
    }

    /// Display refresh callback at wall-clock `now_ms`
    pub fn on_frame(&mut self, now_ms: f64) -> FrameOutcome {
        if self.pending.take().is_none() {
            log::debug!("Frame callback with nothing pending at {now_ms:.1}ms");
            return FrameOutcome::Skipped;
        }

        let dt = self.clock.delta_ticks(now_ms);
        let outcome = self.step(dt);
        if outcome == FrameOutcome::Continue {
            self.pending = Some(self.scheduler.request_frame());
        }
        outcome
    }

    /// Run one tick of `dt` ticks without touching the scheduler
    pub fn step(&mut self, dt: f32) -> FrameOutcome {
        if self.growth.state() == GrowthState::Exhausted {
            return FrameOutcome::Halted;
        }
        let dt = self.clock.clamp(dt);

        let radius = self.growth.radius();
        let consumed = self.field.update(dt, self.growth.is_growing(), radius);
        if consumed > 0 {
            log::trace!("{consumed} stars consumed, {} left", self.field.len());
        }

        self.disk_rotation = crate::wrap_angle(self.disk_rotation + DISK_SPIN_PER_TICK * dt);
        self.paint(radius);
        self.frames += 1;

        match self.growth.advance(dt) {
            GrowthStep::Continue => FrameOutcome::Continue,
            GrowthStep::Exhausted => {
                self.surfaces.fill(SPACE);
                FrameOutcome::Halted
            }
        }
    }

    /// Back to idle with a fresh star field; resumes scheduling. Idempotent.
    pub fn reset(&mut self) {
        self.growth.reset();
        self.populate();
        self.start();
        log::debug!("Animation reset: {} stars", self.field.len());
    }

    /// New surface dimensions; stars and radius are untouched.
    ///
    /// Resizing wipes the layers, so the current scene is repainted right away.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surfaces.resize(width, height);
        self.center = self.surfaces.size() / 2.0;
        if self.growth.state() == GrowthState::Exhausted {
            self.surfaces.fill(SPACE);
        } else {
            self.paint(self.growth.radius());
        }
        log::debug!("Surfaces resized to {width}x{height}");
    }

    /// Reinitialize the stars and repaint both layers
    fn populate(&mut self) {
        let size = self.surfaces.size();
        self.field
            .initialize(self.star_count, size, self.center, &mut self.rng);
        self.paint(self.growth.radius());
    }

    fn paint(&mut self, radius: f32) {
        let size = self.surfaces.size();
        let RenderSurfacePair {
            background,
            foreground,
        } = &mut self.surfaces;

        BackgroundRenderer.paint(background, self.field.particles(), self.center);

        foreground.clear();
        AccretionDiskRenderer.paint(foreground, self.center, radius, self.disk_rotation);
        LensingCompositor.paint(foreground, background, self.center, radius, size);
        EventHorizon.paint(foreground, self.center, radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::IDLE_RADIUS;
    use crate::renderer::Rgba;

    fn settings(stars: usize) -> Settings {
        Settings {
            star_count: Some(stars),
            ..Settings::default()
        }
    }

    fn anim(w: u32, h: u32, stars: usize) -> AnimationLoop<ManualScheduler> {
        AnimationLoop::new(&settings(stars), w, h, ManualScheduler::new(), 42)
    }

    #[test]
    fn test_new_paints_first_frame() {
        let a = anim(200, 150, 50);
        assert_eq!(a.field().len(), 50);
        assert_eq!(a.center(), Vec2::new(100.0, 75.0));
        assert!(!a.is_scheduled());
        assert!(a.surfaces().background.pixels().iter().all(|p| p.is_opaque()));
        // Horizon center is black on the foreground
        assert_eq!(a.surfaces().foreground.pixel(100, 75), Some(Rgba::BLACK));
    }

    #[test]
    fn test_idle_frames_keep_scheduling() {
        let mut a = anim(160, 120, 20);
        a.start();
        a.start();
        assert_eq!(a.scheduler().pending().len(), 1);

        let mut now = 0.0;
        for _ in 0..10 {
            assert!(a.scheduler_mut().fire().is_some());
            assert_eq!(a.on_frame(now), FrameOutcome::Continue);
            assert_eq!(a.scheduler().pending().len(), 1);
            now += 16.67;
        }
        assert_eq!(a.growth().radius(), IDLE_RADIUS);
        assert_eq!(a.frames(), 10);
    }

    #[test]
    fn test_growth_halts_on_tick_270() {
        // Same aspect as 800x600, so the same 4500ms schedule applies
        let mut a = anim(400, 300, 0);
        a.start();
        assert!(a.start_growth());
        assert!(a.is_active());

        let mut now = 0.0;
        let mut ticks = 0;
        loop {
            a.scheduler_mut().fire();
            ticks += 1;
            // First frame counts as one nominal tick, later ones are 16.67ms apart
            match a.on_frame(now) {
                FrameOutcome::Continue => {}
                FrameOutcome::Halted => break,
                FrameOutcome::Skipped => panic!("lost the frame request"),
            }
            now += 16.67;
            assert!(ticks < 1000);
        }

        assert_eq!(ticks, 270);
        assert_eq!(a.growth().state(), GrowthState::Exhausted);
        assert!(!a.is_scheduled());
        assert!(a.scheduler().pending().is_empty());
        assert!(a.surfaces().background.pixels().iter().all(|p| *p == Rgba::BLACK));
        assert!(a.surfaces().foreground.pixels().iter().all(|p| *p == Rgba::BLACK));

        // Nothing moves once exhausted
        let frozen = a.growth().radius();
        assert_eq!(a.step(1.0), FrameOutcome::Halted);
        assert_eq!(a.growth().radius(), frozen);
        assert_eq!(a.on_frame(now), FrameOutcome::Skipped);
    }

    #[test]
    fn test_growth_consumes_stars() {
        let mut a = anim(400, 300, 300);
        a.start_growth();
        let mut last = a.field().len();
        let mut radius = a.growth().radius();
        for _ in 0..60 {
            a.step(1.0);
            assert!(a.field().len() <= last);
            assert!(a.growth().radius() >= radius);
            last = a.field().len();
            radius = a.growth().radius();
        }
        assert!(last < 300);
        // Survivors are outside the horizon used for this tick's test
        assert!(a.field().particles().iter().all(|p| p.distance > 50.5));
    }

    #[test]
    fn test_reset_mid_growth() {
        let mut a = anim(800, 600, 300);
        a.start();
        a.start_growth();
        while a.growth().radius() < 300.0 {
            assert_eq!(a.step(1.0), FrameOutcome::Continue);
        }
        assert!(a.field().len() < 300);

        a.reset();
        assert_eq!(a.growth().radius(), IDLE_RADIUS);
        assert_eq!(a.growth().state(), GrowthState::Idle);
        assert_eq!(a.field().len(), 300);
        assert!(!a.is_active());
        // Still exactly one outstanding request
        assert_eq!(a.scheduler().pending().len(), 1);
    }

    #[test]
    fn test_reset_is_idempotent_and_resumes_once() {
        let mut a = anim(300, 300, 80);
        a.start_growth();
        for _ in 0..10 {
            a.step(4.0);
        }
        a.reset();
        let once = (a.growth().state(), a.growth().radius(), a.field().len());
        a.reset();
        let twice = (a.growth().state(), a.growth().radius(), a.field().len());
        assert_eq!(once, twice);
        assert_eq!(twice, (GrowthState::Idle, IDLE_RADIUS, 80));
        assert_eq!(a.scheduler().pending().len(), 1);
        assert_eq!(a.scheduler().total_requests(), 1);
    }

    #[test]
    fn test_reset_after_exhaustion_resumes_scheduling() {
        let mut a = anim(120, 90, 10);
        a.start();
        a.start_growth();
        while a.step(4.0) == FrameOutcome::Continue {}
        // Simulate the host dropping the pending callback on halt
        a.stop();
        assert!(!a.is_scheduled());

        a.reset();
        assert!(a.is_scheduled());
        assert_eq!(a.growth().state(), GrowthState::Idle);
        assert_ne!(a.surfaces().background.pixel(0, 0), None);
    }

    #[test]
    fn test_stop_cancels_request() {
        let mut a = anim(64, 64, 5);
        a.start();
        a.stop();
        assert!(a.scheduler().pending().is_empty());
        assert_eq!(a.on_frame(10.0), FrameOutcome::Skipped);
    }

    #[test]
    fn test_huge_gap_is_clamped() {
        let mut a = anim(800, 600, 0);
        a.start();
        a.start_growth();
        a.scheduler_mut().fire();
        a.on_frame(0.0);
        a.scheduler_mut().fire();
        // A minute in a background tab
        a.on_frame(60_000.0);
        let rate = a.growth().growth_rate();
        let expected = IDLE_RADIUS + rate * (1.0 + crate::consts::MAX_DELTA_TICKS);
        assert!((a.growth().radius() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_resize_recenters_without_touching_state() {
        let mut a = anim(200, 200, 40);
        a.start_growth();
        a.step(1.0);
        let radius = a.growth().radius();
        let stars = a.field().len();

        a.resize(1000, 500);
        assert_eq!(a.center(), Vec2::new(500.0, 250.0));
        assert_eq!(a.surfaces().size(), Vec2::new(1000.0, 500.0));
        assert_eq!(a.surfaces().foreground.size(), Vec2::new(1000.0, 500.0));
        assert_eq!(a.growth().radius(), radius);
        assert_eq!(a.field().len(), stars);

        // Repainted around the new center, not left blank
        assert!(a.surfaces().background.pixels().iter().all(|p| p.is_opaque()));
        assert_eq!(a.surfaces().foreground.pixel(500, 250), Some(Rgba::BLACK));
        assert_eq!(a.surfaces().foreground.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_resize_after_exhaustion_stays_black() {
        let mut a = anim(120, 90, 10);
        a.start_growth();
        while a.step(4.0) == FrameOutcome::Continue {}
        a.resize(60, 40);
        assert!(a.surfaces().composite().pixels().iter().all(|p| *p == Rgba::BLACK));
    }

    #[test]
    fn test_frame_paints_radius_from_before_advance() {
        let mut a = anim(800, 600, 0);
        a.start_growth();
        let rate = a.growth().growth_rate();
        assert!(rate > 1.0);
        assert_eq!(a.step(1.0), FrameOutcome::Continue);
        assert!((a.growth().radius() - (IDLE_RADIUS + rate)).abs() < 1e-4);

        // 50.5px from the center: outside a radius-50 horizon and inside the
        // lens's 51px inner edge, so only a larger horizon would cover it
        let fg = &a.surfaces().foreground;
        assert_eq!(fg.pixel(450, 300), Some(Rgba::TRANSPARENT));
        assert_eq!(fg.pixel(349, 300), Some(Rgba::TRANSPARENT));
        assert_eq!(fg.pixel(430, 300), Some(Rgba::BLACK));
        // Lensed space starts just past it
        assert!(fg.pixel(452, 300).is_some_and(|p| p.is_opaque()));
    }

    #[test]
    #[cfg_attr(debug_assertions, ignore = "frame cost is only meaningful in optimized builds")]
    fn test_full_hd_collapse_keeps_wall_clock_pace() {
        use std::time::Instant;

        let mut a = AnimationLoop::new(&Settings::default(), 1920, 1080, ManualScheduler::new(), 7);
        a.start();
        a.start_growth();

        let begin = Instant::now();
        loop {
            a.scheduler_mut().fire();
            let now = begin.elapsed().as_secs_f64() * 1000.0;
            match a.on_frame(now) {
                FrameOutcome::Continue => {}
                FrameOutcome::Halted => break,
                FrameOutcome::Skipped => panic!("lost the frame request"),
            }
        }
        let elapsed_ms = begin.elapsed().as_secs_f64() * 1000.0;

        // Frames slower than the delta clamp would stretch the collapse
        let duration = f64::from(crate::consts::GROWTH_DURATION_MS);
        assert!(
            elapsed_ms < duration * 1.25,
            "collapse took {elapsed_ms:.0}ms over {} frames",
            a.frames()
        );
    }

    #[test]
    fn test_disk_rotates_with_time() {
        let mut a = anim(100, 100, 0);
        a.step(1.0);
        a.step(2.0);
        assert!((a.disk_rotation() - 0.018).abs() < 1e-6);
    }
}
