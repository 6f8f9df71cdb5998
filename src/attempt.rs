//! Attempt controller
//!
//! Owns the avatar for the current attempt, the attempt counter and the single
//! pending respawn timer. The shell drives it once per display frame with the
//! latched input and the wall-clock time since the previous frame.

use glam::Vec2;

use crate::consts::*;
use crate::sim::{
    AvatarState, Course, EffectsConfig, GravityDir, StepOutcome, TickInput, Vehicle, tick,
};

/// Where the current attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Running,
    /// Frozen, waiting for the respawn timer
    Dead,
    /// Frozen until an explicit retry or exit
    Won,
}

/// Identifies one scheduled respawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct RespawnTimer {
    handle: TimerHandle,
    remaining_ms: f64,
}

/// Avatar pose for presentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    pub rotation: f32,
    pub gravity: GravityDir,
    pub vehicle: Vehicle,
}

/// Everything the shell needs after a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub pose: Pose,
    pub attempt: u32,
    /// Whole percent, 0..=100
    pub progress: u8,
    pub phase: AttemptPhase,
    pub dead: bool,
    pub won: bool,
    /// A new attempt started this frame
    pub respawned: bool,
}

pub struct AttemptController {
    course: Course,
    avatar: AvatarState,
    attempt: u32,
    phase: AttemptPhase,
    respawn: Option<RespawnTimer>,
    next_handle: u64,
    effects: EffectsConfig,
    stopped: bool,
}

impl AttemptController {
    pub fn new(course: Course) -> Self {
        Self::with_effects(course, EffectsConfig::default())
    }

    pub fn with_effects(course: Course, effects: EffectsConfig) -> Self {
        log::info!(
            "Attempt 1 started ({} objects, level end x={})",
            course.objects().len(),
            course.end_x()
        );
        Self {
            course,
            avatar: AvatarState::new(),
            attempt: 1,
            phase: AttemptPhase::Running,
            respawn: None,
            next_handle: 0,
            effects,
            stopped: false,
        }
    }

    /// Advance one display frame
    ///
    /// The respawn timer is advanced first; a frame in which it fires only
    /// installs the fresh avatar.
    pub fn frame(&mut self, input: &TickInput, elapsed_ms: f64) -> FrameReport {
        if self.stopped {
            return self.report(false);
        }

        if self.advance_timer(elapsed_ms) {
            self.start_attempt(self.attempt + 1);
            return self.report(true);
        }

        match tick(&mut self.avatar, &self.course, input) {
            StepOutcome::Died => self.kill(),
            StepOutcome::Won => self.win(),
            StepOutcome::Running | StepOutcome::Frozen => {}
        }
        self.report(false)
    }

    /// End the current attempt in death. No-op unless the avatar is active.
    pub fn kill(&mut self) {
        let seed = (u64::from(self.attempt) << 32) | (self.avatar.frame & 0xffff_ffff);
        if !self.avatar.die(seed, self.effects) {
            return;
        }
        self.phase = AttemptPhase::Dead;
        log::info!(
            "Attempt {} died at x={:.0} ({}%)",
            self.attempt,
            self.avatar.pos.x,
            self.avatar.progress_percent()
        );
        if !self.stopped {
            self.schedule_respawn();
        }
    }

    /// Start over immediately, superseding any pending respawn
    pub fn retry(&mut self) {
        self.cancel_respawn();
        self.stopped = false;
        log::info!("Retry requested");
        self.start_attempt(self.attempt + 1);
    }

    /// Leave the runtime: no further frames run and no respawn fires
    pub fn stop(&mut self) {
        self.cancel_respawn();
        if !self.stopped {
            log::info!("Runtime stopped after {} attempt(s)", self.attempt);
        }
        self.stopped = true;
    }

    pub fn avatar(&self) -> &AvatarState {
        &self.avatar
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Handle of the respawn waiting to fire, if any
    pub fn pending_respawn(&self) -> Option<TimerHandle> {
        self.respawn.as_ref().map(|t| t.handle)
    }

    pub fn set_effects(&mut self, effects: EffectsConfig) {
        self.effects = effects;
    }

    fn win(&mut self) {
        if self.avatar.finish() {
            self.phase = AttemptPhase::Won;
            self.cancel_respawn();
            log::info!("Level complete on attempt {}", self.attempt);
        }
    }

    fn start_attempt(&mut self, attempt: u32) {
        self.avatar = AvatarState::new();
        self.attempt = attempt;
        self.phase = AttemptPhase::Running;
        log::info!("Attempt {} started", attempt);
    }

    fn schedule_respawn(&mut self) {
        self.cancel_respawn();
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        log::debug!("Respawn {:?} scheduled in {}ms", handle, RESPAWN_DELAY_MS);
        self.respawn = Some(RespawnTimer {
            handle,
            remaining_ms: RESPAWN_DELAY_MS,
        });
    }

    fn cancel_respawn(&mut self) {
        if let Some(timer) = self.respawn.take() {
            log::debug!("Respawn {:?} cancelled", timer.handle);
        }
    }

    /// Returns true when the pending respawn fires
    fn advance_timer(&mut self, elapsed_ms: f64) -> bool {
        let Some(timer) = self.respawn.as_mut() else {
            return false;
        };
        timer.remaining_ms -= elapsed_ms.max(0.0);
        if timer.remaining_ms > 0.0 {
            return false;
        }
        self.respawn = None;
        true
    }

    fn report(&self, respawned: bool) -> FrameReport {
        FrameReport {
            pose: Pose {
                pos: self.avatar.pos,
                rotation: self.avatar.rotation,
                gravity: self.avatar.gravity,
                vehicle: self.avatar.vehicle,
            },
            attempt: self.attempt,
            progress: self.avatar.progress_percent(),
            phase: self.phase,
            dead: self.phase == AttemptPhase::Dead,
            won: self.phase == AttemptPhase::Won,
            respawned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{LevelObject, ObjectKind};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const IDLE: TickInput = TickInput {
        held: false,
        just_pressed: false,
    };

    fn open_course() -> AttemptController {
        AttemptController::new(Course::new(Vec::new()))
    }

    /// Run idle frames until `done` or the frame limit
    fn run_until(
        ctl: &mut AttemptController,
        limit: usize,
        done: impl Fn(&FrameReport) -> bool,
    ) -> Option<FrameReport> {
        (0..limit)
            .map(|_| ctl.frame(&IDLE, FRAME_MS))
            .find(|report| done(report))
    }

    #[test]
    fn test_starts_on_attempt_one() {
        let ctl = open_course();
        assert_eq!(ctl.attempt(), 1);
        assert_eq!(ctl.phase(), AttemptPhase::Running);
        assert!(ctl.pending_respawn().is_none());
    }

    #[test]
    fn test_death_respawns_after_delay() {
        let mut ctl = open_course();
        for _ in 0..10 {
            ctl.frame(&IDLE, FRAME_MS);
        }
        ctl.kill();
        assert_eq!(ctl.phase(), AttemptPhase::Dead);
        assert!(ctl.pending_respawn().is_some());

        // Not before the delay has elapsed
        let report = ctl.frame(&IDLE, RESPAWN_DELAY_MS - 1.0);
        assert!(report.dead);
        assert_eq!(report.attempt, 1);

        let report = ctl.frame(&IDLE, 1.0);
        assert!(report.respawned);
        assert_eq!(report.attempt, 2);
        assert_eq!(report.phase, AttemptPhase::Running);

        let fresh = AvatarState::new();
        assert_eq!(ctl.avatar().pos, fresh.pos);
        assert_eq!(ctl.avatar().vel, fresh.vel);
        assert_eq!(ctl.avatar().vehicle, Vehicle::Cube);
        assert!(ctl.avatar().used_triggers.is_empty());
        assert!(ctl.avatar().active);
        assert!(ctl.pending_respawn().is_none());
    }

    #[test]
    fn test_spike_death_goes_through_controller() {
        let course = Course::new(vec![LevelObject::new("s", ObjectKind::Spike, 0, 1)]);
        let mut ctl = AttemptController::new(course);
        let report = run_until(&mut ctl, 120, |r| r.dead).expect("avatar should hit the spike");
        assert_eq!(report.attempt, 1);
        assert!(!ctl.avatar().active);
        assert!(!ctl.avatar().effects.particles.is_empty());

        let report = run_until(&mut ctl, 60, |r| r.respawned).expect("respawn should fire");
        assert_eq!(report.attempt, 2);
    }

    #[test]
    fn test_second_kill_is_noop() {
        let mut ctl = open_course();
        ctl.kill();
        let first = ctl.pending_respawn();
        ctl.frame(&IDLE, 500.0);
        ctl.kill();
        assert_eq!(ctl.pending_respawn(), first);

        let report = ctl.frame(&IDLE, 300.0);
        assert!(report.respawned);
        assert_eq!(report.attempt, 2);
    }

    #[test]
    fn test_retry_cancels_pending_respawn() {
        let mut ctl = open_course();
        ctl.kill();
        ctl.retry();
        assert_eq!(ctl.attempt(), 2);
        assert!(ctl.pending_respawn().is_none());

        // The superseded timer never fires
        let report = ctl.frame(&IDLE, RESPAWN_DELAY_MS * 2.0);
        assert!(!report.respawned);
        assert_eq!(report.attempt, 2);
    }

    #[test]
    fn test_new_death_restarts_timer() {
        let mut ctl = open_course();
        ctl.kill();
        let first = ctl.pending_respawn();
        ctl.retry();
        ctl.frame(&IDLE, FRAME_MS);
        ctl.kill();
        let second = ctl.pending_respawn();
        assert!(second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn test_win_waits_for_retry() {
        let course = Course::new(vec![LevelObject::new("exit", ObjectKind::Portal, 1, 0)]);
        let mut ctl = AttemptController::new(course);
        let report = run_until(&mut ctl, 120, |r| r.won).expect("avatar should reach the exit");
        assert_eq!(report.attempt, 1);
        assert!(ctl.pending_respawn().is_none());

        let report = ctl.frame(&IDLE, 5_000.0);
        assert!(report.won);
        assert!(!report.respawned);

        ctl.retry();
        assert_eq!(ctl.attempt(), 2);
        assert_eq!(ctl.phase(), AttemptPhase::Running);
    }

    #[test]
    fn test_stop_clears_timer_and_freezes() {
        let mut ctl = open_course();
        ctl.kill();
        ctl.stop();
        assert!(ctl.is_stopped());
        assert!(ctl.pending_respawn().is_none());

        let report = ctl.frame(&IDLE, 10_000.0);
        assert!(!report.respawned);
        assert_eq!(report.attempt, 1);
    }

    #[test]
    fn test_stopped_controller_does_not_tick() {
        let mut ctl = open_course();
        ctl.stop();
        let pos = ctl.avatar().pos;
        ctl.frame(&IDLE, FRAME_MS);
        assert_eq!(ctl.avatar().pos, pos);
    }

    #[test]
    fn test_effects_config_reaches_burst() {
        let mut ctl = open_course();
        ctl.set_effects(EffectsConfig {
            particles: 12,
            shockwave: false,
            flash: true,
        });
        ctl.kill();
        assert_eq!(ctl.avatar().effects.particles.len(), 12);
        assert!(ctl.avatar().effects.shockwave.is_none());
    }
}
