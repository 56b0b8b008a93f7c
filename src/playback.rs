// ============================================================================
// playback.rs — LifeRewind
// The sandbox core: owns the history ring and the playback state machine,
// and decides per tick whether to compute forward, jump, or stay put.
// ============================================================================

use rand::Rng;

use crate::config::SandboxConfig;
use crate::grid::Grid;
use crate::history::HistoryRing;

/// Playback state. Represented as one enum so illegal combinations of the
/// old `simulate`/`scrubbing` flags cannot exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Paused; the grid is directly paintable.
    Editing,
    /// Auto-advancing one generation every `simulate_period` seconds.
    Playing,
    /// Paused while the user drags through the history window.
    Scrubbing,
}

impl PlaybackState {
    pub fn name(self) -> &'static str {
        match self {
            PlaybackState::Editing => "EDITING",
            PlaybackState::Playing => "PLAYING",
            PlaybackState::Scrubbing => "SCRUBBING",
        }
    }
}

/// Discrete commands from the input collaborators. Commands that are invalid
/// in the current state are ignored (logged at debug), never errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Set one cell while editing.
    Paint { x: usize, y: usize, alive: bool },
    Play,
    Pause,
    BeginScrub,
    /// Pointer position on the scrub bar, as a fraction of its width.
    ScrubTo(f64),
    EndScrub,
    /// Turn roughly `fill` of all cells alive, while editing.
    Sprinkle { fill: f64 },
    Reset,
}

/// Read-only view handed to the rendering collaborator each frame.
pub struct RenderView<'a> {
    pub grid: &'a Grid,
    pub tail: usize,
    pub head: usize,
    pub target: usize,
    pub capacity: usize,
    pub state: PlaybackState,
    /// Offset of the displayed frame from `tail`, for the scrub-bar marker.
    pub frame_offset: usize,
}

/// Shortest accepted generation period. The accumulator drain in `tick`
/// subtracts one period per iteration, so a zero or negative period would
/// never terminate.
const MIN_SIMULATE_PERIOD: f32 = 0.01;

/// The simulation-and-history core. Exclusively owned and ticked by one
/// driver loop; runs to completion every tick with no blocking or I/O.
pub struct Sandbox {
    ring: HistoryRing,
    state: PlaybackState,
    simulate_period: f32,
    dt_accum: f32,
}

impl Sandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            ring: HistoryRing::new(config.history_size, config.grid_width, config.grid_height),
            state: PlaybackState::Editing,
            simulate_period: clamp_period(config.simulate_period),
            dt_accum: 0.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn simulate_period(&self) -> f32 {
        self.simulate_period
    }

    pub fn set_simulate_period(&mut self, period: f32) {
        self.simulate_period = clamp_period(period);
    }

    pub fn ring(&self) -> &HistoryRing {
        &self.ring
    }

    pub fn view(&self) -> RenderView<'_> {
        RenderView {
            grid: self.ring.current_grid(),
            tail: self.ring.tail(),
            head: self.ring.head(),
            target: self.ring.target(),
            capacity: self.ring.capacity(),
            state: self.state,
            frame_offset: self.ring.offset_of_head(),
        }
    }

    /// Run one tick: apply the frame's commands, then the scheduling
    /// algorithm. Bounded work — the catch-up loop walks at most one full
    /// ring circumference.
    pub fn tick(&mut self, dt: f32, commands: &[Command]) {
        for &command in commands {
            self.apply(command);
        }

        self.dt_accum += dt;
        if self.state == PlaybackState::Playing {
            while self.dt_accum >= self.simulate_period {
                self.dt_accum -= self.simulate_period;
                let next = (self.ring.head() + 1) % self.ring.capacity();
                self.ring.set_target(next);
                if next == self.ring.tail() {
                    // Controlled eviction: the slot about to be reused still
                    // holds the oldest frame, which must not be replayed.
                    self.ring.invalidate(next);
                }
            }
        }

        // Replaying a cached frame is a jump, not a recomputation.
        if self.ring.target() != self.ring.head() && self.ring.is_computed(self.ring.target()) {
            self.ring.jump_head_to_target();
            return;
        }

        // Forward-simulation catch-up: zero, one, or many steps.
        while self.ring.target() != self.ring.head() {
            self.ring.advance_head();
            if !self.ring.is_computed(self.ring.head()) {
                let prev = self.ring.prev_slot(self.ring.head());
                let next = self.ring.grid_at(prev).step();
                self.ring.write_head(next);
            }
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Paint { x, y, alive } => {
                if self.state != PlaybackState::Editing {
                    log::debug!("ignoring paint while {}", self.state.name());
                    return;
                }
                let grid = self.ring.current_grid_mut();
                if !grid.contains(x, y) {
                    log::debug!("ignoring paint outside grid at ({x}, {y})");
                    return;
                }
                grid.set(x, y, alive);
                // The past changed; cached history is no longer valid.
                self.ring.collapse_to_current();
            }
            Command::Play => {
                if self.state != PlaybackState::Editing {
                    log::debug!("ignoring play while {}", self.state.name());
                    return;
                }
                self.state = PlaybackState::Playing;
                self.dt_accum = 0.0;
                log::info!("playing at {:.2}s per generation", self.simulate_period);
            }
            Command::Pause => {
                if self.state != PlaybackState::Playing {
                    log::debug!("ignoring pause while {}", self.state.name());
                    return;
                }
                self.state = PlaybackState::Editing;
                log::info!("paused");
            }
            Command::BeginScrub => {
                if self.state != PlaybackState::Editing {
                    log::debug!("ignoring scrub start while {}", self.state.name());
                    return;
                }
                self.state = PlaybackState::Scrubbing;
            }
            Command::ScrubTo(fraction) => {
                if self.state != PlaybackState::Scrubbing {
                    log::debug!("ignoring scrub while {}", self.state.name());
                    return;
                }
                let capacity = self.ring.capacity();
                let offset = ((fraction.clamp(0.0, 1.0) * capacity as f64) as usize)
                    .min(capacity - 1);
                self.ring
                    .set_target((self.ring.tail() + offset) % capacity);
            }
            Command::EndScrub => {
                if self.state != PlaybackState::Scrubbing {
                    log::debug!("ignoring scrub end while {}", self.state.name());
                    return;
                }
                self.state = PlaybackState::Editing;
            }
            Command::Sprinkle { fill } => {
                if self.state != PlaybackState::Editing {
                    log::debug!("ignoring sprinkle while {}", self.state.name());
                    return;
                }
                let mut rng = rand::thread_rng();
                self.sprinkle_with(&mut rng, fill);
            }
            Command::Reset => {
                self.ring.reset();
                self.dt_accum = 0.0;
                if self.state == PlaybackState::Scrubbing {
                    self.state = PlaybackState::Editing;
                }
                log::info!("reset to a single empty frame");
            }
        }
    }

    /// Sprinkle with an injected RNG; the `Sprinkle` command uses the thread
    /// RNG, the headless runner a caller-controlled one.
    pub fn sprinkle_with<R: Rng>(&mut self, rng: &mut R, fill: f64) {
        self.ring.current_grid_mut().sprinkle(rng, fill);
        self.ring.collapse_to_current();
    }
}

// NaN compares false against the minimum, and f32::max then returns the
// minimum, so non-finite periods are clamped too.
fn clamp_period(period: f32) -> f32 {
    period.max(MIN_SIMULATE_PERIOD)
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(width: usize, height: usize, capacity: usize, period: f32) -> Sandbox {
        Sandbox::new(&SandboxConfig {
            grid_width: width,
            grid_height: height,
            history_size: capacity,
            simulate_period: period,
            ..SandboxConfig::default()
        })
    }

    fn blinker_sandbox(capacity: usize, period: f32) -> Sandbox {
        let mut sandbox = sandbox(5, 5, capacity, period);
        for x in 1..=3 {
            sandbox.tick(0.0, &[Command::Paint { x, y: 2, alive: true }]);
        }
        sandbox
    }

    /// Scrub to the slot `offset` frames after `tail`.
    fn scrub_to_offset(sandbox: &mut Sandbox, offset: usize) {
        let fraction = (offset as f64 + 0.5) / sandbox.ring().capacity() as f64;
        sandbox.tick(0.0, &[Command::BeginScrub, Command::ScrubTo(fraction)]);
        sandbox.tick(0.0, &[Command::EndScrub]);
    }

    #[test]
    fn play_advances_one_generation_per_period() {
        let mut sandbox = blinker_sandbox(8, 0.5);
        sandbox.tick(0.0, &[Command::Play]);
        assert_eq!(sandbox.state(), PlaybackState::Playing);

        sandbox.tick(0.49, &[]);
        assert_eq!(sandbox.view().head, sandbox.view().tail);

        sandbox.tick(0.02, &[]);
        assert_eq!(sandbox.view().frame_offset, 1);
    }

    #[test]
    fn end_to_end_three_periods_at_capacity_four() {
        let mut sandbox = sandbox(8, 8, 4, 0.25);
        sandbox.tick(0.0, &[Command::Paint { x: 3, y: 3, alive: true }]);
        let gen0 = sandbox.view().grid.clone();
        let start = sandbox.view().head;

        sandbox.tick(0.0, &[Command::Play]);
        sandbox.tick(0.25, &[]);
        sandbox.tick(0.25, &[]);
        sandbox.tick(0.25, &[]);

        let view = sandbox.view();
        assert_eq!(view.head, (start + 3) % 4);
        assert_eq!(sandbox.ring().computed_count(), 4);
        for offset in 0..=3 {
            assert!(sandbox.ring().read(offset).unwrap().computed);
        }
        let expected = gen0.step().step().step();
        assert_eq!(*sandbox.view().grid, expected);
    }

    #[test]
    fn ring_stays_bounded_when_playing_past_capacity() {
        let mut sandbox = blinker_sandbox(4, 0.1);
        sandbox.tick(0.0, &[Command::Play]);
        for _ in 0..20 {
            sandbox.tick(0.1, &[]);
        }
        assert_eq!(sandbox.ring().computed_count(), 4);
        assert_eq!(sandbox.ring().len(), 4);
    }

    #[test]
    fn multiple_elapsed_periods_in_one_tick_advance_once_per_spec_target() {
        // Backlogged time proposes head+1 repeatedly within a tick; the
        // catch-up loop then realizes a single new generation.
        let mut sandbox = blinker_sandbox(8, 0.1);
        sandbox.tick(0.0, &[Command::Play]);
        sandbox.tick(0.35, &[]);
        assert_eq!(sandbox.view().frame_offset, 1);
    }

    #[test]
    fn zero_period_config_is_clamped_and_tick_terminates() {
        // A raw config can carry simulate_period = 0.0; without clamping,
        // the accumulator drain would subtract zero forever.
        let mut sandbox = sandbox(5, 5, 8, 0.0);
        assert!(sandbox.simulate_period() >= 0.01);

        sandbox.tick(0.0, &[Command::Paint { x: 2, y: 2, alive: true }]);
        sandbox.tick(0.0, &[Command::Play]);
        sandbox.tick(0.016, &[]);
        assert_eq!(sandbox.view().frame_offset, 1);
    }

    #[test]
    fn nonfinite_period_is_clamped() {
        let mut sandbox = sandbox(5, 5, 8, f32::NAN);
        assert!(sandbox.simulate_period() >= 0.01);
        sandbox.set_simulate_period(f32::NAN);
        assert!(sandbox.simulate_period() >= 0.01);
        sandbox.tick(1.0, &[]);
    }

    #[test]
    fn paint_is_ignored_while_playing() {
        let mut sandbox = blinker_sandbox(8, 0.5);
        sandbox.tick(0.0, &[Command::Play]);
        let before = sandbox.view().grid.clone();
        sandbox.tick(0.0, &[Command::Paint { x: 0, y: 0, alive: true }]);
        assert_eq!(*sandbox.view().grid, before);
    }

    #[test]
    fn begin_scrub_is_ignored_while_playing() {
        let mut sandbox = blinker_sandbox(8, 0.5);
        sandbox.tick(0.0, &[Command::Play]);
        sandbox.tick(0.0, &[Command::BeginScrub]);
        assert_eq!(sandbox.state(), PlaybackState::Playing);
    }

    #[test]
    fn edit_collapses_history_to_one_frame() {
        let mut sandbox = blinker_sandbox(8, 0.25);
        sandbox.tick(0.0, &[Command::Play]);
        for _ in 0..5 {
            sandbox.tick(0.25, &[]);
        }
        sandbox.tick(0.0, &[Command::Pause]);
        sandbox.tick(0.0, &[Command::Paint { x: 0, y: 0, alive: true }]);

        let view = sandbox.view();
        assert_eq!(view.tail, view.head);
        assert_eq!(view.target, view.head);
        assert_eq!(sandbox.ring().computed_count(), 1);
    }

    #[test]
    fn scrubbing_back_replays_the_identical_grid() {
        let mut sandbox = blinker_sandbox(16, 0.25);
        sandbox.tick(0.0, &[Command::Play]);
        for _ in 0..6 {
            sandbox.tick(0.25, &[]);
        }
        sandbox.tick(0.0, &[Command::Pause]);

        let latest = sandbox.view().grid.clone();
        let latest_offset = sandbox.view().frame_offset;

        scrub_to_offset(&mut sandbox, 2);
        let mid = sandbox.view().grid.clone();

        scrub_to_offset(&mut sandbox, latest_offset);
        assert_eq!(*sandbox.view().grid, latest);

        scrub_to_offset(&mut sandbox, 2);
        assert_eq!(*sandbox.view().grid, mid);
    }

    #[test]
    fn scrubbing_ahead_of_head_simulates_forward() {
        let mut sandbox = blinker_sandbox(16, 0.25);
        let gen0 = sandbox.view().grid.clone();

        scrub_to_offset(&mut sandbox, 4);

        assert_eq!(sandbox.view().frame_offset, 4);
        assert_eq!(*sandbox.view().grid, gen0.step().step().step().step());
    }

    #[test]
    fn reset_clears_grid_and_history_from_any_state() {
        let mut sandbox = blinker_sandbox(8, 0.25);
        sandbox.tick(0.0, &[Command::Play]);
        sandbox.tick(0.25, &[]);
        sandbox.tick(0.0, &[Command::Reset]);

        let view = sandbox.view();
        assert_eq!((view.tail, view.head, view.target), (0, 0, 0));
        assert_eq!(view.grid.population(), 0);
        assert_eq!(sandbox.ring().computed_count(), 1);
    }

    #[test]
    fn paint_outside_grid_is_a_no_op() {
        let mut sandbox = sandbox(4, 4, 4, 0.5);
        sandbox.tick(0.0, &[Command::Paint { x: 9, y: 0, alive: true }]);
        assert_eq!(sandbox.view().grid.population(), 0);
        assert_eq!(sandbox.ring().computed_count(), 1);
    }

    #[test]
    fn corner_cells_are_paintable() {
        // The original rejected row/column zero; the full range is valid.
        let mut sandbox = sandbox(4, 4, 4, 0.5);
        sandbox.tick(0.0, &[Command::Paint { x: 0, y: 0, alive: true }]);
        assert!(sandbox.view().grid.get(0, 0));
    }
}
