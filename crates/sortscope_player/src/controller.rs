//! Playback controller.
//!
//! A synchronous state machine over the sequence store. It never sleeps:
//! the running loop's suspension lives in [`crate::PlaybackDriver`], which
//! calls [`PlaybackController::tick`] once per elapsed delay. Every cursor
//! change returns exactly one [`StepActivated`].

use std::time::Duration;

use sortscope_core::{Result, Sequence, SequenceStore, Step, StepActivated, Totals};

use crate::pacer::StepPacer;

/// Configuration for the playback controller.
#[derive(Clone, Debug)]
pub struct PlaybackConfig {
    /// Delay between steps at speed 1.0.
    pub base_delay: Duration,
    /// Initial speed multiplier.
    pub initial_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            initial_speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Set the base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the initial speed multiplier.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }
}

/// Current mode of the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackMode {
    /// Nothing loaded, or loaded and not yet started.
    #[default]
    Idle,
    /// The timer loop is advancing the cursor.
    Running,
    /// Cursor frozen; manual stepping allowed.
    Paused,
    /// Cursor on the last step, loop ended naturally.
    Finished,
}

impl PlaybackMode {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackMode::Idle => "idle",
            PlaybackMode::Running => "running",
            PlaybackMode::Paused => "paused",
            PlaybackMode::Finished => "finished",
        }
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one elapsed delay in the running loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    /// The cursor advanced onto a new step.
    Stepped(StepActivated),
    /// The cursor was already on the last step; playback is finished.
    Finished,
    /// Not running; the tick was ignored.
    Halted,
}

/// Drives the cursor of the live sequence.
pub struct PlaybackController {
    store: SequenceStore,
    mode: PlaybackMode,
    pacer: StepPacer,
}

impl PlaybackController {
    /// Create an idle controller with nothing loaded.
    pub fn new(config: PlaybackConfig) -> Self {
        let mut pacer = StepPacer::new(config.base_delay);
        pacer.set_speed(config.initial_speed);

        Self {
            store: SequenceStore::new(),
            mode: PlaybackMode::Idle,
            pacer,
        }
    }

    /// Get the current mode.
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Current cursor, `None` when nothing is loaded.
    pub fn cursor(&self) -> Option<usize> {
        self.store.cursor()
    }

    /// Number of steps in the live sequence.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Grand totals of the live sequence.
    pub fn final_totals(&self) -> Option<Totals> {
        self.store.final_totals()
    }

    /// Progress of the cursor as a fraction (0.0 when nothing is loaded).
    pub fn progress(&self) -> f64 {
        match self.store.cursor() {
            Some(cursor) => (cursor + 1) as f64 / self.store.len() as f64,
            None => 0.0,
        }
    }

    /// Get the current speed multiplier.
    pub fn speed(&self) -> f64 {
        self.pacer.speed()
    }

    /// Set the speed multiplier; takes effect from the next delay.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        let speed = self.pacer.set_speed(speed);
        tracing::debug!(speed, "speed changed");
        speed
    }

    /// How long the running loop waits before the next tick.
    pub fn step_delay(&self) -> Duration {
        self.pacer.delay()
    }

    /// Check if a backward step would be honored.
    pub fn can_step_backward(&self) -> bool {
        self.mode == PlaybackMode::Paused && self.store.cursor().is_some_and(|c| c > 0)
    }

    /// Check if a forward step would be honored.
    pub fn can_step_forward(&self) -> bool {
        self.mode == PlaybackMode::Paused && self.store.is_loaded() && !self.store.at_end()
    }

    /// Replace the live sequence; cursor 0, mode idle.
    ///
    /// On [`sortscope_core::EngineError::EmptySequence`] nothing changes.
    pub fn load(&mut self, steps: Vec<Step>) -> Result<()> {
        let sequence = Sequence::new(steps)?;
        self.adopt(sequence);
        Ok(())
    }

    /// Replace the live sequence with an already validated one.
    pub fn adopt(&mut self, sequence: Sequence) {
        let len = sequence.len();
        self.store.adopt(sequence);
        self.mode = PlaybackMode::Idle;
        tracing::info!(len, "sequence loaded");
    }

    /// Start or resume playback.
    ///
    /// From idle or finished this rewinds to the first step and returns its
    /// event. From paused it resumes at the frozen cursor and emits nothing,
    /// the step there is already displayed. Otherwise a no-op.
    pub fn start(&mut self) -> Option<StepActivated> {
        match self.mode {
            PlaybackMode::Idle | PlaybackMode::Finished => {
                if !self.store.is_loaded() {
                    tracing::debug!("start ignored, no sequence loaded");
                    return None;
                }
                self.store.rewind();
                self.mode = PlaybackMode::Running;
                tracing::debug!(len = self.store.len(), "playback started");
                Some(self.activation())
            }
            PlaybackMode::Paused => {
                self.mode = PlaybackMode::Running;
                tracing::debug!(cursor = ?self.store.cursor(), "playback resumed");
                None
            }
            PlaybackMode::Running => None,
        }
    }

    /// Freeze the cursor. Only honored while running.
    pub fn pause(&mut self) {
        if self.mode == PlaybackMode::Running {
            self.mode = PlaybackMode::Paused;
            tracing::debug!(cursor = ?self.store.cursor(), "playback paused");
        }
    }

    /// Discard the live sequence and return to idle.
    pub fn reset(&mut self) {
        self.store.clear();
        self.mode = PlaybackMode::Idle;
        tracing::info!("playback reset");
    }

    /// Move one step forward. Only honored while paused and not on the last step.
    pub fn step_forward(&mut self) -> Option<StepActivated> {
        if self.mode != PlaybackMode::Paused {
            tracing::debug!(mode = %self.mode, "step forward ignored");
            return None;
        }
        self.store.advance().then(|| self.activation())
    }

    /// Move one step backward. Only honored while paused and not on the first step.
    pub fn step_backward(&mut self) -> Option<StepActivated> {
        if self.mode != PlaybackMode::Paused {
            tracing::debug!(mode = %self.mode, "step backward ignored");
            return None;
        }
        self.store.retreat().then(|| self.activation())
    }

    /// Called by the running loop after each delay has elapsed.
    ///
    /// Advances the cursor only if still running; a pause that landed during
    /// the delay is therefore always observed first.
    pub fn tick(&mut self) -> Tick {
        if self.mode != PlaybackMode::Running {
            return Tick::Halted;
        }
        if self.store.advance() {
            Tick::Stepped(self.activation())
        } else {
            self.mode = PlaybackMode::Finished;
            tracing::info!(len = self.store.len(), "playback finished");
            Tick::Finished
        }
    }

    /// Event for the step under the cursor.
    fn activation(&self) -> StepActivated {
        let sequence = self.store.sequence();
        let cursor = self.store.cursor().unwrap_or_default();
        match sequence.map(|s| StepActivated::at(s, cursor)) {
            Some(Ok(event)) => event,
            Some(Err(err)) => panic!("playback cursor invariant violated: {err}"),
            None => panic!("playback cursor invariant violated: no sequence loaded"),
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
