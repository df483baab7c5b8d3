//! Cooperative playback driver.
//!
//! The driver task owns the [`PlaybackController`] and is the only place the
//! cursor and mode are mutated. Its single suspension point is the per-step
//! delay, raced against the command channel with commands polled first, so a
//! pause that arrives while the delay is pending is always applied before the
//! next advance.
//!
//! Callers talk to the driver through a cloneable [`PlayerHandle`] and
//! receive [`PlayerEvent`]s on an unbounded channel.

use sortscope_core::{
    EngineError, ExecutionService, Result, RunRequest, Step, StepActivated,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use crate::controller::{PlaybackConfig, PlaybackController, PlaybackMode, Tick};

/// Commands accepted by the driver.
#[derive(Debug)]
enum Command {
    Load {
        steps: Vec<Step>,
        reply: oneshot::Sender<Result<()>>,
    },
    Start,
    Pause,
    Reset,
    StepForward,
    StepBackward,
    SetSpeed(f64),
}

/// Notifications published by the driver.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// The cursor settled on a step.
    StepActivated(StepActivated),
    /// The controller changed mode.
    ModeChanged(PlaybackMode),
}

/// Snapshot of the controller after the last processed command or tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStatus {
    pub mode: PlaybackMode,
    pub cursor: Option<usize>,
    pub len: usize,
    pub speed: f64,
    pub can_step_backward: bool,
    pub can_step_forward: bool,
}

impl PlayerStatus {
    fn of(controller: &PlaybackController) -> Self {
        Self {
            mode: controller.mode(),
            cursor: controller.cursor(),
            len: controller.len(),
            speed: controller.speed(),
            can_step_backward: controller.can_step_backward(),
            can_step_forward: controller.can_step_forward(),
        }
    }
}

/// Task that runs the timer loop.
pub struct PlaybackDriver {
    controller: PlaybackController,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<PlayerEvent>,
    status: watch::Sender<PlayerStatus>,
    /// When the pending delay elapses; `None` unless running.
    deadline: Option<Instant>,
}

impl PlaybackDriver {
    /// Create a driver with its handle and event stream.
    ///
    /// The driver does nothing until [`PlaybackDriver::run`] is polled.
    pub fn new(
        config: PlaybackConfig,
    ) -> (Self, PlayerHandle, mpsc::UnboundedReceiver<PlayerEvent>) {
        let controller = PlaybackController::new(config);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(PlayerStatus::of(&controller));

        let driver = Self {
            controller,
            commands: command_rx,
            events: event_tx,
            status: status_tx,
            deadline: None,
        };
        let handle = PlayerHandle {
            commands: command_tx,
            status: status_rx,
        };
        (driver, handle, event_rx)
    }

    /// Run until every [`PlayerHandle`] has been dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                () = wait_until(self.deadline) => self.on_deadline(),
            }
        }
        tracing::debug!("playback driver stopped");
    }

    fn apply(&mut self, command: Command) {
        let before = self.controller.mode();
        match command {
            Command::Load { steps, reply } => {
                let result = self.controller.load(steps);
                if let Err(err) = &result {
                    tracing::warn!(%err, "load rejected");
                }
                self.sync(before);
                // Reply after the status is published so the caller sees it.
                let _ = reply.send(result);
                return;
            }
            Command::Start => {
                if let Some(event) = self.controller.start() {
                    self.emit(event);
                }
            }
            Command::Pause => self.controller.pause(),
            Command::Reset => self.controller.reset(),
            Command::StepForward => {
                if let Some(event) = self.controller.step_forward() {
                    self.emit(event);
                }
            }
            Command::StepBackward => {
                if let Some(event) = self.controller.step_backward() {
                    self.emit(event);
                }
            }
            Command::SetSpeed(speed) => {
                self.controller.set_speed(speed);
            }
        }
        self.sync(before);
    }

    fn on_deadline(&mut self) {
        let before = self.controller.mode();
        self.deadline = None;
        if let Tick::Stepped(event) = self.controller.tick() {
            self.emit(event);
        }
        self.sync(before);
    }

    /// Publish mode changes and status, and (re)arm or disarm the delay.
    fn sync(&mut self, before: PlaybackMode) {
        let mode = self.controller.mode();
        if mode != before {
            self.publish(PlayerEvent::ModeChanged(mode));
        }

        if mode != PlaybackMode::Running {
            self.deadline = None;
        } else if before != PlaybackMode::Running || self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.controller.step_delay());
        }

        self.status.send_replace(PlayerStatus::of(&self.controller));
    }

    fn emit(&self, event: StepActivated) {
        tracing::trace!(step = event.step_number, kind = %event.kind, "step activated");
        self.publish(PlayerEvent::StepActivated(event));
    }

    fn publish(&self, event: PlayerEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("no event listener");
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Spawn a driver on the current Tokio runtime.
pub fn spawn_player(
    config: PlaybackConfig,
) -> (PlayerHandle, mpsc::UnboundedReceiver<PlayerEvent>) {
    let (driver, handle, events) = PlaybackDriver::new(config);
    tokio::spawn(driver.run());
    (handle, events)
}

/// Cloneable control surface of a running driver.
///
/// Control methods enqueue a command and return immediately; queries read the
/// status published after the last processed command.
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<PlayerStatus>,
}

impl PlayerHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::PlayerClosed)
    }

    /// Replace the live sequence. Resolves once the driver has adopted it.
    pub async fn load(&self, steps: Vec<Step>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Load { steps, reply })?;
        response.await.map_err(|_| EngineError::PlayerClosed)?
    }

    /// Request a run from `service` and load the result.
    ///
    /// On failure nothing is sent to the driver, so the loaded sequence,
    /// cursor and mode stay as they were.
    pub async fn run<S: ExecutionService>(&self, service: &S, request: &RunRequest) -> Result<()> {
        tracing::debug!(algorithm = %request.algorithm, size = request.array.len(), "requesting run");
        let steps = match service.run(request).await {
            Ok(steps) => steps,
            Err(err) => {
                tracing::warn!(%err, algorithm = %request.algorithm, "run request failed");
                return Err(err);
            }
        };
        self.load(steps).await
    }

    /// Start, resume, or replay after finishing.
    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    /// Discard the sequence and return to idle.
    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    pub fn step_forward(&self) -> Result<()> {
        self.send(Command::StepForward)
    }

    pub fn step_backward(&self) -> Result<()> {
        self.send(Command::StepBackward)
    }

    /// Set the speed multiplier; applies from the next delay.
    pub fn set_speed(&self, speed: f64) -> Result<()> {
        self.send(Command::SetSpeed(speed))
    }

    /// Latest published status.
    pub fn status(&self) -> PlayerStatus {
        self.status.borrow().clone()
    }

    pub fn current_mode(&self) -> PlaybackMode {
        self.status.borrow().mode
    }

    pub fn can_step_backward(&self) -> bool {
        self.status.borrow().can_step_backward
    }

    pub fn can_step_forward(&self) -> bool {
        self.status.borrow().can_step_forward
    }

    /// Wait until the driver reports `mode`.
    pub async fn wait_for_mode(&self, mode: PlaybackMode) -> Result<()> {
        let mut status = self.status.clone();
        status
            .wait_for(|s| s.mode == mode)
            .await
            .map(|_| ())
            .map_err(|_| EngineError::PlayerClosed)
    }
}
