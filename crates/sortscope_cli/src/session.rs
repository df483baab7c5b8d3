//! Terminal playback session
//!
//! Prints every step the player activates and, when an input stream is
//! attached, maps one-letter lines to player controls.

use anyhow::Result;
use sortscope_core::{ExecutionService, RunRequest, Step};
use sortscope_player::{PlaybackMode, PlayerEvent, PlayerHandle};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::input::Generator;
use crate::render::{self, Style};

/// A control typed by the user
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    Start,
    Pause,
    StepForward,
    StepBackward,
    Reset,
    Faster,
    Slower,
    Quit,
}

impl Control {
    /// Parse one input line
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "s" | "c" => Some(Control::Start),
            "p" => Some(Control::Pause),
            "f" | "n" => Some(Control::StepForward),
            "b" => Some(Control::StepBackward),
            "r" => Some(Control::Reset),
            "+" => Some(Control::Faster),
            "-" => Some(Control::Slower),
            "q" => Some(Control::Quit),
            _ => None,
        }
    }
}

pub const HELP: &str =
    "keys: s start/continue, p pause, f step forward, b step back, r reset, +/- speed, q quit";

/// Where the session gets a sequence, initially and again after a reset.
pub enum RunSource<'a, S> {
    /// Request a run. With a generator, every reload sorts a fresh array.
    Service {
        service: &'a S,
        request: RunRequest,
        generator: Option<Generator>,
    },
    /// Steps read from a saved response.
    Saved(Vec<Step>),
}

impl<S: ExecutionService> RunSource<'_, S> {
    /// Load the initial sequence.
    pub async fn load(&self, player: &PlayerHandle) -> sortscope_core::Result<()> {
        match self {
            RunSource::Service {
                service, request, ..
            } => player.run(*service, request).await,
            RunSource::Saved(steps) => player.load(steps.clone()).await,
        }
    }

    /// Load again after a reset, regenerating the array if a preset was used.
    pub async fn reload(&mut self, player: &PlayerHandle) -> sortscope_core::Result<()> {
        if let RunSource::Service {
            request,
            generator: Some(generator),
            ..
        } = self
        {
            request.array = generator.generate();
        }
        self.load(player).await
    }
}

/// Play the loaded sequence until it finishes or, with input attached, until quit.
///
/// When `input` closes, playback runs to the end.
pub async fn run<S, R, W>(
    player: &PlayerHandle,
    mut events: UnboundedReceiver<PlayerEvent>,
    source: &mut RunSource<'_, S>,
    input: Option<R>,
    out: &mut W,
    style: Style,
) -> Result<()>
where
    S: ExecutionService,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let interactive = input.is_some();
    let mut lines = input.map(AsyncBufReadExt::lines);
    let mut input_open = interactive;
    // Set by a reset, which discards the sequence.
    let mut needs_reload = false;
    if interactive {
        eprintln!("{HELP}");
    }

    player.start()?;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(());
                };
                match event {
                    PlayerEvent::StepActivated(step) => {
                        writeln!(out, "{}", render::step_line(&step, style)?)?;
                        out.flush()?;
                    }
                    PlayerEvent::ModeChanged(mode) => {
                        tracing::debug!(%mode, "mode changed");
                        if mode == PlaybackMode::Finished && !input_open {
                            return Ok(());
                        }
                        if interactive {
                            eprintln!("-- {mode}");
                        }
                    }
                }
            }
            line = next_line(&mut lines), if input_open => {
                let Some(line) = line? else {
                    // Input closed: let playback run to the end.
                    input_open = false;
                    let status = player.status();
                    if needs_reload || status.mode == PlaybackMode::Finished || status.len == 0 {
                        return Ok(());
                    }
                    player.start()?;
                    continue;
                };
                match Control::parse(&line) {
                    Some(Control::Quit) => return Ok(()),
                    Some(Control::Reset) => {
                        player.reset()?;
                        needs_reload = true;
                    }
                    Some(Control::Start) if needs_reload => {
                        match source.reload(player).await {
                            Ok(()) => {
                                needs_reload = false;
                                player.start()?;
                            }
                            Err(err) => eprintln!("reload failed: {err}"),
                        }
                    }
                    Some(control) => apply(player, control)?,
                    None => eprintln!("{HELP}"),
                }
            }
        }
    }
}

async fn next_line<R: AsyncBufRead + Unpin>(
    lines: &mut Option<Lines<R>>,
) -> std::io::Result<Option<String>> {
    match lines {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

fn apply(player: &PlayerHandle, control: Control) -> Result<()> {
    let speed = player.status().speed;
    match control {
        Control::Start => player.start()?,
        Control::Pause => player.pause()?,
        Control::StepForward => player.step_forward()?,
        Control::StepBackward => player.step_backward()?,
        Control::Reset => player.reset()?,
        Control::Faster => player.set_speed(speed * 2.0)?,
        Control::Slower => player.set_speed(speed / 2.0)?,
        Control::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortscope_core::{Algorithm, StepKind, TrialRequest, TrialResponse};
    use sortscope_player::{spawn_player, PlaybackConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every requested array and answers with two steps.
    #[derive(Default)]
    struct RecordingService {
        arrays: Mutex<Vec<Vec<i64>>>,
        calls: AtomicUsize,
    }

    impl ExecutionService for RecordingService {
        async fn run(&self, request: &RunRequest) -> sortscope_core::Result<Vec<Step>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut arrays) = self.arrays.lock() {
                arrays.push(request.array.clone());
            }
            let mut sorted = request.array.clone();
            sorted.sort_unstable();
            Ok(vec![
                Step::new(StepKind::Comparing, request.array.clone(), &[0, 1], "compare"),
                Step::new(StepKind::Sorted, sorted, &[], "done").with_totals(1, 0),
            ])
        }

        async fn time_trial(&self, _request: &TrialRequest) -> sortscope_core::Result<TrialResponse> {
            unimplemented!("not used by sessions")
        }
    }

    fn first_steps(output: &[u8]) -> usize {
        String::from_utf8_lossy(output)
            .lines()
            .filter(|line| line.contains("\"step_number\":1,"))
            .count()
    }

    #[test]
    fn test_parse_controls() {
        assert_eq!(Control::parse("p"), Some(Control::Pause));
        assert_eq!(Control::parse(" s \n"), Some(Control::Start));
        assert_eq!(Control::parse("c"), Some(Control::Start));
        assert_eq!(Control::parse("f"), Some(Control::StepForward));
        assert_eq!(Control::parse("b"), Some(Control::StepBackward));
        assert_eq!(Control::parse("+"), Some(Control::Faster));
        assert_eq!(Control::parse("q"), Some(Control::Quit));
        assert_eq!(Control::parse("x"), None);
        assert_eq!(Control::parse(""), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_reset_requests_new_run() {
        let service = RecordingService::default();
        let mut source = RunSource::Service {
            service: &service,
            request: RunRequest::new(vec![2, 1], Algorithm::Bubble),
            generator: None,
        };
        let (player, events) = spawn_player(PlaybackConfig::default());
        source.load(&player).await.unwrap();

        let mut output = Vec::new();
        run(&player, events, &mut source, Some(&b"r\ns\n"[..]), &mut output, Style::Json)
            .await
            .unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first_steps(&output), 2);
        assert_eq!(player.status().mode, PlaybackMode::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_regenerates_preset_array() {
        let service = RecordingService::default();
        let generator = Generator {
            preset: crate::input::Preset::Sorted,
            size: 6,
        };
        let mut source = RunSource::Service {
            service: &service,
            request: RunRequest::new(generator.generate(), Algorithm::Insertion),
            generator: Some(generator),
        };
        let (player, events) = spawn_player(PlaybackConfig::default());
        source.load(&player).await.unwrap();

        let mut output = Vec::new();
        run(&player, events, &mut source, Some(&b"r\ns\n"[..]), &mut output, Style::Json)
            .await
            .unwrap();

        let arrays = service.arrays.lock().unwrap();
        assert_eq!(arrays.len(), 2);
        assert!(arrays.iter().all(|a| a.len() == 6 && a.windows(2).all(|w| w[0] <= w[1])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_steps_reload_after_reset() {
        let steps = vec![
            Step::new(StepKind::Comparing, vec![2, 1], &[0, 1], "compare"),
            Step::new(StepKind::Sorted, vec![1, 2], &[], "done"),
        ];
        let mut source: RunSource<'_, RecordingService> = RunSource::Saved(steps);
        let (player, events) = spawn_player(PlaybackConfig::default());
        source.load(&player).await.unwrap();

        let mut output = Vec::new();
        run(&player, events, &mut source, Some(&b"r\ns\n"[..]), &mut output, Style::Json)
            .await
            .unwrap();

        assert_eq!(first_steps(&output), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_closed_after_reset_ends_session() {
        let service = RecordingService::default();
        let mut source = RunSource::Service {
            service: &service,
            request: RunRequest::new(vec![2, 1], Algorithm::Bubble),
            generator: None,
        };
        let (player, events) = spawn_player(PlaybackConfig::default());
        source.load(&player).await.unwrap();

        let mut output = Vec::new();
        run(&player, events, &mut source, Some(&b"r\n"[..]), &mut output, Style::Json)
            .await
            .unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_input_plays_to_end() {
        let service = RecordingService::default();
        let mut source = RunSource::Service {
            service: &service,
            request: RunRequest::new(vec![2, 1], Algorithm::Bubble),
            generator: None,
        };
        let (player, events) = spawn_player(PlaybackConfig::default());
        source.load(&player).await.unwrap();

        let mut output = Vec::new();
        run(&player, events, &mut source, None::<&[u8]>, &mut output, Style::Text)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[   1]"));
        assert!(text.contains("[   2] 100.0%"));
    }
}
