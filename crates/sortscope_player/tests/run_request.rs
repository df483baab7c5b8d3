//! Integration tests for acquiring a sequence through an execution service

use std::sync::atomic::{AtomicUsize, Ordering};

use sortscope_core::{
    Algorithm, EngineError, ExecutionService, Result, RunRequest, Step, StepKind, TrialRequest,
    TrialResponse,
};
use sortscope_player::{spawn_player, PlaybackConfig, PlaybackMode, PlayerEvent};

/// Service that echoes the input as a comparing step followed by a sorted step.
#[derive(Default)]
struct EchoService {
    calls: AtomicUsize,
}

impl ExecutionService for EchoService {
    async fn run(&self, request: &RunRequest) -> Result<Vec<Step>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut sorted = request.array.clone();
        sorted.sort_unstable();
        Ok(vec![
            Step::new(StepKind::Comparing, request.array.clone(), &[0, 1], "compare"),
            Step::new(StepKind::Sorted, sorted, &[], "done").with_totals(1, 1),
        ])
    }

    async fn time_trial(&self, request: &TrialRequest) -> Result<TrialResponse> {
        Ok(TrialResponse {
            array_size: request.array.len(),
            results: Vec::new(),
            fastest: None,
        })
    }
}

/// Service that always fails like an unreachable server.
struct DownService;

impl ExecutionService for DownService {
    async fn run(&self, _request: &RunRequest) -> Result<Vec<Step>> {
        Err(EngineError::run_failed("connection refused"))
    }

    async fn time_trial(&self, _request: &TrialRequest) -> Result<TrialResponse> {
        Err(EngineError::run_failed("connection refused"))
    }
}

/// Service that answers with zero steps.
struct EmptyService;

impl ExecutionService for EmptyService {
    async fn run(&self, _request: &RunRequest) -> Result<Vec<Step>> {
        Ok(Vec::new())
    }

    async fn time_trial(&self, _request: &TrialRequest) -> Result<TrialResponse> {
        Err(EngineError::run_failed("not supported"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_successful_run_loads_idle() {
    let service = EchoService::default();
    let (player, _events) = spawn_player(PlaybackConfig::default());

    player
        .run(&service, &RunRequest::new(vec![2, 1], Algorithm::Bubble))
        .await
        .unwrap();

    let status = player.status();
    assert_eq!(status.mode, PlaybackMode::Idle);
    assert_eq!(status.cursor, Some(0));
    assert_eq!(status.len, 2);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_run_leaves_state_unchanged() {
    let (player, mut events) = spawn_player(PlaybackConfig::default());
    player
        .run(&EchoService::default(), &RunRequest::new(vec![2, 1], Algorithm::Quick))
        .await
        .unwrap();
    player.start().unwrap();
    player.pause().unwrap();
    player.step_forward().unwrap();

    let mut steps = Vec::new();
    while steps.last() != Some(&2) {
        if let Some(PlayerEvent::StepActivated(step)) = events.recv().await {
            steps.push(step.step_number);
        }
    }
    assert_eq!(steps, vec![1, 2]);

    let before = player.status();
    assert_eq!(before.mode, PlaybackMode::Paused);
    assert_eq!(before.cursor, Some(1));
    let err = player
        .run(&DownService, &RunRequest::new(vec![9, 8, 7], Algorithm::Quick))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::RunRequestFailed(_)));
    assert_eq!(player.status(), before);

    // Nothing was published for the failed run.
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_empty_run_rejected() {
    let (player, _events) = spawn_player(PlaybackConfig::default());

    let err = player
        .run(&EmptyService, &RunRequest::new(vec![1], Algorithm::Counting))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::EmptySequence);
    assert_eq!(player.current_mode(), PlaybackMode::Idle);
    assert_eq!(player.status().cursor, None);
}
