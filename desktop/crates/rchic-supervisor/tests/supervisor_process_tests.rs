#![cfg(unix)]

mod common;

use common::{RecordingReporter, fast_settings, resources, wait_until_dead, write_backend};

use rchic_config::CleanExitPolicy;
use rchic_supervisor::{
    BinaryCandidate, CandidateOrigin, ProcessSupervisor, ReadyTrigger, STEP_BACKEND_OUTPUT,
    StepStatus, SupervisorError,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use googletest::assert_that;
use googletest::prelude::{eq, ge, lt, some};
use tempfile::TempDir;

fn supervisor(grace: Duration) -> (ProcessSupervisor, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    (ProcessSupervisor::new(fast_settings(grace), reporter.clone()), reporter)
}

#[tokio::test]
async fn given_stderr_ready_line_when_start_then_resolves_with_port_after_settle_delay() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(
        temp.path(),
        "Rscript",
        r#"echo "$@" > args.txt
echo "Starting server to listen on port $2" >&2
sleep 30"#,
    );
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));

    // When
    let started = Instant::now();
    let signal = supervisor.start(&candidate, 8711, &resources).await.unwrap();
    let elapsed = started.elapsed();

    // Then
    assert_that!(signal.port, eq(8711));
    assert_that!(signal.trigger, eq(ReadyTrigger::OutputSignal));
    assert_that!(elapsed, ge(Duration::from_millis(100)));
    assert_that!(elapsed, lt(Duration::from_secs(10)));
    assert_that!(supervisor.is_running(), eq(true));

    let args = std::fs::read_to_string(resources.primary.join("args.txt")).unwrap();
    let expected = format!(
        "{} 8711 {} {}",
        resources.entry_script.display(),
        resources.primary.display(),
        resources.secondary.display()
    );
    assert_that!(args.trim(), eq(expected.as_str()));

    supervisor.stop();
}

#[tokio::test]
async fn given_crash_with_error_output_when_start_then_diagnostic_names_first_error_only() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(
        temp.path(),
        "rchic-backend",
        r#"echo "Error: package not found" >&2
echo "unrelated info line" >&2
exit 2"#,
    );
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));

    // When
    let result = supervisor.start(&candidate, 8712, &resources).await;

    // Then
    match result {
        Err(SupervisorError::CrashBeforeReady {
            code, diagnostic, ..
        }) => {
            assert_that!(code, some(eq(2)));
            assert_that!(diagnostic.contains("Error: package not found"), eq(true));
            assert_that!(diagnostic.contains("unrelated info line"), eq(false));
        }
        other => panic!("expected crash before ready, got {other:?}"),
    }
    assert_that!(supervisor.is_running(), eq(false));
}

#[tokio::test]
async fn given_silent_crash_when_start_then_diagnostic_is_exit_code() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "exit 7");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));

    // When
    let result = supervisor.start(&candidate, 8713, &resources).await;

    // Then
    match result {
        Err(SupervisorError::CrashBeforeReady { diagnostic, .. }) => {
            assert_that!(diagnostic.as_str(), eq("exit code 7"));
        }
        other => panic!("expected crash before ready, got {other:?}"),
    }
}

#[tokio::test]
async fn given_clean_exit_when_start_then_proceeds_with_clean_exit_trigger() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "exit 0");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));

    // When
    let signal = supervisor.start(&candidate, 8714, &resources).await.unwrap();

    // Then
    assert_that!(signal.trigger, eq(ReadyTrigger::CleanExit));
}

#[tokio::test]
async fn given_strict_policy_and_clean_exit_when_start_then_rejected() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "exit 0");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let mut settings = fast_settings(Duration::from_secs(20));
    settings.clean_exit = CleanExitPolicy::Fail;
    let supervisor = ProcessSupervisor::new(settings, Arc::new(RecordingReporter::default()));

    // When
    let result = supervisor.start(&candidate, 8715, &resources).await;

    // Then
    assert!(matches!(result, Err(SupervisorError::CleanExitRejected { .. })));
}

#[tokio::test]
async fn given_silent_long_running_backend_when_start_then_grace_period_resolves() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "sleep 30");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_millis(300));

    // When
    let signal = supervisor.start(&candidate, 8716, &resources).await.unwrap();

    // Then
    assert_that!(signal.trigger, eq(ReadyTrigger::GracePeriod));
    supervisor.stop();
}

#[tokio::test]
async fn given_advisory_error_line_then_ready_when_start_then_warning_reported_once() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(
        temp.path(),
        "rchic-backend",
        r#"echo "Warning: cannot open font cache" >&2
echo "Error: also odd" >&2
echo "Running plumber API" >&2
sleep 30"#,
    );
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, reporter) = supervisor(Duration::from_secs(20));

    // When
    let signal = supervisor.start(&candidate, 8717, &resources).await.unwrap();

    // Then
    assert_that!(signal.trigger, eq(ReadyTrigger::OutputSignal));
    let warnings: Vec<_> = reporter
        .steps()
        .into_iter()
        .filter(|s| s.id == STEP_BACKEND_OUTPUT)
        .collect();
    assert_that!(warnings.len(), eq(1));
    assert_that!(warnings[0].status, eq(StepStatus::Warning));
    assert_that!(
        warnings[0].detail.as_deref(),
        eq(Some("Warning: cannot open font cache"))
    );
    supervisor.stop();
}

#[tokio::test]
async fn given_running_backend_when_start_again_then_already_running() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "echo Running >&2\nsleep 30");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));
    supervisor.start(&candidate, 8718, &resources).await.unwrap();

    // When
    let second = supervisor.start(&candidate, 8719, &resources).await;

    // Then
    assert!(matches!(second, Err(SupervisorError::AlreadyRunning { .. })));
    supervisor.stop();
}

#[tokio::test]
async fn given_running_backend_when_stop_twice_then_process_gone_and_second_is_no_op() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "echo Running >&2\nsleep 30");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));
    supervisor.start(&candidate, 8720, &resources).await.unwrap();
    let pid = supervisor.pid().unwrap();

    // When
    let first = supervisor.stop();
    let second = supervisor.stop();

    // Then
    assert_that!(first, eq(true));
    assert_that!(second, eq(false));
    assert_that!(wait_until_dead(pid, Duration::from_secs(5)).await, eq(true));
}

#[tokio::test]
async fn given_running_backend_when_supervisor_dropped_then_process_terminated() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "echo Running >&2\nsleep 30");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));
    supervisor.start(&candidate, 8721, &resources).await.unwrap();
    let pid = supervisor.pid().unwrap();

    // When
    drop(supervisor);

    // Then
    assert_that!(wait_until_dead(pid, Duration::from_secs(5)).await, eq(true));
}

#[tokio::test]
async fn given_crash_after_ready_when_exit_observed_then_slot_cleared() {
    // Given
    let temp = TempDir::new().unwrap();
    let resources = resources(&temp);
    let script = write_backend(temp.path(), "rchic-backend", "echo Running >&2\nsleep 1\nexit 3");
    let candidate = BinaryCandidate::new(script, CandidateOrigin::System);
    let (supervisor, _reporter) = supervisor(Duration::from_secs(20));
    supervisor.start(&candidate, 8722, &resources).await.unwrap();

    // When
    let deadline = Instant::now() + Duration::from_secs(10);
    while supervisor.is_running() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // Then
    assert_that!(supervisor.is_running(), eq(false));
    assert_that!(supervisor.stop(), eq(false));
}
