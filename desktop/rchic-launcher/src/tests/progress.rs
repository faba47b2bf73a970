use crate::progress::{ProgressEvent, to_line};

use rchic_supervisor::{STEP_LOCATE, STEP_SPAWN, StartupStep};

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use serde_json::Value;

fn parse(event: &ProgressEvent<'_>) -> Value {
    let line = to_line(event).unwrap();
    assert_that!(line.contains('\n'), eq(false));
    serde_json::from_str(&line).unwrap()
}

#[test]
fn given_step_when_to_line_then_tagged_step_fields_inline() {
    // Given
    let step = StartupStep::warning(STEP_LOCATE, "Falling back to Rscript on PATH")
        .with_detail("searched 6 locations");

    // When
    let value = parse(&ProgressEvent::Step(&step));

    // Then
    assert_that!(value["event"].as_str(), some(eq("step")));
    assert_that!(value["id"].as_str(), some(eq("locate")));
    assert_that!(value["status"].as_str(), some(eq("warning")));
    assert_that!(value["detail"].as_str(), some(eq("searched 6 locations")));
    assert_that!(value["timestamp"].is_string(), eq(true));
}

#[test]
fn given_step_without_detail_when_to_line_then_detail_omitted() {
    // Given
    let step = StartupStep::pending(STEP_SPAWN, "Starting R backend");

    // When
    let value = parse(&ProgressEvent::Step(&step));

    // Then
    assert_that!(value.get("detail"), none());
    assert_that!(value["status"].as_str(), some(eq("pending")));
}

#[test]
fn given_ready_when_to_line_then_url_port_and_degraded() {
    // When
    let value = parse(&ProgressEvent::Ready {
        url: "http://127.0.0.1:8484/",
        port: 8484,
        degraded: true,
    });

    // Then
    assert_that!(value["event"].as_str(), some(eq("ready")));
    assert_that!(value["url"].as_str(), some(eq("http://127.0.0.1:8484/")));
    assert_that!(value["port"].as_u64(), some(eq(8484)));
    assert_that!(value["degraded"].as_bool(), some(eq(true)));
}

#[test]
fn given_failure_when_to_line_then_summary_and_hint() {
    // When
    let value = parse(&ProgressEvent::Failed {
        summary: "R backend crashed during startup",
        hint: "Check the log for missing R packages",
        detail: "exit code 1".to_string(),
    });

    // Then
    assert_that!(value["event"].as_str(), some(eq("failed")));
    assert_that!(
        value["summary"].as_str(),
        some(eq("R backend crashed during startup"))
    );
    assert_that!(value["detail"].as_str(), some(eq("exit code 1")));
}
