use crate::watches_backend;

use rchic_supervisor::ReadyTrigger;

use googletest::assert_that;
use googletest::prelude::eq;

#[test]
fn given_clean_exit_before_ready_when_watches_backend_then_not_watched() {
    // When
    let watched = watches_backend(ReadyTrigger::CleanExit, false);

    // Then
    assert_that!(watched, eq(false));
}

#[test]
fn given_backend_running_after_ready_signal_when_watches_backend_then_watched() {
    // When / Then
    assert_that!(watches_backend(ReadyTrigger::OutputSignal, true), eq(true));
    assert_that!(watches_backend(ReadyTrigger::GracePeriod, true), eq(true));
}

#[test]
fn given_backend_already_gone_at_ready_when_watches_backend_then_not_watched() {
    // When
    let watched = watches_backend(ReadyTrigger::GracePeriod, false);

    // Then
    assert_that!(watched, eq(false));
}
