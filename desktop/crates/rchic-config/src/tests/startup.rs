use crate::LauncherConfig;
use crate::tests::{EnvGuard, setup_config_dir};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

// =========================================================================
// Validation Tests - Startup
// =========================================================================

#[test]
#[serial]
fn given_grace_period_below_min_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _grace = EnvGuard::set("RCHIC_STARTUP_GRACE_PERIOD_MS", "10");

    // When
    let result = LauncherConfig::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_stderr_capacity_below_min_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _capacity = EnvGuard::set("RCHIC_STARTUP_STDERR_CAPACITY", "1");

    // When
    let result = LauncherConfig::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_zero_settle_delay_when_validate_then_ok() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _settle = EnvGuard::set("RCHIC_STARTUP_SETTLE_DELAY_MS", "0");

    // When
    let config = LauncherConfig::load().unwrap();

    // Then
    assert_that!(config.validate(), ok(anything()));
    assert_that!(config.startup.settle_delay(), eq(Duration::ZERO));
}

#[test]
fn given_backend_entry_script_with_traversal_when_validate_then_error() {
    // Given
    let mut config = LauncherConfig::default();
    config.backend.entry_script = "../start-server.R".into();

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}
