use crate::cli::{Cli, ProgressFormat};

use std::path::{Path, PathBuf};

use clap::Parser;
use googletest::assert_that;
use googletest::prelude::{eq, none, some};

#[test]
fn given_no_flags_when_parse_then_log_progress_and_packaged_layout() {
    // When
    let cli = Cli::try_parse_from(["rchic-launcher"]).unwrap();

    // Then
    assert_that!(cli.progress, eq(ProgressFormat::Log));
    assert_that!(cli.exit_after_ready, eq(false));
    assert_that!(cli.dev, none());
    assert_that!(cli.rscript, none());
}

#[test]
fn given_json_progress_when_parse_then_json_format() {
    // When
    let cli = Cli::try_parse_from(["rchic-launcher", "--progress", "json"]).unwrap();

    // Then
    assert_that!(cli.progress, eq(ProgressFormat::Json));
}

#[test]
fn given_unknown_progress_format_when_parse_then_error() {
    // When
    let result = Cli::try_parse_from(["rchic-launcher", "--progress", "xml"]);

    // Then
    assert_that!(result.is_err(), eq(true));
}

#[test]
fn given_dev_and_resources_when_parse_then_conflict() {
    // When
    let result = Cli::try_parse_from([
        "rchic-launcher",
        "--dev",
        "/src/Rchic",
        "--resources",
        "/opt/rchic/resources",
    ]);

    // Then
    assert_that!(result.is_err(), eq(true));
}

#[test]
fn given_explicit_resources_when_resource_paths_then_production_layout() {
    // Given
    let cli = Cli::try_parse_from(["rchic-launcher", "--resources", "/opt/rchic/resources"])
        .unwrap();

    // When
    let paths = cli.resource_paths("start-server.R").unwrap();

    // Then
    let root = Path::new("/opt/rchic/resources");
    assert_that!(paths.primary, eq(&root.join("plumber")));
    assert_that!(paths.secondary, eq(&root.join("web")));
    assert_that!(
        paths.entry_script,
        eq(&root.join("plumber").join("start-server.R"))
    );
    assert_that!(paths.bundled_runtime, some(eq(&root.join("R-portable"))));
}

#[test]
fn given_dev_root_when_resource_paths_then_checkout_layout_without_bundle() {
    // Given
    let cli = Cli::try_parse_from(["rchic-launcher", "--dev", "/src/Rchic"]).unwrap();

    // When
    let paths = cli.resource_paths("start-server.R").unwrap();

    // Then
    let root = Path::new("/src/Rchic");
    assert_that!(paths.primary, eq(&root.join("inst").join("plumber")));
    assert_that!(paths.secondary, eq(&root.join("inst").join("web")));
    assert_that!(
        paths.entry_script,
        eq(&root.join("electron").join("src").join("start-server.R"))
    );
    assert_that!(paths.bundled_runtime, none());
}

#[test]
fn given_no_resources_flag_when_resource_paths_then_next_to_executable() {
    // Given
    let cli = Cli::try_parse_from(["rchic-launcher"]).unwrap();
    let exe_dir = std::env::current_exe()
        .unwrap()
        .parent()
        .map(Path::to_path_buf)
        .unwrap();

    // When
    let paths = cli.resource_paths("start-server.R").unwrap();

    // Then
    assert_that!(paths.primary, eq(&exe_dir.join("resources").join("plumber")));
}

#[test]
fn given_rscript_and_exit_after_ready_when_parse_then_both_captured() {
    // When
    let cli = Cli::try_parse_from([
        "rchic-launcher",
        "--rscript",
        "/usr/local/bin/Rscript",
        "--exit-after-ready",
        "--config-dir",
        "/tmp/rchic-config",
    ])
    .unwrap();

    // Then
    assert_that!(cli.rscript, some(eq(&PathBuf::from("/usr/local/bin/Rscript"))));
    assert_that!(cli.config_dir, some(eq(&PathBuf::from("/tmp/rchic-config"))));
    assert_that!(cli.exit_after_ready, eq(true));
}
