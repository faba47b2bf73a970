use crate::{ERROR_PATTERNS, OutputPatterns};

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use proptest::prelude::*;

#[test]
fn given_plumber_banner_when_checked_then_ready_signal() {
    // Given
    let patterns = OutputPatterns::default();

    // When / Then
    assert_that!(patterns.is_ready_signal("Running plumber API at http://127.0.0.1:8484"), eq(true));
    assert_that!(patterns.is_ready_signal("Starting server to listen on port 8484"), eq(true));
}

#[test]
fn given_lowercase_running_when_checked_then_not_ready_signal() {
    // Given
    let patterns = OutputPatterns::default();

    // When / Then
    assert_that!(patterns.is_ready_signal("still running setup"), eq(false));
}

#[test]
fn given_mixed_case_error_lines_when_checked_then_matched() {
    // Given
    let patterns = OutputPatterns::default();

    // When / Then
    assert_that!(patterns.is_error_line("ERROR: boom"), eq(true));
    assert_that!(patterns.is_error_line("Erreur dans library(plumber)"), eq(true));
    assert_that!(
        patterns.is_error_line("Error in library(plumber) : there is no package called 'plumber'"),
        eq(true)
    );
    assert_that!(patterns.is_error_line("Loading required package: jsonlite"), eq(false));
}

#[test]
fn given_crash_output_when_summarize_then_first_two_matches_joined() {
    // Given
    let patterns = OutputPatterns::default();
    let lines = [
        "Loading R environment",
        "Error: package not found",
        "unrelated info line",
        "Execution halted: fatal",
        "cannot open file 'x.R'",
    ];

    // When
    let summary = patterns.summarize(lines);

    // Then
    assert_that!(
        summary,
        some(eq("Error: package not found | Execution halted: fatal"))
    );
}

#[test]
fn given_no_error_lines_when_summarize_then_none() {
    // Given
    let patterns = OutputPatterns::default();

    // When / Then
    assert_that!(patterns.summarize(["hello", "world"]), none());
}

#[test]
fn given_custom_patterns_when_checked_then_only_those_apply() {
    // Given
    let patterns = OutputPatterns::new(vec!["READY".to_string()], vec!["Boom".to_string()]);

    // When / Then
    assert_that!(patterns.is_ready_signal("server READY"), eq(true));
    assert_that!(patterns.is_ready_signal("Running"), eq(false));
    assert_that!(patterns.is_error_line("BOOM!"), eq(true));
    assert_that!(patterns.is_error_line("error"), eq(false));
}

proptest! {
    #[test]
    fn given_any_line_containing_a_pattern_when_checked_then_error_line(
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z ]{0,10}",
        index in 0..ERROR_PATTERNS.len(),
        upper in any::<bool>(),
    ) {
        // Given
        let pattern = if upper {
            ERROR_PATTERNS[index].to_uppercase()
        } else {
            ERROR_PATTERNS[index].to_string()
        };
        let line = format!("{prefix}{pattern}{suffix}");

        // When / Then
        prop_assert!(OutputPatterns::default().is_error_line(&line));
    }

    #[test]
    fn given_any_lines_when_summarize_then_at_most_two_segments(
        lines in proptest::collection::vec("(error [a-z]{1,5}|info [0-9]{1,5})", 0..20)
    ) {
        // Given
        let patterns = OutputPatterns::default();

        // When
        let summary = patterns.summarize(lines.iter().map(String::as_str));

        // Then
        let matching = lines.iter().filter(|l| l.starts_with("error")).count();
        match summary {
            Some(text) => prop_assert_eq!(text.split(" | ").count(), matching.min(2)),
            None => prop_assert_eq!(matching, 0),
        }
    }
}
