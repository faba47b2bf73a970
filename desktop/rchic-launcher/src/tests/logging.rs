use crate::logging::current_log_path;

use std::path::Path;

use googletest::assert_that;
use googletest::prelude::eq;

#[test]
fn given_log_dir_when_current_log_path_then_dated_launcher_file() {
    // Given
    let log_dir = Path::new("/var/log/rchic");
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    // When
    let path = current_log_path(log_dir);

    // Then
    assert_that!(
        path,
        eq(&log_dir.join(format!("rchic-launcher.{today}.log")))
    );
}
