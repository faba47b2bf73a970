/// Lines that mean the server is up. Matched case-sensitively.
pub const READY_SIGNALS: &[&str] = &["Running", "Starting server"];

/// Fragments that flag a line as an error. Matched case-insensitively.
pub const ERROR_PATTERNS: &[&str] = &[
    "error",
    "erreur",
    "fatal",
    "permission denied",
    "cannot open",
    "no such file",
    "not found",
    "there is no package called",
    "cannot find",
    "missing",
    "unable to load",
];

/// Maximum number of error lines folded into a crash diagnostic.
const DIAGNOSTIC_LINES: usize = 2;

/// Pattern sets the startup monitor scans backend output with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPatterns {
    ready: Vec<String>,
    errors: Vec<String>,
}

impl Default for OutputPatterns {
    fn default() -> Self {
        Self::new(
            READY_SIGNALS.iter().map(|s| s.to_string()).collect(),
            ERROR_PATTERNS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl OutputPatterns {
    pub fn new(ready: Vec<String>, errors: Vec<String>) -> Self {
        Self {
            ready,
            errors: errors.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn is_ready_signal(&self, line: &str) -> bool {
        self.ready.iter().any(|signal| line.contains(signal.as_str()))
    }

    pub fn is_error_line(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.errors.iter().any(|pattern| lower.contains(pattern.as_str()))
    }

    /// Join the first error-matching lines into one diagnostic, `None` if
    /// nothing matches.
    pub fn summarize<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Option<String> {
        let matched: Vec<&str> = lines
            .into_iter()
            .filter(|line| self.is_error_line(line))
            .map(str::trim)
            .take(DIAGNOSTIC_LINES)
            .collect();

        if matched.is_empty() {
            None
        } else {
            Some(matched.join(" | "))
        }
    }
}
