use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Bounded buffer of the most recent stderr lines.
#[derive(Debug, Clone)]
pub struct StderrTail {
    lines: VecDeque<String>,
    capacity: usize,
}

pub type SharedStderrTail = Arc<Mutex<StderrTail>>;

impl StderrTail {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn shared(capacity: usize) -> SharedStderrTail {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Append a line, evicting the oldest when full.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Copy of the buffered lines, tolerating a poisoned lock.
pub(crate) fn snapshot(tail: &SharedStderrTail) -> Vec<String> {
    let guard = tail.lock().unwrap_or_else(PoisonError::into_inner);
    guard.lines().map(str::to_owned).collect()
}

pub(crate) fn push_line(tail: &SharedStderrTail, line: &str) {
    tail.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(line);
}
