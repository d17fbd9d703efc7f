use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::api::SelectionApi;

/// Default maximum number of log lines to keep in memory
pub const DEFAULT_MAX_LOG_LINES: usize = 10000;

/// Default interval between two `/logs_raw` fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Install the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    /// Zero-based line number in the server log file
    pub line_no: usize,
    pub received_at: String,
    pub text: String,
}

/// Bytes of the consumed prefix kept to recognise an appended log
const FINGERPRINT_BYTES: usize = 256;

#[derive(Debug, Default)]
struct LogState {
    lines: VecDeque<LogLine>,
    /// Byte length of the newline-terminated prefix taken in so far
    consumed_len: usize,
    /// Number of complete lines in that prefix
    consumed_lines: usize,
    /// Last bytes of that prefix
    fingerprint: String,
    /// Text of a trailing unterminated line, which may still grow
    partial: Option<String>,
}

impl LogState {
    fn extended_by(&self, snapshot: &str) -> bool {
        snapshot
            .get(..self.consumed_len)
            .is_some_and(|prefix| prefix.ends_with(self.fingerprint.as_str()))
    }

    fn reset(&mut self) {
        self.lines.clear();
        self.consumed_len = 0;
        self.consumed_lines = 0;
        self.fingerprint.clear();
        self.partial = None;
    }
}

/// Bounded buffer of server log lines fed from polled `/logs_raw` snapshots.
pub struct LogBuffer {
    state: Mutex<LogState>,
    max_lines: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_LINES)
    }
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            state: Mutex::new(LogState {
                lines: VecDeque::with_capacity(max_lines.min(1024)),
                ..Default::default()
            }),
            max_lines,
        }
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take in a full snapshot of the server log and return the lines that
    /// are new since the previous one.
    ///
    /// A snapshot that doesn't extend the previous one means the log was
    /// truncated or rotated; the buffer then starts over.
    pub fn ingest(&self, snapshot: &str) -> Vec<LogLine> {
        let mut state = self.state();

        if !state.extended_by(snapshot) {
            state.reset();
        }

        let rest = &snapshot[state.consumed_len..];
        let now = chrono::Utc::now().to_rfc3339();
        let mut added = Vec::new();

        for chunk in rest.split_inclusive('\n') {
            let complete = chunk.ends_with('\n');
            let text = chunk.trim_end_matches(['\n', '\r']);
            let line_no = state.consumed_lines;

            // Only the first chunk can continue a previously unterminated line.
            let unchanged = match state.partial.take() {
                Some(previous) if previous == text => true,
                Some(_) => {
                    if state.lines.back().is_some_and(|l| l.line_no == line_no) {
                        state.lines.pop_back();
                    }
                    false
                }
                None => false,
            };

            if !unchanged {
                let line = LogLine {
                    line_no,
                    received_at: now.clone(),
                    text: text.to_string(),
                };
                state.lines.push_back(line.clone());
                added.push(line);
            }

            if complete {
                state.consumed_len += chunk.len();
                state.consumed_lines += 1;
            } else {
                state.partial = Some(text.to_string());
            }
        }

        let end = state.consumed_len;
        let mut start = end.saturating_sub(FINGERPRINT_BYTES);
        while !snapshot.is_char_boundary(start) {
            start += 1;
        }
        state.fingerprint = snapshot[start..end].to_string();

        // Remove from front if full
        while state.lines.len() > self.max_lines {
            state.lines.pop_front();
        }

        added
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.state().lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last `n` lines, oldest first
    pub fn tail(&self, n: usize) -> Vec<LogLine> {
        let state = self.state();
        let skip = state.lines.len().saturating_sub(n);
        state.lines.iter().skip(skip).cloned().collect()
    }

    /// Get lines with pagination for large logs
    pub fn lines_paginated(&self, offset: usize, limit: usize) -> Vec<LogLine> {
        self.state().lines.iter().skip(offset).take(limit).cloned().collect()
    }
}

/// Fetch the server log now and then every `interval` until `token` is
/// cancelled. `on_update` only sees non-empty batches of new lines.
pub async fn poll_logs<A: SelectionApi>(
    api: &A,
    buffer: &LogBuffer,
    interval: Duration,
    token: CancellationToken,
    mut on_update: impl FnMut(&[LogLine]),
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match api.fetch_logs().await {
            Ok(snapshot) => {
                let added = buffer.ingest(&snapshot);
                if !added.is_empty() {
                    on_update(&added);
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to fetch server log"),
        }
    }
}
