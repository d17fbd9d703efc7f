use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{FormSubmission, SelectionApi};
use crate::selection::types::{Action, SyncError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Update(Action, String),
    Rename(String, String),
    FetchLogs,
    Submit(String, FormSubmission),
}

/// Scriptable in-process server used by handler tests.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    update_results: Mutex<VecDeque<Result<(), SyncError>>>,
    update_delays: Mutex<VecDeque<Duration>>,
    failing_paths: Mutex<HashMap<String, SyncError>>,
    rename_error: Mutex<Option<SyncError>>,
    submit_error: Mutex<Option<SyncError>>,
    logs: Mutex<VecDeque<Result<String, SyncError>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap()
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result for the next `update_selection` call; unscripted calls succeed.
    pub fn push_update(&self, result: Result<(), SyncError>) {
        lock(&self.update_results).push_back(result);
    }

    /// Delay before the next `update_selection` call resolves.
    pub fn push_update_delay(&self, delay: Duration) {
        lock(&self.update_delays).push_back(delay);
    }

    pub fn fail_path(&self, path: &str, error: SyncError) {
        lock(&self.failing_paths).insert(path.to_string(), error);
    }

    pub fn fail_rename(&self, error: SyncError) {
        *lock(&self.rename_error) = Some(error);
    }

    pub fn fail_submit(&self, error: SyncError) {
        *lock(&self.submit_error) = Some(error);
    }

    pub fn push_logs(&self, result: Result<String, SyncError>) {
        lock(&self.logs).push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn update_calls(&self) -> Vec<(Action, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(action, path) => Some((action, path)),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self) -> Vec<(String, FormSubmission)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit(page, form) => Some((page, form)),
                _ => None,
            })
            .collect()
    }
}

impl SelectionApi for FakeApi {
    async fn update_selection(&self, action: Action, path: &str) -> Result<(), SyncError> {
        lock(&self.calls).push(Call::Update(action, path.to_string()));
        let delay = lock(&self.update_delays).pop_front();
        let scripted = lock(&self.update_results).pop_front();
        let failing = lock(&self.failing_paths).get(path).cloned();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = failing {
            return Err(error);
        }
        scripted.unwrap_or(Ok(()))
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<(), SyncError> {
        lock(&self.calls).push(Call::Rename(path.to_string(), new_name.to_string()));
        match lock(&self.rename_error).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn fetch_logs(&self) -> Result<String, SyncError> {
        lock(&self.calls).push(Call::FetchLogs);
        lock(&self.logs).pop_front().unwrap_or_else(|| Ok(String::new()))
    }

    async fn submit_form(&self, page_path: &str, form: &FormSubmission) -> Result<(), SyncError> {
        lock(&self.calls).push(Call::Submit(page_path.to_string(), form.clone()));
        match lock(&self.submit_error).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
