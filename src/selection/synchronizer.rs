use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::set::SelectionSet;
use super::types::{Action, BulkSelectReport, ListingEntry, SelectableItem, SelectionEvent, SyncError};
use super::view::{project_items, project_selected, SelectedEntry};
use crate::api::SelectionApi;
use crate::path_validation::validate_selection_path;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
struct PendingToggle {
    ticket: u64,
    action: Action,
}

#[derive(Debug, Default)]
struct SelectionState {
    committed: SelectionSet,
    listing: Vec<ListingEntry>,
    /// In-flight toggles per path, oldest first.
    pending: HashMap<String, Vec<PendingToggle>>,
    next_ticket: u64,
}

impl SelectionState {
    /// Checkbox state: the latest pending toggle wins over the committed set.
    fn is_checked(&self, path: &str) -> bool {
        self.pending
            .get(path)
            .and_then(|toggles| toggles.last())
            .map(|t| t.action.checked())
            .unwrap_or_else(|| self.committed.contains(path))
    }

    fn displayed_count(&self) -> usize {
        let mut count = self.committed.len();
        for (path, toggles) in &self.pending {
            let Some(last) = toggles.last() else { continue };
            match (last.action, self.committed.contains(path)) {
                (Action::Add, false) => count += 1,
                (Action::Remove, true) => count -= 1,
                _ => {}
            }
        }
        count
    }

    /// Returns the ticket and the number of toggles now in flight for `path`.
    fn register(&mut self, action: Action, path: &str) -> (u64, usize) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let toggles = self.pending.entry(path.to_string()).or_default();
        toggles.push(PendingToggle { ticket, action });
        (ticket, toggles.len())
    }

    fn resolve(&mut self, path: &str, ticket: u64) {
        if let Some(toggles) = self.pending.get_mut(path) {
            toggles.retain(|t| t.ticket != ticket);
            if toggles.is_empty() {
                self.pending.remove(path);
            }
        }
    }
}

/// Keeps the client-side selection in step with the server.
///
/// Toggles are applied optimistically, sent to the server, then committed
/// on acknowledgment or rolled back on failure. Methods take `&self` and the
/// state lock is never held across a request, so several toggles can be in
/// flight at once; the last one to resolve decides the final state.
pub struct SelectionSynchronizer<A> {
    api: A,
    state: Mutex<SelectionState>,
    events: broadcast::Sender<SelectionEvent>,
}

impl<A: SelectionApi> SelectionSynchronizer<A> {
    pub fn new<I, S>(api: A, listing: Vec<ListingEntry>, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = SelectionState {
            committed: selected.into_iter().collect(),
            listing,
            ..Default::default()
        };

        Self {
            api,
            state: Mutex::new(state),
            events,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.events.subscribe()
    }

    fn state(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SelectionEvent) {
        // No subscriber is fine.
        let _ = self.events.send(event);
    }

    /// Add or remove `path` on the server, with an optimistic local update.
    pub async fn synchronize(&self, action: Action, path: &str) -> Result<(), SyncError> {
        validate_selection_path(path).map_err(SyncError::InvalidPath)?;

        let (ticket, toggled) = {
            let mut state = self.state();
            let (ticket, in_flight) = state.register(action, path);
            if in_flight > 1 {
                tracing::warn!(path, in_flight, "overlapping selection toggles; last response wins");
            }
            let toggled = SelectionEvent::Toggled {
                path: path.to_string(),
                selected: state.is_checked(path),
                count: state.displayed_count(),
            };
            (ticket, toggled)
        };
        self.emit(toggled);

        let result = self.api.update_selection(action, path).await;

        let event = {
            let mut state = self.state();
            state.resolve(path, ticket);

            match &result {
                Ok(()) => {
                    match action {
                        Action::Add => state.committed.add(path),
                        Action::Remove => state.committed.remove(path),
                    };
                    tracing::debug!(action = action.as_str(), path, "selection committed");
                    SelectionEvent::Committed {
                        action,
                        path: path.to_string(),
                        count: state.displayed_count(),
                    }
                }
                Err(e) => {
                    tracing::warn!(action = action.as_str(), path, error = %e, "selection update failed, rolling back");
                    SelectionEvent::RolledBack {
                        path: path.to_string(),
                        selected: state.is_checked(path),
                        count: state.displayed_count(),
                        error: e.to_string(),
                    }
                }
            }
        };
        self.emit(event);

        result
    }

    /// Flip the displayed checkbox of `path`. Returns the new checkbox state.
    pub async fn toggle(&self, path: &str) -> Result<bool, SyncError> {
        let action = if self.is_checked(path) {
            Action::Remove
        } else {
            Action::Add
        };
        self.synchronize(action, path).await?;
        Ok(action.checked())
    }

    /// Select every visible item that isn't checked yet, one request at a
    /// time. Failures don't stop the batch.
    pub async fn select_all(&self, mut progress: impl FnMut(usize, usize)) -> BulkSelectReport {
        let candidates: Vec<String> = {
            let state = self.state();
            state
                .listing
                .iter()
                .filter(|e| !state.is_checked(&e.path))
                .map(|e| e.path.clone())
                .collect()
        };

        let total = candidates.len();
        let mut report = BulkSelectReport::default();

        for (done, path) in candidates.into_iter().enumerate() {
            // Another handler may have checked it meanwhile.
            if !self.is_checked(&path) {
                report.attempted += 1;
                match self.synchronize(Action::Add, &path).await {
                    Ok(()) => report.succeeded += 1,
                    Err(e) => report.failed.push((path, e)),
                }
            }
            progress(done + 1, total);
        }

        report
    }

    /// Replace the committed selection wholesale, e.g. after the server
    /// cleared its selection file.
    pub fn reset<I, S>(&self, selected: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let count = {
            let mut state = self.state();
            state.committed = selected.into_iter().collect();
            state.displayed_count()
        };
        self.emit(SelectionEvent::Reset { count });
    }

    /// Committed selection in selection order.
    pub fn selected(&self) -> Vec<String> {
        self.state().committed.to_vec()
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.state().committed.contains(path)
    }

    /// Displayed checkbox state, including in-flight toggles.
    pub fn is_checked(&self, path: &str) -> bool {
        self.state().is_checked(path)
    }

    /// Displayed selection count, including in-flight toggles.
    pub fn count(&self) -> usize {
        self.state().displayed_count()
    }

    pub fn in_flight(&self, path: &str) -> usize {
        self.state().pending.get(path).map_or(0, Vec::len)
    }

    pub fn entry(&self, path: &str) -> Option<ListingEntry> {
        self.state().listing.iter().find(|e| e.path == path).cloned()
    }

    pub fn items(&self) -> Vec<SelectableItem> {
        let state = self.state();
        project_items(&state.listing, |p| state.is_checked(p))
    }

    pub fn view_selected(&self) -> Vec<SelectedEntry> {
        let state = self.state();
        project_selected(state.committed.iter(), &state.listing)
    }
}
