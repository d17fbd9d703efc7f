//! Page session: the handlers behind the file manager's buttons and cards.
//!
//! One `FileManagerSession` lives for one rendered page. It is built from the
//! server-rendered [`PageState`] and dropped on reload or navigation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{FormSubmission, SelectionApi};
use crate::delete_confirm::{ConfirmState, DeleteButtonView, DeleteClick, DeleteConfirmation, DEFAULT_CONFIRM_TIMEOUT};
use crate::error_codes::*;
use crate::input_validation::{validate_folder_name, validate_script_name, FolderNameError, ScriptError};
use crate::path_validation::display_name;
use crate::selection::{
    Action, BulkSelectReport, ListingEntry, SelectableItem, SelectedEntry, SelectionEvent, SelectionSynchronizer,
    SyncError,
};

/// State the server renders into the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageState {
    /// Listing path relative to the server root, empty for the root
    pub current_path: String,
    #[serde(alias = "files")]
    pub items: Vec<ListingEntry>,
    pub selected: Vec<String>,
    pub scripts: Vec<String>,
}

/// Where on a card the user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Link,
    KebabMenu,
    FolderCheckbox,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    Ignored,
    Toggled { selected: bool },
    Navigate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Armed { deadline: Instant },
    Submitted { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The host should reload the listing.
    Renamed { new_name: String },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KebabAction {
    Select,
    Open,
    /// `confirmed` is the answer to the "are you sure" prompt.
    Delete { confirmed: bool },
    Rename(String),
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KebabOutcome {
    Card(CardOutcome),
    Deleted { count: usize },
    Rename(RenameOutcome),
    Cancelled,
}

/// A notice for the user. `Display` is the message, `code()` the stable id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Please select at least one file")]
    EmptySelection,
    #[error("No files selected")]
    NothingToView,
    #[error(transparent)]
    FolderName(#[from] FolderNameError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("Failed to update selection")]
    Sync(#[source] SyncError),
    #[error("Failed to remove from selection. Please try again.")]
    RemoveFromView(#[source] SyncError),
    #[error("Failed to rename file")]
    Rename(#[source] SyncError),
    #[error("Failed to submit {kind} request")]
    Submit {
        kind: &'static str,
        #[source]
        source: SyncError,
    },
    #[error("Download is not available")]
    DownloadUnavailable,
}

impl ActionError {
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::EmptySelection | ActionError::NothingToView => ERR_EMPTY_SELECTION,
            ActionError::FolderName(FolderNameError::Missing) => ERR_FOLDER_NAME_REQUIRED,
            ActionError::FolderName(FolderNameError::Invalid) => ERR_INVALID_FOLDER_NAME,
            ActionError::Script(_) => ERR_INVALID_SCRIPT,
            ActionError::Sync(_) => ERR_SELECTION_SYNC_FAILED,
            ActionError::RemoveFromView(_) => ERR_SELECTION_REMOVE_FAILED,
            ActionError::Rename(_) => ERR_RENAME_FAILED,
            ActionError::Submit { .. } => ERR_SUBMIT_FAILED,
            ActionError::DownloadUnavailable => ERR_UNSUPPORTED_ACTION,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct FileManagerSession<A> {
    current_path: String,
    scripts: Vec<String>,
    selection: SelectionSynchronizer<A>,
    delete_confirm: Arc<Mutex<DeleteConfirmation>>,
    delete_timer: Mutex<Option<CancellationToken>>,
    open_kebab: Mutex<Option<String>>,
}

impl<A: SelectionApi> FileManagerSession<A> {
    pub fn new(api: A, page: PageState) -> Self {
        Self {
            current_path: page.current_path,
            scripts: page.scripts,
            selection: SelectionSynchronizer::new(api, page.items, page.selected),
            delete_confirm: Arc::new(Mutex::new(DeleteConfirmation::new(DEFAULT_CONFIRM_TIMEOUT))),
            delete_timer: Mutex::new(None),
            open_kebab: Mutex::new(None),
        }
    }

    pub fn with_confirm_timeout(self, timeout: Duration) -> Self {
        *lock(&self.delete_confirm) = DeleteConfirmation::new(timeout);
        self
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn selection(&self) -> &SelectionSynchronizer<A> {
        &self.selection
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.selection.subscribe()
    }

    /// Displayed selection count
    pub fn count(&self) -> usize {
        self.selection.count()
    }

    pub fn items(&self) -> Vec<SelectableItem> {
        self.selection.items()
    }

    // ---- cards ----

    pub async fn click_card(&self, path: &str, target: ClickTarget) -> Result<CardOutcome, ActionError> {
        let Some(entry) = self.selection.entry(path) else {
            return Ok(CardOutcome::Ignored);
        };

        match target {
            ClickTarget::Link | ClickTarget::KebabMenu => Ok(CardOutcome::Ignored),
            ClickTarget::Body if entry.is_dir => Ok(CardOutcome::Navigate(entry.path)),
            ClickTarget::Body | ClickTarget::FolderCheckbox => self.toggle(path).await,
        }
    }

    async fn toggle(&self, path: &str) -> Result<CardOutcome, ActionError> {
        let selected = self.selection.toggle(path).await.map_err(ActionError::Sync)?;
        Ok(CardOutcome::Toggled { selected })
    }

    /// Add each of `paths` to the selection, stopping at the first failure.
    /// Returns the displayed count afterwards.
    pub async fn select_paths<I, S>(&self, paths: I) -> Result<usize, ActionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.selection
                .synchronize(Action::Add, path.as_ref())
                .await
                .map_err(ActionError::Sync)?;
        }
        Ok(self.selection.count())
    }

    pub async fn select_all(&self, progress: impl FnMut(usize, usize)) -> BulkSelectReport {
        let report = self.selection.select_all(progress).await;
        if !report.is_complete() {
            tracing::warn!(
                failed = report.failed.len(),
                attempted = report.attempted,
                "select all finished with failures"
            );
        }
        report
    }

    // ---- delete ----

    pub async fn click_delete(&self) -> Result<DeleteOutcome, ActionError> {
        let click = lock(&self.delete_confirm).click(Instant::now(), self.selection.count());

        match click {
            DeleteClick::EmptySelection => Err(ActionError::EmptySelection),
            DeleteClick::Armed { deadline } => {
                self.arm_delete_timer(deadline);
                Ok(DeleteOutcome::Armed { deadline })
            }
            DeleteClick::Confirmed => {
                self.cancel_delete_timer();
                let count = self.submit_delete().await?;
                Ok(DeleteOutcome::Submitted { count })
            }
        }
    }

    fn arm_delete_timer(&self, deadline: Instant) {
        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.delete_timer).replace(token.clone()) {
            previous.cancel();
        }

        let confirm = Arc::clone(&self.delete_confirm);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    if lock(&confirm).poll(Instant::now()) {
                        tracing::debug!("delete confirmation expired");
                    }
                }
            }
        });
    }

    fn cancel_delete_timer(&self) {
        if let Some(token) = lock(&self.delete_timer).take() {
            token.cancel();
        }
    }

    async fn submit_delete(&self) -> Result<usize, ActionError> {
        let paths = self.selection.selected();
        let count = paths.len();

        let result = self.submit(FormSubmission::Delete { paths }).await;
        lock(&self.delete_confirm).clear_intent();
        result?;

        // The server clears its selection once the files are gone.
        self.selection.reset(Vec::<String>::new());
        Ok(count)
    }

    pub fn delete_button(&self) -> DeleteButtonView {
        let mut confirm = lock(&self.delete_confirm);
        confirm.poll(Instant::now());
        confirm.view()
    }

    /// Confirmation state as last updated by a click or the expiry timer.
    pub fn delete_state(&self) -> ConfirmState {
        lock(&self.delete_confirm).state()
    }

    pub fn delete_intent(&self) -> bool {
        lock(&self.delete_confirm).delete_intent()
    }

    // ---- folders ----

    /// Returns the sanitized name the folder was requested under.
    pub async fn create_folder(&self, raw_name: &str) -> Result<String, ActionError> {
        let name = validate_folder_name(raw_name)?;
        self.submit(FormSubmission::CreateFolder { name: name.clone() }).await?;
        Ok(name)
    }

    // ---- process ----

    /// Opening the process dialog drops any pending delete.
    pub fn open_process(&self) -> Result<Vec<String>, ActionError> {
        if self.selection.count() == 0 {
            return Err(ActionError::EmptySelection);
        }
        lock(&self.delete_confirm).clear_intent();
        Ok(self.scripts.clone())
    }

    pub async fn submit_process(&self, script: &str) -> Result<usize, ActionError> {
        let script = validate_script_name(script, &self.scripts)?;
        if self.selection.count() == 0 {
            return Err(ActionError::EmptySelection);
        }

        lock(&self.delete_confirm).clear_intent();
        let paths = self.selection.selected();
        let count = paths.len();
        self.submit(FormSubmission::Process { script, paths }).await?;

        self.selection.reset(Vec::<String>::new());
        Ok(count)
    }

    pub async fn clear_selection(&self) -> Result<(), ActionError> {
        self.submit(FormSubmission::ClearSelection).await?;
        self.selection.reset(Vec::<String>::new());
        Ok(())
    }

    // ---- view selected ----

    pub fn view_selected(&self) -> Result<Vec<SelectedEntry>, ActionError> {
        if self.selection.count() == 0 {
            return Err(ActionError::NothingToView);
        }
        Ok(self.selection.view_selected())
    }

    /// Drop `path` from the selection (the file itself is kept) and return
    /// the re-projected list.
    pub async fn remove_from_view(&self, path: &str) -> Result<Vec<SelectedEntry>, ActionError> {
        self.selection
            .synchronize(Action::Remove, path)
            .await
            .map_err(ActionError::RemoveFromView)?;
        Ok(self.selection.view_selected())
    }

    // ---- rename ----

    pub async fn rename(&self, path: &str, new_name: &str) -> Result<RenameOutcome, ActionError> {
        if new_name.is_empty() || new_name == display_name(path) {
            return Ok(RenameOutcome::Unchanged);
        }

        self.selection
            .api()
            .rename(path, new_name)
            .await
            .map_err(|e| {
                tracing::warn!(path, error = %e, "rename failed");
                ActionError::Rename(e)
            })?;

        Ok(RenameOutcome::Renamed {
            new_name: new_name.to_string(),
        })
    }

    // ---- kebab menus ----

    /// Open the menu of `path`, or close it if it is the open one. At most
    /// one menu is open.
    pub fn toggle_kebab(&self, path: &str) -> Option<String> {
        let mut open = lock(&self.open_kebab);
        if open.as_deref() == Some(path) {
            *open = None;
        } else {
            *open = Some(path.to_string());
        }
        open.clone()
    }

    pub fn close_kebab(&self) {
        *lock(&self.open_kebab) = None;
    }

    pub fn open_kebab(&self) -> Option<String> {
        lock(&self.open_kebab).clone()
    }

    pub async fn kebab_action(&self, path: &str, action: KebabAction) -> Result<KebabOutcome, ActionError> {
        self.close_kebab();

        let Some(entry) = self.selection.entry(path) else {
            return Ok(KebabOutcome::Card(CardOutcome::Ignored));
        };

        match action {
            KebabAction::Select => self.toggle(path).await.map(KebabOutcome::Card),
            KebabAction::Open if entry.is_dir => Ok(KebabOutcome::Card(CardOutcome::Navigate(entry.path))),
            KebabAction::Open => Ok(KebabOutcome::Card(CardOutcome::Ignored)),
            KebabAction::Delete { confirmed: false } => Ok(KebabOutcome::Cancelled),
            KebabAction::Delete { confirmed: true } => {
                // The server deletes its whole selection, so the item has to
                // be in it first.
                self.select_paths([path]).await?;
                let count = self.submit_delete().await?;
                Ok(KebabOutcome::Deleted { count })
            }
            KebabAction::Rename(new_name) => self.rename(path, &new_name).await.map(KebabOutcome::Rename),
            KebabAction::Download => Err(ActionError::DownloadUnavailable),
        }
    }

    async fn submit(&self, form: FormSubmission) -> Result<(), ActionError> {
        let kind = form.kind();
        self.selection
            .api()
            .submit_form(&self.current_path, &form)
            .await
            .map_err(|source| {
                tracing::warn!(kind, error = %source, "form submission failed");
                ActionError::Submit { kind, source }
            })
    }
}
