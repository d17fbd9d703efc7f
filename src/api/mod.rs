//! File manager server interface
//!
//! The server owns the persisted selection, the log file and the actual file
//! operations. Everything the client needs from it goes through
//! [`SelectionApi`], so handlers can run against the reqwest client or an
//! in-process fake.

pub mod client;
pub mod form;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use crate::selection::types::{Action, SyncError};

pub use client::HttpApi;
pub use form::FormSubmission;

pub trait SelectionApi: Send + Sync {
    /// `POST /update_selection`
    fn update_selection(
        &self,
        action: Action,
        path: &str,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// `POST /rename`
    fn rename(
        &self,
        path: &str,
        new_name: &str,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// `GET /logs_raw`
    fn fetch_logs(&self) -> impl Future<Output = Result<String, SyncError>> + Send;

    /// Url-encoded form post to the page at `page_path`.
    fn submit_form(
        &self,
        page_path: &str,
        form: &FormSubmission,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}
