pub mod api;
pub mod config;
pub mod delete_confirm;
pub mod error_codes;
pub mod input_validation;
pub mod logging;
pub mod path_validation;
pub mod selection;
pub mod session;


use anyhow::Result;

use api::HttpApi;
use config::Config;
use session::{FileManagerSession, PageState};

pub use selection::{Action, SyncError};

/// Build a session talking to the server named in `config`.
pub fn connect(config: &Config, page: PageState) -> Result<FileManagerSession<HttpApi>> {
    config.validate()?;
    let api = HttpApi::new(&config.base_url, config.request_timeout())?;
    Ok(FileManagerSession::new(api, page).with_confirm_timeout(config.delete_confirm_timeout()))
}

pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
