use serde::Serialize;

use super::types::{ListingEntry, SelectableItem};
use crate::path_validation::display_name;

/// A row of the "view selected" list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectedEntry {
    pub path: String,
    pub name: String,
    /// Only known for items of the current listing; anything else is shown
    /// as a file.
    pub is_dir: bool,
}

/// Project the selection into the "view selected" list, in selection order.
pub fn project_selected<'a>(
    selected: impl IntoIterator<Item = &'a str>,
    listing: &[ListingEntry],
) -> Vec<SelectedEntry> {
    selected
        .into_iter()
        .map(|path| SelectedEntry {
            path: path.to_string(),
            name: display_name(path).to_string(),
            is_dir: listing.iter().any(|e| e.path == path && e.is_dir),
        })
        .collect()
}

/// Project the listing into grid items with their checkbox state.
pub fn project_items(listing: &[ListingEntry], is_checked: impl Fn(&str) -> bool) -> Vec<SelectableItem> {
    listing
        .iter()
        .map(|entry| SelectableItem {
            path: entry.path.clone(),
            is_dir: entry.is_dir,
            selected: is_checked(&entry.path),
        })
        .collect()
}
