pub mod set;
pub mod synchronizer;
pub mod types;
pub mod view;

pub use set::SelectionSet;
pub use synchronizer::SelectionSynchronizer;
pub use types::{Action, BulkSelectReport, ListingEntry, SelectableItem, SelectionEvent, SyncError};
pub use view::SelectedEntry;
