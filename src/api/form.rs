/// Field names the server reads from the page form.
pub const FIELD_DELETE: &str = "delete";
pub const FIELD_CREATE_FOLDER: &str = "create_folder";
pub const FIELD_FOLDER_NAME: &str = "folder_name";
pub const FIELD_PROCESS: &str = "process";
pub const FIELD_SELECTED_SCRIPT: &str = "selected_script";
pub const FIELD_CLEAR_SELECTION: &str = "clear_selection";
pub const FIELD_SELECTED_FILES: &str = "selected_files";

/// A submission of the page form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Delete { paths: Vec<String> },
    CreateFolder { name: String },
    Process { script: String, paths: Vec<String> },
    ClearSelection,
}

impl FormSubmission {
    /// Url-encoded fields in submission order. `selected_files` repeats once
    /// per path.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            FormSubmission::Delete { paths } => {
                let mut fields = vec![(FIELD_DELETE, "delete".to_string())];
                fields.extend(selected_files(paths));
                fields
            }
            FormSubmission::CreateFolder { name } => vec![
                (FIELD_CREATE_FOLDER, "create_folder".to_string()),
                (FIELD_FOLDER_NAME, name.clone()),
            ],
            FormSubmission::Process { script, paths } => {
                // The delete field is always sent empty so the server can
                // never read a process submission as a delete.
                let mut fields = vec![
                    (FIELD_DELETE, String::new()),
                    (FIELD_PROCESS, "process".to_string()),
                    (FIELD_SELECTED_SCRIPT, script.clone()),
                ];
                fields.extend(selected_files(paths));
                fields
            }
            FormSubmission::ClearSelection => {
                vec![(FIELD_CLEAR_SELECTION, "clear_selection".to_string())]
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FormSubmission::Delete { .. } => "delete",
            FormSubmission::CreateFolder { .. } => "create_folder",
            FormSubmission::Process { .. } => "process",
            FormSubmission::ClearSelection => "clear_selection",
        }
    }
}

fn selected_files(paths: &[String]) -> impl Iterator<Item = (&'static str, String)> + '_ {
    paths.iter().map(|p| (FIELD_SELECTED_FILES, p.clone()))
}
