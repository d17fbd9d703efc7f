//! User input validation and sanitization
//!
//! Local precondition checks that run before any request is sent: folder
//! names typed into the "new folder" dialog and script names picked in the
//! process dialog.

use thiserror::Error;

/// Characters that may not appear in a folder or file name.
const UNSAFE_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolderNameError {
    #[error("Please enter a folder name")]
    Missing,
    #[error("Invalid folder name. Please use only valid characters.")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Please choose a script to run")]
    Missing,
    #[error("Unknown script: '{0}'")]
    Unknown(String),
}

/// Sanitize a folder name
///
/// Trims surrounding whitespace, replaces every unsafe character with `_`
/// and strips leading/trailing dots so the result can't be hidden or refer
/// to `.`/`..`. The result may be empty.
pub fn sanitize_folder_name(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| if UNSAFE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    replaced.trim_matches('.').to_string()
}

/// Validate a raw folder name and return its sanitized form.
pub fn validate_folder_name(raw: &str) -> Result<String, FolderNameError> {
    if raw.trim().is_empty() {
        return Err(FolderNameError::Missing);
    }

    let sanitized = sanitize_folder_name(raw);
    if sanitized.is_empty() {
        return Err(FolderNameError::Invalid);
    }

    Ok(sanitized)
}

/// Validate the script chosen in the process dialog against the scripts the
/// page offered.
pub fn validate_script_name(name: &str, available: &[String]) -> Result<String, ScriptError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ScriptError::Missing);
    }

    if !available.iter().any(|s| s == trimmed) {
        return Err(ScriptError::Unknown(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_folder_name_replaces_unsafe_chars() {
        assert_eq!(sanitize_folder_name("My:Folder*Name?"), "My_Folder_Name_");
        assert_eq!(sanitize_folder_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_folder_name("<\"|>"), "____");
    }

    #[test]
    fn test_sanitize_folder_name_strips_dots() {
        assert_eq!(sanitize_folder_name("...hidden..."), "hidden");
        assert_eq!(sanitize_folder_name(".."), "");
        assert_eq!(sanitize_folder_name("v1.2"), "v1.2");
    }

    #[test]
    fn test_sanitize_folder_name_trims_before_stripping_dots() {
        assert_eq!(sanitize_folder_name("  .config  "), "config");
        // Only the outer whitespace is trimmed, inner spaces survive.
        assert_eq!(sanitize_folder_name(" . a . "), " a ");
    }

    #[test]
    fn test_validate_folder_name_empty() {
        assert_eq!(validate_folder_name(""), Err(FolderNameError::Missing));
        assert_eq!(validate_folder_name("   "), Err(FolderNameError::Missing));
    }

    #[test]
    fn test_validate_folder_name_empty_after_sanitizing() {
        assert_eq!(validate_folder_name("..."), Err(FolderNameError::Invalid));
        assert_eq!(validate_folder_name(" .. "), Err(FolderNameError::Invalid));
    }

    #[test]
    fn test_validate_folder_name_valid() {
        assert_eq!(validate_folder_name(" Reports 2024 ").unwrap(), "Reports 2024");
        assert_eq!(validate_folder_name("My:Folder*Name?").unwrap(), "My_Folder_Name_");
    }

    #[test]
    fn test_validate_script_name() {
        let scripts = vec!["resize.py".to_string(), "convert.py".to_string()];

        assert_eq!(validate_script_name(" resize.py ", &scripts).unwrap(), "resize.py");
        assert_eq!(validate_script_name("", &scripts), Err(ScriptError::Missing));
        assert_eq!(
            validate_script_name("rm.py", &scripts),
            Err(ScriptError::Unknown("rm.py".to_string()))
        );
    }
}
