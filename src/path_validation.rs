/// Maximum allowed path length for a selection entry
const MAX_PATH_LENGTH: usize = 4096;

/// Validate that a path can be sent as a selection entry
pub fn validate_selection_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Path cannot be empty".to_string());
    }

    if path.len() > MAX_PATH_LENGTH {
        return Err(format!("Path too long (max {MAX_PATH_LENGTH} bytes)"));
    }

    if path.bytes().any(|b| b == 0) {
        return Err("Path contains null bytes".to_string());
    }

    Ok(())
}

/// Last component of a listing path, accepting both separators.
///
/// Server paths may come from either platform, so `C:\data\a.txt` and
/// `/data/a.txt` both yield `a.txt`. A path ending in a separator falls back
/// to the whole path.
pub fn display_name(path: &str) -> &str {
    match path.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}
