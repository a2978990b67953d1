//! Filesystem-safe names derived from user and model supplied text

use super::CreatureId;

/// Longest file name accepted by common filesystems, in bytes
const MAX_FILE_NAME_BYTES: usize = 255;

/// `_` plus the widest `i64` id
const ID_SUFFIX_BYTES: usize = 1 + 20;

/// Longest creature name, in bytes once lowercased, whose folder name fits
pub const MAX_NAME_BYTES: usize = MAX_FILE_NAME_BYTES - ID_SUFFIX_BYTES;

/// Whether `name` can become a folder name for any creature id
///
/// Lowercasing can change the byte length, so the check runs on the
/// lowercased form.
pub fn fits_folder_name(name: &str) -> bool {
    name.trim().to_lowercase().len() <= MAX_NAME_BYTES
}

/// Normalize an item name into a lowercase, underscore-separated token
///
/// Spaces become underscores and anything outside `[a-z0-9_]` is dropped.
/// Returns `None` when nothing usable remains.
pub fn normalize_name(name: &str) -> Option<String> {
    let token: String = name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();
    if token.trim_matches('_').is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Folder name for a creature's asset tree: `lower(name)_id`
pub fn creature_folder_name(name: &str, id: CreatureId) -> String {
    format!("{}_{}", name, id).trim().to_lowercase()
}
