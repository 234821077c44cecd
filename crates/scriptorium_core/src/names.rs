//! Prompt file name rules.

use std::path::Path;

/// Whether `name` is a bare file name with no directory components.
///
/// ```
/// use scriptorium_core::is_plain_file_name;
///
/// assert!(is_plain_file_name("translate.txt"));
/// assert!(!is_plain_file_name("../secret.txt"));
/// assert!(!is_plain_file_name("prompts\\translate.txt"));
/// assert!(!is_plain_file_name(""));
/// ```
pub fn is_plain_file_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name)
}
