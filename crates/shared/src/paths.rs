//! Path utilities for locating model artifacts
//!
//! The model directory is configured as a string that may start with `~`;
//! these helpers turn it into a usable path.

use std::env;
use std::path::{Path, PathBuf};

/// Default models directory, relative to the working directory
const MODELS_DIR_NAME: &str = "models";

/// Get the default models directory path
///
/// Returns `./models`, the directory the service reads its artifacts from
/// when nothing else is configured.
///
/// # Examples
///
/// ```
/// use harvest_shared::default_models_dir;
///
/// let models_path = default_models_dir();
/// assert!(models_path.ends_with("models"));
/// ```
pub fn default_models_dir() -> PathBuf {
    PathBuf::from(".").join(MODELS_DIR_NAME)
}

/// Get the user's home directory
///
/// Falls back to current directory if HOME cannot be determined.
fn get_home_dir() -> PathBuf {
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home)
    } else if let Some(home_dir) = dirs::home_dir() {
        home_dir
    } else {
        PathBuf::from(".")
    }
}

/// Expand a path that starts with `~` to use the user's home directory
///
/// # Examples
///
/// ```
/// use harvest_shared::expand_home_dir;
///
/// let path = expand_home_dir("~/models/vegetables");
/// assert!(!path.to_string_lossy().starts_with('~'));
/// ```
pub fn expand_home_dir<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            return get_home_dir().join(stripped);
        } else if path_str == "~" {
            return get_home_dir();
        }
    }
    path.to_path_buf()
}

/// Resolve a models directory path, expanding `~` if needed
///
/// Relative and absolute paths are returned as-is.
pub fn resolve_models_path<P: AsRef<Path>>(path: P) -> PathBuf {
    expand_home_dir(path)
}
