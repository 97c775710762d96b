//! Data directory resolution.
//!
//! Relative cache and boundary file paths resolve against the data
//! directory: an explicit path if given, else [`DATA_DIR_ENV`], else the
//! current working directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "DISABILITY_MAP_DATA_DIR";

/// Resolves the data directory.
///
/// # Errors
///
/// Returns an I/O error if neither `explicit` nor [`DATA_DIR_ENV`] is set
/// and the current directory cannot be determined.
pub fn data_dir(explicit: Option<&Path>) -> std::io::Result<PathBuf> {
    choose_data_dir(
        explicit,
        std::env::var_os(DATA_DIR_ENV),
        std::env::current_dir,
    )
}

fn choose_data_dir(
    explicit: Option<&Path>,
    from_env: Option<OsString>,
    cwd: impl FnOnce() -> std::io::Result<PathBuf>,
) -> std::io::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = from_env.filter(|v| !v.is_empty()) {
        log::debug!("Using data directory from {DATA_DIR_ENV}");
        return Ok(PathBuf::from(value));
    }
    cwd()
}
