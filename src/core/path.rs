use crate::core::error::{Result, UvPipError};
use std::path::{Path, PathBuf};

/// Join `configured` onto `base_dir` unless it is already absolute.
pub fn resolve_path(base_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        base_dir.join(configured)
    }
}

/// Expand `~` and environment variables in a `path` typed module argument.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| UvPipError::validation(format!("unable to expand path {}: {}", raw, e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
