use crate::core::error::{Result, UvPipError};
use crate::core::ProcessExecutor;
use std::path::{Path, PathBuf};

/// Find the interpreter to install into when no virtualenv is given.
pub fn resolve_interpreter(explicit: Option<&Path>, candidates: &[String]) -> Result<PathBuf> {
    if let Some(python) = explicit {
        if python.is_absolute() {
            if python.exists() {
                return Ok(python.to_path_buf());
            }
            return Err(UvPipError::PythonEnv(format!(
                "Python interpreter {} does not exist",
                python.display()
            )));
        }

        let name = python.to_string_lossy();
        return ProcessExecutor::find_executable(&name, &[]).ok_or_else(|| {
            UvPipError::PythonEnv(format!("Unable to find Python interpreter {}", name))
        });
    }

    candidates
        .iter()
        .find_map(|candidate| ProcessExecutor::find_executable(candidate, &[]))
        .ok_or_else(|| {
            UvPipError::PythonEnv(format!(
                "Unable to find a Python interpreter (tried {}). Set the python or virtualenv parameter.",
                candidates.join(", ")
            ))
        })
}
