//! Pure construction of `uv pip` command vectors.

use crate::core::error::{Result, UvPipError};
use crate::module::params::PipParams;
use crate::python::package::Package;
use std::path::Path;

pub const DRY_RUN_FLAG: &str = "--dry-run";
const EDITABLE_FLAG: &str = "-e";

/// What the pip command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipTarget<'a> {
    Packages(&'a [Package]),
    Requirements(&'a str),
}

/// Split a shell-style argument string, as `extra_args` and `executable` are written.
pub fn split_command_line(raw: &str) -> Result<Vec<String>> {
    shlex::split(raw)
        .ok_or_else(|| UvPipError::validation(format!("unable to parse command line: {}", raw)))
}

/// `extra_args` with `-e` appended when `editable` is set and it is not already there.
pub fn effective_extra_args(params: &PipParams) -> Result<Vec<String>> {
    let mut args = match params.extra_args.as_deref() {
        Some(raw) => split_command_line(raw)?,
        None => Vec::new(),
    };

    if params.editable && !args.iter().any(|a| a == EDITABLE_FLAG) {
        args.push(EDITABLE_FLAG.to_string());
    }

    Ok(args)
}

/// `<pip> <state args> --python <interpreter> [extra args] (<packages> | -r <file>)`
pub fn pip_command(
    pip: &[String],
    params: &PipParams,
    interpreter: &Path,
    target: &PipTarget<'_>,
) -> Result<Vec<String>> {
    let mut cmd: Vec<String> = pip.to_vec();
    cmd.extend(params.state.pip_args().iter().map(|s| s.to_string()));
    cmd.push("--python".to_string());
    cmd.push(interpreter.display().to_string());
    cmd.extend(effective_extra_args(params)?);

    match target {
        PipTarget::Packages(packages) => {
            cmd.extend(packages.iter().map(|p| p.as_str().to_string()));
        }
        PipTarget::Requirements(path) => {
            cmd.push("-r".to_string());
            cmd.push(path.to_string());
        }
    }

    Ok(cmd)
}

pub fn with_dry_run(cmd: &[String]) -> Vec<String> {
    let mut cmd = cmd.to_vec();
    cmd.push(DRY_RUN_FLAG.to_string());
    cmd
}

/// `<pip> list --format=freeze --python <interpreter>`
pub fn freeze_command(pip: &[String], interpreter: &Path) -> Vec<String> {
    let mut cmd = pip.to_vec();
    cmd.push("list".to_string());
    cmd.push("--format=freeze".to_string());
    cmd.push("--python".to_string());
    cmd.push(interpreter.display().to_string());
    cmd
}
