use crate::core::error::{Result, UvPipError};
use crate::core::{CapturedOutput, ProcessExecutor, RunOptions};
use crate::python::command::{freeze_command, split_command_line};
use semver::Version;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Oldest uv whose `pip uninstall` understands `--dry-run`.
pub const MIN_UNINSTALL_DRY_RUN: Version = Version::new(0, 5, 6);

/// A resolved `uv pip` invocation prefix, e.g. `["/usr/local/bin/uv", "pip"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UvManager {
    argv: Vec<String>,
}

impl UvManager {
    /// Resolve the configured command. An absolute program is taken as is;
    /// anything else is looked up in `search_dirs` and `PATH`.
    pub fn locate(command: &str, search_dirs: &[PathBuf]) -> Result<Self> {
        let mut argv = split_command_line(command)?;
        let Some(program) = argv.first() else {
            return Err(UvPipError::validation("executable cannot be empty"));
        };

        if !Path::new(program).is_absolute() {
            let found = ProcessExecutor::find_executable(program, search_dirs)
                .ok_or_else(|| UvPipError::UvNotFound(program.clone()))?;
            argv[0] = found.display().to_string();
        }

        debug!(pip = %argv.join(" "), "resolved uv");
        Ok(Self { argv })
    }

    pub fn pip_argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// `uv --version`; `None` when the probe fails or prints something unexpected.
    pub async fn tool_version(&self) -> Option<Version> {
        let probe = vec![self.program().to_string(), "--version".to_string()];
        match ProcessExecutor::execute_with_output(&probe).await {
            Ok(output) => {
                let version = parse_uv_version(&output);
                if version.is_none() {
                    warn!(output = %output, "unrecognised uv version output");
                }
                version
            }
            Err(e) => {
                warn!(error = %e, "unable to query uv version");
                None
            }
        }
    }

    /// Installed distributions in `pip freeze` format, used to diff before and after a run.
    pub async fn freeze(&self, interpreter: &Path, opts: &RunOptions, locale: &str) -> Result<String> {
        let cmd = freeze_command(&self.argv, interpreter);
        let opts = opts
            .clone()
            .with_env("LANG", locale)
            .with_env("LC_ALL", locale)
            .with_env("LC_MESSAGES", locale);

        let output = ProcessExecutor::run(&cmd, &opts).await?;
        if !output.success() {
            return Err(command_failed(&cmd, output, "", ""));
        }
        Ok(output.stdout)
    }
}

pub fn command_failed(
    cmd: &[String],
    output: CapturedOutput,
    prior_stdout: &str,
    prior_stderr: &str,
) -> UvPipError {
    UvPipError::CommandFailed {
        cmd: cmd.to_vec(),
        rc: output.rc,
        stdout: output.stdout,
        stderr: output.stderr,
        prior_stdout: prior_stdout.to_string(),
        prior_stderr: prior_stderr.to_string(),
    }
}

/// Parse `uv 0.5.6 (abc123 2024-12-03)` into a version.
pub fn parse_uv_version(output: &str) -> Option<Version> {
    let line = output.lines().next()?.trim();
    let mut words = line.split_whitespace();
    let first = words.next()?;
    let raw = if first.chars().next()?.is_ascii_digit() {
        first
    } else {
        words.next()?
    };
    Version::parse(raw).ok()
}

pub fn supports_uninstall_dry_run(version: &Version) -> bool {
    *version >= MIN_UNINSTALL_DRY_RUN
}
