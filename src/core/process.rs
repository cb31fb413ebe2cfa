use crate::core::error::{Result, UvPipError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

const SBIN_DIRS: [&str; 3] = ["/sbin", "/usr/sbin", "/usr/local/sbin"];

/// Knobs applied to a single child process.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cwd: Option<PathBuf>,
    /// Directory put in front of the inherited `PATH`.
    pub path_prefix: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl RunOptions {
    pub fn in_dir(cwd: &Path) -> Self {
        Self {
            cwd: Some(cwd.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.rc == 0
    }
}

pub struct ProcessExecutor;

impl ProcessExecutor {
    pub async fn run(argv: &[String], opts: &RunOptions) -> Result<CapturedOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| UvPipError::Spawn("an empty command".to_string()))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(cwd) = &opts.cwd {
            command.current_dir(cwd);
        }

        if let Some(prefix) = &opts.path_prefix {
            command.env("PATH", prefixed_path(prefix)?);
        }

        for (key, value) in &opts.env {
            command.env(key, value);
        }

        debug!(cmd = %argv.join(" "), "spawning");

        let output = command
            .output()
            .await
            .map_err(|e| UvPipError::Spawn(format!("{}: {}", program, e)))?;

        let captured = CapturedOutput {
            rc: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!(rc = captured.rc, "child exited");

        Ok(captured)
    }

    /// Run a probe command and return its trimmed stdout, failing on non-zero exit.
    pub async fn execute_with_output(argv: &[String]) -> Result<String> {
        let output = Self::run(argv, &RunOptions::default()).await?;

        if !output.success() {
            return Err(UvPipError::Spawn(format!(
                "{} (exit {}): {}",
                argv.join(" "),
                output.rc,
                output.stderr.trim()
            )));
        }

        Ok(output.stdout.trim().to_string())
    }

    /// Locate `name` the way Ansible's `get_bin_path` does: extra dirs first,
    /// then `PATH`, then the sbin directories.
    pub fn find_executable(name: &str, extra_dirs: &[PathBuf]) -> Option<PathBuf> {
        let mut dirs: Vec<PathBuf> = extra_dirs.to_vec();
        if let Some(path) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&path));
        }
        for sbin in SBIN_DIRS {
            let sbin = PathBuf::from(sbin);
            if !dirs.contains(&sbin) {
                dirs.push(sbin);
            }
        }

        let search = std::env::join_paths(&dirs).ok()?;
        let cwd = std::env::current_dir().ok()?;
        which::which_in(name, Some(search), cwd).ok()
    }
}

fn prefixed_path(prefix: &Path) -> Result<OsString> {
    let mut dirs = vec![prefix.to_path_buf()];
    if let Some(path) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path));
    }
    std::env::join_paths(dirs)
        .map_err(|e| UvPipError::Spawn(format!("invalid PATH prefix {}: {}", prefix.display(), e)))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => code,
        None => -status.signal().unwrap_or(1),
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
