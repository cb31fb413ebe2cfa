use crate::core::error::{Result, UvPipError};
use crate::core::{CapturedOutput, ProcessExecutor, RunOptions};
use crate::module::params::PipParams;
use crate::python::command::split_command_line;
use crate::python::uv::command_failed;
use std::path::{Path, PathBuf};
use tracing::info;

/// A virtual environment directory managed by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Virtualenv {
    path: PathBuf,
}

impl Virtualenv {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.path.join("Scripts")
        } else {
            self.path.join("bin")
        }
    }

    pub fn interpreter(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// An environment counts as present once its activate script exists.
    pub fn exists(&self) -> bool {
        self.bin_dir().join("activate").exists()
    }

    /// Build the creation command. `help_options` are the `--` flags the
    /// command advertises in its `--help`; `fallback_python` plays the role of
    /// the interpreter running the module.
    pub fn creation_command(
        &self,
        params: &PipParams,
        program: &str,
        help_options: &[String],
        fallback_python: Option<&Path>,
    ) -> Result<Vec<String>> {
        let raw = &params.virtualenv_command;
        let mut cmd = split_command_line(raw)?;
        if cmd.is_empty() {
            return Err(UvPipError::validation("virtualenv_command cannot be empty"));
        }
        cmd[0] = program.to_string();

        if params.virtualenv_site_packages {
            cmd.push("--system-site-packages".to_string());
        } else if help_options.iter().any(|o| o == "--no-site-packages") {
            cmd.push("--no-site-packages".to_string());
        }

        if is_uv_program(program) {
            // Only use interpreters already on the host; never download one.
            cmd.push("--python-preference".to_string());
            cmd.push("only-system".to_string());
        }

        if !is_venv_command(raw)? {
            match (params.virtualenv_python.as_deref(), fallback_python) {
                (Some(python), _) => cmd.push(format!("-p{}", python)),
                (None, Some(python)) => cmd.push(format!("-p{}", python.display())),
                (None, None) => {}
            }
        } else if params.virtualenv_python.is_some() {
            return Err(venv_python_conflict());
        }

        cmd.push(self.path.display().to_string());
        Ok(cmd)
    }

    /// Create the environment, returning the command that ran and its output.
    pub async fn create(
        &self,
        params: &PipParams,
        cwd: &Path,
        fallback_python: Option<&Path>,
        search_dirs: &[PathBuf],
    ) -> Result<(Vec<String>, CapturedOutput)> {
        check_virtualenv_python(params)?;
        let program = resolve_program(params, search_dirs)?;

        let help_options = if params.virtualenv_site_packages {
            Vec::new()
        } else {
            command_options(&program).await?
        };

        let cmd = self.creation_command(params, &program, &help_options, fallback_python)?;

        info!(path = %self.path.display(), "creating virtualenv");
        let output = ProcessExecutor::run(&cmd, &RunOptions::in_dir(cwd)).await?;
        if !output.success() {
            return Err(command_failed(&cmd, output, "", ""));
        }

        Ok((cmd, output))
    }
}

/// Resolve the program of `virtualenv_command`, searching `PATH` for bare names.
pub fn resolve_program(params: &PipParams, search_dirs: &[PathBuf]) -> Result<String> {
    let raw = split_command_line(&params.virtualenv_command)?;
    let Some(first) = raw.first() else {
        return Err(UvPipError::validation("virtualenv_command cannot be empty"));
    };

    if first.contains(std::path::MAIN_SEPARATOR) {
        return Ok(first.clone());
    }

    ProcessExecutor::find_executable(first, search_dirs)
        .map(|path| path.display().to_string())
        .ok_or_else(|| {
            UvPipError::PythonEnv(format!(
                "Failed to find required executable \"{}\" in paths: {}",
                first,
                std::env::var("PATH").unwrap_or_default()
            ))
        })
}

/// `--` prefixed words from `<program> --help`.
async fn command_options(program: &str) -> Result<Vec<String>> {
    let probe = vec![program.to_string(), "--help".to_string()];
    let output = ProcessExecutor::run(&probe, &RunOptions::default()).await?;
    if !output.success() {
        return Err(UvPipError::PythonEnv(format!(
            "Could not get output from {}: {}{}",
            probe.join(" "),
            output.stdout,
            output.stderr
        )));
    }
    Ok(parse_options(&output.stdout))
}

pub fn parse_options(help: &str) -> Vec<String> {
    help.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '-')))
        .filter(|word| word.starts_with("--"))
        .map(str::to_string)
        .collect()
}

/// True for `pyvenv` and `<python> -m venv`, which take no `-p` option.
pub fn is_venv_command(command: &str) -> Result<bool> {
    let argv = split_command_line(command)?;
    let Some((first, rest)) = argv.split_first() else {
        return Ok(false);
    };
    if first == "pyvenv" {
        return Ok(true);
    }

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        let module = match arg.as_str() {
            "-m" => iter.next().map(String::as_str),
            other => other.strip_prefix("-m").filter(|m| !m.is_empty() && !m.starts_with('-')),
        };
        if module == Some("venv") {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_uv_program(program: &str) -> bool {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "uv" || name == "uv.exe")
}

pub fn check_virtualenv_python(params: &PipParams) -> Result<()> {
    if params.virtualenv_python.is_some() && is_venv_command(&params.virtualenv_command)? {
        return Err(venv_python_conflict());
    }
    Ok(())
}

fn venv_python_conflict() -> UvPipError {
    UvPipError::validation(
        "virtualenv_python should not be used when using the venv module or pyvenv as virtualenv_command",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venv() -> Virtualenv {
        Virtualenv::new(PathBuf::from("/my_app/venv"))
    }

    #[test]
    fn layout_paths() {
        let env = venv();
        #[cfg(unix)]
        {
            assert_eq!(env.interpreter(), PathBuf::from("/my_app/venv/bin/python"));
            assert_eq!(env.bin_dir(), PathBuf::from("/my_app/venv/bin"));
        }
        assert!(!env.exists());
    }

    #[test]
    fn detects_venv_style_commands() {
        assert!(is_venv_command("pyvenv").unwrap());
        assert!(is_venv_command("python3 -m venv").unwrap());
        assert!(is_venv_command("/usr/bin/python3.12 -mvenv").unwrap());
        assert!(!is_venv_command("uv venv").unwrap());
        assert!(!is_venv_command("virtualenv").unwrap());
        assert!(!is_venv_command("python3 -m virtualenv").unwrap());
    }

    #[test]
    fn uv_creation_command() {
        let params = PipParams::default();
        let cmd = venv()
            .creation_command(&params, "/usr/bin/uv", &[], Some(Path::new("/usr/bin/python3")))
            .unwrap();
        assert_eq!(
            cmd,
            vec![
                "/usr/bin/uv",
                "venv",
                "--python-preference",
                "only-system",
                "-p/usr/bin/python3",
                "/my_app/venv"
            ]
        );
    }

    #[test]
    fn site_packages_and_explicit_python() {
        let params = PipParams {
            virtualenv_site_packages: true,
            virtualenv_python: Some("python3.12".into()),
            ..PipParams::default()
        };
        let cmd = venv()
            .creation_command(&params, "/usr/bin/uv", &[], None)
            .unwrap();
        assert_eq!(
            &cmd[2..],
            [
                "--system-site-packages",
                "--python-preference",
                "only-system",
                "-ppython3.12",
                "/my_app/venv"
            ]
        );
    }

    #[test]
    fn advertised_no_site_packages_is_used() {
        let params = PipParams {
            virtualenv_command: "virtualenv".into(),
            ..PipParams::default()
        };
        let options = parse_options("usage: virtualenv [--no-site-packages] [--clear] DEST");
        let cmd = venv()
            .creation_command(&params, "/usr/bin/virtualenv", &options, None)
            .unwrap();
        assert_eq!(cmd, vec!["/usr/bin/virtualenv", "--no-site-packages", "/my_app/venv"]);
    }

    #[test]
    fn help_options_drop_usage_punctuation() {
        assert_eq!(
            parse_options("usage: virtualenv [--clear] [--no-site-packages]\n  -p PY, --python PY"),
            vec!["--clear", "--no-site-packages", "--python"]
        );
    }

    #[test]
    fn venv_module_skips_python_flag() {
        let params = PipParams {
            virtualenv_command: "python3 -m venv".into(),
            ..PipParams::default()
        };
        let cmd = venv()
            .creation_command(&params, "/usr/bin/python3", &[], Some(Path::new("/usr/bin/python3")))
            .unwrap();
        assert_eq!(cmd, vec!["/usr/bin/python3", "-m", "venv", "/my_app/venv"]);
    }

    #[test]
    fn venv_module_rejects_virtualenv_python() {
        let params = PipParams {
            virtualenv_command: "python3 -m venv".into(),
            virtualenv_python: Some("python3.11".into()),
            ..PipParams::default()
        };
        assert!(check_virtualenv_python(&params).is_err());
        assert!(venv()
            .creation_command(&params, "/usr/bin/python3", &[], None)
            .is_err());
    }
}
