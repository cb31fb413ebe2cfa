use crate::core::error::UvPipError;
use crate::module::params::{PackageState, PipParams};
use crate::python::outcome::split_lines;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Invocation {
    pub module_args: Map<String, Value>,
}

/// The document returned to the controller on success.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModuleResult {
    pub changed: bool,
    pub cmd: Vec<String>,
    pub name: Option<Vec<String>>,
    pub version: Option<String>,
    pub state: PackageState,
    pub requirements: Option<String>,
    pub virtualenv: Option<String>,
    pub stdout: String,
    pub stdout_lines: Vec<String>,
    pub stderr: String,
    pub stderr_lines: Vec<String>,
    pub uv_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<Invocation>,
}

impl ModuleResult {
    pub fn new(params: &PipParams) -> Self {
        Self {
            changed: false,
            cmd: Vec::new(),
            name: params.name.clone(),
            version: params.version.clone(),
            state: params.state,
            requirements: params.requirements.clone(),
            virtualenv: params
                .virtualenv_path()
                .map(|path| path.display().to_string()),
            stdout: String::new(),
            stdout_lines: Vec::new(),
            stderr: String::new(),
            stderr_lines: Vec::new(),
            uv_version: None,
            warnings: Vec::new(),
            invocation: None,
        }
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }

    pub fn cmd(mut self, cmd: Vec<String>) -> Self {
        self.cmd = cmd;
        self
    }

    pub fn output(mut self, stdout: String, stderr: String) -> Self {
        self.stdout_lines = split_lines(&stdout);
        self.stderr_lines = split_lines(&stderr);
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// The document returned to the controller on failure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModuleFailure {
    pub failed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_lines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_lines: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<Invocation>,
}

impl ModuleFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
            cmd: None,
            rc: None,
            stdout: None,
            stdout_lines: None,
            stderr: None,
            stderr_lines: None,
            invocation: None,
        }
    }
}

impl From<&UvPipError> for ModuleFailure {
    fn from(err: &UvPipError) -> Self {
        let mut failure = ModuleFailure::new(err.to_string());

        if let UvPipError::CommandFailed {
            cmd,
            rc,
            stdout,
            stderr,
            ..
        } = err
        {
            failure.cmd = Some(cmd.clone());
            failure.rc = Some(*rc);
            failure.stdout_lines = Some(split_lines(stdout));
            failure.stderr_lines = Some(split_lines(stderr));
            failure.stdout = Some(stdout.clone());
            failure.stderr = Some(stderr.clone());
        }

        failure
    }
}
