use crate::core::error::{Result, UvPipError};
use crate::core::resolve_path;
use crate::module::args::ModuleArgs;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const MODULE_NAME: &str = "pip";
pub const DEFAULT_PIP_COMMAND: &str = "uv pip";
pub const DEFAULT_VENV_COMMAND: &str = "uv venv";

pub const ARGUMENT_NAMES: [&str; 15] = [
    "state",
    "name",
    "version",
    "requirements",
    "virtualenv",
    "virtualenv_site_packages",
    "virtualenv_command",
    "virtualenv_python",
    "extra_args",
    "editable",
    "chdir",
    "executable",
    "python",
    "umask",
    "break_system_packages",
];

const REQUIRED_ONE_OF: [&str; 2] = ["name", "requirements"];

const MUTUALLY_EXCLUSIVE: [[&str; 2]; 3] = [
    ["name", "requirements"],
    ["executable", "virtualenv"],
    ["python", "virtualenv"],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageState {
    #[default]
    Present,
    Absent,
    Latest,
    Forcereinstall,
}

impl PackageState {
    pub const ALL: [PackageState; 4] = [
        PackageState::Absent,
        PackageState::Forcereinstall,
        PackageState::Latest,
        PackageState::Present,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageState::Present => "present",
            PackageState::Absent => "absent",
            PackageState::Latest => "latest",
            PackageState::Forcereinstall => "forcereinstall",
        }
    }

    /// `uv pip` subcommand and flags selected by the state.
    pub fn pip_args(&self) -> &'static [&'static str] {
        match self {
            PackageState::Present => &["install"],
            PackageState::Absent => &["uninstall"],
            PackageState::Latest => &["install", "-U"],
            PackageState::Forcereinstall => &["install", "-U", "--force-reinstall"],
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageState {
    type Err = UvPipError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                let choices: Vec<&str> = Self::ALL.iter().map(PackageState::as_str).collect();
                UvPipError::validation(format!(
                    "value of state must be one of: {}, got: {}",
                    choices.join(", "),
                    s
                ))
            })
    }
}

/// The validated desired-state declaration for one module invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipParams {
    pub state: PackageState,
    pub name: Option<Vec<String>>,
    pub version: Option<String>,
    pub requirements: Option<String>,
    pub virtualenv: Option<PathBuf>,
    pub virtualenv_site_packages: bool,
    pub virtualenv_command: String,
    pub virtualenv_python: Option<String>,
    pub extra_args: Option<String>,
    pub editable: bool,
    pub chdir: Option<PathBuf>,
    pub executable: Option<String>,
    pub python: Option<PathBuf>,
    pub umask: Option<u32>,
    pub break_system_packages: bool,
}

impl Default for PipParams {
    fn default() -> Self {
        Self {
            state: PackageState::default(),
            name: None,
            version: None,
            requirements: None,
            virtualenv: None,
            virtualenv_site_packages: false,
            virtualenv_command: DEFAULT_VENV_COMMAND.to_string(),
            virtualenv_python: None,
            extra_args: None,
            editable: false,
            chdir: None,
            executable: None,
            python: None,
            umask: None,
            break_system_packages: false,
        }
    }
}

impl PipParams {
    pub fn from_args(args: &ModuleArgs) -> Result<Self> {
        args.ensure_supported(MODULE_NAME, &ARGUMENT_NAMES)?;
        check_required_one_of(args, &REQUIRED_ONE_OF)?;
        for group in &MUTUALLY_EXCLUSIVE {
            check_mutually_exclusive(args, group)?;
        }

        let state = match args.get_str("state")? {
            Some(raw) => raw.parse()?,
            None => PackageState::default(),
        };

        let params = Self {
            state,
            name: args.get_list("name")?,
            version: args.get_str("version")?,
            requirements: args.get_str("requirements")?,
            virtualenv: args.get_path("virtualenv")?,
            virtualenv_site_packages: args.get_bool("virtualenv_site_packages", false)?,
            virtualenv_command: args
                .get_str("virtualenv_command")?
                .unwrap_or_else(|| DEFAULT_VENV_COMMAND.to_string()),
            virtualenv_python: args.get_str("virtualenv_python")?,
            extra_args: args.get_str("extra_args")?,
            editable: args.get_bool("editable", false)?,
            chdir: args.get_path("chdir")?,
            executable: args.get_str("executable")?,
            python: args.get_path("python")?,
            umask: parse_umask(args.get_str("umask")?.as_deref())?,
            break_system_packages: args.get_bool("break_system_packages", false)?,
        };

        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.state == PackageState::Latest && self.version.is_some() {
            return Err(UvPipError::validation(
                "version is incompatible with state=latest",
            ));
        }
        Ok(())
    }

    /// The command used to drive uv, `uv pip` unless overridden.
    pub fn pip_command(&self) -> &str {
        self.executable.as_deref().unwrap_or(DEFAULT_PIP_COMMAND)
    }

    /// The virtualenv path, anchored to `chdir` when one was given.
    pub fn virtualenv_path(&self) -> Option<PathBuf> {
        let env = self.virtualenv.as_deref()?;
        Some(match self.chdir.as_deref() {
            Some(chdir) => resolve_path(chdir, env),
            None => env.to_path_buf(),
        })
    }

    /// Working directory for child processes; the temp dir avoids permission
    /// trouble under privilege escalation.
    pub fn working_dir(&self) -> PathBuf {
        self.chdir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn has_names(&self) -> bool {
        self.name.as_ref().is_some_and(|names| !names.is_empty())
    }
}

fn check_required_one_of(args: &ModuleArgs, terms: &[&str]) -> Result<()> {
    if terms.iter().any(|term| args.provided(term)) {
        return Ok(());
    }
    Err(UvPipError::validation(format!(
        "one of the following is required: {}",
        terms.join(", ")
    )))
}

fn check_mutually_exclusive(args: &ModuleArgs, terms: &[&str]) -> Result<()> {
    let count = terms.iter().filter(|term| args.provided(term)).count();
    if count > 1 {
        return Err(UvPipError::validation(format!(
            "parameters are mutually exclusive: {}",
            terms.join("|")
        )));
    }
    Ok(())
}

/// `umask` is a `str` argument: numbers arrive stringified and are read as octal digits.
fn parse_umask(value: Option<&str>) -> Result<Option<u32>> {
    value
        .map(|raw| {
            u32::from_str_radix(raw.trim(), 8)
                .map_err(|e| invalid_umask(&format!("{} ({})", raw, e)))
        })
        .transpose()
}

fn invalid_umask(details: &str) -> UvPipError {
    UvPipError::validation(format!("umask must be an octal integer: {}", details))
}
