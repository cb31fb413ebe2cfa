//! Converges a Python environment towards a [`PipParams`] declaration with one `uv pip` run.

use crate::config::ModuleDefaults;
use crate::core::error::{Result, UvPipError};
use crate::core::{CapturedOutput, ProcessExecutor, RunOptions, UmaskGuard};
use crate::module::params::{PackageState, PipParams};
use crate::module::result::ModuleResult;
use crate::python::command::{effective_extra_args, pip_command, with_dry_run, PipTarget};
use crate::python::outcome::{classify, dry_run_changed, is_benign_failure, ChangeSignal};
use crate::python::package::{resolve_packages, Package};
use crate::python::uv::{command_failed, supports_uninstall_dry_run, MIN_UNINSTALL_DRY_RUN};
use crate::python::venv::{check_virtualenv_python, resolve_program};
use crate::python::{resolve_interpreter, UvManager, Virtualenv};
use semver::Version;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

const NO_TARGET_WARNING: &str = "No valid name or requirements file found.";

/// Everything resolved from the declaration before any process is spawned.
#[derive(Debug)]
struct Prepared {
    pip: UvManager,
    interpreter: PathBuf,
    venv: Option<Virtualenv>,
    packages: Option<Vec<Package>>,
    chdir: PathBuf,
    fallback_python: Option<PathBuf>,
}

impl Prepared {
    fn target<'a>(&'a self, params: &'a PipParams) -> Option<PipTarget<'a>> {
        match (&self.packages, &params.requirements) {
            (Some(packages), _) => Some(PipTarget::Packages(packages)),
            (None, Some(requirements)) => Some(PipTarget::Requirements(requirements)),
            (None, None) => None,
        }
    }

    fn pip_command(&self, params: &PipParams) -> Result<Option<Vec<String>>> {
        self.target(params)
            .map(|target| pip_command(self.pip.pip_argv(), params, &self.interpreter, &target))
            .transpose()
    }

    /// Requirement files and VCS checkouts don't report reliably; diff listings instead.
    fn compares_listings(&self, params: &PipParams) -> bool {
        params.requirements.is_some()
            || self
                .packages
                .iter()
                .flatten()
                .any(Package::is_vcs)
    }

    fn missing_venv(&self) -> Option<&Virtualenv> {
        self.venv.as_ref().filter(|env| !env.exists())
    }
}

/// Output accumulated over the steps of one invocation.
#[derive(Debug, Default)]
struct Transcript {
    stdout: String,
    stderr: String,
}

impl Transcript {
    fn record(&mut self, output: &CapturedOutput) {
        self.stdout.push_str(&output.stdout);
        self.stderr.push_str(&output.stderr);
    }

    fn failure(&self, cmd: &[String], output: CapturedOutput) -> UvPipError {
        command_failed(cmd, output, &self.stdout, &self.stderr)
    }

    /// Put earlier output in front of a failed step's own output.
    fn prefix(&self, err: UvPipError) -> UvPipError {
        match err {
            UvPipError::CommandFailed {
                cmd,
                rc,
                stdout,
                stderr,
                ..
            } => UvPipError::CommandFailed {
                cmd,
                rc,
                stdout,
                stderr,
                prior_stdout: self.stdout.clone(),
                prior_stderr: self.stderr.clone(),
            },
            other => other,
        }
    }
}

/// The commands an invocation would run, without running them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Plan {
    pub create_virtualenv: Option<Vec<String>>,
    pub cmd: Option<Vec<String>>,
    pub check_mode: bool,
}

pub struct Reconciler {
    params: PipParams,
    check_mode: bool,
    defaults: ModuleDefaults,
}

impl Reconciler {
    pub fn new(params: PipParams, check_mode: bool, defaults: ModuleDefaults) -> Self {
        Self {
            params,
            check_mode,
            defaults,
        }
    }

    fn prepare(&self) -> Result<Prepared> {
        let params = &self.params;

        let packages = match params.name.as_deref() {
            Some(names) if !names.is_empty() => {
                Some(resolve_packages(names, params.version.as_deref())?)
            }
            _ => None,
        };

        let pip = UvManager::locate(params.pip_command(), &self.defaults.uv.search_paths)?;
        let candidates = &self.defaults.python.candidates;
        let venv = params.virtualenv_path().map(Virtualenv::new);

        let (interpreter, fallback_python) = match &venv {
            Some(env) => {
                check_virtualenv_python(params)?;
                (
                    env.interpreter(),
                    resolve_interpreter(None, candidates).ok(),
                )
            }
            None => (resolve_interpreter(params.python.as_deref(), candidates)?, None),
        };

        Ok(Prepared {
            pip,
            interpreter,
            venv,
            packages,
            chdir: params.working_dir(),
            fallback_python,
        })
    }

    fn run_options(&self, prepared: &Prepared) -> RunOptions {
        let mut opts = RunOptions::in_dir(&prepared.chdir);
        opts.path_prefix = prepared.venv.as_ref().map(Virtualenv::bin_dir);
        if self.params.break_system_packages {
            opts = opts
                .with_env("UV_BREAK_SYSTEM_PACKAGES", "1")
                .with_env("PIP_BREAK_SYSTEM_PACKAGES", "1");
        }
        opts
    }

    /// Resolve and build the commands without spawning anything. Since the
    /// virtualenv command's `--help` is not consulted, flags derived from it
    /// (`--no-site-packages`) are absent from the planned creation command.
    pub fn plan(&self) -> Result<Plan> {
        let prepared = self.prepare()?;

        let create_virtualenv = match prepared.missing_venv() {
            Some(env) => {
                let program = resolve_program(&self.params, &self.defaults.uv.search_paths)?;
                Some(env.creation_command(
                    &self.params,
                    &program,
                    &[],
                    prepared.fallback_python.as_deref(),
                )?)
            }
            None => None,
        };

        Ok(Plan {
            create_virtualenv,
            cmd: prepared.pip_command(&self.params)?,
            check_mode: self.check_mode,
        })
    }

    pub async fn run(&self) -> Result<ModuleResult> {
        let _umask = UmaskGuard::apply(self.params.umask);

        let prepared = self.prepare()?;
        let result = ModuleResult::new(&self.params);

        let Some(cmd) = prepared.pip_command(&self.params)? else {
            return Ok(result.warn(NO_TARGET_WARNING));
        };
        debug!(cmd = %cmd.join(" "), check_mode = self.check_mode, "planned");

        let opts = self.run_options(&prepared);
        let mut transcript = Transcript::default();
        let mut venv_created = false;

        if let Some(env) = prepared.missing_venv() {
            if self.check_mode {
                info!(path = %env.path().display(), "virtualenv would be created");
                return Ok(result.changed(true).cmd(cmd));
            }

            let (_, output) = env
                .create(
                    &self.params,
                    &prepared.chdir,
                    prepared.fallback_python.as_deref(),
                    &self.defaults.uv.search_paths,
                )
                .await?;
            transcript.record(&output);
            venv_created = true;
        }

        let uv_version = prepared.pip.tool_version().await;
        let mut result = result;
        result.uv_version = uv_version.as_ref().map(ToString::to_string);

        if self.check_mode {
            self.predict(result, cmd, &opts, transcript, uv_version.as_ref())
                .await
        } else {
            self.apply(result, &prepared, cmd, &opts, transcript, venv_created)
                .await
        }
    }

    /// Check mode: report what a real run would do.
    async fn predict(
        &self,
        result: ModuleResult,
        cmd: Vec<String>,
        opts: &RunOptions,
        mut transcript: Transcript,
        uv_version: Option<&Version>,
    ) -> Result<ModuleResult> {
        let params = &self.params;

        if !effective_extra_args(params)?.is_empty()
            || params.requirements.is_some()
            || params.state == PackageState::Latest
            || !params.has_names()
        {
            return Ok(result.changed(true).cmd(cmd));
        }

        if params.state == PackageState::Absent
            && uv_version.is_some_and(|v| !supports_uninstall_dry_run(v))
        {
            return Ok(result.changed(true).cmd(cmd).warn(format!(
                "uv >= {} is required to predict state=absent in check mode",
                MIN_UNINSTALL_DRY_RUN
            )));
        }

        let cmd = with_dry_run(&cmd);
        let output = ProcessExecutor::run(&cmd, opts).await?;
        if !output.success()
            && !is_benign_failure(params.state, output.rc, &output.stdout, &output.stderr)
        {
            return Err(transcript.failure(&cmd, output));
        }

        let changed = dry_run_changed(&output.stdout, &output.stderr);
        transcript.record(&output);
        info!(changed, "dry run finished");

        Ok(result
            .changed(changed)
            .cmd(cmd)
            .output(transcript.stdout, transcript.stderr))
    }

    async fn apply(
        &self,
        result: ModuleResult,
        prepared: &Prepared,
        cmd: Vec<String>,
        opts: &RunOptions,
        mut transcript: Transcript,
        venv_created: bool,
    ) -> Result<ModuleResult> {
        let params = &self.params;
        let locale = &self.defaults.process.locale;

        let before = prepared
            .pip
            .freeze(&prepared.interpreter, opts, locale)
            .await
            .map_err(|e| transcript.prefix(e))?;

        let output = ProcessExecutor::run(&cmd, opts).await?;
        if !output.success()
            && !is_benign_failure(params.state, output.rc, &output.stdout, &output.stderr)
        {
            return Err(transcript.failure(&cmd, output));
        }

        let signal = classify(&output.stdout, &output.stderr);
        transcript.record(&output);

        let changed = if prepared.compares_listings(params) || signal == ChangeSignal::Unknown {
            let after = prepared
                .pip
                .freeze(&prepared.interpreter, opts, locale)
                .await
                .map_err(|e| transcript.prefix(e))?;
            debug!(?signal, "compared package listings");
            before != after
        } else {
            signal == ChangeSignal::Changed
        };

        let changed = changed || venv_created;
        info!(changed, state = %params.state, "uv pip finished");

        Ok(result
            .changed(changed)
            .cmd(cmd)
            .output(transcript.stdout, transcript.stderr))
    }
}
