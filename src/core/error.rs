use thiserror::Error;

#[derive(Error, Debug)]
pub enum UvPipError {
    #[error("{0}")]
    Validation(String),

    #[error("Unable to read module arguments: {0}")]
    ArgsFile(String),

    #[error("Unable to find any of {0} to use. uv needs to be installed.")]
    UvNotFound(String),

    #[error("{0}")]
    PythonEnv(String),

    #[error("{}", failure_message(.prior_stdout, .stdout, .prior_stderr, .stderr))]
    CommandFailed {
        cmd: Vec<String>,
        rc: i32,
        stdout: String,
        stderr: String,
        /// Output accumulated by earlier steps of the same invocation.
        prior_stdout: String,
        prior_stderr: String,
    },

    #[error("Failed to execute {0}")]
    Spawn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn failure_message(prior_stdout: &str, stdout: &str, prior_stderr: &str, stderr: &str) -> String {
    let stdout = format!("{}{}", prior_stdout, stdout);
    let stderr = format!("{}{}", prior_stderr, stderr);
    let mut msg = String::new();
    if !stdout.is_empty() {
        msg.push_str(&format!("stdout: {}", stdout));
    }
    if !stderr.is_empty() {
        msg.push_str(&format!("\n:stderr: {}", stderr));
    }
    msg
}

impl UvPipError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, UvPipError>;
