pub mod error;
pub mod path;
pub mod process;
pub mod umask;

pub use error::{Result, UvPipError};
pub use path::{expand_path, resolve_path};
pub use process::{CapturedOutput, ProcessExecutor, RunOptions};
pub use umask::UmaskGuard;
