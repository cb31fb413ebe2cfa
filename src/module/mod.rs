//! The Ansible side of the module: argument intake, validation and result documents.

pub mod args;
pub mod params;
pub mod result;

pub use args::ModuleArgs;
pub use params::{PackageState, PipParams, MODULE_NAME};
pub use result::{Invocation, ModuleFailure, ModuleResult};
