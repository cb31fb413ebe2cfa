pub mod global;
pub mod schema;

pub use global::{DefaultsManager, CONFIG_PATH_ENV};
pub use schema::{ModuleDefaults, ProcessConfig, PythonConfig, UvConfig, DEFAULT_LOCALE};
