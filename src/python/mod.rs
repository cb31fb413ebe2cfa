pub mod command;
pub mod interpreter;
pub mod outcome;
pub mod package;
pub mod uv;
pub mod venv;

pub use command::PipTarget;
pub use interpreter::resolve_interpreter;
pub use outcome::ChangeSignal;
pub use package::Package;
pub use uv::UvManager;
pub use venv::Virtualenv;
