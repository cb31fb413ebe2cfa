pub mod cli;
pub mod config;
pub mod core;
pub mod module;
pub mod python;
pub mod reconciler;
