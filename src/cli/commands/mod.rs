pub mod doctor;
pub mod module;
pub mod plan;
