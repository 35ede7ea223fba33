//! CLI command implementations

pub mod doctor;
pub mod json_output;
pub mod pack;
