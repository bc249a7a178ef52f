//! CLI command implementations

pub mod inspect;
pub mod json_output;
pub mod restore;

mod reporting;
