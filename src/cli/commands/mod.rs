//! CLI command implementations

pub mod apply;
pub mod completions;
pub mod config;
pub mod schema;
pub mod serve;
pub mod validate;
