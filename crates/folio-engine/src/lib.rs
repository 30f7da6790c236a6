//! The portfolio projects and the table, statistics and chart helpers they
//! share.

pub mod charts;
pub mod data;
pub mod projects;
pub mod stats;

pub use projects::{default_registry, Project};
