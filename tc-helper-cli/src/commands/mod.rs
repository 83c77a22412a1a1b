//! Subcommand implementations.

pub mod markdown;
pub mod topic;
pub mod user;
