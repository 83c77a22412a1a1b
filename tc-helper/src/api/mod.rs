//! API modules.

mod topic;
mod user;

pub use topic::{TopicApi, TopicReadBuilder};
pub use user::{filter_query, UserApi, USER_FIELDS};
