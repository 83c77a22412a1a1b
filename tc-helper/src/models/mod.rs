//! Data models for the user and message services.

mod envelope;
mod ids;
mod user;

pub use envelope::Envelope;
pub use ids::{TopicId, UserId};
pub use user::User;
