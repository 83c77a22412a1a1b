//! Member records.

use serde::{Deserialize, Serialize};

use super::UserId;

/// A member record as returned by the user directory with the
/// `userId,email,handle,firstName,lastName` field selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Member ID.
    pub user_id: UserId,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Handle.
    #[serde(default)]
    pub handle: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// Full name, or the handle when no name parts are set.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.handle.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }
}
