//! User profile as returned by the login endpoint.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Profile of the logged-in user.
///
/// Stored alongside the token so role checks work without a round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Display name, if the user set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Role used for client-side page gating.
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    /// Name to show in the UI.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }
}
