//! Identity and profile models.

use serde::{Deserialize, Serialize};

/// Identity resolved from an access token by the auth gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Auth user ID (also the `profiles` / `teachers` row ID)
    pub id: String,
    /// Email address, when the gateway returns one
    #[serde(default)]
    pub email: Option<String>,
}

/// Signed-in session held by client code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as a Unix timestamp
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// Public profile row (`profiles` table), 1:1 with an auth identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Whether moderators may ban this account
    #[serde(default)]
    pub is_bannable: bool,
    pub created_at: String,
}

/// Teacher row (`teachers` table). `id` equals the auth user ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Free-form biography; older rows call the column `about`
    #[serde(default, alias = "about")]
    pub bio: Option<String>,
    pub created_at: String,
}
