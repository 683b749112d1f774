use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;

/// Dual-shape PATCH body: a display-name update or a password change,
/// never both at once.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// Every successful profile mutation returns a freshly signed token pair
/// derived from the updated row, so the session catches up immediately.
#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub message: &'static str,
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}
