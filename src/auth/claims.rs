use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of JWT: access or refresh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Account role, stored in the `user_role` Postgres enum and carried
/// verbatim in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// JWT payload used for authentication. Identity fields (`username`,
/// `name`, `role`) mirror the user row at signing time; a profile change
/// reaches new tokens through an explicit re-sign, never by mutating an
/// issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // user ID
    pub username: String,
    pub name: String,     // display name
    pub role: Role,
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub aud: String,      // audience
    pub kind: TokenKind,  // token type
}
