use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::claims::{Claims, Role, TokenKind};
use crate::auth::jwt::JwtKeys;
use crate::error::AppError;

/// The caller's identity, extracted from a validated access token. Built
/// from claims alone; handlers that need fresher state re-read the row.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            name: claims.name,
            role: claims.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthenticated("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(AppError::Unauthenticated("invalid Authorization header"))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(AppError::Unauthenticated("invalid or expired token"));
            }
        };

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthenticated("access token required"));
        }

        Ok(CurrentUser::from(claims))
    }
}
