use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::repo::User;
use crate::config::JwtConfig;
use crate::state::AppState;

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Tokens are always derived from a persisted user row, so the identity
    /// claims can never drift ahead of the database.
    fn sign_with_kind(&self, user: &User, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_kind(user, TokenKind::Refresh)
    }

    /// Access + refresh pair. This is the explicit session-refresh
    /// operation: login, `/auth/refresh` and profile mutations all call it
    /// with a freshly loaded row.
    pub fn sign_pair(&self, user: &User) -> anyhow::Result<(String, String)> {
        Ok((self.sign_access(user)?, self.sign_refresh(user)?))
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use uuid::Uuid;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn make_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "ana".into(),
            email: Some("ana@example.com".into()),
            name: "Ana Silva".into(),
            password_hash: "unused".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user = make_user(Role::User);
        let token = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.name, "Ana Silva");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[tokio::test]
    async fn admin_role_survives_the_roundtrip() {
        let keys = make_keys();
        let user = make_user(Role::Admin);
        let token = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.role.is_admin());
    }

    #[tokio::test]
    async fn sign_and_verify_refresh_token_and_verify_refresh() {
        let keys = make_keys();
        let user = make_user(Role::User);
        let token = keys.sign_refresh(&user).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn verify_refresh_rejects_access_token() {
        let keys = make_keys();
        let token = keys.sign_access(&make_user(Role::User)).expect("sign access");
        let err = keys.verify_refresh(&token).unwrap_err();
        assert!(err.to_string().contains("not a refresh token"));
    }

    #[tokio::test]
    async fn sign_pair_yields_one_of_each_kind() {
        let keys = make_keys();
        let user = make_user(Role::User);
        let (access, refresh) = keys.sign_pair(&user).expect("sign pair");
        assert_eq!(keys.verify(&access).unwrap().kind, TokenKind::Access);
        assert_eq!(keys.verify(&refresh).unwrap().kind, TokenKind::Refresh);
    }
}
