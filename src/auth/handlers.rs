use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{unique_violation, AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    payload.username = payload.username.trim().to_string();
    payload.name = payload.name.trim().to_string();
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    if payload.username.len() < 3 || payload.username.len() > 25 {
        warn!(username = %payload.username, "invalid username length");
        return Err(AppError::validation("username must be 3 to 25 characters"));
    }
    if payload.password.len() < 6 {
        warn!("password too short");
        return Err(AppError::validation("password must be at least 6 characters"));
    }
    if payload.name.len() < 3 || payload.name.len() > 100 {
        return Err(AppError::validation("name must be 3 to 100 characters"));
    }
    if let Some(email) = &email {
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(AppError::validation("invalid email"));
        }
    }

    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(AppError::Duplicate { field: "username" });
    }
    if let Some(email) = &email {
        if User::find_by_email(&state.db, email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::Duplicate { field: "email" });
        }
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(
        &state.db,
        &payload.username,
        email.as_deref(),
        &payload.name,
        &hash,
    )
    .await
    {
        Ok(u) => u,
        // The pre-check raced another registration; answer the way the
        // pre-check would have.
        Err(e) => match unique_violation(&e) {
            Some(constraint) if constraint.contains("email") => {
                return Err(AppError::Duplicate { field: "email" })
            }
            Some(_) => return Err(AppError::Duplicate { field: "username" }),
            None => return Err(e.into()),
        },
    };

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.username = payload.username.trim().to_string();

    let user = match User::find_by_username(&state.db, &payload.username).await? {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login unknown username");
            return Err(AppError::Unauthenticated("invalid credentials"));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthenticated("invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = keys.sign_pair(&user)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| AppError::Unauthenticated("invalid refresh token"))?;

    // Re-derive the pair from the persisted row, not the old claims, so
    // profile changes reach the new token.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated("user no longer exists"))?;

    let (access_token, refresh_token) = keys.sign_pair(&user)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, current))]
pub async fn get_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or(AppError::Unauthenticated("user no longer exists"))?;
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::Role;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn public_user_serializes_role_uppercase() {
        let user = PublicUser::from(User {
            id: Uuid::new_v4(),
            username: "joao".into(),
            email: None,
            name: "João Souza".into(),
            password_hash: "secret-hash".into(),
            role: Role::Admin,
            created_at: OffsetDateTime::now_utc(),
        });

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"role\":\"ADMIN\""));
        assert!(json.contains("joao"));
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn register_request_email_is_optional() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"ana","password":"praia1","name":"Ana Silva"}"#)
                .unwrap();
        assert_eq!(req.username, "ana");
        assert!(req.email.is_none());
    }

    #[test]
    fn email_pattern_accepts_and_rejects() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
