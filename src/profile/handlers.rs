use axum::{
    extract::{FromRef, State},
    routing::patch,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{AppError, AppResult},
    state::AppState,
};

use super::dto::{ProfileUpdated, UpdateProfileRequest};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", patch(update_profile))
}

#[instrument(skip(state, current, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileUpdated>> {
    match payload {
        UpdateProfileRequest {
            name: Some(name),
            old_password: None,
            new_password: None,
        } => update_name(&state, &current, name).await,
        UpdateProfileRequest {
            name: None,
            old_password: Some(old),
            new_password: Some(new),
        } => update_password(&state, &current, old, new).await,
        _ => Err(AppError::validation(
            "provide either name or oldPassword and newPassword",
        )),
    }
}

async fn update_name(
    state: &AppState,
    current: &CurrentUser,
    name: String,
) -> AppResult<Json<ProfileUpdated>> {
    let name = name.trim().to_string();
    if name.len() < 3 || name.len() > 100 {
        return Err(AppError::validation("name must be 3 to 100 characters"));
    }

    let user = User::update_name(&state.db, current.id, &name).await?;

    // Explicit session refresh: the new pair is derived from the row just
    // written, so the claims carry the new name.
    let keys = JwtKeys::from_ref(state);
    let (access_token, refresh_token) = keys.sign_pair(&user)?;

    info!(user_id = %user.id, "profile name updated");
    Ok(Json(ProfileUpdated {
        message: "name updated",
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

async fn update_password(
    state: &AppState,
    current: &CurrentUser,
    old: String,
    new: String,
) -> AppResult<Json<ProfileUpdated>> {
    if old.is_empty() {
        return Err(AppError::validation("old password is required"));
    }
    if new.len() < 6 {
        return Err(AppError::validation(
            "new password must be at least 6 characters",
        ));
    }

    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or(AppError::Unauthenticated("user no longer exists"))?;

    if !verify_password(&old, &user.password_hash)? {
        warn!(user_id = %user.id, "password change with wrong old password");
        return Err(AppError::Unauthenticated("old password is incorrect"));
    }

    let hash = hash_password(&new)?;
    User::update_password(&state.db, user.id, &hash).await?;

    let keys = JwtKeys::from_ref(state);
    let (access_token, refresh_token) = keys.sign_pair(&user)?;

    info!(user_id = %user.id, "password updated");
    Ok(Json(ProfileUpdated {
        message: "password updated",
        access_token,
        refresh_token,
        user: user.into(),
    }))
}
