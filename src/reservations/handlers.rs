use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use time::Date;
use tracing::instrument;

use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, AppResult},
    state::AppState,
};

use super::dates;
use super::dto::{CreateReservationsRequest, CreatedReservations, DayEntry};
use super::service;

pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(list_reservations).post(create_reservations),
        )
        .route("/reservations/:day", delete(cancel_reservation))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/reservations/:day", delete(admin_cancel_reservation))
}

#[instrument(skip(state, user))]
pub async fn list_reservations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<BTreeMap<String, DayEntry>>> {
    let map = service::availability(&state.db, user.id).await?;
    Ok(Json(map))
}

#[instrument(skip(state, user, payload))]
pub async fn create_reservations(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateReservationsRequest>,
) -> AppResult<(StatusCode, Json<CreatedReservations>)> {
    let days = resolve_days(&payload)?;
    let created = service::reserve(&state.db, &user, &days).await?;
    Ok((StatusCode::CREATED, Json(CreatedReservations { created })))
}

#[instrument(skip(state, user))]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(day): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let day = dates::parse_day(&day)?;
    service::cancel(&state.db, day, &user).await?;
    Ok(Json(json!({ "message": "reservation cancelled" })))
}

#[instrument(skip(state, user))]
pub async fn admin_cancel_reservation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(day): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let day = dates::parse_day(&day)?;
    service::admin_cancel(&state.db, day, &user).await?;
    Ok(Json(json!({ "message": "reservation cancelled" })))
}

/// Resolve the request body into the distinct day set: either an explicit
/// `dates` list, or a `start`/`end` pair expanded inclusively.
fn resolve_days(req: &CreateReservationsRequest) -> AppResult<Vec<Date>> {
    match (&req.start, &req.end) {
        (Some(start), Some(end)) if req.dates.is_empty() => {
            let start = dates::parse_day(start)?;
            let end = dates::parse_day(end)?;
            Ok(dates::expand_range(start, end))
        }
        (None, None) if !req.dates.is_empty() => {
            let parsed = req
                .dates
                .iter()
                .map(|s| dates::parse_day(s))
                .collect::<AppResult<Vec<_>>>()?;
            Ok(dates::normalize(parsed))
        }
        _ => Err(AppError::validation(
            "provide either dates[] or start and end",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn body(json: &str) -> CreateReservationsRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolves_explicit_dates_sorted_and_distinct() {
        let days = resolve_days(&body(
            r#"{"dates":["2025-12-26","2025-12-24","2025-12-24"]}"#,
        ))
        .unwrap();
        assert_eq!(days, vec![date!(2025 - 12 - 24), date!(2025 - 12 - 26)]);
    }

    #[test]
    fn resolves_range_inclusively() {
        let days = resolve_days(&body(r#"{"start":"2025-12-24","end":"2025-12-26"}"#)).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], date!(2025 - 12 - 24));
        assert_eq!(days[2], date!(2025 - 12 - 26));
    }

    #[test]
    fn resolves_reversed_range() {
        let days = resolve_days(&body(r#"{"start":"2025-12-26","end":"2025-12-24"}"#)).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], date!(2025 - 12 - 24));
    }

    #[test]
    fn rejects_empty_body() {
        assert!(resolve_days(&body(r#"{}"#)).is_err());
        assert!(resolve_days(&body(r#"{"dates":[]}"#)).is_err());
    }

    #[test]
    fn rejects_mixed_forms() {
        assert!(resolve_days(&body(
            r#"{"dates":["2025-12-24"],"start":"2025-12-25","end":"2025-12-26"}"#
        ))
        .is_err());
        assert!(resolve_days(&body(r#"{"start":"2025-12-25"}"#)).is_err());
    }

    #[test]
    fn rejects_malformed_dates_in_list() {
        assert!(resolve_days(&body(r#"{"dates":["2025-12-24","christmas"]}"#)).is_err());
    }
}
