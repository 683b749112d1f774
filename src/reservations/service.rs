use std::collections::BTreeMap;

use sqlx::PgPool;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::error::{unique_violation, AppError, AppResult};

use super::dates::format_day;
use super::dto::DayEntry;
use super::policy::{self, Decision};
use super::repo::{self, Reservation};

/// Atomically verify that none of the requested days is already reserved
/// and create one reservation row per day; on any conflict the whole batch
/// is rejected with the occupied days and nothing is inserted.
///
/// The transactional pre-check exists for friendly multi-day conflict
/// reporting. Correctness against concurrent bookings rests on the UNIQUE
/// constraint on `reservations.day`; a race loser is translated into the
/// same Conflict response the pre-check produces.
pub async fn reserve(db: &PgPool, user: &CurrentUser, days: &[Date]) -> AppResult<u64> {
    if days.is_empty() {
        return Err(AppError::validation("no dates requested"));
    }

    let mut tx = db.begin().await?;

    let occupied = repo::occupied_among(&mut tx, days).await?;
    if !occupied.is_empty() {
        // Dropping the transaction rolls it back; nothing was inserted.
        warn!(user_id = %user.id, occupied = occupied.len(), "reservation conflict");
        return Err(AppError::DatesTaken(
            occupied.into_iter().map(format_day).collect(),
        ));
    }

    for day in days {
        if let Err(e) = repo::insert(&mut tx, *day, user.id, &user.name).await {
            if unique_violation(&e).is_some() {
                // Another booking won between our check and this insert.
                // The transaction is poisoned; re-read outside it and
                // answer exactly like the pre-check.
                drop(tx);
                let mut conn = db.acquire().await?;
                let occupied = repo::occupied_among(&mut conn, days).await?;
                warn!(user_id = %user.id, "reservation lost insert race");
                return Err(AppError::DatesTaken(
                    occupied.into_iter().map(format_day).collect(),
                ));
            }
            return Err(e.into());
        }
    }

    tx.commit().await?;
    info!(user_id = %user.id, created = days.len(), "reservations created");
    Ok(days.len() as u64)
}

/// Cancel the reservation for one day on behalf of its owner; admins may
/// cancel anyone's.
pub async fn cancel(db: &PgPool, day: Date, requester: &CurrentUser) -> AppResult<()> {
    let existing = repo::find_for_day(db, day).await?;
    let Some(reservation) = existing.first() else {
        return Err(AppError::NotFound("no reservation for that date"));
    };

    match policy::cancel_own(requester, reservation.user_id) {
        Decision::Allow => {}
        Decision::ForbiddenOwnership => {
            warn!(user_id = %requester.id, day = %format_day(day), "cancel denied: not the owner");
            return Err(AppError::Forbidden(
                "you can only cancel your own reservations",
            ));
        }
        Decision::ForbiddenRole => {
            return Err(AppError::Forbidden("admin role required"));
        }
    }

    let deleted = repo::delete_for_day(db, day).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("no reservation for that date"));
    }
    info!(user_id = %requester.id, day = %format_day(day), "reservation cancelled");
    Ok(())
}

/// Admin cancellation: any owner, whole day.
pub async fn admin_cancel(db: &PgPool, day: Date, requester: &CurrentUser) -> AppResult<()> {
    if policy::admin_only(requester) != Decision::Allow {
        warn!(user_id = %requester.id, "admin cancel denied: not an admin");
        return Err(AppError::Forbidden("admin role required"));
    }

    let deleted = repo::delete_for_day(db, day).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("no reservation for that date"));
    }
    info!(admin_id = %requester.id, day = %format_day(day), deleted, "reservation cancelled by admin");
    Ok(())
}

/// Read-only availability projection: every booked day keyed by its
/// canonical date string, with the ownership flag computed for the caller.
/// Recomputed on every read; it has no state of its own.
pub async fn availability(db: &PgPool, caller_id: Uuid) -> AppResult<BTreeMap<String, DayEntry>> {
    let rows = repo::list_all(db).await?;
    Ok(project(rows, caller_id))
}

fn project(rows: Vec<Reservation>, caller_id: Uuid) -> BTreeMap<String, DayEntry> {
    rows.into_iter()
        .map(|r| {
            (
                format_day(r.day),
                DayEntry {
                    owner_name: r.user_name,
                    owner_id: r.user_id,
                    is_owner: r.user_id == caller_id,
                },
            )
        })
        .collect()
}
