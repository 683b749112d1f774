use sqlx::{FromRow, PgConnection, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub day: Date,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: OffsetDateTime,
}

/// Days among `days` that already have a reservation. Runs on the caller's
/// connection so it can sit inside the reserve transaction.
pub async fn occupied_among(conn: &mut PgConnection, days: &[Date]) -> sqlx::Result<Vec<Date>> {
    sqlx::query_scalar::<_, Date>(
        r#"
        SELECT day
        FROM reservations
        WHERE day = ANY($1)
        ORDER BY day ASC
        "#,
    )
    .bind(days.to_vec())
    .fetch_all(conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    day: Date,
    user_id: Uuid,
    user_name: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reservations (day, user_id, user_name)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(day)
    .bind(user_id)
    .bind(user_name)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<Reservation>> {
    sqlx::query_as::<_, Reservation>(
        r#"
        SELECT id, day, user_id, user_name, created_at
        FROM reservations
        ORDER BY day ASC
        "#,
    )
    .fetch_all(db)
    .await
}

/// Reservations for one calendar day, matched with a half-open
/// `[day, day + 1)` range instead of equality to tolerate offset skew in
/// stored values.
pub async fn find_for_day(db: &PgPool, day: Date) -> sqlx::Result<Vec<Reservation>> {
    let next = day.next_day().unwrap_or(Date::MAX);
    sqlx::query_as::<_, Reservation>(
        r#"
        SELECT id, day, user_id, user_name, created_at
        FROM reservations
        WHERE day >= $1 AND day < $2
        "#,
    )
    .bind(day)
    .bind(next)
    .fetch_all(db)
    .await
}

/// Delete every reservation in `[day, day + 1)`, returning the number of
/// rows removed. Bulk-safe for the admin path.
pub async fn delete_for_day(db: &PgPool, day: Date) -> sqlx::Result<u64> {
    let next = day.next_day().unwrap_or(Date::MAX);
    let result = sqlx::query(
        r#"
        DELETE FROM reservations
        WHERE day >= $1 AND day < $2
        "#,
    )
    .bind(day)
    .bind(next)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}
