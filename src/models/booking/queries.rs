use sqlx::SqlitePool;

use super::types::{Booking, NewBooking};

const SELECT_BOOKING: &str = "\
    SELECT id, first_name, last_name, email, nationality, university, \
           birth_date, interest, room_type, arrival_date, departure_date, \
           comments, created_at, updated_at \
    FROM bookings";

/// Insert a booking and return its id. Fails with a unique violation if the
/// email is already booked.
pub async fn create(pool: &SqlitePool, new: &NewBooking) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO bookings \
             (first_name, last_name, email, nationality, university, birth_date, \
              interest, room_type, arrival_date, departure_date, comments) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
         RETURNING id",
    )
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.email)
    .bind(&new.nationality)
    .bind(&new.university)
    .bind(new.birth_date)
    .bind(&new.interest)
    .bind(&new.room_type)
    .bind(new.arrival_date)
    .bind(new.departure_date)
    .bind(&new.comments)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// All bookings in insertion order.
pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Booking>, sqlx::Error> {
    let sql = format!("{SELECT_BOOKING} ORDER BY id");
    sqlx::query_as::<_, Booking>(&sql).fetch_all(pool).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Booking>, sqlx::Error> {
    let sql = format!("{SELECT_BOOKING} WHERE id = ?1");
    sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE email = ?1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool)
        .await
}
