use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;

use crate::api_types::{BookingCreatedResponse, BookingRequest, CREATED_MESSAGE};
use crate::errors::AppError;
use crate::models::booking;

/// POST /api/v1/bookings - Validate and persist a booking
pub async fn create(
    pool: web::Data<SqlitePool>,
    body: web::Json<BookingRequest>,
) -> Result<HttpResponse, AppError> {
    let booking = booking::create_booking(&pool, &body.booking).await?;

    Ok(HttpResponse::Created().json(BookingCreatedResponse {
        message: CREATED_MESSAGE.to_string(),
        booking,
    }))
}

/// GET /api/v1/bookings - Every booking, for admin review
pub async fn list(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let bookings = booking::list_bookings(&pool).await?;
    Ok(HttpResponse::Ok().json(bookings))
}
