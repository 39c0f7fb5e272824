pub mod queries;
pub mod types;

pub use types::{Booking, BookingParams, NewBooking};

use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::rules::{self, Field, FieldErrors, RuleSet, Validator};

/// Validate `params` and persist them as a new booking.
///
/// Every rule runs; all violations come back together as
/// [`AppError::Validation`]. Email uniqueness is checked up front so it can be
/// reported alongside the other errors, and again by the UNIQUE index on
/// insert so two racing submissions cannot both succeed.
pub async fn create_booking(
    pool: &SqlitePool,
    params: &BookingParams,
) -> Result<Booking, AppError> {
    let mut validator = Validator::new(params, &RuleSet::SERVER);
    validator.check_presence().check_email_format();
    if !validator.has_error(Field::Email)
        && queries::email_exists(pool, params.email.trim()).await?
    {
        validator.add(Field::Email, rules::TAKEN);
    }
    validator.check_options().check_dates();

    let new = match validator.finish() {
        Ok(new) => new,
        Err(errors) => {
            log::info!("Booking rejected: {errors}");
            return Err(AppError::Validation(errors));
        }
    };

    let id = match queries::create(pool, &new).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            log::info!("Booking rejected: email {} booked concurrently", new.email);
            let mut errors = FieldErrors::new();
            errors.add(Field::Email, rules::TAKEN);
            return Err(AppError::Validation(errors));
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("Booking {id} created for {}", new.email);

    queries::find_by_id(pool, id).await?.ok_or(AppError::NotFound)
}

/// Every booking, unfiltered, in the order it was persisted.
pub async fn list_bookings(pool: &SqlitePool) -> Result<Vec<Booking>, AppError> {
    Ok(queries::find_all(pool).await?)
}
