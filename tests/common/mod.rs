//! Shared test infrastructure.
//!
//! - `setup_test_db()` - temporary SQLite database with the schema applied
//! - `valid_params()` - a booking that passes every rule
//! - `test_app!` - actix service wired like the real server

#![allow(dead_code, unused_macros)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use bookify::db;
use bookify::models::booking::BookingParams;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const TEST_EMAIL: &str = "ada@example.com";
pub const ALLOWED_ORIGIN: &str = "http://localhost:3007";

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// A migrated database in a temp directory. Keep it alive for the pool to
/// stay valid.
pub struct TestDb {
    _dir: TempDir,
    pool: SqlitePool,
}

impl TestDb {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// File-backed rather than in-memory so several pooled connections see the
/// same data, which the concurrency tests rely on.
pub async fn setup_test_db() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = db::init_pool(&url).await.expect("Failed to open test DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    TestDb { _dir: dir, pool }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn valid_params() -> BookingParams {
    params_with_email(TEST_EMAIL)
}

pub fn params_with_email(email: &str) -> BookingParams {
    BookingParams {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        nationality: "British".to_string(),
        university: "University College London".to_string(),
        birth_date: "1995-12-10".to_string(),
        interest: "Local Trips".to_string(),
        room_type: "Double Room".to_string(),
        arrival_date: "2025-07-05".to_string(),
        departure_date: "2025-07-10".to_string(),
        comments: Some("Arriving late".to_string()),
    }
}

/// Build the app service the same way `main` does.
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service({
            let origins =
                bookify::cors::AllowedOrigins::new(vec![common::ALLOWED_ORIGIN.to_string()]);
            actix_web::App::new()
                .wrap(bookify::cors::cors(&origins))
                .wrap(actix_web::middleware::from_fn(
                    bookify::cors::drop_unlisted_origin,
                ))
                .app_data(actix_web::web::Data::new(origins))
                .app_data(actix_web::web::Data::new($pool.clone()))
                .configure(bookify::handlers::configure)
        })
        .await
    };
}
