pub mod bookings;

use actix_web::{HttpResponse, guard, web};

/// Answer any OPTIONS request under the API namespace that the CORS layer
/// did not already handle.
async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Configure API v1 routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Guarded at resource level so other methods fall through to the routes below.
    cfg.service(
        web::resource("/{tail:.*}")
            .guard(guard::Options())
            .to(preflight),
    );
    cfg.service(
        web::resource("/bookings")
            .route(web::get().to(bookings::list))
            .route(web::post().to(bookings::create)),
    );
}
