pub mod api_v1;

use actix_web::{HttpResponse, error, web};

use crate::api_types::{ApiErrorResponse, StatusResponse};

/// Register every route plus the JSON extractor settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(status))
        .service(web::scope("/api/v1").configure(api_v1::configure));
}

/// GET / - Liveness probe
async fn status() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        message: "API is live!".to_string(),
    })
}

/// Malformed bodies (bad JSON, wrong content type, missing `booking` envelope)
/// get a JSON 400 instead of actix's plain-text default.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::info!("Rejected request body: {err}");
        let response = HttpResponse::BadRequest().json(ApiErrorResponse {
            error: err.to_string(),
        });
        error::InternalError::from_response(err, response).into()
    })
}
