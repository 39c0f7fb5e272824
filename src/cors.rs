use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::http::header::ORIGIN;
use actix_web::middleware::Next;
use actix_web::web;

/// Origins allowed to make cross-origin requests. Registered as app data so
/// [`drop_unlisted_origin`] can consult it.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(origins)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, origin: &[u8]) -> bool {
        self.0.iter().any(|o| o.as_bytes() == origin)
    }
}

/// Cross-origin policy for browser clients: a fixed allow-list of origins,
/// credentials allowed, any request header.
pub fn cors(allowed_origins: &AllowedOrigins) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    for origin in allowed_origins.as_slice() {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Strip the `Origin` header from requests whose origin is not allowed, so
/// they are served like same-origin requests: no CORS headers, and preflights
/// reach the OPTIONS handler instead of being refused. Wrap outside [`cors`].
pub async fn drop_unlisted_origin(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let unlisted = match (
        req.headers().get(ORIGIN),
        req.app_data::<web::Data<AllowedOrigins>>(),
    ) {
        (Some(origin), Some(allowed)) => !allowed.contains(origin.as_bytes()),
        (Some(_), None) => true,
        (None, _) => false,
    };

    if unlisted {
        log::debug!(
            "Ignoring unlisted origin {:?} on {} {}",
            req.headers().get(ORIGIN),
            req.method(),
            req.path()
        );
        req.headers_mut().remove(ORIGIN);
    }

    next.call(req).await
}
