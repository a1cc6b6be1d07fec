use actix_web::HttpResponse;

/// GET /health_check
///
/// Liveness probe; no body, no authentication.
pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().finish()
}
