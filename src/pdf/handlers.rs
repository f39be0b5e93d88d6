use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};

use super::models::{GeneratePdfRequest, GeneratePdfResponse, HealthResponse};
use crate::auth::validate_request_api_key;
use crate::{AppState, ErrorResponse};

/// Maximum accepted JSON body size.
pub const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "PDF Generation",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { ok: true })
}

/// Generate the PDF for a deal, upload it and record its URL on the deal.
#[utoipa::path(
    post,
    path = "/generate-pdf",
    tag = "PDF Generation",
    request_body = GeneratePdfRequest,
    params(
        ("x-api-key" = String, Header, description = "Shared secret")
    ),
    responses(
        (status = 200, description = "PDF generated and recorded", body = GeneratePdfResponse),
        (status = 400, description = "Missing dealId", body = ErrorResponse),
        (status = 401, description = "Missing or invalid api key", body = ErrorResponse),
        (status = 500, description = "Pipeline failure", body = ErrorResponse)
    )
)]
pub async fn generate_pdf(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<GeneratePdfRequest>>,
) -> impl Responder {
    if let Err(e) = validate_request_api_key(&req, &state.api_key) {
        warn!("Rejected /generate-pdf request: {}", e);
        return HttpResponse::Unauthorized().json(ErrorResponse::unauthorized("Unauthorized"));
    }

    let deal_id = match body.as_ref().and_then(|b| b.deal_id()) {
        Some(id) => id.to_string(),
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Missing dealId"));
        }
    };

    info!("Generating PDF for deal {}", deal_id);
    match state.pipeline.run(&deal_id).await {
        Ok(outcome) => HttpResponse::Ok().json(GeneratePdfResponse::from(outcome)),
        Err(e) => {
            error!("PDF generation for deal {} failed: {}", deal_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

/// Register the PDF routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/generate-pdf").route(web::post().to(generate_pdf)));
}
