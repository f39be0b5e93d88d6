use actix_web::middleware::Compress;
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod bundle;
pub mod config;
pub mod error;
pub mod generators;
pub mod pdf;
pub mod pipeline;
pub mod records;
pub mod state;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::error::{PipelineError, PipelineStage};
pub use crate::pipeline::{DealPdfPipeline, PipelineOutcome};
pub use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(kind: &str, message: &str) -> Self {
        Self {
            error: message.to_string(),
            kind: kind.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new("Unauthorized", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(crate::pdf::handlers::generate_pdf, crate::pdf::handlers::health),
    components(schemas(
        pdf::models::GeneratePdfRequest,
        pdf::models::GeneratePdfResponse,
        pdf::models::HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "PDF Generation", description = "Deal document generation endpoints.")
    )
)]
pub struct ApiDoc;

/// Initialise `env_logger`, defaulting to the `info` level.
///
/// Later calls are no-ops: the first installed logger stays in place.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Service mode: serve `POST /generate-pdf` until shut down.
pub async fn run() -> std::io::Result<()> {
    init_logging();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(e)
    })?;

    let app_state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise service: {:#}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("deal_pdf_service")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let bind_addr = (config.server.host.clone(), config.server.port);
    log::info!("PDF endpoint listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .app_data(app_state.clone())
            .configure(pdf::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}

/// One-shot mode: process the deal named by `DEAL_ID` and return.
pub async fn run_once() -> anyhow::Result<PipelineOutcome> {
    init_logging();

    let config = AppConfig::from_env()?;
    let deal_id = config.require_deal_id()?.to_string();
    let pipeline = state::build_pipeline(&config)?;

    Ok(pipeline.run(&deal_id).await?)
}
