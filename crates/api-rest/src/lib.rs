//! # API REST
//!
//! REST API implementation for the SISREG consultation proxy.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status codes, CORS)
//!
//! Uses `api-shared` for response bodies and `sisreg-core` for the consultation itself.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AwaitingValidationRes, ConsultaRes, ErrorRes, HealthRes, HealthService, RecordEnvelope,
};
use sisreg_core::{ConsultaService, Phase, RecordSource};

/// Application state for the REST API server
///
/// Holds the consultation service shared by every request. The service only carries
/// read-only configuration, so no locking is involved.
pub struct AppState<S> {
    service: Arc<ConsultaService<S>>,
}

impl<S> AppState<S> {
    pub fn new(service: ConsultaService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, consulta),
    components(schemas(HealthRes, AwaitingValidationRes, RecordEnvelope, ErrorRes))
)]
pub struct ApiDoc;

/// Query string of the consultation endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConsultaQuery {
    /// Mother's name. Absent or blank runs the search phase.
    pub nome_mae: Option<String>,
}

/// Build the CORS layer from the configured origin allowlist.
///
/// An empty allowlist yields a permissive layer, intended for development only.
///
/// # Errors
/// Returns an error if an origin is not a valid header value.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        tracing::warn!("SISREG_CORS_ORIGINS not set, allowing any origin");
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers(Any))
}

/// Assemble the application router.
pub fn router<S>(state: AppState<S>, cors: CorsLayer) -> Router
where
    S: RecordSource + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/consulta/:identifier", get(consulta::<S>))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve the router until the process stops.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve<S>(addr: &str, state: AppState<S>, cors: CorsLayer) -> anyhow::Result<()>
where
    S: RecordSource + 'static,
{
    let app = router(state, cors);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- SISREG consulta REST API listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports that the proxy is running. The upstream registry is not contacted.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/consulta/{identifier}",
    params(
        ("identifier" = String, Path, description = "CPF, formatted or digits only"),
        ConsultaQuery
    ),
    responses(
        (status = 200, description = "Verified records; an empty list when nothing is found; or the aguardando_validacao status object when no mother's name was supplied", body = [RecordEnvelope]),
        (status = 403, description = "Mother's name missing on file or incorrect", body = ErrorRes)
    )
)]
/// Consult a citizen's referrals and appointments
///
/// Without `nome_mae` the records are only looked up and the answer says whether
/// validation is needed. With `nome_mae` the records are fetched again and disclosed if
/// the mother's first name matches the one on file.
///
/// # Errors
/// Returns `403 Forbidden` with a detail message if:
/// - the registry has no mother's name for the citizen, or
/// - the supplied name does not match.
async fn consulta<S>(
    State(state): State<AppState<S>>,
    AxumPath(identifier): AxumPath<String>,
    Query(query): Query<ConsultaQuery>,
) -> Response
where
    S: RecordSource + 'static,
{
    let phase = Phase::from_param(query.nome_mae.as_deref());

    match state.service.consult(&identifier, phase).await {
        Ok(disclosure) => Json(ConsultaRes::from(disclosure)).into_response(),
        Err(e) if e.is_gate_rejection() => {
            (StatusCode::FORBIDDEN, Json(ErrorRes::from(&e))).into_response()
        }
        // Fetch failures are already folded into empty results; anything else still
        // answers with an empty list so the search phase never fails visibly.
        Err(e) => {
            tracing::warn!(error = %e, "unexpected consultation failure, answering empty list");
            Json(ConsultaRes::Records(Vec::new())).into_response()
        }
    }
}
