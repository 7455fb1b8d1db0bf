use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod contacts;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;

pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::Principal;
pub use config::AppConfig;
pub use contacts::ContactStore;
pub use error::{ContactError, StorageError};
pub use policy::AccessPolicy;
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`,
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_me, handlers::create_contact, handlers::list_contacts,
        handlers::get_contact, handlers::update_contact, handlers::delete_contact
    ),
    components(
        schemas(
            models::Contact, models::CreateContactRequest, models::UpdateContactRequest,
            models::WriteResult, models::Role, auth::Principal,
        )
    ),
    tags(
        (name = "contacts", description = "Personal contacts API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cloneable container for the services every request needs.
#[derive(Clone)]
pub struct AppState {
    /// Storage handle. Also read directly by the `Principal` extractor.
    pub repo: RepositoryState,
    /// Contact operations, built over the same `repo`.
    pub contacts: ContactStore,
    pub config: AppConfig,
}

impl AppState {
    /// Wires a `ContactStore` over `repo` using the listing/ownership settings in `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let contacts = ContactStore::from_config(repo.clone(), &config);
        Self {
            repo,
            contacts,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with the extractor's status before any handler runs if no
/// `Principal` can be resolved.
async fn auth_middleware(_principal: Principal, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, applies authentication and the observability layers,
/// and attaches the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request carries its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
