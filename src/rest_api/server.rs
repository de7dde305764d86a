//! # REST API HTTP Server
//!
//! Axum router exposing the five operations of every configured entity:
//!
//! - `GET <path>`: collection read (`query`, `offset`, `limit`, `lang`)
//! - `POST <path>`: create
//! - `GET <path>/:id`: read one
//! - `PUT <path>/:id`: update
//! - `DELETE <path>/:id`: delete
//!
//! The tenant token comes from a configurable request header.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::params::{lang, parse_body, CollectionParams};
use crate::collection::{CollectionService, EntityService};

/// Header carrying the tenant token unless configured otherwise
pub const DEFAULT_TENANT_HEADER: &str = "X-Okapi-Tenant";

/// Request-level settings shared by every route
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub tenant_header: String,
    pub default_locale: String,
    pub cors_origins: Vec<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            tenant_header: DEFAULT_TENANT_HEADER.to_string(),
            default_locale: crate::messages::DEFAULT_LOCALE.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

/// Per-entity route state
struct EntityState {
    service: EntityService,
    tenant_header: String,
    default_locale: String,
}

impl EntityState {
    /// Raw tenant header bytes; header values need not be UTF-8
    fn tenant<'a>(&self, headers: &'a HeaderMap) -> Option<&'a [u8]> {
        headers
            .get(self.tenant_header.as_str())
            .map(|v| v.as_bytes())
    }

    fn locale(&self, lang: Option<String>) -> String {
        lang.unwrap_or_else(|| self.default_locale.clone())
    }
}

type SharedState = Arc<EntityState>;

/// HTTP server for the configured entities
pub struct RestServer {
    addr: SocketAddr,
    router: Router,
}

impl RestServer {
    pub fn new(addr: SocketAddr, service: CollectionService, options: &RouterOptions) -> Self {
        Self {
            addr,
            router: build_router(service, options),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Build the combined router: one sub-router per entity plus `/health`
pub fn build_router(service: CollectionService, options: &RouterOptions) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));

    for entity in service.entities() {
        let base = entity.entity().base_path().to_string();
        let state = Arc::new(EntityState {
            service: entity.clone(),
            tenant_header: options.tenant_header.clone(),
            default_locale: options.default_locale.clone(),
        });

        let routes = Router::new()
            .route(&base, get(list_handler).post(create_handler))
            .route(
                &format!("{}/:id", base.trim_end_matches('/')),
                get(get_handler).put(update_handler).delete(delete_handler),
            )
            .with_state(state);

        router = router.merge(routes);
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&options.cors_origins)),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Collection read handler
async fn list_handler(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let params = match CollectionParams::parse(&query) {
        Ok(params) => params,
        Err(e) => return e.into_response(),
    };
    let locale = state.locale(params.lang);

    state
        .service
        .read_collection(state.tenant(&headers), &locale, &params.descriptor)
        .await
        .into_response()
}

/// Create handler
async fn create_handler(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let record = match parse_body(&body) {
        Ok(record) => record,
        Err(e) => return e.into_response(),
    };
    let locale = state.locale(lang(&query));

    state
        .service
        .create(state.tenant(&headers), &locale, record)
        .await
        .into_response()
}

/// Read-one handler
async fn get_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let locale = state.locale(lang(&query));

    state
        .service
        .read_one(state.tenant(&headers), &locale, &id)
        .await
        .into_response()
}

/// Update handler
async fn update_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let record = match parse_body(&body) {
        Ok(record) => record,
        Err(e) => return e.into_response(),
    };
    let locale = state.locale(lang(&query));

    state
        .service
        .update(state.tenant(&headers), &locale, &id, record)
        .await
        .into_response()
}

/// Delete handler
async fn delete_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let locale = state.locale(lang(&query));

    state
        .service
        .delete(state.tenant(&headers), &locale, &id)
        .await
        .into_response()
}
