//! HTTP front end: `GET /get?country=XX&auth=TOKEN`.
//!
//! Responds with one CIDR block per line as `text/plain`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;

use crate::processor::CountryLookup;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    lookup: Arc<dyn CountryLookup>,
    auth_token: Option<String>,
}

impl AppState {
    /// Create handler state. `None` or an empty token disables authentication.
    pub fn new(lookup: Arc<dyn CountryLookup>, auth_token: Option<String>) -> Self {
        Self {
            lookup,
            auth_token: auth_token.filter(|token| !token.is_empty()),
        }
    }
}

/// Query parameters of `/get`. A repeated key keeps its first value.
#[derive(Debug, Default)]
struct GetParams {
    country: Option<String>,
    auth: Option<String>,
}

impl GetParams {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "country" => &mut params.country,
                "auth" => &mut params.auth,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/get", any(get_ip_list))
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn get_ip_list(
    method: Method,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = GetParams::from_pairs(pairs);

    if method != Method::GET {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let country = match params.country.filter(|c| !c.is_empty()) {
        Some(country) => country,
        None => return (StatusCode::BAD_REQUEST, "Missing country parameter").into_response(),
    };

    if let Some(expected) = state.auth_token.as_deref() {
        let provided = params.auth.unwrap_or_default();
        if !timing_safe_eq(provided.as_bytes(), expected.as_bytes()) {
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    }

    let lookup = Arc::clone(&state.lookup);
    let result = tokio::task::spawn_blocking(move || lookup.lookup(&country)).await;

    let cidrs = match result {
        Ok(Ok(cidrs)) => cidrs,
        Ok(Err(e)) => {
            log::warn!("Lookup failed: {}", e);
            return internal_error(&e);
        }
        Err(e) => {
            log::error!("Lookup task failed: {}", e);
            return internal_error(&e);
        }
    };

    let mut body = String::with_capacity(cidrs.len() * 20);
    for cidr in &cidrs {
        body.push_str(cidr);
        body.push('\n');
    }

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

fn internal_error(e: &dyn std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error processing request: {}", e),
    )
        .into_response()
}

fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutting down server...");
}
