//! MINTnet HTTP/JSON Gateway.
//!
//! Serves profile, organization, event and project pages with each field
//! filtered for the viewer, and the admin operations behind them: edits,
//! visibility settings, invites and memberships.
//!
//! The signed-in profile is taken from the `x-mintnet-profile` header, which
//! the authenticating proxy in front of the gateway sets.

pub mod config;
pub mod error;
pub mod extract;
pub mod json;
pub mod locale;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::AppError;
pub use locale::Language;

use axum::{middleware, Router};
use mintnet_core::Platform;
use mintnet_proto::EntityKind;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Entities, memberships and visibility.
    pub platform: Platform,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(platform: Platform, config: GatewayConfig) -> Self {
        Self { platform, config }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(routes::health::routes())
        .merge(routes::invites::routes());
    for kind in EntityKind::ALL {
        router = router.nest(&format!("/{}", kind.plural()), routes::entities::routes(kind));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    error::localize_errors,
                )),
        )
        .with_state(state)
}
