use axum::{
    http::{header::ORIGIN, HeaderMap, HeaderValue, Method},
    routing::get,
    Router,
};
use giftdraw_client::LiveFeed;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::coordinator::Coordinator;

mod ws;


pub(crate) const INVALID_PARAMETERS: &str = "INVALID_PARAMETERS";
pub(crate) const INVALID_MESSAGE: &str = "INVALID_MESSAGE";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Browser origin allowed to connect. Any origin when unset.
    pub allowed_origin: Option<String>,

    /// Frames buffered per socket writer.
    pub outbound_capacity: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            allowed_origin: None,
            outbound_capacity: 1024,
        }
    }
}

struct AppState<F: LiveFeed> {
    coordinator: Arc<Coordinator<F>>,
    config: Arc<ApiConfig>,
}

impl<F: LiveFeed> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            config: self.config.clone(),
        }
    }
}

impl<F: LiveFeed> AppState<F> {
    /// Sockets without an Origin header (non-browser clients) are always allowed.
    fn origin_allowed(&self, headers: &HeaderMap) -> bool {
        let Some(allowed) = &self.config.allowed_origin else {
            return true;
        };
        match headers.get(ORIGIN).map(|origin| origin.to_str()) {
            None => true,
            Some(Ok(origin)) => origin.trim_end_matches('/') == allowed,
            Some(Err(_)) => {
                warn!("invalid Origin header encoding");
                false
            }
        }
    }
}

pub struct Api<F: LiveFeed> {
    coordinator: Arc<Coordinator<F>>,
    config: ApiConfig,
}

impl<F: LiveFeed> Api<F> {
    pub fn new(coordinator: Arc<Coordinator<F>>, config: ApiConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    pub fn router(&self) -> Router {
        let cors = match &self.config.allowed_origin {
            Some(origin) => match HeaderValue::from_str(origin) {
                Ok(value) => CorsLayer::new().allow_origin(AllowOrigin::exact(value)),
                Err(_) => {
                    warn!(%origin, "invalid client origin; rejecting all browser origins");
                    CorsLayer::new().allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
                }
            },
            None => CorsLayer::new().allow_origin(AllowOrigin::any()),
        }
        .allow_methods([Method::GET, Method::OPTIONS]);

        let state = AppState {
            coordinator: self.coordinator.clone(),
            config: Arc::new(self.config.clone()),
        };

        Router::new()
            .route("/healthz", get(healthz))
            .route("/ws", get(ws::session::<F>))
            .route("/ws/sessions/:id", get(ws::observe::<F>))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }
}

async fn healthz() -> &'static str {
    "ok"
}
