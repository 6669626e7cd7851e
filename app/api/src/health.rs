use axum::Json;
use axum::Router;
use axum::debug_handler;
use axum::extract::State;
use axum::routing::get;
use serde::Deserialize;
use serde::Serialize;

use crate::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceView {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthView {
    pub status: String,
    pub components: ComponentsView,
    pub debug: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ComponentsView {
    pub api: String,
    pub groq: String,
}

#[debug_handler]
async fn root() -> Json<ServiceView> {
    Json(ServiceView {
        status: "healthy".to_string(),
        service: "PR Context Generator API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// degraded means the api is up but analysis requests will be refused
#[debug_handler]
async fn health(State(state): State<ApiState>) -> Json<HealthView> {
    let groq_configured = state.settings.groq_configured();
    Json(HealthView {
        status: if groq_configured { "healthy" } else { "degraded" }.to_string(),
        components: ComponentsView {
            api: "up".to_string(),
            groq: if groq_configured { "configured" } else { "not configured" }.to_string(),
        },
        debug: state.settings.debug,
    })
}
