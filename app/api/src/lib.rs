use std::sync::Arc;

use axum::Router;
use groq::chat::Chat;

use crate::analyze::analyzer::Analyzer;
use crate::analyze::cache::AnalysisCache;
use crate::config::Settings;
use crate::web::cors::cors_layer;
use crate::web::rate_limit::RateLimiter;

pub mod analyze;
pub mod config;
pub mod health;
pub mod web;

#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<Settings>,
    pub analyzer: Option<Arc<Analyzer>>,
    pub cache: Arc<AnalysisCache>,
    pub limiter: Arc<RateLimiter>,
}

impl ApiState {
    pub fn new(settings: Settings) -> Self {
        let analyzer = settings.groq_configured().then(|| {
            let chat = Chat::new(
                settings.groq_api_url.clone(),
                settings.groq_api_key.clone(),
                settings.groq_model.clone(),
            );
            Arc::new(Analyzer::new(chat))
        });

        ApiState {
            cache: Arc::new(AnalysisCache::new(settings.cache_ttl)),
            limiter: Arc::new(RateLimiter::per_minute(settings.rate_limit)),
            analyzer,
            settings: Arc::new(settings),
        }
    }
}

pub fn app(state: ApiState) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins);

    let app = Router::new();
    let app = app.merge(health::routes());
    let app = app.merge(analyze::routes(&state));
    let app = app.layer(cors);
    app.with_state(state)
}
