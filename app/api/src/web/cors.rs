use axum::http::Method;
use axum::http::header;
use regex::Regex;
use tower_http::cors::AllowHeaders;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Build the CORS layer from the configured origin patterns.
///
/// A lone `*` allows every origin without credentials. Other patterns may use
/// `*` to match any run of characters, e.g. `chrome-extension://*`.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::DELETE])
        .expose_headers([header::RETRY_AFTER]);

    if allowed_origins.iter().any(|pattern| pattern == "*") {
        return layer.allow_origin(AllowOrigin::any()).allow_headers(Any);
    }

    let patterns: Vec<OriginPattern> = allowed_origins
        .iter()
        .filter_map(|pattern| match OriginPattern::new(pattern) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!("ignore invalid origin pattern, pattern={pattern}, error={err}");
                None
            }
        })
        .collect();
    layer
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin
                .to_str()
                .map(|origin| patterns.iter().any(|pattern| pattern.matches(origin)))
                .unwrap_or(false)
        }))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// An allowed origin, `*` matching any run of characters and everything else literal.
#[derive(Clone, Debug)]
pub struct OriginPattern(Regex);

impl OriginPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let literals: Vec<String> = pattern.split('*').map(regex::escape).collect();
        Regex::new(&format!("^{}$", literals.join(".*"))).map(OriginPattern)
    }

    pub fn matches(&self, origin: &str) -> bool {
        self.0.is_match(origin)
    }
}
