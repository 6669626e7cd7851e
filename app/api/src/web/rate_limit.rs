use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use framework::web::error::HttpError;
use tracing::warn;

use crate::ApiState;

/// Sliding-window limiter, one bucket of request timestamps per client.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        RateLimiter {
            buckets: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests as usize, Duration::from_secs(60))
    }

    /// Records a request for `key`, or returns the seconds until the next one is allowed.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = buckets.entry(key.to_string()).or_default();

        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            let retry_after = timestamps
                .first()
                .and_then(|oldest| self.window.checked_sub(now.duration_since(*oldest)))
                .unwrap_or(Duration::from_secs(1));
            // rounded up so a client waiting exactly that long is admitted
            return Err((retry_after.as_secs_f64().ceil() as u64).max(1));
        }

        timestamps.push(now);
        Ok(())
    }

    pub fn prune(&self) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        buckets.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < self.window);
            !timestamps.is_empty()
        });
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }
}

// first X-Forwarded-For hop when behind the platform proxy, peer address otherwise
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    let key = client_key(&request);
    if let Err(retry_after) = state.limiter.check(&key) {
        warn!("rate limit exceeded, client={key}, retry_after={retry_after}s");
        return HttpError::TooManyRequests {
            message: format!("Rate limit exceeded: {} per 1 minute", state.limiter.max_requests()),
            retry_after,
        }
        .into_response();
    }
    next.run(request).await
}
