//! Fixed-window request throttle for the candidate-facing surface, keyed by
//! request path so each token-scoped URL gets its own budget.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

struct WindowState {
    start: Instant,
    count: u32,
}

#[derive(Clone)]
pub struct PathRateLimiter {
    max_hits: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl PathRateLimiter {
    pub fn new(max_hits: u32, window: Duration) -> Self {
        Self {
            max_hits: max_hits.max(1),
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow(&self, key: &str) -> bool {
        let mut guard = self.windows.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();

        // Keep the map from accumulating one entry per expired token URL.
        if guard.len() > 10_000 {
            let window = self.window;
            guard.retain(|_, state| now.duration_since(state.start) < window);
        }

        let state = guard.entry(key.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(state.start) >= self.window {
            state.start = now;
            state.count = 0;
        }
        if state.count < self.max_hits {
            state.count += 1;
            true
        } else {
            false
        }
    }
}

pub async fn path_throttle_middleware(
    State(limiter): State<PathRateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.allow(req.uri().path()) {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}
