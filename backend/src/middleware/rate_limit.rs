//! Per-client request limiting for the optimisation API.
//!
//! Each client gets a fixed window: the first request opens it, at most
//! `max_requests` are admitted until it closes, and the next request after
//! that opens a new one. Clients are told apart by the first
//! `x-forwarded-for` hop, then `x-real-ip`, then the peer address.
//! Rejected requests fail with [`ErrorCode::RateLimited`](crate::domain::ErrorCode).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use chrono::{DateTime, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::Clock;
use tracing::warn;

use crate::domain::Error;

/// Requests admitted per window when nothing is configured.
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Window length when nothing is configured.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const UNKNOWN_CLIENT: &str = "unknown";

// Closed windows are swept once this many clients are tracked.
const SWEEP_THRESHOLD: usize = 1024;

/// How many requests one client may make per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Requests admitted per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: DateTime<Utc>,
    admitted: u32,
}

impl Window {
    fn is_closed(&self, now: DateTime<Utc>, length: Duration) -> bool {
        (now - self.opened_at)
            .to_std()
            .is_ok_and(|elapsed| elapsed >= length)
    }
}

/// Fixed-window counters keyed by client.
///
/// Shared across workers; counters live in process memory only.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use mockable::DefaultClock;
/// use route_optimizer::middleware::{ClientRateLimiter, RateLimitPolicy};
///
/// let limiter = ClientRateLimiter::new(
///     RateLimitPolicy { max_requests: 1, window: Duration::from_secs(60) },
///     Arc::new(DefaultClock),
/// );
/// assert!(limiter.try_admit("10.0.0.1"));
/// assert!(!limiter.try_admit("10.0.0.1"));
/// assert!(limiter.try_admit("10.0.0.2"));
/// ```
pub struct ClientRateLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl ClientRateLimiter {
    /// Create a limiter applying `policy`, timed by `clock`.
    pub fn new(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Active policy.
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Count a request from `client`; false when its window is exhausted.
    pub fn try_admit(&self, client: &str) -> bool {
        let now = self.clock.utc();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        let open = windows
            .get_mut(client)
            .filter(|window| !window.is_closed(now, self.policy.window));
        if let Some(window) = open {
            if window.admitted >= self.policy.max_requests {
                return false;
            }
            window.admitted += 1;
            return true;
        }

        if windows.len() >= SWEEP_THRESHOLD {
            let length = self.policy.window;
            windows.retain(|_, window| !window.is_closed(now, length));
        }
        windows.insert(
            client.to_owned(),
            Window {
                opened_at: now,
                admitted: 1,
            },
        );
        true
    }
}

fn header_value<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Key identifying the client behind `req`.
fn client_key(req: &ServiceRequest) -> String {
    header_value(req, FORWARDED_FOR)
        .and_then(|chain| chain.split(',').map(str::trim).find(|hop| !hop.is_empty()))
        .or_else(|| header_value(req, REAL_IP))
        .map(str::to_owned)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

/// Middleware rejecting clients that exceed their request budget.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::{App, web};
/// use mockable::DefaultClock;
/// use route_optimizer::middleware::{ClientRateLimiter, RateLimit, RateLimitPolicy};
///
/// let limiter = Arc::new(ClientRateLimiter::new(
///     RateLimitPolicy::default(),
///     Arc::new(DefaultClock),
/// ));
/// let app = App::new().service(web::scope("/api/v1").wrap(RateLimit::new(limiter)));
/// ```
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<ClientRateLimiter>,
}

impl RateLimit {
    /// Limit requests using the shared `limiter`.
    pub fn new(limiter: Arc<ClientRateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<ClientRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = client_key(&req);
        if self.limiter.try_admit(&client) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let max_requests = self.limiter.policy().max_requests;
        // Built inside the future so the error picks up the request trace id.
        Box::pin(async move {
            warn!(%client, path = %req.path(), max_requests, "rate limit exceeded");
            let error = Error::rate_limited("Rate limit exceeded");
            Ok(req.error_response(error).map_into_right_body())
        })
    }
}
