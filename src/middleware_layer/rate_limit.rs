use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

use crate::{
    config::LoginRateLimit,
    error::{AppError, Result},
};

/// How often idle client entries are dropped from the limiter.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Throttles login attempts per client IP.
///
/// Keys on the peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`. Over-limit
/// requests get `429` with `x-ratelimit-*` headers and never reach the
/// password check. A background task prunes entries for clients whose quota
/// has fully replenished, so it must be called inside a Tokio runtime.
///
/// # Arguments
///
/// * `router` - The routes to throttle.
/// * `limit` - Replenish interval and burst size.
///
/// # Returns
///
/// The router wrapped in a governor layer.
pub fn limit_logins<S>(router: Router<S>, limit: &LoginRateLimit) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| AppError::Internal(format!("Login rate limit needs a runtime: {}", e)))?;

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(limit.replenish_seconds)
            .burst_size(limit.burst_size)
            .use_headers()
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid login rate limit".to_string()))?,
    );

    let limiter = governor_conf.limiter().clone();
    runtime.spawn(async move {
        loop {
            tokio::time::sleep(PRUNE_INTERVAL).await;
            limiter.retain_recent();
            tracing::debug!("🧹 Login rate limit table holds {} clients", limiter.len());
        }
    });

    tracing::info!(
        "✅ Login rate limit: burst {}, one attempt per {}s",
        limit.burst_size,
        limit.replenish_seconds
    );

    Ok(router.layer(GovernorLayer::new(governor_conf)))
}
