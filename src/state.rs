use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use dashmap::DashMap;

use crate::config::AppConfig;

/// Shared application state. Built once at startup; the configuration is
/// never mutated afterward, so handlers share it by `Arc` without locks.
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration
    pub config: Arc<AppConfig>,

    /// Rate limit tracking: client IP -> (count, window start)
    rate_limiter: Arc<DashMap<IpAddr, (u32, Instant)>>,

    /// Process start marker for uptime reporting
    pub started_at: SystemTime,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            started_at: SystemTime::now(),
        }
    }

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at
            .elapsed()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Fixed-window rate limit check for one client. Returns false once
    /// the configured ceiling is reached inside the current window.
    pub fn check_rate_limit(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let window = Duration::from_millis(self.config.rate_limit_window_ms);
        let limit = self.config.rate_limit_max;

        let mut entry = self.rate_limiter.entry(client).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
