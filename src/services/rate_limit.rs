// src/services/rate_limit.rs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Capacidade injetada: o gateway só conhece este contrato. A chave é a
/// identidade do cliente (IP), nunca o valor do token — utilizadores
/// legítimos que não partilham IP não se afetam entre si.
pub trait RateLimiter: Send + Sync {
    /// true = pedido admitido; false = janela esgotada.
    fn check(&self, client_key: &str) -> bool;
}

struct WindowCounter {
    window_start: Instant,
    count: u32,
}

/// Janela fixa em memória, para deployments de instância única. Num
/// cluster, substitui-se por uma implementação sobre um contador
/// partilhado sem tocar no gateway.
pub struct InMemoryRateLimiter {
    max_requests: u32,
    window: Duration,
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl InMemoryRateLimiter {
    pub const DEFAULT_MAX_REQUESTS: u32 = 30;
    pub const DEFAULT_WINDOW_SECS: u64 = 60;

    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        let max_requests = std::env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_MAX_REQUESTS);
        let window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_WINDOW_SECS);
        Self::new(max_requests, Duration::from_secs(window_secs))
    }

    fn check_at(&self, client_key: &str, now: Instant) -> bool {
        let mut counters = self.counters.lock().expect("rate limiter poisoned");

        // Poda oportunista: janelas expiradas não precisam de viver para
        // sempre no mapa.
        counters.retain(|_, c| now.duration_since(c.window_start) < self.window);

        let counter = counters
            .entry(client_key.to_string())
            .or_insert(WindowCounter { window_start: now, count: 0 });

        if counter.count >= self.max_requests {
            return false;
        }
        counter.count += 1;
        true
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, client_key: &str) -> bool {
        self.check_at(client_key, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_plus_one_from_same_ip_is_rejected() {
        let limiter = InMemoryRateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("203.0.113.7", now));
        }
        assert!(!limiter.check_at("203.0.113.7", now));
    }

    #[test]
    fn different_ip_in_same_window_is_unaffected() {
        let limiter = InMemoryRateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("203.0.113.7", now));
        assert!(limiter.check_at("203.0.113.7", now));
        assert!(!limiter.check_at("203.0.113.7", now));
        assert!(limiter.check_at("198.51.100.4", now));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = InMemoryRateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("203.0.113.7", start));
        assert!(!limiter.check_at("203.0.113.7", start));
        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("203.0.113.7", later));
    }
}
