//! Container metrics для IoC контейнера

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ContainerMetrics {
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    beans_created: AtomicU64,
    proxies_created: AtomicU64,
    failed_resolutions: AtomicU64,
}

/// Снимок состояния контейнера
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContainerStats {
    pub registered_beans: u64,
    pub cached_beans: u64,
    pub total_resolutions: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub beans_created: u64,
    pub proxies_created: u64,
    pub failed_resolutions: u64,
}

impl ContainerStats {
    pub fn cache_hit_rate(&self) -> f64 {
        if self.total_resolutions == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.total_resolutions as f64
    }
}

impl ContainerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_creation(&self, proxied: bool) {
        self.beans_created.fetch_add(1, Ordering::Relaxed);
        if proxied {
            self.proxies_created.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_error(&self) {
        self.failed_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, registered_beans: u64, cached_beans: u64) -> ContainerStats {
        ContainerStats {
            registered_beans,
            cached_beans,
            total_resolutions: self.resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            beans_created: self.beans_created.load(Ordering::Relaxed),
            proxies_created: self.proxies_created.load(Ordering::Relaxed),
            failed_resolutions: self.failed_resolutions.load(Ordering::Relaxed),
        }
    }
}
