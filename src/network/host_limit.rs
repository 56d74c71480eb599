use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use crate::error::{FetchError, Result};

/// Caps simultaneous connections per remote host.
pub struct HostLimiter {
    cap: usize,
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl HostLimiter {
    pub fn new(cap: usize) -> Self {
        Self { cap: cap.max(1), hosts: Mutex::new(HashMap::new()) }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    async fn semaphore(&self, host: &str) -> Arc<Semaphore> {
        let mut hosts = self.hosts.lock().await;
        // A held permit or a pending acquire keeps its own clone of the Arc.
        hosts.retain(|_, s| Arc::strong_count(s) > 1);
        hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.cap)))
            .clone()
    }

    /// Waits for a free connection slot on `host`; the slot is released when
    /// the permit drops.
    pub async fn acquire(&self, host: &str) -> Result<OwnedSemaphorePermit> {
        let semaphore = self.semaphore(host).await;
        semaphore.acquire_owned().await.map_err(FetchError::transport)
    }

    #[cfg(test)]
    async fn in_use(&self, host: &str) -> usize {
        match self.hosts.lock().await.get(host) {
            Some(s) => self.cap - s.available_permits(),
            None => 0,
        }
    }

    #[cfg(test)]
    async fn tracked_hosts(&self) -> usize {
        self.hosts.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn blocks_beyond_cap() {
        let limiter = HostLimiter::new(2);
        let a = limiter.acquire("http://h:80").await.unwrap();
        let _b = limiter.acquire("http://h:80").await.unwrap();
        assert_eq!(limiter.in_use("http://h:80").await, 2);

        let third = tokio::time::timeout(Duration::from_millis(50), limiter.acquire("http://h:80")).await;
        assert!(third.is_err());

        drop(a);
        let third = tokio::time::timeout(Duration::from_millis(50), limiter.acquire("http://h:80")).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn hosts_are_independent() {
        let limiter = HostLimiter::new(1);
        let _a = limiter.acquire("http://a:80").await.unwrap();
        let b = tokio::time::timeout(Duration::from_millis(50), limiter.acquire("http://b:80")).await;
        assert!(b.is_ok());
        assert_eq!(limiter.in_use("http://c:80").await, 0);
    }

    #[tokio::test]
    async fn idle_hosts_are_dropped() {
        let limiter = HostLimiter::new(2);
        for i in 0..50 {
            let permit = limiter.acquire(&format!("http://host-{}:80", i)).await.unwrap();
            drop(permit);
        }
        assert!(limiter.tracked_hosts().await <= 1);

        let held = limiter.acquire("http://busy:80").await.unwrap();
        let _other = limiter.acquire("http://other:80").await.unwrap();
        assert_eq!(limiter.in_use("http://busy:80").await, 1);
        drop(held);
        let _again = limiter.acquire("http://third:80").await.unwrap();
        assert_eq!(limiter.in_use("http://busy:80").await, 0);
        assert_eq!(limiter.tracked_hosts().await, 2);
    }
}
