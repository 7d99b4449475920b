// ABOUTME: Time source and sleeper used by the deployment poll loop.
// ABOUTME: Swappable so waits can be driven without real sleeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A sleep between polls ended before its full duration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("poll wait interrupted: {0}")]
pub struct Interrupted(pub String);

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted>;
}

/// Wall clock with tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        tokio::time::sleep(duration).await;
        Ok(())
    }
}
