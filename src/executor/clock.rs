//! Injected time source for the polling loop.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Scheduler capability. Injecting it keeps the executor's retry timing out
/// of the state machine itself, so tests can run hundreds of polls without
/// real delays.
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock whose sleeps return immediately. For tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantClock;

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}
