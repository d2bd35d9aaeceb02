pub mod telegram;

use async_trait::async_trait;

/// Outbound channel for notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured destination.
    /// Returns `false` on any delivery fault; never errors.
    async fn send(&self, text: &str) -> bool;
}
