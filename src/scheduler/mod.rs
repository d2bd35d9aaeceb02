pub mod state;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{BotError, ErrorKind};
use crate::homework::{extract_homeworks, parse_status};
use crate::platform::Notifier;
use crate::practicum::HomeworkSource;
use crate::scheduler::state::PollState;

/// Waits between poll cycles
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What a single poll cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A changed homework status was delivered
    StatusNotified,
    /// Nothing changed since the last delivered report
    NoNewStatus,
    /// A notification was due but the chat did not accept it
    DeliveryFailed,
    /// An error diagnostic was delivered
    ErrorReported,
    /// An error occurred but matches the last delivered report
    ErrorSuppressed,
    /// The envelope lacked required keys; logged only
    Malformed,
}

/// Poll, detect, notify. Owns the cursor and the last delivered report.
pub struct PollLoop<S, N, Z = TokioSleeper> {
    source: S,
    notifier: N,
    sleeper: Z,
    interval: Duration,
    state: PollState,
}

impl<S: HomeworkSource, N: Notifier> PollLoop<S, N> {
    pub fn new(source: S, notifier: N, interval: Duration) -> Self {
        Self::with_sleeper(source, notifier, TokioSleeper, interval)
    }
}

impl<S: HomeworkSource, N: Notifier, Z: Sleeper> PollLoop<S, N, Z> {
    pub fn with_sleeper(source: S, notifier: N, sleeper: Z, interval: Duration) -> Self {
        Self {
            source,
            notifier,
            sleeper,
            interval,
            state: PollState::new(),
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Poll forever; only killing the process stops it
    pub async fn run(&mut self) {
        info!("Polling every {}s", self.interval.as_secs());
        loop {
            let outcome = self.run_once().await;
            debug!(
                "Cycle finished: {:?}, cursor {}, last report {:?}",
                outcome,
                self.state.cursor(),
                self.state.last_report()
            );
            self.wait_interval().await;
        }
    }

    pub async fn wait_interval(&self) {
        self.sleeper.sleep(self.interval).await;
    }

    /// One poll cycle. Every failure is handled here according to its kind.
    pub async fn run_once(&mut self) -> CycleOutcome {
        match self.check_homeworks().await {
            Ok(outcome) => outcome,
            Err(e) => match e.kind() {
                ErrorKind::RecoverableSilent => {
                    error!("{}", e);
                    CycleOutcome::Malformed
                }
                ErrorKind::RecoverableReported | ErrorKind::Fatal => self.report_error(&e).await,
            },
        }
    }

    async fn check_homeworks(&mut self) -> Result<CycleOutcome, BotError> {
        let response = self.source.fetch(self.state.cursor()).await?;
        let homeworks = extract_homeworks(&response)?;

        let Some(latest) = homeworks.first() else {
            info!("No new homework statuses");
            return Ok(CycleOutcome::NoNewStatus);
        };

        let message = parse_status(latest)?;
        let new_status = latest["status"].as_str().unwrap_or_default();
        if !self.state.is_new(new_status) {
            info!("No new homework statuses");
            return Ok(CycleOutcome::NoNewStatus);
        }

        info!("Homework status changed to {}", new_status);
        if !self.notifier.send(&message).await {
            return Ok(CycleOutcome::DeliveryFailed);
        }

        self.state.commit_report(new_status);
        self.advance_cursor(&response);
        Ok(CycleOutcome::StatusNotified)
    }

    fn advance_cursor(&mut self, response: &Value) {
        match response.get("current_date").and_then(Value::as_i64) {
            Some(timestamp) => {
                self.state.advance_cursor(timestamp);
                let readable = chrono::DateTime::from_timestamp(timestamp, 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| timestamp.to_string());
                info!("Cursor advanced to {} ({})", timestamp, readable);
            }
            None => warn!(
                "current_date is not an integer, cursor stays at {}",
                self.state.cursor()
            ),
        }
    }

    async fn report_error(&mut self, e: &BotError) -> CycleOutcome {
        let message = format!("Сбой в работе программы: {}", e);
        error!("{}", message);

        if !self.state.is_new(&message) {
            debug!("Error already reported, not sending it again");
            return CycleOutcome::ErrorSuppressed;
        }

        if self.notifier.send(&message).await {
            self.state.commit_report(message);
            CycleOutcome::ErrorReported
        } else {
            CycleOutcome::DeliveryFailed
        }
    }
}
