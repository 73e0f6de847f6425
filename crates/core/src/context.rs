// Cancellation / deadline context passed to every data-access call

use std::future::Future;
use std::time::Duration;

use futures::future::select_all;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::DomainError;
use crate::locale::LocalizedMessages;

/// Why a guarded operation stopped early
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("operation cancelled by caller")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for DomainError {
    fn from(reason: Interrupted) -> Self {
        let (tag, messages) = match reason {
            Interrupted::Cancelled => (
                "cancelled",
                LocalizedMessages::new("Операция отменена", "Operation cancelled"),
            ),
            Interrupted::DeadlineExceeded => (
                "deadline_exceeded",
                LocalizedMessages::new("Превышено время ожидания", "Deadline exceeded"),
            ),
        };
        DomainError::unhandled(tag)
            .with_messages(messages)
            .with_cause(reason)
    }
}

/// Caller-owned deadline and cancellation signals.
///
/// Cheap to clone; clones observe the same signals. A derived context keeps
/// every signal of its parent, so cancelling the parent reaches the child.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Vec<watch::Receiver<bool>>,
}

/// Cancels every `Context` derived from the same `with_cancel` call
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Context {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now (keeps an earlier existing deadline).
    /// A timeout too large to represent adds no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Add a fresh cancellation signal on top of the inherited ones
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel.push(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(|rx| *rx.borrow())
    }

    /// Current interruption, if any, without waiting
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Run `fut` until it completes or the context is interrupted.
    ///
    /// An already-interrupted context never polls `fut`. On interruption the
    /// future is dropped, which is what aborts in-flight driver calls.
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.interrupted() => Err(reason),
            out = fut => Ok(out),
        }
    }

    /// Resolves once cancelled or past the deadline; pending forever otherwise
    pub async fn interrupted(&self) -> Interrupted {
        let cancelled = async {
            if self.cancel.is_empty() {
                std::future::pending::<()>().await;
            } else {
                let waits = self.cancel.iter().cloned().map(|rx| Box::pin(cancel_signalled(rx)));
                select_all(waits).await;
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => Interrupted::Cancelled,
            _ = expired => Interrupted::DeadlineExceeded,
        }
    }
}

async fn cancel_signalled(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Handle dropped without cancelling
            std::future::pending::<()>().await;
        }
    }
}
