//! User-visible notifications.
//!
//! The presentation layer injects a sink and core components report
//! through it; there is no process-wide notification channel. Notices are
//! informational: delivering one must never block or fail the operation
//! that produced it.

use std::sync::mpsc;

/// Severity of a notice, for presentation purposes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine event worth showing.
    Info,
    /// Something went wrong but the session continues.
    Warning,
    /// An operation was aborted.
    Error,
}

/// A user-visible, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity for presentation.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// Detail line.
    pub body: String,
}

impl Notice {
    /// Build an informational notice.
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { severity: Severity::Info, title: title.into(), body: body.into() }
    }

    /// Build a warning notice.
    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, title: title.into(), body: body.into() }
    }

    /// Build an error notice.
    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { severity: Severity::Error, title: title.into(), body: body.into() }
    }
}

/// Sink for user-visible events, injected by the presentation layer.
pub trait NotificationSink: Send + Sync {
    /// Deliver a notice. Must not block.
    fn notify(&self, notice: Notice);
}

/// Sink that forwards notices to `tracing`.
///
/// The default for headless deployments where no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(title = %notice.title, "{}", notice.body),
            Severity::Warning => tracing::warn!(title = %notice.title, "{}", notice.body),
            Severity::Error => tracing::error!(title = %notice.title, "{}", notice.body),
        }
    }
}

/// Sink that queues notices on an unbounded channel.
///
/// Lets tests and simple UIs drain notices at their own pace.
pub struct ChannelSink {
    tx: mpsc::Sender<Notice>,
}

impl ChannelSink {
    /// Create a sink and the receiving end to drain it from.
    pub fn new() -> (Self, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notice: Notice) {
        // Receiver gone means nobody is listening anymore; drop the notice.
        let _ = self.tx.send(notice);
    }
}
