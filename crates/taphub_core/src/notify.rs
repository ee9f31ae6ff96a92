//! Notification sinks.
//!
//! # Responsibility
//! - Define the outbound contract for change messages.
//! - Provide a log-backed sink for deployments without a remote channel.
//!
//! # Invariants
//! - Callers treat delivery as fire and forget; a `SinkError` is logged by
//!   the caller and never retried.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Delivery failure reported by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification delivery failed: {}", self.message)
    }
}

impl Error for SinkError {}

/// Outbound channel for change messages such as `ON: Punk IPA`.
pub trait NotificationSink {
    fn notify(&self, message: &str, location_name: &str) -> Result<(), SinkError>;
}

impl<N: NotificationSink + ?Sized> NotificationSink for &N {
    fn notify(&self, message: &str, location_name: &str) -> Result<(), SinkError> {
        (**self).notify(message, location_name)
    }
}

impl<N: NotificationSink + ?Sized> NotificationSink for Box<N> {
    fn notify(&self, message: &str, location_name: &str) -> Result<(), SinkError> {
        (**self).notify(message, location_name)
    }
}

/// Writes each notification as an `info` log record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, message: &str, location_name: &str) -> Result<(), SinkError> {
        info!(
            "event=notify module=notify status=ok location=\"{}\" message=\"{}\"",
            location_name, message
        );
        Ok(())
    }
}
