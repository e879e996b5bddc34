use std::sync::Arc;

use chrono::Local;
use log::Level;

use crate::client::HttpDeliveryClient;
use crate::config::{AppContext, DeviceInfo};
use crate::error::ShipError;
use crate::record::{ErrorInfo, LogEvent, LogRecord, Priority};
use crate::retry::{BackoffPolicy, RetryScheduler};

/// A destination for log events. Called synchronously on the emitting
/// thread for every event; implementations must return immediately and must
/// never fail for delivery reasons.
pub trait Sink: Send + Sync {
    fn log(&self, priority: Priority, tag: Option<&str>, message: &str, error: Option<&ErrorInfo>);
}

/// Forwards events to the process `log` facade, for local development.
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn log(&self, priority: Priority, tag: Option<&str>, message: &str, error: Option<&ErrorInfo>) {
        let level = match priority {
            Priority::Debug => Level::Debug,
            Priority::Info => Level::Info,
            Priority::Warn => Level::Warn,
            Priority::Error | Priority::Critical => Level::Error,
        };
        match tag {
            Some(tag) => log::log!(level, "{}: {}", tag, message),
            None => log::log!(level, "{}", message),
        }
        if let Some(error) = error {
            log::log!(
                level,
                "{}: {}\n{}",
                error.type_name,
                error.message,
                error.stack_frames.join("\n")
            );
        }
    }
}

/// The network sink: builds the wire record synchronously (cheap, pure) and
/// hands it to the retry scheduler without waiting for delivery. Delivery
/// failures never propagate back to the caller.
pub struct CollectorSink {
    context: AppContext,
    device: DeviceInfo,
    scheduler: RetryScheduler,
}

impl CollectorSink {
    /// Standard wiring: HTTP delivery to the context's collector address on
    /// a dedicated worker pool, default backoff policy.
    pub fn new(context: AppContext, device: DeviceInfo) -> Result<Self, ShipError> {
        let client = Arc::new(HttpDeliveryClient::new(&context)?);
        let scheduler = RetryScheduler::new(client, BackoffPolicy::default())?;
        Ok(Self {
            context,
            device,
            scheduler,
        })
    }

    /// Custom wiring for async hosts and tests: any delivery client, policy,
    /// and execution context the scheduler was built with.
    pub fn with_scheduler(
        context: AppContext,
        device: DeviceInfo,
        scheduler: RetryScheduler,
    ) -> Self {
        Self {
            context,
            device,
            scheduler,
        }
    }
}

impl Sink for CollectorSink {
    fn log(&self, priority: Priority, tag: Option<&str>, message: &str, error: Option<&ErrorInfo>) {
        let event = LogEvent::new(
            priority,
            tag.map(str::to_string),
            message.to_string(),
            error.cloned(),
        );
        let record = LogRecord::build(&event, &self.context, &self.device, Local::now());
        // Fire and forget; the chain's outcome is only visible through the
        // log facade.
        let _ = self.scheduler.submit(record);
    }
}
