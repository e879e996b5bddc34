//! Best-effort shipping of application log events to a Logstash-style HTTP
//! collector.
//!
//! Events are captured synchronously through a [`Sink`], turned into wire
//! records, and delivered on a shared async worker pool. Transient failures
//! (rate limiting, timeouts, connection problems) are retried with linear
//! backoff up to a ceiling; everything else drops the record silently.
//! Delivery never blocks or fails the emitting thread.

mod client;
mod config;
mod error;
mod record;
mod registry;
mod retry;
mod sink;

pub use client::{DeliveryClient, DeliveryOutcome, HttpDeliveryClient};
pub use config::{AppContext, DeviceInfo};
pub use error::ShipError;
pub use record::{CauseInfo, ErrorInfo, LogEvent, LogRecord, Priority};
pub use registry::SinkRegistry;
pub use retry::{run_chain, BackoffPolicy, ChainState, RetryScheduler};
pub use sink::{CollectorSink, ConsoleSink, Sink};
