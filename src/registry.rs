use crate::error::ShipError;
use crate::record::{ErrorInfo, Priority};
use crate::sink::Sink;

/// The set of active sinks, composed explicitly by the host and passed
/// where it is needed. Replaces any notion of a process-global logging
/// singleton; tests build their own registries.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: Vec<Box<dyn Sink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Fans the event out to every sink, in registration order. Infallible:
    /// sinks absorb their own delivery problems.
    pub fn emit(
        &self,
        priority: Priority,
        tag: Option<&str>,
        message: &str,
        error: Option<&ErrorInfo>,
    ) {
        for sink in &self.sinks {
            sink.log(priority, tag, message, error);
        }
    }

    /// Entry point for facades that still speak raw integer levels. The only
    /// error an emit can raise: an unknown level is a caller contract
    /// violation, not a delivery failure.
    pub fn emit_raw(
        &self,
        raw_priority: i32,
        tag: Option<&str>,
        message: &str,
        error: Option<&ErrorInfo>,
    ) -> Result<(), ShipError> {
        let priority = Priority::from_raw(raw_priority)?;
        self.emit(priority, tag, message, error);
        Ok(())
    }
}
