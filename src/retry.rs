use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::client::{DeliveryClient, DeliveryOutcome};
use crate::error::ShipError;
use crate::record::LogRecord;

/// Linear backoff: the delay grows by `step` after every retryable failure
/// until it passes `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub step: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(10_000),
            max_delay: Duration::from_millis(60_000),
        }
    }
}

/// Per-record delivery state. Each record walks this machine independently;
/// there is no shared state between chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Waiting out the current backoff delay.
    Scheduled { delay: Duration },
    /// A delivery attempt is in flight; `delay` is the wait that preceded it.
    Attempting { delay: Duration },
    Delivered,
    Dropped,
}

impl ChainState {
    pub fn start() -> Self {
        ChainState::Scheduled {
            delay: Duration::ZERO,
        }
    }

    /// Transition out of `Attempting { delay }` once the attempt resolved.
    ///
    /// The bound check runs against the delay that was already waited, so a
    /// retryable failure at exactly `max_delay` still earns one more attempt
    /// at `max_delay + step`. With the default policy that yields the delay
    /// sequence 0s, 10s, 20s, 30s, 40s, 50s, 60s, 70s: eight attempts total.
    /// Intentional fidelity to the shipped behaviour; see DESIGN.md before
    /// changing it.
    pub fn resolve(delay: Duration, outcome: &DeliveryOutcome, policy: &BackoffPolicy) -> Self {
        match outcome {
            DeliveryOutcome::Accepted => ChainState::Delivered,
            DeliveryOutcome::Fatal(_) => ChainState::Dropped,
            DeliveryOutcome::Retryable(_) => {
                if delay <= policy.max_delay {
                    ChainState::Scheduled {
                        delay: delay + policy.step,
                    }
                } else {
                    ChainState::Dropped
                }
            }
        }
    }
}

/// Drives one record through the state machine to a terminal state. Both
/// suspension points (the backoff wait and the network call) yield the
/// worker rather than blocking it.
pub async fn run_chain(client: Arc<dyn DeliveryClient>, record: LogRecord, policy: BackoffPolicy) {
    let mut state = ChainState::start();
    loop {
        state = match state {
            ChainState::Scheduled { delay } => {
                sleep(delay).await;
                ChainState::Attempting { delay }
            }
            ChainState::Attempting { delay } => {
                let outcome = client.deliver(&record).await;
                ChainState::resolve(delay, &outcome, &policy)
            }
            ChainState::Delivered => {
                debug!("Record delivered to collector");
                return;
            }
            ChainState::Dropped => {
                warn!("Record dropped: retries exhausted or fatal delivery failure");
                return;
            }
        };
    }
}

enum Executor {
    Owned(runtime::Runtime),
    Borrowed(runtime::Handle),
}

/// Owns the long-lived I/O execution context shared by all retry chains and
/// spawns one independent chain per submitted record. Delivery failures never
/// reach the submitter; terminal outcomes are only visible through the `log`
/// facade.
pub struct RetryScheduler {
    client: Arc<dyn DeliveryClient>,
    policy: BackoffPolicy,
    executor: Executor,
}

impl RetryScheduler {
    /// Builds a scheduler with its own small worker pool, for hosts that do
    /// not run a tokio runtime of their own.
    pub fn new(client: Arc<dyn DeliveryClient>, policy: BackoffPolicy) -> Result<Self, ShipError> {
        let rt = runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("logship-delivery")
            .enable_all()
            .build()?;
        Ok(Self {
            client,
            policy,
            executor: Executor::Owned(rt),
        })
    }

    /// Spawns chains onto an existing runtime instead of a dedicated pool.
    pub fn with_handle(
        client: Arc<dyn DeliveryClient>,
        policy: BackoffPolicy,
        handle: runtime::Handle,
    ) -> Self {
        Self {
            client,
            policy,
            executor: Executor::Borrowed(handle),
        }
    }

    fn handle(&self) -> &runtime::Handle {
        match &self.executor {
            Executor::Owned(rt) => rt.handle(),
            Executor::Borrowed(handle) => handle,
        }
    }

    /// Hands one record to the pipeline and returns immediately; the chain
    /// runs to Delivered or Dropped on the scheduler's runtime.
    pub fn submit(&self, record: LogRecord) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let policy = self.policy;
        self.handle().spawn(run_chain(client, record, policy))
    }
}
