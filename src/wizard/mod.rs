//! Top-up wizard controller.
//!
//! The controller owns one [`WizardState`] and applies user events to it.
//! Every transition is synchronous except payment confirmation, which hands
//! the transaction to a [`PaymentProcessor`] on a spawned task and finishes
//! when that task reports back. At most one settlement is in flight per
//! wizard. Also supports an async stream of commands.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::config::WizardConfig;
use crate::model::Transaction;

mod details;
pub use details::{
    BankForm, BankInstructions, CardDetails, CardField, CardForm, CryptoForm,
    CryptoInstructions, DetailCollector, DetailField, PaymentDetails,
};

mod error;
pub use error::{FieldError, PaymentError, ValidationErrors, WizardError};

mod navigation;
pub use navigation::{NavControls, navigation};

mod processor;
pub use processor::{PaymentProcessor, SimulatedProcessor};

mod state;
pub use state::{Closure, Effect, Event, WizardState};

type Settlement = JoinHandle<Result<(), PaymentError>>;

/// Callbacks into the page hosting the wizard.
pub trait WizardHost: Send {
    /// The success screen was dismissed; refresh the balance.
    fn on_complete(&mut self) {}
    /// The user gave up before finishing.
    fn on_cancel(&mut self) {}
    fn on_view_history(&mut self) {}
}

impl WizardHost for () {}

/// Input for [`Wizard::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Apply(Event),
    /// Wait for the outstanding settlement, if any, before reading on.
    AwaitSettlement,
}

/// The top-up wizard.
pub struct Wizard<H = ()> {
    state: WizardState,
    config: WizardConfig,
    processor: Arc<dyn PaymentProcessor>,
    host: H,
    pending: Option<Settlement>,
}

/// Public API
impl Wizard {
    pub fn new() -> Self {
        Self::with_config(WizardConfig::default())
    }

    /// A wizard settling through a [`SimulatedProcessor`] with the configured latency.
    pub fn with_config(config: WizardConfig) -> Self {
        let processor = Arc::new(SimulatedProcessor::new(config.settlement_latency));
        Self {
            state: WizardState::new(),
            config,
            processor,
            host: (),
            pending: None,
        }
    }
}

impl<H: WizardHost> Wizard<H> {
    pub fn with_host<T: WizardHost>(self, host: T) -> Wizard<T> {
        Wizard {
            state: self.state,
            config: self.config,
            processor: self.processor,
            host,
            pending: self.pending,
        }
    }

    pub fn with_processor(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// True while a spawned settlement has not been collected yet.
    pub fn has_pending_settlement(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a single event on top of the current wizard state.
    ///
    /// Confirming spawns the settlement on the current tokio runtime.
    pub fn apply(&mut self, event: Event) -> Result<(), WizardError> {
        let result = self.apply_inner(&event);
        Self::log_result(&event, &self.state, &result);
        result
    }

    /// Wait for the in-flight settlement and apply its outcome.
    pub async fn await_settlement(&mut self) -> Result<(), WizardError> {
        let handle = self.pending.take().ok_or(WizardError::NotProcessing)?;
        let joined = handle.await;
        self.finish_settlement(joined)
    }

    /// Run the wizard with the given command stream.
    ///
    /// Settlements finish as soon as they are ready, interleaved with incoming
    /// commands. One still in flight when the stream ends is awaited.
    pub async fn run(&mut self, mut commands: impl Stream<Item = Command> + Unpin) {
        loop {
            tokio::select! {
                joined = next_settlement(&mut self.pending), if self.pending.is_some() => {
                    self.pending = None;
                    // failures are logged and left on the transaction
                    let _ = self.finish_settlement(joined);
                }
                command = commands.next() => match command {
                    Some(Command::Apply(event)) => {
                        // a rejected event should not stop the wizard
                        let _ = self.apply(event);
                    }
                    Some(Command::AwaitSettlement) => {
                        if self.pending.is_some() {
                            let _ = self.await_settlement().await;
                        }
                    }
                    None => break,
                },
            }
        }

        if self.pending.is_some() {
            let _ = self.await_settlement().await;
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

/// Private API
impl<H: WizardHost> Wizard<H> {
    fn apply_inner(&mut self, event: &Event) -> Result<(), WizardError> {
        // checked up front so a failed spawn never leaves the status at processing
        let runtime = match event {
            Event::Confirm => Some(Handle::try_current().map_err(|_| WizardError::NoRuntime)?),
            _ => None,
        };

        match self.state.apply(event, &self.config)? {
            Effect::None => {}
            Effect::StartSettlement(tx) => {
                if let Some(runtime) = runtime {
                    self.spawn_settlement(&runtime, tx);
                }
            }
            Effect::Complete => self.host.on_complete(),
            Effect::Cancel => self.host.on_cancel(),
            Effect::ViewHistory => self.host.on_view_history(),
        }
        Ok(())
    }

    fn spawn_settlement(&mut self, runtime: &Handle, tx: Transaction) {
        info!(
            tx = %tx.id(),
            amount = %tx.amount(),
            currency = %tx.currency(),
            "settlement started"
        );
        let processor = Arc::clone(&self.processor);
        self.pending = Some(runtime.spawn(async move { processor.settle(&tx).await }));
    }

    fn finish_settlement(
        &mut self,
        joined: Result<Result<(), PaymentError>, JoinError>,
    ) -> Result<(), WizardError> {
        let outcome =
            joined.unwrap_or_else(|e| Err(PaymentError::Interrupted(e.to_string())));
        let result = self.state.settle(outcome);

        let tx = self.state.transaction().map(|tx| tx.id().to_string());
        match &result {
            Ok(()) => info!(tx = ?tx, step = %self.state.step(), "settlement completed"),
            Err(e) => warn!(tx = ?tx, reason = %e, "settlement failed"),
        }
        result
    }

    /// Small helper to log `apply` results
    fn log_result(event: &Event, state: &WizardState, result: &Result<(), WizardError>) {
        let name = event.name();
        match result {
            Ok(()) => {
                info!(
                    step = %state.step(),
                    method = %state.method(),
                    amount = %state.amount(),
                    "{name} applied"
                );
            }
            Err(e) => {
                info!(
                    step = %state.step(),
                    reason = %e,
                    "{name} skipped"
                );
            }
        }
    }
}

async fn next_settlement(
    pending: &mut Option<Settlement>,
) -> Result<Result<(), PaymentError>, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
