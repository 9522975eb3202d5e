//! Payment settlement seam.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::model::Transaction;
use crate::wizard::error::PaymentError;

/// Settles a confirmed transaction.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn settle(&self, transaction: &Transaction) -> Result<(), PaymentError>;
}

/// Stand-in processor: waits a fixed latency and always succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    latency: Duration,
}

impl SimulatedProcessor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    async fn settle(&self, transaction: &Transaction) -> Result<(), PaymentError> {
        debug!(tx = %transaction.id(), latency_ms = self.latency.as_millis() as u64, "simulating settlement");
        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}
