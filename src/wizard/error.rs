//! Error types for wizard events.

use std::fmt;

use thiserror::Error;

use crate::model::{Currency, PaymentMethod, Step};
use crate::wizard::details::DetailField;

/// Top-level error returned by [`Wizard::apply`](super::Wizard::apply).
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("wizard is closed")]
    Closed,

    #[error("{action} is not available at the {step} step")]
    WrongStep { action: &'static str, step: Step },

    #[error("{action} is not available for {method} payments")]
    WrongMethod {
        action: &'static str,
        method: PaymentMethod,
    },

    #[error("{action} is hidden or disabled at the {step} step")]
    NavigationBlocked { action: &'static str, step: Step },

    #[error("amount {0} is negative")]
    NegativeAmount(crate::Amount),

    #[error("currency {currency} cannot be used with {method} payments")]
    CurrencyMismatch {
        currency: Currency,
        method: PaymentMethod,
    },

    #[error("invalid payment details: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no transaction to confirm")]
    NoTransaction,

    #[error("a payment confirmation is already in progress")]
    AlreadyProcessing,

    #[error("no payment confirmation is in progress")]
    NotProcessing,

    #[error("payment confirmation needs a running tokio runtime")]
    NoRuntime,

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),
}

/// Failure reported by a [`PaymentProcessor`](super::PaymentProcessor).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("declined: {0}")]
    Declined(String),
    #[error("settlement interrupted: {0}")]
    Interrupted(String),
}

/// A single field that failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: DetailField,
    pub reason: &'static str,
}

/// Every field error found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: DetailField, reason: &'static str) {
        self.0.push(FieldError { field, reason });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for one field, if it failed.
    pub fn get(&self, field: DetailField) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.reason)
    }

    pub fn clear(&mut self, field: DetailField) {
        self.0.retain(|e| e.field != field);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
