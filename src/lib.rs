pub mod amount;
pub mod config;
pub mod csv;
pub mod model;
pub mod wizard;

pub use amount::Amount;
pub use config::WizardConfig;
pub use model::{Currency, PaymentMethod, Step, Transaction, TransactionStatus, TxId};
pub use wizard::{Command, Event, Wizard, WizardError, WizardHost};
