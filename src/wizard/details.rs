//! Method-specific payment detail collection.
//!
//! Each payment method has its own form at the `Details` step. They all
//! implement [`DetailCollector`], which turns the form's current contents into
//! a validated [`PaymentDetails`] or the set of fields that failed.
//!
//! Everything produced here is display data for a simulated flow: the bank
//! account, deposit addresses and references are not real.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::Amount;
use crate::model::{CryptoNetwork, CryptoToken, Currency, FiatCurrency};
use crate::wizard::error::ValidationErrors;

/// Editable field of the card form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Name,
    Number,
    Expiry,
    Cvc,
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CardField::Name => "name",
            CardField::Number => "number",
            CardField::Expiry => "expiry",
            CardField::Cvc => "cvc",
        })
    }
}

/// Field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Card(CardField),
    Currency,
}

impl fmt::Display for DetailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailField::Card(field) => field.fmt(f),
            DetailField::Currency => f.write_str("currency"),
        }
    }
}

/// Validated output of a detail form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDetails {
    Card(CardDetails),
    Crypto(CryptoInstructions),
    Bank(BankInstructions),
}

/// Turns a method's form into validated payment details.
pub trait DetailCollector {
    fn collect(
        &mut self,
        amount: Amount,
        currency: Currency,
    ) -> Result<PaymentDetails, ValidationErrors>;
}

/// Card fields as entered. Debug output masks the number and cvc.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    pub name: String,
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl CardDetails {
    /// Last four digits of the card number.
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("name", &self.name)
            .field("number", &format_args!("**** {}", self.last4()))
            .field("expiry", &self.expiry)
            .field("cvc", &"***")
            .finish()
    }
}

/// The card form: a draft plus the errors from the last submission.
#[derive(Debug, Clone, Default)]
pub struct CardForm {
    draft: CardDetails,
    errors: ValidationErrors,
}

impl CardForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a formatted `value` for `field` and clear that field's error.
    pub fn edit(&mut self, field: CardField, value: &str) {
        match field {
            CardField::Name => self.draft.name = value.to_string(),
            CardField::Number => self.draft.number = format_card_number(value),
            CardField::Expiry => self.draft.expiry = format_expiry(value),
            CardField::Cvc => self.draft.cvc = format_cvc(value),
        }
        self.errors.clear(DetailField::Card(field));
    }

    pub fn value(&self, field: CardField) -> &str {
        match field {
            CardField::Name => &self.draft.name,
            CardField::Number => &self.draft.number,
            CardField::Expiry => &self.draft.expiry,
            CardField::Cvc => &self.draft.cvc,
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let CardDetails {
            name,
            number,
            expiry,
            cvc,
        } = &self.draft;

        if name.trim().is_empty() {
            errors.push(DetailField::Card(CardField::Name), "Name is required");
        }

        if number.trim().is_empty() {
            errors.push(DetailField::Card(CardField::Number), "Card number is required");
        } else if number.chars().filter(|c| !c.is_whitespace()).count() < 16 {
            errors.push(
                DetailField::Card(CardField::Number),
                "Card number must be 16 digits",
            );
        }

        if expiry.trim().is_empty() {
            errors.push(DetailField::Card(CardField::Expiry), "Expiry date is required");
        } else if !is_mm_yy(expiry) {
            errors.push(DetailField::Card(CardField::Expiry), "Invalid format (MM/YY)");
        }

        if cvc.trim().is_empty() {
            errors.push(DetailField::Card(CardField::Cvc), "CVC is required");
        } else if cvc.chars().count() < 3 {
            errors.push(DetailField::Card(CardField::Cvc), "CVC must be 3 digits");
        }

        errors
    }
}

impl DetailCollector for CardForm {
    fn collect(
        &mut self,
        _amount: Amount,
        _currency: Currency,
    ) -> Result<PaymentDetails, ValidationErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(errors);
        }
        self.errors = ValidationErrors::new();
        Ok(PaymentDetails::Card(self.draft.clone()))
    }
}

/// Strip whitespace and group digits in fours, at most 19 characters.
fn format_card_number(value: &str) -> String {
    let mut out = String::with_capacity(19);
    let mut run = 0;
    for c in value.chars().filter(|c| !c.is_whitespace()) {
        out.push(c);
        if c.is_ascii_digit() {
            run += 1;
            if run == 4 {
                out.push(' ');
                run = 0;
            }
        } else {
            run = 0;
        }
    }
    out.trim_end().chars().take(19).collect()
}

/// Digits only, `/` after the month once the year starts, at most `MM/YY`.
fn format_expiry(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let formatted = if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    };
    formatted.chars().take(5).collect()
}

fn format_cvc(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).take(3).collect()
}

fn is_mm_yy(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'/'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit())
}

/// Where to send a crypto payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CryptoInstructions {
    pub token: CryptoToken,
    pub network: CryptoNetwork,
    pub address: &'static str,
    pub amount: Amount,
}

/// The crypto form: the chosen network. The token is the wizard's currency.
#[derive(Debug, Clone, Default)]
pub struct CryptoForm {
    network: CryptoNetwork,
}

impl CryptoForm {
    pub fn network(&self) -> CryptoNetwork {
        self.network
    }

    pub fn select_network(&mut self, network: CryptoNetwork) {
        self.network = network;
    }

    /// Warning shown next to the deposit address.
    pub fn network_warning(&self, token: CryptoToken) -> String {
        format!(
            "Only send {} on the {} network. Sending tokens on the wrong network may result in permanent loss.",
            Currency::Crypto(token),
            self.network.label()
        )
    }
}

impl DetailCollector for CryptoForm {
    fn collect(
        &mut self,
        amount: Amount,
        currency: Currency,
    ) -> Result<PaymentDetails, ValidationErrors> {
        let Currency::Crypto(token) = currency else {
            let mut errors = ValidationErrors::new();
            errors.push(DetailField::Currency, "Select a supported token");
            return Err(errors);
        };
        Ok(PaymentDetails::Crypto(CryptoInstructions {
            token,
            network: self.network,
            address: self.network.deposit_address(),
            amount,
        }))
    }
}

/// Bank transfer instructions shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankInstructions {
    pub account_name: &'static str,
    pub account_number: &'static str,
    pub routing_number: &'static str,
    pub bank_name: &'static str,
    /// Must be quoted on the transfer so it can be matched to the account.
    pub reference: String,
    pub amount: Amount,
    pub currency: FiatCurrency,
}

/// The bank form. Holds the payment reference for this wizard run.
#[derive(Debug, Clone)]
pub struct BankForm {
    reference: String,
}

impl BankForm {
    pub fn new() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            reference: format!("CERE-{}", token[..8].to_ascii_uppercase()),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl Default for BankForm {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailCollector for BankForm {
    fn collect(
        &mut self,
        amount: Amount,
        currency: Currency,
    ) -> Result<PaymentDetails, ValidationErrors> {
        let Currency::Fiat(fiat) = currency else {
            let mut errors = ValidationErrors::new();
            errors.push(DetailField::Currency, "Select a supported currency");
            return Err(errors);
        };
        let usd = fiat == FiatCurrency::Usd;
        Ok(PaymentDetails::Bank(BankInstructions {
            account_name: "Cere Network Foundation",
            account_number: if usd { "9876543210" } else { "1234567890" },
            routing_number: if usd { "CERENW123" } else { "CERENW456" },
            bank_name: "Global Digital Bank",
            reference: self.reference.clone(),
            amount,
            currency: fiat,
        }))
    }
}
