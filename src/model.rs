//! Core domain types for the top-up wizard.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::Amount;

/// Error when parsing a domain value from text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// One stage of the wizard's linear flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Method,
    Amount,
    Details,
    Review,
    Success,
}

impl Step {
    /// Canonical step order.
    pub const ALL: [Step; 5] = [
        Step::Method,
        Step::Amount,
        Step::Details,
        Step::Review,
        Step::Success,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<Step> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// 1-based position shown as "Step N of 4". `Success` is not counted.
    pub fn position(&self) -> Option<usize> {
        match self {
            Step::Success => None,
            other => Some(other.index() + 1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Method => "method",
            Step::Amount => "amount",
            Step::Details => "details",
            Step::Review => "review",
            Step::Success => "success",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment channel used to fund the top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Crypto,
    Bank,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Crypto => "crypto",
            PaymentMethod::Bank => "bank",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "crypto" => Ok(PaymentMethod::Crypto),
            "bank" => Ok(PaymentMethod::Bank),
            _ => Err(ParseError::new("payment method", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    Usd,
    Eur,
    Gbp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CryptoToken {
    Usdt,
    Usdc,
    Dai,
}

/// Currency of the amount entered: a fiat code or a stable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Currency {
    Fiat(FiatCurrency),
    Crypto(CryptoToken),
}

impl Currency {
    pub const USD: Currency = Currency::Fiat(FiatCurrency::Usd);
    pub const USDT: Currency = Currency::Crypto(CryptoToken::Usdt);

    /// Currency a method starts with when it is selected.
    pub fn default_for(method: PaymentMethod) -> Currency {
        match method {
            PaymentMethod::Crypto => Currency::USDT,
            PaymentMethod::Card | PaymentMethod::Bank => Currency::USD,
        }
    }

    /// Crypto takes tokens, card and bank take fiat.
    pub fn is_compatible_with(&self, method: PaymentMethod) -> bool {
        matches!(
            (self, method),
            (Currency::Crypto(_), PaymentMethod::Crypto)
                | (Currency::Fiat(_), PaymentMethod::Card | PaymentMethod::Bank)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Fiat(FiatCurrency::Usd) => "USD",
            Currency::Fiat(FiatCurrency::Eur) => "EUR",
            Currency::Fiat(FiatCurrency::Gbp) => "GBP",
            Currency::Crypto(CryptoToken::Usdt) => "USDT",
            Currency::Crypto(CryptoToken::Usdc) => "USDC",
            Currency::Crypto(CryptoToken::Dai) => "DAI",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Fiat(FiatCurrency::Usd)),
            "EUR" => Ok(Currency::Fiat(FiatCurrency::Eur)),
            "GBP" => Ok(Currency::Fiat(FiatCurrency::Gbp)),
            "USDT" => Ok(Currency::Crypto(CryptoToken::Usdt)),
            "USDC" => Ok(Currency::Crypto(CryptoToken::Usdc)),
            "DAI" => Ok(Currency::Crypto(CryptoToken::Dai)),
            _ => Err(ParseError::new("currency", s)),
        }
    }
}

/// Chain a crypto payment is sent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoNetwork {
    #[default]
    Ethereum,
    Bsc,
    Polygon,
    Avalanche,
}

impl CryptoNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoNetwork::Ethereum => "ethereum",
            CryptoNetwork::Bsc => "bsc",
            CryptoNetwork::Polygon => "polygon",
            CryptoNetwork::Avalanche => "avalanche",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CryptoNetwork::Ethereum => "Ethereum (ERC-20)",
            CryptoNetwork::Bsc => "Binance Smart Chain (BEP-20)",
            CryptoNetwork::Polygon => "Polygon",
            CryptoNetwork::Avalanche => "Avalanche",
        }
    }

    /// Display-only deposit address. Not a real wallet.
    pub fn deposit_address(&self) -> &'static str {
        match self {
            CryptoNetwork::Ethereum => "0x1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b",
            CryptoNetwork::Bsc => "0xabcdef1234567890abcdef1234567890abcdef12",
            CryptoNetwork::Polygon => "0x9876543210abcdef9876543210abcdef98765432",
            CryptoNetwork::Avalanche => "0x0123456789abcdef0123456789abcdef01234567",
        }
    }
}

impl fmt::Display for CryptoNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoNetwork {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" => Ok(CryptoNetwork::Ethereum),
            "bsc" => Ok(CryptoNetwork::Bsc),
            "polygon" => Ok(CryptoNetwork::Polygon),
            "avalanche" => Ok(CryptoNetwork::Avalanche),
            _ => Err(ParseError::new("network", s)),
        }
    }
}

/// Process-wide sequence, combined with a v4 uuid for uniqueness across runs.
static NEXT_TX_SEQ: AtomicU64 = AtomicU64::new(1);

/// Transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn generate() -> Self {
        let seq = NEXT_TX_SEQ.fetch_add(1, Ordering::Relaxed);
        TxId(format!("tx-{seq}-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settlement status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Materialized, not yet confirmed.
    #[default]
    Pending,
    /// A settlement is in flight.
    Processing,
    Completed,
    /// The last settlement attempt failed; it may be retried.
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a top-up request. Everything but `status` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: TxId,
    amount: Amount,
    amount_in_cere: Amount,
    currency: Currency,
    method: PaymentMethod,
    network: Option<CryptoNetwork>,
    status: TransactionStatus,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new `Pending` transaction with a fresh id.
    ///
    /// `network` is kept only for crypto payments.
    pub fn new(
        amount: Amount,
        currency: Currency,
        method: PaymentMethod,
        network: CryptoNetwork,
        cere_price: Amount,
    ) -> Self {
        Self {
            id: TxId::generate(),
            amount,
            amount_in_cere: amount.in_cere(cere_price),
            currency,
            method,
            network: (method == PaymentMethod::Crypto).then_some(network),
            status: TransactionStatus::Pending,
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> &TxId {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn amount_in_cere(&self) -> Amount {
        self.amount_in_cere
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn network(&self) -> Option<CryptoNetwork> {
        self.network
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub(crate) fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
    }
}
