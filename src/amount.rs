use std::fmt;

use thiserror::Error;

/// Errors when turning user input into an [`Amount`].
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("amount {0} is not a finite number")]
    NotFinite(f64),
    #[error("amount {0} is negative")]
    Negative(f64),
    #[error("amount {0} is below the smallest unit 0.0001")]
    TooSmall(f64),
}

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 10_000;

    pub const ZERO: Amount = Amount(0);

    pub fn from_float(value: f64) -> Self {
        Amount((value * Self::SCALE as f64).round() as i64)
    }

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    /// Parse user input, rejecting negative and non-finite values.
    pub fn try_from_float(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value));
        }
        let amount = Self::from_float(value);
        if value > 0.0 && !amount.is_positive() {
            return Err(AmountError::TooSmall(value));
        }
        Ok(amount)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Convert this amount into CERE at the given unit price.
    ///
    /// Computed in fixed point so `100 / 0.05` is exactly `2000`.
    /// A non-positive price yields zero.
    pub fn in_cere(&self, price: Amount) -> Amount {
        if !price.is_positive() {
            return Amount::ZERO;
        }
        let scaled = self.0 as i128 * Self::SCALE as i128 / price.0 as i128;
        Amount(scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let frac = abs % Self::SCALE as u64;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl serde::Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
