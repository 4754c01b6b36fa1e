/// Reference price read from the oracle
use crate::errors::{KeeperError, KeeperResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// Strictly positive fixed-point price: `raw / 10^decimals`.
///
/// The exact integer is kept so logs and results show the value the feed
/// returned; `as_f64` is only used for JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price {
    raw: u128,
    decimals: u32,
}

impl Price {
    /// Build a price from the feed's integer answer. Zero is rejected.
    pub fn from_raw(raw: u128, decimals: u32) -> KeeperResult<Self> {
        if raw == 0 {
            return Err(KeeperError::invalid_price(
                "0",
                "price must be strictly positive",
            ));
        }
        if 10u128.checked_pow(decimals).is_none() {
            return Err(KeeperError::invalid_price(
                raw.to_string(),
                format!("unsupported precision of {} decimals", decimals),
            ));
        }
        Ok(Self { raw, decimals })
    }

    pub fn raw(&self) -> u128 {
        self.raw
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / 10f64.powi(self.decimals as i32)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // from_raw guarantees the power fits
        let scale = 10u128.pow(self.decimals);
        let whole = self.raw / scale;
        if self.decimals == 0 {
            return write!(f, "{}", whole);
        }
        let frac = self.raw % scale;
        write!(
            f,
            "{}.{:0width$}",
            whole,
            frac,
            width = self.decimals as usize
        )
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        let err = Price::from_raw(0, 8).unwrap_err();
        assert!(matches!(err, KeeperError::InvalidPrice { .. }));
    }

    #[test]
    fn test_display_is_exact() {
        let price = Price::from_raw(6_512_345_678_901, 8).unwrap();
        assert_eq!(price.to_string(), "65123.45678901");

        let small = Price::from_raw(5, 8).unwrap();
        assert_eq!(small.to_string(), "0.00000005");

        let whole = Price::from_raw(42, 0).unwrap();
        assert_eq!(whole.to_string(), "42");
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::from_raw(4_000_000_000, 8).unwrap();
        assert_eq!(serde_json::to_value(price).unwrap(), serde_json::json!(40.0));
    }

    #[test]
    fn test_precision_overflow_rejected() {
        assert!(Price::from_raw(1, 39).is_err());
        assert!(Price::from_raw(1, 38).is_ok());
    }
}
