//! Transaction types.

use muleflow_core::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// A parsed financial transaction.
///
/// Produced by an external parser; immutable thereafter. The input
/// contract requires a non-empty sender and receiver, a positive finite
/// amount, and an integer epoch-second timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Optional transaction ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Sender account ID.
    pub sender: String,
    /// Receiver account ID.
    pub receiver: String,
    /// Transaction amount (positive).
    pub amount: f64,
    /// Timestamp (Unix epoch seconds).
    pub timestamp: i64,
}

impl Transaction {
    /// Create a transaction without an ID.
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            id: None,
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            timestamp,
        }
    }

    /// Validate the input contract.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransaction` when the sender or
    /// receiver is empty or the amount is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.sender.is_empty() {
            return Err(EngineError::invalid_transaction("sender must not be empty"));
        }
        if self.receiver.is_empty() {
            return Err(EngineError::invalid_transaction(
                "receiver must not be empty",
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(EngineError::invalid_transaction(format!(
                "amount must be positive and finite, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transaction() {
        let tx = Transaction::new("acct_a", "acct_b", 100.0, 1_700_000_000);
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_empty_sender_rejected() {
        let tx = Transaction::new("", "acct_b", 100.0, 1_700_000_000);
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_empty_receiver_rejected() {
        let tx = Transaction::new("acct_a", "", 100.0, 1_700_000_000);
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let tx = Transaction::new("acct_a", "acct_b", 0.0, 1_700_000_000);
        assert!(tx.validate().is_err());

        let tx = Transaction::new("acct_a", "acct_b", -5.0, 1_700_000_000);
        assert!(tx.validate().is_err());

        let tx = Transaction::new("acct_a", "acct_b", f64::NAN, 1_700_000_000);
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{"id":"tx-1","sender":"A","receiver":"B","amount":42.5,"timestamp":1700000000}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id.as_deref(), Some("tx-1"));
        assert_eq!(tx.sender, "A");
        assert_eq!(tx.amount, 42.5);

        let json_no_id = r#"{"sender":"A","receiver":"B","amount":1.0,"timestamp":0}"#;
        let tx: Transaction = serde_json::from_str(json_no_id).unwrap();
        assert!(tx.id.is_none());
    }
}
