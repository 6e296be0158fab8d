//! Payment-gateway transaction references.
//!
//! The gateway hands back a `txnRef` of the form `<timestamp>_<orderId>`. Only the
//! segment after the final underscore matters here: it is the decimal order id.
//! The string is decoded into an [`OrderId`] as soon as it enters the crate.

use crate::model::OrderId;
use thiserror::Error;

const SEPARATOR: char = '_';

/// Why a transaction reference could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TxnRefError {
    /// The reference has no `_` separator.
    #[error("transaction reference has no separator: {0:?}")]
    MissingSeparator(String),

    /// The trailing segment is not a decimal order id.
    #[error("transaction reference has a non-numeric order id: {0:?}")]
    InvalidOrderId(String),
}

/// Decodes the order id carried by a gateway transaction reference.
///
/// ```
/// use order_cache::model::OrderId;
/// use order_cache::txn_ref::parse_txn_ref;
///
/// assert_eq!(parse_txn_ref("20250821160529_7"), Ok(OrderId(7)));
/// assert!(parse_txn_ref("2025_abc").is_err());
/// ```
pub fn parse_txn_ref(txn_ref: &str) -> Result<OrderId, TxnRefError> {
    let Some((_, last)) = txn_ref.rsplit_once(SEPARATOR) else {
        return Err(TxnRefError::MissingSeparator(txn_ref.to_string()));
    };
    // `+7` parses as a u64 but is not something the gateway emits
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TxnRefError::InvalidOrderId(last.to_string()));
    }
    last.parse::<OrderId>()
        .map_err(|_| TxnRefError::InvalidOrderId(last.to_string()))
}

/// Same as [`parse_txn_ref`], but logs the failure at warn and returns `None`.
pub fn decode_or_warn(txn_ref: &str) -> Option<OrderId> {
    match parse_txn_ref(txn_ref) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(txn_ref, error = %e, "Ignoring malformed transaction reference");
            None
        }
    }
}
