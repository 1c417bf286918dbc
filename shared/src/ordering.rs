//! Receipt arithmetic for the order lifecycle
//!
//! A part's ordering sub-state is derived from its quantity fields rather
//! than stored: unordered (ordered ≤ 0), ordered (ordered > 0, outstanding
//! > 0), partially received (received > 0, outstanding > 0), and back to
//! unordered once everything has been received. These helpers express the
//! transitions so the storage layer can mirror them in single conditional
//! statements.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Receipt operations rejected before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    #[error("nothing to receive: no open order on this part")]
    NothingToReceive,
    #[error("received quantity {qty} exceeds outstanding quantity {outstanding}")]
    QuantityOutOfRange { qty: i32, outstanding: i32 },
}

/// Field values after a total receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalReceipt {
    pub on_hand: i32,
    pub quantity_received: i32,
}

/// Field values after a partial receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartialReceipt {
    pub on_hand: i32,
    pub received: i32,
    pub outstanding: i32,
}

/// Apply a total receipt: the full ordered quantity lands in inventory and
/// the ordering fields are cleared. Receiving closes the cycle, so the
/// caller is expected to also reset the approval status.
pub fn total_receipt(on_hand: i32, quantity_ordered: i32) -> Result<TotalReceipt, ReceiptError> {
    if quantity_ordered <= 0 {
        return Err(ReceiptError::NothingToReceive);
    }
    Ok(TotalReceipt {
        on_hand: on_hand + quantity_ordered,
        quantity_received: quantity_ordered,
    })
}

/// Apply a partial receipt of `qty` units against the outstanding amount.
/// Outstanding is floored at zero; a quantity above it is rejected outright
/// rather than clamped so over-receipts surface to the caller.
pub fn partial_receipt(
    on_hand: i32,
    received: i32,
    outstanding: i32,
    qty: i32,
) -> Result<PartialReceipt, ReceiptError> {
    if qty <= 0 || qty > outstanding {
        return Err(ReceiptError::QuantityOutOfRange { qty, outstanding });
    }
    Ok(PartialReceipt {
        on_hand: on_hand + qty,
        received: received + qty,
        outstanding: (outstanding - qty).max(0),
    })
}

/// Delay between commit and receipt, in whole days. Stamped on the matching
/// open history entry when a total receipt closes it.
pub fn delay_days(committed: DateTime<Utc>, received: DateTime<Utc>) -> i64 {
    (received - committed).num_days()
}
