//! Observability of the exchange. Each function represents an event that is
//! meaningful to the system and logs it when it occurs.

use {
    crate::domain::{Error, FillResult, Receipt},
    alloy_primitives::U256,
    model::{asset::AssetType, order::OrderKey},
};

/// Observe that a settlement is about to start.
pub fn settling() {
    tracing::trace!("settling");
}

/// Observe the asset types both orders agreed on.
pub fn matched_assets(make: &AssetType, take: &AssetType) {
    tracing::debug!(?make, ?take, "matched assets");
}

/// Observe the amounts the orders exchange and their new fills.
pub fn filled(fill: &FillResult, left_fill: U256, right_fill: U256) {
    tracing::debug!(?fill, %left_fill, %right_fill, "computed fill");
}

/// Observe a successful settlement.
pub fn settled(receipt: &Receipt) {
    for leg in &receipt.legs {
        tracing::debug!(?leg, "executed leg");
    }
    tracing::info!(
        fee_side = ?receipt.fee_side,
        phase = ?receipt.phase,
        left_value = %receipt.fill.left_value,
        right_value = %receipt.fill.right_value,
        legs = receipt.legs.len(),
        "settled orders"
    );
}

/// Observe that a settlement was rejected.
pub fn rejected(err: &Error) {
    tracing::debug!(?err, "settlement rejected");
}

/// Observe a cancelled order.
pub fn cancelled(key: &OrderKey, fill: U256) {
    tracing::info!(%key, %fill, "cancelled order");
}

/// Observe that a cancellation was rejected.
pub fn cancel_rejected(key: &OrderKey, err: &Error) {
    tracing::debug!(%key, ?err, "cancellation rejected");
}
