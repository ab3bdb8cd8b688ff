//! Deployment parameters used throughout the tests.

use {
    alloy_primitives::{Address, address},
    model::DomainSeparator,
};

/// Chain the test domain is bound to.
pub const CHAIN_ID: u64 = 1;

/// Address of the exchange contract that verifies order signatures.
pub const EXCHANGE: Address = address!("9757F2d2b135150BBeb65308D4a91804107cd8D6");

/// Receiver of the protocol fee.
pub const FEE_RECEIVER: Address = address!("1cf0dF2A5A20Cd61d68d4489eEBbf85b8d39e18a");

/// The EIP-712 domain of [`EXCHANGE`] on [`CHAIN_ID`].
pub fn domain() -> DomainSeparator {
    DomainSeparator::new(CHAIN_ID, EXCHANGE)
}
