//! The external state a settlement reads and mutates: token balances and the
//! fills of orders.

use {
    alloy_primitives::{Address, U256},
    model::{
        asset::{AssetClass, AssetType, CodecError},
        order::OrderKey,
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{owner} holds {balance} but {required} are required")]
    InsufficientBalance {
        owner: Address,
        balance: U256,
        required: U256,
    },
    #[error("{from} does not own token {token_id} of {token}")]
    NotOwner {
        token: Address,
        token_id: U256,
        from: Address,
    },
    #[error("only the first creator can mint token {token_id} of {token}")]
    NotCreator { token: Address, token_id: U256 },
    #[error("minting {token_id} of {token} would exceed its supply")]
    SupplyExceeded { token: Address, token_id: U256 },
    #[error("ledger cannot transfer {0} assets")]
    UnsupportedAsset(AssetClass),
    #[error("{0} is not a valid quantity of a non-fungible token")]
    InvalidQuantity(U256),
    #[error("crediting {value} to {owner} overflows their balance")]
    Overflow { owner: Address, value: U256 },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Staged view of the ledger inside a transaction.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Transaction {
    /// The cumulative fill of an order, `0` if it was never filled.
    fn fill(&self, key: &OrderKey) -> U256;

    fn set_fill(&mut self, key: OrderKey, fill: U256);

    /// Moves `value` units of a single (non-bundle) asset.
    fn transfer(
        &mut self,
        asset_type: &AssetType,
        value: U256,
        from: Address,
        to: Address,
    ) -> Result<(), LedgerError>;
}

/// Token ledgers and the fills ledger.
pub trait Ledger: Send + Sync {
    /// Runs `work` against a staged copy of the ledger. The staged writes are
    /// committed if `work` succeeds and discarded otherwise. Transactions are
    /// serialized.
    fn transaction<T, E>(
        &self,
        work: impl FnOnce(&mut dyn Transaction) -> Result<T, E>,
    ) -> Result<T, E>;
}
