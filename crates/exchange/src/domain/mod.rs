pub mod error;
pub mod fees;
pub mod fill;
pub mod ledger;
pub mod matcher;
pub mod royalties;
pub mod settlement;
pub mod transfer;
pub mod validator;

pub use {
    error::{AssetSide, CancelError, Error, Side},
    fees::{FeeConfig, FeeSide, MarketPhase},
    fill::{FillError, FillResult},
    ledger::{Ledger, LedgerError, Transaction},
    matcher::AssetMatcher,
    royalties::RoyaltyRegistry,
    settlement::Exchange,
    transfer::{Leg, LegKind, Receipt, TransferError, TransferManager},
    validator::{AuthError, Checks, OrderValidator, Signer},
};
