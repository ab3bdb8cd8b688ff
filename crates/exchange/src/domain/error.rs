use {
    super::{fill::FillError, transfer::TransferError, validator::AuthError},
    model::order::OrderDataError,
    thiserror::Error,
};

/// Position of an order in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Side {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

/// Which pair of asset types failed to match: the left make against the
/// right take, or the left take against the right make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum AssetSide {
    #[display("make")]
    Make,
    #[display("take")]
    Take,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{side} order is not authorized: {source}")]
    Auth { side: Side, source: AuthError },
    #[error("{side} order is restricted to another taker")]
    TakerMismatch { side: Side },
    #[error("{side} assets of the orders do not match")]
    IncompatibleAssets { side: AssetSide },
    #[error("{side} order data is invalid: {source}")]
    OrderData {
        side: Side,
        source: OrderDataError,
    },
    #[error(transparent)]
    Fill(#[from] FillError),
    #[error("nothing left to fill")]
    NothingToFill,
    #[error("an order cannot be matched against itself")]
    SameOrder,
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Cancel(#[from] CancelError),
}

#[derive(Debug, Error)]
pub enum CancelError {
    #[error("only the maker can cancel an order")]
    NotMaker,
    #[error("orders without salt have no fill state to cancel")]
    ZeroSalt,
    #[error("order data is invalid: {0}")]
    OrderData(#[source] OrderDataError),
}
