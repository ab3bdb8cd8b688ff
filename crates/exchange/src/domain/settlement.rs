//! Settlement of a pair of orders: authenticate, match, fill and transfer as a
//! single unit of work against the ledger.

use {
    super::{
        error::{AssetSide, CancelError, Error, Side},
        fill,
        ledger::{Ledger, Transaction},
        matcher::AssetMatcher,
        transfer::{DealSide, Receipt, TransferManager},
        validator::OrderValidator,
    },
    crate::infra::observe,
    alloy_primitives::{Address, U256},
    model::{
        asset::Asset,
        order::{FillSide, Order, OrderData, OrderKey, SignedOrder},
    },
    std::sync::Arc,
};

pub struct Exchange<L> {
    matcher: AssetMatcher,
    validator: OrderValidator,
    transfers: TransferManager,
    ledger: Arc<L>,
}

impl<L: Ledger> Exchange<L> {
    pub fn new(
        matcher: AssetMatcher,
        validator: OrderValidator,
        transfers: TransferManager,
        ledger: Arc<L>,
    ) -> Self {
        Self {
            matcher,
            validator,
            transfers,
            ledger,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Settles `left` against `right` on behalf of `sender`.
    ///
    /// Either every fill update and transfer is applied or, on error, none of
    /// them.
    pub fn match_orders(
        &self,
        left: &SignedOrder,
        right: &SignedOrder,
        sender: Address,
    ) -> Result<Receipt, Error> {
        let left_key = left.order.key();
        let right_key = right.order.key();
        let span = tracing::info_span!("settlement", left = %left_key, right = %right_key);
        let _guard = span.enter();

        observe::settling();
        let result = self.settle(left, right, left_key, right_key, sender);
        match &result {
            Ok(receipt) => observe::settled(receipt),
            Err(err) => observe::rejected(err),
        }
        result
    }

    fn settle(
        &self,
        left: &SignedOrder,
        right: &SignedOrder,
        left_key: OrderKey,
        right_key: OrderKey,
        sender: Address,
    ) -> Result<Receipt, Error> {
        if left_key == right_key {
            return Err(Error::SameOrder);
        }
        self.validator
            .validate(&left.order, &left.signature, sender)
            .map_err(|source| Error::Auth {
                side: Side::Left,
                source,
            })?;
        self.validator
            .validate(&right.order, &right.signature, sender)
            .map_err(|source| Error::Auth {
                side: Side::Right,
                source,
            })?;
        check_taker(&left.order, &right.order, Side::Left)?;
        check_taker(&right.order, &left.order, Side::Right)?;

        let make_match = self
            .matcher
            .match_assets(
                &left.order.make_asset.asset_type,
                &right.order.take_asset.asset_type,
            )
            .ok_or(Error::IncompatibleAssets {
                side: AssetSide::Make,
            })?;
        let take_match = self
            .matcher
            .match_assets(
                &left.order.take_asset.asset_type,
                &right.order.make_asset.asset_type,
            )
            .ok_or(Error::IncompatibleAssets {
                side: AssetSide::Take,
            })?;
        observe::matched_assets(&make_match, &take_match);

        let left_data = left.order.parse_data().map_err(|source| Error::OrderData {
            side: Side::Left,
            source,
        })?;
        let right_data = right.order.parse_data().map_err(|source| Error::OrderData {
            side: Side::Right,
            source,
        })?;

        self.ledger.transaction(|tx| {
            let left_recorded = recorded_fill(tx, &left.order, &left_key);
            let right_recorded = recorded_fill(tx, &right.order, &right_key);
            let fill = fill::fill_order(
                &left.order,
                &right.order,
                left_recorded,
                right_recorded,
                left_data.fill_side(),
                right_data.fill_side(),
            )?;
            if fill.is_empty() {
                return Err(Error::NothingToFill);
            }

            let left_fill = record_fill(
                tx,
                &left.order,
                left_key,
                left_recorded,
                left_data.fill_side(),
                fill.left_value,
                fill.right_value,
            )?;
            let right_fill = record_fill(
                tx,
                &right.order,
                right_key,
                right_recorded,
                right_data.fill_side(),
                fill.right_value,
                fill.left_value,
            )?;
            observe::filled(&fill, left_fill, right_fill);

            let left_side = deal_side(
                left_key,
                &left.order,
                &left_data,
                Asset::new(make_match.clone(), fill.left_value),
            );
            let right_side = deal_side(
                right_key,
                &right.order,
                &right_data,
                Asset::new(take_match.clone(), fill.right_value),
            );
            Ok(self.transfers.do_transfers(tx, &left_side, &right_side)?)
        })
    }

    /// Marks `order` as completely filled so that it can no longer be
    /// matched. Returns the new fill.
    pub fn cancel(&self, order: &Order, sender: Address) -> Result<U256, Error> {
        let key = order.key();
        let result = self.cancel_inner(order, key, sender);
        match &result {
            Ok(fill) => observe::cancelled(&key, *fill),
            Err(err) => observe::cancel_rejected(&key, err),
        }
        result
    }

    fn cancel_inner(&self, order: &Order, key: OrderKey, sender: Address) -> Result<U256, Error> {
        if sender != order.maker {
            return Err(CancelError::NotMaker.into());
        }
        if order.salt.is_zero() {
            return Err(CancelError::ZeroSalt.into());
        }
        let data = order.parse_data().map_err(CancelError::OrderData)?;
        let total = match data.fill_side() {
            FillSide::Make => order.make_asset.value,
            FillSide::Take => order.take_asset.value,
        };
        self.ledger.transaction(|tx| {
            let fill = tx.fill(&key).max(total);
            tx.set_fill(key, fill);
            Ok(fill)
        })
    }
}

/// An order restricted to a taker only matches orders of that taker.
fn check_taker(order: &Order, counter: &Order, side: Side) -> Result<(), Error> {
    if !order.taker.is_zero() && order.taker != counter.maker {
        return Err(Error::TakerMismatch { side });
    }
    Ok(())
}

/// Orders without salt have no fill state and always start from scratch.
fn recorded_fill(tx: &dyn Transaction, order: &Order, key: &OrderKey) -> U256 {
    if order.salt.is_zero() {
        U256::ZERO
    } else {
        tx.fill(key)
    }
}

/// Adds what `order` gave (`given`) or received (`received`) to the fill
/// `recorded` before the match, depending on the side it tracks. Returns the
/// new fill.
fn record_fill(
    tx: &mut dyn Transaction,
    order: &Order,
    key: OrderKey,
    recorded: U256,
    side: FillSide,
    given: U256,
    received: U256,
) -> Result<U256, Error> {
    let amount = match side {
        FillSide::Make => given,
        FillSide::Take => received,
    };
    if order.salt.is_zero() {
        return Ok(amount);
    }
    let fill = recorded
        .checked_add(amount)
        .ok_or(fill::FillError::Overflow)?;
    tx.set_fill(key, fill);
    Ok(fill)
}

fn deal_side(key: OrderKey, order: &Order, data: &OrderData, asset: Asset) -> DealSide {
    DealSide {
        key,
        asset,
        payouts: data.payouts_or(order.maker),
        origin_fees: data.origin_fees.clone(),
        from: order.maker,
        max_fees_bps: data.max_fees_bps,
    }
}
