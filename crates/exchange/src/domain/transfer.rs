//! Moves the assets of a matched pair of orders and takes the protocol fee,
//! royalties and origin fees out of the payment.

use {
    super::{
        fees::{FeeConfig, FeeSide, MarketPhase},
        fill::FillResult,
        ledger::{LedgerError, Transaction},
        royalties::{self, RoyaltyError, RoyaltyRegistry},
    },
    alloy_primitives::{Address, U256},
    model::{
        asset::{Asset, AssetClass, AssetData, AssetType, CodecError},
        order::OrderKey,
        part::{self, Part},
    },
    number::{BASIS_POINTS, MathError, serialization::HexOrDecimalU256, u256_ext::U256Ext},
    serde::Serialize,
    serde_with::serde_as,
    std::sync::Arc,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("royalties of {total_bps} bps on {token} exceed the ceiling")]
    RoyaltiesTooHigh { token: Address, total_bps: u64 },
    #[error("payouts sum up to {total_bps} bps instead of 10000")]
    InvalidPayouts { total_bps: u64 },
    #[error("fees of {total_bps} bps exceed the order maximum of {max_bps} bps")]
    MaxFeesExceeded { max_bps: u64, total_bps: u64 },
    #[error("{kind} transfer to {to} failed: {source}")]
    Failed {
        kind: LegKind,
        to: Address,
        source: LedgerError,
    },
    #[error("transfer amount overflows")]
    Overflow,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<RoyaltyError> for TransferError {
    fn from(err: RoyaltyError) -> Self {
        match err {
            RoyaltyError::TooHigh { token, total_bps } => {
                Self::RoyaltiesTooHigh { token, total_bps }
            }
            RoyaltyError::Codec(err) => Self::Codec(err),
        }
    }
}

impl From<MathError> for TransferError {
    fn from(_: MathError) -> Self {
        Self::Overflow
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum LegKind {
    #[display("payout")]
    Payout,
    #[display("protocol fee")]
    ProtocolFee,
    #[display("royalty")]
    Royalty,
    #[display("origin fee")]
    OriginFee,
}

/// One executed transfer.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub kind: LegKind,
    pub asset_type: AssetType,
    pub from: Address,
    pub to: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub value: U256,
}

/// Record of a settlement: every executed leg in execution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub left: OrderKey,
    pub right: OrderKey,
    pub fill: FillResult,
    pub fee_side: FeeSide,
    pub phase: MarketPhase,
    pub legs: Vec<Leg>,
}

/// One side of a matched pair: what it gives and who benefits from what it
/// gets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealSide {
    pub key: OrderKey,
    /// The matched asset type and the amount given.
    pub asset: Asset,
    /// Receivers of what the counter side gives.
    pub payouts: Vec<Part>,
    pub origin_fees: Vec<Part>,
    pub from: Address,
    pub max_fees_bps: Option<u64>,
}

pub struct TransferManager {
    fees: FeeConfig,
    royalties_ceiling_bps: u64,
    registry: Arc<dyn RoyaltyRegistry>,
}

impl TransferManager {
    pub fn new(
        fees: FeeConfig,
        royalties_ceiling_bps: u16,
        registry: Arc<dyn RoyaltyRegistry>,
    ) -> Self {
        Self {
            fees,
            royalties_ceiling_bps: u64::from(royalties_ceiling_bps),
            registry,
        }
    }

    /// Executes all transfers of a matched pair against `tx`.
    ///
    /// If a side pays with native currency, fungible or semi-fungible tokens,
    /// fees are taken from that payment before it reaches the counter side.
    /// Otherwise both assets are swapped as is.
    pub fn do_transfers(
        &self,
        tx: &mut dyn Transaction,
        left: &DealSide,
        right: &DealSide,
    ) -> Result<Receipt, TransferError> {
        validate_payouts(&left.payouts)?;
        validate_payouts(&right.payouts)?;

        let fee_side = FeeSide::of(left.asset.asset_type.class, right.asset.asset_type.class);
        let mut legs = Legs::new(tx);
        let phase = match fee_side {
            FeeSide::Left => self.transfer_with_fees(&mut legs, left, right)?,
            FeeSide::Right => self.transfer_with_fees(&mut legs, right, left)?,
            FeeSide::None => {
                legs.asset_payouts(&left.asset, left.from, &right.payouts)?;
                legs.asset_payouts(&right.asset, right.from, &left.payouts)?;
                if left.asset.asset_type.class.is_lazy() || right.asset.asset_type.class.is_lazy()
                {
                    MarketPhase::Primary
                } else {
                    MarketPhase::Secondary
                }
            }
        };

        Ok(Receipt {
            left: left.key,
            right: right.key,
            fill: FillResult {
                left_value: left.asset.value,
                right_value: right.asset.value,
            },
            fee_side,
            phase,
            legs: legs.executed,
        })
    }

    fn transfer_with_fees(
        &self,
        legs: &mut Legs<'_>,
        payment: &DealSide,
        nft: &DealSide,
    ) -> Result<MarketPhase, TransferError> {
        let phase = MarketPhase::of(&nft.asset.asset_type);
        let protocol_fee_bps = self.fees.protocol_fee_bps(phase);
        let royalties = royalties::resolve(
            self.registry.as_ref(),
            &nft.asset.asset_type,
            payment.asset.value,
            self.royalties_ceiling_bps,
        )?;
        check_max_fees(payment, nft, protocol_fee_bps)?;

        let currency = &payment.asset.asset_type;
        let value = payment.asset.value;
        let from = payment.from;
        let mut rest = value;

        let fee = rest.deduct_capped(value.bps(protocol_fee_bps)?);
        legs.transfer(
            LegKind::ProtocolFee,
            currency,
            fee,
            from,
            self.fees.fee_receiver,
        )?;

        if phase == MarketPhase::Secondary {
            for royalty in &royalties {
                for part in &royalty.parts {
                    let amount = rest.deduct_capped(royalty.share.bps(part.value.into())?);
                    legs.transfer(LegKind::Royalty, currency, amount, from, part.account)?;
                }
            }
        }

        // paid by the payer on top of the payment
        for fee in &payment.origin_fees {
            let amount = value.bps(fee.value.into())?;
            legs.transfer(LegKind::OriginFee, currency, amount, from, fee.account)?;
        }
        // paid by the seller out of the payment
        for fee in &nft.origin_fees {
            let amount = rest.deduct_capped(value.bps(fee.value.into())?);
            legs.transfer(LegKind::OriginFee, currency, amount, from, fee.account)?;
        }

        legs.payouts(currency, rest, from, &nft.payouts)?;
        legs.asset_payouts(&nft.asset, nft.from, &payment.payouts)?;
        Ok(phase)
    }
}

fn validate_payouts(payouts: &[Part]) -> Result<(), TransferError> {
    let total_bps = part::total_bps(payouts);
    if total_bps != BASIS_POINTS {
        return Err(TransferError::InvalidPayouts { total_bps });
    }
    Ok(())
}

/// Sell orders may cap the protocol fee and all origin fees together.
fn check_max_fees(
    payment: &DealSide,
    nft: &DealSide,
    protocol_fee_bps: u64,
) -> Result<(), TransferError> {
    let total_bps = protocol_fee_bps
        + part::total_bps(&payment.origin_fees)
        + part::total_bps(&nft.origin_fees);
    for max_bps in [payment.max_fees_bps, nft.max_fees_bps].into_iter().flatten() {
        if total_bps > max_bps {
            return Err(TransferError::MaxFeesExceeded { max_bps, total_bps });
        }
    }
    Ok(())
}

/// Executes transfers and records them as legs.
struct Legs<'a> {
    tx: &'a mut dyn Transaction,
    executed: Vec<Leg>,
}

impl<'a> Legs<'a> {
    fn new(tx: &'a mut dyn Transaction) -> Self {
        Self {
            tx,
            executed: Vec::new(),
        }
    }

    fn transfer(
        &mut self,
        kind: LegKind,
        asset_type: &AssetType,
        value: U256,
        from: Address,
        to: Address,
    ) -> Result<(), TransferError> {
        if value.is_zero() {
            return Ok(());
        }
        self.tx
            .transfer(asset_type, value, from, to)
            .map_err(|source| TransferError::Failed { kind, to, source })?;
        tracing::debug!(%kind, class = %asset_type.class, %from, %to, %value, "transferred");
        self.executed.push(Leg {
            kind,
            asset_type: asset_type.clone(),
            from,
            to,
            value,
        });
        Ok(())
    }

    /// Splits `amount` across `payouts` by their basis points. The last
    /// payout receives what rounding leaves over.
    fn payouts(
        &mut self,
        asset_type: &AssetType,
        amount: U256,
        from: Address,
        payouts: &[Part],
    ) -> Result<(), TransferError> {
        let mut rest = amount;
        for (i, payout) in payouts.iter().enumerate() {
            let value = if i + 1 == payouts.len() {
                std::mem::take(&mut rest)
            } else {
                rest.deduct_capped(amount.bps(payout.value.into())?)
            };
            self.transfer(LegKind::Payout, asset_type, value, from, payout.account)?;
        }
        Ok(())
    }

    /// Transfers a traded asset to the payouts of the counter side.
    /// Indivisible assets go to the last payout as a whole and bundles are
    /// transferred item by item.
    fn asset_payouts(
        &mut self,
        asset: &Asset,
        from: Address,
        payouts: &[Part],
    ) -> Result<(), TransferError> {
        let Some(receiver) = payouts.last() else {
            return Ok(());
        };
        match asset.asset_type.class {
            AssetClass::BUNDLE => {
                let AssetData::Bundle(items) = asset.asset_type.decode()? else {
                    return Ok(());
                };
                for item in items {
                    let value = item
                        .value
                        .checked_mul(asset.value)
                        .ok_or(TransferError::Overflow)?;
                    self.transfer(
                        LegKind::Payout,
                        &item.asset_type,
                        value,
                        from,
                        receiver.account,
                    )?;
                }
                Ok(())
            }
            AssetClass::ERC721 | AssetClass::ERC721_LAZY => self.transfer(
                LegKind::Payout,
                &asset.asset_type,
                asset.value,
                from,
                receiver.account,
            ),
            _ => self.payouts(&asset.asset_type, asset.value, from, payouts),
        }
    }
}
