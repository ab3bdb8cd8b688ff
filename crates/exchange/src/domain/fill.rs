//! Fill arithmetic: how much of an order is left and how much two orders
//! exchange when matched.

use {
    alloy_primitives::U256,
    model::order::{FillSide, Order},
    number::{
        MathError,
        math::{partial_amount_floor, safe_partial_amount_floor},
    },
    serde::Serialize,
    serde_with::serde_as,
    thiserror::Error,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FillError {
    #[error("fill {fill} exceeds the declared amount {total}")]
    FillExceedsOrder { fill: U256, total: U256 },
    #[error("price of the counter order is not acceptable")]
    FillCheckFailed,
    #[error("fill amount would lose 0.1% or more to rounding")]
    RoundingError,
    #[error("order declares a zero amount")]
    ZeroDenominator,
    #[error("fill amount overflows")]
    Overflow,
}

impl From<MathError> for FillError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::DivisionByZero => Self::ZeroDenominator,
            MathError::Overflow => Self::Overflow,
            MathError::RoundingError => Self::RoundingError,
        }
    }
}

/// What is left of an order given its current fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Remaining {
    pub make: U256,
    pub take: U256,
}

/// Amounts two matched orders exchange.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResult {
    /// Amount of the left order's make asset going to the right maker.
    #[serde_as(as = "number::serialization::HexOrDecimalU256")]
    pub left_value: U256,
    /// Amount of the right order's make asset going to the left maker.
    #[serde_as(as = "number::serialization::HexOrDecimalU256")]
    pub right_value: U256,
}

impl FillResult {
    pub fn is_empty(&self) -> bool {
        self.left_value.is_zero() || self.right_value.is_zero()
    }
}

/// Computes the remaining make and take amounts of `order` after `fill` was
/// consumed on `side`. The untracked side is derived at the order's ratio,
/// rounding down.
pub fn calculate_remaining(
    order: &Order,
    fill: U256,
    side: FillSide,
) -> Result<Remaining, FillError> {
    let (total, other) = match side {
        FillSide::Make => (order.make_asset.value, order.take_asset.value),
        FillSide::Take => (order.take_asset.value, order.make_asset.value),
    };
    if fill > total {
        return Err(FillError::FillExceedsOrder { fill, total });
    }
    if fill == total {
        return Ok(Remaining::default());
    }

    let tracked = total - fill;
    let derived = partial_amount_floor(tracked, total, other)?;
    Ok(match side {
        FillSide::Make => Remaining {
            make: tracked,
            take: derived,
        },
        FillSide::Take => Remaining {
            make: derived,
            take: tracked,
        },
    })
}

/// Computes the amounts exchanged when `left` is matched against `right`.
///
/// The order whose remaining amounts bind is filled completely at its own
/// remaining amounts, the other one at most to the extent its declared price
/// allows. Prices worse than declared fail with
/// [`FillError::FillCheckFailed`].
pub fn fill_order(
    left: &Order,
    right: &Order,
    left_fill: U256,
    right_fill: U256,
    left_side: FillSide,
    right_side: FillSide,
) -> Result<FillResult, FillError> {
    let left_remaining = calculate_remaining(left, left_fill, left_side)?;
    let right_remaining = calculate_remaining(right, right_fill, right_side)?;

    if right_remaining.take > left_remaining.make {
        fill_left(
            left_remaining,
            right.make_asset.value,
            right.take_asset.value,
        )
    } else {
        fill_right(
            left.make_asset.value,
            left.take_asset.value,
            right_remaining,
        )
    }
}

/// The left order is filled completely. What the right order takes for the
/// left's remaining take at its own price must fit into the left's remaining
/// make.
fn fill_left(
    left: Remaining,
    right_make: U256,
    right_take: U256,
) -> Result<FillResult, FillError> {
    let right_take = safe_partial_amount_floor(left.take, right_make, right_take)?;
    if right_take > left.make {
        return Err(FillError::FillCheckFailed);
    }
    Ok(FillResult {
        left_value: left.make,
        right_value: left.take,
    })
}

/// The right order is filled completely. What the left order asks for the
/// right's remaining take at its own price must fit into the right's
/// remaining make.
fn fill_right(
    left_make: U256,
    left_take: U256,
    right: Remaining,
) -> Result<FillResult, FillError> {
    let left_take = safe_partial_amount_floor(right.take, left_make, left_take)?;
    if left_take > right.make {
        return Err(FillError::FillCheckFailed);
    }
    Ok(FillResult {
        left_value: right.take,
        right_value: left_take,
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        model::{
            asset::{Asset, AssetType},
            order::DataKind,
        },
        testlib::{accounts, tokens},
    };

    fn u(value: u64) -> U256 {
        U256::from(value)
    }

    fn order(make: u64, take: u64) -> Order {
        Order::new(
            accounts::alice().address(),
            Asset::new(AssetType::erc20(tokens::WETH), u(make)),
            Asset::new(AssetType::erc20(tokens::DAI), u(take)),
            u(1),
            DataKind::DEFAULT,
            Vec::new(),
        )
    }

    fn fill(left: &Order, right: &Order) -> Result<FillResult, FillError> {
        fill_order(left, right, U256::ZERO, U256::ZERO, FillSide::Take, FillSide::Take)
    }

    #[test]
    fn remaining_of_take_tracked_order() {
        assert_eq!(
            calculate_remaining(&order(100, 200), u(20), FillSide::Take),
            Ok(Remaining {
                make: u(90),
                take: u(180)
            })
        );
    }

    #[test]
    fn remaining_of_make_tracked_order() {
        assert_eq!(
            calculate_remaining(&order(100, 200), u(30), FillSide::Make),
            Ok(Remaining {
                make: u(70),
                take: u(140)
            })
        );
    }

    #[test]
    fn remaining_rounds_down() {
        assert_eq!(
            calculate_remaining(&order(10, 3), u(1), FillSide::Take),
            Ok(Remaining {
                make: u(6),
                take: u(2)
            })
        );
    }

    #[test]
    fn exhausted_order_has_nothing_left() {
        assert_eq!(
            calculate_remaining(&order(100, 200), u(200), FillSide::Take),
            Ok(Remaining::default())
        );
        assert_eq!(
            calculate_remaining(&order(0, 0), U256::ZERO, FillSide::Make),
            Ok(Remaining::default())
        );
    }

    #[test]
    fn overfilled_order_is_rejected() {
        assert_eq!(
            calculate_remaining(&order(100, 200), u(220), FillSide::Take),
            Err(FillError::FillExceedsOrder {
                fill: u(220),
                total: u(200)
            })
        );
    }

    #[test]
    fn right_order_filled_completely() {
        let result = fill(&order(100, 200), &order(100, 50)).unwrap();
        assert_eq!(
            result,
            FillResult {
                left_value: u(50),
                right_value: u(100)
            }
        );
    }

    #[test]
    fn worse_counter_price_fails() {
        assert_eq!(
            fill(&order(100, 200), &order(99, 50)),
            Err(FillError::FillCheckFailed)
        );
    }

    #[test]
    fn left_order_filled_completely() {
        // right wants more than left offers, left is the binding order
        let result = fill(&order(10, 20), &order(100, 50)).unwrap();
        assert_eq!(
            result,
            FillResult {
                left_value: u(10),
                right_value: u(20)
            }
        );
        // right asks 25 for the 20 left wants, more than the 10 left offers
        assert_eq!(
            fill(&order(10, 20), &order(40, 50)),
            Err(FillError::FillCheckFailed)
        );
    }

    #[test]
    fn exact_match() {
        let result = fill(&order(100, 200), &order(200, 100)).unwrap();
        assert_eq!(
            result,
            FillResult {
                left_value: u(100),
                right_value: u(200)
            }
        );
    }

    #[test]
    fn better_counter_price_benefits_the_filled_order() {
        // right offers 300 for 100 while left only asks 200 for 100
        let result = fill(&order(100, 200), &order(300, 100)).unwrap();
        assert_eq!(result.left_value, u(100));
        assert_eq!(result.right_value, u(200));
    }

    #[test]
    fn partially_filled_orders() {
        let left = order(100, 200);
        let right = order(100, 50);
        // left already received 180 of its 200, only 10 make are left
        let result = fill_order(&left, &right, u(180), U256::ZERO, FillSide::Take, FillSide::Take)
            .unwrap();
        assert_eq!(
            result,
            FillResult {
                left_value: u(10),
                right_value: u(20)
            }
        );
        // both exhausted
        let result = fill_order(&left, &right, u(200), u(50), FillSide::Take, FillSide::Take)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn rounding_errors_are_rejected() {
        // 1 * 2 / 3 loses a third of the value
        assert_eq!(
            fill(&order(3, 2), &order(1, 1)),
            Err(FillError::RoundingError)
        );
    }

    #[test]
    fn price_invariant_holds() {
        for left_make in [1u64, 7, 100, 1_000] {
            for left_take in [1u64, 3, 50, 999] {
                for right_make in [1u64, 9, 100, 2_000] {
                    for right_take in [1u64, 5, 60, 1_000] {
                        let left = order(left_make, left_take);
                        let right = order(right_make, right_take);
                        let Ok(result) = fill(&left, &right) else {
                            continue;
                        };
                        // neither side gets a worse price than declared, up
                        // to the tolerated rounding loss
                        assert!(
                            result.right_value * u(left_make) * u(1000)
                                >= result.left_value * u(left_take) * u(999),
                            "{left_make}/{left_take} vs {right_make}/{right_take}: {result:?}"
                        );
                        assert!(
                            result.left_value * u(right_make) * u(1000)
                                >= result.right_value * u(right_take) * u(999),
                            "{left_make}/{left_take} vs {right_make}/{right_take}: {result:?}"
                        );
                        assert!(result.right_value <= u(right_make));
                        assert!(result.left_value <= u(left_make));
                    }
                }
            }
        }
    }
}
