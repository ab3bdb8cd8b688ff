//! Which side of a match pays fees and at which protocol rate.

use {
    alloy_primitives::Address,
    model::asset::{AssetClass, AssetType},
    serde::Serialize,
};

/// The side whose asset is the payment that fees are taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeSide {
    Left,
    Right,
    /// Neither asset can carry fees, both are swapped as is.
    None,
}

impl FeeSide {
    /// Native currency takes precedence over fungible tokens which take
    /// precedence over semi-fungible tokens. Ties go to the left.
    pub fn of(left: AssetClass, right: AssetClass) -> Self {
        for class in [AssetClass::ETH, AssetClass::ERC20, AssetClass::ERC1155] {
            if left == class {
                return Self::Left;
            }
            if right == class {
                return Self::Right;
            }
        }
        Self::None
    }
}

/// Whether the non-payment asset is sold for the first time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPhase {
    Primary,
    Secondary,
}

impl MarketPhase {
    /// A lazily minted asset does not exist yet and is therefore sold by its
    /// creator.
    pub fn of(asset: &AssetType) -> Self {
        if asset.class.is_lazy() {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeConfig {
    pub protocol_fee_primary_bps: u16,
    pub protocol_fee_secondary_bps: u16,
    pub fee_receiver: Address,
}

impl FeeConfig {
    pub fn protocol_fee_bps(&self, phase: MarketPhase) -> u64 {
        u64::from(match phase {
            MarketPhase::Primary => self.protocol_fee_primary_bps,
            MarketPhase::Secondary => self.protocol_fee_secondary_bps,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{Bytes, U256},
        model::{asset::LazyMint, part::Part},
        testlib::{accounts, tokens},
    };

    #[test]
    fn fee_side_precedence() {
        use AssetClass as C;
        assert_eq!(FeeSide::of(C::ETH, C::ERC721), FeeSide::Left);
        assert_eq!(FeeSide::of(C::ERC721, C::ETH), FeeSide::Right);
        assert_eq!(FeeSide::of(C::ERC20, C::ETH), FeeSide::Right);
        assert_eq!(FeeSide::of(C::ERC20, C::ERC20), FeeSide::Left);
        assert_eq!(FeeSide::of(C::ERC1155, C::ERC20), FeeSide::Right);
        assert_eq!(FeeSide::of(C::ERC1155, C::ERC721), FeeSide::Left);
        assert_eq!(FeeSide::of(C::ERC721, C::ERC1155), FeeSide::Right);
        assert_eq!(FeeSide::of(C::ERC721, C::BUNDLE), FeeSide::None);
        assert_eq!(FeeSide::of(C::ERC721_LAZY, C::ERC721), FeeSide::None);
    }

    #[test]
    fn lazy_assets_are_primary() {
        let mint = LazyMint {
            token_id: U256::from(1),
            token_uri: String::new(),
            supply: Some(U256::from(10)),
            creators: vec![Part::new(accounts::carol().address(), 10_000)],
            royalties: vec![],
            signatures: vec![Bytes::new()],
        };
        assert_eq!(
            MarketPhase::of(&AssetType::erc1155_lazy(tokens::EDITIONS, &mint)),
            MarketPhase::Primary
        );
        assert_eq!(
            MarketPhase::of(&AssetType::erc1155(tokens::EDITIONS, U256::from(1))),
            MarketPhase::Secondary
        );
    }

    #[test]
    fn protocol_rate_by_phase() {
        let fees = FeeConfig {
            protocol_fee_primary_bps: 0,
            protocol_fee_secondary_bps: 250,
            fee_receiver: Address::ZERO,
        };
        assert_eq!(fees.protocol_fee_bps(MarketPhase::Primary), 0);
        assert_eq!(fees.protocol_fee_bps(MarketPhase::Secondary), 250);
    }
}
