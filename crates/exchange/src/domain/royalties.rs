//! Royalties owed to creators when an asset is sold.

use {
    alloy_primitives::{Address, U256},
    model::{
        asset::{AssetData, AssetType, BundleItem, CodecError},
        part::{self, Part},
    },
    thiserror::Error,
};

/// Query interface of an external royalty registry.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait RoyaltyRegistry: Send + Sync {
    /// Royalties of a single token, or of the whole collection if `token_id`
    /// is `None`.
    fn royalties_for(&self, token: Address, token_id: Option<U256>) -> Vec<Part>;
}

#[derive(Debug, Error)]
pub enum RoyaltyError {
    #[error("royalties of {total_bps} bps on {token} exceed the ceiling")]
    TooHigh { token: Address, total_bps: u64 },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Royalties of one asset sold for `share` of the payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Royalties {
    pub parts: Vec<Part>,
    /// The part of the payment the royalties are computed on.
    pub share: U256,
}

/// Resolves the royalties of the non-payment asset of a trade paid with
/// `payment`.
///
/// Lazily minted assets carry their royalties inline, regular tokens are
/// looked up in the registry and bundles are resolved item by item, each item
/// accounting for its share of `payment` weighted by its quantity. Every asset
/// has its royalties checked against `ceiling_bps`.
pub fn resolve(
    registry: &dyn RoyaltyRegistry,
    asset: &AssetType,
    payment: U256,
    ceiling_bps: u64,
) -> Result<Vec<Royalties>, RoyaltyError> {
    match asset.decode()? {
        AssetData::Bundle(items) => {
            let shares = bundle_shares(&items, payment);
            items
                .iter()
                .zip(shares)
                .map(|(item, share)| {
                    let parts = lookup(registry, &item.asset_type.decode()?, ceiling_bps)?;
                    Ok(Royalties { parts, share })
                })
                .collect()
        }
        data => Ok(vec![Royalties {
            parts: lookup(registry, &data, ceiling_bps)?,
            share: payment,
        }]),
    }
}

fn lookup(
    registry: &dyn RoyaltyRegistry,
    data: &AssetData,
    ceiling_bps: u64,
) -> Result<Vec<Part>, RoyaltyError> {
    let (token, parts) = match data {
        AssetData::Erc721Lazy { token, mint } | AssetData::Erc1155Lazy { token, mint } => {
            (*token, mint.royalties.clone())
        }
        AssetData::Erc721 { token, token_id } | AssetData::Erc1155 { token, token_id } => {
            (*token, registry.royalties_for(*token, Some(*token_id)))
        }
        _ => return Ok(Vec::new()),
    };
    let total_bps = part::total_bps(&parts);
    if total_bps > ceiling_bps {
        return Err(RoyaltyError::TooHigh { token, total_bps });
    }
    Ok(parts)
}

/// Splits `payment` across bundle items proportionally to their quantities.
/// The last item receives what rounding leaves over.
fn bundle_shares(items: &[BundleItem], payment: U256) -> Vec<U256> {
    let total = items
        .iter()
        .fold(U256::ZERO, |total, item| total.saturating_add(item.value));
    let mut left = payment;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let share = if i + 1 == items.len() {
                left
            } else {
                number::math::mul_ratio(payment, item.value, total)
                    .unwrap_or_default()
                    .min(left)
            };
            left -= share;
            share
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::Bytes,
        model::asset::LazyMint,
        testlib::{accounts, tokens},
    };

    fn u(value: u64) -> U256 {
        U256::from(value)
    }

    fn registry(parts: Vec<Part>) -> MockRoyaltyRegistry {
        let mut registry = MockRoyaltyRegistry::new();
        registry
            .expect_royalties_for()
            .returning(move |_, _| parts.clone());
        registry
    }

    #[test]
    fn registry_royalties_by_token_id() {
        let creator = accounts::carol().address();
        let mut registry = MockRoyaltyRegistry::new();
        registry
            .expect_royalties_for()
            .withf(|token, id| *token == tokens::ART && *id == Some(U256::from(3)))
            .times(1)
            .returning(move |_, _| vec![Part::new(creator, 1_000)]);

        let royalties = resolve(
            &registry,
            &AssetType::erc721(tokens::ART, u(3)),
            u(500),
            5_000,
        )
        .unwrap();
        assert_eq!(
            royalties,
            vec![Royalties {
                parts: vec![Part::new(creator, 1_000)],
                share: u(500),
            }]
        );
    }

    #[test]
    fn lazy_assets_carry_their_royalties() {
        let creator = accounts::carol().address();
        let mint = LazyMint {
            token_id: u(1),
            token_uri: "ipfs://1".to_string(),
            supply: None,
            creators: vec![Part::new(creator, 10_000)],
            royalties: vec![Part::new(creator, 700)],
            signatures: vec![Bytes::new()],
        };
        let mut registry = MockRoyaltyRegistry::new();
        registry.expect_royalties_for().never();

        let royalties = resolve(
            &registry,
            &AssetType::erc721_lazy(tokens::ART, &mint),
            u(100),
            5_000,
        )
        .unwrap();
        assert_eq!(royalties[0].parts, vec![Part::new(creator, 700)]);
    }

    #[test]
    fn ceiling_is_enforced() {
        let parts = vec![
            Part::new(accounts::alice().address(), 3_000),
            Part::new(accounts::carol().address(), 2_001),
        ];
        let result = resolve(
            &registry(parts),
            &AssetType::erc1155(tokens::EDITIONS, u(1)),
            u(100),
            5_000,
        );
        match result {
            Err(RoyaltyError::TooHigh { token, total_bps }) => {
                assert_eq!(token, tokens::EDITIONS);
                assert_eq!(total_bps, 5_001);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn fungible_assets_have_no_royalties() {
        let mut registry = MockRoyaltyRegistry::new();
        registry.expect_royalties_for().never();
        let royalties = resolve(&registry, &AssetType::erc20(tokens::DAI), u(100), 5_000).unwrap();
        assert!(royalties[0].parts.is_empty());
    }

    #[test]
    fn bundle_items_share_the_payment() {
        let items = vec![
            BundleItem {
                asset_type: AssetType::erc721(tokens::ART, u(1)),
                value: u(1),
            },
            BundleItem {
                asset_type: AssetType::erc1155(tokens::EDITIONS, u(2)),
                value: u(2),
            },
        ];
        let creator = accounts::carol().address();
        let royalties = resolve(
            &registry(vec![Part::new(creator, 100)]),
            &AssetType::bundle(&items),
            u(100),
            5_000,
        )
        .unwrap();
        let shares = royalties.iter().map(|r| r.share).collect::<Vec<_>>();
        assert_eq!(shares, vec![u(33), u(67)]);
    }
}
