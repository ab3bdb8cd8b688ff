//! Orders, their data payloads and the two hashes derived from them: the
//! order key identifying its fill state and the EIP-712 struct hash that
//! makers sign.

use {
    crate::{
        DomainSeparator,
        abi,
        asset::Asset,
        part::{self, Part},
        signature,
    },
    alloy_primitives::{Address, B256, Bytes, FixedBytes, U256, keccak256},
    alloy_sol_types::SolValue,
    derive_more::{Display, From, Into},
    hex_literal::hex,
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, SerializeDisplay, serde_as},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Tag selecting the layout of an order's `data` payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct DataKind(pub FixedBytes<4>);

impl DataKind {
    pub const DEFAULT: Self = Self(FixedBytes(hex!("ffffffff")));
    pub const V1: Self = Self(FixedBytes(hex!("4c234266")));
    pub const V2: Self = Self(FixedBytes(hex!("23d235ef")));
    pub const V3_BUY: Self = Self(FixedBytes(hex!("1b18cdf6")));
    pub const V3_SELL: Self = Self(FixedBytes(hex!("2fa3cfd3")));

    const NAMED: [(Self, &'static str); 5] = [
        (Self::DEFAULT, "DEFAULT"),
        (Self::V1, "V1"),
        (Self::V2, "V2"),
        (Self::V3_SELL, "V3_SELL"),
        (Self::V3_BUY, "V3_BUY"),
    ];

    /// Data kinds whose order key does not cover the order data.
    pub fn is_legacy(&self) -> bool {
        matches!(*self, Self::DEFAULT | Self::V1)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::NAMED.iter().find(|(kind, _)| kind == self) {
            Some((_, name)) => f.write_str(name),
            None => write!(f, "0x{}", const_hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for DataKind {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((kind, _)) = Self::NAMED.iter().find(|(_, name)| *name == s) {
            return Ok(*kind);
        }
        Ok(Self(FixedBytes(const_hex::decode_to_array::<_, 4>(s)?)))
    }
}

/// Which fields the order key is computed over.
///
/// The two schemes produce different keys for the same order, so the scheme
/// is carried by the order itself instead of being picked by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyVersion {
    /// `(maker, makeAssetType, takeAssetType, salt)`.
    #[default]
    Legacy,
    /// The legacy fields followed by the order data.
    Typed,
}

impl KeyVersion {
    /// The key version orders of `kind` are created with.
    pub fn for_kind(kind: DataKind) -> Self {
        if kind.is_legacy() {
            Self::Legacy
        } else {
            Self::Typed
        }
    }
}

/// Identifies an order in the fills ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Display)]
#[display("{_0}")]
pub struct OrderKey(pub B256);

impl fmt::Debug for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for OrderKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A maker's signed intent to give `make_asset` in exchange for
/// `take_asset`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub maker: Address,
    pub make_asset: Asset,
    /// `Address::ZERO` lets anyone fill the order.
    #[serde(default)]
    pub taker: Address,
    pub take_asset: Asset,
    #[serde_as(as = "HexOrDecimalU256")]
    pub salt: U256,
    /// Unix timestamp, `0` means unbounded.
    #[serde(default)]
    pub start: u64,
    /// Unix timestamp, `0` means unbounded.
    #[serde(default)]
    pub end: u64,
    pub data_kind: DataKind,
    #[serde(default)]
    pub data: Bytes,
    pub key_version: KeyVersion,
}

impl Order {
    /// keccak256("Order(address maker,Asset makeAsset,address taker,Asset takeAsset,uint256 salt,uint256 start,uint256 end,bytes4 dataType,bytes data)Asset(AssetType assetType,uint256 value)AssetType(bytes4 assetClass,bytes data)")
    pub const TYPE_HASH: B256 = B256::new(hex!(
        "477ed43b8020849b755512278536c3766a3b4ab547519949a75f483372493f8d"
    ));

    /// Creates an order open to any taker and without a time window. The key
    /// version follows the data kind.
    pub fn new(
        maker: Address,
        make_asset: Asset,
        take_asset: Asset,
        salt: U256,
        data_kind: DataKind,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            maker,
            make_asset,
            taker: Address::ZERO,
            take_asset,
            salt,
            start: 0,
            end: 0,
            data_kind,
            data: data.into(),
            key_version: KeyVersion::for_kind(data_kind),
        }
    }

    /// The key of the order's fill state.
    pub fn key(&self) -> OrderKey {
        let maker_side = self.make_asset.asset_type.hash();
        let taker_side = self.take_asset.asset_type.hash();
        let encoded = match self.key_version {
            KeyVersion::Legacy => (self.maker, maker_side, taker_side, self.salt).abi_encode(),
            KeyVersion::Typed => {
                (self.maker, maker_side, taker_side, self.salt, self.data.clone())
                    .abi_encode_params()
            }
        };
        OrderKey(keccak256(encoded))
    }

    /// Returns the value of hashStruct() over the order as defined by EIP-712.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct
    pub fn hash_struct(&self) -> B256 {
        keccak256(
            (
                Self::TYPE_HASH,
                self.maker,
                self.make_asset.hash(),
                self.taker,
                self.take_asset.hash(),
                self.salt,
                U256::from(self.start),
                U256::from(self.end),
                self.data_kind.0,
                keccak256(&self.data),
            )
                .abi_encode(),
        )
    }

    /// The digest a maker signs for this order.
    pub fn signing_hash(&self, domain: &DomainSeparator) -> B256 {
        signature::hashed_eip712_message(domain, &self.hash_struct())
    }

    /// Decodes the order data according to its data kind.
    pub fn parse_data(&self) -> Result<OrderData, OrderDataError> {
        OrderData::decode(self.data_kind, &self.data)
    }
}

/// An order together with the signature of its maker.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SignedOrder {
    #[serde(flatten)]
    pub order: Order,
    /// Empty for orders authorized by their sender.
    #[serde(default)]
    pub signature: Bytes,
}

/// Which side of an order its fill state counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillSide {
    /// The fill counts how much of the make asset was given away.
    Make,
    /// The fill counts how much of the take asset was received.
    Take,
}

/// Decoded order data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderData {
    /// Receivers of what the order gets. Empty means the maker gets
    /// everything.
    pub payouts: Vec<Part>,
    /// Fees the order pays to third parties (marketplaces, referrers).
    pub origin_fees: Vec<Part>,
    pub is_make_fill: bool,
    /// Upper bound on all fees together, only carried by sell orders. A zero
    /// bound on the wire means no bound.
    pub max_fees_bps: Option<u64>,
    pub marketplace_marker: Option<B256>,
}

#[derive(Debug, Error)]
pub enum OrderDataError {
    #[error("unknown order data kind {0}")]
    UnknownKind(DataKind),
    #[error("malformed {kind} order data: {source}")]
    Malformed {
        kind: DataKind,
        source: alloy_sol_types::Error,
    },
    #[error("max fee of {0} bps is above the 1000 bps limit")]
    MaxFeeTooHigh(U256),
    #[error(transparent)]
    Part(#[from] part::PartOutOfRange),
}

impl OrderData {
    /// Upper bound for the max fee a sell order may declare.
    pub const MAX_FEES_LIMIT_BPS: u64 = 1_000;

    pub fn decode(kind: DataKind, data: &[u8]) -> Result<Self, OrderDataError> {
        let malformed = |source| OrderDataError::Malformed { kind, source };
        Ok(match kind {
            DataKind::DEFAULT => Self::default(),
            DataKind::V1 => {
                let data = abi::DataV1::abi_decode(data).map_err(malformed)?;
                Self {
                    payouts: part::from_abi(data.payouts)?,
                    origin_fees: part::from_abi(data.originFees)?,
                    ..Default::default()
                }
            }
            DataKind::V2 => {
                let data = abi::DataV2::abi_decode(data).map_err(malformed)?;
                Self {
                    payouts: part::from_abi(data.payouts)?,
                    origin_fees: part::from_abi(data.originFees)?,
                    is_make_fill: data.isMakeFill,
                    ..Default::default()
                }
            }
            DataKind::V3_SELL => {
                let data = abi::DataV3Sell::abi_decode(data).map_err(malformed)?;
                if data.maxFeesBasePoint > U256::from(Self::MAX_FEES_LIMIT_BPS) {
                    return Err(OrderDataError::MaxFeeTooHigh(data.maxFeesBasePoint));
                }
                let max_fees_bps = data.maxFeesBasePoint.to::<u64>();
                Self {
                    payouts: part::from_abi(data.payouts)?,
                    origin_fees: part::from_abi(data.originFees)?,
                    is_make_fill: true,
                    max_fees_bps: (max_fees_bps != 0).then_some(max_fees_bps),
                    marketplace_marker: Some(data.marketplaceMarker),
                }
            }
            DataKind::V3_BUY => {
                let data = abi::DataV3Buy::abi_decode(data).map_err(malformed)?;
                Self {
                    payouts: part::from_abi(data.payouts)?,
                    origin_fees: part::from_abi(data.originFees)?,
                    is_make_fill: false,
                    max_fees_bps: None,
                    marketplace_marker: Some(data.marketplaceMarker),
                }
            }
            _ => return Err(OrderDataError::UnknownKind(kind)),
        })
    }

    /// Encodes the data for the given kind. Fields the kind has no room for
    /// are dropped.
    pub fn encode(&self, kind: DataKind) -> Result<Bytes, OrderDataError> {
        let payouts = part::to_abi(&self.payouts);
        let origin_fees = part::to_abi(&self.origin_fees);
        let marker = self.marketplace_marker.unwrap_or_default();
        Ok(match kind {
            DataKind::DEFAULT => Bytes::new(),
            DataKind::V1 => abi::DataV1 {
                payouts,
                originFees: origin_fees,
            }
            .abi_encode()
            .into(),
            DataKind::V2 => abi::DataV2 {
                payouts,
                originFees: origin_fees,
                isMakeFill: self.is_make_fill,
            }
            .abi_encode()
            .into(),
            DataKind::V3_SELL => abi::DataV3Sell {
                payouts,
                originFees: origin_fees,
                maxFeesBasePoint: U256::from(self.max_fees_bps.unwrap_or_default()),
                marketplaceMarker: marker,
            }
            .abi_encode()
            .into(),
            DataKind::V3_BUY => abi::DataV3Buy {
                payouts,
                originFees: origin_fees,
                marketplaceMarker: marker,
            }
            .abi_encode()
            .into(),
            _ => return Err(OrderDataError::UnknownKind(kind)),
        })
    }

    pub fn fill_side(&self) -> FillSide {
        if self.is_make_fill {
            FillSide::Make
        } else {
            FillSide::Take
        }
    }

    /// The effective payouts: the declared ones, or the whole amount to
    /// `maker` if none were declared.
    pub fn payouts_or(&self, maker: Address) -> Vec<Part> {
        if self.payouts.is_empty() {
            vec![Part::new(maker, 10_000)]
        } else {
            self.payouts.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::asset::AssetType,
        alloy_primitives::address,
    };

    const MAKER: Address = address!("00000000000000000000000000000000000000aa");
    const TOKEN: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn type_hash() {
        assert_eq!(
            Order::TYPE_HASH,
            keccak256(
                "Order(address maker,Asset makeAsset,address taker,Asset takeAsset,uint256 \
                 salt,uint256 start,uint256 end,bytes4 dataType,bytes data)Asset(AssetType \
                 assetType,uint256 value)AssetType(bytes4 assetClass,bytes data)"
            )
        );
    }

    fn order(kind: DataKind, data: OrderData) -> Order {
        Order::new(
            MAKER,
            Asset::new(AssetType::erc721(TOKEN, U256::from(1)), U256::from(1)),
            Asset::new(AssetType::eth(), U256::from(100)),
            U256::from(1),
            kind,
            data.encode(kind).unwrap(),
        )
    }

    #[test]
    fn data_kind_ids() {
        for (kind, name) in DataKind::NAMED.iter().skip(1) {
            let hash = keccak256(name.as_bytes());
            assert_eq!(kind.0.as_slice(), &hash[..4], "{name}");
        }
        assert_eq!("V2".parse::<DataKind>().unwrap(), DataKind::V2);
        assert_eq!(DataKind::V3_SELL.to_string(), "V3_SELL");
    }

    #[test]
    fn key_version_follows_data_kind() {
        assert_eq!(
            order(DataKind::DEFAULT, OrderData::default()).key_version,
            KeyVersion::Legacy
        );
        assert_eq!(
            order(DataKind::V1, OrderData::default()).key_version,
            KeyVersion::Legacy
        );
        assert_eq!(
            order(DataKind::V2, OrderData::default()).key_version,
            KeyVersion::Typed
        );
    }

    #[test]
    fn legacy_key_ignores_data() {
        let fees = OrderData {
            origin_fees: vec![Part::new(TOKEN, 100)],
            ..Default::default()
        };
        let plain = order(DataKind::V1, OrderData::default());
        let with_fees = order(DataKind::V1, fees);
        assert_eq!(plain.key(), with_fees.key());
        // the signed struct hash still covers the data
        assert_ne!(plain.hash_struct(), with_fees.hash_struct());
    }

    #[test]
    fn typed_key_covers_data() {
        let plain = order(DataKind::V1, OrderData::default());
        let mut typed = plain.clone();
        typed.key_version = KeyVersion::Typed;
        assert_ne!(plain.key(), typed.key());

        let mut other = typed.clone();
        other.data = OrderData {
            origin_fees: vec![Part::new(TOKEN, 100)],
            ..Default::default()
        }
        .encode(DataKind::V1)
        .unwrap();
        assert_ne!(typed.key(), other.key());
    }

    #[test]
    fn key_ignores_amounts_and_time_window() {
        let a = order(DataKind::DEFAULT, OrderData::default());
        let mut b = a.clone();
        b.make_asset.value = U256::from(2);
        b.take_asset.value = U256::from(300);
        b.end = 1_000;
        assert_eq!(a.key(), b.key());
        assert_ne!(a.hash_struct(), b.hash_struct());
    }

    #[test]
    fn order_data_round_trip_per_kind() {
        let data = OrderData {
            payouts: vec![Part::new(MAKER, 10_000)],
            origin_fees: vec![Part::new(TOKEN, 300)],
            is_make_fill: true,
            max_fees_bps: Some(500),
            marketplace_marker: Some(B256::repeat_byte(7)),
        };

        let v1 = OrderData::decode(DataKind::V1, &data.encode(DataKind::V1).unwrap()).unwrap();
        assert_eq!(v1.payouts, data.payouts);
        assert!(!v1.is_make_fill);

        let v2 = OrderData::decode(DataKind::V2, &data.encode(DataKind::V2).unwrap()).unwrap();
        assert!(v2.is_make_fill);

        let sell =
            OrderData::decode(DataKind::V3_SELL, &data.encode(DataKind::V3_SELL).unwrap())
                .unwrap();
        assert_eq!(sell, data);

        let buy =
            OrderData::decode(DataKind::V3_BUY, &data.encode(DataKind::V3_BUY).unwrap()).unwrap();
        assert_eq!(buy.fill_side(), FillSide::Take);
        assert_eq!(buy.max_fees_bps, None);
    }

    #[test]
    fn rejects_bad_order_data() {
        assert!(matches!(
            OrderData::decode(DataKind(FixedBytes([1, 2, 3, 4])), &[]),
            Err(OrderDataError::UnknownKind(_))
        ));
        assert!(matches!(
            OrderData::decode(DataKind::V2, &[1, 2, 3]),
            Err(OrderDataError::Malformed { .. })
        ));
        let too_high = OrderData {
            max_fees_bps: Some(1_001),
            ..Default::default()
        };
        assert!(matches!(
            OrderData::decode(DataKind::V3_SELL, &too_high.encode(DataKind::V3_SELL).unwrap()),
            Err(OrderDataError::MaxFeeTooHigh(_))
        ));
    }

    #[test]
    fn default_payout_goes_to_maker() {
        assert_eq!(
            OrderData::default().payouts_or(MAKER),
            vec![Part::new(MAKER, 10_000)]
        );
    }

    #[test]
    fn json_format() {
        let data = OrderData::default().encode(DataKind::V1).unwrap();
        let order: Order = serde_json::from_value(serde_json::json!({
            "maker": MAKER,
            "makeAsset": {
                "assetType": { "class": "ERC20", "data": AssetType::erc20(TOKEN).data },
                "value": "0x64",
            },
            "takeAsset": {
                "assetType": { "class": "ETH", "data": "0x" },
                "value": "5",
            },
            "salt": "7",
            "dataKind": "V1",
            "data": data,
            "keyVersion": "legacy",
        }))
        .unwrap();

        assert_eq!(
            order,
            Order::new(
                MAKER,
                Asset::new(AssetType::erc20(TOKEN), U256::from(100)),
                Asset::new(AssetType::eth(), U256::from(5)),
                U256::from(7),
                DataKind::V1,
                data,
            )
        );
        assert_eq!(
            serde_json::from_value::<DataKind>(serde_json::json!("0x4c234266")).unwrap(),
            DataKind::V1
        );
    }
}
