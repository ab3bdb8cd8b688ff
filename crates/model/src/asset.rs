//! Asset types, their class tags and the codecs of their opaque payloads.

use {
    crate::{
        abi,
        part::{self, Part, PartOutOfRange},
    },
    alloy_primitives::{Address, B256, Bytes, FixedBytes, U256, keccak256},
    alloy_sol_types::SolValue,
    hex_literal::hex,
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, SerializeDisplay, serde_as},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Tag identifying how the payload of an [`AssetType`] is laid out:
/// `bytes4(keccak256(name))`.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct AssetClass(pub FixedBytes<4>);

impl AssetClass {
    pub const BUNDLE: Self = Self(FixedBytes(hex!("89b6dfe5")));
    pub const COLLECTION: Self = Self(FixedBytes(hex!("f63c2825")));
    pub const ERC1155: Self = Self(FixedBytes(hex!("973bb640")));
    pub const ERC1155_LAZY: Self = Self(FixedBytes(hex!("1cdfaa40")));
    pub const ERC20: Self = Self(FixedBytes(hex!("8ae85d84")));
    pub const ERC721: Self = Self(FixedBytes(hex!("73ad2146")));
    pub const ERC721_LAZY: Self = Self(FixedBytes(hex!("d8f960c1")));
    pub const ETH: Self = Self(FixedBytes(hex!("aaaebeba")));

    const NAMED: [(Self, &'static str); 8] = [
        (Self::ETH, "ETH"),
        (Self::ERC20, "ERC20"),
        (Self::ERC721, "ERC721"),
        (Self::ERC1155, "ERC1155"),
        (Self::ERC721_LAZY, "ERC721_LAZY"),
        (Self::ERC1155_LAZY, "ERC1155_LAZY"),
        (Self::COLLECTION, "COLLECTION"),
        (Self::BUNDLE, "BUNDLE"),
    ];

    /// Derives the class tag from its name the same way the built-in tags
    /// are derived.
    pub fn from_name(name: &str) -> Self {
        let hash = keccak256(name.as_bytes());
        Self(FixedBytes([hash[0], hash[1], hash[2], hash[3]]))
    }

    pub fn name(&self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(class, _)| class == self)
            .map(|(_, name)| *name)
    }

    /// Classes whose payload layout is defined by this crate.
    pub fn is_builtin(&self) -> bool {
        self.name().is_some()
    }

    /// Classes that are minted on their first transfer.
    pub fn is_lazy(&self) -> bool {
        matches!(*self, Self::ERC721_LAZY | Self::ERC1155_LAZY)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{}", const_hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for AssetClass {
    type Err = const_hex::FromHexError;

    /// Accepts either the name of a built-in class or a 0x prefixed 4 byte
    /// tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((class, _)) = Self::NAMED.iter().find(|(_, name)| *name == s) {
            return Ok(*class);
        }
        Ok(Self(FixedBytes(const_hex::decode_to_array::<_, 4>(s)?)))
    }
}

/// An asset type: a class tag plus the class specific payload.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetType {
    pub class: AssetClass,
    pub data: Bytes,
}

impl fmt::Debug for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetType")
            .field("class", &self.class)
            .field("data", &format_args!("{}", self.data))
            .finish()
    }
}

/// An asset type together with a quantity.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_type: AssetType,
    #[serde_as(as = "HexOrDecimalU256")]
    pub value: U256,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed {class} payload: {source}")]
    Payload {
        class: AssetClass,
        source: alloy_sol_types::Error,
    },
    #[error("bundles cannot contain other bundles")]
    NestedBundle,
    #[error(transparent)]
    Part(#[from] PartOutOfRange),
}

/// Off-ledger description of a token that is minted on its first transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LazyMint {
    pub token_id: U256,
    pub token_uri: String,
    /// Only present for semi-fungible lazy mints.
    pub supply: Option<U256>,
    pub creators: Vec<Part>,
    pub royalties: Vec<Part>,
    pub signatures: Vec<Bytes>,
}

/// One entry of a bundle: a nested asset type and its quantity per bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleItem {
    pub asset_type: AssetType,
    pub value: U256,
}

/// The decoded payload of an [`AssetType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetData {
    Eth,
    Erc20 { token: Address },
    Erc721 { token: Address, token_id: U256 },
    Erc1155 { token: Address, token_id: U256 },
    Erc721Lazy { token: Address, mint: LazyMint },
    Erc1155Lazy { token: Address, mint: LazyMint },
    Collection { token: Address },
    Bundle(Vec<BundleItem>),
    /// A class this crate knows no layout for; the payload stays opaque.
    Custom,
}

impl AssetType {
    /// keccak256("AssetType(bytes4 assetClass,bytes data)")
    pub const TYPE_HASH: B256 = B256::new(hex!(
        "452a0dc408cb0d27ffc3b3caff933a5208040a53a9dbecd8d89cad2c0d40e00c"
    ));

    pub fn new(class: AssetClass, data: impl Into<Bytes>) -> Self {
        Self {
            class,
            data: data.into(),
        }
    }

    pub fn eth() -> Self {
        Self::new(AssetClass::ETH, Bytes::new())
    }

    pub fn erc20(token: Address) -> Self {
        Self::new(AssetClass::ERC20, token.abi_encode())
    }

    pub fn erc721(token: Address, token_id: U256) -> Self {
        Self::new(AssetClass::ERC721, (token, token_id).abi_encode_params())
    }

    pub fn erc1155(token: Address, token_id: U256) -> Self {
        Self::new(AssetClass::ERC1155, (token, token_id).abi_encode_params())
    }

    pub fn collection(token: Address) -> Self {
        Self::new(AssetClass::COLLECTION, token.abi_encode())
    }

    pub fn erc721_lazy(token: Address, mint: &LazyMint) -> Self {
        let data = abi::Mint721Data {
            tokenId: mint.token_id,
            tokenURI: mint.token_uri.clone(),
            creators: part::to_abi(&mint.creators),
            royalties: part::to_abi(&mint.royalties),
            signatures: mint.signatures.clone(),
        };
        Self::new(AssetClass::ERC721_LAZY, (token, data).abi_encode_params())
    }

    pub fn erc1155_lazy(token: Address, mint: &LazyMint) -> Self {
        let data = abi::Mint1155Data {
            tokenId: mint.token_id,
            tokenURI: mint.token_uri.clone(),
            supply: mint.supply.unwrap_or_default(),
            creators: part::to_abi(&mint.creators),
            royalties: part::to_abi(&mint.royalties),
            signatures: mint.signatures.clone(),
        };
        Self::new(AssetClass::ERC1155_LAZY, (token, data).abi_encode_params())
    }

    pub fn bundle(items: &[BundleItem]) -> Self {
        let items = items
            .iter()
            .map(|item| abi::BundleItem {
                assetClass: item.asset_type.class.0,
                data: item.asset_type.data.clone(),
                value: item.value,
            })
            .collect::<Vec<_>>();
        Self::new(AssetClass::BUNDLE, items.abi_encode())
    }

    /// Decodes the payload according to the layout defined by the class.
    pub fn decode(&self) -> Result<AssetData, CodecError> {
        let class = self.class;
        let payload = |source| CodecError::Payload { class, source };
        let data = self.data.as_ref();
        Ok(match class {
            AssetClass::ETH => AssetData::Eth,
            AssetClass::ERC20 => AssetData::Erc20 {
                token: Address::abi_decode(data).map_err(payload)?,
            },
            AssetClass::COLLECTION => AssetData::Collection {
                token: Address::abi_decode(data).map_err(payload)?,
            },
            AssetClass::ERC721 => {
                let (token, token_id) =
                    <(Address, U256)>::abi_decode_params(data).map_err(payload)?;
                AssetData::Erc721 { token, token_id }
            }
            AssetClass::ERC1155 => {
                let (token, token_id) =
                    <(Address, U256)>::abi_decode_params(data).map_err(payload)?;
                AssetData::Erc1155 { token, token_id }
            }
            AssetClass::ERC721_LAZY => {
                let (token, mint) =
                    <(Address, abi::Mint721Data)>::abi_decode_params(data).map_err(payload)?;
                AssetData::Erc721Lazy {
                    token,
                    mint: LazyMint {
                        token_id: mint.tokenId,
                        token_uri: mint.tokenURI,
                        supply: None,
                        creators: part::from_abi(mint.creators)?,
                        royalties: part::from_abi(mint.royalties)?,
                        signatures: mint.signatures,
                    },
                }
            }
            AssetClass::ERC1155_LAZY => {
                let (token, mint) =
                    <(Address, abi::Mint1155Data)>::abi_decode_params(data).map_err(payload)?;
                AssetData::Erc1155Lazy {
                    token,
                    mint: LazyMint {
                        token_id: mint.tokenId,
                        token_uri: mint.tokenURI,
                        supply: Some(mint.supply),
                        creators: part::from_abi(mint.creators)?,
                        royalties: part::from_abi(mint.royalties)?,
                        signatures: mint.signatures,
                    },
                }
            }
            AssetClass::BUNDLE => {
                let items = Vec::<abi::BundleItem>::abi_decode(data).map_err(payload)?;
                let items = items
                    .into_iter()
                    .map(|item| {
                        let asset_type = AssetType::new(AssetClass(item.assetClass), item.data);
                        if asset_type.class == AssetClass::BUNDLE {
                            return Err(CodecError::NestedBundle);
                        }
                        Ok(BundleItem {
                            asset_type,
                            value: item.value,
                        })
                    })
                    .collect::<Result<_, _>>()?;
                AssetData::Bundle(items)
            }
            _ => AssetData::Custom,
        })
    }

    /// EIP-712 `hashStruct` of the asset type.
    pub fn hash(&self) -> B256 {
        keccak256((Self::TYPE_HASH, self.class.0, keccak256(&self.data)).abi_encode())
    }
}

impl Asset {
    /// keccak256("Asset(AssetType assetType,uint256 value)AssetType(bytes4 assetClass,bytes data)")
    pub const TYPE_HASH: B256 = B256::new(hex!(
        "db6f72e915676cfc289da13bc4ece054fd17b1df6d77ffc4a60510718c236b08"
    ));

    pub fn new(asset_type: AssetType, value: U256) -> Self {
        Self { asset_type, value }
    }

    /// EIP-712 `hashStruct` of the asset.
    pub fn hash(&self) -> B256 {
        keccak256((Self::TYPE_HASH, self.asset_type.hash(), self.value).abi_encode())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy_primitives::address};

    const TOKEN: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn type_hashes() {
        assert_eq!(
            AssetType::TYPE_HASH,
            keccak256("AssetType(bytes4 assetClass,bytes data)")
        );
        assert_eq!(
            Asset::TYPE_HASH,
            keccak256(
                "Asset(AssetType assetType,uint256 value)AssetType(bytes4 assetClass,bytes data)"
            )
        );
    }

    #[test]
    fn builtin_class_ids_are_keccak_prefixes() {
        for (class, name) in AssetClass::NAMED {
            assert_eq!(AssetClass::from_name(name), class, "{name}");
        }
    }

    #[test]
    fn class_display_and_parse() {
        assert_eq!(AssetClass::ERC20.to_string(), "ERC20");
        assert_eq!("ERC1155".parse::<AssetClass>().unwrap(), AssetClass::ERC1155);
        let custom = AssetClass(FixedBytes(hex!("01020304")));
        assert_eq!(custom.to_string(), "0x01020304");
        assert_eq!("0x01020304".parse::<AssetClass>().unwrap(), custom);
        assert!("ERC999".parse::<AssetClass>().is_err());
    }

    #[test]
    fn decodes_builtin_payloads() {
        assert_eq!(AssetType::eth().decode().unwrap(), AssetData::Eth);
        assert_eq!(
            AssetType::erc20(TOKEN).decode().unwrap(),
            AssetData::Erc20 { token: TOKEN }
        );
        assert_eq!(
            AssetType::erc721(TOKEN, U256::from(7)).decode().unwrap(),
            AssetData::Erc721 {
                token: TOKEN,
                token_id: U256::from(7)
            }
        );
        assert_eq!(
            AssetType::erc1155(TOKEN, U256::from(7)).decode().unwrap(),
            AssetData::Erc1155 {
                token: TOKEN,
                token_id: U256::from(7)
            }
        );
    }

    #[test]
    fn fungible_payload_is_a_padded_address() {
        let data = AssetType::erc20(TOKEN).data;
        assert_eq!(data.len(), 32);
        assert_eq!(&data[12..], TOKEN.as_slice());
    }

    #[test]
    fn lazy_mint_payload() {
        let mint = LazyMint {
            token_id: U256::from(1),
            token_uri: "ipfs://token".to_string(),
            supply: Some(U256::from(10)),
            creators: vec![Part::new(TOKEN, 10_000)],
            royalties: vec![Part::new(TOKEN, 1_000)],
            signatures: vec![Bytes::from_static(&[1, 2, 3])],
        };
        let decoded = AssetType::erc1155_lazy(TOKEN, &mint).decode().unwrap();
        assert_eq!(decoded, AssetData::Erc1155Lazy { token: TOKEN, mint });
    }

    #[test]
    fn bundle_payload() {
        let items = vec![
            BundleItem {
                asset_type: AssetType::erc721(TOKEN, U256::from(1)),
                value: U256::from(1),
            },
            BundleItem {
                asset_type: AssetType::erc1155(TOKEN, U256::from(2)),
                value: U256::from(5),
            },
        ];
        let bundle = AssetType::bundle(&items);
        assert_eq!(bundle.decode().unwrap(), AssetData::Bundle(items));

        let nested = AssetType::bundle(&[BundleItem {
            asset_type: bundle,
            value: U256::from(1),
        }]);
        assert!(matches!(nested.decode(), Err(CodecError::NestedBundle)));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let broken = AssetType::new(AssetClass::ERC721, vec![1, 2, 3]);
        assert!(matches!(
            broken.decode(),
            Err(CodecError::Payload {
                class: AssetClass::ERC721,
                ..
            })
        ));
    }

    #[test]
    fn unknown_classes_stay_opaque() {
        let custom = AssetType::new(AssetClass::from_name("CUSTOM"), vec![1, 2, 3]);
        assert_eq!(custom.decode().unwrap(), AssetData::Custom);
    }

    #[test]
    fn eth_asset_type_hash() {
        assert_eq!(
            AssetType::eth().hash(),
            B256::new(hex!(
                "dbc269ffafedf96b8cd057f473f61568a931afee5aa5a97fe7e63c81446f606e"
            ))
        );
    }
}
