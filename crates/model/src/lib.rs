//! Data contracts of the exchange: assets, orders, order data payloads and
//! the hashing and signature primitives built on top of them.

pub mod abi;
pub mod asset;
pub mod order;
pub mod part;
pub mod signature;

use {
    alloy_primitives::{Address, B256, U256, keccak256},
    alloy_sol_types::SolValue,
    hex_literal::hex,
    std::fmt,
};

#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DomainSeparator(pub B256);

impl std::str::FromStr for DomainSeparator {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(B256::from(const_hex::decode_to_array::<_, 32>(s)?)))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

impl DomainSeparator {
    /// keccak256("EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")
    const DOMAIN_TYPE_HASH: B256 = B256::new(hex!(
        "8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f"
    ));

    /// The EIP-712 domain name used for computing the domain separator.
    pub const NAME: &'static str = "Exchange";

    /// The EIP-712 domain version used for computing the domain separator.
    pub const VERSION: &'static str = "2";

    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        let encoded = (
            Self::DOMAIN_TYPE_HASH,
            keccak256(Self::NAME.as_bytes()),
            keccak256(Self::VERSION.as_bytes()),
            U256::from(chain_id),
            verifying_contract,
        )
            .abi_encode();
        Self(keccak256(encoded))
    }
}
