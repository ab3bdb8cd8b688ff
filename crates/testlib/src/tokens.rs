//! Token contracts the tests trade.

use alloy_primitives::{Address, address};

/// Address for the `WETH` token.
pub const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

/// Address for the `DAI` token.
pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");

/// An ERC721 collection.
pub const ART: Address = address!("F6793dA657495ffeFF9Ee6350824910Abc21356C");

/// An ERC1155 collection.
pub const EDITIONS: Address = address!("d07dc4262BCDbf85190C01c996b4C06a461d2430");
