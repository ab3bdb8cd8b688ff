//! Solidity ABI layouts of the opaque payloads carried by asset types and
//! orders.

alloy_sol_types::sol! {
    /// A beneficiary and its share in basis points.
    #[derive(Debug, PartialEq, Eq)]
    struct Part {
        address account;
        uint96 value;
    }

    /// One entry of a bundle asset.
    #[derive(Debug, PartialEq, Eq)]
    struct BundleItem {
        bytes4 assetClass;
        bytes data;
        uint256 value;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Mint721Data {
        uint256 tokenId;
        string tokenURI;
        Part[] creators;
        Part[] royalties;
        bytes[] signatures;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Mint1155Data {
        uint256 tokenId;
        string tokenURI;
        uint256 supply;
        Part[] creators;
        Part[] royalties;
        bytes[] signatures;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct DataV1 {
        Part[] payouts;
        Part[] originFees;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct DataV2 {
        Part[] payouts;
        Part[] originFees;
        bool isMakeFill;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct DataV3Sell {
        Part[] payouts;
        Part[] originFees;
        uint256 maxFeesBasePoint;
        bytes32 marketplaceMarker;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct DataV3Buy {
        Part[] payouts;
        Part[] originFees;
        bytes32 marketplaceMarker;
    }
}
