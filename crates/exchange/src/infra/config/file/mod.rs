pub use load::{load, parse};
use {
    alloy_primitives::Address,
    model::asset::AssetClass,
    serde::Deserialize,
};

mod load;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// Chain ID of the EIP-712 domain orders are signed for.
    chain_id: u64,

    /// Exchange contract of the EIP-712 domain orders are signed for.
    verifying_contract: Address,

    fees: FeesConfig,

    /// Upper bound on the sum of royalties of an asset, in basis points.
    #[serde(default = "default_royalties_ceiling_bps")]
    royalties_ceiling_bps: u16,

    #[serde(default)]
    validation: ValidationConfig,

    /// Matchers for asset classes the exchange has no built-in support for.
    #[serde(rename = "matcher", default)]
    matchers: Vec<MatcherConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FeesConfig {
    /// Protocol fee charged when an asset is sold for the first time.
    #[serde(default)]
    protocol_fee_primary_bps: u16,

    /// Protocol fee charged on resales.
    #[serde(default)]
    protocol_fee_secondary_bps: u16,

    fee_receiver: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ValidationConfig {
    #[serde(default = "default_enabled")]
    native_signatures: bool,

    #[serde(default = "default_enabled")]
    contract_signatures: bool,

    /// Accept orders sent by their maker without a signature.
    #[serde(default = "default_enabled")]
    sender_bypass: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            native_signatures: true,
            contract_signatures: true,
            sender_bypass: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct MatcherConfig {
    /// Name of a built-in class or a 0x prefixed class tag.
    class: AssetClass,
    kind: MatcherKind,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum MatcherKind {
    Collection,
    Exact,
}

fn default_royalties_ceiling_bps() -> u16 {
    crate::infra::config::DEFAULT_ROYALTIES_CEILING_BPS
}

fn default_enabled() -> bool {
    true
}
