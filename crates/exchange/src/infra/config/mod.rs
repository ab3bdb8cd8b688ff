use {
    crate::domain::{
        Exchange,
        fees::FeeConfig,
        ledger::Ledger,
        matcher::{AssetMatcher, CollectionMatcher, ExactMatcher, Matcher, Registry},
        royalties::RoyaltyRegistry,
        transfer::TransferManager,
        validator::{Checks, Clock, OrderValidator, SignerDirectory},
    },
    alloy_primitives::Address,
    model::{DomainSeparator, asset::AssetClass},
    std::sync::Arc,
};

pub mod file;

/// Royalties may take at most half of a payment unless configured otherwise.
pub const DEFAULT_ROYALTIES_CEILING_BPS: u16 = 5_000;

/// Configuration of the exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub domain: DomainSeparator,
    pub fees: FeeConfig,
    pub royalties_ceiling_bps: u16,
    pub checks: Checks,
    pub matchers: Vec<CustomMatcher>,
}

/// A matcher registered for a non built-in asset class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomMatcher {
    pub class: AssetClass,
    pub kind: MatcherKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatcherKind {
    /// Matches a collection against any of its ERC721 or ERC1155 tokens.
    Collection,
    /// Matches byte identical asset types.
    Exact,
}

impl Config {
    /// The matcher registry with the custom matchers registered on top of the
    /// defaults.
    pub fn matcher_registry(&self) -> Registry {
        let mut registry = Registry::with_defaults();
        for matcher in &self.matchers {
            let strategy: Arc<dyn Matcher> = match matcher.kind {
                MatcherKind::Collection => Arc::new(CollectionMatcher),
                MatcherKind::Exact => Arc::new(ExactMatcher),
            };
            registry.register(matcher.class, strategy);
        }
        registry
    }

    /// Assembles an exchange settling against the given collaborators.
    pub fn exchange<L: Ledger>(
        &self,
        ledger: Arc<L>,
        royalties: Arc<dyn RoyaltyRegistry>,
        signers: Arc<dyn SignerDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Exchange<L> {
        Exchange::new(
            AssetMatcher::new(self.matcher_registry()),
            OrderValidator::new(self.domain, self.checks, signers, clock),
            TransferManager::new(self.fees, self.royalties_ceiling_bps, royalties),
            ledger,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: DomainSeparator::new(1, Address::ZERO),
            fees: FeeConfig {
                protocol_fee_primary_bps: 0,
                protocol_fee_secondary_bps: 0,
                fee_receiver: Address::ZERO,
            },
            royalties_ceiling_bps: DEFAULT_ROYALTIES_CEILING_BPS,
            checks: Checks::default(),
            matchers: Vec::new(),
        }
    }
}
