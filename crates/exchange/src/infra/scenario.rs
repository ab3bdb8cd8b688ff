//! A settlement described as JSON: the state of the world and two orders to
//! settle against it.

use {
    crate::{
        domain::{Error, Receipt, validator::Signer},
        infra::{
            Config,
            FixedClock,
            InMemoryLedger,
            InMemoryRoyalties,
            InMemorySigners,
            StaticEip1271,
        },
    },
    alloy_primitives::{Address, B256, U256},
    anyhow::{Context, Result},
    model::{order::SignedOrder, part::Part},
    number::serialization::HexOrDecimalU256,
    serde::Deserialize,
    serde_with::serde_as,
    std::{path::Path, sync::Arc},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scenario {
    /// Unix timestamp the orders are validated at.
    pub now: u64,
    /// Account submitting the match.
    pub sender: Address,
    #[serde(default)]
    pub balances: Balances,
    #[serde(default)]
    pub royalties: Vec<RoyaltyRecord>,
    /// Makers that are contracts verifying signatures on their own.
    #[serde(default)]
    pub contracts: Vec<ContractSigner>,
    /// Makers that are contracts without signature verification.
    #[serde(default)]
    pub opaque_contracts: Vec<Address>,
    pub left: SignedOrder,
    pub right: SignedOrder,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Balances {
    #[serde(default)]
    pub native: Vec<NativeBalance>,
    #[serde(default)]
    pub erc20: Vec<TokenBalance>,
    #[serde(default)]
    pub erc721: Vec<TokenOwner>,
    #[serde(default)]
    pub erc1155: Vec<TokenIdBalance>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NativeBalance {
    pub owner: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub amount: U256,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenBalance {
    pub token: Address,
    pub owner: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub amount: U256,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenOwner {
    pub token: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub token_id: U256,
    pub owner: Address,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenIdBalance {
    pub token: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub token_id: U256,
    pub owner: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub amount: U256,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoyaltyRecord {
    pub token: Address,
    /// Applies to the whole collection if absent.
    #[serde_as(as = "Option<HexOrDecimalU256>")]
    #[serde(default)]
    pub token_id: Option<U256>,
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContractSigner {
    pub address: Address,
    /// Signing hashes the contract accepts.
    pub approved_hashes: Vec<B256>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("I/O error while reading {path:?}"))?;
        serde_json::from_str(&data).with_context(|| format!("invalid scenario in {path:?}"))
    }

    /// Settles the orders of the scenario. Returns the ledger the settlement
    /// ran against together with the outcome.
    pub fn settle(&self, config: &Config) -> (Arc<InMemoryLedger>, Result<Receipt, Error>) {
        let ledger = Arc::new(self.ledger());
        let exchange = config.exchange(
            ledger.clone(),
            Arc::new(self.royalties()),
            Arc::new(self.signers()),
            Arc::new(FixedClock(self.now)),
        );
        let result = exchange.match_orders(&self.left, &self.right, self.sender);
        (ledger, result)
    }

    fn ledger(&self) -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        for balance in &self.balances.native {
            ledger.credit_native(balance.owner, balance.amount);
        }
        for balance in &self.balances.erc20 {
            ledger.credit_erc20(balance.token, balance.owner, balance.amount);
        }
        for owner in &self.balances.erc721 {
            ledger.set_erc721_owner(owner.token, owner.token_id, owner.owner);
        }
        for balance in &self.balances.erc1155 {
            ledger.credit_erc1155(balance.token, balance.token_id, balance.owner, balance.amount);
        }
        ledger
    }

    fn royalties(&self) -> InMemoryRoyalties {
        let royalties = InMemoryRoyalties::new();
        for record in &self.royalties {
            match record.token_id {
                Some(token_id) => {
                    royalties.set_by_token_id(record.token, token_id, record.parts.clone())
                }
                None => royalties.set_by_token(record.token, record.parts.clone()),
            }
        }
        royalties
    }

    fn signers(&self) -> InMemorySigners {
        let mut signers = InMemorySigners::new();
        for contract in &self.contracts {
            signers.insert(
                contract.address,
                Signer::Contract(StaticEip1271::new(contract.approved_hashes.iter().copied())),
            );
        }
        for address in &self.opaque_contracts {
            signers.insert(*address, Signer::OpaqueContract);
        }
        signers
    }
}
