use {
    crate::domain::validator::{EIP1271_MAGIC_VALUE, Eip1271, Signer, SignerDirectory},
    alloy_primitives::{Address, B256, FixedBytes},
    std::{
        collections::{HashMap, HashSet},
        sync::Arc,
    },
};

/// Signer kinds by address. Unknown addresses are accounts.
#[derive(Clone, Debug, Default)]
pub struct InMemorySigners(HashMap<Address, Signer>);

impl InMemorySigners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, signer: Signer) {
        self.0.insert(address, signer);
    }
}

impl SignerDirectory for InMemorySigners {
    fn signer(&self, address: Address) -> Signer {
        self.0.get(&address).cloned().unwrap_or(Signer::Account)
    }
}

/// A contract wallet that accepts a fixed set of message hashes regardless of
/// the signature bytes, like a wallet with pre-approved messages.
#[derive(Clone, Debug, Default)]
pub struct StaticEip1271 {
    accepted: HashSet<B256>,
}

impl StaticEip1271 {
    pub fn new(accepted: impl IntoIterator<Item = B256>) -> Arc<Self> {
        Arc::new(Self {
            accepted: accepted.into_iter().collect(),
        })
    }
}

impl Eip1271 for StaticEip1271 {
    fn is_valid_signature(&self, hash: B256, _: &[u8]) -> FixedBytes<4> {
        if self.accepted.contains(&hash) {
            EIP1271_MAGIC_VALUE
        } else {
            FixedBytes::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, maplit::hashset, testlib::accounts};

    #[test]
    fn unknown_addresses_are_accounts() {
        let mut signers = InMemorySigners::new();
        let wallet = accounts::carol().address();
        signers.insert(
            wallet,
            Signer::Contract(StaticEip1271::new(hashset! {B256::ZERO, B256::repeat_byte(2)})),
        );

        assert!(matches!(
            signers.signer(accounts::alice().address()),
            Signer::Account
        ));
        let Signer::Contract(contract) = signers.signer(wallet) else {
            panic!("expected a contract signer");
        };
        assert_eq!(
            contract.is_valid_signature(B256::ZERO, &[]),
            EIP1271_MAGIC_VALUE
        );
        assert_eq!(
            contract.is_valid_signature(B256::repeat_byte(1), &[]),
            FixedBytes::ZERO
        );
    }
}
