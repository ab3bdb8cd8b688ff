//! Deterministic externally owned accounts able to sign orders.

use {
    alloy_primitives::{Address, B256, Bytes},
    alloy_signer::SignerSync,
    alloy_signer_local::PrivateKeySigner,
    model::{
        DomainSeparator,
        order::Order,
        signature::{EcdsaSignature, EcdsaSigningScheme},
    },
};

#[derive(Clone, Debug)]
pub struct Account(PrivateKeySigner);

impl Account {
    /// The account derived from the private key `[n; 32]`. `n` must not be 0.
    pub fn new(n: u8) -> Self {
        let key = B256::repeat_byte(n);
        Self(PrivateKeySigner::from_bytes(&key).expect("valid private key"))
    }

    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Signs the EIP-712 digest of `order`.
    pub fn sign(&self, order: &Order, domain: &DomainSeparator) -> Bytes {
        self.sign_with(order, domain, EcdsaSigningScheme::Eip712)
    }

    pub fn sign_with(
        &self,
        order: &Order,
        domain: &DomainSeparator,
        scheme: EcdsaSigningScheme,
    ) -> Bytes {
        let digest = EcdsaSignature::message(scheme, &order.signing_hash(domain));
        let signature = self.0.sign_hash_sync(&digest).expect("signing never fails");
        EcdsaSignature::from_signature(&signature, scheme).to_vec()
    }
}

/// A seller of assets.
pub fn alice() -> Account {
    Account::new(0xa1)
}

/// A buyer of assets.
pub fn bob() -> Account {
    Account::new(0xb0)
}

/// A third party, typically a creator or a marketplace.
pub fn carol() -> Account {
    Account::new(0xc0)
}
