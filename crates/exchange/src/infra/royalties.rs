use {
    crate::domain::royalties::RoyaltyRegistry,
    alloy_primitives::{Address, U256},
    model::part::Part,
    std::{
        collections::HashMap,
        sync::{PoisonError, RwLock},
    },
};

/// Royalty records per token and per token id. Records of a token id take
/// precedence over the records of its token.
#[derive(Debug, Default)]
pub struct InMemoryRoyalties {
    by_token: RwLock<HashMap<Address, Vec<Part>>>,
    by_token_id: RwLock<HashMap<(Address, U256), Vec<Part>>>,
}

impl InMemoryRoyalties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_by_token(&self, token: Address, royalties: Vec<Part>) {
        self.by_token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, royalties);
    }

    pub fn set_by_token_id(&self, token: Address, token_id: U256, royalties: Vec<Part>) {
        self.by_token_id
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((token, token_id), royalties);
    }
}

impl RoyaltyRegistry for InMemoryRoyalties {
    fn royalties_for(&self, token: Address, token_id: Option<U256>) -> Vec<Part> {
        let by_token_id = token_id.and_then(|token_id| {
            self.by_token_id
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&(token, token_id))
                .cloned()
        });
        by_token_id
            .or_else(|| {
                self.by_token
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&token)
                    .cloned()
            })
            .unwrap_or_default()
    }
}
