//! A ledger kept in memory: balances per asset class and the fills of orders.

use {
    crate::domain::ledger::{Ledger, LedgerError, Transaction},
    alloy_primitives::{Address, U256},
    model::{
        asset::{AssetData, AssetType, LazyMint},
        order::OrderKey,
    },
    std::{
        collections::HashMap,
        sync::{Mutex, PoisonError},
    },
};

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<State>,
}

#[derive(Clone, Debug, Default)]
struct State {
    native: HashMap<Address, U256>,
    /// By `(token, owner)`.
    erc20: HashMap<(Address, Address), U256>,
    /// Owner by `(token, token_id)`.
    erc721: HashMap<(Address, U256), Address>,
    /// By `(token, token_id, owner)`.
    erc1155: HashMap<(Address, U256, Address), U256>,
    /// Lazily minted supply by `(token, token_id)`.
    minted: HashMap<(Address, U256), U256>,
    fills: HashMap<OrderKey, U256>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Funds `owner`. Balances credited outside of transactions saturate at
    /// `U256::MAX`.
    pub fn credit_native(&self, owner: Address, amount: U256) {
        self.with_state(|state| saturating_credit(&mut state.native, owner, amount));
    }

    pub fn credit_erc20(&self, token: Address, owner: Address, amount: U256) {
        self.with_state(|state| saturating_credit(&mut state.erc20, (token, owner), amount));
    }

    pub fn set_erc721_owner(&self, token: Address, token_id: U256, owner: Address) {
        self.with_state(|state| {
            state.erc721.insert((token, token_id), owner);
        });
    }

    pub fn credit_erc1155(&self, token: Address, token_id: U256, owner: Address, amount: U256) {
        self.with_state(|state| {
            saturating_credit(&mut state.erc1155, (token, token_id, owner), amount)
        });
    }

    pub fn native_balance(&self, owner: Address) -> U256 {
        self.with_state(|state| state.native.get(&owner).copied().unwrap_or_default())
    }

    pub fn erc20_balance(&self, token: Address, owner: Address) -> U256 {
        self.with_state(|state| state.erc20.get(&(token, owner)).copied().unwrap_or_default())
    }

    pub fn erc721_owner(&self, token: Address, token_id: U256) -> Option<Address> {
        self.with_state(|state| state.erc721.get(&(token, token_id)).copied())
    }

    pub fn erc1155_balance(&self, token: Address, token_id: U256, owner: Address) -> U256 {
        self.with_state(|state| {
            state
                .erc1155
                .get(&(token, token_id, owner))
                .copied()
                .unwrap_or_default()
        })
    }

    pub fn fill(&self, key: &OrderKey) -> U256 {
        self.with_state(|state| Transaction::fill(state, key))
    }
}

impl Ledger for InMemoryLedger {
    fn transaction<T, E>(
        &self,
        work: impl FnOnce(&mut dyn Transaction) -> Result<T, E>,
    ) -> Result<T, E> {
        // The lock is held for the whole transaction, serializing them.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut staged = state.clone();
        let result = work(&mut staged)?;
        *state = staged;
        Ok(result)
    }
}

impl Transaction for State {
    fn fill(&self, key: &OrderKey) -> U256 {
        self.fills.get(key).copied().unwrap_or_default()
    }

    fn set_fill(&mut self, key: OrderKey, fill: U256) {
        self.fills.insert(key, fill);
    }

    fn transfer(
        &mut self,
        asset_type: &AssetType,
        value: U256,
        from: Address,
        to: Address,
    ) -> Result<(), LedgerError> {
        match asset_type.decode()? {
            AssetData::Eth => move_balance(&mut self.native, from, to, value),
            AssetData::Erc20 { token } => {
                debit(&mut self.erc20, (token, from), from, value)?;
                credit(&mut self.erc20, (token, to), to, value)
            }
            AssetData::Erc721 { token, token_id } => {
                self.transfer_erc721(token, token_id, value, from, to)
            }
            AssetData::Erc1155 { token, token_id } => {
                self.transfer_erc1155(token, token_id, value, from, to)
            }
            AssetData::Erc721Lazy { token, mint } => {
                if !self.erc721.contains_key(&(token, mint.token_id)) {
                    check_creator(token, &mint, from)?;
                    self.erc721.insert((token, mint.token_id), from);
                }
                self.transfer_erc721(token, mint.token_id, value, from, to)
            }
            AssetData::Erc1155Lazy { token, mint } => {
                let balance = self.erc1155_balance(token, mint.token_id, from);
                if balance < value && check_creator(token, &mint, from).is_ok() {
                    self.mint_erc1155(token, &mint, value - balance, from)?;
                }
                self.transfer_erc1155(token, mint.token_id, value, from, to)
            }
            AssetData::Collection { .. } | AssetData::Bundle(_) | AssetData::Custom => {
                Err(LedgerError::UnsupportedAsset(asset_type.class))
            }
        }
    }
}

impl State {
    fn erc1155_balance(&self, token: Address, token_id: U256, owner: Address) -> U256 {
        self.erc1155
            .get(&(token, token_id, owner))
            .copied()
            .unwrap_or_default()
    }

    fn transfer_erc721(
        &mut self,
        token: Address,
        token_id: U256,
        value: U256,
        from: Address,
        to: Address,
    ) -> Result<(), LedgerError> {
        if value != U256::from(1) {
            return Err(LedgerError::InvalidQuantity(value));
        }
        match self.erc721.get_mut(&(token, token_id)) {
            Some(owner) if *owner == from => {
                *owner = to;
                Ok(())
            }
            _ => Err(LedgerError::NotOwner {
                token,
                token_id,
                from,
            }),
        }
    }

    fn transfer_erc1155(
        &mut self,
        token: Address,
        token_id: U256,
        value: U256,
        from: Address,
        to: Address,
    ) -> Result<(), LedgerError> {
        debit(&mut self.erc1155, (token, token_id, from), from, value)?;
        credit(&mut self.erc1155, (token, token_id, to), to, value)
    }

    /// Mints `amount` to the creator, bounded by the declared supply.
    fn mint_erc1155(
        &mut self,
        token: Address,
        mint: &LazyMint,
        amount: U256,
        creator: Address,
    ) -> Result<(), LedgerError> {
        let token_id = mint.token_id;
        let minted = self.minted.entry((token, token_id)).or_default();
        let total = minted
            .checked_add(amount)
            .filter(|total| mint.supply.is_none_or(|supply| *total <= supply))
            .ok_or(LedgerError::SupplyExceeded { token, token_id })?;
        *minted = total;
        credit(&mut self.erc1155, (token, token_id, creator), creator, amount)
    }
}

/// Only the first creator of a lazily minted token may mint it.
fn check_creator(token: Address, mint: &LazyMint, from: Address) -> Result<(), LedgerError> {
    match mint.creators.first() {
        Some(creator) if creator.account == from => Ok(()),
        _ => Err(LedgerError::NotCreator {
            token,
            token_id: mint.token_id,
        }),
    }
}

fn debit<K: std::hash::Hash + Eq>(
    balances: &mut HashMap<K, U256>,
    key: K,
    owner: Address,
    value: U256,
) -> Result<(), LedgerError> {
    let balance = balances.entry(key).or_default();
    *balance = balance
        .checked_sub(value)
        .ok_or(LedgerError::InsufficientBalance {
            owner,
            balance: *balance,
            required: value,
        })?;
    Ok(())
}

fn move_balance(
    balances: &mut HashMap<Address, U256>,
    from: Address,
    to: Address,
    value: U256,
) -> Result<(), LedgerError> {
    debit(balances, from, from, value)?;
    credit(balances, to, to, value)
}

fn credit<K: std::hash::Hash + Eq>(
    balances: &mut HashMap<K, U256>,
    key: K,
    owner: Address,
    value: U256,
) -> Result<(), LedgerError> {
    let balance = balances.entry(key).or_default();
    *balance = balance
        .checked_add(value)
        .ok_or(LedgerError::Overflow { owner, value })?;
    Ok(())
}

fn saturating_credit<K: std::hash::Hash + Eq>(
    balances: &mut HashMap<K, U256>,
    key: K,
    value: U256,
) {
    let balance = balances.entry(key).or_default();
    *balance = balance.saturating_add(value);
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_primitives::{B256, Bytes},
        model::part::Part,
        testlib::{accounts, tokens},
    };

    fn u(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn failed_transactions_are_rolled_back() {
        let alice = accounts::alice().address();
        let bob = accounts::bob().address();
        let ledger = InMemoryLedger::new();
        ledger.credit_native(alice, u(100));
        let key = OrderKey(B256::repeat_byte(1));

        let result = ledger.transaction(|tx| {
            tx.set_fill(key, u(10));
            tx.transfer(&AssetType::eth(), u(60), alice, bob)?;
            tx.transfer(&AssetType::eth(), u(60), alice, bob)
        });
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                balance,
                required,
                ..
            }) if balance == u(40) && required == u(60)
        ));
        assert_eq!(ledger.native_balance(alice), u(100));
        assert_eq!(ledger.native_balance(bob), U256::ZERO);
        assert_eq!(ledger.fill(&key), U256::ZERO);

        ledger
            .transaction(|tx| {
                tx.set_fill(key, u(10));
                tx.transfer(&AssetType::eth(), u(60), alice, bob)
            })
            .unwrap();
        assert_eq!(ledger.native_balance(bob), u(60));
        assert_eq!(ledger.fill(&key), u(10));
    }

    #[test]
    fn non_fungible_tokens_move_with_their_owner() {
        let alice = accounts::alice().address();
        let bob = accounts::bob().address();
        let ledger = InMemoryLedger::new();
        ledger.set_erc721_owner(tokens::ART, u(7), alice);
        let art = AssetType::erc721(tokens::ART, u(7));

        let result = ledger.transaction(|tx| tx.transfer(&art, u(1), bob, alice));
        assert!(matches!(result, Err(LedgerError::NotOwner { .. })));
        let result = ledger.transaction(|tx| tx.transfer(&art, u(2), alice, bob));
        assert!(matches!(result, Err(LedgerError::InvalidQuantity(_))));

        ledger
            .transaction(|tx| tx.transfer(&art, u(1), alice, bob))
            .unwrap();
        assert_eq!(ledger.erc721_owner(tokens::ART, u(7)), Some(bob));
    }

    #[test]
    fn lazy_tokens_are_minted_by_their_creator() {
        let creator = accounts::alice().address();
        let buyer = accounts::bob().address();
        let mint = LazyMint {
            token_id: u(1),
            token_uri: "ipfs://1".to_string(),
            supply: Some(u(5)),
            creators: vec![Part::new(creator, 10_000)],
            royalties: vec![],
            signatures: vec![Bytes::new()],
        };
        let editions = AssetType::erc1155_lazy(tokens::EDITIONS, &mint);
        let ledger = InMemoryLedger::new();

        let result = ledger.transaction(|tx| tx.transfer(&editions, u(1), buyer, creator));
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));

        ledger
            .transaction(|tx| tx.transfer(&editions, u(3), creator, buyer))
            .unwrap();
        assert_eq!(ledger.erc1155_balance(tokens::EDITIONS, u(1), buyer), u(3));

        let result = ledger.transaction(|tx| tx.transfer(&editions, u(3), creator, buyer));
        assert!(matches!(result, Err(LedgerError::SupplyExceeded { .. })));
        ledger
            .transaction(|tx| tx.transfer(&editions, u(2), creator, buyer))
            .unwrap();
        assert_eq!(ledger.erc1155_balance(tokens::EDITIONS, u(1), buyer), u(5));

        let art = AssetType::erc721_lazy(tokens::ART, &LazyMint { supply: None, ..mint });
        let result = ledger.transaction(|tx| tx.transfer(&art, u(1), buyer, buyer));
        assert!(matches!(result, Err(LedgerError::NotCreator { .. })));
        ledger
            .transaction(|tx| tx.transfer(&art, u(1), creator, buyer))
            .unwrap();
        assert_eq!(ledger.erc721_owner(tokens::ART, u(1)), Some(buyer));
    }

    #[test]
    fn credits_never_wrap_around() {
        let alice = accounts::alice().address();
        let bob = accounts::bob().address();
        let ledger = InMemoryLedger::new();
        ledger.credit_native(alice, u(100));
        ledger.credit_native(bob, U256::MAX);
        ledger.credit_erc20(tokens::DAI, alice, u(100));
        ledger.credit_erc20(tokens::DAI, bob, U256::MAX);
        ledger.credit_erc20(tokens::DAI, bob, u(1));
        assert_eq!(ledger.erc20_balance(tokens::DAI, bob), U256::MAX);

        let result = ledger.transaction(|tx| tx.transfer(&AssetType::eth(), u(5), alice, bob));
        assert!(matches!(
            result,
            Err(LedgerError::Overflow { owner, value }) if owner == bob && value == u(5)
        ));
        let dai = AssetType::erc20(tokens::DAI);
        let result = ledger.transaction(|tx| {
            tx.transfer(&dai, u(5), bob, alice)?;
            tx.transfer(&dai, u(10), alice, bob)
        });
        assert!(matches!(result, Err(LedgerError::Overflow { .. })));

        assert_eq!(ledger.native_balance(alice), u(100));
        assert_eq!(ledger.native_balance(bob), U256::MAX);
        assert_eq!(ledger.erc20_balance(tokens::DAI, alice), u(100));
        assert_eq!(ledger.erc20_balance(tokens::DAI, bob), U256::MAX);
    }

    #[test]
    fn bundles_are_not_transferred_directly() {
        let ledger = InMemoryLedger::new();
        let bundle = AssetType::bundle(&[]);
        let result = ledger.transaction(|tx| {
            tx.transfer(
                &bundle,
                u(1),
                accounts::alice().address(),
                accounts::bob().address(),
            )
        });
        assert!(matches!(result, Err(LedgerError::UnsupportedAsset(_))));
    }
}
