//! Builder for orders with sensible defaults.

use {
    alloy_primitives::{Address, U256},
    model::{
        asset::{Asset, AssetType},
        order::{DataKind, KeyVersion, Order, OrderData},
        part::Part,
    },
};

#[derive(Clone, Debug)]
pub struct OrderBuilder {
    order: Order,
    data: OrderData,
}

impl OrderBuilder {
    /// An order of `maker` giving `make` for `take` with salt 1 and empty V1
    /// data.
    pub fn new(maker: Address, make: Asset, take: Asset) -> Self {
        Self {
            order: Order::new(maker, make, take, U256::from(1), DataKind::V1, Vec::new()),
            data: OrderData::default(),
        }
    }

    pub fn sell(maker: Address, make: (AssetType, u64), take: (AssetType, u64)) -> Self {
        Self::new(
            maker,
            Asset::new(make.0, U256::from(make.1)),
            Asset::new(take.0, U256::from(take.1)),
        )
    }

    pub fn salt(mut self, salt: u64) -> Self {
        self.order.salt = U256::from(salt);
        self
    }

    pub fn taker(mut self, taker: Address) -> Self {
        self.order.taker = taker;
        self
    }

    pub fn window(mut self, start: u64, end: u64) -> Self {
        self.order.start = start;
        self.order.end = end;
        self
    }

    /// Switches the data kind and the key version that goes with it.
    pub fn kind(mut self, kind: DataKind) -> Self {
        self.order.data_kind = kind;
        self.order.key_version = KeyVersion::for_kind(kind);
        self
    }

    pub fn payouts(mut self, payouts: Vec<Part>) -> Self {
        self.data.payouts = payouts;
        self
    }

    pub fn origin_fees(mut self, fees: Vec<Part>) -> Self {
        self.data.origin_fees = fees;
        self
    }

    /// Tracks the make side. Only honored by V2 data.
    pub fn make_fill(mut self) -> Self {
        self.data.is_make_fill = true;
        self
    }

    pub fn max_fees(mut self, bps: u64) -> Self {
        self.data.max_fees_bps = Some(bps);
        self
    }

    pub fn build(self) -> Order {
        let mut order = self.order;
        order.data = self
            .data
            .encode(order.data_kind)
            .expect("test orders use known data kinds");
        order
    }
}
