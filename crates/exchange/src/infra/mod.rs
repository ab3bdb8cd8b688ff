pub mod cli;
pub mod clock;
pub mod config;
pub mod ledger;
pub mod observe;
pub mod royalties;
pub mod scenario;
pub mod signers;

pub use {
    clock::{FixedClock, SystemClock},
    config::Config,
    ledger::InMemoryLedger,
    royalties::InMemoryRoyalties,
    scenario::Scenario,
    signers::{InMemorySigners, StaticEip1271},
};
