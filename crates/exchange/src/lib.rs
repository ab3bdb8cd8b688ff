#![forbid(unsafe_code)]

pub mod domain;
pub mod infra;
mod run;

pub use {
    domain::{Error, Exchange, Receipt},
    run::{main, run},
};
