use {
    crate::abi,
    alloy_primitives::{Address, aliases::U96},
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

/// A share of an amount owed to `account`, in basis points.
///
/// Used for payouts, origin fees, royalties and lazy mint creators alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Part {
    pub account: Address,
    pub value: u16,
}

impl Part {
    pub fn new(account: Address, value: u16) -> Self {
        Self { account, value }
    }
}

/// Sum of the basis points of all parts.
pub fn total_bps(parts: &[Part]) -> u64 {
    parts.iter().map(|part| u64::from(part.value)).sum()
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("part value {0} does not fit into basis points")]
pub struct PartOutOfRange(pub U96);

impl TryFrom<abi::Part> for Part {
    type Error = PartOutOfRange;

    fn try_from(part: abi::Part) -> Result<Self, Self::Error> {
        Ok(Self {
            account: part.account,
            value: u16::try_from(part.value).map_err(|_| PartOutOfRange(part.value))?,
        })
    }
}

impl From<Part> for abi::Part {
    fn from(part: Part) -> Self {
        Self {
            account: part.account,
            value: U96::from(part.value),
        }
    }
}

pub(crate) fn from_abi(parts: Vec<abi::Part>) -> Result<Vec<Part>, PartOutOfRange> {
    parts.into_iter().map(Part::try_from).collect()
}

pub(crate) fn to_abi(parts: &[Part]) -> Vec<abi::Part> {
    parts.iter().copied().map(Into::into).collect()
}
