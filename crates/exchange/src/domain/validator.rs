//! Authentication of orders: sender bypass, ECDSA signatures of accounts,
//! EIP-1271 signatures of contracts and the validity window.

use {
    alloy_primitives::{Address, B256, FixedBytes},
    hex_literal::hex,
    model::{DomainSeparator, order::Order, signature::EcdsaSignature},
    std::{fmt, sync::Arc},
    thiserror::Error,
};

/// `bytes4(keccak256("isValidSignature(bytes32,bytes)"))`, returned by
/// contracts that accept a signature.
pub const EIP1271_MAGIC_VALUE: FixedBytes<4> = FixedBytes(hex!("1626ba7e"));

/// Signature verification of a contract maker.
///
/// https://eips.ethereum.org/EIPS/eip-1271
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Eip1271: Send + Sync {
    /// Returns [`EIP1271_MAGIC_VALUE`] if the contract accepts `signature` for
    /// `hash`.
    fn is_valid_signature(&self, hash: B256, signature: &[u8]) -> FixedBytes<4>;
}

/// What kind of identity signs for an address.
#[derive(Clone)]
pub enum Signer {
    /// An externally owned account, verified by ECDSA recovery.
    Account,
    /// A contract that verifies signatures on its own behalf.
    Contract(Arc<dyn Eip1271>),
    /// A contract without signature verification support.
    OpaqueContract,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => f.write_str("Account"),
            Self::Contract(_) => f.write_str("Contract"),
            Self::OpaqueContract => f.write_str("OpaqueContract"),
        }
    }
}

/// Resolves the kind of signer behind an address.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait SignerDirectory: Send + Sync {
    fn signer(&self, address: Address) -> Signer;
}

/// Source of the current unix time.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Individually disableable authentication paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checks {
    pub native_signatures: bool,
    pub contract_signatures: bool,
    pub sender_bypass: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            native_signatures: true,
            contract_signatures: true,
            sender_bypass: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("signature does not authorize the order")]
    BadSignature,
    #[error("maker contract cannot verify signatures")]
    UnsupportedSigner,
    #[error("order is valid from {start} to {end} but now is {now}")]
    OutOfBounds { start: u64, end: u64, now: u64 },
    #[error("orders without salt must be sent by their maker")]
    MakerIsNotSender,
    #[error("{0} are disabled")]
    Disabled(&'static str),
}

pub struct OrderValidator {
    domain: DomainSeparator,
    checks: Checks,
    signers: Arc<dyn SignerDirectory>,
    clock: Arc<dyn Clock>,
}

impl OrderValidator {
    pub fn new(
        domain: DomainSeparator,
        checks: Checks,
        signers: Arc<dyn SignerDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            domain,
            checks,
            signers,
            clock,
        }
    }

    /// Checks that `order` is currently valid and was authorized by its maker,
    /// either by sending it or by signing it.
    pub fn validate(
        &self,
        order: &Order,
        signature: &[u8],
        sender: Address,
    ) -> Result<(), AuthError> {
        self.validate_window(order)?;

        if order.salt.is_zero() {
            if !self.checks.sender_bypass {
                return Err(AuthError::Disabled("sender orders"));
            }
            if sender != order.maker {
                return Err(AuthError::MakerIsNotSender);
            }
            return Ok(());
        }
        if sender == order.maker && self.checks.sender_bypass {
            return Ok(());
        }

        let hash = order.signing_hash(&self.domain);
        match self.signers.signer(order.maker) {
            Signer::Account => {
                if !self.checks.native_signatures {
                    return Err(AuthError::Disabled("native signatures"));
                }
                let signer = EcdsaSignature::from_bytes(signature)
                    .and_then(|signature| signature.recover(&hash))
                    .map_err(|_| AuthError::BadSignature)?;
                if signer != order.maker {
                    return Err(AuthError::BadSignature);
                }
                Ok(())
            }
            Signer::Contract(contract) => {
                if !self.checks.contract_signatures {
                    return Err(AuthError::Disabled("contract signatures"));
                }
                if contract.is_valid_signature(hash, signature) != EIP1271_MAGIC_VALUE {
                    return Err(AuthError::BadSignature);
                }
                Ok(())
            }
            Signer::OpaqueContract => {
                if !self.checks.contract_signatures {
                    return Err(AuthError::Disabled("contract signatures"));
                }
                Err(AuthError::UnsupportedSigner)
            }
        }
    }

    /// Checks `start <= now <= end` where a `0` bound is open.
    fn validate_window(&self, order: &Order) -> Result<(), AuthError> {
        let now = self.clock.now();
        let out_of_bounds = (order.start != 0 && now < order.start)
            || (order.end != 0 && now > order.end)
            || (order.start != 0 && order.end != 0 && order.end < order.start);
        if out_of_bounds {
            return Err(AuthError::OutOfBounds {
                start: order.start,
                end: order.end,
                now,
            });
        }
        Ok(())
    }
}
