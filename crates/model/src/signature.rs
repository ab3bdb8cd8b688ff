use {
    crate::DomainSeparator,
    alloy_primitives::{Address, B256, Bytes, keccak256},
    std::fmt,
    thiserror::Error,
};

/// Returns the EIP-712 digest of a struct hash under `domain`:
/// `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct)`.
pub fn hashed_eip712_message(domain: &DomainSeparator, struct_hash: &B256) -> B256 {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(domain.0.as_slice());
    message[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(message)
}

/// How the signed digest was derived from the order digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EcdsaSigningScheme {
    /// The EIP-712 digest was signed directly.
    Eip712,
    /// The EIP-712 digest was signed as an `eth_sign` message. Marked by
    /// adding 4 to the recovery byte.
    EthSign,
}

/// Returns the message used for signing and recovery for the specified hash.
fn signing_message(scheme: EcdsaSigningScheme, hash: &B256) -> B256 {
    match scheme {
        EcdsaSigningScheme::Eip712 => *hash,
        EcdsaSigningScheme::EthSign => {
            let mut buffer = [0u8; 60];
            buffer[..28].copy_from_slice(b"\x19Ethereum Signed Message:\n32");
            buffer[28..].copy_from_slice(hash.as_slice());
            keccak256(buffer)
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("expected a 65 byte signature but got {0} bytes")]
    Length(usize),
    #[error("invalid recovery byte {0}")]
    RecoveryByte(u8),
    #[error("signer cannot be recovered")]
    Unrecoverable,
}

/// A 65 byte `r ‖ s ‖ v` secp256k1 signature.
#[derive(Eq, PartialEq, Clone, Copy, Hash)]
pub struct EcdsaSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", const_hex::encode(self.to_bytes()))
    }
}

impl EcdsaSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let bytes: &[u8; 65] = bytes
            .try_into()
            .map_err(|_| SignatureError::Length(bytes.len()))?;
        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }

    /// r + s + v
    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    pub fn to_vec(self) -> Bytes {
        Bytes::copy_from_slice(&self.to_bytes())
    }

    /// Splits the recovery byte into the signing scheme and the parity.
    fn scheme_and_parity(&self) -> Result<(EcdsaSigningScheme, bool), SignatureError> {
        match self.v {
            0 | 1 => Ok((EcdsaSigningScheme::Eip712, self.v == 1)),
            27 | 28 => Ok((EcdsaSigningScheme::Eip712, self.v == 28)),
            31 | 32 => Ok((EcdsaSigningScheme::EthSign, self.v == 32)),
            v => Err(SignatureError::RecoveryByte(v)),
        }
    }

    /// Recovers the address that signed `hash`.
    pub fn recover(&self, hash: &B256) -> Result<Address, SignatureError> {
        let (scheme, parity) = self.scheme_and_parity()?;
        let message = signing_message(scheme, hash);
        let signature =
            alloy_primitives::Signature::from_scalars_and_parity(self.r, self.s, parity);
        signature
            .recover_address_from_prehash(&message)
            .map_err(|_| SignatureError::Unrecoverable)
    }

    /// Wraps a signature produced over the message of `scheme`.
    pub fn from_signature(
        signature: &alloy_primitives::Signature,
        scheme: EcdsaSigningScheme,
    ) -> Self {
        let offset = match scheme {
            EcdsaSigningScheme::Eip712 => 27,
            EcdsaSigningScheme::EthSign => 31,
        };
        Self {
            r: signature.r().into(),
            s: signature.s().into(),
            v: offset + u8::from(signature.v()),
        }
    }

    /// The digest a signer has to sign so that [`Self::recover`] yields its
    /// address for `hash`.
    pub fn message(scheme: EcdsaSigningScheme, hash: &B256) -> B256 {
        signing_message(scheme, hash)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy_signer::SignerSync,
        alloy_signer_local::PrivateKeySigner,
    };

    #[test]
    fn eip712_digest_layout() {
        let domain = DomainSeparator(B256::repeat_byte(1));
        let struct_hash = B256::repeat_byte(2);
        let mut expected = vec![0x19, 0x01];
        expected.extend_from_slice(&[1; 32]);
        expected.extend_from_slice(&[2; 32]);
        assert_eq!(
            hashed_eip712_message(&domain, &struct_hash),
            keccak256(expected)
        );
    }

    #[test]
    fn bytes_round_trip() {
        let signature = EcdsaSignature {
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            v: 27,
        };
        let bytes = signature.to_bytes();
        assert_eq!(EcdsaSignature::from_bytes(&bytes).unwrap(), signature);
        assert_eq!(
            EcdsaSignature::from_bytes(&bytes[..64]),
            Err(SignatureError::Length(64))
        );
    }

    #[test]
    fn rejects_unknown_recovery_byte() {
        let signature = EcdsaSignature {
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            v: 5,
        };
        assert_eq!(
            signature.recover(&B256::ZERO),
            Err(SignatureError::RecoveryByte(5))
        );
    }

    #[test]
    fn recovers_signer_for_both_schemes() {
        let signer = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap();
        let hash = keccak256("order");
        for scheme in [EcdsaSigningScheme::Eip712, EcdsaSigningScheme::EthSign] {
            let raw = signer
                .sign_hash_sync(&EcdsaSignature::message(scheme, &hash))
                .unwrap();
            let signature = EcdsaSignature::from_signature(&raw, scheme);
            assert_eq!(signature.recover(&hash).unwrap(), signer.address());
        }
    }

    #[test]
    fn wrong_scheme_recovers_someone_else() {
        let signer = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap();
        let hash = keccak256("order");
        let raw = signer.sign_hash_sync(&hash).unwrap();
        let mut signature = EcdsaSignature::from_signature(&raw, EcdsaSigningScheme::Eip712);
        signature.v += 4;
        assert_ne!(signature.recover(&hash).ok(), Some(signer.address()));
    }
}
