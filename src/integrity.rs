//! Integrity signatures binding a commitment to the intake path that produced it.

use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand::{CryptoRng, RngCore};

const SIGNATURE_LENGTH: usize = 64; // R || S

/// A signature scheme used to authenticate commitments before any further processing.
pub trait IntegrityScheme {
    type SigningKey;
    type VerifyingKey: Clone;

    fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self::SigningKey;

    fn verifying_key(key: &Self::SigningKey) -> Self::VerifyingKey;

    fn sign(key: &Self::SigningKey, message: &[u8]) -> Vec<u8>;

    /// Returns `false` for malformed or non-matching signatures.
    fn verify(key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool;
}

/// ECDSA over secp256k1 with SHA-256 and low-S normalised signatures.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Ecdsa;

impl IntegrityScheme for Secp256k1Ecdsa {
    type SigningKey = SigningKey;
    type VerifyingKey = VerifyingKey;

    fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> SigningKey {
        SigningKey::random(rng)
    }

    fn verifying_key(key: &SigningKey) -> VerifyingKey {
        key.verifying_key().to_owned()
    }

    fn sign(key: &SigningKey, message: &[u8]) -> Vec<u8> {
        let signature: Signature = key.sign(message);
        let signature = signature.normalize_s().unwrap_or(signature);
        signature.to_vec()
    }

    fn verify(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        if signature.len() != SIGNATURE_LENGTH {
            return false;
        }
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        if signature.normalize_s().is_some() {
            // Reject any signatures with a `s` value in the upper half of the curve order.
            return false;
        }
        key.verify(message, &signature).is_ok()
    }
}
