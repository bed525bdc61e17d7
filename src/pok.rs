//! Non-interactive proof of knowledge for a Pedersen commitment opening.
//!
//! Schnorr-style sigma protocol for the relation `C = v * H + r * G`, made non-interactive with
//! the Fiat-Shamir transform. The challenge is `SHA-256(encode(C) || encode(T))` reduced modulo
//! the group order.

use ff::Field;
use k256::{ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{
    curve::PointEncoding,
    hash::FromHash,
    pedersen::{Opening, PedersenCommitment, PedersenGenerators},
};

/// Proof `(T, s1, s2)` that the prover knows `(v, r)` with `C = v * H + r * G`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningProof {
    #[serde(with = "crate::serde_util::hex_point")]
    pub t: ProjectivePoint,
    #[serde(with = "crate::serde_util::decimal_scalar")]
    pub s1: Scalar,
    #[serde(with = "crate::serde_util::decimal_scalar")]
    pub s2: Scalar,
}

fn challenge(commit: &PedersenCommitment, t: &ProjectivePoint) -> Scalar {
    let mut hasher = Sha256::new();
    hasher.update(commit.elem.to_uncompressed());
    hasher.update(t.to_uncompressed());
    Scalar::from_hash(hasher)
}

impl OpeningProof {
    /// Prove knowledge of an opening for the given commitment.
    ///
    /// This function is paired with [OpeningProof::verify].
    pub fn prove<R>(
        gens: &PedersenGenerators,
        commit: &PedersenCommitment,
        opening: &Opening,
        rng: &mut R,
    ) -> Self
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let k1 = Scalar::random(&mut *rng);
        let k2 = Scalar::random(&mut *rng);
        let t = gens.value_gen() * k1 + gens.blind_gen() * k2;
        let c = challenge(commit, &t);
        Self {
            t,
            s1: k1 + c * opening.value,
            s2: k2 + c * opening.blind,
        }
    }

    /// Verify knowledge of an opening for the given commitment, checking
    /// `s1 * H + s2 * G == T + c * C`.
    pub fn verify(&self, gens: &PedersenGenerators, commit: &PedersenCommitment) -> bool {
        let c = challenge(commit, &self.t);
        let lhs = gens.value_gen() * self.s1 + gens.blind_gen() * self.s2;
        let rhs = self.t + commit.elem * c;
        lhs.ct_eq(&rhs).into()
    }

    /// Verify a proof received in transport form: the commitment as hex of its point encoding
    /// and the proof as a JSON object `{ "t": hex, "s1": decimal, "s2": decimal }`.
    ///
    /// Any decoding failure is reported as an invalid proof.
    pub fn verify_encoded(gens: &PedersenGenerators, commitment_hex: &str, proof_json: &str) -> bool {
        let Ok(commit) = PedersenCommitment::from_hex(commitment_hex) else {
            return false;
        };
        let Ok(proof) = serde_json::from_str::<OpeningProof>(proof_json) else {
            return false;
        };
        proof.verify(gens, &commit)
    }
}
