//! Portable credentials produced by unblinding an approved application.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{
    blind::BlindPublicKey,
    error::Error,
    issuance::ApplicationId,
    pedersen::{PedersenCommitment, PedersenGenerators},
    pok::OpeningProof,
};

/// A commitment together with the authority's unblinded signature over its encoding.
///
/// Verifiable by anyone holding the authority's public blind key, without contacting the
/// authority and without learning the committed value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub app_id: ApplicationId,
    pub commitment: PedersenCommitment,
    pub proof: OpeningProof,
    #[serde(with = "crate::serde_util::decimal")]
    pub token: BigUint,
}

impl Credential {
    /// Check the blind signature over the commitment encoding, then the opening proof.
    pub fn validate(&self, gens: &PedersenGenerators, key: &BlindPublicKey) -> Result<(), Error> {
        if !key.verify(&self.token, &self.commitment.to_bytes()) {
            return Err(Error::SignatureVerificationFailed);
        }
        if !self.proof.verify(gens, &self.commitment) {
            return Err(Error::ProofVerificationFailed);
        }
        Ok(())
    }

    pub fn verify(&self, gens: &PedersenGenerators, key: &BlindPublicKey) -> bool {
        self.validate(gens, key).is_ok()
    }

    /// Bundle the credential with the public key needed to check it.
    pub fn payload(&self, key: &BlindPublicKey) -> CredentialPayload {
        CredentialPayload {
            credential: self.clone(),
            key: key.clone(),
        }
    }
}

/// Self-contained credential payload, suitable for embedding in a scannable code:
/// `{ "app_id", "commitment", "proof", "token", "N", "e" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
    #[serde(flatten)]
    pub credential: Credential,
    #[serde(flatten)]
    pub key: BlindPublicKey,
}

impl CredentialPayload {
    pub fn to_json(&self) -> String {
        // Serialization of these types cannot fail: every field maps to a string or object.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|_| Error::InvalidEncoding("malformed credential payload"))
    }

    /// Verify the payload against the public key it carries.
    ///
    /// Callers must still check that the embedded key is the authority's published key.
    pub fn verify(&self, gens: &PedersenGenerators) -> bool {
        self.credential.verify(gens, &self.key)
    }
}
