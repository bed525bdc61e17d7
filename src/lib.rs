//! Privacy-preserving credential issuance.
//!
//! An applicant commits to a secret value with a Pedersen commitment, proves knowledge of the
//! opening, and obtains an RSA blind signature over the commitment from an authority that never
//! sees the value. The unblinded signature, together with the commitment and proof, forms a
//! credential that anyone holding the authority's public key can verify.

pub mod blind;
pub use blind::{BlindKeyPair, BlindPublicKey, BlindingFactor};

pub mod config;
pub use config::{ProtocolConfig, ProtocolParams};

pub mod credential;
pub use credential::{Credential, CredentialPayload};

pub mod curve;
pub mod error;
pub use error::Error;

pub mod hash;
pub mod integrity;

pub mod issuance;
pub use issuance::{
    value_from_fields, ApplicantKeys, ApplicantSecrets, ApplicationId, ApplicationRecord,
    AuthorityKeys, Issuance, RejectionReason, Role, Status, StatusReport,
};

pub mod pedersen;
pub use pedersen::{Opening, PedersenCommitment, PedersenGenerators};

pub mod pok;
pub use pok::OpeningProof;

mod serde_util;

pub mod store;
pub use store::{ApplicationStore, MemoryStore};
