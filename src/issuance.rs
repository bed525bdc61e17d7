//! Issuance lifecycle composing commitments, opening proofs, integrity signatures and blind
//! signatures.
//!
//! ```text
//! SUBMITTED --decide(approved)--> APPROVED
//!     |     --decide(declined)--> REJECTED(DECLINED)
//!     |     --decide(invalid)---> REJECTED(INTEGRITY_VIOLATION)
//!     +-----withdraw-----------> (record deleted)
//! ```
//!
//! Exactly-once signing rests on [ApplicationStore::compare_and_update]: the blind signature is
//! computed inside the store's atomic status transition, so at most one `decide` per record can
//! ever reach the signer.

use core::{fmt, marker::PhantomData, str::FromStr};

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    blind::{BlindKeyPair, BlindPublicKey, BlindingFactor},
    config::{ProtocolConfig, ProtocolParams},
    credential::Credential,
    error::Error,
    integrity::{IntegrityScheme, Secp256k1Ecdsa},
    pedersen::{Opening, PedersenCommitment},
    pok::OpeningProof,
    store::ApplicationStore,
};

/// Opaque application identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ApplicationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| Error::InvalidEncoding("application id is not a uuid"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The decision collaborator declined the application.
    Declined,
    /// The integrity signature or the opening proof did not verify.
    IntegrityViolation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Submitted,
    Approved,
    Rejected(RejectionReason),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Submitted)
    }
}

/// A status change out of [Status::Submitted], computed by [Issuance::decide].
///
/// Only this module can construct one; storage implementations apply it with
/// [ApplicationRecord::apply].
#[derive(Debug)]
pub struct Transition(TransitionKind);

#[derive(Debug)]
enum TransitionKind {
    Approve { signed_token: BigUint },
    Reject(RejectionReason),
}

/// An application as persisted by the storage collaborator.
///
/// The commitment, proof and integrity signature are fixed at submission. The blinded token
/// holds the blinded commitment until approval and the authority's signature over it after.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    id: ApplicationId,
    commitment: PedersenCommitment,
    proof: OpeningProof,
    #[serde(with = "crate::serde_util::hex_bytes")]
    integrity_signature: Vec<u8>,
    #[serde(with = "crate::serde_util::decimal")]
    blinded_token: BigUint,
    status: Status,
}

impl ApplicationRecord {
    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn commitment(&self) -> &PedersenCommitment {
        &self.commitment
    }

    pub fn proof(&self) -> &OpeningProof {
        &self.proof
    }

    pub fn integrity_signature(&self) -> &[u8] {
        &self.integrity_signature
    }

    pub fn blinded_token(&self) -> &BigUint {
        &self.blinded_token
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Apply a transition. Has no effect on a record that has already left
    /// [Status::Submitted].
    pub fn apply(&mut self, transition: Transition) {
        if self.status.is_terminal() {
            return;
        }
        match transition.0 {
            TransitionKind::Approve { signed_token } => {
                self.blinded_token = signed_token;
                self.status = Status::Approved;
            }
            TransitionKind::Reject(reason) => self.status = Status::Rejected(reason),
        }
    }

    fn is_valid<I: IntegrityScheme>(
        &self,
        params: &ProtocolParams,
        intake_key: &I::VerifyingKey,
    ) -> bool {
        I::verify(
            intake_key,
            &self.commitment.to_bytes(),
            &self.integrity_signature,
        ) && self.proof.verify(&params.generators, &self.commitment)
    }
}

/// What the applicant keeps after submitting: the commitment opening and the blinding factor.
///
/// None of this is ever sent to the authority.
pub struct ApplicantSecrets {
    pub id: ApplicationId,
    pub opening: Opening,
    pub blinding_factor: BlindingFactor,
}

impl fmt::Debug for ApplicantSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicantSecrets")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Key material of the intake side: it signs fresh commitments and blinds them under the
/// authority's public key.
pub struct ApplicantKeys<I: IntegrityScheme = Secp256k1Ecdsa> {
    pub intake: I::SigningKey,
    pub blind: BlindPublicKey,
}

/// Key material of the authority: it checks intake signatures and holds the blind signing key.
pub struct AuthorityKeys<I: IntegrityScheme = Secp256k1Ecdsa> {
    pub intake: I::VerifyingKey,
    pub blind: BlindKeyPair,
}

/// A protocol participant and the keys its role requires.
pub enum Role<I: IntegrityScheme = Secp256k1Ecdsa> {
    Applicant(ApplicantKeys<I>),
    Authority(AuthorityKeys<I>),
}

impl<I: IntegrityScheme> Role<I> {
    /// Generate matching applicant and authority key material.
    pub fn provision<R>(config: &ProtocolConfig, rng: &mut R) -> Result<(Self, Self), Error>
    where
        R: RngCore + CryptoRng,
    {
        config.validate()?;
        let intake = I::generate(rng);
        let intake_verifying = I::verifying_key(&intake);
        let blind = BlindKeyPair::generate(config.modulus_bits, &config.public_exponent(), rng)?;
        let applicant = ApplicantKeys {
            intake,
            blind: blind.public_key().clone(),
        };
        let authority = AuthorityKeys {
            intake: intake_verifying,
            blind,
        };
        Ok((Role::Applicant(applicant), Role::Authority(authority)))
    }

    pub fn applicant(&self) -> Option<&ApplicantKeys<I>> {
        match self {
            Role::Applicant(keys) => Some(keys),
            Role::Authority(_) => None,
        }
    }

    pub fn authority(&self) -> Option<&AuthorityKeys<I>> {
        match self {
            Role::Authority(keys) => Some(keys),
            Role::Applicant(_) => None,
        }
    }
}

/// Read-only view of an application for status pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub id: ApplicationId,
    pub status: Status,
    /// Whether the integrity signature and the opening proof both verify.
    pub valid: bool,
}

/// Derive an application value from identifying fields as `SHA-256("{name}-{amount}")`.
///
/// Intended for the collaborator that owns the plaintext fields.
pub fn value_from_fields(name: &str, amount: u64) -> BigUint {
    let digest = Sha256::digest(format!("{name}-{amount}").as_bytes());
    BigUint::from_bytes_be(&digest)
}

/// The issuance state machine over a storage collaborator.
pub struct Issuance<'a, S, I: IntegrityScheme = Secp256k1Ecdsa> {
    params: &'a ProtocolParams,
    store: S,
    _scheme: PhantomData<I>,
}

impl<'a, S: ApplicationStore, I: IntegrityScheme> Issuance<'a, S, I> {
    pub fn new(params: &'a ProtocolParams, store: S) -> Self {
        Self {
            params,
            store,
            _scheme: PhantomData,
        }
    }

    pub fn params(&self) -> &ProtocolParams {
        self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commit to `value`, prove knowledge of the opening, sign and blind the commitment, and
    /// persist the resulting record in [Status::Submitted].
    pub fn submit<R>(
        &self,
        keys: &ApplicantKeys<I>,
        value: &BigUint,
        rng: &mut R,
    ) -> Result<(ApplicationRecord, ApplicantSecrets), Error>
    where
        R: RngCore + CryptoRng,
    {
        let gens = &self.params.generators;
        let (commitment, opening) = gens.commit(value, None, rng);
        let proof = OpeningProof::prove(gens, &commitment, &opening, rng);
        let commitment_bytes = commitment.to_bytes();
        let integrity_signature = I::sign(&keys.intake, &commitment_bytes);
        let (blinded_token, blinding_factor) =
            keys.blind
                .blind_with_attempts(&commitment_bytes, self.params.max_blinding_attempts, rng)?;

        let record = ApplicationRecord {
            id: ApplicationId::random(rng),
            commitment,
            proof,
            integrity_signature,
            blinded_token,
            status: Status::Submitted,
        };
        self.store.insert(record.clone())?;
        info!(id = %record.id, "application submitted");

        let secrets = ApplicantSecrets {
            id: record.id,
            opening,
            blinding_factor,
        };
        Ok((record, secrets))
    }

    /// Record the authority's decision on a submitted application.
    ///
    /// The integrity signature and the opening proof are verified first; if either fails the
    /// application is rejected whatever `approved` says. Only an approved, valid application has
    /// its blinded token signed. Fails with [Error::AlreadyDecided], and changes nothing, if the
    /// application has left [Status::Submitted].
    pub fn decide(
        &self,
        keys: &AuthorityKeys<I>,
        id: &ApplicationId,
        approved: bool,
    ) -> Result<ApplicationRecord, Error> {
        let record = self
            .store
            .compare_and_update(id, Status::Submitted, |record| {
                if !record.is_valid::<I>(self.params, &keys.intake) {
                    warn!(%id, "integrity check failed, rejecting application");
                    return Ok(Transition(TransitionKind::Reject(
                        RejectionReason::IntegrityViolation,
                    )));
                }
                if !approved {
                    return Ok(Transition(TransitionKind::Reject(RejectionReason::Declined)));
                }
                let signed_token = keys.blind.sign(&record.blinded_token)?;
                Ok(Transition(TransitionKind::Approve { signed_token }))
            })
            .inspect_err(|err| warn!(%id, %err, "decision not recorded"))?;
        info!(%id, status = ?record.status, "application decided");
        Ok(record)
    }

    /// Unblind the authority's signature for an approved application into a credential.
    pub fn issue_credential(
        &self,
        id: &ApplicationId,
        blinding_factor: &BlindingFactor,
        key: &BlindPublicKey,
    ) -> Result<Credential, Error> {
        let record = self.store.get(id).ok_or(Error::UnknownApplication)?;
        if record.status != Status::Approved {
            return Err(Error::NotApproved);
        }
        let token = key.unblind(&record.blinded_token, blinding_factor)?;
        if !key.verify(&token, &record.commitment.to_bytes()) {
            return Err(Error::UnblindFailed);
        }
        info!(%id, "credential issued");
        Ok(Credential {
            app_id: record.id,
            commitment: record.commitment,
            proof: record.proof,
            token,
        })
    }

    /// Delete a submitted application. Fails with [Error::AlreadyDecided] once decided.
    pub fn withdraw(&self, id: &ApplicationId) -> Result<(), Error> {
        self.store.compare_and_remove(id, Status::Submitted)?;
        info!(%id, "application withdrawn");
        Ok(())
    }

    /// Current status of an application and whether its commitment checks out.
    pub fn status(
        &self,
        id: &ApplicationId,
        intake_key: &I::VerifyingKey,
    ) -> Result<StatusReport, Error> {
        let record = self.store.get(id).ok_or(Error::UnknownApplication)?;
        Ok(StatusReport {
            id: record.id,
            status: record.status,
            valid: record.is_valid::<I>(self.params, intake_key),
        })
    }

    /// Applications awaiting a decision.
    pub fn pending(&self) -> Vec<ApplicationRecord> {
        let mut pending: Vec<_> = self
            .store
            .list()
            .into_iter()
            .filter(|record| record.status == Status::Submitted)
            .collect();
        pending.sort_by_key(|record| record.id);
        pending
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use k256::ecdsa::SigningKey;
    use num_bigint::BigUint;

    use super::{
        value_from_fields, ApplicantKeys, ApplicationId, AuthorityKeys, Issuance, RejectionReason,
        Role, Status,
    };
    use crate::{
        blind::{BlindKeyPair, BlindingFactor},
        config::{ProtocolConfig, ProtocolParams},
        credential::CredentialPayload,
        error::Error,
        integrity::{IntegrityScheme, Secp256k1Ecdsa},
        store::{ApplicationStore, MemoryStore},
    };

    fn keys_for(blind: BlindKeyPair) -> (ApplicantKeys, AuthorityKeys) {
        let intake = SigningKey::random(&mut rand::thread_rng());
        let applicant = ApplicantKeys {
            intake: intake.clone(),
            blind: blind.public_key().clone(),
        };
        let authority = AuthorityKeys {
            intake: Secp256k1Ecdsa::verifying_key(&intake),
            blind,
        };
        (applicant, authority)
    }

    fn toy_keys() -> (ApplicantKeys, AuthorityKeys) {
        keys_for(BlindKeyPair::from_primes(&61u32.into(), &53u32.into(), &17u32.into()).unwrap())
    }

    // Negative checks need a modulus large enough that a chance collision is out of reach.
    fn generated_keys() -> (ApplicantKeys, AuthorityKeys) {
        let key = BlindKeyPair::generate(512, &65537u32.into(), &mut rand::thread_rng()).unwrap();
        keys_for(key)
    }

    #[test]
    fn approved_flow_issues_verifiable_credential() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let mut rng = rand::thread_rng();

        let value = value_from_fields("alice", 1500);
        let (record, secrets) = issuance.submit(&applicant, &value, &mut rng).unwrap();
        assert_eq!(record.status(), Status::Submitted);
        assert_eq!(secrets.id, record.id());
        params
            .generators
            .open(record.commitment(), &secrets.opening)
            .unwrap();
        assert_eq!(issuance.pending(), vec![record.clone()]);

        let decided = issuance.decide(&authority, &record.id(), true).unwrap();
        assert_eq!(decided.status(), Status::Approved);
        assert!(issuance.pending().is_empty());

        let credential = issuance
            .issue_credential(&record.id(), &secrets.blinding_factor, &applicant.blind)
            .unwrap();
        assert_eq!(credential.commitment, *record.commitment());
        credential
            .validate(&params.generators, &applicant.blind)
            .unwrap();

        let report = issuance.status(&record.id(), &authority.intake).unwrap();
        assert_eq!(report.status, Status::Approved);
        assert!(report.valid);
    }

    #[test]
    fn decide_is_exactly_once() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let mut rng = rand::thread_rng();

        let (record, _) = issuance
            .submit(&applicant, &BigUint::from(42u32), &mut rng)
            .unwrap();
        let first = issuance.decide(&authority, &record.id(), true).unwrap();

        let Err(Error::AlreadyDecided) = issuance.decide(&authority, &record.id(), true) else {
            panic!("decided the same application twice");
        };
        let Err(Error::AlreadyDecided) = issuance.decide(&authority, &record.id(), false) else {
            panic!("overwrote an approval with a rejection");
        };
        let stored = issuance.store().get(&record.id()).unwrap();
        assert_eq!(stored.blinded_token(), first.blinded_token());
        assert_eq!(stored.status(), Status::Approved);
    }

    #[test]
    fn concurrent_decide_signs_once() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let (record, _) = issuance
            .submit(&applicant, &BigUint::from(7u32), &mut rand::thread_rng())
            .unwrap();

        let successes = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| match issuance.decide(&authority, &record.id(), true) {
                    Ok(_) => {
                        successes.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(Error::AlreadyDecided) => {}
                    Err(err) => panic!("unexpected error: {err}"),
                });
            }
        });
        assert_eq!(successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tampered_submission_is_rejected_even_if_approved() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let mut rng = rand::thread_rng();

        let (record, _) = issuance
            .submit(&applicant, &BigUint::from(99u32), &mut rng)
            .unwrap();

        let mut bad_signature = record.clone();
        bad_signature.id = ApplicationId::random(&mut rng);
        bad_signature.integrity_signature[10] ^= 1;
        issuance.store().insert(bad_signature.clone()).unwrap();

        let mut bad_proof = record.clone();
        bad_proof.id = ApplicationId::random(&mut rng);
        bad_proof.proof.s1 += k256::Scalar::ONE;
        issuance.store().insert(bad_proof.clone()).unwrap();

        for id in [bad_signature.id(), bad_proof.id()] {
            assert!(!issuance.status(&id, &authority.intake).unwrap().valid);
            let decided = issuance.decide(&authority, &id, true).unwrap();
            assert_eq!(
                decided.status(),
                Status::Rejected(RejectionReason::IntegrityViolation)
            );
            assert_eq!(decided.blinded_token(), record.blinded_token());
        }
    }

    #[test]
    fn rejected_application_has_no_credential() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let mut rng = rand::thread_rng();

        let (record, secrets) = issuance
            .submit(&applicant, &BigUint::from(5u32), &mut rng)
            .unwrap();
        let Err(Error::NotApproved) =
            issuance.issue_credential(&record.id(), &secrets.blinding_factor, &applicant.blind)
        else {
            panic!("issued a credential for a pending application");
        };

        let decided = issuance.decide(&authority, &record.id(), false).unwrap();
        assert_eq!(decided.status(), Status::Rejected(RejectionReason::Declined));
        let Err(Error::NotApproved) =
            issuance.issue_credential(&record.id(), &secrets.blinding_factor, &applicant.blind)
        else {
            panic!("issued a credential for a rejected application");
        };
    }

    #[test]
    fn withdraw() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let mut rng = rand::thread_rng();

        let (pending, _) = issuance
            .submit(&applicant, &BigUint::from(1u32), &mut rng)
            .unwrap();
        issuance.withdraw(&pending.id()).unwrap();
        assert!(issuance.store().get(&pending.id()).is_none());
        let Err(Error::UnknownApplication) = issuance.decide(&authority, &pending.id(), true)
        else {
            panic!("decided a withdrawn application");
        };

        let (approved, _) = issuance
            .submit(&applicant, &BigUint::from(2u32), &mut rng)
            .unwrap();
        issuance.decide(&authority, &approved.id(), true).unwrap();
        let Err(Error::AlreadyDecided) = issuance.withdraw(&approved.id()) else {
            panic!("withdrew an approved application");
        };
        assert_eq!(
            issuance.store().get(&approved.id()).unwrap().status(),
            Status::Approved
        );
    }

    #[test]
    fn unknown_application() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let id = ApplicationId::random(&mut rand::thread_rng());

        let Err(Error::UnknownApplication) = issuance.decide(&authority, &id, true) else {
            panic!("decided an unknown application");
        };
        let Err(Error::UnknownApplication) = issuance.withdraw(&id) else {
            panic!("withdrew an unknown application");
        };
        let Err(Error::UnknownApplication) = issuance.status(&id, &authority.intake) else {
            panic!("reported status of an unknown application");
        };
        let Err(Error::UnknownApplication) =
            issuance.issue_credential(&id, &BlindingFactor::new(2u32.into()), &applicant.blind)
        else {
            panic!("issued a credential for an unknown application");
        };
    }

    #[test]
    fn wrong_blinding_factor_fails_to_unblind() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = generated_keys();
        let mut rng = rand::thread_rng();

        let (record, secrets) = issuance
            .submit(&applicant, &BigUint::from(11u32), &mut rng)
            .unwrap();
        issuance.decide(&authority, &record.id(), true).unwrap();

        // 2 and 3 are both coprime to an odd modulus with large prime factors.
        let wrong = match secrets.blinding_factor.as_biguint() == &BigUint::from(2u32) {
            true => BlindingFactor::new(3u32.into()),
            false => BlindingFactor::new(2u32.into()),
        };
        let Err(Error::UnblindFailed) =
            issuance.issue_credential(&record.id(), &wrong, &applicant.blind)
        else {
            panic!("unblinded with the wrong factor");
        };
    }

    #[test]
    fn credential_payload_transport() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = generated_keys();
        let mut rng = rand::thread_rng();

        let (record, secrets) = issuance
            .submit(&applicant, &value_from_fields("bob", 20), &mut rng)
            .unwrap();
        issuance.decide(&authority, &record.id(), true).unwrap();
        let credential = issuance
            .issue_credential(&record.id(), &secrets.blinding_factor, &applicant.blind)
            .unwrap();

        let json = credential.payload(&applicant.blind).to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for field in ["app_id", "commitment", "proof", "token", "N", "e"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["N"], applicant.blind.n.to_str_radix(10));

        let payload = CredentialPayload::from_json(&json).unwrap();
        assert_eq!(payload.credential, credential);
        assert!(payload.verify(&params.generators));

        let mut forged = payload.clone();
        forged.credential.token = (forged.credential.token + 1u32) % &forged.key.n;
        assert!(!forged.verify(&params.generators));
    }

    #[test]
    fn failed_signing_leaves_application_submitted() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, _) = generated_keys();
        let (_, mut authority) = toy_keys();
        authority.intake = Secp256k1Ecdsa::verifying_key(&applicant.intake);

        // Blinded under a 512-bit modulus, the token is not below the authority's N = 3233.
        let (record, _) = issuance
            .submit(&applicant, &BigUint::from(8u32), &mut rand::thread_rng())
            .unwrap();
        let Err(Error::InvalidInput(_)) = issuance.decide(&authority, &record.id(), true) else {
            panic!("signed a token blinded under a different key");
        };

        let stored = issuance.store().get(&record.id()).unwrap();
        assert_eq!(stored, record);
        assert_eq!(issuance.pending(), vec![record]);
    }

    #[test]
    fn provisioned_roles() {
        let config = ProtocolConfig {
            modulus_bits: 512,
            ..ProtocolConfig::default()
        };
        let params = ProtocolParams::new(&config).unwrap();
        let (applicant, authority) =
            Role::<Secp256k1Ecdsa>::provision(&config, &mut rand::thread_rng()).unwrap();
        let applicant = applicant.applicant().unwrap();
        let authority = authority.authority().unwrap();
        assert_eq!(applicant.blind, *authority.blind.public_key());

        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let mut rng = rand::thread_rng();
        let (record, secrets) = issuance
            .submit(applicant, &BigUint::from(123u32), &mut rng)
            .unwrap();
        issuance.decide(authority, &record.id(), true).unwrap();
        let credential = issuance
            .issue_credential(&record.id(), &secrets.blinding_factor, &applicant.blind)
            .unwrap();
        assert!(credential.verify(&params.generators, &applicant.blind));
    }

    #[test]
    fn record_transport() {
        let params = ProtocolParams::default();
        let issuance = Issuance::<_>::new(&params, MemoryStore::new());
        let (applicant, authority) = toy_keys();
        let (record, _) = issuance
            .submit(&applicant, &BigUint::from(3u32), &mut rand::thread_rng())
            .unwrap();
        let record = issuance.decide(&authority, &record.id(), false).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json["status"],
            serde_json::json!({ "state": "REJECTED", "reason": "DECLINED" })
        );
        let parsed: super::ApplicationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(record.id().to_string().parse::<ApplicationId>().unwrap(), record.id());
    }
}
