//! Pedersen commitments to a single integer value over secp256k1.

use core::ops::{Add, Sub};

use ff::Field;
use k256::{ProjectivePoint, Scalar};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    curve::{scalar_from_biguint, PointEncoding, POINT_LEN},
    error::Error,
    hash::FromHash,
};

/// Domain string hashed to derive the default value generator.
pub const DEFAULT_GENERATOR_DOMAIN: &str = "pedersen-H-v1";

/// A commitment `C = v * H + r * G`. Only this point is ever disclosed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PedersenCommitment {
    #[serde(with = "crate::serde_util::hex_point")]
    pub elem: ProjectivePoint,
}

/// The secret opening `(v, r)` of a [PedersenCommitment], retained by the committer.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Opening {
    pub value: Scalar,
    pub blind: Scalar,
}

/// Generators `(G, H)`: `G` carries the blinding factor and `H` carries the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PedersenGenerators(pub ProjectivePoint, pub ProjectivePoint);

impl PedersenGenerators {
    /// Manually construct a set of Pedersen commitment generators.
    ///
    /// Discrete log relationship between the generators must be unknown to the party producing a
    /// commitment using these generators. If the discrete log is known to the committer, they may
    /// be able to break the binding property of the commitment and produce two values that can
    /// be opened from the same commitment.
    pub fn new(blind_gen: ProjectivePoint, value_gen: ProjectivePoint) -> Self {
        Self(blind_gen, value_gen)
    }

    /// Use the curve base point as `G` and derive `H = k * G`, where `k` is the SHA-256 hash of
    /// `domain` reduced modulo the group order.
    ///
    /// Anyone can recompute `k`, so the discrete log of `H` relative to `G` is public. Committers
    /// that must not be able to equivocate should be given generators built with
    /// [PedersenGenerators::new] from an independent source.
    pub fn from_domain(domain: &[u8]) -> Self {
        let k = Scalar::hash_from_bytes::<Sha256>(domain);
        Self(ProjectivePoint::GENERATOR, ProjectivePoint::GENERATOR * k)
    }

    pub fn blind_gen(&self) -> ProjectivePoint {
        self.0
    }

    pub fn value_gen(&self) -> ProjectivePoint {
        self.1
    }

    pub fn commit_with_blind(&self, value: Scalar, blind: Scalar) -> PedersenCommitment {
        PedersenCommitment {
            elem: self.1 * value + self.0 * blind,
        }
    }

    /// Commit to `value`, reduced modulo the group order. When `blind` is `None` a uniformly
    /// random blinding factor is drawn from `rng`.
    pub fn commit<R>(
        &self,
        value: &BigUint,
        blind: Option<Scalar>,
        rng: &mut R,
    ) -> (PedersenCommitment, Opening)
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let value = scalar_from_biguint(value);
        let blind = blind.unwrap_or_else(|| Scalar::random(&mut *rng));
        (self.commit_with_blind(value, blind), Opening { value, blind })
    }

    /// Check that `opening` opens `commit`.
    pub fn open(&self, commit: &PedersenCommitment, opening: &Opening) -> Result<(), Error> {
        let expected = self.commit_with_blind(opening.value, opening.blind);
        match commit.elem.ct_eq(&expected.elem).into() {
            true => Ok(()),
            false => Err(Error::ProofVerificationFailed),
        }
    }
}

impl Default for PedersenGenerators {
    fn default() -> Self {
        Self::from_domain(DEFAULT_GENERATOR_DOMAIN.as_bytes())
    }
}

impl PedersenCommitment {
    /// Construct a [PedersenCommitment] directly from a group element.
    pub fn from_elem(elem: ProjectivePoint) -> Self {
        Self { elem }
    }

    pub fn to_bytes(&self) -> [u8; POINT_LEN] {
        self.elem.to_uncompressed()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        ProjectivePoint::from_uncompressed(bytes).map(Self::from_elem)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidEncoding("commitment is not hex"))?;
        Self::from_bytes(&bytes)
    }
}

impl Add for PedersenCommitment {
    type Output = PedersenCommitment;

    /// Add two commitments, which homomorphically adds the committed values and blinds.
    fn add(self, rhs: PedersenCommitment) -> Self::Output {
        PedersenCommitment {
            elem: self.elem + rhs.elem,
        }
    }
}

impl Sub for PedersenCommitment {
    type Output = PedersenCommitment;

    /// Subtract two commitments, which homomorphically subtracts the committed values and blinds.
    fn sub(self, rhs: PedersenCommitment) -> Self::Output {
        PedersenCommitment {
            elem: self.elem - rhs.elem,
        }
    }
}

impl Add<&Opening> for &Opening {
    type Output = Opening;

    fn add(self, rhs: &Opening) -> Opening {
        Opening {
            value: self.value + rhs.value,
            blind: self.blind + rhs.blind,
        }
    }
}

impl Sub<&Opening> for &Opening {
    type Output = Opening;

    fn sub(self, rhs: &Opening) -> Opening {
        Opening {
            value: self.value - rhs.value,
            blind: self.blind - rhs.blind,
        }
    }
}
