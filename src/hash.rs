//! Hash-to-scalar traits used in this crate.

use digest::Digest;
use k256::{elliptic_curve::ops::Reduce, Scalar, U256};
use typenum::U32;

pub trait FromHash: Sized {
    type OutputSize;

    fn from_hash<D>(hash: D) -> Self
    where
        D: Digest<OutputSize = Self::OutputSize>;

    fn hash_from_bytes<D>(input: &[u8]) -> Self
    where
        D: Digest<OutputSize = Self::OutputSize>,
    {
        let mut hash = D::new();
        hash.update(input);
        Self::from_hash(hash)
    }
}

impl FromHash for Scalar {
    type OutputSize = U32;

    /// Interprets the digest as a big-endian integer and reduces it modulo the group order.
    fn from_hash<D>(hash: D) -> Self
    where
        D: Digest<OutputSize = Self::OutputSize>,
    {
        <Scalar as Reduce<U256>>::reduce_bytes(&hash.finalize())
    }
}
