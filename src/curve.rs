//! Group operations and fixed-width encodings over secp256k1.
//!
//! Point arithmetic is provided by [ProjectivePoint] through the [group::Group] operators
//! (`+`, `*` by [Scalar], `==`). This module adds the 65-byte uncompressed wire encoding and
//! the conversions between arbitrary-precision integers and reduced scalars.

use ff::PrimeField;
use group::Group;
use k256::{
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar,
};
use num_bigint::BigUint;

use crate::error::Error;

/// Length of an encoded point: a one byte tag followed by X and Y.
pub const POINT_LEN: usize = 65;

const UNCOMPRESSED_TAG: u8 = 0x04;

// secp256k1 group order, big-endian.
const ORDER_BE: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Order of the group generated by [ProjectivePoint::GENERATOR].
pub fn order() -> BigUint {
    BigUint::from_bytes_be(&ORDER_BE)
}

/// Fixed-width uncompressed encoding for curve points.
pub trait PointEncoding: Sized {
    /// Encode as `0x04 || X || Y`, with both coordinates as 32 byte big-endian integers.
    ///
    /// The identity has no affine coordinates. It is encoded as 65 zero bytes, which
    /// [PointEncoding::from_uncompressed] always rejects.
    fn to_uncompressed(&self) -> [u8; POINT_LEN];

    /// Decode a point, rejecting wrong lengths, other tags, and coordinates not on the curve.
    fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error>;
}

impl PointEncoding for ProjectivePoint {
    fn to_uncompressed(&self) -> [u8; POINT_LEN] {
        let mut out = [0u8; POINT_LEN];
        if Group::is_identity(self).into() {
            return out;
        }
        let encoded = self.to_affine().to_encoded_point(false);
        let bytes = encoded.as_bytes();
        if bytes.len() == POINT_LEN {
            out.copy_from_slice(bytes);
        }
        out
    }

    fn from_uncompressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != POINT_LEN {
            return Err(Error::InvalidEncoding("point must be 65 bytes"));
        }
        if bytes[0] != UNCOMPRESSED_TAG {
            return Err(Error::InvalidEncoding("point tag must be 0x04"));
        }
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|_| Error::InvalidEncoding("malformed point"))?;
        Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .map(ProjectivePoint::from)
            .ok_or(Error::InvalidEncoding("point is not on the curve"))
    }
}

/// Reduce an arbitrary-precision integer modulo the group order.
pub fn scalar_from_biguint(value: &BigUint) -> Scalar {
    let reduced = (value % order()).to_bytes_be();
    let mut repr = FieldBytes::default();
    // Reduced values are below the order and so fit in 32 bytes.
    repr[32 - reduced.len()..].copy_from_slice(&reduced);
    Option::<Scalar>::from(Scalar::from_repr(repr)).unwrap_or(Scalar::ZERO)
}

pub fn scalar_to_biguint(scalar: &Scalar) -> BigUint {
    BigUint::from_bytes_be(&scalar.to_repr())
}
