//! Serde adapters for the wire formats: decimal strings for integers and hex strings for
//! points and signatures.

use k256::{ProjectivePoint, Scalar};
use num_bigint::BigUint;
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

use crate::curve::{scalar_from_biguint, scalar_to_biguint, PointEncoding};

pub(crate) fn parse_decimal(s: &str) -> Option<BigUint> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(s.as_bytes(), 10)
}

/// Arbitrary-precision unsigned integers as decimal strings.
pub mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_decimal(&s).ok_or_else(|| D::Error::custom("expected a decimal integer string"))
    }
}

/// Curve scalars as decimal strings. Values are reduced modulo the group order on input.
pub mod decimal_scalar {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Scalar, serializer: S) -> Result<S::Ok, S::Error> {
        super::decimal::serialize(&scalar_to_biguint(value), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Scalar, D::Error> {
        super::decimal::deserialize(deserializer).map(|n| scalar_from_biguint(&n))
    }
}

/// Curve points as hex of the 65-byte uncompressed encoding.
pub mod hex_point {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &ProjectivePoint,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value.to_uncompressed()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ProjectivePoint, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(D::Error::custom)?;
        ProjectivePoint::from_uncompressed(&bytes).map_err(D::Error::custom)
    }
}

/// Opaque byte strings as hex.
pub mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(D::Error::custom)
    }
}
