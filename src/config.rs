//! Protocol configuration, constructed once at startup and shared by reference.

use num_bigint::BigUint;
use num_integer::Integer;
use serde::{Deserialize, Serialize};

use crate::{
    blind::{DEFAULT_PUBLIC_EXPONENT, MAX_BLINDING_ATTEMPTS},
    error::Error,
    pedersen::{PedersenGenerators, DEFAULT_GENERATOR_DOMAIN},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Bit length of the blind signature modulus `N`.
    pub modulus_bits: u64,
    /// Blind signature public exponent `e`.
    pub public_exponent: u32,
    /// Domain string hashed to derive the commitment value generator `H`.
    pub generator_domain: String,
    /// Draws allowed when sampling a blinding factor coprime to `N`.
    pub max_blinding_attempts: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            modulus_bits: 2048,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            generator_domain: DEFAULT_GENERATOR_DOMAIN.into(),
            max_blinding_attempts: MAX_BLINDING_ATTEMPTS,
        }
    }
}

impl ProtocolConfig {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(s).map_err(|_| Error::InvalidEncoding("malformed config"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.modulus_bits < 64 {
            return Err(Error::InvalidInput("modulus_bits must be at least 64"));
        }
        if self.public_exponent < 3 || self.public_exponent.is_even() {
            return Err(Error::InvalidInput("public_exponent must be odd and at least 3"));
        }
        if self.generator_domain.is_empty() {
            return Err(Error::InvalidInput("generator_domain must not be empty"));
        }
        if self.max_blinding_attempts == 0 {
            return Err(Error::InvalidInput("max_blinding_attempts must be positive"));
        }
        Ok(())
    }

    pub fn public_exponent(&self) -> BigUint {
        BigUint::from(self.public_exponent)
    }
}

/// Immutable values derived from a [ProtocolConfig].
#[derive(Clone, Debug)]
pub struct ProtocolParams {
    pub generators: PedersenGenerators,
    pub max_blinding_attempts: u32,
}

impl ProtocolParams {
    pub fn new(config: &ProtocolConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            generators: PedersenGenerators::from_domain(config.generator_domain.as_bytes()),
            max_blinding_attempts: config.max_blinding_attempts,
        })
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            generators: PedersenGenerators::default(),
            max_blinding_attempts: MAX_BLINDING_ATTEMPTS,
        }
    }
}
