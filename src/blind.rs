//! RSA blind signatures.
//!
//! The signer computes `B^d mod N` over a blinded value `B = M * r^e mod N` without learning the
//! message representative `M`. The requester removes the blinding by multiplying with `r^-1`,
//! yielding an ordinary RSA signature `M^d mod N` over the message.
//!
//! Messages are mapped to `M` with a full-domain SHA-256 expansion reduced modulo `N`, never by
//! interpreting raw message bytes as an integer.

use core::fmt;

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Default number of draws for a blinding factor coprime to `N` before giving up.
pub const MAX_BLINDING_ATTEMPTS: u32 = 64;

/// Conventional public exponent.
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

const MESSAGE_DOMAIN: &[u8] = b"privy-cred::blind::message";

// Extra bytes of hash output beyond the modulus length, making the reduction mod N close to
// uniform.
const MESSAGE_EXTRA_BYTES: usize = 16;

const MILLER_RABIN_ROUNDS: usize = 40;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Public half of the signing key, `(N, e)`. Safe to publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindPublicKey {
    #[serde(rename = "N", with = "crate::serde_util::decimal")]
    pub n: BigUint,
    #[serde(with = "crate::serde_util::decimal")]
    pub e: BigUint,
}

/// Signing key `(N, e, d)` with `e * d = 1 mod phi(N)`. Held by the authority only.
#[derive(Clone, Serialize, Deserialize)]
pub struct BlindKeyPair {
    #[serde(flatten)]
    public: BlindPublicKey,
    #[serde(with = "crate::serde_util::decimal")]
    d: BigUint,
}

/// The requester's blinding factor `r`, coprime to `N`.
///
/// Generated fresh for every blinded message and only needed until the signature is unblinded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlindingFactor(#[serde(with = "crate::serde_util::decimal")] BigUint);

impl fmt::Debug for BlindKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlindKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(..)")
    }
}

impl BlindingFactor {
    pub fn new(r: BigUint) -> Self {
        Self(r)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

/// `a^-1 mod m` by the extended Euclidean algorithm, or `None` if `gcd(a, m) != 1`.
pub(crate) fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let m = BigInt::from(m.clone());
    let egcd = BigInt::from(a.clone()).extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return None;
    }
    egcd.x.mod_floor(&m).to_biguint()
}

fn is_probable_prime<R>(n: &BigUint, rng: &mut R) -> bool
where
    R: RngCore + CryptoRng + ?Sized,
{
    for p in SMALL_PRIMES {
        if *n == BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }
    if *n < BigUint::from(2u32) {
        return false;
    }

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn generate_prime<R>(bits: u64, rng: &mut R) -> BigUint
where
    R: RngCore + CryptoRng + ?Sized,
{
    // Setting the two top bits makes the product of two such primes exactly 2 * bits long.
    let mask = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2)) | BigUint::one();
    loop {
        let candidate = rng.gen_biguint(bits) | &mask;
        if is_probable_prime(&candidate, rng) {
            return candidate;
        }
    }
}

impl BlindKeyPair {
    /// Generate a key with a modulus of `modulus_bits` bits from two random primes.
    ///
    /// Primes are redrawn until `e` is coprime to `phi(N)`.
    pub fn generate<R>(modulus_bits: u64, e: &BigUint, rng: &mut R) -> Result<Self, Error>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if modulus_bits < 16 {
            return Err(Error::InvalidInput("modulus must be at least 16 bits"));
        }
        if *e < BigUint::from(3u32) || e.is_even() {
            return Err(Error::InvalidInput("public exponent must be odd and at least 3"));
        }
        let p_bits = modulus_bits / 2;
        let q_bits = modulus_bits - p_bits;
        loop {
            let p = generate_prime(p_bits, rng);
            let q = generate_prime(q_bits, rng);
            if p == q {
                continue;
            }
            match Self::from_primes(&p, &q, e) {
                Ok(key) => {
                    tracing::debug!(bits = key.public.n.bits(), "generated blind signing key");
                    return Ok(key);
                }
                Err(Error::InvalidInput(_)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Build a key from the primes `p` and `q`. Primality is the caller's responsibility.
    pub fn from_primes(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<Self, Error> {
        let one = BigUint::one();
        if *p <= one || *q <= one || p == q {
            return Err(Error::InvalidInput("primes must be distinct and greater than one"));
        }
        if *e <= one {
            return Err(Error::InvalidInput("public exponent must be greater than one"));
        }
        let phi = (p - &one) * (q - &one);
        let d = mod_inverse(e, &phi)
            .ok_or(Error::InvalidInput("public exponent is not coprime to phi(N)"))?;
        Ok(Self {
            public: BlindPublicKey {
                n: p * q,
                e: e.clone(),
            },
            d,
        })
    }

    pub fn public_key(&self) -> &BlindPublicKey {
        &self.public
    }

    /// Sign a blinded value, computing `blinded^d mod N`.
    ///
    /// This is stateless. Every call is a use of the signing oracle, so callers must sign each
    /// stored blinded value at most once.
    pub fn sign(&self, blinded: &BigUint) -> Result<BigUint, Error> {
        if *blinded >= self.public.n {
            return Err(Error::InvalidInput("blinded value must be less than N"));
        }
        Ok(blinded.modpow(&self.d, &self.public.n))
    }
}

impl BlindPublicKey {
    /// Map a message to its representative in `[0, N)`.
    pub fn encode_message(&self, message: &[u8]) -> BigUint {
        let target = (self.n.bits() as usize).div_ceil(8) + MESSAGE_EXTRA_BYTES;
        let mut expanded = Vec::with_capacity(target + 32);
        let mut counter: u32 = 0;
        while expanded.len() < target {
            let mut hasher = Sha256::new();
            hasher.update(MESSAGE_DOMAIN);
            hasher.update(counter.to_be_bytes());
            hasher.update(message);
            expanded.extend_from_slice(&hasher.finalize());
            counter += 1;
        }
        expanded.truncate(target);
        BigUint::from_bytes_be(&expanded) % &self.n
    }

    /// Blind `message`, returning `M * r^e mod N` and the blinding factor `r`.
    pub fn blind<R>(&self, message: &[u8], rng: &mut R) -> Result<(BigUint, BlindingFactor), Error>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        self.blind_with_attempts(message, MAX_BLINDING_ATTEMPTS, rng)
    }

    /// As [BlindPublicKey::blind], drawing at most `max_attempts` candidates for `r`.
    pub fn blind_with_attempts<R>(
        &self,
        message: &[u8],
        max_attempts: u32,
        rng: &mut R,
    ) -> Result<(BigUint, BlindingFactor), Error>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let two = BigUint::from(2u32);
        if self.n <= two {
            return Err(Error::InvalidInput("modulus is too small"));
        }
        let m = self.encode_message(message);
        for attempt in 0..max_attempts {
            let r = rng.gen_biguint_range(&two, &self.n);
            if r.gcd(&self.n).is_one() {
                let blinded = (m * r.modpow(&self.e, &self.n)) % &self.n;
                return Ok((blinded, BlindingFactor(r)));
            }
            tracing::debug!(attempt, "blinding factor shares a factor with N, resampling");
        }
        Err(Error::ModularInverseUndefined)
    }

    /// Remove the blinding from a signed blinded value, computing `signed * r^-1 mod N`.
    pub fn unblind(&self, signed: &BigUint, r: &BlindingFactor) -> Result<BigUint, Error> {
        let r_inv = mod_inverse(&r.0, &self.n).ok_or(Error::ModularInverseUndefined)?;
        Ok((signed * r_inv) % &self.n)
    }

    /// Check an unblinded signature: `token^e mod N == M`.
    pub fn verify(&self, token: &BigUint, message: &[u8]) -> bool {
        if self.n.is_zero() || *token >= self.n {
            return false;
        }
        token.modpow(&self.e, &self.n) == self.encode_message(message)
    }
}
