//! Nonce generation for ECDSA signing.
//!
//! Two policies: a uniform draw from an injected CSPRNG, and a deterministic
//! HMAC-SHA256 generator keyed by the private scalar and the digest. The
//! deterministic generator follows the RFC 6979 construction with the
//! ledger's retry step, and must stay byte-exact: test vectors pin the
//! exact nonces for variants 0 and 1.

use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

use crate::ec::signature::in_scalar_range;
use crate::ec::PrivateKey;
use crate::ecdsa::{check_digest, Endian};
use crate::hash::{sha256_hmac, sha256_hmac_parts};
use crate::PrimitivesError;

/// An ephemeral signing scalar in `[1, n-1]`.
///
/// Debug output is redacted and the scalar is zeroized on drop.
#[derive(Clone)]
pub struct Nonce(Scalar);

impl Nonce {
    /// Create a nonce from a 32-byte big-endian integer.
    ///
    /// # Returns
    /// `Range` unless the value is in `[1, n-1]`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PrimitivesError::Range(format!("nonce must be 32 bytes, got {}", bytes.len())))?;
        if !in_scalar_range(&arr) {
            return Err(PrimitivesError::Range("nonce must be in [1, n-1]".to_string()));
        }
        let scalar = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(arr)))
            .ok_or_else(|| PrimitivesError::Range("nonce must be in [1, n-1]".to_string()))?;
        Ok(Nonce(scalar))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// 32-byte big-endian encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl PartialEq for Nonce {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Nonce {}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(..)")
    }
}

impl Drop for Nonce {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// How the signer obtains its nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NonceMode {
    /// HMAC-derived from key and digest. `variant` skips that many valid
    /// candidates, giving distinct reproducible nonces for the same input.
    Deterministic { variant: u32 },
    /// Uniform draw from the signer's random source.
    Random,
    /// A caller-chosen nonce. If it yields `r == 0` or `s == 0` the signer
    /// falls back to deterministic variants 1, 2, ...
    Fixed(Nonce),
}

impl Default for NonceMode {
    fn default() -> Self {
        NonceMode::Deterministic { variant: 0 }
    }
}

/// Draw a uniform nonce from `rng`, redrawing values outside `[1, n-1]`.
pub fn random_k<R: RngCore + CryptoRng>(rng: &mut R) -> Nonce {
    let mut buf = Zeroizing::new([0u8; 32]);
    loop {
        rng.fill_bytes(buf.as_mut());
        if let Ok(nonce) = Nonce::from_bytes(buf.as_ref()) {
            return nonce;
        }
    }
}

/// Derive the deterministic nonce for `(key, digest, variant)`.
///
/// With `Endian::Little` the digest bytes are reversed before seeding, so
/// the generator always sees the digest integer in big-endian form.
///
/// # Returns
/// `Format` if `digest` is not 32 bytes.
pub fn deterministic_k(
    digest: &[u8],
    key: &PrivateKey,
    endian: Endian,
    variant: u32,
) -> Result<Nonce, PrimitivesError> {
    let digest = endian.to_big_endian(check_digest(digest)?);
    let x = Zeroizing::new(key.to_bytes());
    let mut drbg = HmacDrbg::new(&x, &digest);

    let mut skipped = 0u32;
    loop {
        let candidate = drbg.output();
        if skipped >= variant {
            if let Ok(nonce) = Nonce::from_bytes(candidate) {
                return Ok(nonce);
            }
        }
        drbg.advance();
        skipped = skipped.saturating_add(1);
    }
}

/// HMAC-SHA256 deterministic byte generator.
struct HmacDrbg {
    k: Zeroizing<[u8; 32]>,
    v: Zeroizing<[u8; 32]>,
}

impl HmacDrbg {
    /// Seed from the private scalar `x` and the big-endian digest `h`,
    /// leaving the first candidate in `V`.
    fn new(x: &[u8; 32], h: &[u8; 32]) -> Self {
        let v = [0x01u8; 32];
        let k = [0x00u8; 32];

        let k = sha256_hmac_parts(&k, &[&v, &[0x00], x, h]);
        let v = sha256_hmac(&k, &v);
        let k = sha256_hmac_parts(&k, &[&v, &[0x01], x, h]);
        let v = sha256_hmac(&k, &v);
        let v = sha256_hmac(&k, &v);

        HmacDrbg {
            k: Zeroizing::new(k),
            v: Zeroizing::new(v),
        }
    }

    fn output(&self) -> &[u8; 32] {
        &self.v
    }

    /// K = HMAC_K(V || 0x00); V = HMAC_K(V)
    fn advance(&mut self) {
        *self.k = sha256_hmac_parts(self.k.as_ref(), &[self.v.as_ref(), &[0x00]]);
        *self.v = sha256_hmac(self.k.as_ref(), self.v.as_ref());
    }
}
