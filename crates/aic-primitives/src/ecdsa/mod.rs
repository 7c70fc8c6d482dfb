//! ECDSA signing engine over secp256k1.
//!
//! Produces low-S signatures with deterministic (default), random or fixed
//! nonces, verifies them, and recovers public keys from `(r, s, i)`. Digests
//! are 32 bytes interpreted big-endian or little-endian per [`Endian`].
//!
//! Every call is a pure function of its arguments and an optional injected
//! random source; nothing is cached between calls.

mod nonce;
mod state;
mod verify;

pub use nonce::{deterministic_k, random_k, Nonce, NonceMode};
pub use state::{EcdsaState, SignRequest, SignResult};
pub use verify::{LowSPolicy, SigError, Verification, Verifier};

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::point::{AffineCoordinates, DecompressPoint};
use k256::elliptic_curve::subtle::Choice;
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, FieldBytes, ProjectivePoint, Scalar, U256};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::ec::signature::add_order;
use crate::ec::{PrivateKey, PublicKey, Signature};
use crate::PrimitivesError;

/// Upper bound on nonce candidates tried by one signing call.
const MAX_SIGN_ATTEMPTS: u32 = 64;

const HASHBUF_ERROR: &str = "hashbuf must be a 32 byte buffer";

/// Byte order in which a digest is read as an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    /// The digest bytes rearranged so they read big-endian.
    pub(crate) fn to_big_endian(self, digest: &[u8; 32]) -> [u8; 32] {
        let mut out = *digest;
        if self == Endian::Little {
            out.reverse();
        }
        out
    }
}

pub(crate) fn check_digest(digest: &[u8]) -> Result<&[u8; 32], PrimitivesError> {
    digest
        .try_into()
        .map_err(|_| PrimitivesError::Format(HASHBUF_ERROR.to_string()))
}

/// `e`: the digest integer reduced mod n.
pub(crate) fn digest_scalar(digest: &[u8; 32], endian: Endian) -> Scalar {
    let be = endian.to_big_endian(digest);
    <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&be))
}

/// A 32-byte big-endian integer as a scalar, if it lies in `[1, n-1]`.
pub(crate) fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
        .filter(|s| *s != Scalar::ZERO)
}

/// The x-coordinate of `point` reduced mod n. `point` must not be the identity.
pub(crate) fn point_x_scalar(point: &ProjectivePoint) -> Scalar {
    let x = point.to_affine().x();
    <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&x))
}

/// Derive `d·G`, presented compressed.
pub fn private_to_public(key: &PrivateKey) -> PublicKey {
    PublicKey::from_verifying_key(key.verifying_key())
}

/// Sign with the operating-system random source for [`NonceMode::Random`].
pub fn sign(request: &SignRequest<'_>) -> Result<SignResult, PrimitivesError> {
    sign_with_rng(request, &mut OsRng)
}

/// Sign `request`, drawing random nonces (if any) from `rng`.
///
/// Candidates giving `r == 0` or `s == 0` are rejected: deterministic mode
/// moves to the next variant, random mode redraws, and a fixed nonce falls
/// back to deterministic variants 1, 2, ...
///
/// # Returns
/// A low-S signature without recovery id and the nonce used, or `Range`
/// when every candidate was rejected.
pub fn sign_with_rng<R: RngCore + CryptoRng>(
    request: &SignRequest<'_>,
    rng: &mut R,
) -> Result<SignResult, PrimitivesError> {
    let digest = request.digest();
    let endian = request.endian();
    let d = request.key().to_scalar();
    let e = digest_scalar(digest, endian);

    for attempt in 0..MAX_SIGN_ATTEMPTS {
        let k = match request.nonce() {
            NonceMode::Fixed(k) if attempt == 0 => k.clone(),
            NonceMode::Fixed(_) => deterministic_k(digest, request.key(), endian, attempt)?,
            NonceMode::Deterministic { variant } => {
                deterministic_k(digest, request.key(), endian, variant.saturating_add(attempt))?
            }
            NonceMode::Random => random_k(rng),
        };

        match sign_with_nonce(&d, &e, &k) {
            Some(signature) => {
                return Ok(SignResult {
                    signature,
                    nonce: k,
                })
            }
            None => tracing::debug!(attempt, "nonce produced r or s of zero, retrying"),
        }
    }

    Err(PrimitivesError::Range(format!(
        "no usable nonce after {} candidates",
        MAX_SIGN_ATTEMPTS
    )))
}

/// One signing attempt; `None` if `r` or `s` is zero.
fn sign_with_nonce(d: &Scalar, e: &Scalar, k: &Nonce) -> Option<Signature> {
    let k = k.as_scalar();
    let r = point_x_scalar(&(ProjectivePoint::GENERATOR * k));
    if r == Scalar::ZERO {
        return None;
    }
    let k_inv = Option::<Scalar>::from(k.invert())?;
    let s = k_inv * (*e + r * d);
    if s == Scalar::ZERO {
        return None;
    }
    let sig = Signature::new(r.to_bytes().into(), s.to_bytes().into());
    Some(sig.to_low_s())
}

/// Deterministically sign a 32-byte digest.
pub fn sign_digest(
    digest: &[u8],
    key: &PrivateKey,
    endian: Endian,
) -> Result<Signature, PrimitivesError> {
    let request = SignRequest::new(digest, key)?.with_endian(endian);
    Ok(sign(&request)?.signature)
}

/// Sign a 32-byte digest with a fresh random nonce from the OS generator.
pub fn sign_random_k(
    digest: &[u8],
    key: &PrivateKey,
    endian: Endian,
) -> Result<Signature, PrimitivesError> {
    let request = SignRequest::new(digest, key)?
        .with_endian(endian)
        .with_nonce(NonceMode::Random);
    Ok(sign(&request)?.signature)
}

/// Check `sig` with the default (lenient) verifier.
pub fn validate(
    digest: &[u8],
    sig: &Signature,
    pubkey: &PublicKey,
    endian: Endian,
) -> Result<(), SigError> {
    Verifier::new().with_endian(endian).validate(digest, sig, pubkey)
}

/// Verify `sig` with the default (lenient) verifier.
pub fn verify(digest: &[u8], sig: &Signature, pubkey: &PublicKey, endian: Endian) -> Verification {
    validate(digest, sig, pubkey, endian).into()
}

/// Verify a signature over a big-endian digest.
pub fn verify_digest(digest: &[u8], sig: &Signature, pubkey: &PublicKey) -> bool {
    verify(digest, sig, pubkey, Endian::Big).verified
}

/// Recover the signing public key from `sig` and recovery id `recovery_id`.
///
/// Bit 0 of the id selects the parity of `R.y`, bit 1 selects `R.x = r + n`.
/// The returned key takes its compressed flag from the signature.
///
/// # Returns
/// `Format` for a bad digest or an `x` that is not on the curve, `Range`
/// for an id above 3 or `r`/`s` out of range.
pub fn recover(
    sig: &Signature,
    digest: &[u8],
    recovery_id: u8,
    endian: Endian,
) -> Result<PublicKey, PrimitivesError> {
    let digest = check_digest(digest)?;
    if recovery_id > 3 {
        return Err(PrimitivesError::Range(
            "i must be equal to 0, 1, 2, or 3".to_string(),
        ));
    }
    let (r, s) = match (scalar_from_bytes(sig.r()), scalar_from_bytes(sig.s())) {
        (Some(r), Some(s)) => (r, s),
        _ => return Err(PrimitivesError::Range("r and s not in range".to_string())),
    };

    let x = if recovery_id & 2 != 0 {
        add_order(sig.r())
            .ok_or_else(|| PrimitivesError::Format("r + n exceeds 256 bits".to_string()))?
    } else {
        *sig.r()
    };
    let big_r = Option::<AffinePoint>::from(AffinePoint::decompress(
        &FieldBytes::from(x),
        Choice::from(recovery_id & 1),
    ))
    .ok_or_else(|| PrimitivesError::Format("nR is not a valid curve point".to_string()))?;

    let e = digest_scalar(digest, endian);
    let r_inv = Option::<Scalar>::from(r.invert())
        .ok_or_else(|| PrimitivesError::Range("r and s not in range".to_string()))?;
    let q = (ProjectivePoint::from(big_r) * s - ProjectivePoint::GENERATOR * e) * r_inv;
    if q == ProjectivePoint::IDENTITY {
        return Err(PrimitivesError::Format(
            "recovered point is at infinity".to_string(),
        ));
    }

    Ok(PublicKey::from_affine(q.to_affine())
        .map_err(|e| PrimitivesError::Format(e.to_string()))?
        .with_compressed(sig.compressed()))
}

/// Find the recovery id under which `sig` recovers to `pubkey`.
///
/// Works on the signature as stored, so call it after low-S normalization.
///
/// # Returns
/// The smallest matching id in `0..=3`, `Format` for a bad digest, or
/// `InternalInvariant` when no id matches.
pub fn compute_recovery_id(
    sig: &Signature,
    digest: &[u8],
    pubkey: &PublicKey,
    endian: Endian,
) -> Result<u8, PrimitivesError> {
    check_digest(digest)?;
    for i in 0..4u8 {
        match recover(sig, digest, i, endian) {
            Ok(q) if q == *pubkey => return Ok(i),
            Ok(_) => tracing::trace!(recovery_id = i, "candidate recovers a different key"),
            Err(e) => tracing::trace!(recovery_id = i, error = %e, "candidate rejected"),
        }
    }
    tracing::debug!("no recovery id matches the public key");
    Err(PrimitivesError::InternalInvariant(
        "Unable to find valid recovery factor".to_string(),
    ))
}
