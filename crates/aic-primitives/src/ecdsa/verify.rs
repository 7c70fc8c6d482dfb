//! Signature verification.

use k256::{ProjectivePoint, Scalar};
use thiserror::Error;

use crate::ec::{PublicKey, Signature};
use crate::ecdsa::{digest_scalar, point_x_scalar, scalar_from_bytes, Endian};

/// Why a signature failed to verify.
///
/// The display strings are stable and part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SigError {
    #[error("hashbuf must be a 32 byte buffer")]
    InvalidDigest,
    #[error("r and s not in range")]
    OutOfRange,
    #[error("s is not in the lower half of the curve order")]
    HighS,
    #[error("p is infinity")]
    Infinity,
    #[error("Invalid signature")]
    InvalidSignature,
}

/// Outcome of [`Verifier::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub verified: bool,
    /// The failure reason; `None` exactly when `verified` is true.
    pub error: Option<SigError>,
}

impl From<Result<(), SigError>> for Verification {
    fn from(result: Result<(), SigError>) -> Self {
        match result {
            Ok(()) => Verification {
                verified: true,
                error: None,
            },
            Err(e) => Verification {
                verified: false,
                error: Some(e),
            },
        }
    }
}

/// Treatment of signatures whose `s` lies in the upper half of the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LowSPolicy {
    /// Accept any `s` in `[1, n-1]`.
    #[default]
    Lenient,
    /// Reject `s > n/2` with [`SigError::HighS`].
    Strict,
}

/// Configurable ECDSA verifier.
///
/// The default verifier reads digests big-endian and accepts high-S
/// signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verifier {
    endian: Endian,
    low_s: LowSPolicy,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_low_s(mut self, policy: LowSPolicy) -> Self {
        self.low_s = policy;
        self
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn low_s(&self) -> LowSPolicy {
        self.low_s
    }

    /// Check `sig` over `digest` against `pubkey`.
    ///
    /// Checks run in order: digest length, range of `r` and `s`, the
    /// low-S policy, then the curve equation `R' = u1·G + u2·Q`.
    pub fn validate(
        &self,
        digest: &[u8],
        sig: &Signature,
        pubkey: &PublicKey,
    ) -> Result<(), SigError> {
        let digest: &[u8; 32] = digest.try_into().map_err(|_| SigError::InvalidDigest)?;

        let r = scalar_from_bytes(sig.r()).ok_or(SigError::OutOfRange)?;
        let s = scalar_from_bytes(sig.s()).ok_or(SigError::OutOfRange)?;
        if self.low_s == LowSPolicy::Strict && !sig.has_low_s() {
            return Err(SigError::HighS);
        }

        let e = digest_scalar(digest, self.endian);
        let w = Option::<Scalar>::from(s.invert()).ok_or(SigError::OutOfRange)?;
        let u1 = e * w;
        let u2 = r * w;

        let p = ProjectivePoint::GENERATOR * u1 + pubkey.to_projective_point() * u2;
        if p == ProjectivePoint::IDENTITY {
            return Err(SigError::Infinity);
        }
        if point_x_scalar(&p) != r {
            return Err(SigError::InvalidSignature);
        }
        Ok(())
    }

    /// Like [`Verifier::validate`], folded into a [`Verification`].
    pub fn verify(&self, digest: &[u8], sig: &Signature, pubkey: &PublicKey) -> Verification {
        self.validate(digest, sig, pubkey).into()
    }
}
