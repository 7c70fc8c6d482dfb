//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, P2PKH address
//! generation for the aicoin networks, and signature verification.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, ProjectivePoint};
use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::ec::signature::Signature;
use crate::ecdsa::{self, Endian};
use crate::hash::hash160;
use crate::network::Network;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public point, never the point at infinity.
///
/// The `compressed` flag only affects presentation: [`PublicKey::to_bytes`],
/// the hex form and the compact-signature header. Equality compares points.
#[derive(Clone, Debug)]
pub struct PublicKey {
    inner: VerifyingKey,
    compressed: bool,
}

impl PublicKey {
    /// Parse a SEC1-encoded point (33-byte compressed or 65-byte uncompressed).
    ///
    /// # Returns
    /// `Ok(PublicKey)` remembering the input form, or `InvalidPublicKey` if
    /// the bytes do not describe a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey string is empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)?;
        Ok(PublicKey {
            inner: vk,
            compressed: bytes.len() == COMPRESSED_LEN,
        })
    }

    /// Parse a hex-encoded SEC1 point.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_verifying_key(vk: VerifyingKey) -> Self {
        PublicKey {
            inner: vk,
            compressed: true,
        }
    }

    /// Build a compressed-form key from a curve point.
    ///
    /// # Returns
    /// `InvalidPublicKey` if `point` is the identity.
    pub(crate) fn from_affine(point: AffinePoint) -> Result<Self, PrimitivesError> {
        Ok(Self::from_verifying_key(VerifyingKey::from_affine(point)?))
    }

    /// Return a copy with the given presentation form.
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Serialize in compressed SEC1 form (`02`/`03` prefix + x).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 form (`04` prefix + x + y).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in the form selected by the `compressed` flag.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }

    /// Hex of [`PublicKey::to_bytes`].
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// RIPEMD-160(SHA-256(serialized key)).
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_bytes())
    }

    /// P2PKH address for `network`: Base58Check(version || hash160).
    pub fn to_address(&self, network: &Network) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(network.address_version);
        payload.extend_from_slice(&self.hash160());
        base58::check_encode(&payload)
    }

    /// Verify a signature over a big-endian 32-byte digest.
    ///
    /// # Returns
    /// `true` iff the signature is structurally valid and the curve check passes.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        ecdsa::verify(hash, sig, self, Endian::Big).verified
    }

    /// The point as a projective point for engine arithmetic.
    pub(crate) fn to_projective_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
