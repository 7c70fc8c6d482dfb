//! secp256k1 private key.
//!
//! Wraps a k256 signing key and adds hex and WIF encodings for the aicoin
//! networks. Signing goes through the [`crate::ecdsa`] engine so that nonce
//! generation and low-S normalization follow the ledger's rules.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::Scalar;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::ecdsa::{self, Endian};
use crate::network::Network;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private scalar in `[1, n-1]`.
///
/// The engine borrows it for the duration of a signing call and never
/// mutates it. The inner key is zeroized when dropped.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random private key from the operating-system RNG.
    pub fn new() -> Self {
        Self::random(&mut OsRng)
    }

    /// Generate a random private key from the given CSPRNG.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        PrivateKey {
            inner: SigningKey::random(rng),
        }
    }

    /// Create a private key from a 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the scalar is in `[1, n-1]`, otherwise
    /// `InvalidPrivateKey`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a WIF string for any known aicoin network.
    ///
    /// Accepts both the compressed (34-byte payload) and uncompressed
    /// (33-byte payload) forms.
    ///
    /// # Returns
    /// The key and the network its version byte belongs to, or an error for
    /// a bad checksum, unknown version byte or malformed payload.
    pub fn from_wif(wif: &str) -> Result<(Self, &'static Network), PrimitivesError> {
        let payload = base58::check_decode(wif)?;
        match payload.len() {
            33 => {}
            34 if payload[33] == COMPRESS_MAGIC => {}
            34 => {
                return Err(PrimitivesError::InvalidWif(
                    "invalid compression flag".to_string(),
                ))
            }
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "invalid payload length {}",
                    n
                )))
            }
        }
        let network = Network::from_priv_key_version(payload[0]).ok_or_else(|| {
            PrimitivesError::InvalidWif(format!("unknown version byte {:#04x}", payload[0]))
        })?;
        let key = Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN])?;
        Ok((key, network))
    }

    /// Encode as a compressed-form WIF string for `network`.
    pub fn to_wif(&self, network: &Network) -> String {
        let mut payload = Vec::with_capacity(1 + PRIVATE_KEY_BYTES_LEN + 1);
        payload.push(network.priv_key_version);
        payload.extend_from_slice(&self.to_bytes());
        payload.push(COMPRESS_MAGIC);
        base58::check_encode(&payload)
    }

    /// Serialize as a 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// Serialize as a lowercase 64-character hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the public point `d·G`.
    pub fn pub_key(&self) -> PublicKey {
        ecdsa::private_to_public(self)
    }

    /// Sign a 32-byte digest with a deterministic nonce (big-endian digest).
    ///
    /// # Returns
    /// A low-S signature without recovery id, or `Format` if `hash` is not
    /// 32 bytes.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        ecdsa::sign_digest(hash, self, Endian::Big)
    }

    pub(crate) fn verifying_key(&self) -> VerifyingKey {
        *self.inner.verifying_key()
    }

    /// The private scalar for engine arithmetic.
    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{LIVENET, TESTNET};

    #[test]
    fn test_priv_key_sign_and_verify() {
        let key_bytes: [u8; 32] = [
            0xea, 0xf0, 0x2c, 0xa3, 0x48, 0xc5, 0x24, 0xe6, 0x39, 0x26, 0x55, 0xba, 0x4d, 0x29,
            0x60, 0x3c, 0xd1, 0xa7, 0x34, 0x7d, 0x9d, 0x65, 0xcf, 0xe9, 0x3c, 0xe1, 0xeb, 0xff,
            0xdc, 0xa2, 0x26, 0x94,
        ];

        let priv_key = PrivateKey::from_bytes(&key_bytes).unwrap();
        let pub_key = priv_key.pub_key();

        let hash = crate::hash::sha256(b"aicoin");
        let sig = priv_key.sign(&hash).unwrap();
        assert!(pub_key.verify(&hash, &sig));
        assert_eq!(priv_key.to_bytes(), key_bytes);
    }

    #[test]
    fn test_sign_rejects_short_digest() {
        let priv_key = PrivateKey::new();
        let err = priv_key.sign(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, PrimitivesError::Format(_)));
    }

    #[test]
    fn test_private_key_hex_and_wif_roundtrip() {
        let pk = PrivateKey::new();
        assert_eq!(PrivateKey::from_hex(&pk.to_hex()).unwrap(), pk);

        let (decoded, network) = PrivateKey::from_wif(&pk.to_wif(&LIVENET)).unwrap();
        assert_eq!(decoded, pk);
        assert_eq!(network, &LIVENET);

        let (decoded, network) = PrivateKey::from_wif(&pk.to_wif(&TESTNET)).unwrap();
        assert_eq!(decoded, pk);
        assert_eq!(network, &TESTNET);
    }

    #[test]
    fn test_known_livenet_wif() {
        // Livenet shares the 0x80 WIF version byte with Bitcoin mainnet.
        let (pk, network) =
            PrivateKey::from_wif("L4o1GXuUSHauk19f9Cfpm1qfSXZuGLBUAC2VZM6vdmfMxRxAYkWq").unwrap();
        assert_eq!(network.name, "livenet");
        assert_eq!(
            pk.to_wif(&LIVENET),
            "L4o1GXuUSHauk19f9Cfpm1qfSXZuGLBUAC2VZM6vdmfMxRxAYkWq"
        );
    }

    #[test]
    fn test_private_key_invalid_inputs() {
        assert!(PrivateKey::from_hex("").is_err());
        assert!(PrivateKey::from_hex("zz").is_err());
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        // Curve order itself is out of range.
        assert!(PrivateKey::from_hex(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        )
        .is_err());
        // Modified character breaks the checksum.
        assert!(
            PrivateKey::from_wif("L401GXuUSHauk19f9Cfpm1qfSXZuGLBUAC2VZM6vdmfMxRxAYkWq").is_err()
        );
        // Truncated.
        assert!(
            PrivateKey::from_wif("L4o1GXuUSHauk19f9Cfpm1qfSXZuGLBUAC2VZM6vdmfMxRxAYkW").is_err()
        );
    }
}
