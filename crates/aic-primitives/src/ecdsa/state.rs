//! Signing requests, results and the inspectable engine state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ec::{PrivateKey, PublicKey, Signature};
use crate::ecdsa::nonce::{Nonce, NonceMode};
use crate::ecdsa::{check_digest, Endian};
use crate::PrimitivesError;

/// Everything the signer needs for one signature.
///
/// The private key is borrowed for the duration of the call.
#[derive(Clone, Debug)]
pub struct SignRequest<'a> {
    digest: [u8; 32],
    key: &'a PrivateKey,
    nonce: NonceMode,
    endian: Endian,
}

impl<'a> SignRequest<'a> {
    /// A request with a deterministic variant-0 nonce and big-endian digest.
    ///
    /// # Returns
    /// `Format` if `digest` is not 32 bytes.
    pub fn new(digest: &[u8], key: &'a PrivateKey) -> Result<Self, PrimitivesError> {
        Ok(SignRequest {
            digest: *check_digest(digest)?,
            key,
            nonce: NonceMode::default(),
            endian: Endian::Big,
        })
    }

    pub fn with_nonce(mut self, nonce: NonceMode) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn key(&self) -> &PrivateKey {
        self.key
    }

    pub fn nonce(&self) -> &NonceMode {
        &self.nonce
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }
}

/// A produced signature and the nonce that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignResult {
    /// Low-S signature without a recovery id.
    pub signature: Signature,
    pub nonce: Nonce,
}

/// Loose collection of engine inputs and outputs.
///
/// Used to assemble a [`SignRequest`] field by field and to render the
/// state for inspection. `Display` writes a JSON object of hex fields
/// (`hashbuf`, `privkey`, `pubkey`, `sig`, `k`, `endian`); `FromStr` reads
/// it back, restoring `k` as `last_nonce`.
///
/// `nonce` is an input and only ever set by the caller. The nonce a
/// signature was produced with lands in `last_nonce`, which never feeds a
/// later request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EcdsaState {
    pub digest: Option<Vec<u8>>,
    pub private_key: Option<PrivateKey>,
    pub public_key: Option<PublicKey>,
    pub signature: Option<Signature>,
    /// Caller-chosen nonce, signed with as [`NonceMode::Fixed`].
    pub nonce: Option<Nonce>,
    /// Nonce of the stored signature. Output only.
    pub last_nonce: Option<Nonce>,
    pub endian: Endian,
}

impl EcdsaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the digest, discarding any signature made over the previous one.
    pub fn with_digest(mut self, digest: &[u8]) -> Self {
        self.digest = Some(digest.to_vec());
        self.clear_output();
        self
    }

    /// Set the private key and derive its public key, discarding any
    /// signature made with the previous key.
    pub fn with_private_key(mut self, key: PrivateKey) -> Self {
        self.public_key = Some(key.pub_key());
        self.private_key = Some(key);
        self.clear_output();
        self
    }

    pub fn with_public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    pub fn with_signature(mut self, sig: Signature) -> Self {
        self.signature = Some(sig);
        self
    }

    pub fn with_nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Build a request from the collected fields.
    ///
    /// A caller-set `nonce` becomes [`NonceMode::Fixed`]; otherwise the
    /// deterministic variant 0 is used. `last_nonce` is never read.
    ///
    /// # Returns
    /// `Format` for a missing or malformed digest, `InvalidPrivateKey` if no
    /// key is set.
    pub fn sign_request(&self) -> Result<SignRequest<'_>, PrimitivesError> {
        let digest = self.digest.as_deref().unwrap_or_default();
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| PrimitivesError::InvalidPrivateKey("no private key set".to_string()))?;
        let nonce = match &self.nonce {
            Some(k) => NonceMode::Fixed(k.clone()),
            None => NonceMode::default(),
        };
        Ok(SignRequest::new(digest, key)?
            .with_nonce(nonce)
            .with_endian(self.endian))
    }

    /// Store a signing result as output.
    pub fn apply(&mut self, result: SignResult) {
        self.signature = Some(result.signature);
        self.last_nonce = Some(result.nonce);
    }

    fn clear_output(&mut self) {
        self.signature = None;
        self.last_nonce = None;
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct StateRepr {
    #[serde(skip_serializing_if = "Option::is_none")]
    hashbuf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    privkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pubkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<String>,
    endian: Endian,
}

impl From<&EcdsaState> for StateRepr {
    fn from(state: &EcdsaState) -> Self {
        StateRepr {
            hashbuf: state.digest.as_ref().map(hex::encode),
            privkey: state.private_key.as_ref().map(PrivateKey::to_hex),
            pubkey: state.public_key.as_ref().map(PublicKey::to_hex),
            sig: state.signature.as_ref().map(|s| s.to_string()),
            k: state
                .nonce
                .as_ref()
                .or(state.last_nonce.as_ref())
                .map(Nonce::to_hex),
            endian: state.endian,
        }
    }
}

impl TryFrom<StateRepr> for EcdsaState {
    type Error = PrimitivesError;

    fn try_from(repr: StateRepr) -> Result<Self, Self::Error> {
        Ok(EcdsaState {
            digest: repr.hashbuf.map(hex::decode).transpose()?,
            private_key: repr.privkey.as_deref().map(PrivateKey::from_hex).transpose()?,
            public_key: repr.pubkey.as_deref().map(PublicKey::from_hex).transpose()?,
            signature: repr.sig.as_deref().map(Signature::from_str).transpose()?,
            nonce: None,
            last_nonce: repr.k.as_deref().map(Nonce::from_hex).transpose()?,
            endian: repr.endian,
        })
    }
}

impl fmt::Display for EcdsaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&StateRepr::from(self)).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromStr for EcdsaState {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let repr: StateRepr = serde_json::from_str(s)
            .map_err(|e| PrimitivesError::Format(format!("ecdsa state: {}", e)))?;
        repr.try_into()
    }
}
