/// Unified error type for all primitives operations.
///
/// Covers errors from hashing, EC operations, signature encoding, the ECDSA
/// engine, and binary decoding. Verification failures are not errors; see
/// [`crate::ecdsa::SigError`].
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// Malformed input shape: wrong digest length, malformed DER or compact
    /// bytes, an x-coordinate that is not on the curve.
    #[error("format error: {0}")]
    Format(String),

    /// A numeric value outside its required bounds.
    #[error("range error: {0}")]
    Range(String),

    /// The recovery-id search found no candidate matching the public key.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<k256::ecdsa::Error> for PrimitivesError {
    fn from(e: k256::ecdsa::Error) -> Self {
        PrimitivesError::InvalidPublicKey(e.to_string())
    }
}
