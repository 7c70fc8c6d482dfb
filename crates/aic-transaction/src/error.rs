/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Malformed JSON object form.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// An underlying primitives error (forwarded from `aic-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] aic_primitives::PrimitivesError),
}
