/// A.I. Coin SDK - Cryptographic primitives, hashing, and utilities.
///
/// This crate provides the foundational building blocks for the aicoin SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, HMAC-SHA256)
/// - Elliptic curve keys and signatures on secp256k1
/// - The ECDSA engine (deterministic nonces, low-S, public-key recovery)
/// - Network parameter tables
/// - Variable-length integer encoding and binary reader/writer
/// - Base58 encoding/decoding

pub mod hash;
pub mod util;
pub mod base58;
pub mod network;
pub mod ec;
pub mod ecdsa;

mod error;
pub use error::PrimitivesError;
