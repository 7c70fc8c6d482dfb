#![deny(missing_docs)]

//! A.I. Coin SDK - Complete SDK.
//!
//! Re-exports all aicoin SDK components for convenient single-crate usage.
//!
//! ```
//! use aic_sdk::primitives::ec::PrivateKey;
//! use aic_sdk::primitives::ecdsa::{self, Endian};
//! use aic_sdk::primitives::hash::sha256;
//!
//! let key = PrivateKey::new();
//! let digest = sha256(b"hello");
//! let sig = ecdsa::sign_digest(&digest, &key, Endian::Big).unwrap();
//! assert!(ecdsa::verify(&digest, &sig, &key.pub_key(), Endian::Big).verified);
//! ```

pub use aic_primitives as primitives;
pub use aic_transaction as transaction;
