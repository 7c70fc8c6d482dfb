/// A.I. Coin SDK - Transaction outputs.
///
/// Provides the TransactionOutput type with binary wire serialization and
/// the JSON object form.

pub mod output;

mod error;
pub use error::TransactionError;
pub use output::{OutputObject, ScriptInput, TransactionOutput};

#[cfg(test)]
mod tests;
