//! Transaction output with satoshi value and locking script.
//!
//! Provides binary serialization following the Bitcoin wire format and the
//! `{ satoshis, script }` object/JSON form used by wallets and explorers.

use aic_primitives::util::{AicReader, AicWriter, VarInt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TransactionError;

/// Accepted shapes of a locking script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptInput {
    /// Raw script bytes.
    Bytes(Vec<u8>),
    /// Hex-encoded script bytes.
    Hex(String),
}

impl ScriptInput {
    /// Resolve to raw script bytes.
    ///
    /// # Returns
    /// `SerializationError` if a hex string does not decode.
    pub fn into_bytes(self) -> Result<Vec<u8>, TransactionError> {
        match self {
            ScriptInput::Bytes(bytes) => Ok(bytes),
            ScriptInput::Hex(hex_str) => hex::decode(hex_str.trim()).map_err(|e| {
                TransactionError::SerializationError(format!("script hex: {}", e))
            }),
        }
    }
}

impl From<Vec<u8>> for ScriptInput {
    fn from(bytes: Vec<u8>) -> Self {
        ScriptInput::Bytes(bytes)
    }
}

impl From<&[u8]> for ScriptInput {
    fn from(bytes: &[u8]) -> Self {
        ScriptInput::Bytes(bytes.to_vec())
    }
}

/// A single output in an aicoin transaction.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | satoshis         | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Value locked by this output, in satoshis.
    pub satoshis: u64,

    /// The locking script (scriptPubKey) bytes.
    pub locking_script: Vec<u8>,
}

/// Object form of an output: `{ "satoshis": u64, "script": hex }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputObject {
    pub satoshis: u64,
    pub script: String,
}

/// JSON shape accepted by [`TransactionOutput::from_json`].
#[derive(Deserialize)]
struct OutputJson {
    #[serde(default)]
    satoshis: Option<u64>,
    #[serde(default)]
    valuebn: Option<Value>,
    #[serde(default)]
    script: Option<String>,
}

impl TransactionOutput {
    /// Create an output from a value and a script in any accepted shape.
    pub fn new(satoshis: u64, script: ScriptInput) -> Result<Self, TransactionError> {
        Ok(TransactionOutput {
            satoshis,
            locking_script: script.into_bytes()?,
        })
    }

    /// Replace the locking script.
    pub fn set_script(&mut self, script: ScriptInput) -> Result<&mut Self, TransactionError> {
        self.locking_script = script.into_bytes()?;
        Ok(self)
    }

    /// Deserialize an output from an `AicReader`.
    ///
    /// Reads 8-byte LE satoshis, a varint script length, and the script bytes.
    ///
    /// # Returns
    /// `SerializationError` if the data is truncated.
    pub fn read_from(reader: &mut AicReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {}", e))
        })?;

        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {}", e))
        })?;
        let script_len = usize::try_from(script_len.value()).map_err(|_| {
            TransactionError::SerializationError("script length overflows usize".to_string())
        })?;

        let locking_script = if script_len == 0 {
            Vec::new()
        } else {
            reader
                .read_bytes(script_len)
                .map_err(|e| {
                    TransactionError::SerializationError(format!("reading locking script: {}", e))
                })?
                .to_vec()
        };

        tracing::trace!(satoshis, script_len, "decoded transaction output");
        Ok(TransactionOutput {
            satoshis,
            locking_script,
        })
    }

    /// Serialize into an `AicWriter`.
    pub fn write_to(&self, writer: &mut AicWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_varint(VarInt::from(self.locking_script.len()));
        writer.write_bytes(&self.locking_script);
    }

    /// Serialize to wire-format bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = AicWriter::with_capacity(8 + 9 + self.locking_script.len());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Parse exactly one output from `bytes`.
    ///
    /// # Returns
    /// `SerializationError` on truncated input or trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = AicReader::new(bytes);
        let output = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "{} trailing bytes after output",
                reader.remaining()
            )));
        }
        Ok(output)
    }

    /// Lowercase hex of the locking script.
    pub fn locking_script_hex(&self) -> String {
        hex::encode(&self.locking_script)
    }

    pub fn to_object(&self) -> OutputObject {
        OutputObject {
            satoshis: self.satoshis,
            script: self.locking_script_hex(),
        }
    }

    /// JSON text of [`TransactionOutput::to_object`].
    pub fn to_json(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string(&self.to_object())?)
    }

    /// Parse the JSON object form.
    ///
    /// The value is taken from `satoshis`; when that is absent or zero the
    /// legacy `valuebn` field (decimal string or number) is used instead.
    /// A missing `script` is an empty script.
    pub fn from_json(json: &str) -> Result<Self, TransactionError> {
        let parsed: OutputJson = serde_json::from_str(json)?;
        let legacy = parsed.valuebn.as_ref().map(parse_valuebn).transpose()?;

        let satoshis = match (parsed.satoshis, legacy) {
            (Some(v), _) if v != 0 => v,
            (_, Some(v)) => v,
            (Some(v), None) => v,
            (None, None) => {
                return Err(TransactionError::SerializationError(
                    "output has neither satoshis nor valuebn".to_string(),
                ))
            }
        };
        let script = parsed.script.unwrap_or_default();
        Self::new(satoshis, ScriptInput::Hex(script))
    }
}

fn parse_valuebn(value: &Value) -> Result<u64, TransactionError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        TransactionError::SerializationError(format!("invalid valuebn: {}", value))
    })
}
