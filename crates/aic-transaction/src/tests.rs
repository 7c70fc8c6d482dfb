//! Tests for the aic-transaction crate.
//!
//! Output vectors are the two outputs of a standard P2PKH transaction,
//! covering wire parsing, serialization roundtrips and the JSON form.

use aic_primitives::util::{AicReader, AicWriter};

use crate::output::{OutputObject, ScriptInput, TransactionOutput};
use crate::TransactionError;

/// 1500 satoshis locked by P2PKH followed by an OP_RETURN "hello".
const OUTPUT_A_HEX: &str =
    "dc050000000000002076a914eb0bd5edba389198e73f8efabddfc61666969ff788ac6a0568656c6c6f";

/// 3498 satoshis locked by a plain P2PKH script.
const OUTPUT_B_HEX: &str =
    "aa0d0000000000001976a914eb0bd5edba389198e73f8efabddfc61666969ff788ac";

const P2PKH_SCRIPT_HEX: &str = "76a914eb0bd5edba389198e73f8efabddfc61666969ff788ac";

#[test]
fn test_output_from_bytes() {
    let output = TransactionOutput::from_bytes(&hex::decode(OUTPUT_B_HEX).unwrap())
        .expect("should parse output");
    assert_eq!(output.satoshis, 3498);
    assert_eq!(output.locking_script_hex(), P2PKH_SCRIPT_HEX);
    assert_eq!(hex::encode(output.to_bytes()), OUTPUT_B_HEX);
}

#[test]
fn test_outputs_read_in_sequence() {
    let bytes = hex::decode(format!("{}{}", OUTPUT_A_HEX, OUTPUT_B_HEX)).unwrap();
    let mut reader = AicReader::new(&bytes);

    let a = TransactionOutput::read_from(&mut reader).unwrap();
    let b = TransactionOutput::read_from(&mut reader).unwrap();
    assert_eq!(reader.remaining(), 0);
    assert_eq!(a.satoshis, 1500);
    assert_eq!(a.locking_script.len(), 32);
    assert_eq!(b.satoshis, 3498);

    let mut writer = AicWriter::new();
    a.write_to(&mut writer);
    b.write_to(&mut writer);
    assert_eq!(writer.into_bytes(), bytes);
}

#[test]
fn test_empty_script_reads_as_empty() {
    let bytes = hex::decode("e80300000000000000").unwrap();
    let output = TransactionOutput::from_bytes(&bytes).unwrap();
    assert_eq!(output.satoshis, 1000);
    assert!(output.locking_script.is_empty());
    assert_eq!(output.to_bytes(), bytes);
}

#[test]
fn test_truncated_and_trailing_bytes() {
    let bytes = hex::decode(OUTPUT_B_HEX).unwrap();
    for len in [0, 4, 8, bytes.len() - 1] {
        assert!(
            matches!(
                TransactionOutput::from_bytes(&bytes[..len]),
                Err(TransactionError::SerializationError(_))
            ),
            "truncated at {}",
            len
        );
    }

    let mut extra = bytes.clone();
    extra.push(0x00);
    assert!(TransactionOutput::from_bytes(&extra).is_err());
}

#[test]
fn test_script_input_shapes() {
    let from_hex = TransactionOutput::new(5, ScriptInput::Hex(P2PKH_SCRIPT_HEX.to_string())).unwrap();
    let from_bytes =
        TransactionOutput::new(5, ScriptInput::from(hex::decode(P2PKH_SCRIPT_HEX).unwrap()))
            .unwrap();
    assert_eq!(from_hex, from_bytes);

    assert!(TransactionOutput::new(5, ScriptInput::Hex("zz".to_string())).is_err());

    let mut output = TransactionOutput::default();
    output
        .set_script(ScriptInput::from(&[0x6a, 0x00][..]))
        .unwrap();
    assert_eq!(output.locking_script_hex(), "6a00");
}

#[test]
fn test_to_object_and_json() {
    let output = TransactionOutput::from_bytes(&hex::decode(OUTPUT_B_HEX).unwrap()).unwrap();
    assert_eq!(
        output.to_object(),
        OutputObject {
            satoshis: 3498,
            script: P2PKH_SCRIPT_HEX.to_string(),
        }
    );

    let json = output.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["satoshis"], 3498);
    assert_eq!(value["script"], P2PKH_SCRIPT_HEX);

    assert_eq!(TransactionOutput::from_json(&json).unwrap(), output);
}

#[test]
fn test_from_json_legacy_valuebn() {
    let json = format!(r#"{{"valuebn":"3498","script":"{}"}}"#, P2PKH_SCRIPT_HEX);
    let output = TransactionOutput::from_json(&json).unwrap();
    assert_eq!(output.satoshis, 3498);

    // A zero satoshis field defers to valuebn.
    let json = r#"{"satoshis":0,"valuebn":42}"#;
    let output = TransactionOutput::from_json(json).unwrap();
    assert_eq!(output.satoshis, 42);
    assert!(output.locking_script.is_empty());

    let output = TransactionOutput::from_json(r#"{"satoshis":0}"#).unwrap();
    assert_eq!(output.satoshis, 0);
}

#[test]
fn test_from_json_errors() {
    assert!(matches!(
        TransactionOutput::from_json("not json"),
        Err(TransactionError::Json(_))
    ));
    assert!(matches!(
        TransactionOutput::from_json(r#"{"script":"6a"}"#),
        Err(TransactionError::SerializationError(_))
    ));
    assert!(TransactionOutput::from_json(r#"{"valuebn":"-1"}"#).is_err());
    assert!(TransactionOutput::from_json(r#"{"satoshis":1,"script":"xyz"}"#).is_err());
}
