use proptest::prelude::*;

use aic_primitives::util::{AicReader, AicWriter};
use aic_transaction::{ScriptInput, TransactionOutput};

/// Strategy to generate a random output.
fn arb_output() -> impl Strategy<Value = TransactionOutput> {
    (
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 0..300),
    )
        .prop_map(|(satoshis, script_bytes)| {
            TransactionOutput::new(satoshis, ScriptInput::Bytes(script_bytes)).unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_list_wire_roundtrip(outputs in prop::collection::vec(arb_output(), 1..5)) {
        let mut writer = AicWriter::new();
        for o in &outputs {
            o.write_to(&mut writer);
        }
        let bytes = writer.into_bytes();

        let mut reader = AicReader::new(&bytes);
        for o in &outputs {
            let decoded = TransactionOutput::read_from(&mut reader).unwrap();
            prop_assert_eq!(&decoded, o);
        }
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn output_json_preserves_fields(output in arb_output()) {
        let json = output.to_json().unwrap();
        let decoded = TransactionOutput::from_json(&json).unwrap();
        prop_assert_eq!(decoded, output);
    }

    #[test]
    fn truncated_output_never_panics(output in arb_output(), cut in 0usize..32) {
        let bytes = output.to_bytes();
        let len = bytes.len().saturating_sub(cut + 1);
        prop_assert!(TransactionOutput::from_bytes(&bytes[..len]).is_err());
    }
}
