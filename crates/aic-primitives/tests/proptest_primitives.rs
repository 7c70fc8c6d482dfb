use proptest::prelude::*;

use aic_primitives::ec::{PrivateKey, Signature};
use aic_primitives::ecdsa::{
    compute_recovery_id, deterministic_k, recover, sign, sign_digest, verify, Endian, LowSPolicy,
    NonceMode, SignRequest, SigError, Verifier,
};
use aic_primitives::hash::sha256;
use aic_primitives::network::{LIVENET, TESTNET};

fn endian() -> impl Strategy<Value = Endian> {
    prop_oneof![Just(Endian::Big), Just(Endian::Little)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn private_key_wif_roundtrip(seed in prop::array::uniform32(any::<u8>())) {
        // Not all 32-byte arrays are valid private keys (must be < curve order, nonzero).
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            for network in [&LIVENET, &TESTNET] {
                let address = pk.pub_key().to_address(network);
                prop_assert!(!address.is_empty());
                let (pk2, net2) = PrivateKey::from_wif(&pk.to_wif(network)).unwrap();
                prop_assert_eq!(pk.to_hex(), pk2.to_hex());
                prop_assert_eq!(net2.name, network.name);
            }
        }
    }

    #[test]
    fn ecdsa_sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256),
        endian in endian(),
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = sign_digest(&hash, &pk, endian).unwrap();
            let pub_key = pk.pub_key();
            prop_assert!(verify(&hash, &sig, &pub_key, endian).verified);
            prop_assert!(sig.has_low_s());
        }
    }

    #[test]
    fn ecdsa_deterministic_signing_is_stable(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let a = sign_digest(&hash, &pk, Endian::Big).unwrap();
            let b = sign_digest(&hash, &pk, Endian::Big).unwrap();
            prop_assert_eq!(a.to_string(), b.to_string());

            let k0 = deterministic_k(&hash, &pk, Endian::Big, 0).unwrap();
            let k1 = deterministic_k(&hash, &pk, Endian::Big, 1).unwrap();
            prop_assert_ne!(k0, k1);
        }
    }

    #[test]
    fn ecdsa_recovery_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..64),
        variant in 0u32..4,
        endian in endian(),
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let req = SignRequest::new(&hash, &pk)
                .unwrap()
                .with_nonce(NonceMode::Deterministic { variant })
                .with_endian(endian);
            let sig = sign(&req).unwrap().signature;
            let pub_key = pk.pub_key();

            let i = compute_recovery_id(&sig, &hash, &pub_key, endian).unwrap();
            prop_assert_eq!(recover(&sig, &hash, i, endian).unwrap(), pub_key.clone());

            let sig = sig.with_recovery_id(i, true).unwrap();
            let decoded = Signature::from_compact(&sig.to_compact().unwrap()).unwrap();
            prop_assert_eq!(decoded.recovery_id(), Some(i));
            prop_assert_eq!(Signature::from_der(&sig.to_der().unwrap()).unwrap(), sig);
        }
    }

    #[test]
    fn ecdsa_malleated_signature_policy(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = sign_digest(&hash, &pk, Endian::Big).unwrap();
            let pub_key = pk.pub_key();

            let high = sig.to_high_s();
            prop_assert!(!high.has_low_s());
            prop_assert!(Verifier::new().verify(&hash, &high, &pub_key).verified);
            prop_assert_eq!(
                Verifier::new().with_low_s(LowSPolicy::Strict).validate(&hash, &high, &pub_key),
                Err(SigError::HighS)
            );
            prop_assert_eq!(high.to_low_s(), sig);
        }
    }
}
