//! Key derivation and generation helpers

use hmac_jwt::*;
use proptest::prelude::*;

#[test]
fn test_generated_keys_are_128_random_bytes() {
    let a = generate_key().unwrap();
    let b = generate_key().unwrap();
    assert_eq!(a.len(), GENERATED_KEY_LEN);
    assert_eq!(b.len(), GENERATED_KEY_LEN);
    assert_ne!(*a, *b);
}

#[test]
fn test_derived_key_signs_tokens() {
    let key = derive_key("deployment secret");
    let token = encode(None, &"payload", &key).unwrap();
    let decoded: Decoded<String> = decode(&token, &derive_key("deployment secret")).unwrap();
    assert_eq!(decoded.payload, "payload");
    assert!(matches!(
        decode::<String>(&token, &derive_key("deployment secret ")),
        Err(JwtError::VerificationFailed)
    ));
}

proptest! {
    #[test]
    fn derive_key_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let first = derive_key(&data);
        let second = derive_key(&data);
        prop_assert_eq!(first.len(), DERIVED_KEY_LEN);
        prop_assert_eq!(&*first, &*second);
    }
}
