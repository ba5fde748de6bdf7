//! Encode/decode behaviour across algorithms, headers and validation order

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac_jwt::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user_id: u64,
    roles: Vec<String>,
}

fn session() -> Session {
    Session {
        user_id: 42,
        roles: vec!["reader".to_string(), "writer".to_string()],
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn codec_at(now: DateTime<Utc>) -> Codec {
    Codec::new().with_clock(FixedClock(now))
}

fn segments(token: &str) -> Vec<String> {
    token.split('.').map(str::to_string).collect()
}

#[test]
fn test_round_trip_preserves_header_and_payload() {
    let header = Header::new()
        .with_signer(SignType::Hs384)
        .with_id("token-1")
        .with_issuer("auth.example")
        .with_audience("api")
        .with_subject("alice")
        .with_expiration(noon() + Duration::hours(1))
        .with_not_before(noon() - Duration::minutes(1))
        .with_extra(json!({"tenant": "acme"}));

    let codec = codec_at(noon());
    let token = codec.encode(Some(&header), &session(), KEY).unwrap();
    let decoded: Decoded<Session> = codec.decode(&token, KEY).unwrap();

    assert_eq!(decoded.payload, session());
    let got = &decoded.header;
    assert_eq!(got.token_type(), "JWT");
    assert_eq!(got.signer(), SignType::Hs384);
    assert_eq!(got.issued_at(), noon());
    assert_eq!(got.id(), Some("token-1"));
    assert_eq!(got.issuer(), Some("auth.example"));
    assert_eq!(got.audience(), Some("api"));
    assert_eq!(got.subject(), Some("alice"));
    assert_eq!(got.expiration(), header.expiration());
    assert_eq!(got.not_before(), header.not_before());
    assert_eq!(got.extra(), Some(&json!({"tenant": "acme"})));
}

#[test]
fn test_issued_at_is_always_overwritten() {
    let header = Header::new();
    let token = codec_at(noon()).encode(Some(&header), &1, KEY).unwrap();
    let later = noon() + Duration::minutes(3);
    let again = codec_at(later).encode(Some(&header), &1, KEY).unwrap();

    let first: Decoded<i32> = codec_at(later).decode(&token, KEY).unwrap();
    let second: Decoded<i32> = codec_at(later).decode(&again, KEY).unwrap();
    assert_eq!(first.header.issued_at(), noon());
    assert_eq!(second.header.issued_at(), later);
}

#[test]
fn test_default_header() {
    let token = encode(None, &session(), KEY).unwrap();
    let decoded: Decoded<Session> = decode(&token, KEY).unwrap();
    assert_eq!(decoded.header.token_type(), "JWT");
    assert_eq!(decoded.header.signer(), SignType::Hs256);
    assert_eq!(decoded.payload, session());
}

#[test]
fn test_every_algorithm_round_trips_with_expected_signature_length() {
    for alg in SignType::ALL {
        let header = Header::new().with_signer(alg);
        let token = encode(Some(&header), &session(), KEY).unwrap();

        let mac = URL_SAFE_NO_PAD.decode(&segments(&token)[2]).unwrap();
        assert_eq!(mac.len(), alg.signature_len(), "{alg}");

        let decoded: Decoded<Session> = decode(&token, KEY).unwrap();
        assert_eq!(decoded.header.signer(), alg);
        assert_eq!(decoded.payload, session());
    }
}

#[test]
fn test_wrong_key_is_rejected_for_every_algorithm() {
    for alg in SignType::ALL {
        let header = Header::new().with_signer(alg);
        let token = encode(Some(&header), &session(), KEY).unwrap();
        let result = decode::<Session>(&token, b"a different key");
        assert!(
            matches!(result, Err(JwtError::VerificationFailed)),
            "{alg}: {result:?}"
        );
    }
}

#[test]
fn test_expired_token_with_valid_signature() {
    let header = Header::new().expires_in(Duration::seconds(-1));
    let token = encode(Some(&header), &session(), KEY).unwrap();
    assert!(matches!(decode::<Session>(&token, KEY), Err(JwtError::Expired)));
}

#[test]
fn test_signature_is_checked_before_expiry() {
    let header = Header::new().expires_in(Duration::seconds(-1));
    let token = encode(Some(&header), &session(), KEY).unwrap();
    assert!(matches!(
        decode::<Session>(&token, b"forged"),
        Err(JwtError::VerificationFailed)
    ));
}

#[test]
fn test_not_yet_active_token() {
    let header = Header::new().activate_after(Duration::hours(1));
    let token = encode(Some(&header), &session(), KEY).unwrap();
    assert!(matches!(
        decode::<Session>(&token, KEY),
        Err(JwtError::NotYetActive)
    ));
}

#[test]
fn test_activity_window_follows_the_clock() {
    let header = Header::new()
        .with_not_before(noon())
        .with_expiration(noon() + Duration::hours(1));
    let token = codec_at(noon()).encode(Some(&header), &0u8, KEY).unwrap();

    let before = codec_at(noon() - Duration::seconds(1)).decode::<u8>(&token, KEY);
    assert!(matches!(before, Err(JwtError::NotYetActive)));
    assert!(codec_at(noon()).decode::<u8>(&token, KEY).is_ok());
    assert!(codec_at(noon() + Duration::hours(1)).decode::<u8>(&token, KEY).is_ok());
    let after = codec_at(noon() + Duration::hours(1) + Duration::seconds(1)).decode::<u8>(&token, KEY);
    assert!(matches!(after, Err(JwtError::Expired)));
}

#[test]
fn test_validation_options_are_applied() {
    let header = Header::new().with_issuer("auth").with_subject("alice");
    let token = codec_at(noon()).encode(Some(&header), &0u8, KEY).unwrap();

    let strict = codec_at(noon())
        .with_validation_options(ValidationOptions::default().expect_subject("bob"));
    assert_eq!(strict.validation_options().expected_subject.as_deref(), Some("bob"));
    assert!(strict.validation_options().validate_exp);
    assert!(matches!(
        strict.decode::<u8>(&token, KEY),
        Err(JwtError::SubjectMismatch)
    ));

    let matching = codec_at(noon()).with_validation_options(
        ValidationOptions::default()
            .expect_issuer("auth")
            .expect_subject("alice"),
    );
    assert!(matching.decode::<u8>(&token, KEY).is_ok());
}

#[test]
fn test_payload_mismatch_is_distinct_from_malformed() {
    let token = encode(None, &json!({"user_id": "not a number"}), KEY).unwrap();
    match decode::<Session>(&token, KEY) {
        Err(JwtError::Payload(_)) => {}
        other => panic!("expected payload error, got {other:?}"),
    }
}

#[test]
fn test_segment_count() {
    for token in ["", "abc", "abc.def"] {
        let result = decode::<Session>(token, KEY);
        assert!(matches!(result, Err(JwtError::MalformedToken(_))), "{token:?}");
    }
}

#[test]
fn test_padding_and_standard_alphabet_are_rejected() {
    let token = encode(None, &session(), KEY).unwrap();
    let parts = segments(&token);
    let padded = format!("{}=.{}.{}", parts[0], parts[1], parts[2]);
    assert!(matches!(
        decode::<Session>(&padded, KEY),
        Err(JwtError::MalformedToken(_))
    ));

    // '+' and '/' belong to the standard alphabet, not the URL-safe one.
    for standard in ['+', '/'] {
        let swapped = format!("{standard}{}.{}.{}", &parts[0][1..], parts[1], parts[2]);
        assert!(
            matches!(decode::<Session>(&swapped, KEY), Err(JwtError::MalformedToken(_))),
            "{standard}"
        );
        let in_mac = format!("{}.{}.{standard}{}", parts[0], parts[1], &parts[2][1..]);
        assert!(
            matches!(decode::<Session>(&in_mac, KEY), Err(JwtError::MalformedToken(_))),
            "{standard}"
        );
    }
}

#[test]
fn test_null_extra_round_trips() {
    let header = Header::new().with_subject("alice").with_extra(json!(null));
    let token = encode(Some(&header), &session(), KEY).unwrap();
    let decoded: Decoded<Session> = decode(&token, KEY).unwrap();
    assert_eq!(decoded.header.extra(), header.extra());
    assert_eq!(decoded.header.extra(), None);
    assert_eq!(decoded.header.subject(), Some("alice"));
}

#[test]
fn test_malformed_errors_are_classified() {
    let structural = decode::<Session>("no-dots-here", KEY).unwrap_err();
    assert!(structural.is_malformed());

    let token = encode(None, &session(), KEY).unwrap();
    let forged = decode::<Session>(&token, b"forged").unwrap_err();
    assert!(!forged.is_malformed());
}

fn forge(head: serde_json::Value, body: serde_json::Value, alg: SignType) -> String {
    let head = serde_json::to_vec(&head).unwrap();
    let body = serde_json::to_vec(&body).unwrap();
    let mac = alg.sign(KEY, &[&head[..], &b"."[..], &body[..]]).unwrap();
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(head),
        URL_SAFE_NO_PAD.encode(body),
        URL_SAFE_NO_PAD.encode(mac)
    )
}

#[test]
fn test_type_marker_is_case_insensitive() {
    let token = forge(
        json!({"typ": "jwt", "alg": "hs512", "isa": "2024-05-01T12:00:00Z"}),
        json!(1),
        SignType::Hs512,
    );
    let decoded: Decoded<i32> = decode(&token, KEY).unwrap();
    assert_eq!(decoded.header.signer(), SignType::Hs512);
    assert_eq!(decoded.header.token_type(), "jwt");
}

#[test]
fn test_wrong_type_marker_is_malformed() {
    let token = forge(
        json!({"typ": "JWS", "alg": "HS256", "isa": "2024-05-01T12:00:00Z"}),
        json!(1),
        SignType::Hs256,
    );
    assert!(matches!(
        decode::<i32>(&token, KEY),
        Err(JwtError::MalformedToken(_))
    ));
}

#[test]
fn test_unknown_algorithm_is_an_ordinary_error() {
    let token = forge(
        json!({"typ": "JWT", "alg": "RS256", "isa": "2024-05-01T12:00:00Z"}),
        json!(1),
        SignType::Hs256,
    );
    match decode::<i32>(&token, KEY) {
        Err(JwtError::UnsupportedAlgorithm(alg)) => assert_eq!(alg, "RS256"),
        other => panic!("expected UnsupportedAlgorithm, got {other:?}"),
    }
}

#[test]
fn test_unserializable_payload() {
    use std::collections::HashMap;
    let mut bad = HashMap::new();
    bad.insert(vec![1u8], 1);
    assert!(matches!(
        encode(None, &bad, KEY),
        Err(JwtError::Serialization(_))
    ));
}

#[test]
fn test_concurrent_encode_and_decode_share_a_header() {
    let header = std::sync::Arc::new(Header::new().with_subject("shared"));
    let codec = Codec::new();
    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let header = header.clone();
            let codec = codec.clone();
            std::thread::spawn(move || {
                let token = codec.encode(Some(&header), &i, KEY).unwrap();
                let decoded: Decoded<u64> = codec.decode(&token, KEY).unwrap();
                assert_eq!(decoded.payload, i);
                assert_eq!(decoded.header.subject(), Some("shared"));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(header.issued_at(), DateTime::<Utc>::UNIX_EPOCH);
}
