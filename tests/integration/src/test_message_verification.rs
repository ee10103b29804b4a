//! Inbound message-signature integration tests: sign with the request signer,
//! verify as the receiving server would.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::HeaderValue;
    use reqsig_auth::{
        AuthError, EcdsaSigner, FixedClock, MessageSigner, RequestSigner, SignerSettings,
        StaticKeyProvider, verify_message,
    };
    use reqsig_core::{KeyId, SigningAlgorithm};

    use crate::{
        EC_PRIVATE_PEM, KEY_ID, fixed_instant, fixed_signer, policy, provider,
        signed_request_parts,
    };

    #[test]
    fn test_should_verify_round_trip_for_each_algorithm() {
        for algorithm in [SigningAlgorithm::RsaSha256, SigningAlgorithm::RsaSha512] {
            let body = br#"{"amount":{"currency":"GBP","minorUnits":1234}}"#;
            let path = "/api/v2/payments/local/account/a/category/c";
            let headers = fixed_signer(algorithm, Some("tok"))
                .sign_request("put", path, Some(body))
                .unwrap();
            let parts = signed_request_parts("put", path, &headers);

            let verified = verify_message(&parts, body, &provider(), &policy()).unwrap();
            assert_eq!(verified.key_id, KEY_ID);
            assert_eq!(verified.algorithm, algorithm);
            assert_eq!(verified.bearer_token.as_deref(), Some("tok"));
        }
    }

    #[test]
    fn test_should_reject_single_byte_body_change() {
        let body = br#"{"reference":"invoice-1"}"#.to_vec();
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, None)
            .sign_request("post", "/api/v2/payees", Some(&body))
            .unwrap();
        let parts = signed_request_parts("post", "/api/v2/payees", &headers);

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            let result = verify_message(&parts, &tampered, &provider(), &policy());
            assert!(matches!(result, Err(AuthError::DigestMismatch)), "byte {i}");
        }
    }

    #[test]
    fn test_should_reject_replayed_signature_with_new_date() {
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, None)
            .sign_request("get", "/api/v2/accounts", None)
            .unwrap();
        let mut parts = signed_request_parts("get", "/api/v2/accounts", &headers);
        parts.headers.insert(
            http::header::DATE,
            HeaderValue::from_static("2024-01-01T00:00:01.000Z"),
        );

        let result = verify_message(&parts, b"", &provider(), &policy());
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_query_string_change() {
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, None)
            .sign_request("get", "/api/v2/feed/account/a/category/c?changesSince=2024-01-01", None)
            .unwrap();
        let mut parts = signed_request_parts(
            "get",
            "/api/v2/feed/account/a/category/c?changesSince=2024-01-01",
            &headers,
        );
        parts.uri = "https://api-sandbox.example.com/api/v2/feed/account/a/category/c?changesSince=2023-01-01"
            .parse()
            .unwrap();

        let result = verify_message(&parts, b"", &provider(), &policy());
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_signature_from_other_key() {
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, None)
            .sign_request("get", "/api/v2/accounts", None)
            .unwrap();
        let parts = signed_request_parts("get", "/api/v2/accounts", &headers);

        let rotation_key =
            reqsig_auth::keys::parse_public_key_pem(crate::ROTATION_PUBLIC_PEM).unwrap();
        let wrong = StaticKeyProvider::new(vec![(KEY_ID.to_owned(), rotation_key)]);

        let result = verify_message(&parts, b"", &wrong, &policy());
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_missing_digest_header() {
        let body = br#"{"a":1}"#;
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, None)
            .sign_request("put", "/api/v2/x", Some(body))
            .unwrap();
        let mut parts = signed_request_parts("put", "/api/v2/x", &headers);
        parts.headers.remove("digest");

        let result = verify_message(&parts, body, &provider(), &policy());
        assert!(matches!(result, Err(AuthError::MissingHeader(name)) if name == "digest"));
    }

    #[test]
    fn test_should_verify_ecdsa_round_trip_with_mixed_key_store() {
        let message_signer =
            EcdsaSigner::from_pem(EC_PRIVATE_PEM, SigningAlgorithm::EcdsaSha256).unwrap();
        let ec_public = message_signer.public_key();
        let rsa_public = reqsig_auth::PublicKey::from_pem(crate::API_PUBLIC_PEM).unwrap();
        let signer = RequestSigner::with_clock(
            SignerSettings {
                key_id: KeyId::new("ec-key").unwrap(),
                access_token: None,
            },
            Arc::new(message_signer),
            Arc::new(FixedClock(fixed_instant())),
        );
        let body = br#"{"amount":1}"#;
        let headers = signer
            .sign_request("post", "/api/v2/payments", Some(body))
            .unwrap();
        let parts = signed_request_parts("post", "/api/v2/payments", &headers);
        let keys = StaticKeyProvider::new(vec![
            (KEY_ID.to_owned(), rsa_public),
            ("ec-key".to_owned(), ec_public),
        ]);

        let verified = verify_message(&parts, body, &keys, &policy()).unwrap();
        assert_eq!(verified.key_id, "ec-key");
        assert_eq!(verified.algorithm, SigningAlgorithm::EcdsaSha256);
    }
}
