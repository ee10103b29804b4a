//! Outbound signing integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqsig_auth::canonical::build_canonical_string;
    use reqsig_auth::keys::{MIN_RSA_KEY_BITS, key_bits, parse_public_key_pem};
    use reqsig_auth::{
        EcdsaSigner, MessageSigner, PublicKey, RsaSigner, SigningError, sign, sign_request,
        verify_signature,
    };
    use reqsig_core::SigningAlgorithm;

    use crate::{
        API_4096_PRIVATE_PEM, API_PRIVATE_PEM, API_PRIVATE_PKCS1_PEM, API_PUBLIC_PEM,
        EC_PRIVATE_PEM, KEY_ID, WEAK_PRIVATE_PEM, fixed_signer,
    };

    const PATH: &str = "/api/v1/abc/account/def";
    const CANONICAL_GET: &str =
        "(request-target): get /api/v1/abc/account/def\nDate: 2024-01-01T00:00:00.000Z\nDigest: ";

    // `printf '%s' "$CANONICAL_GET" | openssl dgst -sha512 -sign api-private.pem | base64`
    const OPENSSL_SHA512: &str = "vDX0Z/Y/qIs/OPyIKlkNc1dWCCsTMAD6u1go2vcPyLNNKQaxoPqMKx+PlN6zFW3zLi/l0S3G8GcszTIbskD5Hyh2Thj3bbqD5I3CN2lwFsSq3DmK3w5akHgcrO++IV1jZa9wFAzgCJhFDsz7EIhU3ceFjW594pw5HnA/hj8pYhZq/LvN6xu4J1kt1yQau5s5zLj1wEJQFsZsr8Fg1Uy2XrYwWCbe61khJJMel1FLGtSiaJsutq+Yedg6HQEn7uPD7ePVV716N2KICo5kRs/xEydcpJHLuZ0rhChYnQnv0Gr0TA/iztn5GYmZF8Gnpu4NTcKWyzS9lEd9oPz/sGTeZA==";
    // Same, with `-sha256`.
    const OPENSSL_SHA256: &str = "VyJjpC9Wbo/5LQrhvx/+J73lwojlEvT7ebmI5cnonL9m3ho/BTe3UgBRlaOz/bjHB6rF9t2kfqOXxx6Eu8DOIQkotylYs6UOdPq9q4vf95XVV6NR4FiGtMs9AJGtlDZZRjzlhQmXLun8kLTrWB09WP9cuNO0uPosnIchl4wdCg2YGFsrDgJRXPoPuifo2YKeYe42lFuI56lwP11bO+MnoPV0M2WsD3R2EABucpJ+nPnS8luqmnA01Az2Qui+x8F8UD/xedD3xfa1LoUBVCLRl5rmwIqm1DJXDcnCKX8bkTZ1ReX6JZ1x0JAaLgps2MJT3s5R4VLBPXXMrbFdMN7meg==";

    #[test]
    fn test_should_produce_openssl_compatible_get_headers() {
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, None)
            .sign_request("get", PATH, None)
            .unwrap();

        assert_eq!(headers.date, "2024-01-01T00:00:00.000Z");
        assert_eq!(headers.digest, "");
        assert_eq!(
            headers.authorization,
            format!(
                "Signature keyid=\"{KEY_ID}\",algorithm=\"rsa-sha512\",\
                 headers=\"(request-target) Date Digest\",signature=\"{OPENSSL_SHA512}\""
            )
        );
    }

    #[test]
    fn test_should_produce_openssl_compatible_sha256_signature() {
        let headers = fixed_signer(SigningAlgorithm::RsaSha256, None)
            .sign_request("GET", PATH, None)
            .unwrap();

        assert!(headers.authorization.contains("algorithm=\"rsa-sha256\""));
        assert!(
            headers
                .authorization
                .ends_with(&format!("signature=\"{OPENSSL_SHA256}\""))
        );
    }

    #[test]
    fn test_should_sign_identically_with_pkcs1_and_pkcs8_keys() {
        let pkcs8 = RsaSigner::from_pem(API_PRIVATE_PEM, SigningAlgorithm::RsaSha512).unwrap();
        let pkcs1 = RsaSigner::from_pem(API_PRIVATE_PKCS1_PEM, SigningAlgorithm::RsaSha512).unwrap();

        assert_eq!(sign(CANONICAL_GET, &pkcs8).unwrap(), OPENSSL_SHA512);
        assert_eq!(sign(CANONICAL_GET, &pkcs1).unwrap(), OPENSSL_SHA512);
    }

    #[test]
    fn test_should_sign_with_4096_bit_key() {
        let signer = RsaSigner::from_pem(API_4096_PRIVATE_PEM, SigningAlgorithm::RsaSha512).unwrap();
        assert_eq!(key_bits(signer.public_key().as_rsa().unwrap()), 4096);

        let signature = sign(CANONICAL_GET, &signer).unwrap();
        assert!(verify_signature(
            &signer.public_key(),
            SigningAlgorithm::RsaSha512,
            CANONICAL_GET.as_bytes(),
            &signature
        ));
    }

    #[test]
    fn test_should_reject_undersized_and_non_rsa_keys() {
        match RsaSigner::from_pem(WEAK_PRIVATE_PEM, SigningAlgorithm::RsaSha512) {
            Err(SigningError::KeyTooSmall { bits, minimum }) => {
                assert_eq!(bits, 1024);
                assert_eq!(minimum, MIN_RSA_KEY_BITS);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let err = RsaSigner::from_pem(EC_PRIVATE_PEM, SigningAlgorithm::RsaSha512).unwrap_err();
        assert!(matches!(err, SigningError::InvalidKey(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_should_change_signature_on_any_single_byte_change() {
        let signer = RsaSigner::from_pem(API_PRIVATE_PEM, SigningAlgorithm::RsaSha512).unwrap();
        let public_key = PublicKey::Rsa(parse_public_key_pem(API_PUBLIC_PEM).unwrap());
        let canonical = build_canonical_string(
            "put",
            "/api/v2/payments/local/account/a/category/c",
            "2024-01-01T00:00:00.000Z",
            "2eqI90omUjsCyeohUNghFj0Y3xBQoGJIP3QWz0B0PxJHJ+YFJsPHBzvvCQZqB954zMvdG2ORIU1k3oSN5ZDfMw==",
        )
        .unwrap();
        let signature = sign(&canonical, &signer).unwrap();

        for i in (0..canonical.len()).step_by(7) {
            let mut tampered = canonical.clone().into_bytes();
            tampered[i] ^= 0x20;
            assert!(
                !verify_signature(
                    &public_key,
                    SigningAlgorithm::RsaSha512,
                    &tampered,
                    &signature
                ),
                "byte {i}"
            );
        }
    }

    #[test]
    fn test_should_sign_put_body_digest() {
        let body = br#"{"accountName":"X","sortCode":"123456"}"#;
        let headers = fixed_signer(SigningAlgorithm::RsaSha512, Some("access-token"))
            .sign_request("put", "/api/v2/payees", Some(body))
            .unwrap();

        assert_eq!(
            headers.digest,
            "2eqI90omUjsCyeohUNghFj0Y3xBQoGJIP3QWz0B0PxJHJ+YFJsPHBzvvCQZqB954zMvdG2ORIU1k3oSN5ZDfMw=="
        );
        assert!(headers.authorization.starts_with("Bearer access-token;Signature keyid="));
    }

    #[test]
    fn test_should_refuse_full_urls_before_signing() {
        let signer = RsaSigner::from_pem(API_PRIVATE_PEM, SigningAlgorithm::RsaSha512).unwrap();
        let result = sign_request(
            "get",
            "https://api-sandbox.starlingbank.com/api/v2/accounts",
            None,
            KEY_ID,
            Arc::new(signer),
            None,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, SigningError::InvalidPath { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_should_sign_with_p256_key() {
        let signer = EcdsaSigner::from_pem(EC_PRIVATE_PEM, SigningAlgorithm::EcdsaSha512).unwrap();
        let signature = sign(CANONICAL_GET, &signer).unwrap();
        assert!(verify_signature(
            &signer.public_key(),
            SigningAlgorithm::EcdsaSha512,
            CANONICAL_GET.as_bytes(),
            &signature
        ));
    }

    #[test]
    fn test_should_refuse_method_with_line_breaks() {
        let signer = RsaSigner::from_pem(API_PRIVATE_PEM, SigningAlgorithm::RsaSha512).unwrap();
        let err = sign_request(
            "get /x\nDate: forged",
            "/api/v2/accounts",
            None,
            KEY_ID,
            Arc::new(signer),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SigningError::InvalidMethod(_)));
        assert!(err.is_configuration());
    }
}
