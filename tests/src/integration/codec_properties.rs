//! Envelope codec guarantees the whole testbed rests on.
//!
//! The attack outcomes in the monitor's decision table are only honest if
//! the codec actually behaves this way: any altered bit fails
//! authentication, wrong secrets fail authentication, and identical
//! inputs seal identically (which is what makes replays byte-identical).

#[cfg(test)]
mod tests {
    use shared_crypto::{open, seal, CryptoError, EnvelopeNonce, SecretKey, TAG_LEN};
    use shared_types::{EnvelopeWire, SensorReading, WireError};

    const KEY: &[u8; 16] = b"asconciphertest1";
    const NONCE: &[u8; 16] = b"asconcipher1test";
    const AD: &[u8] = b"ASCON";

    fn secrets() -> (SecretKey, EnvelopeNonce) {
        (SecretKey::from_bytes(*KEY), EnvelopeNonce::from_bytes(*NONCE))
    }

    #[test]
    fn test_roundtrip_recovers_reading() {
        let (key, nonce) = secrets();
        let reading = SensorReading::new("ESP8266_HCSR04", 12, 24.7);
        let plaintext = reading.to_json().unwrap();

        let sealed = seal(&plaintext, &key, &nonce, AD).unwrap();
        assert_eq!(sealed.ciphertext.len(), plaintext.len() + TAG_LEN);

        let recovered = open(&sealed.ciphertext, &key, &nonce, AD).unwrap();
        assert_eq!(SensorReading::from_json(&recovered).unwrap(), reading);
    }

    #[test]
    fn test_empty_plaintext_is_tag_only() {
        let (key, nonce) = secrets();
        let sealed = seal(b"", &key, &nonce, AD).unwrap();
        assert_eq!(sealed.ciphertext.len(), TAG_LEN);
        assert_eq!(open(&sealed.ciphertext, &key, &nonce, AD).unwrap(), b"");
    }

    #[test]
    fn test_every_single_bit_flip_is_rejected() {
        let (key, nonce) = secrets();
        let sealed = seal(b"distance=25.0", &key, &nonce, AD).unwrap();

        for byte_idx in 0..sealed.ciphertext.len() {
            for bit in 0..8 {
                let mut corrupted = sealed.ciphertext.clone();
                corrupted[byte_idx] ^= 1 << bit;
                let result = open(&corrupted, &key, &nonce, AD);
                assert_eq!(
                    result,
                    Err(CryptoError::AuthenticationFailure),
                    "flip of bit {bit} in byte {byte_idx} was not rejected"
                );
            }
        }
    }

    #[test]
    fn test_wrong_secrets_rejected() {
        let (key, nonce) = secrets();
        let sealed = seal(b"distance=25.0", &key, &nonce, AD).unwrap();

        let wrong_key = SecretKey::from_bytes(*b"wrongkeywrongkey");
        assert_eq!(
            open(&sealed.ciphertext, &wrong_key, &nonce, AD),
            Err(CryptoError::AuthenticationFailure)
        );

        let wrong_nonce = EnvelopeNonce::from_bytes(*b"wrongnoncewrong1");
        assert_eq!(
            open(&sealed.ciphertext, &key, &wrong_nonce, AD),
            Err(CryptoError::AuthenticationFailure)
        );

        assert_eq!(
            open(&sealed.ciphertext, &key, &nonce, b"OTHER"),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let (key, nonce) = secrets();
        let sealed = seal(b"distance=25.0", &key, &nonce, AD).unwrap();

        for len in 0..sealed.ciphertext.len() {
            assert_eq!(
                open(&sealed.ciphertext[..len], &key, &nonce, AD),
                Err(CryptoError::AuthenticationFailure),
                "truncation to {len} bytes was not rejected"
            );
        }
    }

    #[test]
    fn test_sealing_is_deterministic() {
        // Fixed key and nonce make sealing a pure function of the
        // plaintext. This is what makes a captured envelope replayable
        // byte-identically.
        let (key, nonce) = secrets();
        let a = seal(b"distance=25.0", &key, &nonce, AD).unwrap();
        let b = seal(b"distance=25.0", &key, &nonce, AD).unwrap();
        assert_eq!(a.ciphertext, b.ciphertext);

        let c = seal(b"distance=25.1", &key, &nonce, AD).unwrap();
        assert_ne!(a.ciphertext, c.ciphertext);
    }

    #[test]
    fn test_wire_envelope_carries_ciphertext_exactly() {
        let (key, nonce) = secrets();
        let sealed = seal(b"distance=25.0", &key, &nonce, AD).unwrap();

        let wire = EnvelopeWire::from_ciphertext(&sealed.ciphertext, sealed.algorithm);
        let bytes = wire.encode().unwrap();
        let decoded = EnvelopeWire::decode(&bytes).unwrap();

        assert_eq!(decoded.ciphertext().unwrap(), sealed.ciphertext);
        assert_eq!(decoded.algorithm.as_deref(), Some("Ascon-128"));
    }

    #[test]
    fn test_malformed_hex_rejected_before_decryption() {
        let err = EnvelopeWire::decode(br#"{"encrypted_data":"abc"}"#).unwrap_err();
        assert!(matches!(err, WireError::MalformedEnvelope(_)));

        let err = EnvelopeWire::decode(br#"{"encrypted_data":"xyzw"}"#).unwrap_err();
        assert!(matches!(err, WireError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_bad_secret_lengths_rejected() {
        assert!(matches!(
            SecretKey::from_slice(b"short"),
            Err(CryptoError::InvalidKeyLength { expected: 16, actual: 5 })
        ));
        assert!(matches!(
            EnvelopeNonce::from_slice(b"seventeen bytes!!"),
            Err(CryptoError::InvalidNonceLength { expected: 16, actual: 17 })
        ));
    }
}
