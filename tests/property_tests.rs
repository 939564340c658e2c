//! Property-based tests using proptest
//!
//! These tests validate codec invariants across randomly generated records and
//! arbitrary input bytes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use login_protocol::config::{ENVELOPE_BLOCK_SIZE, HARDWARE_INFO_SIZE};
use login_protocol::core::packet::{Account, LoginRecord};
use login_protocol::error::{ProtocolError, Result as CodecResult};
use login_protocol::protocol::login::LoginCodec;
use login_protocol::utils::crypto::{EnvelopeCipher, RsaKey};
use proptest::prelude::*;
use std::sync::OnceLock;

fn key() -> &'static RsaKey {
    static KEY: OnceLock<RsaKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaKey::from_pem(include_str!("fixtures/login_1024.pem")).expect("fixture key")
    })
}

/// Byte-wise XOR stand-in for the RSA envelope
struct XorCipher(u8);

impl EnvelopeCipher for XorCipher {
    fn block_size(&self) -> usize {
        ENVELOPE_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(block.iter().map(|b| b ^ self.0).collect())
    }

    fn decrypt_block(&self, block: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(block.iter().map(|b| b ^ self.0).collect())
    }
}

/// Hardware info that cannot be mistaken for the envelope's zero fill
fn nonzero_hardware() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), HARDWARE_INFO_SIZE).prop_map(|mut info| {
        info[0] |= 1;
        info
    })
}

fn short_string(max: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::char::range('!', '~'), 0..=max)
        .prop_map(|chars| chars.into_iter().collect())
}

// Property: plaintext layouts survive a round trip field for field
proptest! {
    #[test]
    fn prop_plaintext_roundtrip(
        version in 700u16..=760,
        os in any::<u16>(),
        revisions in any::<(u32, u32, u32)>(),
        account in any::<u32>(),
        password in short_string(200),
        hardware in proptest::option::of(proptest::collection::vec(any::<u8>(), HARDWARE_INFO_SIZE)),
    ) {
        let mut record = LoginRecord::new(version, account, &password)
            .with_revisions(revisions.0, revisions.1, revisions.2)
            .with_hardware_info(hardware.clone().unwrap_or_default());
        record.operating_system = os;

        let frame = LoginCodec::default().encode(&mut record, key()).unwrap();
        let decoded = LoginCodec::default().decode(&frame, key()).unwrap();

        prop_assert_eq!(decoded.protocol_version, version);
        prop_assert_eq!(decoded.operating_system, os);
        prop_assert_eq!(
            (decoded.sprite_revision, decoded.data_revision, decoded.picture_revision),
            revisions
        );
        prop_assert_eq!(decoded.account, Account::Number(account));
        prop_assert_eq!(decoded.password, password);
        prop_assert_eq!(decoded.hardware_info, hardware.unwrap_or_default());
        prop_assert_eq!(decoded.raw_packet, frame);
    }
}

// Property: enveloped layouts round trip every field but the padding
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_envelope_roundtrip(
        version in 761u16..=979,
        os in any::<u16>(),
        revisions in any::<(u32, u32, u32)>(),
        name in short_string(15),
        number in any::<u32>(),
        password in short_string(15),
        character in proptest::option::of(short_string(15)),
        session_key in any::<[u8; 16]>(),
        hardware in proptest::option::of(nonzero_hardware()),
    ) {
        let account = if version >= 830 {
            Account::Name(name)
        } else {
            Account::Number(number)
        };
        let mut record = LoginRecord::new(version, account.clone(), &password)
            .with_revisions(revisions.0, revisions.1, revisions.2)
            .with_session_key(session_key)
            .with_hardware_info(hardware.clone().unwrap_or_default());
        record.operating_system = os;
        record.character_name = character.clone();

        let frame = LoginCodec::default().encode(&mut record, key()).unwrap();
        let decoded = LoginCodec::default().decode(&frame, key()).unwrap();

        prop_assert_eq!(decoded.protocol_version, version);
        prop_assert_eq!(decoded.client_build, version);
        prop_assert_eq!(decoded.operating_system, os);
        let expected_revisions = if character.is_some() { (0, 0, 0) } else { revisions };
        prop_assert_eq!(
            (decoded.sprite_revision, decoded.data_revision, decoded.picture_revision),
            expected_revisions
        );
        prop_assert_eq!(decoded.character_name, character);
        prop_assert_eq!(decoded.session_key, (version >= 770).then_some(session_key));
        prop_assert_eq!(decoded.account, account);
        prop_assert_eq!(decoded.password, password);
        prop_assert_eq!(decoded.hardware_info, hardware.unwrap_or_default());
        prop_assert_eq!(decoded.raw_packet, frame);
    }
}

// Property: a decrypted block whose first byte is not zero is always rejected
proptest! {
    #[test]
    fn prop_sentinel_enforced(
        version in 761u16..=979,
        seal_mask in any::<u8>(),
        open_mask in any::<u8>(),
        password in short_string(20),
    ) {
        prop_assume!(seal_mask != open_mask);
        let mut record = if version >= 830 {
            LoginRecord::new(version, "user1", &password)
        } else {
            LoginRecord::new(version, 7u32, &password)
        };

        let frame = LoginCodec::default()
            .encode(&mut record, &XorCipher(seal_mask))
            .unwrap();
        let result = LoginCodec::default().decode(&frame, &XorCipher(open_mask));
        prop_assert!(matches!(
            result,
            Err(ProtocolError::SentinelError(b)) if b == seal_mask ^ open_mask
        ));
    }
}

// Property: encode either fits the block or reports PayloadTooLarge
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_envelope_capacity(password_len in 0usize..200) {
        let mut record = LoginRecord::new(860, "user1", &"x".repeat(password_len));
        let payload = 1 + 16 + 7 + 2 + password_len;

        let result = LoginCodec::default().encode(&mut record, key());
        prop_assert_eq!(result.is_ok(), payload <= ENVELOPE_BLOCK_SIZE);
    }
}

// Property: decode never panics on arbitrary input
proptest! {
    #[test]
    fn prop_decode_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 0..300)) {
        let _ = LoginCodec::default().decode(&data, key());
    }
}

// Property: decode never panics on a well-formed length prefix over garbage
proptest! {
    #[test]
    fn prop_decode_framed_garbage(body in proptest::collection::vec(any::<u8>(), 6..300)) {
        let mut frame = (body.len() as u16).to_le_bytes().to_vec();
        frame.extend_from_slice(&body);
        let _ = LoginCodec::default().decode(&frame, key());
    }
}

// Property: encoding is deterministic once the session key is fixed
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_encode_deterministic(password in short_string(30)) {
        let mut record = LoginRecord::new(900, "user1", &password).with_session_key([7; 16]);
        let first = LoginCodec::default().encode(&mut record, key()).unwrap();
        let second = LoginCodec::default().encode(&mut record, key()).unwrap();
        prop_assert_eq!(first, second);
    }
}
