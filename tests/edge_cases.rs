#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for the login codec's public surface
//! Boundary versions, malformed frames and field limits

use login_protocol::config::{ENVELOPE_BLOCK_SIZE, HARDWARE_INFO_SIZE};
use login_protocol::core::packet::{Account, LoginRecord};
use login_protocol::error::ProtocolError;
use login_protocol::protocol::decoder::MIN_FRAME_SIZE;
use login_protocol::protocol::login::LoginCodec;
use login_protocol::utils::crypto::RsaKey;

fn key() -> RsaKey {
    RsaKey::from_pem(include_str!("fixtures/login_1024.pem")).expect("fixture key")
}

fn record_for(version: u16) -> LoginRecord {
    if version >= 830 {
        LoginRecord::new(version, "user1", "pass1")
    } else {
        LoginRecord::new(version, 4242u32, "pass1")
    }
}

// ============================================================================
// VERSION BOUNDARIES
// ============================================================================

#[test]
fn test_every_range_boundary_roundtrips() {
    let key = key();
    let codec = LoginCodec::default();

    for version in [700u16, 760, 761, 769, 770, 829, 830, 899, 900, 979] {
        let mut record = record_for(version);
        let frame = codec
            .encode(&mut record, &key)
            .unwrap_or_else(|e| panic!("encode {version}: {e}"));
        let decoded = codec
            .decode(&frame, &key)
            .unwrap_or_else(|e| panic!("decode {version}: {e}"));

        assert_eq!(decoded.protocol_version, version);
        assert_eq!(decoded.account, record.account);
        assert_eq!(decoded.password, "pass1");
        assert_eq!(decoded.session_key.is_some(), version >= 770);
    }
}

#[test]
fn test_frame_sizes_per_layout() {
    let key = key();
    // length + opcode + os + build + revisions
    let header = 2 + 1 + 2 + 2 + 12;

    let frame = LoginCodec::default()
        .encode(&mut record_for(760), &key)
        .unwrap();
    assert_eq!(frame.len(), header + 4 + 7);

    let frame = LoginCodec::default()
        .encode(&mut record_for(800), &key)
        .unwrap();
    assert_eq!(frame.len(), header + ENVELOPE_BLOCK_SIZE);

    let frame = LoginCodec::default()
        .encode(&mut record_for(900), &key)
        .unwrap();
    assert_eq!(frame.len(), header + 8 + ENVELOPE_BLOCK_SIZE);
}

#[test]
fn test_above_cutoff_rejected_on_decode() {
    let key = key();
    let mut record = record_for(760);
    let mut frame = LoginCodec::default()
        .encode(&mut record, &key)
        .unwrap()
        .to_vec();
    // client build sits right after the length, opcode and OS id
    frame[5..7].copy_from_slice(&1098u16.to_le_bytes());

    assert!(matches!(
        LoginCodec::default().decode(&frame, &key),
        Err(ProtocolError::UnsupportedVersion(1098))
    ));
}

// ============================================================================
// MALFORMED FRAMES
// ============================================================================

#[test]
fn test_every_short_prefix_is_truncated_or_mismatched() {
    let key = key();
    let mut record = record_for(860);
    let frame = LoginCodec::default().encode(&mut record, &key).unwrap();

    for cut in 0..frame.len() {
        match LoginCodec::default().decode(&frame[..cut], &key) {
            Err(ProtocolError::TruncatedInput { .. }) => {}
            other => panic!("cut at {cut}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_below_minimum_frame() {
    let key = key();
    for len in 0..MIN_FRAME_SIZE {
        let input = vec![0x01; len];
        match LoginCodec::default().decode(&input, &key) {
            Err(ProtocolError::TruncatedInput { field, .. }) => assert_eq!(field, "header"),
            other => panic!("len {len}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_malformed_checksum_prefix() {
    let key = key();
    let mut record = record_for(900);
    let mut frame = LoginCodec::default()
        .encode(&mut record, &key)
        .unwrap()
        .to_vec();
    frame[5] = b'z';

    assert!(matches!(
        LoginCodec::default().decode(&frame, &key),
        Err(ProtocolError::InvalidChecksumPrefix)
    ));
}

#[test]
fn test_uppercase_checksum_accepted() {
    let key = key();
    let mut record = record_for(900);
    let mut frame = LoginCodec::default()
        .encode(&mut record, &key)
        .unwrap()
        .to_vec();
    frame[2..10].make_ascii_uppercase();

    let decoded = LoginCodec::default().decode(&frame, &key).unwrap();
    assert_eq!(decoded.protocol_version, 900);
}

#[test]
fn test_corrupted_ciphertext_never_panics() {
    let key = key();
    let mut record = record_for(860);
    let frame = LoginCodec::default().encode(&mut record, &key).unwrap();

    for i in 19..frame.len() {
        let mut corrupted = frame.to_vec();
        corrupted[i] ^= 0xff;
        // Either a structural error or, rarely, a decode of garbage
        let _ = LoginCodec::default().decode(&corrupted, &key);
    }
}

#[test]
fn test_invalid_utf8_password() {
    let mut frame = vec![0u8, 0, 0x01, 0x02, 0x00];
    frame.extend_from_slice(&740u16.to_le_bytes());
    frame.extend_from_slice(&[0; 12]);
    frame.extend_from_slice(&7u32.to_le_bytes());
    frame.extend_from_slice(&[2, 0, 0xff, 0xfe]);
    let len = (frame.len() - 2) as u16;
    frame[..2].copy_from_slice(&len.to_le_bytes());

    assert!(matches!(
        LoginCodec::default().decode(&frame, &key()),
        Err(ProtocolError::InvalidString { .. })
    ));
}

// ============================================================================
// FIELD LIMITS
// ============================================================================

#[test]
fn test_largest_payload_that_fits() {
    let key = key();
    // sentinel + session key + account string + password string
    let room = ENVELOPE_BLOCK_SIZE - 1 - 16 - (2 + 5) - 2;
    let password = "p".repeat(room);
    let mut record = LoginRecord::new(860, "user1", &password);

    let frame = LoginCodec::default().encode(&mut record, &key).unwrap();
    let decoded = LoginCodec::default().decode(&frame, &key).unwrap();
    assert_eq!(decoded.password, password);
    assert!(decoded.padding.is_empty());

    let mut record = LoginRecord::new(860, "user1", &"p".repeat(room + 1));
    assert!(matches!(
        LoginCodec::default().encode(&mut record, &key),
        Err(ProtocolError::PayloadTooLarge { .. })
    ));
}

#[test]
fn test_hardware_info_with_tight_envelope() {
    let key = key();
    let hardware = vec![0x33; HARDWARE_INFO_SIZE];
    let mut record = LoginRecord::new(860, "u", "p").with_hardware_info(hardware.clone());

    let frame = LoginCodec::default().encode(&mut record, &key).unwrap();
    let decoded = LoginCodec::default().decode(&frame, &key).unwrap();
    assert_eq!(decoded.hardware_info, hardware);
    assert_eq!(decoded.account, Account::Name("u".to_string()));
}

#[test]
fn test_padding_truncated_to_block() {
    let key = key();
    let mut record = LoginRecord::new(860, "user1", "pass1");
    record.padding = vec![0x77; 500];

    let frame = LoginCodec::default().encode(&mut record, &key).unwrap();
    let decoded = LoginCodec::default().decode(&frame, &key).unwrap();
    // non-zero filler after the password reads back as hardware info first
    assert_eq!(decoded.hardware_info, vec![0x77; HARDWARE_INFO_SIZE]);
    assert!(decoded.padding.iter().all(|&b| b == 0x77));
    assert_eq!(
        decoded.padding.len() + HARDWARE_INFO_SIZE,
        ENVELOPE_BLOCK_SIZE - 1 - 16 - 7 - 7
    );
}

#[test]
fn test_plaintext_ignores_padding() {
    let key = key();
    let mut record = record_for(740);
    record.padding = vec![0x77; 10];

    let frame = LoginCodec::default().encode(&mut record, &key).unwrap();
    let decoded = LoginCodec::default().decode(&frame, &key).unwrap();
    assert!(decoded.padding.is_empty());
}

#[test]
fn test_failed_encode_leaves_record_untouched() {
    let key = key();
    let mut record = LoginRecord::new(860, "user1", &"p".repeat(200));
    assert!(LoginCodec::default().encode(&mut record, &key).is_err());
    assert_eq!(record.session_key, None);
    assert!(record.raw_packet.is_empty());
}

#[test]
fn test_reencode_replaces_raw_packet() {
    let key = key();
    let mut record = record_for(860);
    let first = LoginCodec::default().encode(&mut record, &key).unwrap();
    assert_eq!(record.raw_packet, first);

    record.password = "other".to_string();
    let second = LoginCodec::default().encode(&mut record, &key).unwrap();
    assert_eq!(record.raw_packet, second);
    assert_ne!(first, second);
}
