#![no_main]

use libfuzzer_sys::fuzz_target;
use login_protocol::{LoginCodec, LoginRecord, RsaKey};
use std::sync::OnceLock;

static KEY: OnceLock<Option<RsaKey>> = OnceLock::new();

fuzz_target!(|input: (u16, u16, String, String, Option<String>)| {
    let Some(key) = KEY
        .get_or_init(|| RsaKey::from_pem(include_str!("../../tests/fixtures/login_1024.pem")).ok())
        .as_ref()
    else {
        return;
    };

    let (version, os, account, password, character) = input;
    let mut record = if (830..980).contains(&version) {
        LoginRecord::new(version, account.as_str(), &password)
    } else {
        LoginRecord::new(version, account.len() as u32, &password)
    };
    record.operating_system = os;
    record.character_name = character;

    let codec = LoginCodec::default();
    if let Ok(frame) = codec.encode(&mut record, key) {
        let decoded = codec.decode(&frame, key).expect("encoded frame must decode");
        assert_eq!(decoded.password, record.password);
        assert_eq!(decoded.account, record.account);
        assert_eq!(decoded.character_name, record.character_name);
    }
});
