#![no_main]

use libfuzzer_sys::fuzz_target;
use login_protocol::{LoginCodec, RsaKey};
use std::sync::OnceLock;

static KEY: OnceLock<Option<RsaKey>> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let Some(key) = KEY
        .get_or_init(|| RsaKey::from_pem(include_str!("../../tests/fixtures/login_1024.pem")).ok())
        .as_ref()
    else {
        return;
    };

    // Fuzz login decoding - test for panics, crashes, infinite loops
    let _ = LoginCodec::default().decode(data, key);
});
