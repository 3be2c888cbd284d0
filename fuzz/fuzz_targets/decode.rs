#![no_main]
use b58id::{Codec, Config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let codec = Codec::new(&Config::new().cache_capacity(1024).unwrap());
    let text = String::from_utf8_lossy(data);
    let id = codec.decode(text.as_ref());
    if id != 0 && id <= i64::MAX as u64 {
        // Anything accepted re-encodes to something that decodes the same.
        let encoded = codec.encode(id as i64).unwrap();
        assert_eq!(codec.decode(&encoded), id);
    }
    if let Some(uuid) = codec.decode_uuid(&text) {
        assert!(codec.encode_uuid(&uuid).is_ok());
    }
});
