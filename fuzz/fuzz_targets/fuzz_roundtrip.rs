#![no_main]

use exif_io::{decode, encode, ExifParts};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever decodes must re-encode, and the re-encoded buffer must be a
    // fixed point: decode -> encode -> decode -> encode is byte-stable.
    let decoded = decode(data);

    let Ok(Some(first)) = encode(&decoded.values, ExifParts::ALL) else {
        return;
    };

    let reread = decode(&first);
    assert!(reread.invalid_tags.is_empty(), "writer emitted invalid entries");

    let second = encode(&reread.values, ExifParts::ALL)
        .expect("re-encode cannot overflow")
        .expect("re-encode cannot be empty");
    assert_eq!(first, second, "encode is not a fixed point");
});
