#![no_main]

use exif_io::decode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary input must never panic: malformed headers yield an
    // empty profile and malformed entries land in the invalid-tag set.
    let decoded = decode(data);

    // Whatever survived must be internally consistent
    for value in &decoded.values {
        let _ = value.to_string();
        assert!(value.tag().spec().is_some());
    }

    if let Some(range) = decoded.thumbnail {
        assert!(range.offset + range.length <= data.len());
    }
});
