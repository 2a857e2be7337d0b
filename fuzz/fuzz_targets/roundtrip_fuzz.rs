#![no_main]
use libfuzzer_sys::fuzz_target;
use retrolz::codec;

fuzz_target!(|data: &[u8]| {
    let packed = codec::encode(data);
    assert_eq!(packed.last(), Some(&0x00));
    assert!(packed.len() <= data.len() + data.len().div_ceil(127) + 1);

    let decoded = codec::decode(&packed).unwrap();
    assert_eq!(decoded, data);
});
