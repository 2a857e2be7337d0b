#![no_main]
use libfuzzer_sys::fuzz_target;
use retrolz::codec;

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let limited = codec::decode_with_limit(data, 1 << 20);

    // The token reader must agree with the decoder on well-formedness.
    let tokens: Result<Vec<_>, _> = codec::Tokens::new(data).collect();
    if let Ok(out) = limited {
        let tokens = tokens.expect("decoder accepted a stream the token reader rejected");
        let produced: usize = tokens.iter().map(|t| t.output_len()).sum();
        assert_eq!(produced, out.len());
    }
});
