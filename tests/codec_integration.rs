// Integration tests for the codec.
//
// Covers the published example stream, the terminator and window rules of
// the token format, literal-run splitting, and rejection of malformed
// streams.

use retrolz::codec::{self, DecodeError, Token, Tokens};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEXT: &str = "this is some text this is some text this is some text this is some text";

const TEXT_PACKED: [u8; 24] = [
    0x12, 0x74, 0x68, 0x69, 0x73, 0x20, 0x69, 0x73, 0x20, 0x73, 0x6f, 0x6d, 0x65, 0x20, 0x74,
    0x65, 0x78, 0x74, 0x20, 0xb2, 0xee, 0x01, 0x74, 0x00,
];

fn roundtrip(data: &[u8]) -> Vec<u8> {
    let packed = codec::encode(data);
    let restored = codec::decode(&packed).unwrap();
    assert_eq!(
        restored,
        data,
        "roundtrip mismatch (input={}, packed={})",
        data.len(),
        packed.len()
    );
    packed
}

fn generate_data(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        data.push((state >> 33) as u8);
    }
    data
}

/// Token headers of a well-formed stream, terminator included.
fn header_offsets(stream: &[u8]) -> Vec<usize> {
    let mut tokens = Tokens::new(stream);
    let mut offsets = Vec::new();
    loop {
        offsets.push(tokens.offset());
        match tokens.next() {
            Some(token) => {
                token.unwrap();
            }
            None => break,
        }
    }
    offsets
}

// ---------------------------------------------------------------------------
// Published example
// ---------------------------------------------------------------------------

#[test]
fn text_compresses_to_reference_bytes() {
    assert_eq!(codec::encode(TEXT.as_bytes()), TEXT_PACKED);
}

#[test]
fn text_decompresses_from_reference_bytes() {
    let restored = codec::decode(&TEXT_PACKED).unwrap();
    assert_eq!(restored.len(), 71);
    assert_eq!(String::from_utf8(restored).unwrap(), TEXT);
}

#[test]
fn text_token_structure() {
    let tokens: Vec<_> = Tokens::new(&TEXT_PACKED).collect::<Result<_, _>>().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0], Token::Literal(&TEXT.as_bytes()[..18]));
    assert_eq!(
        tokens[1],
        Token::BackRef {
            len: 52,
            distance: 18
        }
    );
    assert_eq!(tokens[2], Token::Literal(b"t"));
}

// ---------------------------------------------------------------------------
// Format rules
// ---------------------------------------------------------------------------

#[test]
fn empty_input() {
    assert_eq!(codec::encode(&[]), vec![0x00]);
    assert!(codec::decode(&[0x00]).unwrap().is_empty());
}

#[test]
fn terminator_is_the_only_zero_header() {
    let inputs = [
        vec![0u8; 1000],
        generate_data(3000, 1),
        (0..2000u32).map(|i| (i % 3) as u8).collect(),
        TEXT.as_bytes().repeat(20),
    ];
    for input in &inputs {
        let packed = roundtrip(input);
        assert_eq!(packed.last(), Some(&0x00));
        let offsets = header_offsets(&packed);
        let (last, rest) = offsets.split_last().unwrap();
        assert_eq!(*last, packed.len() - 1);
        for &off in rest {
            assert_ne!(packed[off], 0x00, "zero header at offset {off}");
        }
    }
}

#[test]
fn run_of_identical_bytes_uses_overlap() {
    let packed = roundtrip(&[0xAA; 10]);
    assert_eq!(packed, [0x01, 0xAA, 0x86, 0xFF, 0x01, 0xAA, 0x00]);
}

#[test]
fn literal_runs_never_exceed_127() {
    let input: Vec<u8> = (0..200u8).collect();
    let packed = roundtrip(&input);
    let runs: Vec<usize> = Tokens::new(&packed)
        .map(|t| match t.unwrap() {
            Token::Literal(bytes) => bytes.len(),
            Token::BackRef { .. } => panic!("unexpected back-reference"),
        })
        .collect();
    assert_eq!(runs, vec![127, 73]);

    let noise = generate_data(5000, 42);
    let packed = roundtrip(&noise);
    for token in Tokens::new(&packed) {
        if let Token::Literal(bytes) = token.unwrap() {
            assert!((1..=127).contains(&bytes.len()));
        }
    }
}

#[test]
fn copies_stay_inside_window() {
    let data: Vec<u8> = (0..20_000u32).map(|i| ((i * i) >> 5) as u8).collect();
    let packed = roundtrip(&data);
    let mut position = 0usize;
    for token in Tokens::new(&packed) {
        let token = token.unwrap();
        if let Token::BackRef { len, distance } = token {
            assert!((1..=256).contains(&distance));
            assert!(distance <= position);
            assert!((2..=129).contains(&len));
        }
        position += token.output_len();
    }
    assert_eq!(position, data.len());
}

#[test]
fn copy_offset_at_position_300() {
    let prefix = generate_data(300, 5);
    let mut stream = Vec::new();
    for chunk in prefix.chunks(100) {
        stream.push(chunk.len() as u8);
        stream.extend_from_slice(chunk);
    }
    // dst = 300, distance byte 0xFF -> off = 300 - 256 + 255 = 299
    stream.extend([0x81, 0xFF, 0x00]);

    let out = codec::decode(&stream).unwrap();
    assert_eq!(&out[..300], &prefix[..]);
    assert_eq!(&out[300..], &[prefix[299]; 3]);
}

#[test]
fn distance_byte_zero_reaches_256_back() {
    let prefix = generate_data(256, 11);
    let mut stream = vec![0x7F];
    stream.extend_from_slice(&prefix[..127]);
    stream.push(0x7F);
    stream.extend_from_slice(&prefix[127..254]);
    stream.push(0x02);
    stream.extend_from_slice(&prefix[254..]);
    stream.extend([0x80, 0x00, 0x00]);

    let out = codec::decode(&stream).unwrap();
    assert_eq!(&out[256..], &prefix[..2]);
}

#[test]
fn repeated_encoding_is_not_required_to_shrink() {
    let once = roundtrip(TEXT.as_bytes());
    let twice = roundtrip(&once);
    assert_eq!(codec::decode(&codec::decode(&twice).unwrap()).unwrap(), TEXT.as_bytes());
}

#[test]
fn large_structured_input_compresses() {
    // Four-colour bitmap rows with long horizontal spans.
    let data: Vec<u8> = (0..64 * 1024u32)
        .map(|i| [0x00, 0x55, 0xAA, 0xFF][((i / 40) % 4) as usize])
        .collect();
    let packed = roundtrip(&data);
    assert!(packed.len() * 10 < data.len());
}

// ---------------------------------------------------------------------------
// Malformed streams
// ---------------------------------------------------------------------------

#[test]
fn truncated_streams_are_rejected() {
    for cut in 0..TEXT_PACKED.len() - 1 {
        let err = codec::decode(&TEXT_PACKED[..cut]).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::MissingTerminator { .. } | DecodeError::Truncated { .. }
            ),
            "cut at {cut}: {err}"
        );
    }
}

#[test]
fn backref_before_start_is_rejected() {
    let err = codec::decode(&[0x81, 0xF0, 0x00]).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidBackReference {
            offset: 0,
            position: 0,
            distance: 16
        }
    );
}

#[test]
fn output_limit_is_enforced() {
    let packed = codec::encode(&[7u8; 1000]);
    assert_eq!(codec::decode_with_limit(&packed, 1000).unwrap().len(), 1000);
    assert!(matches!(
        codec::decode_with_limit(&packed, 999),
        Err(DecodeError::OutputLimit { limit: 999 })
    ));
}

#[test]
fn errors_render_messages() {
    let err = codec::decode(&[0x03, 1]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "truncated token at offset 0: needs 4 bytes, 2 available"
    );
    let err = codec::decode(&[]).unwrap_err();
    assert_eq!(err.to_string(), "stream ends at offset 0 without a terminator");
}
