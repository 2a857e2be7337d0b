// Token stream decoder.
//
// Walks the stream once, appending literal payloads and expanding
// back-references from the bytes already written. Copies run one byte at
// a time in increasing order: a source range that overlaps the bytes
// being produced repeats them, which is how runs are encoded.

use super::token::{Token, Tokens};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed compressed stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated token at offset {offset}: needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("stream ends at offset {offset} without a terminator")]
    MissingTerminator { offset: usize },

    #[error(
        "back-reference at offset {offset} reaches {distance} bytes behind output position {position}"
    )]
    InvalidBackReference {
        offset: usize,
        position: usize,
        distance: usize,
    },

    #[error("decoded output exceeds limit of {limit} bytes")]
    OutputLimit { limit: usize },
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a complete compressed stream.
///
/// Bytes after the terminator are ignored.
pub fn decode(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_with_limit(input, usize::MAX)
}

/// Decode a complete compressed stream, failing once the output would grow
/// beyond `limit` bytes.
pub fn decode_with_limit(input: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut output = Vec::with_capacity(input.len().saturating_mul(2).min(limit));
    decode_into(input, &mut output, limit)?;
    Ok(output)
}

/// Decode `input`, appending to `output`.
///
/// Back-references may only address bytes appended by this call. On error
/// `output` holds whatever was decoded before the bad token.
pub fn decode_into(input: &[u8], output: &mut Vec<u8>, limit: usize) -> Result<(), DecodeError> {
    let base = output.len();
    let mut tokens = Tokens::new(input);

    loop {
        let offset = tokens.offset();
        let token = match tokens.next() {
            Some(token) => token?,
            None => break,
        };

        let produced = output.len() - base;
        if produced + token.output_len() > limit {
            return Err(DecodeError::OutputLimit { limit });
        }

        match token {
            Token::Literal(bytes) => output.extend_from_slice(bytes),
            Token::BackRef { len, distance } => {
                if distance > produced {
                    return Err(DecodeError::InvalidBackReference {
                        offset,
                        position: produced,
                        distance,
                    });
                }
                let mut from = output.len() - distance;
                for _ in 0..len {
                    let byte = output[from];
                    output.push(byte);
                    from += 1;
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
