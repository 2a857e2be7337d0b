// Token grammar of the compressed stream.
//
//   literal run:     0LLLLLLL  <L raw bytes>          (L = 1..=127)
//   back-reference:  1NNNNNNN  <distance byte>        (len = N + 2)
//   terminator:      00000000
//
// `Tokens` walks a stream header by header without decoding it, so the
// same parser serves the decoder and the token listing in the CLI.

use super::decoder::DecodeError;
use super::{BACKREF_FLAG, LEN_MASK, MIN_MATCH_LEN, TERMINATOR, WINDOW_SIZE};

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// One encoded unit of the compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw bytes copied straight to the output.
    Literal(&'a [u8]),
    /// Copy `len` bytes starting `distance` bytes behind the write cursor.
    BackRef {
        /// Copy length, `2..=129`.
        len: usize,
        /// Backward distance, `1..=256`.
        distance: usize,
    },
}

impl Token<'_> {
    /// Number of bytes this token produces when decoded.
    pub fn output_len(&self) -> usize {
        match self {
            Token::Literal(bytes) => bytes.len(),
            Token::BackRef { len, .. } => *len,
        }
    }

    /// Number of bytes this token occupies in the compressed stream.
    pub fn encoded_len(&self) -> usize {
        match self {
            Token::Literal(bytes) => 1 + bytes.len(),
            Token::BackRef { .. } => 2,
        }
    }
}

/// Backward distance encoded by a distance byte: `256 - byte`.
#[inline]
pub fn distance_from_byte(byte: u8) -> usize {
    WINDOW_SIZE - byte as usize
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Iterator over the tokens of a compressed stream.
///
/// Yields `Ok(token)` until the terminator is reached, then `None`. A
/// malformed stream yields a single `Err` and then stops.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    input: &'a [u8],
    pos: usize,
    done: bool,
    terminated: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            done: false,
            terminated: false,
        }
    }

    /// Offset of the next header byte in the input.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// True once the terminator has been consumed.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Bytes following the terminator (empty until it has been reached).
    pub fn trailing(&self) -> &'a [u8] {
        if self.terminated {
            &self.input[self.pos..]
        } else {
            &[]
        }
    }

    fn read_token(&mut self) -> Result<Option<Token<'a>>, DecodeError> {
        let offset = self.pos;
        let header = *self
            .input
            .get(offset)
            .ok_or(DecodeError::MissingTerminator { offset })?;

        if header == TERMINATOR {
            self.pos += 1;
            self.terminated = true;
            return Ok(None);
        }

        let len = (header & LEN_MASK) as usize;
        if header & BACKREF_FLAG != 0 {
            let byte = *self.input.get(offset + 1).ok_or(DecodeError::Truncated {
                offset,
                needed: 2,
                available: self.input.len() - offset,
            })?;
            self.pos += 2;
            Ok(Some(Token::BackRef {
                len: len + MIN_MATCH_LEN,
                distance: distance_from_byte(byte),
            }))
        } else {
            let start = offset + 1;
            let payload = self
                .input
                .get(start..start + len)
                .ok_or(DecodeError::Truncated {
                    offset,
                    needed: 1 + len,
                    available: self.input.len() - offset,
                })?;
            self.pos = start + len;
            Ok(Some(Token::Literal(payload)))
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
