// Byte-oriented LZ codec for 8-bit asset compression.
//
// The compressed stream is a sequence of tokens closed by a single 0x00
// byte. The high bit of each header byte selects the token kind:
//
// - `token`    : Token grammar and the streaming token reader
// - `matching` : Longest backward match within the 256-byte window
// - `encoder`  : Greedy encoder with deferred literal-run headers
// - `decoder`  : Linear interpreter, including overlapping copies

pub mod decoder;
pub mod encoder;
pub mod matching;
pub mod token;

pub use decoder::{DecodeError, decode, decode_with_limit};
pub use encoder::{Encoder, encode};
pub use matching::{Match, find_best_match};
pub use token::{Token, Tokens};

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

/// Number of bytes a back-reference can reach behind the write cursor.
pub const WINDOW_SIZE: usize = 256;

/// Longest literal run a single header byte can describe.
pub const MAX_LITERAL_RUN: usize = 127;

/// Shortest back-reference (header bits 6..0 == 0).
pub const MIN_MATCH_LEN: usize = 2;

/// Longest back-reference (header bits 6..0 == 127).
pub const MAX_MATCH_LEN: usize = MAX_LITERAL_RUN + MIN_MATCH_LEN;

/// End-of-stream marker. Never used as a token header.
pub const TERMINATOR: u8 = 0x00;

/// Header bit marking a back-reference token.
pub const BACKREF_FLAG: u8 = 0x80;

/// Mask for the length bits of a header byte.
pub const LEN_MASK: u8 = 0x7F;
