// Greedy single-pass encoder.
//
// At each position the window is searched for a back-reference. A match is
// taken when it is at least 2 bytes long, or 3 bytes while a literal run is
// open (closing the run costs a header byte). Otherwise the byte is added
// to the open literal run, whose header byte is reserved when the run opens
// and patched with the final length when it closes.

use super::matching::{Match, find_best_match};
use super::{BACKREF_FLAG, MAX_LITERAL_RUN, MIN_MATCH_LEN, TERMINATOR};

// ---------------------------------------------------------------------------
// Literal run bookkeeping
// ---------------------------------------------------------------------------

/// An open literal run: the reserved header slot and the bytes queued so far.
#[derive(Debug, Clone, Copy)]
struct LiteralRun {
    header_pos: usize,
    len: usize,
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encoder state for a single input buffer.
///
/// # Example
/// ```
/// use retrolz::codec::Encoder;
/// let compressed = Encoder::new(b"abcabcabcabc").finish();
/// assert_eq!(compressed.last(), Some(&0x00));
/// ```
#[derive(Debug)]
pub struct Encoder<'a> {
    input: &'a [u8],
    output: Vec<u8>,
    run: Option<LiteralRun>,
    dst: usize,
    literals: usize,
    backrefs: usize,
}

impl<'a> Encoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            // Incompressible input grows by one header per 127 bytes.
            output: Vec::with_capacity(input.len() + input.len() / MAX_LITERAL_RUN + 2),
            run: None,
            dst: 0,
            literals: 0,
            backrefs: 0,
        }
    }

    /// Encode the next token's worth of input. Returns `false` once the
    /// input is exhausted.
    pub fn step(&mut self) -> bool {
        if self.dst >= self.input.len() {
            return false;
        }

        let threshold = MIN_MATCH_LEN + usize::from(self.run.is_some());
        match find_best_match(self.input, self.dst) {
            Some(m) if m.len >= threshold => self.emit_backref(m),
            _ => self.emit_literal(),
        }
        true
    }

    /// Encode the remaining input and return the terminated stream.
    pub fn finish(mut self) -> Vec<u8> {
        while self.step() {}
        self.flush_literals();
        self.output.push(TERMINATOR);
        self.output
    }

    /// Input bytes consumed so far.
    pub fn position(&self) -> usize {
        self.dst
    }

    /// Literal-run tokens closed so far.
    pub fn literal_runs(&self) -> usize {
        self.literals
    }

    /// Back-reference tokens emitted so far.
    pub fn backrefs(&self) -> usize {
        self.backrefs
    }

    /// Close the open literal run, if any, writing its header byte. The
    /// next literal opens a new run.
    pub fn flush_literals(&mut self) {
        if let Some(run) = self.run.take() {
            debug_assert!((1..=MAX_LITERAL_RUN).contains(&run.len));
            self.output[run.header_pos] = run.len as u8;
            self.literals += 1;
        }
    }

    fn emit_backref(&mut self, m: Match) {
        self.flush_literals();
        self.output.push((m.len - MIN_MATCH_LEN) as u8 | BACKREF_FLAG);
        self.output.push(m.distance_byte(self.dst));
        self.dst += m.len;
        self.backrefs += 1;
    }

    fn emit_literal(&mut self) {
        if self.run.is_some_and(|run| run.len == MAX_LITERAL_RUN) {
            self.flush_literals();
        }
        let run = self.run.get_or_insert_with(|| {
            let header_pos = self.output.len();
            self.output.push(TERMINATOR);
            LiteralRun { header_pos, len: 0 }
        });
        run.len += 1;
        self.output.push(self.input[self.dst]);
        self.dst += 1;
    }
}

/// Compress `input` into a terminated token stream.
pub fn encode(input: &[u8]) -> Vec<u8> {
    Encoder::new(input).finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decoder::decode;

    #[test]
    fn empty_input_is_just_a_terminator() {
        assert_eq!(encode(&[]), vec![0x00]);
    }

    #[test]
    fn single_byte() {
        assert_eq!(encode(&[0x42]), vec![0x01, 0x42, 0x00]);
    }

    #[test]
    fn repeated_byte_uses_overlapping_backref() {
        let out = encode(&[b'a'; 10]);
        assert_eq!(out, vec![0x01, b'a', 0x86, 0xFF, 0x01, b'a', 0x00]);
        assert_eq!(decode(&out).unwrap(), vec![b'a'; 10]);
    }

    #[test]
    fn literal_runs_cap_at_127() {
        let input: Vec<u8> = (0..200u8).collect();
        let out = encode(&input);
        assert_eq!(out[0], 127);
        assert_eq!(&out[1..128], &input[..127]);
        assert_eq!(out[128], 73);
        assert_eq!(&out[129..202], &input[127..]);
        assert_eq!(out[202], 0x00);
        assert_eq!(out.len(), 203);
    }

    #[test]
    fn short_match_rejected_while_run_open() {
        // "abc" repeats but only 2 bytes are credited and a run is open.
        let out = encode(b"abcXabcY");
        assert_eq!(out, [&[0x08u8][..], &b"abcXabcY"[..], &[0x00u8][..]].concat());
    }

    #[test]
    fn two_byte_match_taken_after_backref() {
        // At 12 the run is already closed, so "dW" from position 0 is taken.
        let out = encode(b"dWXkabcdeabcdWXm");
        let mut expected = vec![0x09];
        expected.extend_from_slice(b"dWXkabcde");
        expected.extend([0x81, 0xFB, 0x80, 0xF4, 0x02, b'X', b'm', 0x00]);
        assert_eq!(out, expected);
        assert_eq!(decode(&out).unwrap(), b"dWXkabcdeabcdWXm");
    }

    #[test]
    fn header_is_patched_after_backref() {
        let out = encode(b"xyxyxyxy");
        // 'x','y' literal, then a 5-byte overlapping copy, then 'y'.
        assert_eq!(out, vec![0x02, b'x', b'y', 0x83, 0xFE, 0x01, b'y', 0x00]);
    }

    #[test]
    fn counters_track_tokens() {
        let mut enc = Encoder::new(&[b'a'; 10]);
        assert!(enc.step());
        assert_eq!(enc.position(), 1);
        assert_eq!(enc.literal_runs(), 0);
        assert!(enc.step());
        assert_eq!(enc.position(), 9);
        assert_eq!(enc.literal_runs(), 1);
        assert_eq!(enc.backrefs(), 1);
        assert!(enc.step());
        assert!(!enc.step());
        let out = enc.finish();
        assert_eq!(out.len(), 7);
    }
}
