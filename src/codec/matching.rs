// Back-reference search.
//
// Exhaustive scan of the 256-byte window behind the cursor, oldest
// position first. Only a strictly longer candidate replaces the current
// best, so equal-length matches resolve to the most distant source.

use super::{MAX_MATCH_LEN, WINDOW_SIZE};

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// A back-reference candidate found in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Absolute position in the input where the copy starts.
    pub src: usize,
    /// Number of bytes the copy covers.
    pub len: usize,
}

impl Match {
    /// Distance byte for a copy landing at `dst`: `(src - dst + 256) mod 256`.
    pub fn distance_byte(&self, dst: usize) -> u8 {
        (self.src + WINDOW_SIZE - dst) as u8
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Find the best back-reference for position `dst` of `history`.
///
/// Each window position is credited with one byte less than its common
/// prefix with `history[dst..]`, and the prefix is capped at
/// `min(remaining, MAX_MATCH_LEN)` bytes. This reproduces the reference
/// encoder's output byte-for-byte.
///
/// Returns `None` when no candidate is credited with at least one byte.
pub fn find_best_match(history: &[u8], dst: usize) -> Option<Match> {
    if dst >= history.len() {
        return None;
    }

    let limit = (history.len() - dst).min(MAX_MATCH_LEN);
    let ahead = &history[dst..dst + limit];
    let mut best = Match { src: 0, len: 0 };

    for src in dst.saturating_sub(WINDOW_SIZE)..dst {
        let common = common_prefix(&history[src..], ahead);
        let credited = common.saturating_sub(1);
        if credited > best.len {
            best = Match { src, len: credited };
            if credited == limit - 1 {
                // Nothing later in the window can beat a full-length match.
                break;
            }
        }
    }

    (best.len > 0).then_some(best)
}

#[inline]
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
