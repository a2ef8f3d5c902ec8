//! PEG operators over a [`Cursor`].
//!
//! Patterns are plain functions or closures taking the cursor and reporting
//! whether they matched. Each operator that can fail part way through takes a
//! checkpoint first and restores it, so callers can compose them freely.

use super::cursor::Cursor;

/// A grammar rule or any other matcher usable as an alternative.
pub type Pattern = fn(&mut Cursor) -> bool;

/// Ordered choice: the first alternative that matches wins. Every alternative
/// starts from the same checkpoint.
pub fn choice(cursor: &mut Cursor, alternatives: &[Pattern]) -> bool {
    let checkpoint = cursor.checkpoint();
    for alternative in alternatives {
        if alternative(cursor) {
            return true;
        }
        cursor.restore(checkpoint);
    }
    false
}

/// Sequence: every step must match in order.
pub fn seq(cursor: &mut Cursor, steps: &[Pattern]) -> bool {
    attempt(cursor, |c| steps.iter().all(|step| step(c)))
}

/// Runs `body` and rewinds the cursor if it fails.
pub fn attempt(cursor: &mut Cursor, body: impl FnOnce(&mut Cursor) -> bool) -> bool {
    let checkpoint = cursor.checkpoint();
    if body(cursor) {
        true
    } else {
        cursor.restore(checkpoint);
        false
    }
}

/// Greedy `*`. Stops at the first failing repetition, or at one that matched
/// without consuming anything.
pub fn many0(cursor: &mut Cursor, pattern: impl Fn(&mut Cursor) -> bool) -> bool {
    loop {
        let checkpoint = cursor.checkpoint();
        if !pattern(cursor) {
            cursor.restore(checkpoint);
            break;
        }
        if cursor.position() == checkpoint.position {
            break;
        }
    }
    true
}

/// Greedy `+`.
pub fn many1(cursor: &mut Cursor, pattern: impl Fn(&mut Cursor) -> bool) -> bool {
    attempt(cursor, |c| pattern(c)) && many0(cursor, pattern)
}

/// `?`: matches nothing when the inner pattern fails.
pub fn optional(cursor: &mut Cursor, pattern: impl FnOnce(&mut Cursor) -> bool) -> bool {
    attempt(cursor, pattern);
    true
}

/// `&`: positive lookahead. Never consumes and never records.
pub fn peek(cursor: &mut Cursor, pattern: impl FnOnce(&mut Cursor) -> bool) -> bool {
    let checkpoint = cursor.checkpoint();
    let matched = pattern(cursor);
    cursor.restore(checkpoint);
    matched
}

/// `!`: negative lookahead.
pub fn not(cursor: &mut Cursor, pattern: impl FnOnce(&mut Cursor) -> bool) -> bool {
    !peek(cursor, pattern)
}
