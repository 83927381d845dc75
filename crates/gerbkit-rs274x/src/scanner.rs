//! Token scanners over a [`LineCursor`]
//!
//! Each scanner reads one token at the cursor and leaves the cursor just
//! past it. Numeric fields in RS-274X are comma separated, so the number
//! scanners also eat a single trailing comma. Numbers follow C
//! `strtol`/`strtod` rules: leading blanks are skipped, and when no digits
//! are found the result is zero and the cursor does not move.

use crate::cursor::LineCursor;
use crate::error::Rs274xResult;

/// Read the two characters of a command code.
///
/// Returns `None` if the line ends before both characters are read. The
/// cursor must already sit on the first character.
pub fn read_command_code(cursor: &mut LineCursor) -> Option<[u8; 2]> {
    let first = cursor.peek()?;
    let second = cursor.peek_at(1)?;
    cursor.advance_by(2);
    Some([first, second])
}

/// Read a signed decimal integer, then skip one `,` if present
pub fn read_int(cursor: &mut LineCursor) -> i64 {
    let (value, len) = scan_int(cursor.remaining());
    cursor.advance_by(len);
    skip_comma(cursor);
    value
}

/// Read a floating-point number, then skip one `,` if present
pub fn read_double(cursor: &mut LineCursor) -> f64 {
    let (value, len) = scan_double(cursor.remaining());
    cursor.advance_by(len);
    skip_comma(cursor);
    value
}

/// Advance to the next `*` or `%` without consuming it.
///
/// Pulls further lines from the stream as needed. Returns `Ok(false)` if
/// the stream ends before a terminator turns up.
pub fn skip_to_block_end(cursor: &mut LineCursor) -> Rs274xResult<bool> {
    loop {
        while let Some(b) = cursor.peek() {
            if b == b'*' || b == b'%' {
                return Ok(true);
            }
            cursor.advance();
        }
        if !cursor.refill()? {
            return Ok(false);
        }
    }
}

fn skip_comma(cursor: &mut LineCursor) {
    if cursor.peek() == Some(b',') {
        cursor.advance();
    }
}

fn skip_blanks(text: &[u8]) -> usize {
    text.iter()
        .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count()
}

fn count_digits(text: &[u8]) -> usize {
    text.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Returns the value and the number of bytes consumed (0 if no digits)
fn scan_int(text: &[u8]) -> (i64, usize) {
    let mut i = skip_blanks(text);
    let negative = match text.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };
    let digits = count_digits(&text[i..]);
    if digits == 0 {
        return (0, 0);
    }
    let magnitude = text[i..i + digits].iter().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    let value = if negative { -magnitude } else { magnitude };
    (value, i + digits)
}

/// Returns the value and the number of bytes consumed (0 if no digits)
fn scan_double(text: &[u8]) -> (f64, usize) {
    let start = skip_blanks(text);
    let mut i = start;
    if matches!(text.get(i), Some(b'-' | b'+')) {
        i += 1;
    }
    let int_digits = count_digits(&text[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if text.get(i) == Some(&b'.') {
        frac_digits = count_digits(&text[i + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return (0.0, 0);
    }
    // the exponent only counts if at least one digit follows it
    if matches!(text.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(text.get(j), Some(b'-' | b'+')) {
            j += 1;
        }
        let exp_digits = count_digits(&text[j.min(text.len())..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    let value = std::str::from_utf8(&text[start..i])
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    (value, i)
}
