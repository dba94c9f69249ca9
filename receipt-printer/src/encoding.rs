//! Shift_JIS encoding utilities for Japanese thermal printers
//!
//! Japanese ESC/POS models (EPSON TM series and clones) print kanji in
//! Shift_JIS once kanji mode is enabled. This module provides utilities for:
//! - Calculating printed column widths (full-width = 2, ASCII/half-width kana = 1)
//! - Truncating/padding strings to a column width
//! - Converting UTF-8 to Shift_JIS while preserving ESC/POS commands

use tracing::instrument;

/// FS & - enter kanji mode, FS C 1 - Shift_JIS code system
const KANJI_ON: [u8; 5] = [0x1C, 0x26, 0x1C, 0x43, 0x01];
/// ESC R 8 - Japan international set (0x5C prints as ¥), ESC t 1 - katakana table
const JAPAN_TABLES: [u8; 6] = [0x1B, 0x52, 0x08, 0x1B, 0x74, 0x01];
/// FS . - leave kanji mode
const KANJI_OFF: [u8; 2] = [0x1C, 0x2E];

fn encoded_len(s: &str) -> usize {
    let (cow, _, _) = encoding_rs::SHIFT_JIS.encode(s);
    cow.len()
}

/// Get the printed width of a string in columns
///
/// Shift_JIS double-byte characters occupy two columns, single bytes one.
pub fn sjis_width(s: &str) -> usize {
    encoded_len(s)
}

/// Truncate a string to fit within a column width
pub fn truncate_sjis(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut result = String::new();
    let mut tmp = [0u8; 4];
    for c in s.chars() {
        let char_len = encoded_len(c.encode_utf8(&mut tmp));
        if width + char_len > max_width {
            break;
        }
        result.push(c);
        width += char_len;
    }
    result
}

/// Pad a string to a specific column width
///
/// If the string is longer than the width, it will be truncated.
pub fn pad_sjis(s: &str, width: usize, align_right: bool) -> String {
    let current_width = sjis_width(s);
    if current_width >= width {
        return truncate_sjis(s, width);
    }
    let spaces = width - current_width;
    if align_right {
        format!("{}{}", " ".repeat(spaces), s)
    } else {
        format!("{}{}", s, " ".repeat(spaces))
    }
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to Shift_JIS
///
/// ASCII bytes (0x00-0x7F) pass through untouched so ESC/POS commands are
/// never re-encoded, and `GS v 0` raster blocks are copied verbatim. Runs of
/// other bytes >= 0x80 are decoded as UTF-8 and re-encoded as Shift_JIS.
///
/// Kanji mode and the Japanese tables are enabled at the start and again
/// after every INIT command (ESC @), which resets them.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn convert_to_sjis(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len() + 16);
    result.extend_from_slice(&KANJI_ON);
    result.extend_from_slice(&JAPAN_TABLES);

    let mut buffer = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == 0x1B && i + 1 < bytes.len() && bytes[i + 1] == 0x40 {
            flush_buffer(&mut buffer, &mut result);
            result.extend_from_slice(&[0x1B, 0x40]);
            result.extend_from_slice(&KANJI_ON);
            result.extend_from_slice(&JAPAN_TABLES);
            i += 2;
            continue;
        }

        if let Some(len) = raster_len(&bytes[i..]) {
            flush_buffer(&mut buffer, &mut result);
            let end = (i + len).min(bytes.len());
            result.extend_from_slice(&bytes[i..end]);
            i = end;
            continue;
        }

        if b < 0x80 {
            flush_buffer(&mut buffer, &mut result);
            result.push(b);
        } else {
            buffer.push(b);
        }
        i += 1;
    }

    flush_buffer(&mut buffer, &mut result);
    result.extend_from_slice(&KANJI_OFF);

    result
}

/// Length of a `GS v 0 m xL xH yL yH d...` block starting at `bytes[0]`
fn raster_len(bytes: &[u8]) -> Option<usize> {
    match bytes {
        [0x1D, 0x76, 0x30, _, xl, xh, yl, yh, ..] => {
            let x = u16::from_le_bytes([*xl, *xh]) as usize;
            let y = u16::from_le_bytes([*yl, *yh]) as usize;
            Some(8 + x * y)
        }
        _ => None,
    }
}

/// Flush the non-ASCII buffer, converting UTF-8 to Shift_JIS
fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }

    let s = String::from_utf8_lossy(buffer);
    let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode(&s);
    result.extend_from_slice(&sjis);
    buffer.clear();
}
