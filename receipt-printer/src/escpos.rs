//! ESC/POS command builder
//!
//! Jobs are assembled in memory and handed to a transport in one piece.

use crate::encoding::convert_to_sjis;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Horizontal justification (`ESC a n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left = 0,
    Center = 1,
    Right = 2,
}

/// ESC/POS job builder
///
/// Text stays UTF-8 until [`build`](Self::build) converts the whole job to
/// Shift_JIS, so widths and previews can be computed on plain strings.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// New job for a paper width in characters (32 for 58mm, 48 for 80mm)
    ///
    /// Every job starts with `ESC @`, which clears whatever an earlier job
    /// left in the printer's buffer and modes.
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&[ESC, b'@']);
        Self { buf, width }
    }

    fn cmd(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        self.cmd(s.as_bytes())
    }

    /// Text plus line feed
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s).newline()
    }

    pub fn newline(&mut self) -> &mut Self {
        self.cmd(b"\n")
    }

    pub fn align(&mut self, align: Align) -> &mut Self {
        self.cmd(&[ESC, b'a', align as u8])
    }

    /// `ESC E n`
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.cmd(&[ESC, b'E', on as u8])
    }

    /// Character magnification, 1-8 in each direction (`GS ! n`)
    pub fn text_size(&mut self, width: u8, height: u8) -> &mut Self {
        let w = width.clamp(1, 8) - 1;
        let h = height.clamp(1, 8) - 1;
        self.cmd(&[GS, b'!', (w << 4) | h])
    }

    /// Full-width rule of `ch`
    pub fn rule(&mut self, ch: char) -> &mut Self {
        let rule: String = std::iter::repeat_n(ch, self.width).collect();
        self.line(&rule)
    }

    /// Pre-rendered raster block, see `process_logo`
    pub fn image(&mut self, raster: &[u8]) -> &mut Self {
        self.cmd(raster)
    }

    /// Full cut (`GS V 0`)
    pub fn cut(&mut self) -> &mut Self {
        self.cmd(&[GS, b'V', 0x00])
    }

    /// Finished job, text in Shift_JIS with kanji mode on
    pub fn build(self) -> Vec<u8> {
        convert_to_sjis(&self.buf)
    }

    /// Finished job with text left in UTF-8
    pub fn build_raw(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(32)
    }
}
