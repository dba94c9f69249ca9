//! Receipt renderer for ESC/POS thermal printers

use super::ReceiptView;
use receipt_printer::{Align, EscPosBuilder};

/// Thermal receipt renderer
///
/// Layout: logo, title, rule, items (name line + right-aligned price line),
/// rule, total, thank-you footer, print time, cut.
pub struct ThermalReceiptRenderer {
    width: usize,
}

impl ThermalReceiptRenderer {
    /// Create a renderer for a paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Render to Shift_JIS ESC/POS bytes, ready for the transport
    pub fn render(&self, view: &ReceiptView, logo: Option<&[u8]>) -> Vec<u8> {
        self.compose(view, logo).build()
    }

    /// Same job with text left in UTF-8
    pub fn render_utf8(&self, view: &ReceiptView, logo: Option<&[u8]>) -> Vec<u8> {
        self.compose(view, logo).build_raw()
    }

    fn compose(&self, view: &ReceiptView, logo: Option<&[u8]>) -> EscPosBuilder {
        let mut b = EscPosBuilder::new(self.width);

        if let Some(raster) = logo {
            b.image(raster);
            b.newline();
        }

        self.render_header(&mut b, view);
        self.render_items(&mut b, view);
        self.render_total(&mut b, view);
        self.render_footer(&mut b, view);

        b
    }

    fn render_header(&self, b: &mut EscPosBuilder, view: &ReceiptView) {
        b.align(Align::Center).text_size(2, 2).bold(true);
        b.line(&view.title);
        b.bold(false).text_size(1, 1);
        b.rule('=');
    }

    fn render_items(&self, b: &mut EscPosBuilder, view: &ReceiptView) {
        for item in &view.items {
            b.align(Align::Left).line(&item.name);
            b.align(Align::Right).line(&item.price);
        }
        b.align(Align::Left).rule('=');
    }

    fn render_total(&self, b: &mut EscPosBuilder, view: &ReceiptView) {
        b.align(Align::Right).bold(true).text_size(1, 2);
        b.line(&view.total_line);
        b.bold(false).text_size(1, 1);
    }

    fn render_footer(&self, b: &mut EscPosBuilder, view: &ReceiptView) {
        b.align(Align::Center).newline();
        b.line(view.footer).newline();
        b.line(&view.printed_at);
        b.newline().newline().cut();
    }
}

impl Default for ThermalReceiptRenderer {
    fn default() -> Self {
        Self::new(32)
    }
}
