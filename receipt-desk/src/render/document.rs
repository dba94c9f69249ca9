//! Receipt document for the host print system
//!
//! Two renditions of the same view: a self-contained HTML page laid out for
//! 57mm roll paper with zero margins, and a plain-text page for spoolers that
//! only take text.

use super::ReceiptView;
use crate::model::LogoImage;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write;

/// Logo used when the payload carries none
const DEFAULT_LOGO_PNG: &[u8] = include_bytes!("../../assets/default-logo.png");

/// A rendered, printable document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    pub html: String,
    /// Same receipt as monospaced lines, logo omitted
    pub text: String,
    pub page_width_mm: u32,
    /// Characters per line of `text`
    pub columns: usize,
}

pub struct DocumentRenderer {
    page_width_mm: u32,
    columns: usize,
}

impl DocumentRenderer {
    pub fn new(page_width_mm: u32, columns: usize) -> Self {
        Self {
            page_width_mm,
            columns,
        }
    }

    pub fn render(&self, view: &ReceiptView, logo: Option<&LogoImage>) -> ReceiptDocument {
        let logo_src = match logo {
            Some(image) => image.to_data_url(),
            None => format!("data:image/png;base64,{}", STANDARD.encode(DEFAULT_LOGO_PNG)),
        };

        let mut items = String::new();
        for item in &view.items {
            // write! into a String cannot fail
            let _ = write!(
                items,
                "\n    <div class=\"item\"><span>{}</span><span>{}</span></div>",
                escape_html(&item.name),
                escape_html(&item.price)
            );
        }

        let page = self.page_width_mm;
        let body_width = page.saturating_sub(4);

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
  @page {{ size: {page}mm auto; margin: 0; }}
  body {{ font-family: 'Courier New', monospace; font-size: 12px; line-height: 1.2; margin: 0; padding: 2mm; width: {body_width}mm; box-sizing: border-box; }}
  .center {{ text-align: center; }}
  .right {{ text-align: right; }}
  .bold {{ font-weight: bold; }}
  .large {{ font-size: 16px; }}
  .separator {{ border-top: 1px dashed #000; margin: 3px 0; }}
  .item {{ display: flex; justify-content: space-between; margin: 1px 0; }}
  .total {{ font-size: 14px; margin-top: 5px; }}
  .logo {{ width: 40mm; height: auto; margin: 2mm 0; }}
</style>
</head>
<body>
  <div class="center"><img src="{logo_src}" class="logo" alt="logo"/></div>
  <div class="center bold large">{title}</div>
  <div class="separator"></div>{items}
  <div class="separator"></div>
  <div class="right bold total">{total}</div>
  <br>
  <div class="center">{footer}</div>
  <br>
  <div class="center">{printed_at}</div>
</body>
</html>
"#,
            title = escape_html(&view.title),
            total = escape_html(&view.total_line),
            footer = escape_html(view.footer),
            printed_at = escape_html(&view.printed_at),
        );

        let mut text = view.preview(self.columns).join("\n");
        text.push('\n');

        ReceiptDocument {
            html,
            text,
            page_width_mm: self.page_width_mm,
            columns: self.columns,
        }
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(57, 32)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReceiptItem, ReceiptPayload};
    use crate::render::tests::{cafe_payload, fixed_time};
    use rust_decimal::Decimal;

    #[test]
    fn test_document_structure() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let doc = DocumentRenderer::default().render(&view, None);

        assert_eq!(doc.page_width_mm, 57);
        assert!(doc.html.contains("@page { size: 57mm auto; margin: 0; }"));
        assert!(doc.html.contains("<span>コーヒー</span><span>¥300</span>"));
        assert!(doc.html.contains("合計: ¥750"));
        assert!(doc.html.contains("ありがとうございました"));
        let title = doc.html.find("レシート").unwrap();
        let item = doc.html.find("サンドイッチ").unwrap();
        let total = doc.html.find("合計").unwrap();
        assert!(title < item && item < total);
    }

    #[test]
    fn test_text_rendition() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let doc = DocumentRenderer::new(57, 24).render(&view, None);

        assert_eq!(doc.columns, 24);
        assert_eq!(doc.text, format!("{}\n", view.preview(24).join("\n")));
        assert!(doc.text.contains("合計: ¥750"));
        assert!(!doc.text.contains('<'));
    }

    #[test]
    fn test_default_logo_embedded() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let doc = DocumentRenderer::default().render(&view, None);
        assert!(doc.html.contains("src=\"data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_uploaded_logo_embedded() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let logo = LogoImage::new(DEFAULT_LOGO_PNG.to_vec());
        let doc = DocumentRenderer::default().render(&view, Some(&logo));
        assert!(doc.html.contains(&logo.to_data_url()));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let payload = ReceiptPayload {
            title: "<script>alert(1)</script>".to_string(),
            items: vec![ReceiptItem {
                name: "Tom & Jerry".to_string(),
                price: Decimal::from(1),
            }],
            ..Default::default()
        };
        let view = ReceiptView::new(&payload, fixed_time());
        let doc = DocumentRenderer::default().render(&view, None);
        assert!(!doc.html.contains("<script>"));
        assert!(doc.html.contains("&lt;script&gt;"));
        assert!(doc.html.contains("Tom &amp; Jerry"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let renderer = DocumentRenderer::default();
        assert_eq!(renderer.render(&view, None), renderer.render(&view, None));
    }
}
