//! Receipt rendering
//!
//! A [`ReceiptView`] holds every printed string of a receipt, computed once
//! from the payload and the print time. The thermal job, the host document and
//! the plain-text preview are all pure functions of a view.

mod document;
mod thermal;

pub use document::{DocumentRenderer, ReceiptDocument};
pub use thermal::ThermalReceiptRenderer;

use crate::model::ReceiptPayload;
use chrono::DateTime;
use chrono_tz::Tz;
use receipt_printer::{pad_sjis, sjis_width};
use rust_decimal::Decimal;

pub const DEFAULT_TITLE: &str = "レシート";
pub const THANK_YOU: &str = "ありがとうございました";

/// One item as printed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLine {
    pub name: String,
    pub price: String,
}

/// Printed strings of one receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptView {
    pub title: String,
    pub items: Vec<ItemLine>,
    pub total_line: String,
    pub footer: &'static str,
    pub printed_at: String,
}

impl ReceiptView {
    pub fn new(payload: &ReceiptPayload, printed_at: DateTime<Tz>) -> Self {
        let title = if payload.title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            printable(&payload.title)
        };

        Self {
            title,
            items: payload
                .items
                .iter()
                .map(|item| ItemLine {
                    name: printable(&item.name),
                    price: format_yen(item.price),
                })
                .collect(),
            total_line: format!("合計: {}", format_yen(payload.total)),
            footer: THANK_YOU,
            printed_at: format_timestamp(printed_at),
        }
    }

    /// Plain-text rendition at `width` columns, same line order as the thermal job
    pub fn preview(&self, width: usize) -> Vec<String> {
        let rule = "=".repeat(width);
        let mut lines = vec![center(&self.title, width), rule.clone()];
        for item in &self.items {
            lines.push(item.name.clone());
            lines.push(pad_sjis(&item.price, width, true));
        }
        lines.push(rule);
        lines.push(pad_sjis(&self.total_line, width, true));
        lines.push(String::new());
        lines.push(center(self.footer, width));
        lines.push(String::new());
        lines.push(center(&self.printed_at, width));
        lines
    }
}

/// User text with control characters removed, so it cannot smuggle printer
/// commands into the job
fn printable(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// `¥300`, `¥4.5`: normalized, no grouping
pub fn format_yen(amount: Decimal) -> String {
    format!("¥{}", amount.normalize())
}

/// ja-JP short date and time: `2026/10/14 9:05:03`
pub fn format_timestamp(at: DateTime<Tz>) -> String {
    at.format("%Y/%-m/%-d %-H:%M:%S").to_string()
}

fn center(s: &str, width: usize) -> String {
    let w = sjis_width(s);
    if w >= width {
        return s.to_string();
    }
    format!("{}{}", " ".repeat((width - w) / 2), s)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::ReceiptItem;
    use chrono::TimeZone;

    pub(crate) fn fixed_time() -> DateTime<Tz> {
        chrono_tz::Asia::Tokyo
            .with_ymd_and_hms(2026, 1, 5, 9, 5, 3)
            .unwrap()
    }

    pub(crate) fn cafe_payload() -> ReceiptPayload {
        ReceiptPayload {
            title: "レシート".to_string(),
            items: vec![
                ReceiptItem {
                    name: "コーヒー".to_string(),
                    price: Decimal::from(300),
                },
                ReceiptItem {
                    name: "サンドイッチ".to_string(),
                    price: Decimal::from(450),
                },
            ],
            total: Decimal::from(750),
            image: None,
        }
    }

    #[test]
    fn test_view_strings() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        assert_eq!(view.total_line, "合計: ¥750");
        assert_eq!(view.items[1].price, "¥450");
        assert_eq!(view.printed_at, "2026/1/5 9:05:03");
    }

    #[test]
    fn test_empty_title_falls_back() {
        let view = ReceiptView::new(&ReceiptPayload::default(), fixed_time());
        assert_eq!(view.title, DEFAULT_TITLE);
        assert_eq!(view.total_line, "合計: ¥0");

        let payload = ReceiptPayload {
            title: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(ReceiptView::new(&payload, fixed_time()).title, "  ");
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let mut payload = cafe_payload();
        payload.title = "レ\u{1B}@シート".to_string();
        payload.items[0].name = "A\u{1D}v0\u{0}\u{7F}\u{7F}\u{7F}\u{7F}".to_string();
        let view = ReceiptView::new(&payload, fixed_time());
        assert_eq!(view.title, "レ@シート");
        assert_eq!(view.items[0].name, "Av0");
    }

    #[test]
    fn test_total_is_not_recomputed() {
        let mut payload = cafe_payload();
        payload.total = Decimal::new(1, 0);
        let view = ReceiptView::new(&payload, fixed_time());
        assert_eq!(view.total_line, "合計: ¥1");
    }

    #[test]
    fn test_format_yen_normalizes() {
        assert_eq!(format_yen(Decimal::new(450, 2)), "¥4.5");
        assert_eq!(format_yen(Decimal::new(30000, 2)), "¥300");
    }

    #[test]
    fn test_preview_layout() {
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let lines = view.preview(20);
        assert_eq!(lines[0], "      レシート");
        assert_eq!(lines[2], "コーヒー");
        assert_eq!(lines[3], format!("{}¥300", " ".repeat(16)));
        assert!(lines.contains(&format!("{}合計: ¥750", " ".repeat(10))));
        assert_eq!(lines.last().unwrap(), "  2026/1/5 9:05:03");
    }
}
