//! Demo printer
//!
//! Prints to the log and keeps the most recent jobs in memory.

use crate::render::{ReceiptView, ThermalReceiptRenderer};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::info;

/// Jobs kept for inspection; older ones are discarded
pub const JOURNAL_CAPACITY: usize = 16;

pub const SUCCESS_MESSAGE: &str = "Demo receipt printed successfully! Check console for output.";

/// One job received by the demo printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockJob {
    pub device_id: String,
    /// Plain-text rendition, as logged
    pub lines: Vec<String>,
    /// The ESC/POS job a real thermal printer would have received
    pub bytes: Vec<u8>,
}

pub struct MockPrinter {
    width: usize,
    jobs: Mutex<VecDeque<MockJob>>,
}

impl MockPrinter {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            jobs: Mutex::new(VecDeque::with_capacity(JOURNAL_CAPACITY)),
        }
    }

    pub fn print(&self, device_id: &str, view: &ReceiptView) {
        let lines = view.preview(self.width);
        let bytes = ThermalReceiptRenderer::new(self.width).render(view, None);

        info!(device = device_id, bytes = bytes.len(), "=== DEMO RECEIPT ===");
        for line in &lines {
            info!("{}", line);
        }

        let mut jobs = self.jobs.lock();
        if jobs.len() == JOURNAL_CAPACITY {
            jobs.pop_front();
        }
        jobs.push_back(MockJob {
            device_id: device_id.to_string(),
            lines,
            bytes,
        });
    }

    /// Up to [`JOURNAL_CAPACITY`] most recent jobs, oldest first
    pub fn jobs(&self) -> Vec<MockJob> {
        self.jobs.lock().iter().cloned().collect()
    }
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{cafe_payload, fixed_time};

    #[test]
    fn test_jobs_are_journaled() {
        let printer = MockPrinter::default();
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        printer.print("mock_epson_thermal", &view);
        printer.print("mock_epson_thermal", &view);

        let jobs = printer.jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0], jobs[1]);
        assert_eq!(jobs[0].lines, view.preview(32));
        assert!(jobs[0].bytes.ends_with(&[0x1D, 0x56, 0x00, 0x1C, 0x2E]));
    }

    #[test]
    fn test_journal_is_bounded() {
        let printer = MockPrinter::default();
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        for i in 0..1000 {
            printer.print(&format!("job-{}", i), &view);
        }

        let jobs = printer.jobs();
        assert_eq!(jobs.len(), JOURNAL_CAPACITY);
        assert_eq!(jobs[0].device_id, format!("job-{}", 1000 - JOURNAL_CAPACITY));
        assert_eq!(jobs.last().unwrap().device_id, "job-999");
    }
}
