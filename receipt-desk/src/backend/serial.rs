//! Serial thermal backend
//!
//! connectivity check -> optional logo raster -> ESC/POS job -> one write

use super::ThermalTransport;
use crate::config::Config;
use crate::error::{DeskError, DeskResult};
use crate::model::LogoImage;
use crate::render::{ReceiptView, ThermalReceiptRenderer};
use receipt_printer::process_logo;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const SUCCESS_MESSAGE: &str = "Receipt printed successfully to thermal printer!";
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot connect to thermal printer. Check connection and try again.";

pub struct SerialBackend {
    transport: Arc<dyn ThermalTransport>,
    renderer: ThermalReceiptRenderer,
    logo_width_px: u32,
    staging_dir: PathBuf,
}

impl SerialBackend {
    pub fn new(transport: Arc<dyn ThermalTransport>, config: &Config) -> Self {
        Self {
            transport,
            renderer: ThermalReceiptRenderer::new(config.paper_width),
            logo_width_px: config.logo_width_px,
            staging_dir: config.staging_dir.clone(),
        }
    }

    #[instrument(skip(self, view, logo), fields(has_logo = logo.is_some()))]
    pub async fn print(
        &self,
        path: &str,
        view: &ReceiptView,
        logo: Option<&LogoImage>,
    ) -> DeskResult<()> {
        if !self.transport.is_connected(path).await {
            warn!("thermal printer unreachable");
            return Err(DeskError::DeviceUnreachable(UNREACHABLE_MESSAGE.to_string()));
        }

        let raster = match logo {
            Some(image) => match self.rasterize(image).await {
                Ok(raster) => Some(raster),
                Err(e) => {
                    warn!(error = %e, "logo skipped");
                    None
                }
            },
            None => None,
        };

        let job = self.renderer.render(view, raster.as_deref());
        let len = job.len();
        self.transport.execute(path, job).await?;

        info!(bytes = len, "thermal job written");
        Ok(())
    }

    async fn rasterize(&self, image: &LogoImage) -> DeskResult<Vec<u8>> {
        let bytes = image.bytes().to_vec();
        let dir = self.staging_dir.clone();
        let width = self.logo_width_px;

        tokio::task::spawn_blocking(move || stage_and_rasterize(&dir, &bytes, width))
            .await
            .map_err(|e| DeskError::RenderFailure(format!("logo task failed: {}", e)))?
    }
}

/// The staging file lives only for the duration of this call
fn stage_and_rasterize(dir: &Path, bytes: &[u8], width: u32) -> DeskResult<Vec<u8>> {
    let staging_error = |e: std::io::Error| DeskError::RenderFailure(format!("logo staging: {}", e));

    let mut staged = tempfile::Builder::new()
        .prefix("receipt-logo-")
        .tempfile_in(dir)
        .map_err(staging_error)?;
    staged.write_all(bytes).map_err(staging_error)?;
    staged.flush().map_err(staging_error)?;

    Ok(process_logo(staged.path(), width)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{cafe_payload, fixed_time};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use receipt_printer::{PrintError, PrintResult};
    use std::io::Cursor;

    #[derive(Default)]
    struct RecordingTransport {
        offline: bool,
        fail_write: bool,
        writes: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl ThermalTransport for RecordingTransport {
        async fn is_connected(&self, _path: &str) -> bool {
            !self.offline
        }

        async fn execute(&self, _path: &str, job: Vec<u8>) -> PrintResult<()> {
            if self.fail_write {
                return Err(PrintError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "pipe closed",
                )));
            }
            self.writes.lock().push(job);
            Ok(())
        }
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn backend(transport: Arc<RecordingTransport>, dir: &Path) -> SerialBackend {
        let config = Config {
            staging_dir: dir.to_path_buf(),
            logo_width_px: 64,
            ..Config::default()
        };
        SerialBackend::new(transport, &config)
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[tokio::test]
    async fn test_offline_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport {
            offline: true,
            ..Default::default()
        });
        let view = ReceiptView::new(&cafe_payload(), fixed_time());

        let err = backend(transport.clone(), dir.path())
            .print("/dev/rfcomm0", &view, None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
        assert!(transport.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_single_write_with_logo() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let logo = LogoImage::new(png(128, 32));

        backend(transport.clone(), dir.path())
            .print("/dev/rfcomm0", &view, Some(&logo))
            .await
            .unwrap();

        let writes = transport.writes.lock();
        assert_eq!(writes.len(), 1);
        // 64 dots -> 8 bytes per row, 16 rows after resize
        assert!(contains(&writes[0], &[0x1D, 0x76, 0x30, 0x00, 8, 0, 16, 0]));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let view = ReceiptView::new(&cafe_payload(), fixed_time());
        let logo = LogoImage::new(b"definitely not an image".to_vec());

        backend(transport.clone(), dir.path())
            .print("/dev/rfcomm0", &view, Some(&logo))
            .await
            .unwrap();

        let writes = transport.writes.lock();
        assert_eq!(writes.len(), 1);
        assert!(!contains(&writes[0], &[0x1D, 0x76, 0x30]));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport {
            fail_write: true,
            ..Default::default()
        });
        let view = ReceiptView::new(&cafe_payload(), fixed_time());

        let err = backend(transport, dir.path())
            .print("/dev/rfcomm0", &view, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DeskError::SubmitFailure(_)));
        assert!(err.to_string().starts_with("Printing failed: "));
    }
}
