//! CUPS host context driven through the `lpstat` / `lp` command line tools

use super::{HostPrintContext, HostPrinterRecord, Margins, SubmitOptions, SubmitOutcome};
use crate::render::ReceiptDocument;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Host print context backed by the CUPS scheduler
///
/// `lp` and `lpstat` pick the scheduler from `CUPS_SERVER` or the client
/// configuration, as every CUPS client does.
#[derive(Debug, Clone, Copy, Default)]
pub struct CupsHost;

impl CupsHost {
    pub fn new() -> Self {
        Self
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        // Stable, untranslated output for parsing
        cmd.env("LC_ALL", "C");
        cmd
    }

    async fn lpstat(&self, args: &[&str]) -> Result<String, String> {
        let output = self
            .command("lpstat")
            .args(args)
            .output()
            .await
            .map_err(|e| format!("lpstat: {}", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        // An empty scheduler is not an error
        if stderr.contains("No destinations added") {
            return Ok(String::new());
        }
        Err(format!("lpstat {}: {}", args.join(" "), stderr.trim()))
    }
}

#[async_trait]
impl HostPrintContext for CupsHost {
    #[instrument(skip(self))]
    async fn printers(&self) -> Result<Vec<HostPrinterRecord>, String> {
        let listing = self.lpstat(&["-l", "-p"]).await?;
        let default = match self.lpstat(&["-d"]).await {
            Ok(out) => parse_default(&out),
            Err(e) => {
                warn!(error = %e, "default destination lookup failed");
                None
            }
        };

        let printers = parse_printers(&listing, default.as_deref());
        debug!(count = printers.len(), "cups printers enumerated");
        Ok(printers)
    }

    #[instrument(skip(self, document, options), fields(bytes = document.text.len()))]
    async fn submit(
        &self,
        device: &str,
        document: &ReceiptDocument,
        options: &SubmitOptions,
    ) -> SubmitOutcome {
        let mut cmd = self.command("lp");
        cmd.arg("-d").arg(device);
        cmd.arg("-t").arg("receipt");
        cmd.args(lp_options(document, options));
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return SubmitOutcome::Failed(format!("lp: {}", e)),
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(document.text.as_bytes()).await {
                return SubmitOutcome::Failed(format!("lp stdin: {}", e));
            }
            // Close stdin so lp sees EOF
            drop(stdin);
        }

        let output = match child.wait_with_output().await {
            Ok(output) => output,
            Err(e) => return SubmitOutcome::Failed(format!("lp: {}", e)),
        };

        if output.status.success() {
            info!(
                response = %String::from_utf8_lossy(&output.stdout).trim(),
                "job accepted by scheduler"
            );
            SubmitOutcome::Completed
        } else {
            let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
            SubmitOutcome::Failed(if reason.is_empty() {
                format!("lp exited with {}", output.status)
            } else {
                reason
            })
        }
    }
}

/// `-o` flags for one submission
///
/// The plain-text rendition goes through the stock `texttopdf` filter;
/// `cpi` is chosen so `columns` characters fill the page width. `lp` never
/// shows a dialog and CUPS has no background-graphics switch, so `silent`
/// and `print_background` need no flags.
fn lp_options(document: &ReceiptDocument, options: &SubmitOptions) -> Vec<String> {
    let mut args = vec![
        "-o".to_string(),
        format!("media=Custom.{}x297mm", document.page_width_mm),
        "-o".to_string(),
        "document-format=text/plain".to_string(),
        "-o".to_string(),
        format!("scaling={}", options.scale_factor),
        "-o".to_string(),
        "lpi=8".to_string(),
    ];
    if let Some(cpi) = chars_per_inch(document.columns, document.page_width_mm) {
        args.push("-o".to_string());
        args.push(format!("cpi={}", cpi));
    }
    if options.margins == Margins::None {
        for side in ["page-left", "page-right", "page-top", "page-bottom"] {
            args.push("-o".to_string());
            args.push(format!("{}=0", side));
        }
    }
    args
}

/// Smallest whole cpi that fits `columns` characters across `width_mm`
fn chars_per_inch(columns: usize, width_mm: u32) -> Option<usize> {
    if columns == 0 || width_mm == 0 {
        return None;
    }
    let tenth_mm = width_mm as usize * 10;
    Some((columns * 254).div_ceil(tenth_mm))
}

/// Parse `lpstat -d`
fn parse_default(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|l| l.trim().strip_prefix("system default destination:"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Parse `lpstat -l -p`
fn parse_printers(output: &str, default: Option<&str>) -> Vec<HostPrinterRecord> {
    let mut printers: Vec<HostPrinterRecord> = Vec::new();

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("printer ") {
            let mut parts = rest.splitn(2, ' ');
            let name = match parts.next() {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };
            let tail = parts.next().unwrap_or("");
            printers.push(HostPrinterRecord {
                is_default: default == Some(name.as_str()),
                name,
                display_name: None,
                description: None,
                status: parse_status(tail),
            });
        } else if let Some(desc) = line.trim().strip_prefix("Description:") {
            let desc = desc.trim();
            if let Some(last) = printers.last_mut()
                && !desc.is_empty()
            {
                last.display_name = Some(desc.to_string());
                last.description = Some(desc.to_string());
            }
        }
    }

    printers
}

/// "is idle.  enabled since ..." -> "idle"
fn parse_status(tail: &str) -> String {
    if tail.contains("disabled") {
        return "disabled".to_string();
    }
    if tail.starts_with("now printing") {
        return "printing".to_string();
    }
    tail.strip_prefix("is ")
        .and_then(|s| s.split('.').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
printer Office_Laser is idle.  enabled since Mon 13 Oct 2026 09:12:01 AM JST
\tForm mounts:
\tDescription: Office Laser (2F)
\tLocation: 2F
printer TM_T20 now printing TM_T20-41.  enabled since Mon 13 Oct 2026 10:00:00 AM JST
\tDescription: EPSON TM-T20
printer Broken disabled since Sun 12 Oct 2026 08:00:00 PM JST -
\tDescription:
";

    #[test]
    fn test_parse_printers() {
        let printers = parse_printers(LISTING, Some("TM_T20"));
        assert_eq!(printers.len(), 3);

        assert_eq!(printers[0].name, "Office_Laser");
        assert_eq!(printers[0].status, "idle");
        assert_eq!(printers[0].display_name.as_deref(), Some("Office Laser (2F)"));
        assert!(!printers[0].is_default);

        assert_eq!(printers[1].name, "TM_T20");
        assert!(printers[1].is_default);
        assert_eq!(printers[1].status, "printing");

        assert_eq!(printers[2].status, "disabled");
        assert!(printers[2].description.is_none());
    }

    #[test]
    fn test_parse_default() {
        assert_eq!(
            parse_default("system default destination: TM_T20\n").as_deref(),
            Some("TM_T20")
        );
        assert_eq!(parse_default("no system default destination\n"), None);
    }

    fn document(columns: usize) -> ReceiptDocument {
        ReceiptDocument {
            html: String::new(),
            text: String::new(),
            page_width_mm: 57,
            columns,
        }
    }

    #[test]
    fn test_lp_options_zero_margins() {
        let args = lp_options(&document(32), &SubmitOptions::default());
        assert!(args.contains(&"media=Custom.57x297mm".to_string()));
        assert!(args.contains(&"page-left=0".to_string()));
        assert!(args.contains(&"scaling=100".to_string()));
    }

    #[test]
    fn test_lp_options_plain_text() {
        let args = lp_options(&document(32), &SubmitOptions::default());
        assert!(args.contains(&"document-format=text/plain".to_string()));
        assert!(!args.iter().any(|a| a.contains("text/html")));
        // 32 columns across 57mm = 14.26 cpi
        assert!(args.contains(&"cpi=15".to_string()));
        assert!(args.contains(&"lpi=8".to_string()));
    }

    #[test]
    fn test_chars_per_inch() {
        assert_eq!(chars_per_inch(48, 80), Some(16));
        assert_eq!(chars_per_inch(32, 0), None);
        assert_eq!(chars_per_inch(0, 57), None);
    }
}
