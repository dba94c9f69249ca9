//! receipt-desk: list printers and print a receipt from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use receipt_desk::logger::init_logger;
use receipt_desk::{
    Config, DeviceRegistry, HostPrintContext, LogoImage, PrintDispatcher, ReceiptItem,
    ReceiptPayload, SourceOutcome,
};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "receipt-desk", version, about = "Discover printers and print receipts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List printable targets
    List {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one receipt
    Print {
        /// Target id as shown by `list`
        #[arg(long)]
        printer: String,
        #[arg(long, default_value = "")]
        title: String,
        /// NAME=PRICE, repeatable
        #[arg(long = "item", value_parser = parse_item)]
        items: Vec<ReceiptItem>,
        /// Defaults to the sum of the items
        #[arg(long)]
        total: Option<Decimal>,
        /// Logo image file
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

fn parse_item(s: &str) -> Result<ReceiptItem, String> {
    let (name, price) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=PRICE, got {:?}", s))?;
    let price = price
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("bad price {:?}: {}", price, e))?;
    Ok(ReceiptItem {
        name: name.trim().to_string(),
        price,
    })
}

#[cfg(unix)]
fn host_context() -> Option<Box<dyn HostPrintContext>> {
    Some(Box::new(receipt_desk::CupsHost::new()))
}

#[cfg(not(unix))]
fn host_context() -> Option<Box<dyn HostPrintContext>> {
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_logger(&config.log_level, config.log_dir.as_deref());

    let host = host_context();
    let host = host.as_deref();

    match cli.command {
        Command::List { json } => {
            let snapshot = DeviceRegistry::default().snapshot(host).await;
            for (source, outcome) in [("system", &snapshot.system), ("serial", &snapshot.serial)] {
                if let SourceOutcome::Degraded(reason) = outcome {
                    eprintln!("{} printers unavailable: {}", source, reason);
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.devices)?);
            } else {
                for device in &snapshot.devices {
                    let marker = if device.is_default { "*" } else { " " };
                    println!(
                        "{} {:<40} {:<14} {}",
                        marker,
                        device.id,
                        device.status,
                        device.display_name
                    );
                }
            }
        }
        Command::Print {
            printer,
            title,
            items,
            total,
            image,
        } => {
            let image = match image {
                Some(path) => Some(LogoImage::new(
                    std::fs::read(&path)
                        .with_context(|| format!("reading {}", path.display()))?,
                )),
                None => None,
            };
            let total = total.unwrap_or_else(|| items.iter().map(|i| i.price).sum());
            let payload = ReceiptPayload {
                title,
                items,
                total,
                image,
            };

            let outcome = PrintDispatcher::new(&config)
                .print(host, &printer, &payload)
                .await;
            println!("{}", outcome.message);
            if !outcome.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
