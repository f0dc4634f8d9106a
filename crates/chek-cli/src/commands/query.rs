//! Query command - print the verification-service lookup key of a receipt.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use chek_core::{FiscalQuery, HtmlReceiptParser, ReceiptParser};

use super::{load_config, read_input};

/// Arguments for the query command.
#[derive(Args)]
pub struct QueryArgs {
    /// Input HTML file ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Ignore the QR code and derive the key from the parsed fields
    #[arg(long)]
    from_fields: bool,
}

pub fn run(args: QueryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let html = read_input(&args.input)?;

    let outcome = HtmlReceiptParser::with_config(config.parser).parse(&html)?;

    let query = match outcome.fiscal_query {
        Some(query) if !args.from_fields => {
            info!("Using QR code payload");
            query
        }
        _ => {
            info!("Deriving query from parsed fields");
            FiscalQuery::from_receipt(&outcome.receipt)
        }
    };

    println!("{}", serde_json::to_string_pretty(&query)?);

    Ok(())
}
