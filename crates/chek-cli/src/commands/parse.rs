//! Parse command - extract data from a single receipt HTML file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use chek_core::{HtmlReceiptParser, ParseOutcome, ReceiptData, ReceiptParser};

use super::{load_config, read_input};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input HTML file ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Default missing sections instead of failing
    #[arg(long)]
    lenient: bool,

    /// Fail on unparseable numbers and short item rows
    #[arg(long)]
    strict_fields: bool,

    /// Reproduce historical output (positional sections, no trailing section)
    #[arg(long)]
    legacy: bool,

    /// Check cross-field consistency of the parsed receipt
    #[arg(long)]
    validate: bool,

    /// Print parse diagnostics to stderr
    #[arg(long)]
    diagnostics: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per position
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut parser_config = if args.legacy {
        chek_core::ParserConfig::legacy()
    } else {
        config.parser.clone()
    };
    if args.lenient {
        parser_config.strict_structure = false;
    }
    if args.strict_fields {
        parser_config.strict_fields = true;
    }

    info!("Processing file: {}", args.input.display());
    let html = read_input(&args.input)?;

    let parser = HtmlReceiptParser::with_config(parser_config);
    let outcome = parser.parse(&html)?;

    if args.diagnostics || config.output.show_diagnostics {
        print_diagnostics(&outcome);
    }

    if args.validate {
        let issues = outcome.receipt.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let pretty = config.output.pretty_json && !args.compact;
    let output = format_receipt(&outcome.receipt, args.format, pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_diagnostics(outcome: &ParseOutcome) {
    if outcome.is_clean() {
        eprintln!("{} No diagnostics", style("ℹ").blue());
        return;
    }

    eprintln!(
        "{} {} diagnostics ({} defaulted rows):",
        style("⚠").yellow(),
        outcome.diagnostics.len(),
        outcome.defaulted_rows
    );
    for diagnostic in &outcome.diagnostics {
        eprintln!("  - [{:?}] {}", diagnostic.kind, diagnostic);
    }
}

fn format_receipt(
    receipt: &ReceiptData,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Json => Ok(serde_json::to_string(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

fn format_csv(receipt: &ReceiptData) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "receipt_number",
        "datetime",
        "institution",
        "inn",
        "fn",
        "fd",
        "fpd",
        "name",
        "price",
        "quantity",
        "total",
    ])?;

    for position in &receipt.positions {
        wtr.write_record([
            &receipt.receipt_number,
            &receipt.datetime,
            &receipt.institution,
            &receipt.inn,
            &receipt.fiscal_drive_number,
            &receipt.fiscal_document_number,
            &receipt.fiscal_sign,
            &position.name,
            &position.price.to_string(),
            &position.quantity.to_string(),
            &position.total.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ReceiptData) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", receipt.institution));
    output.push_str(&format!("  {}\n", receipt.address));
    output.push_str(&format!("  ИНН {}\n", receipt.inn));
    output.push('\n');

    output.push_str(&format!("Receipt: {}\n", receipt.receipt_number));
    output.push_str(&format!("Date:    {}\n", receipt.datetime));
    output.push_str(&format!("Shift:   {}\n", receipt.shift_number));
    output.push_str(&format!("Cashier: {}\n", receipt.cashier));
    output.push('\n');

    output.push_str("Positions:\n");
    for (i, position) in receipt.positions.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} - {} x {} = {}\n",
            i + 1,
            position.name,
            position.price,
            position.quantity,
            position.total
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Total: {}\n", receipt.total));
    output.push_str(&format!("  Cash:  {}\n", receipt.cash));
    output.push_str(&format!("  Card:  {}\n", receipt.card));
    output.push_str(&format!("  VAT 18%: {}\n", receipt.tax18));
    output.push_str(&format!("  VAT 10%: {}\n", receipt.tax10));
    output.push('\n');

    output.push_str(&format!("KKT: {}\n", receipt.kkt_reg_number));
    output.push_str(&format!(
        "FN: {}  FD: {}  FPD: {}\n",
        receipt.fiscal_drive_number, receipt.fiscal_document_number, receipt.fiscal_sign
    ));

    output
}
