mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use invoice_core::render::format_currency;
use invoice_core::{
    download, generate, Decimal, Error, HistoryRepository, InvoiceDraft, InvoiceRenderer,
    KeyValueStore,
};
use log::{info, warn};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "invoice", version, about = "Generate PDF invoices and keep a local history")]
struct Cli {
    /// Path to a config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an invoice, write its PDF and record it in the history
    Generate(GenerateArgs),
    /// List past invoices, newest first
    History,
    /// Write the stored PDF of a past invoice
    Download {
        id: String,
        /// Output directory (defaults to output.dir from the config)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove an invoice from the history
    Delete { id: String },
    /// Add the sample entries if the history is empty
    Seed,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Client name (required)
    #[arg(long)]
    client: String,

    #[arg(long, default_value = "")]
    email: String,

    /// Address line; repeat for multiple lines
    #[arg(long = "address")]
    address: Vec<String>,

    /// Line item as "DESCRIPTION;QUANTITY;RATE"; repeat for more rows
    #[arg(long = "item", value_parser = ItemSpec::from_str)]
    items: Vec<ItemSpec>,

    /// Notes line; repeat for multiple lines
    #[arg(long = "notes")]
    notes: Vec<String>,

    /// Output directory (defaults to output.dir from the config)
    #[arg(long)]
    out: Option<PathBuf>,
}

/// One `--item` argument. The description may itself contain `;`,
/// so quantity and rate are split off from the right.
#[derive(Debug, Clone, PartialEq)]
struct ItemSpec {
    description: String,
    quantity: u32,
    rate: Decimal,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ';');
        let (rate, quantity, description) = match (parts.next(), parts.next(), parts.next()) {
            (Some(rate), Some(quantity), Some(description)) => (rate, quantity, description),
            _ => return Err(format!("expected DESCRIPTION;QUANTITY;RATE, got {:?}", s)),
        };
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("quantity {:?}: {}", quantity.trim(), e))?;
        let rate = Decimal::from_str(rate.trim().trim_start_matches('$'))
            .map_err(|e| format!("rate {:?}: {}", rate.trim(), e))?;
        Ok(ItemSpec {
            description: description.trim().to_string(),
            quantity,
            rate,
        })
    }
}

fn build_draft(args: &GenerateArgs) -> Result<InvoiceDraft> {
    let mut draft = InvoiceDraft::new();
    draft.set_client_name(&args.client);
    draft.set_client_email(&args.email);
    draft.set_client_address(&args.address.join("\n"));
    draft.set_notes(&args.notes.join("\n"));

    // The fresh draft already holds one blank row; fill it before adding more.
    let mut row = draft.items()[0].id();
    for (n, spec) in args.items.iter().enumerate() {
        if n > 0 {
            row = draft.add_item();
        }
        draft.set_description(row, &spec.description)?;
        draft.set_quantity(row, spec.quantity)?;
        draft.set_rate(row, spec.rate)?;
    }
    Ok(draft)
}

fn write_document(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn cmd_generate<S: KeyValueStore>(
    config: &Config,
    history: &mut HistoryRepository<S>,
    args: &GenerateArgs,
) -> Result<()> {
    let draft = build_draft(args)?;
    if args.items.is_empty() {
        warn!("no --item given, the invoice has a single blank row");
    }
    let renderer = InvoiceRenderer::new(config.letterhead.clone())
        .with_compression(config.output.compress);

    let generated = generate(&draft, &renderer, history, Utc::now())
        .context("Error generating PDF. Please try again.")?;

    let dir = args.out.as_deref().unwrap_or(&config.output.dir);
    let path = write_document(dir, &generated.file_name(), &generated.bytes)?;
    let totals = generated.invoice.totals();
    println!(
        "{}  subtotal {}  tax {}  total {}",
        generated.invoice.invoice_number(),
        format_currency(totals.subtotal),
        format_currency(totals.tax),
        format_currency(totals.total)
    );
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_history<S: KeyValueStore>(history: &HistoryRepository<S>) {
    let records = history.list();
    if records.is_empty() {
        println!("No invoices yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Invoice").add_attribute(Attribute::Bold),
        Cell::new("Client").add_attribute(Attribute::Bold),
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new("PDF").add_attribute(Attribute::Bold),
    ]);
    for record in &records {
        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(&record.client_name),
            Cell::new(record.date.with_timezone(&Local).format("%-m/%-d/%Y")),
            Cell::new(format_currency(record.total)).set_alignment(CellAlignment::Right),
            Cell::new(if record.is_sample() { "sample" } else { "stored" }),
        ]);
    }
    println!("{table}");
}

fn cmd_download<S: KeyValueStore>(
    config: &Config,
    history: &HistoryRepository<S>,
    id: &str,
    out: Option<&Path>,
) -> Result<()> {
    let Some(record) = history.find(id) else {
        bail!("no invoice {} in the history", id);
    };
    let file = match download(&record) {
        Ok(file) => file,
        Err(Error::SampleUnavailable(_)) => {
            println!("{} is a sample entry and has no stored PDF.", id);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let dir = out.unwrap_or(&config.output.dir);
    let path = write_document(dir, &file.file_name, file.bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_delete<S: KeyValueStore>(history: &mut HistoryRepository<S>, id: &str) {
    if history.find(id).is_none() {
        println!("No invoice {} in the history.", id);
        return;
    }
    history.delete(id);
    println!("Deleted {}", id);
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let mut history = HistoryRepository::new(config.open_store()?);

    match &cli.command {
        Commands::Generate(args) => cmd_generate(&config, &mut history, args),
        Commands::History => {
            cmd_history(&history);
            Ok(())
        }
        Commands::Download { id, out } => cmd_download(&config, &history, id, out.as_deref()),
        Commands::Delete { id } => {
            cmd_delete(&mut history, id);
            Ok(())
        }
        Commands::Seed => {
            if history.seed_samples_if_empty(Utc::now()) {
                info!("seeded sample history");
                println!("Added sample invoices.");
            } else {
                println!("History is not empty, nothing seeded.");
            }
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_core::ItemId;

    fn args(items: &[&str]) -> GenerateArgs {
        GenerateArgs {
            client: "Globex".to_string(),
            email: String::new(),
            address: vec!["1 Main St".to_string(), "Springfield".to_string()],
            items: items.iter().map(|s| s.parse().unwrap()).collect(),
            notes: vec![],
            out: None,
        }
    }

    #[test]
    fn item_spec_splits_from_the_right() {
        let spec: ItemSpec = "Design; phase 2;3;$50.00".parse().unwrap();
        assert_eq!(spec.description, "Design; phase 2");
        assert_eq!(spec.quantity, 3);
        assert_eq!(spec.rate, Decimal::new(5000, 2));
    }

    #[test]
    fn item_spec_rejects_bad_input() {
        assert!("Consulting;10".parse::<ItemSpec>().is_err());
        assert!("Consulting;-1;100".parse::<ItemSpec>().is_err());
        assert!("Consulting;1;ten".parse::<ItemSpec>().is_err());
    }

    #[test]
    fn draft_fills_the_blank_row_first() {
        let draft = build_draft(&args(&["Consulting;10;100", "Hosting;1;25.50"])).unwrap();
        assert_eq!(draft.items().len(), 2);
        assert_eq!(draft.items()[0].id(), ItemId(1));
        assert_eq!(draft.items()[0].description(), "Consulting");
        assert_eq!(draft.client_address(), "1 Main St\nSpringfield");
        assert_eq!(draft.totals().total, Decimal::new(112805, 2));
    }

    #[test]
    fn negative_rate_is_refused() {
        assert!(build_draft(&args(&["Refund;1;-5"])).is_err());
    }

    #[test]
    fn out_of_range_rate_is_an_error_not_a_crash() {
        let err = build_draft(&args(&["X;2;79228162514264337593543950335"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::AmountOverflow)
        ));
    }
}
