//! Thin CLI over the rendering engine: reads a receipt JSON file and
//! writes the PDF artifact (or prints the narrative preview).

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use recibo::{narrative, rendering, FitMode, Receipt, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "recibo", about = "Render a payment receipt to PDF or narrative text")]
struct Args {
    /// Path to the receipt record (camelCase JSON)
    input: PathBuf,

    /// Letterhead image to normalize onto the page background
    #[arg(long)]
    letterhead: Option<PathBuf>,

    /// Fit strategy for the letterhead
    #[arg(long, value_enum, default_value = "fill")]
    fit: FitMode,

    /// Print the narrative paragraphs instead of writing a PDF
    #[arg(long)]
    text: bool,

    /// Output path; defaults to the artifact's fixed file name
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let receipt: Receipt = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    if args.text {
        for paragraph in narrative::build_paragraphs(&receipt) {
            println!("{paragraph}");
            println!();
        }
        return Ok(());
    }

    let config = RenderConfig {
        fit: args.fit,
        ..RenderConfig::default()
    };
    let doc = rendering::render_receipt_pdf(&receipt, args.letterhead.as_deref(), &config)
        .await
        .context("rendering receipt")?;

    let out = args
        .output
        .unwrap_or_else(|| PathBuf::from(&doc.file_name));
    std::fs::write(&out, &doc.bytes).with_context(|| format!("writing {}", out.display()))?;
    eprintln!("wrote {} ({} bytes)", out.display(), doc.bytes.len());
    Ok(())
}
