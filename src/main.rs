use anyhow::Context;
use clap::Parser;
use sdosource::config::{Config, OutputFormat};
use sdosource::{fits, BaseMapDefaults, Properties, SourceRegistry};
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sdosource", about = "Normalize SDO (AIA/HMI) FITS headers into map properties")]
struct Args {
    /// FITS file to inspect
    path: PathBuf,

    /// HDU to read (defaults to the first HDU holding image data)
    #[arg(long)]
    hdu: Option<usize>,

    /// Print properties as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level to stderr
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(args.config.as_deref()).context("loading configuration")?;

    let file = std::fs::File::open(&args.path)
        .with_context(|| format!("opening {}", args.path.display()))?;
    let mut reader = BufReader::new(file);
    let hdu = match args.hdu {
        Some(hdu) => hdu,
        None => fits::find_image_hdu(&mut reader)
            .with_context(|| format!("scanning {}", args.path.display()))?,
    };
    let header = fits::read_header(&mut reader, hdu)
        .with_context(|| format!("reading header of HDU {hdu} in {}", args.path.display()))?;
    tracing::info!(hdu, cards = header.len(), "header loaded");

    let registry = SourceRegistry::sdo_with_defaults(BaseMapDefaults::from(&config.defaults));
    let properties = registry
        .properties(&header)
        .with_context(|| format!("normalizing {}", args.path.display()))?;

    let format = if args.json { OutputFormat::Json } else { config.output.format };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&properties)?),
        OutputFormat::Table => print_table(&properties),
    }
    Ok(())
}

fn print_table(properties: &Properties) {
    let width = properties.iter().map(|(k, _)| k.as_str().len()).max().unwrap_or(0);
    for (key, value) in properties.iter() {
        println!("{:<width$}  {value}", key.as_str());
    }
}
