use std::fs;
use std::path::{Path, PathBuf};

use chatmark::{Config, Error, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Config picked up from the working directory when `--config` is not given.
const LOCAL_CONFIG: &str = "chatmark.toml";

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(about = "Render assistant chat markdown to PDF, SVG, Typst or JSON")]
struct Cli {
    /// Input markdown file, or a JSON transcript with --transcript
    input: PathBuf,

    /// Output file (defaults to input name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Theme file (defaults to ./chatmark.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat the input as a JSON array of chat messages
    #[arg(long)]
    transcript: bool,

    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Pdf,
    Svg,
    Typst,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Svg => "svg",
            Format::Typst => "typ",
            Format::Json => "json",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let input = fs::read_to_string(&cli.input).map_err(|source| Error::Io {
        path: cli.input.clone(),
        source,
    })?;
    let config = load_config(cli.config.as_deref());

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, cli.format));

    match cli.format {
        Format::Json => {
            let json = if cli.transcript {
                chatmark::transcript_to_json(&chatmark::parse_transcript(&input)?)?
            } else {
                chatmark::markdown_to_json(&input)?
            };
            write_output(&output, json)
        }
        Format::Typst => write_output(&output, typst_source(cli, &input, &config)?),
        Format::Pdf => {
            let pdf = chatmark::typst_to_pdf(typst_source(cli, &input, &config)?)?;
            write_output(&output, pdf)
        }
        Format::Svg => {
            let doc = chatmark::typst_to_svg(typst_source(cli, &input, &config)?)?;
            info!(
                pages = doc.pages.len(),
                width_pt = doc.width_pt,
                height_pt = doc.height_pt,
                "rendered svg"
            );
            if let [page] = doc.pages.as_slice() {
                return write_output(&output, page);
            }
            for (n, page) in doc.pages.iter().enumerate() {
                write_output(&numbered_page(&output, n + 1), page)?;
            }
            Ok(())
        }
    }
}

fn typst_source(cli: &Cli, input: &str, config: &Config) -> Result<String> {
    if cli.transcript {
        let messages = chatmark::parse_transcript(input)?;
        Ok(chatmark::transcript_to_typst(&messages, config))
    } else {
        Ok(chatmark::markdown_to_typst_with_config(input, config))
    }
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => {
            if !path.exists() {
                warn!(path = %path.display(), "config file not found, using defaults");
            }
            Config::load(path)
        }
        None => Config::load(Path::new(LOCAL_CONFIG)),
    }
}

/// Input name with the format's extension. When that would be the input
/// itself (`chat.json` with `-f json`), `chat.chatmark.json` is used instead.
fn default_output(input: &Path, format: Format) -> PathBuf {
    let output = input.with_extension(format.extension());
    if output != input {
        return output;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}.chatmark.{}", format.extension()))
}

/// `out.svg` becomes `out-2.svg` for the second page.
fn numbered_page(output: &Path, page: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    output.with_file_name(format!("{stem}-{page}.svg"))
}

fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    println!("Created {}", path.display());
    Ok(())
}
