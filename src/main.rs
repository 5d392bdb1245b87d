use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use markd::{Config, Error};

#[derive(Parser)]
#[command(name = "markd")]
#[command(about = "Render markd text to HTML with link safety checks")]
struct Cli {
    /// Input file (reads stdin when omitted or `-`)
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file
    #[arg(short, long, default_value = "markd.toml")]
    config: PathBuf,

    /// URL of the page the document is shown on (overrides the config)
    #[arg(long)]
    page_url: Option<String>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
    Tokens,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "markd=debug" } else { "markd=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let markdown = read_input(cli.input.as_ref())?;

    let mut config = Config::load(&cli.config);
    if let Some(url) = &cli.page_url {
        config.page.url = url.clone();
    }

    let rendered = match cli.format {
        Format::Html => markd::markdown_to_html_with_config(&markdown, &config)?,
        Format::Json => {
            let page = config.page_context()?;
            let blocks = markd::parse(&markdown, &page);
            let mut json = serde_json::to_string_pretty(&blocks)?;
            json.push('\n');
            json
        }
        Format::Tokens => markd::tokenize(&markdown)
            .iter()
            .map(|token| format!("{}\n", token))
            .collect(),
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)?;
            tracing::debug!(path = %path.display(), "wrote output");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> Result<String, Error> {
    match input {
        Some(path) if path.as_os_str() != "-" => Ok(fs::read_to_string(path)?),
        _ => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}
