use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use resty_core::{Classification, Event, FilterReport, RestFilter, RestFilterConfig, Value};

mod reqwest_client;

/// resty — Enrich newline-delimited JSON records with a REST call
#[derive(Parser, Debug)]
#[command(
    name = "resty",
    version,
    about = "Enrich JSON records with the result of a templated HTTP request"
)]
struct Cli {
    /// Filter configuration file (YAML or JSON)
    #[arg(short, long, required_unless_present = "example_config")]
    config: Option<PathBuf>,

    /// Read records from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print a colored summary line per record to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    validate: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    example_config: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

const EXAMPLE_CONFIG: &str = r#"# resty filter configuration
request:
  url: "https://jsonplaceholder.typicode.com/users/%{user_id}"
  method: get
  headers:
    Accept: application/json
    X-Request-Id: "%{request_id}"
  # params are sent as the query string for GET and as the body for POST
  # params:
  #   page: 1
  # auth:
  #   user: admin
  #   password: secret

# Parse responses (and serialize request bodies) as JSON
json: true
# Expand %{field} placeholders from each record
sprintf: true
# Where the response is written; must not be blank
target: user
# Written to the target instead of tagging when the call fails
# fallback:
#   name: unknown
tag_on_rest_failure: ["_restfailure"]
tag_on_json_failure: ["_jsonparsefailure"]
# Placeholders for absent fields: empty (default) or keep
missing_field: empty
"#;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if cli.example_config {
        print!("{}", EXAMPLE_CONFIG);
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "✖".red().bold(), e);
        process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}

fn load_config(path: &Path) -> Result<RestFilterConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = if path.extension().is_some_and(|e| e == "json") {
        RestFilterConfig::from_json(&content)?
    } else {
        RestFilterConfig::from_yaml(&content)?
    };
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = cli
        .config
        .as_deref()
        .context("A configuration file is required")?;
    let filter = RestFilter::new(load_config(config_path)?)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    if cli.validate {
        eprintln!("{} Configuration is valid", "✔".green().bold());
        return Ok(());
    }

    let client = reqwest_client::ReqwestClient::new(cli.timeout_secs.map(Duration::from_secs))
        .context("Failed to build HTTP client")?;

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(fs::File::open(path).with_context(|| {
            format!("Failed to open input file: {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = io::stdout().lock();

    let mut processed = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let mut event = match parse_event(&line) {
            Some(event) => event,
            None => {
                warn!(line = i + 1, "skipping input line that is not a JSON object");
                skipped += 1;
                continue;
            }
        };

        let report = filter.filter(&client, &mut event);
        processed += 1;
        if report.classification.is_failure() {
            failed += 1;
        }
        if cli.verbose {
            print_report(i + 1, &report);
        }

        serde_json::to_writer(&mut out, &event).context("Failed to write record")?;
        out.write_all(b"\n").context("Failed to write record")?;
    }
    out.flush().context("Failed to flush output")?;

    info!(processed, failed, skipped, "input exhausted");
    Ok(())
}

fn parse_event(line: &str) -> Option<Event> {
    let value: Value = serde_json::from_str(line).ok()?;
    Event::try_from(value).ok()
}

fn print_report(line: usize, report: &FilterReport) {
    let status = match report.status_code {
        Some(code) => code.to_string(),
        None => "---".to_string(),
    };
    let status_colored = match report.classification {
        Classification::Success => status.green().bold(),
        Classification::HttpError if report.status_code.is_some_and(|c| c < 500) => {
            status.yellow().bold()
        }
        Classification::HttpError | Classification::TransportError => status.red().bold(),
        Classification::ParseError | Classification::EmptySuccess => status.magenta().bold(),
    };

    eprintln!(
        "{} {} {} {}",
        format!("#{}", line).dimmed(),
        status_colored,
        report.classification.to_string().bold(),
        format!("({:?})", report.resolution).dimmed()
    );
}
